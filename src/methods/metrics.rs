//! Distances and moments of [`Pdf`] objects.
//!
//! All functions are read-only: absent quantiles or histograms are derived on the fly, nothing is
//! cached. Without an explicit representation, each PDF is evaluated with its
//! [`designated_kind`](`Pdf::designated_kind`).

use crate::{
    QproxError, fXX,
    base::{Pdf, RepresentationKind},
    math::{log2, maxf, sqrt, uniform_grid},
    stats::Limits,
};
use itertools::zip_eq;
use log::debug;

/// Computes the Kullback-Leibler divergence (in bits) of `q` from `p`, see
/// [`calculate_kld_using`].
pub fn calculate_kld<T>(p: &Pdf<T>, q: &Pdf<T>, limits: &Limits<T>, dx: T) -> Result<T, QproxError>
where
    T: fXX,
{
    calculate_kld_using(p, p.designated_kind(), q, q.designated_kind(), limits, dx)
}

/// Computes the Kullback-Leibler divergence `Σ P log2(P / Q) dx` (in bits) on the grid
/// `lo + k·dx ≤ hi`.
///
/// Densities below machine epsilon are floored to it, so that empty regions remain finite. Both
/// representations must cover all of `limits` (see [`Pdf::coverage`]).
pub fn calculate_kld_using<T>(
    p: &Pdf<T>,
    using_p: RepresentationKind,
    q: &Pdf<T>,
    using_q: RepresentationKind,
    limits: &Limits<T>,
    dx: T,
) -> Result<T, QproxError>
where
    T: fXX,
{
    let (values_p, values_q) = evaluate_pair(p, using_p, q, using_q, limits, dx)?;

    let floor = <T as num_traits::Float>::epsilon();

    let kld = zip_eq(values_p.iter(), values_q.iter())
        .map(|(vp, vq)| {
            let (vp, vq) = (maxf!(*vp, floor), maxf!(*vq, floor));

            vp * log2!(vp / vq)
        })
        .sum::<T>()
        * dx;

    debug!(
        "calculate_kld\n\tusing = ({:?}, {:?})\n\tpoints = {}\n\tkld = {}",
        using_p,
        using_q,
        values_p.len(),
        kld
    );

    Ok(kld)
}

/// Computes the `n`-th moment of `pdf` over its limits, see [`Pdf::moment`].
pub fn calculate_moment<T>(pdf: &Pdf<T>, n: usize) -> Result<T, QproxError>
where
    T: fXX,
{
    calculate_moment_using(pdf, pdf.designated_kind(), n, pdf.limits())
}

/// Computes the `n`-th moment `∫ xⁿ f(x) dx` of the representation `using` over `limits`.
pub fn calculate_moment_using<T>(
    pdf: &Pdf<T>,
    using: RepresentationKind,
    n: usize,
    limits: &Limits<T>,
) -> Result<T, QproxError>
where
    T: fXX,
{
    pdf.moment(using, n, limits)
}

/// Computes the root mean square error between `p` and `q`, see [`calculate_rmse_using`].
pub fn calculate_rmse<T>(p: &Pdf<T>, q: &Pdf<T>, limits: &Limits<T>, dx: T) -> Result<T, QproxError>
where
    T: fXX,
{
    calculate_rmse_using(p, p.designated_kind(), q, q.designated_kind(), limits, dx)
}

/// Computes the root mean square error `sqrt(mean((P - Q)²))` on the grid `lo + k·dx ≤ hi`.
pub fn calculate_rmse_using<T>(
    p: &Pdf<T>,
    using_p: RepresentationKind,
    q: &Pdf<T>,
    using_q: RepresentationKind,
    limits: &Limits<T>,
    dx: T,
) -> Result<T, QproxError>
where
    T: fXX,
{
    let (values_p, values_q) = evaluate_pair(p, using_p, q, using_q, limits, dx)?;

    let n = T::from_usize(values_p.len()).unwrap();

    let rmse = sqrt!(
        zip_eq(values_p.iter(), values_q.iter())
            .map(|(vp, vq)| (*vp - *vq) * (*vp - *vq))
            .sum::<T>()
            / n
    );

    debug!(
        "calculate_rmse\n\tusing = ({:?}, {:?})\n\tpoints = {}\n\trmse = {}",
        using_p,
        using_q,
        values_p.len(),
        rmse
    );

    Ok(rmse)
}

fn evaluate_pair<T>(
    p: &Pdf<T>,
    using_p: RepresentationKind,
    q: &Pdf<T>,
    using_q: RepresentationKind,
    limits: &Limits<T>,
    dx: T,
) -> Result<(Vec<T>, Vec<T>), QproxError>
where
    T: fXX,
{
    let grid = uniform_grid(limits.min(), limits.max(), dx)?;

    for (pdf, using) in [(p, using_p), (q, using_q)] {
        let coverage = pdf.coverage(using, limits)?;

        if coverage != *limits {
            return Err(QproxError::Domain {
                operation: "evaluate_pair",
                msg: format!(
                    "the {:?} representation covers [{}, {}] but the limits are [{}, {}]",
                    using,
                    coverage.min(),
                    coverage.max(),
                    limits.min(),
                    limits.max()
                ),
            });
        }
    }

    Ok((p.density(&grid, using_p)?, q.density(&grid, using_q)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::NormalDist1D;
    use approx::abs_diff_eq;

    fn normal(mean: f64, std_dev: f64, limits: Limits<f64>) -> Pdf<f64> {
        Pdf::from_capability(NormalDist1D::new(mean, std_dev).unwrap(), limits).unwrap()
    }

    #[test]
    fn test_kld() {
        let limits = Limits::new((-10.0, 10.0)).unwrap();

        let p = normal(0.0, 1.0, limits);
        let q = normal(1.0, 2.0, limits);

        assert_eq!(calculate_kld(&p, &p, &limits, 0.01).unwrap(), 0.0);

        // Analytic values are 0.63933 and 1.88539 bits, the latter loses its far tail to the floor.
        assert!(abs_diff_eq!(
            calculate_kld(&p, &q, &limits, 0.01).unwrap(),
            0.6393262397777386,
            epsilon = 1e-6
        ));
        assert!(abs_diff_eq!(
            calculate_kld(&q, &p, &limits, 0.01).unwrap(),
            1.8845825950359762,
            epsilon = 1e-6
        ));

        assert!(matches!(
            calculate_kld(&p, &q, &limits, 0.0),
            Err(QproxError::Domain { .. })
        ));
        assert!(calculate_kld(&p, &q, &limits, f64::NAN).is_err());
    }

    #[test]
    fn test_rmse() {
        let limits = Limits::new((-5.0, 5.0)).unwrap();

        let p = normal(0.0, 1.0, limits);
        let q = normal(0.5, 1.0, limits);

        assert_eq!(calculate_rmse(&p, &p, &limits, 0.01).unwrap(), 0.0);

        let pq = calculate_rmse(&p, &q, &limits, 0.01).unwrap();
        let qp = calculate_rmse(&q, &p, &limits, 0.01).unwrap();

        assert!(pq > 0.0);
        assert_eq!(pq, qp);
    }

    #[test]
    fn test_grid_end() {
        let limits = Limits::new((0.0, 0.7)).unwrap();
        let p = Pdf::from_histogram(
            vec![0.0, 0.35, 0.7],
            vec![0.4, 0.6],
            limits,
        )
        .unwrap();

        assert_eq!(calculate_rmse(&p, &p, &limits, 0.1).unwrap(), 0.0);
        assert_eq!(calculate_kld(&p, &p, &limits, 0.1).unwrap(), 0.0);
    }

    #[test]
    fn test_partial_coverage() {
        let limits = Limits::new((-5.0, 5.0)).unwrap();
        let mut truth = normal(0.0, 1.0, limits);

        let points = (-40..=40).map(|i| i as f64 * 0.1).collect::<Vec<f64>>();
        let (xs, ys) = truth
            .evaluate(&points, RepresentationKind::Truth, false)
            .unwrap();

        let gridded = Pdf::from_gridded(xs, ys, limits).unwrap();

        assert_eq!(
            gridded.coverage(RepresentationKind::Gridded, &limits).unwrap(),
            Limits::new((-4.0, 4.0)).unwrap()
        );

        // Moments are taken over the interpolation range.
        assert!(abs_diff_eq!(
            calculate_moment(&gridded, 0).unwrap(),
            0.9999366575163338,
            epsilon = 1e-4
        ));

        assert!(matches!(
            calculate_kld(&truth, &gridded, &limits, 0.01),
            Err(QproxError::Domain { .. })
        ));
        assert!(matches!(
            calculate_rmse(&gridded, &truth, &limits, 0.01),
            Err(QproxError::Domain { .. })
        ));

        let inner = Limits::new((-4.0, 4.0)).unwrap();

        assert!(calculate_rmse(&gridded, &truth, &inner, 0.01).unwrap() < 1e-3);
    }

    #[test]
    fn test_moments() {
        let limits = Limits::new((-5.0, 5.0)).unwrap();
        let p = normal(0.0, 1.0, limits);

        assert!(abs_diff_eq!(
            calculate_moment(&p, 0).unwrap(),
            0.9999994266968563,
            epsilon = 1e-9
        ));
        assert!(abs_diff_eq!(calculate_moment(&p, 1).unwrap(), 0.0, epsilon = 1e-9));
        assert!(abs_diff_eq!(
            calculate_moment(&p, 2).unwrap(),
            0.999984559501709,
            epsilon = 1e-8
        ));

        assert!(matches!(
            calculate_moment_using(&p, RepresentationKind::MixMod, 1, &limits),
            Err(QproxError::UnsupportedRepresentation { .. })
        ));
    }
}
