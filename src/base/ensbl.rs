use crate::{
    QproxError, fXX,
    base::{Pdf, PdfSettings, Representation, RepresentationKind},
    math::Scheme,
    stats::{Capability, Limits},
};
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

/// A batch of [`Pdf`] objects sharing the same seed kind, limits and representation shape.
///
/// Batch operations run over all members in parallel and return matrix-shaped results with one row
/// per member. The first failing member aborts the operation with a
/// [`Member`](`QproxError::Member`) error that carries its index.
///
/// ```
/// # use qprox::{
/// #     base::{Ensemble, Representation, RepresentationKind},
/// #     stats::{Limits, NormalDist1D},
/// # };
/// let payload = (0..4)
///     .map(|i| Representation::Truth(NormalDist1D::new(i as f64, 1.0).unwrap()))
///     .collect();
///
/// let mut ensemble = Ensemble::new(
///     4,
///     RepresentationKind::Truth,
///     payload,
///     Limits::new((-5.0, 8.0)).unwrap(),
///     false,
/// )
/// .unwrap();
///
/// assert_eq!(ensemble.quantize(9).unwrap().shape(), (4, 9));
/// ```
#[derive(Clone, Debug)]
pub struct Ensemble<T>
where
    T: fXX,
{
    kind: RepresentationKind,
    members: Vec<Pdf<T>>,
}

impl<T> Ensemble<T>
where
    T: fXX,
{
    /// Evaluates each member at `points` after switching to `scheme`, if given.
    pub fn approximate(
        &mut self,
        points: &[T],
        using: RepresentationKind,
        scheme: Option<Scheme>,
    ) -> Result<DMatrix<T>, QproxError> {
        let rows = self.for_each_member(|pdf| {
            pdf.approximate(points, using, scheme)
                .map(|(_, values)| values)
        })?;

        Ok(stack_rows(&rows, points.len()))
    }

    /// Evaluates each member at `points`, returns an `N × points.len()` matrix.
    pub fn evaluate(
        &mut self,
        points: &[T],
        using: RepresentationKind,
        norm: bool,
    ) -> Result<DMatrix<T>, QproxError> {
        let rows = self.for_each_member(|pdf| {
            pdf.evaluate(points, using, norm)
                .map(|(_, values)| values)
        })?;

        Ok(stack_rows(&rows, points.len()))
    }

    /// Computes `n` bin masses for each member over `binrange` (defaults to the limits), returns an
    /// `N × n` matrix.
    pub fn histogramize(
        &mut self,
        n: usize,
        binrange: Option<Limits<T>>,
    ) -> Result<DMatrix<T>, QproxError> {
        let rows = self.for_each_member(|pdf| {
            pdf.histogramize(n, binrange)
                .map(|histogram| histogram.values().to_vec())
        })?;

        Ok(stack_rows(&rows, n))
    }

    /// Integrates each member over `bounds`.
    pub fn integrate(
        &mut self,
        bounds: Limits<T>,
        using: RepresentationKind,
    ) -> Result<DVector<T>, QproxError> {
        let values = self.for_each_member(|pdf| pdf.integrate(bounds, using))?;

        Ok(DVector::from_vec(values))
    }

    /// Returns true if the ensemble contains no members, which never holds after construction.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the seed kind shared by all members.
    pub fn kind(&self) -> RepresentationKind {
        self.kind
    }

    /// Returns the number of members in the ensemble.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns the member at `index`.
    pub fn member(&self, index: usize) -> Option<&Pdf<T>> {
        self.members.get(index)
    }

    /// Returns all members.
    pub fn members(&self) -> &[Pdf<T>] {
        &self.members
    }

    /// Fits a Gaussian mixture with `n_components` components to each member.
    ///
    /// Member `i` draws any required samples from an independent stream seeded with `seed + i`.
    pub fn mix_mod_fit(
        &mut self,
        n_components: usize,
        seed: u64,
    ) -> Result<Vec<Capability<T>>, QproxError> {
        self.for_each_indexed_member(|index, pdf| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(index as u64));

            pdf.mix_mod_fit(n_components, &mut rng).cloned()
        })
    }

    /// Create a new [`Ensemble`] from `size` seed representations of the same `kind`.
    ///
    /// Quantile levels, histogram edges and grid points must be identical across all members.
    pub fn new(
        size: usize,
        kind: RepresentationKind,
        payload: Vec<Representation<T>>,
        limits: Limits<T>,
        verbose: bool,
    ) -> Result<Self, QproxError> {
        Self::with_settings(
            size,
            kind,
            payload,
            limits,
            PdfSettings {
                verbose,
                ..Default::default()
            },
        )
    }

    /// Computes `n` quantiles for each member, returns an `N × n` matrix of quantile values.
    ///
    /// The quantile levels are shared by all members.
    pub fn quantize(&mut self, n: usize) -> Result<DMatrix<T>, QproxError> {
        let rows = self.for_each_member(|pdf| {
            pdf.quantize(n, None)
                .map(|quantiles| quantiles.values().to_vec())
        })?;

        Ok(stack_rows(&rows, n))
    }

    /// Draw `n` samples from each member, returns an `N × n` matrix.
    ///
    /// Member `i` uses an independent stream seeded with `seed + i`.
    pub fn sample(
        &mut self,
        n: usize,
        using: RepresentationKind,
        seed: u64,
    ) -> Result<DMatrix<T>, QproxError> {
        let rows = self.for_each_indexed_member(|index, pdf| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(index as u64));

            pdf.sample(n, using, false, &mut rng)
                .map(|samples| samples.to_vec())
        })?;

        Ok(stack_rows(&rows, n))
    }

    /// Create a new [`Ensemble`], see [`Ensemble::new`], with `settings` applied to every member.
    pub fn with_settings(
        size: usize,
        kind: RepresentationKind,
        payload: Vec<Representation<T>>,
        limits: Limits<T>,
        settings: PdfSettings<T>,
    ) -> Result<Self, QproxError> {
        if size == 0 {
            return Err(QproxError::Shape {
                operation: "Ensemble::new",
                msg: String::from("an ensemble requires at least one member"),
            });
        }

        if payload.len() != size {
            return Err(QproxError::Shape {
                operation: "Ensemble::new",
                msg: format!("expected {} representations, got {}", size, payload.len()),
            });
        }

        if let Some((index, representation)) = payload
            .iter()
            .enumerate()
            .find(|(_, representation)| representation.kind() != kind)
        {
            return Err(QproxError::Shape {
                operation: "Ensemble::new",
                msg: format!(
                    "member {} is a {:?} representation, expected {:?}",
                    index,
                    representation.kind(),
                    kind
                ),
            });
        }

        if let Some(index) = (1..size).find(|idx| !same_shape(&payload[0], &payload[*idx])) {
            return Err(QproxError::Shape {
                operation: "Ensemble::new",
                msg: format!("member {} differs in shape from member 0", index),
            });
        }

        let verbose = settings.verbose;

        let members = payload
            .into_iter()
            .enumerate()
            .map(|(index, representation)| {
                Pdf::with_settings(representation, limits, settings.clone()).map_err(|error| {
                    QproxError::Member {
                        index,
                        error: Box::new(error),
                    }
                })
            })
            .collect::<Result<Vec<Pdf<T>>, QproxError>>()?;

        if verbose {
            info!("ensemble_new\n\tmembers = {}\n\tkind = {:?}", size, kind);
        } else {
            debug!("ensemble_new\n\tmembers = {}\n\tkind = {:?}", size, kind);
        }

        Ok(Self { kind, members })
    }
}

impl<T> Ensemble<T>
where
    T: fXX,
{
    fn for_each_indexed_member<R, F>(&mut self, op: F) -> Result<Vec<R>, QproxError>
    where
        F: Fn(usize, &mut Pdf<T>) -> Result<R, QproxError> + Send + Sync,
        R: Send,
    {
        self.members
            .par_iter_mut()
            .enumerate()
            .map(|(index, pdf)| {
                op(index, pdf).map_err(|error| QproxError::Member {
                    index,
                    error: Box::new(error),
                })
            })
            .collect()
    }

    fn for_each_member<R, F>(&mut self, op: F) -> Result<Vec<R>, QproxError>
    where
        F: Fn(&mut Pdf<T>) -> Result<R, QproxError> + Send + Sync,
        R: Send,
    {
        self.for_each_indexed_member(|_, pdf| op(pdf))
    }
}

/// Returns true if two representations of the same kind share their shape parameters.
fn same_shape<T>(a: &Representation<T>, b: &Representation<T>) -> bool
where
    T: fXX,
{
    match (a, b) {
        (Representation::Gridded(a), Representation::Gridded(b)) => a.xs() == b.xs(),
        (Representation::Histogram(a), Representation::Histogram(b)) => a.edges() == b.edges(),
        (Representation::Quantiles(a), Representation::Quantiles(b)) => a.levels() == b.levels(),
        _ => true,
    }
}

fn stack_rows<T>(rows: &[Vec<T>], ncols: usize) -> DMatrix<T>
where
    T: fXX,
{
    DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{base::Quantiles, stats::NormalDist1D};
    use approx::abs_diff_eq;

    fn normal_ensemble(size: usize) -> Ensemble<f64> {
        let payload = (0..size)
            .map(|i| {
                Representation::Truth(
                    NormalDist1D::new(i as f64 * 0.1, 1.0 + i as f64 * 0.05).unwrap(),
                )
            })
            .collect();

        Ensemble::new(
            size,
            RepresentationKind::Truth,
            payload,
            Limits::new((-6.0, 7.0)).unwrap(),
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_ensemble() {
        let mut ensemble = normal_ensemble(10);

        assert_eq!(ensemble.len(), 10);
        assert_eq!(ensemble.kind(), RepresentationKind::Truth);

        let points = [-1.0, 0.0, 0.5, 2.0];

        let matrix = ensemble
            .evaluate(&points, RepresentationKind::Quantiles, false)
            .unwrap();

        assert_eq!(matrix.shape(), (10, 4));

        for index in [0, 3, 9] {
            let mut standalone = Pdf::from_capability(
                NormalDist1D::new(index as f64 * 0.1, 1.0 + index as f64 * 0.05).unwrap(),
                Limits::new((-6.0, 7.0)).unwrap(),
            )
            .unwrap();

            let (_, values) = standalone
                .evaluate(&points, RepresentationKind::Quantiles, false)
                .unwrap();

            for (j, value) in values.iter().enumerate() {
                assert!(abs_diff_eq!(matrix[(index, j)], *value, epsilon = 1e-12));
            }
        }

        let matrix = ensemble
            .evaluate(&points, RepresentationKind::Truth, false)
            .unwrap();

        for index in 0..10 {
            let mut standalone = Pdf::from_capability(
                NormalDist1D::new(index as f64 * 0.1, 1.0 + index as f64 * 0.05).unwrap(),
                Limits::new((-6.0, 7.0)).unwrap(),
            )
            .unwrap();

            let (_, values) = standalone
                .evaluate(&points, RepresentationKind::Truth, false)
                .unwrap();

            assert_eq!(matrix.row(index).iter().copied().collect::<Vec<f64>>(), values);
        }

        let masses = ensemble
            .integrate(Limits::new((-6.0, 7.0)).unwrap(), RepresentationKind::Truth)
            .unwrap();

        assert!(masses.iter().all(|mass| abs_diff_eq!(*mass, 1.0, epsilon = 1e-4)));

        let histograms = ensemble.histogramize(13, None).unwrap();

        assert_eq!(histograms.shape(), (10, 13));
        assert!(abs_diff_eq!(histograms.row(0).sum(), 1.0, epsilon = 1e-6));
    }

    #[test]
    fn test_ensemble_sample() {
        let mut ensemble = normal_ensemble(4);
        let mut other = normal_ensemble(4);

        let samples = ensemble.sample(50, RepresentationKind::Truth, 7).unwrap();

        assert_eq!(samples.shape(), (4, 50));
        assert_eq!(samples, other.sample(50, RepresentationKind::Truth, 7).unwrap());
        assert_ne!(samples.row(0), samples.row(1));

        let fits = ensemble.mix_mod_fit(1, 7).unwrap();

        assert_eq!(fits.len(), 4);
        assert!(ensemble.members().iter().all(|pdf| pdf.mix_mod().is_some()));
    }

    #[test]
    fn test_ensemble_errors() {
        let limits = Limits::new((-5.0, 5.0)).unwrap();
        let quantiles = |values: Vec<f64>| {
            Representation::Quantiles(Quantiles::new(vec![0.25, 0.5, 0.75], values).unwrap())
        };

        assert!(matches!(
            Ensemble::<f64>::new(0, RepresentationKind::Quantiles, Vec::new(), limits, false),
            Err(QproxError::Shape { .. })
        ));
        assert!(matches!(
            Ensemble::new(
                2,
                RepresentationKind::Quantiles,
                vec![quantiles(vec![-1.0, 0.0, 1.0])],
                limits,
                false
            ),
            Err(QproxError::Shape { .. })
        ));
        assert!(matches!(
            Ensemble::new(
                1,
                RepresentationKind::Histogram,
                vec![quantiles(vec![-1.0, 0.0, 1.0])],
                limits,
                false
            ),
            Err(QproxError::Shape { .. })
        ));
        assert!(matches!(
            Ensemble::new(
                2,
                RepresentationKind::Quantiles,
                vec![
                    quantiles(vec![-1.0, 0.0, 1.0]),
                    Representation::Quantiles(
                        Quantiles::new(vec![0.2, 0.5, 0.8], vec![-1.0, 0.0, 1.0]).unwrap()
                    )
                ],
                limits,
                false
            ),
            Err(QproxError::Shape { .. })
        ));

        // Member 1 violates the limits.
        assert!(matches!(
            Ensemble::new(
                2,
                RepresentationKind::Quantiles,
                vec![
                    quantiles(vec![-1.0, 0.0, 1.0]),
                    quantiles(vec![-1.0, 0.0, 6.0])
                ],
                limits,
                false
            ),
            Err(QproxError::Member { index: 1, .. })
        ));

        let mut ensemble = Ensemble::new(
            2,
            RepresentationKind::Quantiles,
            vec![
                quantiles(vec![-1.0, 0.0, 1.0]),
                quantiles(vec![-2.0, 0.5, 1.5]),
            ],
            limits,
            false,
        )
        .unwrap();

        assert!(matches!(
            ensemble.evaluate(&[0.0], RepresentationKind::Truth, false),
            Err(QproxError::Member { .. })
        ));

        let values = ensemble
            .evaluate(&[0.0, 0.5], RepresentationKind::Quantiles, false)
            .unwrap();

        assert_eq!(values.shape(), (2, 2));
        assert!(values.iter().all(|value| *value >= 0.0));
    }
}
