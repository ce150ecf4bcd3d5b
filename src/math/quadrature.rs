use crate::{
    QproxError, fXX,
    math::{T, abs, minf},
};
use derive_builder::Builder;
use log::warn;
use num_traits::{AsPrimitive, Float};
use serde::{Deserialize, Serialize};

/// Settings for the adaptive Simpson quadrature.
#[derive(Builder, Clone, Debug, Deserialize, Serialize)]
pub struct QuadratureSettings<T>
where
    T: fXX,
{
    /// Maximum recursion depth per panel. Exhausting this budget returns the best available
    /// estimate and emits a warning.
    #[builder(default = 40)]
    pub max_depth: usize,

    /// Number of initial panels for [`integrate`], protects against narrow features that fall
    /// between the first few sampling points.
    #[builder(default = 32)]
    pub min_intervals: usize,

    /// Absolute error tolerance for the whole integration range.
    #[builder(default = default_tolerance::<T>())]
    pub tolerance: T,
}

impl<T> Default for QuadratureSettings<T>
where
    T: fXX,
{
    fn default() -> Self {
        Self {
            max_depth: 40,
            min_intervals: 32,
            tolerance: default_tolerance::<T>(),
        }
    }
}

/// ε^(2/3), i.e. ~4e-11 for f64 and ~2e-5 for f32.
fn default_tolerance<T>() -> T
where
    T: fXX,
{
    Float::powf(<T as Float>::epsilon(), T!(2.0 / 3.0))
}

/// Integrates `f` over `[a, b]` using an adaptive Simpson quadrature.
///
/// The range is first split into [`QuadratureSettings::min_intervals`] panels.
pub fn integrate<T, F>(
    f: F,
    a: T,
    b: T,
    settings: &QuadratureSettings<T>,
) -> Result<T, QproxError>
where
    T: fXX,
    F: Fn(T) -> Result<T, QproxError>,
{
    if a == b {
        return Ok(T::zero());
    } else if a > b {
        return Ok(-integrate(f, b, a, settings)?);
    }

    let panels = settings.min_intervals.max(1);
    let width = (b - a) / T::from_usize(panels).unwrap();

    let breakpoints = (1..panels)
        .map(|idx| a + width * T::from_usize(idx).unwrap())
        .collect::<Vec<T>>();

    integrate_with_breakpoints(f, a, b, &breakpoints, settings)
}

/// Integrates `f` over `[a, b]`, treating each interval between consecutive `breakpoints` as a
/// separate panel. Breakpoints outside of `(a, b)` are ignored, the remaining ones must be sorted.
pub fn integrate_with_breakpoints<T, F>(
    f: F,
    a: T,
    b: T,
    breakpoints: &[T],
    settings: &QuadratureSettings<T>,
) -> Result<T, QproxError>
where
    T: fXX,
    F: Fn(T) -> Result<T, QproxError>,
{
    if !(Float::is_finite(a) && Float::is_finite(b)) {
        return Err(QproxError::Domain {
            operation: "integrate",
            msg: format!("integration bounds [{}, {}] must be finite", a, b),
        });
    }

    if a == b {
        return Ok(T::zero());
    } else if a > b {
        return Ok(-integrate_with_breakpoints(f, b, a, breakpoints, settings)?);
    }

    let mut nodes = Vec::with_capacity(breakpoints.len() + 2);

    nodes.push(a);
    nodes.extend(breakpoints.iter().filter(|x| (a < **x) && (**x < b)));
    nodes.push(b);

    let total_width = b - a;
    let mut exhausted = false;
    let mut result = T::zero();

    for pair in nodes.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);

        if hi <= lo {
            continue;
        }

        let tolerance = settings.tolerance * (hi - lo) / total_width;

        let fa = f(lo)?;
        let fb = f(hi)?;
        let (m, fm, whole) = simpson(&f, lo, fa, hi, fb)?;

        result += adaptive_simpson(
            &f,
            (lo, fa),
            (m, fm),
            (hi, fb),
            whole,
            tolerance,
            settings.max_depth,
            &mut exhausted,
        )?;
    }

    if exhausted {
        warn!(
            "integrate: quadrature budget (max_depth={}) exhausted over [{}, {}]",
            settings.max_depth, a, b
        );
    }

    Ok(result)
}

/// Integrates `f` over `[a, b]` with a fixed 5-point Gauss-Legendre rule.
///
/// The rule is exact for polynomials up to degree 9 and never evaluates `f` at the bounds, which
/// makes it suitable for piecewise integrands that are discontinuous at the piece boundaries.
pub fn gauss_legendre<T, F>(f: F, a: T, b: T) -> Result<T, QproxError>
where
    T: fXX,
    F: Fn(T) -> Result<T, QproxError>,
{
    let center = (a + b) / T!(2.0);
    let half = (b - a) / T!(2.0);

    GAUSS_LEGENDRE_5
        .iter()
        .try_fold(T::zero(), |acc, (node, weight)| {
            Ok(acc + T!(*weight) * f(center + half * T!(*node))?)
        })
        .map(|sum: T| sum * half)
}

/// Nodes and weights of the 5-point Gauss-Legendre rule on [-1, 1].
#[allow(clippy::excessive_precision)]
const GAUSS_LEGENDRE_5: [(f64, f64); 5] = [
    (-0.906179845938663992797627, 0.236926885056189087514264),
    (-0.538469310105683091036314, 0.478628670499366468041292),
    (0.0, 0.568888888888888888888889),
    (0.538469310105683091036314, 0.478628670499366468041292),
    (0.906179845938663992797627, 0.236926885056189087514264),
];

/// Returns `n` evenly spaced points spanning `[lo, hi]` (both included).
pub fn linspace<T>(lo: T, hi: T, n: usize) -> Vec<T>
where
    T: fXX,
{
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / T::from_usize(n - 1).unwrap();

            (0..n)
                .map(|idx| {
                    if idx == n - 1 {
                        hi
                    } else {
                        lo + step * T::from_usize(idx).unwrap()
                    }
                })
                .collect()
        }
    }
}

/// Returns the grid `lo + k·dx` for all `k` with `lo + k·dx ≤ hi`.
pub fn uniform_grid<T>(lo: T, hi: T, dx: T) -> Result<Vec<T>, QproxError>
where
    T: fXX,
{
    if !Float::is_finite(dx) || (dx <= T::zero()) {
        return Err(QproxError::Domain {
            operation: "uniform_grid",
            msg: format!("grid step dx={} must be positive and finite", dx),
        });
    }

    if !(Float::is_finite(lo) && Float::is_finite(hi)) || (hi <= lo) {
        return Err(QproxError::Domain {
            operation: "uniform_grid",
            msg: format!("grid range [{}, {}] must have a positive width", lo, hi),
        });
    }

    // Guard against (hi - lo) / dx landing just below an integer.
    let steps = Float::floor((hi - lo) / dx * (T::one() + Float::sqrt(<T as Float>::epsilon())));
    let count = AsPrimitive::<usize>::as_(steps) + 1;

    // The fudge above may place the last point a rounding error beyond hi.
    Ok((0..count)
        .map(|idx| minf!(lo + dx * T::from_usize(idx).unwrap(), hi))
        .collect())
}

fn simpson<T, F>(f: &F, a: T, fa: T, b: T, fb: T) -> Result<(T, T, T), QproxError>
where
    T: fXX,
    F: Fn(T) -> Result<T, QproxError>,
{
    let m = (a + b) / T!(2.0);
    let fm = f(m)?;

    Ok((m, fm, (b - a) / T!(6.0) * (fa + T!(4.0) * fm + fb)))
}

#[allow(clippy::too_many_arguments)]
fn adaptive_simpson<T, F>(
    f: &F,
    (a, fa): (T, T),
    (m, fm): (T, T),
    (b, fb): (T, T),
    whole: T,
    tolerance: T,
    depth: usize,
    exhausted: &mut bool,
) -> Result<T, QproxError>
where
    T: fXX,
    F: Fn(T) -> Result<T, QproxError>,
{
    let (lm, flm, left) = simpson(f, a, fa, m, fm)?;
    let (rm, frm, right) = simpson(f, m, fm, b, fb)?;

    let delta = left + right - whole;

    if abs!(delta) <= T!(15.0) * tolerance {
        return Ok(left + right + delta / T!(15.0));
    }

    if depth == 0 {
        *exhausted = true;

        return Ok(left + right + delta / T!(15.0));
    }

    let half = tolerance / T!(2.0);

    Ok(adaptive_simpson(
        f,
        (a, fa),
        (lm, flm),
        (m, fm),
        left,
        half,
        depth - 1,
        exhausted,
    )? + adaptive_simpson(
        f,
        (m, fm),
        (rm, frm),
        (b, fb),
        right,
        half,
        depth - 1,
        exhausted,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::exp;
    use approx::abs_diff_eq;

    #[test]
    fn test_integrate() {
        let settings = QuadratureSettings::<f64>::default();

        let gauss = |x: f64| Ok(exp!(-x * x / 2.0) / (2.0 * std::f64::consts::PI).sqrt());

        assert!(abs_diff_eq!(
            integrate(gauss, -8.0, 8.0, &settings).unwrap(),
            1.0,
            epsilon = 1e-9
        ));

        assert!(abs_diff_eq!(
            integrate(|x: f64| Ok(x * x), 0.0, 3.0, &settings).unwrap(),
            9.0,
            epsilon = 1e-12
        ));

        assert!(abs_diff_eq!(
            integrate(|x: f64| Ok(x * x), 3.0, 0.0, &settings).unwrap(),
            -9.0,
            epsilon = 1e-12
        ));

        // A narrow peak away from the first sampling points.
        let narrow = |x: f64| {
            Ok(exp!(-(x - 0.3) * (x - 0.3) / 2.0e-4) / (2.0e-4 * std::f64::consts::PI).sqrt())
        };

        assert!(abs_diff_eq!(
            integrate(narrow, -5.0, 5.0, &settings).unwrap(),
            1.0,
            epsilon = 1e-8
        ));

        let kink = |x: f64| Ok((x - 1.0).abs());

        assert!(abs_diff_eq!(
            integrate_with_breakpoints(kink, 0.0, 2.0, &[1.0], &settings).unwrap(),
            1.0,
            epsilon = 1e-14
        ));

        assert!(abs_diff_eq!(
            gauss_legendre(|x: f64| Ok(x.powi(9) + x), 0.0, 2.0).unwrap(),
            104.4,
            epsilon = 1e-10
        ));

        let failing = |x: f64| {
            if x > 1.0 {
                Err(QproxError::Domain {
                    operation: "test",
                    msg: String::from("out of range"),
                })
            } else {
                Ok(x)
            }
        };

        assert!(integrate(failing, 0.0, 2.0, &settings).is_err());
    }

    #[test]
    fn test_grids() {
        let grid = linspace(-1.0f64, 1.0, 5);

        assert_eq!(grid, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert!(linspace(0.0f64, 1.0, 0).is_empty());

        let grid = uniform_grid(-5.0f64, 5.0, 0.01).unwrap();

        assert_eq!(grid.len(), 1001);
        assert!(abs_diff_eq!(*grid.last().unwrap(), 5.0, epsilon = 1e-9));

        // 7 * 0.1 rounds to 0.7000000000000001.
        let grid = uniform_grid(0.0f64, 0.7, 0.1).unwrap();

        assert_eq!(grid.len(), 8);
        assert_eq!(*grid.last().unwrap(), 0.7);
        assert!(grid.iter().all(|x| *x <= 0.7));

        assert!(uniform_grid(0.0f64, 1.0, 0.0).is_err());
        assert!(uniform_grid(0.0f64, 1.0, -0.1).is_err());
        assert!(uniform_grid(1.0f64, 1.0, 0.1).is_err());
    }
}
