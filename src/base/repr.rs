use crate::{
    QproxError, fXX,
    math::{Interpolant, Scheme, T, abs, maxf, sqrt},
    stats::{Capability, Limits, select_index},
};
use derive_more::{Deref, IntoIterator};
use itertools::zip_eq;
use rand::RngCore;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

/// The kinds of representation a [`Pdf`](`crate::base::Pdf`) can hold, at most one of each.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum RepresentationKind {
    Truth,
    MixMod,
    Samples,
    Quantiles,
    Histogram,
    Gridded,
}

impl RepresentationKind {
    /// Returns true for kinds that are backed by a [`Capability`] (truth and mixture model).
    pub fn is_capability(&self) -> bool {
        matches!(self, RepresentationKind::Truth | RepresentationKind::MixMod)
    }
}

/// How a histogram is turned into an evaluable density.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum HistogramMode {
    /// Bin heights are placed at the bin centres (extended flat to the outer edges) and
    /// interpolated with the active [`Scheme`].
    #[default]
    Smooth,

    /// The density is the piecewise constant bin height, irrespective of the active scheme.
    Step,
}

/// An algebraic data type for all representations.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub enum Representation<T> {
    Gridded(Gridded<T>),
    Histogram(Histogram<T>),
    MixMod(Capability<T>),
    Quantiles(Quantiles<T>),
    Samples(Samples<T>),
    Truth(Capability<T>),
}

impl<T> Representation<T> {
    /// Returns the underlying [`Capability`] for truth and mixture model representations.
    pub fn as_capability(&self) -> Option<&Capability<T>> {
        match self {
            Representation::MixMod(capability) | Representation::Truth(capability) => {
                Some(capability)
            }
            _ => None,
        }
    }

    /// Returns the underlying [`Gridded`] representation.
    pub fn as_gridded(&self) -> Option<&Gridded<T>> {
        match self {
            Representation::Gridded(gridded) => Some(gridded),
            _ => None,
        }
    }

    /// Returns the underlying [`Histogram`] representation.
    pub fn as_histogram(&self) -> Option<&Histogram<T>> {
        match self {
            Representation::Histogram(histogram) => Some(histogram),
            _ => None,
        }
    }

    /// Returns the underlying [`Quantiles`] representation.
    pub fn as_quantiles(&self) -> Option<&Quantiles<T>> {
        match self {
            Representation::Quantiles(quantiles) => Some(quantiles),
            _ => None,
        }
    }

    /// Returns the underlying [`Samples`] representation.
    pub fn as_samples(&self) -> Option<&Samples<T>> {
        match self {
            Representation::Samples(samples) => Some(samples),
            _ => None,
        }
    }

    /// Returns the [`RepresentationKind`] of the representation.
    pub fn kind(&self) -> RepresentationKind {
        match self {
            Representation::Gridded(_) => RepresentationKind::Gridded,
            Representation::Histogram(_) => RepresentationKind::Histogram,
            Representation::MixMod(_) => RepresentationKind::MixMod,
            Representation::Quantiles(_) => RepresentationKind::Quantiles,
            Representation::Samples(_) => RepresentationKind::Samples,
            Representation::Truth(_) => RepresentationKind::Truth,
        }
    }
}

/// A density evaluated on a strictly increasing grid.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Gridded<T> {
    xs: Vec<T>,
    ys: Vec<T>,
}

impl<T> Gridded<T>
where
    T: fXX,
{
    /// Draw `n` samples from the piecewise linear density through the grid points.
    pub(crate) fn draw_samples(
        &self,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<T>, QproxError> {
        let masses = self
            .xs
            .windows(2)
            .zip(self.ys.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / T!(2.0))
            .collect::<Vec<T>>();

        let total = masses.iter().sum::<T>();

        if total <= T::zero() {
            return Err(QproxError::Domain {
                operation: "Gridded::draw_samples",
                msg: String::from("cannot sample from a grid with zero mass"),
            });
        }

        let uniform = Uniform::new(T::zero(), T::one()).unwrap();

        Ok((0..n)
            .map(|_| {
                let idx = select_index(&masses, uniform.sample(rng) * total);

                let (x0, x1) = (self.xs[idx], self.xs[idx + 1]);
                let (a, b) = (self.ys[idx], self.ys[idx + 1]);

                let u = uniform.sample(rng);

                // Invert the cumulative mass of the linear segment, a·t + (b - a)·t²/2.
                let t = if abs!(b - a) <= <T as num_traits::Float>::epsilon() * (a + b) {
                    u
                } else {
                    (sqrt!(a * a + (b - a) * u * (a + b)) - a) / (b - a)
                };

                x0 + t * (x1 - x0)
            })
            .collect())
    }

    /// Returns the [`Interpolant`] through the grid points.
    pub fn interpolant(&self, scheme: Scheme) -> Result<Interpolant<T>, QproxError> {
        Interpolant::new(self.xs.clone(), self.ys.clone(), scheme)
    }

    /// Returns true if the grid contains no points.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Returns the number of grid points.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Create a new [`Gridded`] representation.
    ///
    /// Requires at least two points, finite and strictly increasing `xs` and finite non-negative
    /// `ys`.
    pub fn new(xs: Vec<T>, ys: Vec<T>) -> Result<Self, QproxError> {
        if (xs.len() < 2) || (xs.len() != ys.len()) {
            return Err(QproxError::Domain {
                operation: "Gridded::new",
                msg: format!(
                    "expected at least two points of equal length, got {} xs and {} ys",
                    xs.len(),
                    ys.len()
                ),
            });
        }

        if !is_strictly_increasing(&xs) {
            return Err(QproxError::Domain {
                operation: "Gridded::new",
                msg: String::from("grid points must be finite and strictly increasing"),
            });
        }

        if !ys
            .iter()
            .all(|y| num_traits::Float::is_finite(*y) && (*y >= T::zero()))
        {
            return Err(QproxError::Domain {
                operation: "Gridded::new",
                msg: String::from("grid values must be finite and non-negative"),
            });
        }

        Ok(Self { xs, ys })
    }

    /// Access the grid points.
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// Access the density values at the grid points.
    pub fn ys(&self) -> &[T] {
        &self.ys
    }
}

/// Bin probability masses over `N + 1` strictly increasing bin edges.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Histogram<T> {
    edges: Vec<T>,
    values: Vec<T>,
}

impl<T> Histogram<T>
where
    T: fXX,
{
    /// Returns the range covered by the bins.
    pub fn binrange(&self) -> (T, T) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }

    /// Draw `n` samples by picking a bin proportional to its mass and then a uniform position
    /// within that bin.
    pub(crate) fn draw_samples(
        &self,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<T>, QproxError> {
        let total = self.values.iter().sum::<T>();

        if total <= T::zero() {
            return Err(QproxError::Domain {
                operation: "Histogram::draw_samples",
                msg: String::from("cannot sample from a histogram with zero mass"),
            });
        }

        let uniform = Uniform::new(T::zero(), T::one()).unwrap();

        Ok((0..n)
            .map(|_| {
                let idx = select_index(&self.values, uniform.sample(rng) * total);

                self.edges[idx] + uniform.sample(rng) * (self.edges[idx + 1] - self.edges[idx])
            })
            .collect())
    }

    /// Access the bin edges.
    pub fn edges(&self) -> &[T] {
        &self.edges
    }

    /// Returns the density heights `value / width` of each bin.
    pub fn heights(&self) -> Vec<T> {
        zip_eq(self.edges.windows(2), self.values.iter())
            .map(|(edges, value)| *value / (edges[1] - edges[0]))
            .collect()
    }

    /// Returns the evaluable density of the histogram.
    pub fn interpolant(
        &self,
        mode: HistogramMode,
        scheme: Scheme,
    ) -> Result<Interpolant<T>, QproxError> {
        let heights = self.heights();

        match mode {
            HistogramMode::Smooth => {
                let (minv, maxv) = self.binrange();

                let mut xs = Vec::with_capacity(heights.len() + 2);
                let mut ys = Vec::with_capacity(heights.len() + 2);

                xs.push(minv);
                ys.push(heights[0]);

                for (edges, height) in zip_eq(self.edges.windows(2), heights.iter()) {
                    xs.push((edges[0] + edges[1]) / T!(2.0));
                    ys.push(*height);
                }

                xs.push(maxv);
                ys.push(heights[heights.len() - 1]);

                Interpolant::new(xs, ys, scheme)
            }
            HistogramMode::Step => {
                let mut ys = heights.clone();

                ys.push(heights[heights.len() - 1]);

                Interpolant::new(self.edges.clone(), ys, Scheme::Step)
            }
        }
    }

    /// Returns true if the histogram has no bins.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of bins.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Create a new [`Histogram`].
    ///
    /// Requires `edges.len() == values.len() + 1`, strictly increasing edges and non-negative
    /// finite values.
    pub fn new(edges: Vec<T>, values: Vec<T>) -> Result<Self, QproxError> {
        if values.is_empty() || (edges.len() != values.len() + 1) {
            return Err(QproxError::Domain {
                operation: "Histogram::new",
                msg: format!(
                    "expected N + 1 edges for N > 0 bins, got {} edges and {} values",
                    edges.len(),
                    values.len()
                ),
            });
        }

        if !is_strictly_increasing(&edges) {
            return Err(QproxError::Domain {
                operation: "Histogram::new",
                msg: String::from("bin edges must be finite and strictly increasing"),
            });
        }

        if !values
            .iter()
            .all(|v| num_traits::Float::is_finite(*v) && (*v >= T::zero()))
        {
            return Err(QproxError::Domain {
                operation: "Histogram::new",
                msg: String::from("bin values must be finite and non-negative"),
            });
        }

        Ok(Self { edges, values })
    }

    /// Access the bin probability masses.
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

/// Quantile values at strictly increasing probability levels in `(0, 1)`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Quantiles<T> {
    levels: Vec<T>,
    values: Vec<T>,
}

impl<T> Quantiles<T>
where
    T: fXX,
{
    /// Checks that all quantile values lie strictly within `limits`.
    pub fn check_limits(&self, limits: &Limits<T>) -> Result<(), QproxError> {
        let (minv, maxv) = limits.tuple();

        if (self.values[0] <= minv) || (self.values[self.values.len() - 1] >= maxv) {
            return Err(QproxError::Domain {
                operation: "Quantiles::check_limits",
                msg: format!(
                    "quantile values [{}, {}] must lie strictly within the limits [{}, {}]",
                    self.values[0],
                    self.values[self.values.len() - 1],
                    minv,
                    maxv
                ),
            });
        }

        Ok(())
    }

    /// Returns the control points of the implied density.
    ///
    /// Between consecutive quantiles the density is `Δp / Δx`, placed at the midpoint. At each
    /// quantile the density is interpolated (or, at the outermost quantiles, extrapolated) from the
    /// neighbouring midpoints. The tails carry the masses `p_1` on `[min, x_1]` and `1 - p_N` on
    /// `[x_N, max]`, falling off linearly from the outermost quantiles.
    pub(crate) fn density_control_points(
        &self,
        limits: &Limits<T>,
    ) -> Result<(Vec<T>, Vec<T>), QproxError> {
        if self.values.len() < 2 {
            return Err(QproxError::Domain {
                operation: "Quantiles::density_control_points",
                msg: String::from("at least two quantiles are required to imply a density"),
            });
        }

        self.check_limits(limits)?;

        let (minv, maxv) = limits.tuple();
        let n = self.values.len();

        let (midpoints, slopes): (Vec<T>, Vec<T>) =
            zip_eq(self.values.windows(2), self.levels.windows(2))
                .map(|(x, p)| ((x[0] + x[1]) / T!(2.0), (p[1] - p[0]) / (x[1] - x[0])))
                .unzip();

        let at_quantile = |idx: usize| {
            let m = midpoints.len();

            let (k, fallback) = match idx {
                0 => (0, slopes[0]),
                i if i == n - 1 => (m.saturating_sub(2), slopes[m - 1]),
                i => (i - 1, slopes[i - 1]),
            };

            if m < 2 {
                return fallback;
            }

            let value = slopes[k]
                + (self.values[idx] - midpoints[k]) / (midpoints[k + 1] - midpoints[k])
                    * (slopes[k + 1] - slopes[k]);

            if value > T::zero() { value } else { fallback }
        };

        let mut xs = Vec::with_capacity(2 * n + 3);
        let mut ys = Vec::with_capacity(2 * n + 3);

        for (x, y) in tail_control_points(self.values[0], minv, at_quantile(0), self.levels[0])
            .into_iter()
            .rev()
        {
            xs.push(x);
            ys.push(y);
        }

        for idx in 0..n {
            xs.push(self.values[idx]);
            ys.push(at_quantile(idx));

            if idx < n - 1 {
                xs.push(midpoints[idx]);
                ys.push(slopes[idx]);
            }
        }

        for (x, y) in tail_control_points(
            self.values[n - 1],
            maxv,
            at_quantile(n - 1),
            T::one() - self.levels[n - 1],
        ) {
            xs.push(x);
            ys.push(y);
        }

        Ok((xs, ys))
    }

    /// Draw `n` samples by inverting the piecewise linear CDF through `(min, 0)`, the quantile
    /// points and `(max, 1)`.
    pub(crate) fn draw_samples(
        &self,
        n: usize,
        limits: &Limits<T>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<T>, QproxError> {
        self.check_limits(limits)?;

        let (minv, maxv) = limits.tuple();

        let mut xs = vec![minv];
        let mut ps = vec![T::zero()];

        xs.extend(self.values.iter());
        ps.extend(self.levels.iter());

        xs.push(maxv);
        ps.push(T::one());

        let uniform = Uniform::new(T::zero(), T::one()).unwrap();

        Ok((0..n)
            .map(|_| {
                let u = uniform.sample(rng);
                let idx = (ps.partition_point(|p| *p <= u) - 1).min(ps.len() - 2);

                xs[idx] + (u - ps[idx]) / (ps[idx + 1] - ps[idx]) * (xs[idx + 1] - xs[idx])
            })
            .collect())
    }

    /// Returns true if there are no quantiles.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of quantiles.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Access the probability levels.
    pub fn levels(&self) -> &[T] {
        &self.levels
    }

    /// Create a new [`Quantiles`] representation.
    ///
    /// Requires equal, non-zero lengths, strictly increasing levels in `(0, 1)` and finite,
    /// strictly increasing values.
    pub fn new(levels: Vec<T>, values: Vec<T>) -> Result<Self, QproxError> {
        if levels.is_empty() || (levels.len() != values.len()) {
            return Err(QproxError::Domain {
                operation: "Quantiles::new",
                msg: format!(
                    "expected equal non-zero lengths, got {} levels and {} values",
                    levels.len(),
                    values.len()
                ),
            });
        }

        if !is_strictly_increasing(&levels)
            || (levels[0] <= T::zero())
            || (levels[levels.len() - 1] >= T::one())
        {
            return Err(QproxError::Domain {
                operation: "Quantiles::new",
                msg: String::from("levels must be strictly increasing within (0, 1)"),
            });
        }

        if !is_strictly_increasing(&values) {
            return Err(QproxError::Domain {
                operation: "Quantiles::new",
                msg: String::from("quantile values must be finite and strictly increasing"),
            });
        }

        Ok(Self { levels, values })
    }

    /// Access the quantile values.
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

/// A non-empty set of finite draws.
#[derive(Clone, Debug, Deref, Deserialize, IntoIterator, PartialEq, Serialize)]
pub struct Samples<T>(#[into_iterator(owned, ref)] Vec<T>);

impl<T> Samples<T>
where
    T: fXX,
{
    /// Create a new [`Samples`] representation.
    pub fn new(samples: Vec<T>) -> Result<Self, QproxError> {
        if samples.is_empty() {
            return Err(QproxError::Domain {
                operation: "Samples::new",
                msg: String::from("at least one sample is required"),
            });
        }

        if !samples.iter().all(|x| num_traits::Float::is_finite(*x)) {
            return Err(QproxError::Domain {
                operation: "Samples::new",
                msg: String::from("samples must be finite"),
            });
        }

        Ok(Self(samples))
    }
}

/// Returns the tail control points between an outermost `quantile` and the `limit`, ordered away
/// from the quantile.
///
/// The density falls off linearly from `density` so that the tail holds `mass`. If a linear
/// fall-off to zero fits within the tail, the density is zero beyond it.
fn tail_control_points<T>(quantile: T, limit: T, density: T, mass: T) -> Vec<(T, T)>
where
    T: fXX,
{
    let width = abs!(limit - quantile);
    let base = T!(2.0) * mass / density;

    let cutoff = if limit < quantile {
        quantile - base
    } else {
        quantile + base
    };

    if (base < width) && (cutoff != limit) {
        vec![(cutoff, T::zero()), (limit, T::zero())]
    } else {
        vec![(
            limit,
            maxf!(T!(2.0) * mass / width - density, T::zero()),
        )]
    }
}

fn is_strictly_increasing<T>(values: &[T]) -> bool
where
    T: fXX,
{
    values.iter().all(|x| num_traits::Float::is_finite(*x))
        && values.windows(2).all(|pair| pair[0] < pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::abs_diff_eq;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_quantiles() {
        let limits = Limits::new((-3.0f64, 3.0)).unwrap();
        let quantiles = Quantiles::new(vec![0.25, 0.5, 0.75], vec![-1.0, 0.0, 1.0]).unwrap();

        let (xs, ys) = quantiles.density_control_points(&limits).unwrap();

        assert_eq!(xs, vec![-3.0, -1.0, -0.5, 0.0, 0.5, 1.0, 3.0]);
        assert_eq!(ys, vec![0.0, 0.25, 0.25, 0.25, 0.25, 0.25, 0.0]);

        // The left tail is wider than a linear fall-off to zero needs.
        let (xs, ys) = quantiles
            .density_control_points(&Limits::new((-5.0, 3.0)).unwrap())
            .unwrap();

        assert_eq!(&xs[..3], &[-5.0, -3.0, -1.0]);
        assert_eq!(&ys[..3], &[0.0, 0.0, 0.25]);

        let interpolant = Interpolant::new(xs, ys, Scheme::Linear).unwrap();

        assert!(abs_diff_eq!(interpolant.integrate(-5.0, -1.0).unwrap(), 0.25, epsilon = 1e-15));
        assert!(abs_diff_eq!(interpolant.integrate(1.0, 3.0).unwrap(), 0.25, epsilon = 1e-15));
        assert!(abs_diff_eq!(interpolant.integrate(-5.0, 3.0).unwrap(), 1.0, epsilon = 1e-15));

        assert!(matches!(
            quantiles.check_limits(&Limits::new((-1.0, 3.0)).unwrap()),
            Err(QproxError::Domain { .. })
        ));
        assert!(
            Quantiles::new(vec![0.5], vec![0.0])
                .unwrap()
                .density_control_points(&limits)
                .is_err()
        );

        assert!(matches!(
            Quantiles::new(vec![0.25, 0.5], vec![0.0]),
            Err(QproxError::Domain { .. })
        ));
        assert!(Quantiles::new(vec![0.0, 0.5], vec![0.0, 1.0]).is_err());
        assert!(Quantiles::new(vec![0.5, 0.25], vec![0.0, 1.0]).is_err());
        assert!(Quantiles::new(vec![0.25, 0.5], vec![1.0, 1.0]).is_err());

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let samples = quantiles.draw_samples(20000, &limits, &mut rng).unwrap();

        let below = samples.iter().filter(|x| **x < -1.0).count() as f64 / 20000.0;
        let center = samples.iter().filter(|x| x.abs() < 1.0).count() as f64 / 20000.0;

        assert!(samples.iter().all(|x| limits.contains(*x)));
        assert!(abs_diff_eq!(below, 0.25, epsilon = 0.02));
        assert!(abs_diff_eq!(center, 0.5, epsilon = 0.02));
    }

    #[test]
    fn test_histogram() {
        let histogram = Histogram::new(vec![0.0f64, 1.0, 3.0], vec![0.2, 0.8]).unwrap();

        assert_eq!(histogram.heights(), vec![0.2, 0.4]);
        assert_eq!(histogram.binrange(), (0.0, 3.0));

        let step = histogram
            .interpolant(HistogramMode::Step, Scheme::Linear)
            .unwrap();

        assert_eq!(step.evaluate(0.5).unwrap(), 0.2);
        assert_eq!(step.evaluate(2.0).unwrap(), 0.4);
        assert!(abs_diff_eq!(step.integrate(0.0, 3.0).unwrap(), 1.0, epsilon = 1e-14));

        let smooth = histogram
            .interpolant(HistogramMode::Smooth, Scheme::Linear)
            .unwrap();

        assert_eq!(smooth.control_points().0, &[0.0, 0.5, 2.0, 3.0]);
        assert!(abs_diff_eq!(smooth.evaluate(0.25).unwrap(), 0.2, epsilon = 1e-15));
        assert!(abs_diff_eq!(smooth.evaluate(1.25).unwrap(), 0.3, epsilon = 1e-15));

        assert!(matches!(
            Histogram::new(vec![0.0f64, 1.0], vec![0.2, 0.8]),
            Err(QproxError::Domain { .. })
        ));
        assert!(Histogram::new(vec![0.0f64, 1.0, 1.0], vec![0.2, 0.8]).is_err());
        assert!(Histogram::new(vec![0.0f64, 1.0, 2.0], vec![-0.2, 0.8]).is_err());

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let samples = histogram.draw_samples(20000, &mut rng).unwrap();
        let first = samples.iter().filter(|x| **x < 1.0).count() as f64 / 20000.0;

        assert!(samples.iter().all(|x| (0.0..=3.0).contains(x)));
        assert!(abs_diff_eq!(first, 0.2, epsilon = 0.02));

        let empty = Histogram::new(vec![0.0f64, 1.0], vec![0.0]).unwrap();

        assert!(empty.draw_samples(1, &mut rng).is_err());
    }

    #[test]
    fn test_gridded() {
        let gridded = Gridded::new(vec![0.0f64, 1.0, 2.0], vec![0.0, 1.0, 0.0]).unwrap();

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let samples = gridded.draw_samples(20000, &mut rng).unwrap();

        // The triangle has CDF x²/2 on [0, 1].
        let below = samples.iter().filter(|x| **x < 0.5).count() as f64 / 20000.0;

        assert!(abs_diff_eq!(below, 0.125, epsilon = 0.015));
        assert!(samples.iter().all(|x| (0.0..=2.0).contains(x)));

        assert!(Gridded::new(vec![0.0f64], vec![1.0]).is_err());
        assert!(Gridded::new(vec![0.0f64, 0.0], vec![1.0, 1.0]).is_err());
        assert!(Gridded::new(vec![0.0f64, 1.0], vec![-1.0, 1.0]).is_err());
        assert!(
            Gridded::new(vec![0.0f64, 1.0], vec![0.0, 0.0])
                .unwrap()
                .draw_samples(1, &mut rng)
                .is_err()
        );
    }

    #[test]
    fn test_samples() {
        let samples = Samples::new(vec![1.0f64, 2.0, 3.0]).unwrap();

        assert_eq!(samples.len(), 3);
        assert_eq!(samples.iter().sum::<f64>(), 6.0);

        assert!(Samples::<f64>::new(vec![]).is_err());
        assert!(Samples::new(vec![1.0f64, f64::NAN]).is_err());

        assert!(RepresentationKind::Truth.is_capability());
        assert!(!RepresentationKind::Samples.is_capability());
    }
}
