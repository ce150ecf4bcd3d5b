//! # Continuous distribution capabilities.
//!
//! This module introduces the [`ContinuousDistribution`] trait, the contract that any source of
//! truth for a [`Pdf`](`crate::base::Pdf`) must fulfill: density, CDF, inverse CDF and sampling.
//!
//! All implemented capabilities are summarized within the [`Capability`] ADT:
//! - [`NormalDist1D`] A normal distribution with a given mean and standard deviation.
//! - [`UniformDist1D`] A uniform distribution on a finite interval.
//! - [`CompositeDist1D`] A weighted mixture of other capabilities.
//! - [`Capability::External`] Any user supplied type implementing [`ContinuousDistribution`].
//!
//! Samples are turned back into an evaluable density by a [`SampleReconstruction`] strategy, the
//! default being the Gaussian kernel density estimate [`GaussianKde`].

mod composite;
mod kde;
mod simple;

pub use composite::CompositeDist1D;
pub use kde::{GaussianKde, GaussianKdeBuilder, SampleReconstruction};
pub use simple::{NormalDist1D, UniformDist1D};

use crate::{QproxError, fXX};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, sync::Arc};

/// The capability contract of a continuous scalar distribution.
pub trait ContinuousDistribution<T>: Debug + Send + Sync {
    /// Evaluates the cumulative distribution function at `x`.
    fn cdf(&self, x: T) -> T;

    /// Evaluates the (normalized) density at `x`.
    fn density(&self, x: T) -> T;

    /// Draw a single random sample from the distribution.
    fn draw_sample(&self, rng: &mut dyn RngCore) -> T;

    /// Draw `n` random samples from the distribution.
    fn draw_samples(&self, n: usize, rng: &mut dyn RngCore) -> Vec<T> {
        (0..n).map(|_| self.draw_sample(rng)).collect()
    }

    /// Evaluates the inverse cumulative distribution function at the probability level `p`.
    ///
    /// Returns NaN if the inverse is undefined at `p`.
    fn inverse_cdf(&self, p: T) -> T;
}

/// An algebraic data type for all distribution capabilities.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub enum Capability<T> {
    Composite(CompositeDist1D<T>),
    External(Arc<dyn ContinuousDistribution<T>>),
    Normal(NormalDist1D<T>),
    Uniform(UniformDist1D<T>),
}

impl<T> Capability<T> {
    /// Wraps an externally implemented distribution.
    pub fn external<D>(distribution: D) -> Self
    where
        D: ContinuousDistribution<T> + 'static,
    {
        Capability::External(Arc::new(distribution))
    }
}

impl<T> ContinuousDistribution<T> for Capability<T>
where
    T: fXX,
{
    fn cdf(&self, x: T) -> T {
        match self {
            Capability::Composite(dist) => dist.cdf(x),
            Capability::External(dist) => dist.cdf(x),
            Capability::Normal(dist) => dist.cdf(x),
            Capability::Uniform(dist) => dist.cdf(x),
        }
    }

    fn density(&self, x: T) -> T {
        match self {
            Capability::Composite(dist) => dist.density(x),
            Capability::External(dist) => dist.density(x),
            Capability::Normal(dist) => dist.density(x),
            Capability::Uniform(dist) => dist.density(x),
        }
    }

    fn draw_sample(&self, rng: &mut dyn RngCore) -> T {
        match self {
            Capability::Composite(dist) => dist.draw_sample(rng),
            Capability::External(dist) => dist.draw_sample(rng),
            Capability::Normal(dist) => dist.draw_sample(rng),
            Capability::Uniform(dist) => dist.draw_sample(rng),
        }
    }

    fn inverse_cdf(&self, p: T) -> T {
        match self {
            Capability::Composite(dist) => dist.inverse_cdf(p),
            Capability::External(dist) => dist.inverse_cdf(p),
            Capability::Normal(dist) => dist.inverse_cdf(p),
            Capability::Uniform(dist) => dist.inverse_cdf(p),
        }
    }
}

/// A finite interval `[min, max]` with a positive width.
///
/// Used for evaluation limits, histogram bin ranges and integration bounds.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Limits<T>((T, T));

impl<T> Limits<T>
where
    T: fXX,
{
    /// Returns true if `x` lies within the limits (bounds included).
    pub fn contains(&self, x: T) -> bool {
        (self.min() <= x) && (x <= self.max())
    }

    /// Returns true if `other` lies completely within the limits.
    pub fn contains_limits(&self, other: &Limits<T>) -> bool {
        self.contains(other.min()) && self.contains(other.max())
    }

    /// The maximum value of the limits.
    pub fn max(&self) -> T {
        self.0.1
    }

    /// The minimum value of the limits.
    pub fn min(&self) -> T {
        self.0.0
    }

    /// Create new [`Limits`], fails if either bound is not finite or `min >= max`.
    pub fn new(minmax: (T, T)) -> Result<Self, QproxError> {
        let (minv, maxv) = minmax;

        if !(num_traits::Float::is_finite(minv) && num_traits::Float::is_finite(maxv)) {
            return Err(QproxError::Domain {
                operation: "Limits::new",
                msg: format!("limits [{}, {}] must be finite", minv, maxv),
            });
        }

        if minv >= maxv {
            return Err(QproxError::Domain {
                operation: "Limits::new",
                msg: format!("limits [{}, {}] must have a positive width", minv, maxv),
            });
        }

        Ok(Self(minmax))
    }

    /// Returns the limits as a tuple.
    pub fn tuple(&self) -> (T, T) {
        self.0
    }

    /// The width `max - min`.
    pub fn width(&self) -> T {
        self.0.1 - self.0.0
    }
}

/// Selects an index proportional to `weights` given a uniform value `u` in `[0, total)`.
pub(crate) fn select_index<T>(weights: &[T], u: T) -> usize
where
    T: fXX,
{
    // Here we abuse try_fold to return the index early wrapped within Err().
    match weights
        .iter()
        .enumerate()
        .try_fold(T::zero(), |acc, (idx, weight)| {
            let next_weight = acc + *weight;

            if (u < next_weight) && (*weight > T::zero()) {
                Err(idx)
            } else {
                Ok(next_weight)
            }
        }) {
        Ok(_) => weights
            .iter()
            .rposition(|weight| *weight > T::zero())
            .unwrap_or(weights.len() - 1),
        Err(idx) => idx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits() {
        let limits = Limits::new((-1.0f64, 2.0)).unwrap();

        assert_eq!(limits.width(), 3.0);
        assert!(limits.contains(-1.0));
        assert!(!limits.contains(2.5));
        assert!(limits.contains_limits(&Limits::new((0.0, 1.0)).unwrap()));
        assert!(!limits.contains_limits(&Limits::new((0.0, 3.0)).unwrap()));

        assert!(matches!(
            Limits::new((1.0f64, 1.0)),
            Err(QproxError::Domain { .. })
        ));
        assert!(Limits::new((2.0f64, 1.0)).is_err());
        assert!(Limits::new((f64::NEG_INFINITY, 1.0)).is_err());
    }

    #[test]
    fn test_select_index() {
        let weights = [0.25f64, 0.0, 0.5, 0.25];

        assert_eq!(select_index(&weights, 0.1), 0);
        assert_eq!(select_index(&weights, 0.25), 2);
        assert_eq!(select_index(&weights, 0.8), 3);
        assert_eq!(select_index(&weights, 1.0), 3);

        // Trailing zero weights are never selected.
        assert_eq!(select_index(&[0.5f64, 0.5, 0.0], 1.0), 1);
    }
}
