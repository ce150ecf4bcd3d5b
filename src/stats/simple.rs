use crate::{
    QproxError, fXX,
    math::{T, exp, sqrt, standard_normal_cdf, standard_normal_inverse_cdf},
    stats::{Capability, ContinuousDistribution},
};
use rand::RngCore;
use rand_distr::{Distribution, StandardNormal, Uniform};
use serde::{Deserialize, Serialize};

/// A normal distribution with mean `mean` and standard deviation `std_dev`.
///
/// ```
/// # use qprox::stats::{ContinuousDistribution, NormalDist1D};
/// let normal = NormalDist1D::<f64>::new(1.0, 2.0).unwrap();
///
/// assert!((normal.cdf(1.0) - 0.5).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NormalDist1D<T> {
    mean: T,
    std_dev: T,
}

impl<T> NormalDist1D<T>
where
    T: fXX,
{
    /// The mean of the distribution.
    pub fn mean(&self) -> T {
        self.mean
    }

    /// Create a new [`NormalDist1D`] wrapped within a [`Capability`].
    #[allow(clippy::new_ret_no_self)]
    pub fn new(mean: T, std_dev: T) -> Result<Capability<T>, QproxError> {
        if !num_traits::Float::is_finite(mean) {
            return Err(QproxError::Domain {
                operation: "NormalDist1D::new",
                msg: format!("mean={} must be finite", mean),
            });
        }

        if !num_traits::Float::is_finite(std_dev) || (std_dev <= T::zero()) {
            return Err(QproxError::Domain {
                operation: "NormalDist1D::new",
                msg: format!("std_dev={} must be positive and finite", std_dev),
            });
        }

        Ok(Capability::Normal(Self { mean, std_dev }))
    }

    /// The standard deviation of the distribution.
    pub fn std_dev(&self) -> T {
        self.std_dev
    }
}

impl<T> ContinuousDistribution<T> for NormalDist1D<T>
where
    T: fXX,
{
    fn cdf(&self, x: T) -> T {
        standard_normal_cdf((x - self.mean) / self.std_dev)
    }

    fn density(&self, x: T) -> T {
        let z = (x - self.mean) / self.std_dev;

        exp!(-z * z / T!(2.0)) / (self.std_dev * sqrt!(T::two_pi()))
    }

    fn draw_sample(&self, rng: &mut dyn RngCore) -> T {
        let sample: f64 = StandardNormal.sample(rng);

        self.mean + self.std_dev * T!(sample)
    }

    fn inverse_cdf(&self, p: T) -> T {
        self.mean + self.std_dev * standard_normal_inverse_cdf(p)
    }
}

/// A uniform distribution over the interval `[min, max]`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UniformDist1D<T>((T, T));

impl<T> UniformDist1D<T>
where
    T: fXX,
{
    /// Create a new [`UniformDist1D`] wrapped within a [`Capability`].
    #[allow(clippy::new_ret_no_self)]
    pub fn new(minmax: (T, T)) -> Result<Capability<T>, QproxError> {
        let (minv, maxv) = minmax;

        if !(num_traits::Float::is_finite(minv) && num_traits::Float::is_finite(maxv))
            || (minv >= maxv)
        {
            return Err(QproxError::Domain {
                operation: "UniformDist1D::new",
                msg: format!("interval [{}, {}] must be finite and non-empty", minv, maxv),
            });
        }

        Ok(Capability::Uniform(Self(minmax)))
    }

    /// Returns the interval bounds.
    pub fn range(&self) -> (T, T) {
        self.0
    }
}

impl<T> ContinuousDistribution<T> for UniformDist1D<T>
where
    T: fXX,
{
    fn cdf(&self, x: T) -> T {
        let (minv, maxv) = self.0;

        if x <= minv {
            T::zero()
        } else if x >= maxv {
            T::one()
        } else {
            (x - minv) / (maxv - minv)
        }
    }

    fn density(&self, x: T) -> T {
        let (minv, maxv) = self.0;

        if (minv <= x) && (x <= maxv) {
            T::one() / (maxv - minv)
        } else {
            T::zero()
        }
    }

    fn draw_sample(&self, rng: &mut dyn RngCore) -> T {
        let uniform = Uniform::new_inclusive(self.0.0, self.0.1).unwrap();

        uniform.sample(rng)
    }

    fn inverse_cdf(&self, p: T) -> T {
        let (minv, maxv) = self.0;

        if (p < T::zero()) || (p > T::one()) || num_traits::Float::is_nan(p) {
            T::nan()
        } else {
            minv + p * (maxv - minv)
        }
    }
}
