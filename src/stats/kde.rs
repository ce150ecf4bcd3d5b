use crate::{
    QproxError, fXX,
    math::{T, exp, maxf, powi, sqrt},
};
use derive_builder::Builder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A strategy that reconstructs a density from a set of samples.
pub trait SampleReconstruction<T>: Debug + Send + Sync {
    /// Evaluates the reconstructed density at `points`.
    fn reconstruct(&self, samples: &[T], points: &[T]) -> Result<Vec<T>, QproxError>;
}

/// A Gaussian kernel density estimate.
///
/// Without a fixed bandwidth, Scott's rule `h = σ̂ n^(-1/5)` is used.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize)]
pub struct GaussianKde<T>
where
    T: fXX,
{
    /// Fixed kernel bandwidth.
    #[builder(default = None, setter(strip_option))]
    pub bandwidth: Option<T>,
}

impl<T> GaussianKde<T>
where
    T: fXX,
{
    /// Computes the kernel bandwidth for the given `samples`.
    pub fn bandwidth_for(&self, samples: &[T]) -> Result<T, QproxError> {
        if let Some(bandwidth) = self.bandwidth {
            if !num_traits::Float::is_finite(bandwidth) || (bandwidth <= T::zero()) {
                return Err(QproxError::Settings(format!(
                    "kde bandwidth={} must be positive and finite",
                    bandwidth
                )));
            }

            return Ok(bandwidth);
        }

        if samples.is_empty() {
            return Err(QproxError::Domain {
                operation: "GaussianKde::bandwidth_for",
                msg: String::from("at least one sample is required"),
            });
        }

        let n = T::from_usize(samples.len()).unwrap();
        let mean = samples.iter().sum::<T>() / n;

        let variance = samples
            .iter()
            .map(|x| powi!(*x - mean, 2))
            .sum::<T>()
            / maxf!(n - T::one(), T::one());

        let bandwidth = sqrt!(variance) * num_traits::Float::powf(n, T!(-0.2));

        if !(bandwidth > T::zero()) {
            return Err(QproxError::Domain {
                operation: "GaussianKde::bandwidth_for",
                msg: String::from("samples have zero spread, cannot estimate a bandwidth"),
            });
        }

        Ok(bandwidth)
    }
}

impl<T> SampleReconstruction<T> for GaussianKde<T>
where
    T: fXX,
{
    fn reconstruct(&self, samples: &[T], points: &[T]) -> Result<Vec<T>, QproxError> {
        if samples.is_empty() {
            return Err(QproxError::Domain {
                operation: "GaussianKde::reconstruct",
                msg: String::from("at least one sample is required"),
            });
        }

        let bandwidth = self.bandwidth_for(samples)?;

        let norm = T::one()
            / (T::from_usize(samples.len()).unwrap() * bandwidth * sqrt!(T::two_pi()));

        Ok(points
            .par_iter()
            .map(|x| {
                samples
                    .iter()
                    .map(|s| {
                        let z = (*x - *s) / bandwidth;

                        exp!(-z * z / T!(2.0))
                    })
                    .sum::<T>()
                    * norm
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{integrate, linspace, QuadratureSettings};
    use approx::abs_diff_eq;

    #[test]
    fn test_gaussian_kde() {
        let samples = linspace(-1.0f64, 1.0, 21);
        let kde = GaussianKde::default();

        // σ̂ = sqrt(0.385) and n^(-1/5) = 21^(-0.2).
        assert!(abs_diff_eq!(
            kde.bandwidth_for(&samples).unwrap(),
            0.385f64.sqrt() * 21.0f64.powf(-0.2),
            epsilon = 1e-12
        ));

        let total = integrate(
            |x| Ok(kde.reconstruct(&samples, &[x])?[0]),
            -6.0,
            6.0,
            &QuadratureSettings::default(),
        )
        .unwrap();

        assert!(abs_diff_eq!(total, 1.0, epsilon = 1e-8));

        let values = kde.reconstruct(&samples, &[-0.5, 0.0, 0.5]).unwrap();

        assert!(abs_diff_eq!(values[0], values[2], epsilon = 1e-12));
        assert!(values[1] > values[0]);

        let fixed = GaussianKdeBuilder::default().bandwidth(0.5).build().unwrap();

        assert_eq!(fixed.bandwidth_for(&samples).unwrap(), 0.5);

        assert!(matches!(
            kde.reconstruct(&[1.0, 1.0, 1.0], &[0.0]),
            Err(QproxError::Domain { .. })
        ));
        assert!(kde.reconstruct(&[], &[0.0]).is_err());
    }
}
