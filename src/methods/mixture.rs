use crate::{
    QproxError, fXX,
    math::{T, abs, exp, ln, maxf, powi},
    stats::{Capability, CompositeDist1D, NormalDist1D},
};
use derive_builder::Builder;
use log::{debug, trace};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A strategy that fits a finite mixture model to samples.
pub trait MixtureFitter<T>: Debug + Send + Sync {
    /// Fits a mixture with `n_components` components to `samples`.
    ///
    /// The returned [`Capability`] is normalized.
    fn fit(&self, samples: &[T], n_components: usize) -> Result<Capability<T>, QproxError>;
}

/// Expectation-maximization for a one-dimensional Gaussian mixture.
///
/// Components are initialized deterministically at evenly spaced sample quantiles with the sample
/// variance and equal weights, hence a fit to the same samples always yields the same result.
#[derive(Builder, Clone, Debug, Deserialize, Serialize)]
pub struct GaussianMixtureEm<T>
where
    T: fXX,
{
    /// Maximum number of EM iterations before the fit is declared to have failed.
    #[builder(default = 1000)]
    pub max_iterations: usize,

    /// Convergence threshold on the relative change of the log-likelihood.
    #[builder(default = T!(1e-10))]
    pub tolerance: T,

    /// Lower bound of each component variance, relative to the sample variance.
    #[builder(default = T!(1e-6))]
    pub variance_floor: T,
}

impl<T> Default for GaussianMixtureEm<T>
where
    T: fXX,
{
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: T!(1e-10),
            variance_floor: T!(1e-6),
        }
    }
}

impl<T> MixtureFitter<T> for GaussianMixtureEm<T>
where
    T: fXX,
{
    fn fit(&self, samples: &[T], n_components: usize) -> Result<Capability<T>, QproxError> {
        if n_components == 0 {
            return Err(QproxError::Fit {
                msg: String::from("at least one component is required"),
            });
        }

        if samples.len() < n_components {
            return Err(QproxError::Fit {
                msg: format!(
                    "{} samples cannot constrain {} components",
                    samples.len(),
                    n_components
                ),
            });
        }

        let n = samples.len();
        let nt = T::from_usize(n).unwrap();

        let mean = samples.iter().sum::<T>() / nt;
        let variance = samples.iter().map(|x| powi!(*x - mean, 2)).sum::<T>() / nt;

        if !(variance > T::zero()) {
            return Err(QproxError::Fit {
                msg: String::from("samples have zero spread"),
            });
        }

        let floor = variance * self.variance_floor;

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mut means = (0..n_components)
            .map(|j| sorted[((2 * j + 1) * n / (2 * n_components)).min(n - 1)])
            .collect::<Vec<T>>();
        let mut variances = vec![variance; n_components];
        let mut weights = vec![T::one() / T::from_usize(n_components).unwrap(); n_components];

        let mut responsibilities = DMatrix::<T>::zeros(n, n_components);
        let mut previous = T::neg_infinity();

        for iteration in 0..self.max_iterations {
            // E-step, with the log-sum-exp trick for each sample.
            let mut log_likelihood = T::zero();

            for (i, x) in samples.iter().enumerate() {
                let mut row_max = T::neg_infinity();

                for j in 0..n_components {
                    let value = ln!(weights[j])
                        - ln!(T::two_pi() * variances[j]) / T!(2.0)
                        - powi!(*x - means[j], 2) / (T!(2.0) * variances[j]);

                    responsibilities[(i, j)] = value;
                    row_max = maxf!(row_max, value);
                }

                let lse = row_max
                    + ln!(
                        (0..n_components)
                            .map(|j| exp!(responsibilities[(i, j)] - row_max))
                            .sum::<T>()
                    );

                for j in 0..n_components {
                    responsibilities[(i, j)] = exp!(responsibilities[(i, j)] - lse);
                }

                log_likelihood += lse;
            }

            // M-step.
            for j in 0..n_components {
                let column = responsibilities.column(j);
                let nj = column.sum();

                if !(nj > <T as num_traits::Float>::epsilon() * nt) {
                    return Err(QproxError::Fit {
                        msg: format!("component {} collapsed at iteration {}", j, iteration),
                    });
                }

                means[j] = column
                    .iter()
                    .zip(samples.iter())
                    .map(|(r, x)| *r * *x)
                    .sum::<T>()
                    / nj;

                variances[j] = maxf!(
                    column
                        .iter()
                        .zip(samples.iter())
                        .map(|(r, x)| *r * powi!(*x - means[j], 2))
                        .sum::<T>()
                        / nj,
                    floor
                );

                weights[j] = nj / nt;
            }

            trace!(
                "GaussianMixtureEm::fit: iteration={} log_likelihood={}",
                iteration, log_likelihood
            );

            if abs!(log_likelihood - previous) <= self.tolerance * abs!(log_likelihood) {
                debug!(
                    "GaussianMixtureEm::fit: converged after {} iterations (log_likelihood={})",
                    iteration + 1,
                    log_likelihood
                );

                let components = means
                    .iter()
                    .zip(variances.iter())
                    .map(|(mean, variance)| {
                        NormalDist1D::new(*mean, num_traits::Float::sqrt(*variance))
                    })
                    .collect::<Result<Vec<Capability<T>>, QproxError>>()?;

                return CompositeDist1D::new(components, weights);
            }

            previous = log_likelihood;
        }

        Err(QproxError::Fit {
            msg: format!("no convergence within {} iterations", self.max_iterations),
        })
    }
}
