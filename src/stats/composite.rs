use crate::{
    QproxError, fXX,
    math::{T, abs, maxf, minf},
    stats::{Capability, ContinuousDistribution, select_index},
};
use rand::RngCore;
use rand_distr::{Distribution, Uniform};

/// Maximum number of bisection steps for [`CompositeDist1D::inverse_cdf`].
const BISECTION_STEPS: usize = 200;

/// A weighted mixture of capabilities, `f(x) = Σ w_i f_i(x)` with `Σ w_i = 1`.
///
/// Mixture model fits are represented as a composite of normal distributions.
#[derive(Clone, Debug)]
pub struct CompositeDist1D<T> {
    components: Vec<Capability<T>>,
    weights: Vec<T>,
}

impl<T> CompositeDist1D<T>
where
    T: fXX,
{
    /// Access the mixture components.
    pub fn components(&self) -> &[Capability<T>] {
        &self.components
    }

    /// Create a new [`CompositeDist1D`] wrapped within a [`Capability`].
    ///
    /// The weights are normalized to sum to one, they must be non-negative with a positive sum.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(
        components: Vec<Capability<T>>,
        weights: Vec<T>,
    ) -> Result<Capability<T>, QproxError> {
        if components.is_empty() || (components.len() != weights.len()) {
            return Err(QproxError::Shape {
                operation: "CompositeDist1D::new",
                msg: format!(
                    "expected matching non-empty components and weights, got {} and {}",
                    components.len(),
                    weights.len()
                ),
            });
        }

        if weights
            .iter()
            .any(|w| !num_traits::Float::is_finite(*w) || (*w < T::zero()))
        {
            return Err(QproxError::Domain {
                operation: "CompositeDist1D::new",
                msg: String::from("weights must be non-negative and finite"),
            });
        }

        let total = weights.iter().sum::<T>();

        if total <= T::zero() {
            return Err(QproxError::Domain {
                operation: "CompositeDist1D::new",
                msg: String::from("weights must have a positive sum"),
            });
        }

        Ok(Capability::Composite(Self {
            components,
            weights: weights.into_iter().map(|w| w / total).collect(),
        }))
    }

    /// Access the normalized mixture weights.
    pub fn weights(&self) -> &[T] {
        &self.weights
    }
}

impl<T> ContinuousDistribution<T> for CompositeDist1D<T>
where
    T: fXX,
{
    fn cdf(&self, x: T) -> T {
        self.components
            .iter()
            .zip(self.weights.iter())
            .map(|(component, weight)| *weight * component.cdf(x))
            .sum()
    }

    fn density(&self, x: T) -> T {
        self.components
            .iter()
            .zip(self.weights.iter())
            .map(|(component, weight)| *weight * component.density(x))
            .sum()
    }

    fn draw_sample(&self, rng: &mut dyn RngCore) -> T {
        let uniform = Uniform::new(T::zero(), T::one()).unwrap();

        let idx = select_index(&self.weights, uniform.sample(rng));

        self.components[idx].draw_sample(rng)
    }

    fn inverse_cdf(&self, p: T) -> T {
        if (p < T::zero()) || (p > T::one()) || num_traits::Float::is_nan(p) {
            return T::nan();
        }

        // The mixture quantile is bracketed by the component quantiles.
        let (mut lo, mut hi) = self
            .components
            .iter()
            .zip(self.weights.iter())
            .filter(|(_, weight)| **weight > T::zero())
            .map(|(component, _)| component.inverse_cdf(p))
            .fold((T::infinity(), T::neg_infinity()), |(lo, hi), x| {
                (minf!(lo, x), maxf!(hi, x))
            });

        if !(num_traits::Float::is_finite(lo) && num_traits::Float::is_finite(hi)) || (lo == hi) {
            return lo;
        }

        for _ in 0..BISECTION_STEPS {
            let mid = (lo + hi) / T!(2.0);

            if self.cdf(mid) < p {
                lo = mid;
            } else {
                hi = mid;
            }

            if abs!(hi - lo) <= <T as num_traits::Float>::epsilon() * maxf!(abs!(mid), T::one()) {
                break;
            }
        }

        (lo + hi) / T!(2.0)
    }
}
