use crate::{
    fXX,
    math::{T, sqrt},
};

/// The error function.
pub fn erf<T>(x: T) -> T
where
    T: fXX,
{
    T!(statrs::function::erf::erf(x.as_f64()))
}

/// The complementary error function.
pub fn erfc<T>(x: T) -> T
where
    T: fXX,
{
    T!(statrs::function::erf::erfc(x.as_f64()))
}

/// The cumulative distribution function of the standard normal distribution.
pub fn standard_normal_cdf<T>(x: T) -> T
where
    T: fXX,
{
    // Using erfc on the negated argument keeps the lower tail accurate.
    T!(0.5) * erfc(-x / sqrt!(T!(2.0)))
}

/// The inverse of [`standard_normal_cdf`].
///
/// Returns `-∞` / `+∞` for `p = 0` / `p = 1` and NaN outside of `[0, 1]`.
pub fn standard_normal_inverse_cdf<T>(p: T) -> T
where
    T: fXX,
{
    if (p < T::zero()) || (p > T::one()) || num_traits::Float::is_nan(p) {
        return T::nan();
    } else if p == T::zero() {
        return T::neg_infinity();
    } else if p == T::one() {
        return T::infinity();
    }

    let value = -std::f64::consts::SQRT_2 * statrs::function::erf::erfc_inv(2.0 * p.as_f64());

    T!(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::abs_diff_eq;

    #[test]
    fn test_standard_normal() {
        assert!(abs_diff_eq!(standard_normal_cdf(0.0f64), 0.5, epsilon = 1e-15));
        assert!(abs_diff_eq!(
            standard_normal_cdf(1.0f64),
            0.8413447460685429,
            epsilon = 1e-12
        ));
        assert!(abs_diff_eq!(
            standard_normal_cdf(-5.0f64),
            2.8665157186802404e-7,
            epsilon = 1e-16
        ));

        assert!(abs_diff_eq!(
            standard_normal_inverse_cdf(0.975f64),
            1.959963984540054,
            epsilon = 1e-9
        ));
        assert!(abs_diff_eq!(
            standard_normal_inverse_cdf(0.5f64),
            0.0,
            epsilon = 1e-12
        ));

        assert!(standard_normal_inverse_cdf(0.0f64).is_infinite());
        assert!(standard_normal_inverse_cdf(1.5f64).is_nan());

        assert!(abs_diff_eq!(erf(0.5f32), 0.5204999, epsilon = 1e-6));
        assert!(abs_diff_eq!(erfc(0.5f64) + erf(0.5f64), 1.0, epsilon = 1e-15));
    }
}
