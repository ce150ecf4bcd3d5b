use crate::{
    QproxError, fXX,
    math::{T, abs, gauss_legendre, powi},
};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Interpolation schemes for an [`Interpolant`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Scheme {
    /// Piecewise linear interpolation.
    #[default]
    Linear,

    /// Nearest control point, the only scheme that is defined outside of the control point range
    /// where it clamps to the boundary values.
    Nearest,

    /// Piecewise cubic Hermite interpolation with Fritsch-Carlson slopes, preserves monotonicity
    /// and non-negativity of the control values.
    Pchip,

    /// Left-continuous step function, each control value holds until the next control point.
    Step,
}

/// A one-dimensional interpolant over strictly increasing control points.
#[derive(Clone, Debug)]
pub struct Interpolant<T> {
    scheme: Scheme,

    /// Hermite slopes, only populated for [`Scheme::Pchip`].
    slopes: Vec<T>,

    xs: Vec<T>,
    ys: Vec<T>,
}

impl<T> Interpolant<T>
where
    T: fXX,
{
    /// Returns the control points `(xs, ys)`.
    pub fn control_points(&self) -> (&[T], &[T]) {
        (&self.xs, &self.ys)
    }

    /// Returns the control point range `[min x, max x]`.
    pub fn domain(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Evaluates the interpolant at a single position.
    pub fn evaluate(&self, x: T) -> Result<T, QproxError> {
        let n = self.xs.len();
        let (minv, maxv) = self.domain();

        if Float::is_nan(x) {
            return Err(QproxError::Domain {
                operation: "Interpolant::evaluate",
                msg: String::from("evaluation point is NaN"),
            });
        }

        if (x < minv) || (x > maxv) {
            return match self.scheme {
                Scheme::Nearest => Ok(if x < minv { self.ys[0] } else { self.ys[n - 1] }),
                _ => Err(QproxError::Extrapolation {
                    operation: "Interpolant::evaluate",
                    scheme: self.scheme,
                    x: x.as_f64(),
                    minv: minv.as_f64(),
                    maxv: maxv.as_f64(),
                }),
            };
        }

        // Index k such that xs[k] <= x <= xs[k + 1].
        let k = self
            .xs
            .partition_point(|value| *value <= x)
            .saturating_sub(1)
            .min(n - 2);

        let (x_0, x_1) = (self.xs[k], self.xs[k + 1]);
        let (y_0, y_1) = (self.ys[k], self.ys[k + 1]);

        let value = match self.scheme {
            Scheme::Linear => y_0 + (x - x_0) / (x_1 - x_0) * (y_1 - y_0),
            Scheme::Nearest => {
                if (x - x_0) <= (x_1 - x) {
                    y_0
                } else {
                    y_1
                }
            }
            Scheme::Pchip => {
                let h = x_1 - x_0;
                let t = (x - x_0) / h;

                let h00 = T!(2.0) * powi!(t, 3) - T!(3.0) * powi!(t, 2) + T::one();
                let h10 = powi!(t, 3) - T!(2.0) * powi!(t, 2) + t;
                let h01 = T!(3.0) * powi!(t, 2) - T!(2.0) * powi!(t, 3);
                let h11 = powi!(t, 3) - powi!(t, 2);

                h00 * y_0 + h10 * h * self.slopes[k] + h01 * y_1 + h11 * h * self.slopes[k + 1]
            }
            Scheme::Step => {
                if x == maxv {
                    self.ys[n - 1]
                } else {
                    y_0
                }
            }
        };

        Ok(value)
    }

    /// Evaluates the interpolant at multiple positions, the first failure aborts the evaluation.
    pub fn evaluate_many(&self, points: &[T]) -> Result<Vec<T>, QproxError> {
        points.iter().map(|x| self.evaluate(*x)).collect()
    }

    /// Integrates the interpolant over `[a, b]`.
    pub fn integrate(&self, a: T, b: T) -> Result<T, QproxError> {
        self.moment(a, b, 0)
    }

    /// Computes `∫ xⁿ s(x) dx` over `[a, b]` where `s` is the interpolant.
    ///
    /// The integral is split at the knots of the interpolant and each piece is integrated with a
    /// 5-point Gauss-Legendre rule, which is exact for `n ≤ 6`.
    pub fn moment(&self, a: T, b: T, n: i32) -> Result<T, QproxError> {
        if !(Float::is_finite(a) && Float::is_finite(b)) {
            return Err(QproxError::Domain {
                operation: "Interpolant::moment",
                msg: format!("integration bounds [{}, {}] must be finite", a, b),
            });
        }

        if a == b {
            return Ok(T::zero());
        } else if a > b {
            return Ok(-self.moment(b, a, n)?);
        }

        let (minv, maxv) = self.domain();

        if self.scheme != Scheme::Nearest && ((a < minv) || (b > maxv)) {
            return Err(QproxError::Extrapolation {
                operation: "Interpolant::moment",
                scheme: self.scheme,
                x: if a < minv { a.as_f64() } else { b.as_f64() },
                minv: minv.as_f64(),
                maxv: maxv.as_f64(),
            });
        }

        let mut nodes = vec![a];

        nodes.extend(self.xs.iter().filter(|x| (a < **x) && (**x < b)));

        if self.scheme == Scheme::Nearest {
            nodes.extend(
                self.xs
                    .windows(2)
                    .map(|pair| (pair[0] + pair[1]) / T!(2.0))
                    .filter(|x| (a < *x) && (*x < b)),
            );

            nodes.sort_by(|lhs, rhs| lhs.total_cmp(rhs));
        }

        nodes.push(b);

        nodes.windows(2).try_fold(T::zero(), |acc, pair| {
            Ok(acc + gauss_legendre(|x| Ok(powi!(x, n) * self.evaluate(x)?), pair[0], pair[1])?)
        })
    }

    /// Create a new [`Interpolant`] from control points.
    pub fn new(xs: Vec<T>, ys: Vec<T>, scheme: Scheme) -> Result<Self, QproxError> {
        if xs.len() != ys.len() {
            return Err(QproxError::Domain {
                operation: "Interpolant::new",
                msg: format!(
                    "control point lengths differ (xs={}, ys={})",
                    xs.len(),
                    ys.len()
                ),
            });
        }

        if xs.len() < 2 {
            return Err(QproxError::Domain {
                operation: "Interpolant::new",
                msg: String::from("at least two control points are required"),
            });
        }

        if xs
            .iter()
            .chain(ys.iter())
            .any(|value| !Float::is_finite(*value))
        {
            return Err(QproxError::Domain {
                operation: "Interpolant::new",
                msg: String::from("control points must be finite"),
            });
        }

        if xs.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(QproxError::Domain {
                operation: "Interpolant::new",
                msg: String::from("control point positions must be strictly increasing"),
            });
        }

        let slopes = match scheme {
            Scheme::Pchip => pchip_slopes(&xs, &ys),
            _ => Vec::new(),
        };

        Ok(Self {
            scheme,
            slopes,
            xs,
            ys,
        })
    }

    /// Returns the interpolation scheme.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }
}

/// Fritsch-Carlson slopes as used by the common PCHIP implementations.
fn pchip_slopes<T>(xs: &[T], ys: &[T]) -> Vec<T>
where
    T: fXX,
{
    let n = xs.len();

    let h = xs
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .collect::<Vec<T>>();

    let delta = ys
        .windows(2)
        .zip(h.iter())
        .map(|(pair, width)| (pair[1] - pair[0]) / *width)
        .collect::<Vec<T>>();

    if n == 2 {
        return vec![delta[0]; 2];
    }

    let mut slopes = vec![T::zero(); n];

    for k in 1..n - 1 {
        if delta[k - 1] * delta[k] > T::zero() {
            let w_1 = T!(2.0) * h[k] + h[k - 1];
            let w_2 = h[k] + T!(2.0) * h[k - 1];

            slopes[k] = (w_1 + w_2) / (w_1 / delta[k - 1] + w_2 / delta[k]);
        }
    }

    slopes[0] = pchip_end_slope(h[0], h[1], delta[0], delta[1]);
    slopes[n - 1] = pchip_end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);

    slopes
}

/// Shape-preserving one-sided three-point slope estimate at a boundary.
fn pchip_end_slope<T>(h_0: T, h_1: T, delta_0: T, delta_1: T) -> T
where
    T: fXX,
{
    let slope = ((T!(2.0) * h_0 + h_1) * delta_0 - h_0 * delta_1) / (h_0 + h_1);

    if Float::signum(slope) != Float::signum(delta_0) || delta_0 == T::zero() {
        T::zero()
    } else if (Float::signum(delta_0) != Float::signum(delta_1))
        && (abs!(slope) > abs!(T!(3.0) * delta_0))
    {
        T!(3.0) * delta_0
    } else {
        slope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{abs_diff_eq, ulps_eq};

    #[test]
    fn test_interpolant_schemes() {
        let xs = vec![0.0f64, 1.0, 2.0, 4.0];
        let ys = vec![0.0f64, 1.0, 0.5, 0.5];

        let linear = Interpolant::new(xs.clone(), ys.clone(), Scheme::Linear).unwrap();

        assert!(ulps_eq!(linear.evaluate(0.5).unwrap(), 0.5));
        assert!(ulps_eq!(linear.evaluate(1.5).unwrap(), 0.75));
        assert!(ulps_eq!(linear.evaluate(4.0).unwrap(), 0.5));
        assert!(matches!(
            linear.evaluate(4.5),
            Err(QproxError::Extrapolation {
                scheme: Scheme::Linear,
                ..
            })
        ));

        let nearest = Interpolant::new(xs.clone(), ys.clone(), Scheme::Nearest).unwrap();

        assert!(ulps_eq!(nearest.evaluate(0.4).unwrap(), 0.0));
        assert!(ulps_eq!(nearest.evaluate(0.6).unwrap(), 1.0));
        assert!(ulps_eq!(nearest.evaluate(-3.0).unwrap(), 0.0));
        assert!(ulps_eq!(nearest.evaluate(10.0).unwrap(), 0.5));

        let step = Interpolant::new(xs.clone(), ys.clone(), Scheme::Step).unwrap();

        assert!(ulps_eq!(step.evaluate(0.99).unwrap(), 0.0));
        assert!(ulps_eq!(step.evaluate(1.0).unwrap(), 1.0));
        assert!(ulps_eq!(step.evaluate(4.0).unwrap(), 0.5));
        assert!(step.evaluate(-0.1).is_err());

        let pchip = Interpolant::new(xs.clone(), ys.clone(), Scheme::Pchip).unwrap();

        // Passes through all control points and does not overshoot the local maximum.
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert!(abs_diff_eq!(pchip.evaluate(*x).unwrap(), *y, epsilon = 1e-12));
        }

        assert!(
            (0..=100)
                .map(|idx| pchip.evaluate(idx as f64 * 0.04).unwrap())
                .all(|value| (-1e-12..=1.0 + 1e-12).contains(&value))
        );

        assert!(linear.evaluate(f64::NAN).is_err());
    }

    #[test]
    fn test_interpolant_integrals() {
        let xs = vec![0.0f64, 1.0, 2.0, 4.0];
        let ys = vec![0.0f64, 1.0, 0.5, 0.5];

        let linear = Interpolant::new(xs.clone(), ys.clone(), Scheme::Linear).unwrap();

        assert!(abs_diff_eq!(
            linear.integrate(0.0, 4.0).unwrap(),
            0.5 + 0.75 + 1.0,
            epsilon = 1e-12
        ));

        assert!(abs_diff_eq!(
            linear.integrate(4.0, 0.0).unwrap(),
            -2.25,
            epsilon = 1e-12
        ));

        assert!(linear.integrate(-1.0, 4.0).is_err());

        let step = Interpolant::new(xs.clone(), ys.clone(), Scheme::Step).unwrap();

        assert!(abs_diff_eq!(
            step.integrate(0.0, 4.0).unwrap(),
            0.0 + 1.0 + 1.0,
            epsilon = 1e-12
        ));

        let nearest = Interpolant::new(xs, ys, Scheme::Nearest).unwrap();

        // [-1, 0.5] -> 0, [0.5, 1.5] -> 1, [1.5, 3.0] -> 0.5, [3.0, 5.0] -> 0.5
        assert!(abs_diff_eq!(
            nearest.integrate(-1.0, 5.0).unwrap(),
            1.0 + 0.75 + 1.0,
            epsilon = 1e-12
        ));

        let triangle =
            Interpolant::new(vec![0.0f64, 1.0, 2.0], vec![0.0, 1.0, 0.0], Scheme::Linear).unwrap();

        assert!(abs_diff_eq!(
            triangle.moment(0.0, 2.0, 1).unwrap(),
            1.0,
            epsilon = 1e-12
        ));

        assert!(Interpolant::new(vec![0.0f64, 0.0], vec![1.0, 1.0], Scheme::Linear).is_err());
        assert!(Interpolant::new(vec![0.0f64], vec![1.0], Scheme::Linear).is_err());
        assert!(Interpolant::new(vec![0.0f64, 1.0], vec![1.0], Scheme::Linear).is_err());
    }
}
