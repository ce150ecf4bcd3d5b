//! Numerical routines: special functions, interpolation and quadrature.
//!
//! # Interpolation
//!
//! An [`Interpolant`] is built over a set of strictly increasing control points and is evaluated
//! according to a [`Scheme`]. Only [`Scheme::Nearest`] is defined outside of the control point
//! range (it clamps to the boundary values), any other scheme returns an
//! [`Extrapolation`](`crate::QproxError::Extrapolation`) error.
//!
//! # Quadrature
//!
//! [`integrate`] is an adaptive Simpson quadrature with a recursion budget that is configured by
//! [`QuadratureSettings`]. Integrals over interpolants are split at the interpolant knots so that
//! each sub-interval is smooth.

mod interp;
mod quadrature;
mod special;

pub use interp::{Interpolant, Scheme};
pub use quadrature::{
    QuadratureSettings, QuadratureSettingsBuilder, gauss_legendre, integrate,
    integrate_with_breakpoints, linspace, uniform_grid,
};
pub use special::{erf, erfc, standard_normal_cdf, standard_normal_inverse_cdf};

/// A shorthand for converting constants to type `T`.
macro_rules! T {
    ($value: expr) => {
        T::from_f64($value).unwrap()
    };
}

macro_rules! abs {
    ($value: expr) => {
        num_traits::Float::abs($value)
    };
}

macro_rules! exp {
    ($value: expr) => {
        num_traits::Float::exp($value)
    };
}

macro_rules! ln {
    ($value: expr) => {
        num_traits::Float::ln($value)
    };
}

macro_rules! log2 {
    ($value: expr) => {
        num_traits::Float::log2($value)
    };
}

macro_rules! maxf {
    ($value_a: expr, $value_b: expr) => {
        num_traits::Float::max($value_a, $value_b)
    };
}

macro_rules! minf {
    ($value_a: expr, $value_b: expr) => {
        num_traits::Float::min($value_a, $value_b)
    };
}

macro_rules! powi {
    ($value: expr, $integer: expr) => {
        num_traits::Float::powi($value, $integer)
    };
}

macro_rules! sqrt {
    ($value: expr) => {
        num_traits::Float::sqrt($value)
    };
}

pub(crate) use T;
pub(crate) use abs;
pub(crate) use exp;
pub(crate) use ln;
pub(crate) use log2;
pub(crate) use maxf;
pub(crate) use minf;
pub(crate) use powi;
pub(crate) use sqrt;
