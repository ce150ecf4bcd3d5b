//! # qprox
//!
//! Compact, lossy approximations of one-dimensional probability density functions.
//!
//! A [`Pdf`](`base::Pdf`) is seeded with exactly one representation (a truth
//! [`Capability`](`stats::Capability`), samples, quantiles, a histogram or an evaluated grid)
//! together with finite evaluation [`Limits`](`stats::Limits`). Further representations are
//! derived on demand and cached, and any of them can be interpolated, evaluated, integrated or
//! sampled:
//!
//! ```
//! # use qprox::{base::{Pdf, RepresentationKind}, stats::{Limits, NormalDist1D}};
//! let limits = Limits::new((-5.0, 5.0)).unwrap();
//! let mut pdf = Pdf::from_capability(NormalDist1D::new(0.0, 1.0).unwrap(), limits).unwrap();
//!
//! let quantiles = pdf.quantize(10, None).unwrap();
//! assert_eq!(quantiles.len(), 10);
//!
//! let (_, values) = pdf
//!     .evaluate(&[-0.5, 0.0, 0.5], RepresentationKind::Quantiles, false)
//!     .unwrap();
//! assert_eq!(values.len(), 3);
//! ```
//!
//! The [`metrics`](`methods::metrics`) module compares PDFs (KLD, RMSE, moments) and an
//! [`Ensemble`](`base::Ensemble`) batches calls over many PDFs that share their representation
//! shape.
#![deny(missing_docs)]

pub mod base;
pub mod math;
pub mod methods;
pub mod stats;

use base::RepresentationKind;
use math::Scheme;
use nalgebra::{RealField, Scalar};
use num_traits::{AsPrimitive, Float, FromPrimitive, float::TotalOrder};
use rand_distr::uniform::SampleUniform;
use std::{
    fmt::{Debug, Display},
    iter::Sum,
};
use thiserror::Error;

/// Errors associated with the **qprox** crate.
///
/// Numerical values are carried as `f64` irrespective of the float type of the failing operation.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum QproxError {
    #[error("{operation}: {msg}")]
    Domain { operation: &'static str, msg: String },
    #[error("{operation}: {x} is outside of the {scheme:?} interpolation range [{minv}, {maxv}]")]
    Extrapolation {
        operation: &'static str,
        scheme: Scheme,
        x: f64,
        minv: f64,
        maxv: f64,
    },
    #[error("mixture fit failed: {msg}")]
    Fit { msg: String },
    #[error("ensemble member {index} failed: {error}")]
    Member {
        index: usize,
        error: Box<QproxError>,
    },
    #[error("invalid settings: {0}")]
    Settings(String),
    #[error("shape mismatch in {operation}: {msg}")]
    Shape { operation: &'static str, msg: String },
    #[error("{operation} cannot use the {kind:?} representation: {msg}")]
    UnsupportedRepresentation {
        operation: &'static str,
        kind: RepresentationKind,
        msg: &'static str,
    },
}

impl QproxError {
    /// Returns the innermost error, unwrapping any [`QproxError::Member`] layers.
    pub fn root(&self) -> &QproxError {
        match self {
            QproxError::Member { error, .. } => error.root(),
            _ => self,
        }
    }
}

/// A trait that describes a generic floating point numbers within the **qprox** crate. In practical
/// terms this trait is only used for the f32/f64 types.
#[allow(non_camel_case_types)]
pub trait fXX:
    'static
    + AsPrimitive<usize>
    + Copy
    + Debug
    + Default
    + Display
    + Float
    + FromPrimitive
    + RealField
    + SampleUniform
    + Scalar
    + Send
    + Sum
    + for<'x> Sum<&'x Self>
    + Sync
    + TotalOrder
{
    /// Returns the value as `f64`, used for error reporting.
    fn as_f64(self) -> f64 {
        num_traits::ToPrimitive::to_f64(&self).unwrap_or(f64::NAN)
    }
}

impl fXX for f32 {}
impl fXX for f64 {}
