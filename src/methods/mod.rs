//! Methods operating on [`Pdf`](`crate::base::Pdf`) objects.
//!
//! - [`metrics`] Distances and moments of PDFs.
//! - [`MixtureFitter`] Fits a mixture model to samples, the default being [`GaussianMixtureEm`].

pub mod metrics;
mod mixture;

pub use mixture::*;
