//! # Core building blocks of the **qprox** crate.
//!
//! # Representations
//!
//! A density can be described by one of the following [`Representation`] variants:
//! - [`Truth`](`Representation::Truth`) An exact [`Capability`](`crate::stats::Capability`).
//! - [`MixMod`](`Representation::MixMod`) A mixture model fitted to samples.
//! - [`Samples`] A set of finite draws.
//! - [`Quantiles`] Quantile values at strictly increasing probability levels.
//! - [`Histogram`] Bin probability masses over strictly increasing bin edges.
//! - [`Gridded`] A density evaluated on a grid.
//!
//! # PDFs
//!
//! A [`Pdf`] is seeded with a single representation and derives, caches and evaluates all others on
//! demand. All derived representations are kept within a [`RepresentationStore`] together with
//! their [`Provenance`].
//!
//! # Ensembles
//!
//! An [`Ensemble`] batches operations over many [`Pdf`] objects with identical representation
//! shape and returns matrix-shaped results.

mod ensbl;
mod pdf;
mod repr;
mod store;

pub use ensbl::*;
pub use pdf::*;
pub use repr::*;
pub use store::*;
