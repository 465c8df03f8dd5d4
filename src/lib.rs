//! polsar: polarimetric SAR decompositions
//!
//! Turns windowed coherency / covariance matrices into scattering power
//! components, Cloude-Pottier parameters, Huynen parameters and target
//! classes. Image I/O stays outside the crate; sources are consumed through
//! the [`io::TileSource`] trait.

pub mod types;
pub mod io;
pub mod core;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{MatrixType, PolSarError, PolSarResult, RealImage, Rectangle, Unit, EPS};

pub use crate::core::{
    CompactMode, Decomposition, DecompositionImage, DecompositionParams, DecompositionProcessor,
    HuynenOutputs,
};
pub use io::{InMemoryProduct, SourceBand, SourceBandSet, TileSource};
