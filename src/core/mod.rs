//! Core polarimetric processing modules

pub mod compact;
pub mod decomposition;
pub mod eigen;
pub mod matrix;
pub mod processor;
pub mod span;
pub mod window;

// Re-export main types
pub use compact::{CompactMode, StokesParameters, StokesVector};
pub use decomposition::{
    ColorSlot, Decomposition, HuynenOutputs, InputBasis, OutputBand, PixelInput, Scaling,
    ScatteringPowers,
};
pub use eigen::{eigen_decomposition, hermitian_determinant, EigenDecomposition};
pub use matrix::{ComplexMatrix, Matrix2, Matrix3, Matrix4, ScatterMatrix};
pub use processor::{DecompositionImage, DecompositionParams, DecompositionProcessor, TargetBand};
pub use span::{scale_db, SpanCache, SpanMinMax};
pub use window::{WindowBounds, WindowEstimator};
