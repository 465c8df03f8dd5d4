use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Additive guard used wherever a formula divides by an eigenvalue sum,
/// a trace or another quantity that may vanish on a degenerate pixel.
pub const EPS: f64 = 1.0e-30;

/// Single real-valued raster band (row = y, column = x)
pub type RealImage = Array2<f32>;

/// Rectangle in image pixel coordinates (x = column, y = row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rectangle {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge
    pub fn max_x(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn max_y(&self) -> usize {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.max_x() && y >= self.y && y < self.max_y()
    }

    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    /// Split an image of the given size into tiles of at most `tile_size` x `tile_size`
    pub fn tiles(width: usize, height: usize, tile_size: usize) -> Vec<Rectangle> {
        let mut tiles = Vec::new();
        if tile_size == 0 {
            return tiles;
        }
        for y in (0..height).step_by(tile_size) {
            for x in (0..width).step_by(tile_size) {
                tiles.push(Rectangle::new(
                    x,
                    y,
                    tile_size.min(width - x),
                    tile_size.min(height - y),
                ));
            }
        }
        tiles
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[x={}, y={}, w={}, h={}]", self.x, self.y, self.width, self.height)
    }
}

/// Interpretation of a polarimetric source product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatrixType {
    /// Quad-pol scattering matrix (i/q pairs of HH, HV, VH, VV)
    Full,
    /// Dual-pol 2x2 covariance matrix
    C2,
    /// Compact-pol scattering vector (i/q pairs of RH, RV)
    Compact,
    /// 3x3 covariance matrix (lexicographic basis)
    C3,
    /// 4x4 covariance matrix
    C4,
    /// 3x3 coherency matrix (Pauli basis)
    T3,
    /// 4x4 coherency matrix
    T4,
}

impl MatrixType {
    /// Number of real-valued bands that encode one matrix per pixel
    pub fn band_count(&self) -> usize {
        match self {
            MatrixType::Full => 8,
            MatrixType::C2 | MatrixType::Compact => 4,
            MatrixType::C3 | MatrixType::T3 => 9,
            MatrixType::C4 | MatrixType::T4 => 16,
        }
    }

    /// Whether the source can be reduced to a quad-pol 3x3 matrix
    pub fn is_quad_pol(&self) -> bool {
        !self.is_dual_pol()
    }

    /// Whether the source only carries a 2x2 covariance matrix
    pub fn is_dual_pol(&self) -> bool {
        matches!(self, MatrixType::C2 | MatrixType::Compact)
    }
}

impl fmt::Display for MatrixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixType::Full => write!(f, "FULL"),
            MatrixType::C2 => write!(f, "C2"),
            MatrixType::Compact => write!(f, "COMPACT"),
            MatrixType::C3 => write!(f, "C3"),
            MatrixType::C4 => write!(f, "C4"),
            MatrixType::T3 => write!(f, "T3"),
            MatrixType::T4 => write!(f, "T4"),
        }
    }
}

impl FromStr for MatrixType {
    type Err = PolSarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FULL" | "S2" => Ok(MatrixType::Full),
            "C2" => Ok(MatrixType::C2),
            "COMPACT" | "CP" => Ok(MatrixType::Compact),
            "C3" => Ok(MatrixType::C3),
            "C4" => Ok(MatrixType::C4),
            "T3" => Ok(MatrixType::T3),
            "T4" => Ok(MatrixType::T4),
            _ => Err(PolSarError::InvalidConfig(format!(
                "Unknown matrix type: {}",
                s
            ))),
        }
    }
}

/// Physical unit attached to an output band definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Intensity,
    IntensityDb,
    Amplitude,
    Real,
    Imaginary,
    Degrees,
    Class,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Intensity => "intensity",
            Unit::IntensityDb => "intensity_db",
            Unit::Amplitude => "amplitude",
            Unit::Real => "real",
            Unit::Imaginary => "imaginary",
            Unit::Degrees => "degrees",
            Unit::Class => "class",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for polarimetric processing
#[derive(Debug, thiserror::Error)]
pub enum PolSarError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No output bands selected for {0}")]
    NoOutputBands(String),

    #[error("{decomposition} decomposition does not support {matrix} source products")]
    UnsupportedMatrix {
        decomposition: String,
        matrix: MatrixType,
    },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Source read error: {0}")]
    Source(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Processing cancelled")]
    Cancelled,
}

/// Result type for polarimetric operations
pub type PolSarResult<T> = Result<T, PolSarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiles_cover_image() {
        let tiles = Rectangle::tiles(10, 7, 4);
        assert_eq!(tiles.len(), 6);
        let area: usize = tiles.iter().map(|t| t.width * t.height).sum();
        assert_eq!(area, 70);
        assert_eq!(tiles[2], Rectangle::new(8, 0, 2, 4));
        assert_eq!(tiles[5], Rectangle::new(8, 4, 2, 3));
    }

    #[test]
    fn test_matrix_type_parsing() {
        assert_eq!("t3".parse::<MatrixType>().unwrap(), MatrixType::T3);
        assert_eq!("FULL".parse::<MatrixType>().unwrap(), MatrixType::Full);
        assert!("T2".parse::<MatrixType>().is_err());
        assert_eq!(MatrixType::C4.band_count(), 16);
        assert!(!MatrixType::C2.is_quad_pol());
        assert_eq!("compact".parse::<MatrixType>().unwrap(), MatrixType::Compact);
        assert!(MatrixType::Compact.is_dual_pol());
        assert_eq!(MatrixType::Compact.band_count(), 4);
    }
}
