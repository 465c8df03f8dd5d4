//! Tile exchange with the raster framework
//!
//! The engine never loads or decodes images itself. It asks a [`TileSource`]
//! for the bands of a band set over a rectangle and writes its results into
//! [`TargetTile`] buffers.

use crate::io::band_set::{detect_band_sets, SourceBand, SourceBandSet};
use crate::types::{PolSarError, PolSarResult, RealImage, Rectangle};
use ndarray::{s, Array2};

/// Supplier of source pixels, shared by all tile workers
pub trait TileSource: Sync {
    /// Image size as (width, height)
    fn dimensions(&self) -> (usize, usize);

    /// All bands of the product with their no-data values
    fn bands(&self) -> Vec<SourceBand>;

    /// Read every band of `band_set` over `rect` (image coordinates)
    fn read_tile(&self, band_set: &SourceBandSet, rect: Rectangle) -> PolSarResult<SourceTile>;
}

/// Read `rect` of a band set and check that the returned tile covers it
pub fn read_source_tile<S: TileSource + ?Sized>(
    source: &S,
    band_set: &SourceBandSet,
    rect: Rectangle,
) -> PolSarResult<SourceTile> {
    let tile = source.read_tile(band_set, rect)?;
    if !tile.rect().contains_rect(&rect) {
        return Err(PolSarError::Source(format!(
            "{} returned tile {} that does not cover {}",
            band_set,
            tile.rect(),
            rect
        )));
    }
    Ok(tile)
}

/// Source samples for one band set over a rectangle
#[derive(Debug, Clone)]
pub struct SourceTile {
    rect: Rectangle,
    bands: Vec<RealImage>,
    no_data: Vec<f64>,
}

impl SourceTile {
    pub fn new(rect: Rectangle, bands: Vec<RealImage>, no_data: Vec<f64>) -> PolSarResult<Self> {
        if bands.len() != no_data.len() {
            return Err(PolSarError::InvalidFormat(format!(
                "{} bands but {} no-data values",
                bands.len(),
                no_data.len()
            )));
        }
        if let Some(band) = bands.iter().find(|b| b.dim() != (rect.height, rect.width)) {
            return Err(PolSarError::InvalidFormat(format!(
                "Tile band of shape {:?} does not match rectangle {}",
                band.dim(),
                rect
            )));
        }
        Ok(Self {
            rect,
            bands,
            no_data,
        })
    }

    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Sample of `band` at image position (x, y)
    #[inline]
    pub fn value(&self, band: usize, x: usize, y: usize) -> f64 {
        self.bands[band][[y - self.rect.y, x - self.rect.x]] as f64
    }

    /// Whether any band is missing at image position (x, y)
    pub fn is_no_data(&self, x: usize, y: usize) -> bool {
        (0..self.bands.len()).any(|b| {
            let v = self.value(b, x, y);
            !v.is_finite() || v == self.no_data[b]
        })
    }
}

/// Output buffers for one target rectangle, one raster per output band
#[derive(Debug, Clone)]
pub struct TargetTile {
    pub rect: Rectangle,
    pub bands: Vec<RealImage>,
}

impl TargetTile {
    pub fn new(rect: Rectangle, band_count: usize) -> Self {
        Self {
            rect,
            bands: (0..band_count)
                .map(|_| Array2::zeros((rect.height, rect.width)))
                .collect(),
        }
    }

    /// Write `value` at image position (x, y)
    #[inline]
    pub fn set(&mut self, band: usize, x: usize, y: usize, value: f64) {
        self.bands[band][[y - self.rect.y, x - self.rect.x]] = value as f32;
    }

    #[inline]
    pub fn get(&self, band: usize, x: usize, y: usize) -> f32 {
        self.bands[band][[y - self.rect.y, x - self.rect.x]]
    }
}

/// Fully loaded product, mostly useful for tests and the Python bindings
#[derive(Debug, Clone)]
pub struct InMemoryProduct {
    width: usize,
    height: usize,
    bands: Vec<SourceBand>,
    data: Vec<RealImage>,
}

impl InMemoryProduct {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bands: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn add_band(
        &mut self,
        name: impl Into<String>,
        no_data_value: f64,
        data: RealImage,
    ) -> PolSarResult<()> {
        let name = name.into();
        if data.dim() != (self.height, self.width) {
            return Err(PolSarError::InvalidFormat(format!(
                "Band {} has shape {:?}, expected ({}, {})",
                name,
                data.dim(),
                self.height,
                self.width
            )));
        }
        if self.bands.iter().any(|b| b.name == name) {
            return Err(PolSarError::InvalidFormat(format!("Duplicate band {}", name)));
        }
        self.bands.push(SourceBand::new(name, no_data_value));
        self.data.push(data);
        Ok(())
    }

    pub fn band_data(&self, name: &str) -> Option<&RealImage> {
        self.bands
            .iter()
            .position(|b| b.name == name)
            .map(|i| &self.data[i])
    }

    pub fn band_sets(&self) -> PolSarResult<Vec<SourceBandSet>> {
        detect_band_sets(&self.bands)
    }
}

impl TileSource for InMemoryProduct {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn bands(&self) -> Vec<SourceBand> {
        self.bands.clone()
    }

    fn read_tile(&self, band_set: &SourceBandSet, rect: Rectangle) -> PolSarResult<SourceTile> {
        let image = Rectangle::new(0, 0, self.width, self.height);
        if !image.contains_rect(&rect) {
            return Err(PolSarError::Source(format!(
                "Requested {} lies outside the {}x{} image",
                rect, self.width, self.height
            )));
        }

        let mut bands = Vec::with_capacity(band_set.len());
        let mut no_data = Vec::with_capacity(band_set.len());
        for band in &band_set.bands {
            let data = self.band_data(&band.name).ok_or_else(|| {
                PolSarError::Source(format!("Band {} not found in product", band.name))
            })?;
            bands.push(
                data.slice(s![rect.y..rect.max_y(), rect.x..rect.max_x()])
                    .to_owned(),
            );
            no_data.push(band.no_data_value);
        }

        SourceTile::new(rect, bands, no_data)
    }
}
