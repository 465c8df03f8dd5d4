//! Tile orchestration
//!
//! For every target rectangle the processor fetches the halo-expanded
//! source tile of each band set, then per pixel checks for no-data,
//! estimates the windowed matrix, runs the decomposition and writes the
//! scaled values. Tiles are independent; the only shared state is the span
//! cache, which is filled once per band set.

use crate::core::compact::CompactMode;
use crate::core::decomposition::{
    scale_outputs, ColorSlot, Decomposition, InputBasis, OutputBand, PixelInput,
};
use crate::core::span::{compute_span_min_max, SpanCache, SpanMinMax};
use crate::core::window::WindowEstimator;
use crate::io::band_set::{detect_band_sets, SourceBandSet};
use crate::io::tile::{read_source_tile, SourceTile, TargetTile, TileSource};
use crate::types::{MatrixType, PolSarError, PolSarResult, RealImage, Rectangle};
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Decomposition run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionParams {
    pub decomposition: Decomposition,
    /// Averaging window edge in pixels (odd)
    pub window_size: usize,
    /// Value written to every output band of a no-data pixel
    pub no_data_value: f64,
    /// Tile edge used by the whole-image driver and the span statistics
    pub tile_size: usize,
    /// Compact-pol mode simulated from FULL sources for dual-pol decompositions
    #[serde(default)]
    pub compact_mode: Option<CompactMode>,
}

impl Default for DecompositionParams {
    fn default() -> Self {
        Self {
            decomposition: Decomposition::Sinclair,
            window_size: 5,
            no_data_value: 0.0,
            tile_size: 256,
            compact_mode: None,
        }
    }
}

impl DecompositionParams {
    pub fn new(decomposition: Decomposition) -> Self {
        Self {
            decomposition,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> PolSarResult<()> {
        if self.window_size == 0 || self.window_size % 2 == 0 {
            return Err(PolSarError::InvalidConfig(format!(
                "Window size must be a positive odd number \
                 (even sizes are rejected, not rounded), got {}",
                self.window_size
            )));
        }
        if self.tile_size == 0 {
            return Err(PolSarError::InvalidConfig(
                "Tile size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// One output band of one source band set
#[derive(Debug, Clone, PartialEq)]
pub struct TargetBand {
    /// Definition name plus the band set suffix
    pub name: String,
    pub definition: OutputBand,
    pub band_set: usize,
}

/// Full-size output rasters of a whole-image run
#[derive(Debug, Clone)]
pub struct DecompositionImage {
    pub width: usize,
    pub height: usize,
    pub bands: Vec<TargetBand>,
    pub data: Vec<RealImage>,
}

impl DecompositionImage {
    pub fn band(&self, name: &str) -> Option<&RealImage> {
        self.bands
            .iter()
            .position(|b| b.name == name)
            .map(|i| &self.data[i])
    }
}

/// Runs one decomposition over the band sets of a product
pub struct DecompositionProcessor {
    params: DecompositionParams,
    matrix_type: MatrixType,
    band_sets: Vec<SourceBandSet>,
    target_bands: Vec<TargetBand>,
    /// Output definitions of a single band set, in value order
    definitions: Vec<OutputBand>,
    estimator: WindowEstimator,
    width: usize,
    height: usize,
    span_cache: SpanCache,
}

impl DecompositionProcessor {
    /// Detect the band sets of `source` and validate the configuration
    pub fn new<S: TileSource + ?Sized>(
        params: DecompositionParams,
        source: &S,
    ) -> PolSarResult<Self> {
        let band_sets = detect_band_sets(&source.bands())?;
        let (width, height) = source.dimensions();
        Self::with_band_sets(params, band_sets, width, height)
    }

    pub fn with_band_sets(
        params: DecompositionParams,
        band_sets: Vec<SourceBandSet>,
        width: usize,
        height: usize,
    ) -> PolSarResult<Self> {
        params.validate()?;

        let matrix_type = band_sets
            .first()
            .map(|set| set.matrix_type)
            .ok_or_else(|| PolSarError::InvalidFormat("No source band sets".to_string()))?;
        if let Some(other) = band_sets.iter().find(|set| set.matrix_type != matrix_type) {
            return Err(PolSarError::InvalidFormat(format!(
                "Mixed matrix types in one product: {} and {}",
                matrix_type, other.matrix_type
            )));
        }
        if let Some((position, set)) = band_sets
            .iter()
            .enumerate()
            .find(|(position, set)| set.index != *position)
        {
            return Err(PolSarError::InvalidFormat(format!(
                "Band set at position {} carries index {}",
                position, set.index
            )));
        }
        if width == 0 || height == 0 {
            return Err(PolSarError::InvalidFormat(format!(
                "Empty source image {}x{}",
                width, height
            )));
        }

        let simulate_compact = matrix_type == MatrixType::Full
            && params.decomposition.input_basis() == InputBasis::C2
            && params.compact_mode.is_some();
        if simulate_compact {
            params.decomposition.validate(MatrixType::Compact)?;
        } else {
            params.decomposition.validate(matrix_type)?;
            if let Some(mode) = params.compact_mode {
                log::warn!(
                    "Compact mode {} ignored for {} decomposition of {} source",
                    mode,
                    params.decomposition,
                    matrix_type
                );
            }
        }

        let definitions = params.decomposition.output_bands();
        let target_bands = band_sets
            .iter()
            .flat_map(|set| {
                definitions.iter().map(move |def| TargetBand {
                    name: format!("{}{}", def.name, set.suffix),
                    definition: *def,
                    band_set: set.index,
                })
            })
            .collect();

        let window_size = if params.decomposition.is_windowed() {
            params.window_size
        } else {
            1
        };
        let estimator = WindowEstimator::new(matrix_type, window_size, width, height)
            .with_compact_mode(params.compact_mode.filter(|_| simulate_compact));

        log::info!(
            "{} decomposition of {} source ({} band set(s), {}x{}, window {})",
            params.decomposition,
            matrix_type,
            band_sets.len(),
            width,
            height,
            window_size
        );

        Ok(Self {
            span_cache: SpanCache::new(band_sets.len()),
            params,
            matrix_type,
            band_sets,
            target_bands,
            definitions,
            estimator,
            width,
            height,
        })
    }

    pub fn params(&self) -> &DecompositionParams {
        &self.params
    }

    pub fn matrix_type(&self) -> MatrixType {
        self.matrix_type
    }

    pub fn band_sets(&self) -> &[SourceBandSet] {
        &self.band_sets
    }

    pub fn target_bands(&self) -> &[TargetBand] {
        &self.target_bands
    }

    /// Output band filling `slot` for a band set, if the decomposition has one
    pub fn slot_band(&self, band_set: usize, slot: ColorSlot) -> Option<&TargetBand> {
        self.target_bands
            .iter()
            .find(|b| b.band_set == band_set && b.definition.slot == slot)
    }

    pub fn source_rectangle(&self, target: &Rectangle) -> Rectangle {
        self.estimator.source_rectangle(target)
    }

    /// Compute the span statistics of every band set before tiles are dispatched
    pub fn prepare<S: TileSource + ?Sized>(&self, source: &S) -> PolSarResult<()> {
        if !self.params.decomposition.uses_span() {
            return Ok(());
        }
        for set in &self.band_sets {
            self.span_statistics(source, set.index)?;
        }
        Ok(())
    }

    /// Span range of a band set, computed on first request
    pub fn span_statistics<S: TileSource + ?Sized>(
        &self,
        source: &S,
        band_set: usize,
    ) -> PolSarResult<SpanMinMax> {
        let set = self.band_sets.get(band_set).ok_or_else(|| {
            PolSarError::Processing(format!("Unknown band set #{}", band_set))
        })?;
        self.span_cache.get_or_compute(band_set, || {
            compute_span_min_max(source, set, self.params.window_size, self.params.tile_size)
        })
    }

    /// Compute every output band over `target`
    pub fn compute_tile<S: TileSource + ?Sized>(
        &self,
        source: &S,
        target: Rectangle,
    ) -> PolSarResult<TargetTile> {
        let image = Rectangle::new(0, 0, self.width, self.height);
        if target.is_empty() || !image.contains_rect(&target) {
            return Err(PolSarError::Processing(format!(
                "Target {} is empty or outside the {}x{} image",
                target, self.width, self.height
            )));
        }

        let mut out = TargetTile::new(target, self.target_bands.len());
        let bands_per_set = self.definitions.len();
        let mut values = Vec::with_capacity(bands_per_set);

        for set in &self.band_sets {
            let span = if self.params.decomposition.uses_span() {
                Some(self.span_statistics(source, set.index)?)
            } else {
                None
            };

            let source_rect = self.source_rectangle(&target);
            log::debug!("Tile {} of {}: reading {}", target, set, source_rect);
            let tile = read_source_tile(source, set, source_rect)?;
            let first_band = set.index * bands_per_set;

            for y in target.y..target.max_y() {
                for x in target.x..target.max_x() {
                    if tile.is_no_data(x, y) {
                        for b in 0..bands_per_set {
                            out.set(first_band + b, x, y, self.params.no_data_value);
                        }
                        continue;
                    }

                    let input = self.pixel_input(&tile, x, y)?;
                    self.params.decomposition.decompose(&input, &mut values)?;
                    scale_outputs(&self.definitions, span.as_ref(), &mut values);

                    for (b, value) in values.iter().enumerate() {
                        out.set(first_band + b, x, y, *value);
                    }
                }
            }
        }

        Ok(out)
    }

    fn pixel_input(&self, tile: &SourceTile, x: usize, y: usize) -> PolSarResult<PixelInput> {
        Ok(match self.params.decomposition.input_basis() {
            InputBasis::Scatter => PixelInput::Scatter(self.estimator.center_scatter(tile, x, y)?),
            InputBasis::C2 => PixelInput::C2(self.estimator.mean_c2(tile, x, y)?),
            InputBasis::C3 => PixelInput::C3(self.estimator.mean_c3(tile, x, y)?),
            InputBasis::T3 => PixelInput::T3(self.estimator.mean_t3(tile, x, y)?),
        })
    }

    /// Decompose the whole image tile by tile
    ///
    /// `cancel` is polled before each tile starts; a raised flag aborts the
    /// run with [`PolSarError::Cancelled`].
    pub fn process_image<S: TileSource + ?Sized>(
        &self,
        source: &S,
        cancel: Option<&AtomicBool>,
    ) -> PolSarResult<DecompositionImage> {
        self.prepare(source)?;

        let tiles = Rectangle::tiles(self.width, self.height, self.params.tile_size);
        log::info!(
            "Processing {}x{} image in {} tiles",
            self.width,
            self.height,
            tiles.len()
        );

        let run_tile = |rect: &Rectangle| -> PolSarResult<TargetTile> {
            if cancel.map_or(false, |flag| flag.load(Ordering::Relaxed)) {
                return Err(PolSarError::Cancelled);
            }
            self.compute_tile(source, *rect)
        };

        #[cfg(feature = "parallel")]
        let computed: Vec<TargetTile> = {
            use rayon::prelude::*;
            tiles
                .par_iter()
                .map(run_tile)
                .collect::<PolSarResult<Vec<_>>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let computed: Vec<TargetTile> = tiles
            .iter()
            .map(run_tile)
            .collect::<PolSarResult<Vec<_>>>()?;

        let mut data: Vec<RealImage> = (0..self.target_bands.len())
            .map(|_| Array2::zeros((self.height, self.width)))
            .collect();
        for tile in &computed {
            let r = tile.rect;
            for (full, part) in data.iter_mut().zip(&tile.bands) {
                full.slice_mut(s![r.y..r.max_y(), r.x..r.max_x()])
                    .assign(part);
            }
        }

        log::info!("Decomposition finished: {} output bands", data.len());

        Ok(DecompositionImage {
            width: self.width,
            height: self.height,
            bands: self.target_bands.clone(),
            data,
        })
    }
}
