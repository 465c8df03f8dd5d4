//! Whole-image span statistics
//!
//! Several decompositions clip their dB outputs to the span range of the
//! whole image. The range depends only on the source band set, so it is
//! computed at most once per set and then shared read-only by all tiles.

use crate::core::window::WindowEstimator;
use crate::io::band_set::SourceBandSet;
use crate::io::tile::{read_source_tile, TileSource};
use crate::types::{PolSarResult, Rectangle, EPS};
use std::sync::{Mutex, OnceLock};

/// Minimum and maximum windowed span over an image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanMinMax {
    pub min: f64,
    pub max: f64,
}

impl SpanMinMax {
    fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, span: f64) {
        if span < self.min {
            self.min = span;
        }
        if span > self.max {
            self.max = span;
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// `10 * log10(p)` after clipping `p` to the span range
    pub fn scale_db(&self, p: f64) -> f64 {
        scale_db(p, self.min, self.max)
    }
}

pub fn scale_db(p: f64, min: f64, max: f64) -> f64 {
    let clipped = if p < min {
        min
    } else if p > max {
        max
    } else {
        p
    };
    10.0 * clipped.log10()
}

/// Scan the whole image tile by tile and reduce the windowed span range
pub fn compute_span_min_max<S: TileSource + ?Sized>(
    source: &S,
    band_set: &SourceBandSet,
    window_size: usize,
    tile_size: usize,
) -> PolSarResult<SpanMinMax> {
    let (width, height) = source.dimensions();
    let estimator = WindowEstimator::new(band_set.matrix_type, window_size, width, height);
    let tiles = Rectangle::tiles(width, height, tile_size);

    log::info!(
        "Computing span statistics for {} over {} tiles",
        band_set,
        tiles.len()
    );

    let tile_span = |target: &Rectangle| -> PolSarResult<SpanMinMax> {
        let tile = read_source_tile(source, band_set, estimator.source_rectangle(target))?;
        let mut acc = SpanMinMax::empty();
        for y in target.y..target.max_y() {
            for x in target.x..target.max_x() {
                if tile.is_no_data(x, y) {
                    continue;
                }
                acc.include(estimator.mean_span(&tile, x, y)?);
            }
        }
        Ok(acc)
    };

    #[cfg(feature = "parallel")]
    let reduced = {
        use rayon::prelude::*;
        tiles
            .par_iter()
            .map(tile_span)
            .try_reduce(SpanMinMax::empty, |a, b| Ok(a.merge(b)))?
    };

    #[cfg(not(feature = "parallel"))]
    let reduced = {
        let mut acc = SpanMinMax::empty();
        for target in &tiles {
            acc = acc.merge(tile_span(target)?);
        }
        acc
    };

    let stats = if reduced.max < reduced.min {
        log::warn!("{} has no valid pixels, span range defaults to EPS", band_set);
        SpanMinMax { min: EPS, max: EPS }
    } else {
        SpanMinMax {
            min: reduced.min.max(EPS),
            max: reduced.max.max(EPS),
        }
    };

    log::info!(
        "Span range for {}: min={:.6e}, max={:.6e}",
        band_set,
        stats.min,
        stats.max
    );
    Ok(stats)
}

struct SpanCell {
    value: OnceLock<SpanMinMax>,
    guard: Mutex<()>,
}

/// Single-flight span cache, one slot per source band set
///
/// Reads after the first computation are lock-free. Concurrent first
/// requests for the same set serialise on that set's guard and only one
/// of them runs the computation.
pub struct SpanCache {
    cells: Vec<SpanCell>,
}

impl SpanCache {
    pub fn new(band_set_count: usize) -> Self {
        Self {
            cells: (0..band_set_count)
                .map(|_| SpanCell {
                    value: OnceLock::new(),
                    guard: Mutex::new(()),
                })
                .collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<SpanMinMax> {
        self.cells.get(index).and_then(|c| c.value.get().copied())
    }

    pub fn get_or_compute<F>(&self, index: usize, compute: F) -> PolSarResult<SpanMinMax>
    where
        F: FnOnce() -> PolSarResult<SpanMinMax>,
    {
        let cell = self.cells.get(index).ok_or_else(|| {
            crate::types::PolSarError::Processing(format!(
                "No span cache slot for band set #{}",
                index
            ))
        })?;

        if let Some(value) = cell.value.get() {
            return Ok(*value);
        }

        // A poisoned guard only means another thread failed to compute;
        // the cell is still empty and can be retried.
        let _lock = cell.guard.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(value) = cell.value.get() {
            return Ok(*value);
        }

        let value = compute()?;
        Ok(*cell.value.get_or_init(|| value))
    }
}
