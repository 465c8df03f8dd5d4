//! Source product access: band set detection and tile exchange

pub mod band_set;
pub mod tile;

pub use band_set::{band_sets_for, detect_band_sets, element_names, SourceBand, SourceBandSet};
pub use tile::{read_source_tile, InMemoryProduct, SourceTile, TargetTile, TileSource};
