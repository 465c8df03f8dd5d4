//! Source band sets
//!
//! A polarimetric product stores one matrix per pixel spread over several
//! real-valued bands (`C11`, `C12_real`, `C12_imag`, ...). Stacked products
//! repeat the same element names with a common suffix, so a single product
//! can hold several independent band sets.

use crate::types::{MatrixType, PolSarError, PolSarResult};
use std::fmt;

const FULL_BANDS: [&str; 8] = [
    "i_HH", "q_HH", "i_HV", "q_HV", "i_VH", "q_VH", "i_VV", "q_VV",
];

const C2_BANDS: [&str; 4] = ["C11", "C12_real", "C12_imag", "C22"];

const COMPACT_BANDS: [&str; 4] = ["i_RH", "q_RH", "i_RV", "q_RV"];

const C3_BANDS: [&str; 9] = [
    "C11", "C12_real", "C12_imag", "C13_real", "C13_imag", "C22", "C23_real", "C23_imag", "C33",
];

const T3_BANDS: [&str; 9] = [
    "T11", "T12_real", "T12_imag", "T13_real", "T13_imag", "T22", "T23_real", "T23_imag", "T33",
];

const C4_BANDS: [&str; 16] = [
    "C11", "C12_real", "C12_imag", "C13_real", "C13_imag", "C14_real", "C14_imag", "C22",
    "C23_real", "C23_imag", "C24_real", "C24_imag", "C33", "C34_real", "C34_imag", "C44",
];

const T4_BANDS: [&str; 16] = [
    "T11", "T12_real", "T12_imag", "T13_real", "T13_imag", "T14_real", "T14_imag", "T22",
    "T23_real", "T23_imag", "T24_real", "T24_imag", "T33", "T34_real", "T34_imag", "T44",
];

/// Richer matrices first so that a C4 product is not mistaken for C3 or C2
const DETECTION_ORDER: [MatrixType; 7] = [
    MatrixType::T4,
    MatrixType::C4,
    MatrixType::T3,
    MatrixType::C3,
    MatrixType::C2,
    MatrixType::Full,
    MatrixType::Compact,
];

/// Element band names of a matrix type, in storage order
pub fn element_names(matrix_type: MatrixType) -> &'static [&'static str] {
    match matrix_type {
        MatrixType::Full => &FULL_BANDS,
        MatrixType::C2 => &C2_BANDS,
        MatrixType::Compact => &COMPACT_BANDS,
        MatrixType::C3 => &C3_BANDS,
        MatrixType::T3 => &T3_BANDS,
        MatrixType::C4 => &C4_BANDS,
        MatrixType::T4 => &T4_BANDS,
    }
}

/// A band of the source product
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBand {
    pub name: String,
    pub no_data_value: f64,
}

impl SourceBand {
    pub fn new(name: impl Into<String>, no_data_value: f64) -> Self {
        Self {
            name: name.into(),
            no_data_value,
        }
    }
}

/// The bands that together encode one polarimetric matrix per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBandSet {
    /// Position of this set within the product, also the span cache key
    pub index: usize,
    pub matrix_type: MatrixType,
    /// Common suffix appended to every element name, empty for single-set products
    pub suffix: String,
    /// Bands in the storage order given by [`element_names`]
    pub bands: Vec<SourceBand>,
}

impl SourceBandSet {
    /// Build a set from bands already in storage order
    pub fn new(
        index: usize,
        matrix_type: MatrixType,
        suffix: impl Into<String>,
        bands: Vec<SourceBand>,
    ) -> PolSarResult<Self> {
        if bands.len() != matrix_type.band_count() {
            return Err(PolSarError::InvalidFormat(format!(
                "{} source needs {} bands, got {}",
                matrix_type,
                matrix_type.band_count(),
                bands.len()
            )));
        }
        Ok(Self {
            index,
            matrix_type,
            suffix: suffix.into(),
            bands,
        })
    }

    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|b| b.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl fmt::Display for SourceBandSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.suffix.is_empty() {
            write!(f, "{} band set #{}", self.matrix_type, self.index)
        } else {
            write!(
                f,
                "{} band set #{} ({})",
                self.matrix_type, self.index, self.suffix
            )
        }
    }
}

/// Group the bands of a product into polarimetric band sets
///
/// The first matrix type (in [`DETECTION_ORDER`]) that yields at least one
/// complete set wins; every complete set of that type is returned, ordered
/// by the position of its first band in the product.
pub fn detect_band_sets(bands: &[SourceBand]) -> PolSarResult<Vec<SourceBandSet>> {
    for matrix_type in DETECTION_ORDER {
        let sets = collect_sets(bands, matrix_type);
        if !sets.is_empty() {
            log::debug!(
                "Detected {} {} band set(s) among {} bands",
                sets.len(),
                matrix_type,
                bands.len()
            );
            return Ok(sets);
        }
    }

    Err(PolSarError::InvalidFormat(format!(
        "Bands [{}] do not form a polarimetric matrix",
        bands
            .iter()
            .map(|b| b.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

/// Find the band sets of one explicit matrix type
pub fn band_sets_for(
    bands: &[SourceBand],
    matrix_type: MatrixType,
) -> PolSarResult<Vec<SourceBandSet>> {
    let sets = collect_sets(bands, matrix_type);
    if sets.is_empty() {
        return Err(PolSarError::InvalidFormat(format!(
            "No complete {} band set found (expected bands {})",
            matrix_type,
            element_names(matrix_type).join(", ")
        )));
    }
    Ok(sets)
}

fn collect_sets(bands: &[SourceBand], matrix_type: MatrixType) -> Vec<SourceBandSet> {
    let names = element_names(matrix_type);
    let mut sets = Vec::new();

    for band in bands {
        let suffix = match band.name.strip_prefix(names[0]) {
            Some(suffix) => suffix,
            None => continue,
        };

        let members: Option<Vec<SourceBand>> = names
            .iter()
            .map(|element| {
                let wanted = format!("{}{}", element, suffix);
                bands.iter().find(|b| b.name == wanted).cloned()
            })
            .collect();

        if let Some(members) = members {
            let index = sets.len();
            sets.push(SourceBandSet {
                index,
                matrix_type,
                suffix: suffix.to_string(),
                bands: members,
            });
        }
    }

    sets
}
