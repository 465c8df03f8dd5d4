//! Python bindings (cargo feature `python`)

use crate::core::{
    CompactMode, Decomposition, DecompositionParams, DecompositionProcessor, HuynenOutputs,
};
use crate::io::{band_sets_for, detect_band_sets, InMemoryProduct, TileSource};
use crate::types::{MatrixType, PolSarError};
use numpy::{IntoPyArray, PyReadonlyArray2};
use pyo3::prelude::*;
use pyo3::types::PyDict;

fn to_py_err(e: PolSarError) -> PyErr {
    match e {
        PolSarError::InvalidConfig(_)
        | PolSarError::NoOutputBands(_)
        | PolSarError::UnsupportedMatrix { .. }
        | PolSarError::InvalidFormat(_) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e))
        }
        _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)),
    }
}

/// Decompose a product given as a list of 2-D float32 bands
///
/// Returns a dict mapping output band names to 2-D arrays.
#[pyfunction]
#[pyo3(signature = (
    matrix_type,
    band_names,
    bands,
    decomposition,
    window_size = 5,
    no_data_value = 0.0,
    source_no_data = 0.0,
    huynen_parameters = true,
    huynen_summary = false,
    compact_mode = None
))]
#[allow(clippy::too_many_arguments)]
fn decompose<'py>(
    py: Python<'py>,
    matrix_type: Option<&str>,
    band_names: Vec<String>,
    bands: Vec<PyReadonlyArray2<'py, f32>>,
    decomposition: &str,
    window_size: usize,
    no_data_value: f64,
    source_no_data: f64,
    huynen_parameters: bool,
    huynen_summary: bool,
    compact_mode: Option<&str>,
) -> PyResult<&'py PyDict> {
    if band_names.len() != bands.len() {
        return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
            "{} band names for {} arrays",
            band_names.len(),
            bands.len()
        )));
    }

    let (height, width) = match bands.first() {
        Some(band) => band.as_array().dim(),
        None => {
            return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(
                "No input bands",
            ))
        }
    };

    let mut product = InMemoryProduct::new(width, height);
    for (name, band) in band_names.iter().zip(&bands) {
        product
            .add_band(name.clone(), source_no_data, band.as_array().to_owned())
            .map_err(to_py_err)?;
    }

    let outputs = HuynenOutputs {
        parameters: huynen_parameters,
        summary: huynen_summary,
    };
    let decomposition = match decomposition.parse::<Decomposition>().map_err(to_py_err)? {
        Decomposition::Huynen(_) => Decomposition::Huynen(outputs),
        Decomposition::Yang(_) => Decomposition::Yang(outputs),
        other => other,
    };

    let compact_mode = compact_mode
        .map(str::parse::<CompactMode>)
        .transpose()
        .map_err(to_py_err)?;

    let band_sets = match matrix_type {
        Some(name) => {
            let matrix_type = name.parse::<MatrixType>().map_err(to_py_err)?;
            band_sets_for(&product.bands(), matrix_type)
        }
        None => detect_band_sets(&product.bands()),
    }
    .map_err(to_py_err)?;

    let params = DecompositionParams {
        decomposition,
        window_size,
        no_data_value,
        compact_mode,
        ..DecompositionParams::default()
    };
    let processor = DecompositionProcessor::with_band_sets(params, band_sets, width, height)
        .map_err(to_py_err)?;

    let image = py
        .allow_threads(|| processor.process_image(&product, None))
        .map_err(to_py_err)?;

    let result = PyDict::new(py);
    for (band, data) in image.bands.iter().zip(image.data) {
        result.set_item(band.name.as_str(), data.into_pyarray(py))?;
    }
    Ok(result)
}

/// Names of all supported decompositions
#[pyfunction]
fn decompositions() -> Vec<&'static str> {
    vec![
        "sinclair",
        "pauli",
        "freeman-durden",
        "generalized-freeman-durden",
        "yamaguchi",
        "van-zyl",
        "h-alpha",
        "h-alpha-dual",
        "stokes",
        "cloude",
        "krogager",
        "huynen",
        "yang",
        "mf3cf",
        "mf4cf",
        "cameron",
    ]
}

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(decompose, m)?)?;
    m.add_function(wrap_pyfunction!(decompositions, m)?)?;
    Ok(())
}
