//! Loading the tabular data named in the `data` section.

// Provides the dataset struct.
pub(crate) mod dataset;
// Provides a struct that reads a file.
pub(crate) mod data_reader;

pub use dataset::Dataset;
pub use data_reader::DataReader;

use crate::config::ModelConfig;
use crate::error::{ConfigError, Result};


/// Load the data described by the `data` section of `config`.
///
/// Fails with a configuration error, before touching the file system,
/// if the section is absent or empty, if the source type is not `csv`,
/// or if the path or a column list is missing.
pub fn load_dataset(config: &ModelConfig) -> Result<Dataset> {
    let data = config.data_section()?;

    let source = data.source.as_deref()
        .ok_or(ConfigError::MissingField("data.type"))?;
    if source != "csv" {
        return Err(ConfigError::UnsupportedDataType(source.to_string()).into());
    }

    let path = data.path.as_deref()
        .ok_or(ConfigError::MissingField("data.path"))?;
    let inputs = data.inputs.as_ref()
        .filter(|cols| !cols.is_empty())
        .ok_or(ConfigError::MissingField("data.inputs"))?;
    let outputs = data.outputs.as_ref()
        .filter(|cols| !cols.is_empty())
        .ok_or(ConfigError::MissingField("data.outputs"))?;

    tracing::info!("loading {source} data from {path}");
    let dataset = DataReader::new()
        .file(path)
        .has_header(true)
        .inputs(inputs)
        .outputs(outputs)
        .read()?;

    let (rows, n_in) = dataset.input_shape();
    let (_, n_out) = dataset.target_shape();
    tracing::info!("loaded {rows} rows, {n_in} inputs, {n_out} outputs");
    Ok(dataset)
}
