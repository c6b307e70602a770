//! Error types shared by the config, data, and network modules.
use polars::prelude::PolarsError;
use thiserror::Error;


/// Errors caused by a missing or malformed configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid YAML for the expected schema.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required top-level section is absent or empty.
    #[error("{0} section missing from config file.")]
    MissingSection(&'static str),

    /// A required field inside a section is absent.
    #[error("Field `{0}` missing from config file.")]
    MissingField(&'static str),

    /// `data.type` names a source that is not implemented.
    #[error("Data type '{0}' not supported.")]
    UnsupportedDataType(String),

    /// `model` names an architecture that is not implemented.
    #[error("Model {0} not supported.")]
    UnsupportedModel(String),

    /// A layer `type` is not in the layer registry.
    #[error("Layer type '{0}' not found in the layer registry.")]
    UnknownLayer(String),

    /// A layer parameter is missing, unexpected, or has the wrong type.
    #[error("Invalid parameter `{param}` for layer '{layer}': {reason}")]
    InvalidLayerParameter {
        /// Layer type name.
        layer: String,
        /// Parameter name.
        param: String,
        /// What is wrong with it.
        reason: String,
    },

    /// `training.loss` is not a known loss.
    #[error("Unknown loss '{0}'.")]
    UnknownLoss(String),

    /// An entry of `training.metrics` is not a known metric.
    #[error("Unknown metric '{0}'.")]
    UnknownMetric(String),

    /// A training hyperparameter is out of range.
    #[error("Invalid training parameter `{field}`: {reason}")]
    InvalidTraining {
        /// Field name inside `training`.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}


/// Errors raised while reading the tabular data.
#[derive(Debug, Error)]
pub enum DataError {
    /// The CSV reader failed.
    #[error("CSV error: {0}")]
    Csv(#[from] PolarsError),

    /// A column listed in `data.inputs` or `data.outputs` does not exist.
    #[error("Column '{0}' not found in the data file.")]
    MissingColumn(String),

    /// A selected column holds values that cannot be cast to `f32`.
    #[error("Column '{column}' contains missing or non-numeric values.")]
    NonNumeric {
        /// Column name.
        column: String,
    },
}


/// Errors raised by a [`Sequential`](crate::network::Sequential) model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The data does not fit the declared input or output shape.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Expected dimension.
        expected: usize,
        /// Dimension found.
        actual: usize,
    },

    /// An `Input` layer appears after the first position.
    #[error("Input layer at position {0} must be the first layer.")]
    MisplacedInput(usize),

    /// The weights are not allocated yet.
    #[error("Model is not built; declare an Input layer or call `fit` first.")]
    NotBuilt,

    /// `fit`/`evaluate` was called before `compile`.
    #[error("Model must be compiled before training or evaluation.")]
    NotCompiled,

    /// The model has no trainable layer to produce an output.
    #[error("Model has no layers.")]
    EmptyModel,

    /// There are no rows to train or evaluate on.
    #[error("Dataset is empty.")]
    EmptyDataset,

    /// Saving or loading the model failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The saved model could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}


/// Umbrella error for the build/train pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Data error.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Model error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Reading an answer or writing to the console failed.
    #[error("Console error: {0}")]
    Io(#[from] std::io::Error),
}


impl Error {
    /// Returns `true` if this error comes from the configuration document.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}


impl From<PolarsError> for Error {
    fn from(err: PolarsError) -> Self {
        Self::Data(DataError::Csv(err))
    }
}


/// Errors raised by the configuration editor.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A form field does not parse as the expected number.
    #[error("Invalid value '{value}' for {field}.")]
    InvalidField {
        /// Field label.
        field: &'static str,
        /// Text entered.
        value: String,
    },

    /// The model family is not offered by the editor.
    #[error("Model {0} not supported.")]
    UnsupportedModel(String),

    /// Writing the document failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading an answer or writing to the console failed.
    #[error("Console error: {0}")]
    Io(#[from] std::io::Error),
}


/// Result type of the build/train pipeline.
pub type Result<T> = std::result::Result<T, Error>;
