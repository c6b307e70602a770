//! The configuration document shared by the editor and the builder.

/// Defines the document and its sections.
pub(crate) mod document;
/// Defines typed layer parameter values.
pub(crate) mod param_value;

pub use document::{
    ModelConfig,
    DataSection,
    TrainingSection,
    LayerSpec,
    DEFAULT_SEED,
    DEFAULT_MODEL,
    DEFAULT_OPTIMIZER,
    DEFAULT_LOSS,
    DEFAULT_LEARNING_RATE,
    DEFAULT_METRIC,
    DEFAULT_BATCH_SIZE,
    DEFAULT_EPOCHS,
    DEFAULT_VALIDATION_SPLIT,
};
pub use param_value::ParamValue;
