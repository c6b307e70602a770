//! A small dense-network engine.
//!
//! The builder translates each configured layer, optimizer, loss,
//! and metric name into the types of this module.
//! Names are resolved against closed registries;
//! an unknown layer, loss, or metric is an error,
//! and an unknown optimizer falls back to Adam.

/// Defines activation functions
pub mod activation;
/// Defines weight initializers
pub mod initializer;
/// Defines layers
pub mod layer;
/// Defines the layer registry
pub mod registry;
/// Defines some loss functions
pub mod loss;
/// Defines metrics
pub mod metric;
/// Defines optimizers
pub mod optimizer;
/// Defines the per-epoch training record
pub mod history;
/// Defines the sequential model
pub mod sequential;

pub use activation::Activation;
pub use initializer::Initializer;
pub use layer::{Layer, InputLayer, Dense, Dropout, ActivationLayer, Flatten};
pub use registry::LayerRegistry;
pub use loss::Loss;
pub use metric::Metric;
pub use optimizer::{Optimizer, OptimizerKind};
pub use history::{History, EpochRecord};
pub use sequential::{Sequential, Compiled, FitOptions, Evaluation};
