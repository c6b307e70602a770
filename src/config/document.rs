use indexmap::IndexMap;
use serde::{Serialize, Deserialize, Deserializer};

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use super::param_value::ParamValue;

/// Seed used when `random_seed` is absent.
pub const DEFAULT_SEED: u64 = 83;
/// Model family used when `model` is absent.
pub const DEFAULT_MODEL: &str = "sequential";

/// Default optimizer name.
pub const DEFAULT_OPTIMIZER: &str = "adam";
/// Default loss name.
pub const DEFAULT_LOSS: &str = "binary_crossentropy";
/// Default learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 1e-3;
/// Default metric name.
pub const DEFAULT_METRIC: &str = "accuracy";
/// Default mini-batch size.
pub const DEFAULT_BATCH_SIZE: usize = 32;
/// Default number of epochs.
pub const DEFAULT_EPOCHS: usize = 10;
/// Default fraction of rows held out for validation.
pub const DEFAULT_VALIDATION_SPLIT: f64 = 0.2;


/// The configuration document.
///
/// The fields are serialized in declaration order:
/// `data`, `model`, `layers`, `training`, `random_seed`.
/// # Example
/// ```no_run
/// use modelsmith::ModelConfig;
///
/// let config = ModelConfig::load("model.yaml")?;
/// println!("{} layers", config.layers.len());
/// # Ok::<(), modelsmith::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Where the training data lives.
    #[serde(default)]
    pub data: Option<DataSection>,

    /// Model architecture family.
    #[serde(default = "default_model", deserialize_with = "model_or_default")]
    pub model: String,

    /// Ordered layer stack.
    #[serde(default, deserialize_with = "null_as_default")]
    pub layers: Vec<LayerSpec>,

    /// Training hyperparameters.
    #[serde(default, deserialize_with = "null_as_default")]
    pub training: TrainingSection,

    /// Seed of the random generator.
    #[serde(default = "default_seed")]
    pub random_seed: u64,
}


/// The `data` section.
/// Every field is optional so that a partly configured document
/// can be written and read back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSection {
    /// Source type. Only `"csv"` is supported.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Path to the data file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Column names of the features, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<String>>,

    /// Column names of the targets, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,
}


impl DataSection {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.path.is_none()
            && self.inputs.is_none()
            && self.outputs.is_none()
    }
}


/// The `training` section.
/// Missing fields take the `DEFAULT_*` values through the accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSection {
    /// Optimizer name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<String>,

    /// Loss name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss: Option<String>,

    /// Learning rate of the optimizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f64>,

    /// Metric names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<String>>,

    /// Mini-batch size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,

    /// Number of passes over the training rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epochs: Option<usize>,

    /// Fraction of rows, taken from the end, used for validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_split: Option<f64>,
}


impl TrainingSection {
    /// Optimizer name, `"adam"` by default.
    pub fn optimizer(&self) -> &str {
        self.optimizer.as_deref().unwrap_or(DEFAULT_OPTIMIZER)
    }

    /// Loss name, `"binary_crossentropy"` by default.
    pub fn loss(&self) -> &str {
        self.loss.as_deref().unwrap_or(DEFAULT_LOSS)
    }

    /// Learning rate, `0.001` by default.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate.unwrap_or(DEFAULT_LEARNING_RATE)
    }

    /// Metric names, `["accuracy"]` by default.
    pub fn metrics(&self) -> Vec<String> {
        self.metrics.clone()
            .unwrap_or_else(|| vec![DEFAULT_METRIC.to_string()])
    }

    /// Batch size, `32` by default.
    pub fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    /// Number of epochs, `10` by default.
    pub fn epochs(&self) -> usize {
        self.epochs.unwrap_or(DEFAULT_EPOCHS)
    }

    /// Validation split, `0.2` by default.
    pub fn validation_split(&self) -> f64 {
        self.validation_split.unwrap_or(DEFAULT_VALIDATION_SPLIT)
    }


    /// Check the ranges of the numeric hyperparameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size() == 0 {
            return Err(ConfigError::InvalidTraining {
                field: "batch_size",
                reason: "must be positive".into(),
            });
        }
        let lr = self.learning_rate();
        if !(lr.is_finite() && lr > 0.0) {
            return Err(ConfigError::InvalidTraining {
                field: "learning_rate",
                reason: format!("must be a positive number, got {lr}"),
            });
        }
        let split = self.validation_split();
        if !(0.0..1.0).contains(&split) {
            return Err(ConfigError::InvalidTraining {
                field: "validation_split",
                reason: format!("must lie in [0, 1), got {split}"),
            });
        }
        Ok(())
    }
}


/// One entry of the `layers` list.
/// `type` names the layer; all other keys are constructor parameters,
/// kept in the order they were written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Layer type name, resolved against the layer registry.
    #[serde(rename = "type")]
    pub kind: String,

    /// Constructor parameters.
    #[serde(flatten)]
    pub params: IndexMap<String, ParamValue>,
}


impl LayerSpec {
    /// Construct a layer record without parameters.
    pub fn new<S: ToString>(kind: S) -> Self {
        Self { kind: kind.to_string(), params: IndexMap::new() }
    }


    /// Append a parameter.
    /// An existing parameter of the same name is overwritten in place.
    pub fn param<S, V>(mut self, name: S, value: V) -> Self
        where S: ToString,
              V: Into<ParamValue>,
    {
        self.params.insert(name.to_string(), value.into());
        self
    }


    /// Look up a parameter.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }


    /// Renders `Type (k=v, k=v)`.
    pub fn describe(&self) -> String {
        let params = self.params.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} ({params})", self.kind)
    }
}


impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            data: None,
            model: default_model(),
            layers: Vec::new(),
            training: TrainingSection::default(),
            random_seed: DEFAULT_SEED,
        }
    }
}


impl ModelConfig {
    /// Parse a document from YAML text.
    pub fn from_yaml_str<S: AsRef<str>>(text: S) -> Result<Self, ConfigError> {
        let text = text.as_ref();
        // An empty file is an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }


    /// Read the whole document at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(text)
    }


    /// Serialize the document to YAML (block style, keys in order).
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }


    /// Write the document to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let text = self.to_yaml_string()?;
        fs::write(path, text)?;
        Ok(())
    }


    /// Returns the `data` section,
    /// or `ConfigError::MissingSection` if it is absent or empty.
    pub fn data_section(&self) -> Result<&DataSection, ConfigError> {
        match &self.data {
            Some(data) if !data.is_empty() => Ok(data),
            _ => Err(ConfigError::MissingSection("data")),
        }
    }
}


fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}


fn default_seed() -> u64 {
    DEFAULT_SEED
}


fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where D: Deserializer<'de>,
          T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}


fn model_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
    where D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .unwrap_or_else(default_model))
}
