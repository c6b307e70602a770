//! Interactive authoring of a configuration document.
//!
//! [`ConfigEditor`] holds the document being written and exposes
//! one operation per form. [`EditorSession`] drives those forms
//! through a [`Console`](crate::console::Console).
use indexmap::IndexMap;

use std::path::Path;

use crate::config::{
    DataSection,
    LayerSpec,
    ModelConfig,
    ParamValue,
    TrainingSection,
};
use crate::error::EditorError;

mod session;

pub use session::EditorSession;


/// Model families offered by the editor.
pub const SUPPORTED_MODELS: [&str; 1] = ["sequential"];


/// Values entered in the data form.
/// Column lists are comma-separated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataForm {
    /// Source type.
    pub source: String,
    /// Path to the data file.
    pub path: String,
    /// Comma-separated input columns.
    pub inputs: String,
    /// Comma-separated output columns.
    pub outputs: String,
}


/// Values entered in the training form, as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingForm {
    /// Optimizer name.
    pub optimizer: String,
    /// Loss name.
    pub loss: String,
    /// Learning rate.
    pub learning_rate: String,
    /// Comma-separated metric names.
    pub metrics: String,
    /// Mini-batch size.
    pub batch_size: String,
    /// Number of epochs.
    pub epochs: String,
    /// Validation split.
    pub validation_split: String,
}


impl Default for TrainingForm {
    fn default() -> Self {
        Self {
            optimizer: "adam".into(),
            loss: "binary_crossentropy".into(),
            learning_rate: "0.001".into(),
            metrics: "accuracy".into(),
            batch_size: "8".into(),
            epochs: "1000".into(),
            validation_split: "0.2".into(),
        }
    }
}


impl DataForm {
    /// The form pre-filled from an existing section.
    /// The source type defaults to `csv`.
    pub fn from_section(data: Option<&DataSection>) -> Self {
        let data = data.cloned().unwrap_or_default();
        Self {
            source: data.source.unwrap_or_else(|| "csv".into()),
            path: data.path.unwrap_or_default(),
            inputs: data.inputs.unwrap_or_default().join(","),
            outputs: data.outputs.unwrap_or_default().join(","),
        }
    }
}


impl TrainingForm {
    /// The form pre-filled from an existing section.
    /// Missing fields show the editor defaults.
    pub fn from_section(training: &TrainingSection) -> Self {
        let mut form = Self::default();
        if let Some(optimizer) = &training.optimizer {
            form.optimizer = optimizer.clone();
        }
        if let Some(loss) = &training.loss {
            form.loss = loss.clone();
        }
        if let Some(lr) = training.learning_rate {
            form.learning_rate = lr.to_string();
        }
        if let Some(metrics) = &training.metrics {
            form.metrics = metrics.join(",");
        }
        if let Some(batch_size) = training.batch_size {
            form.batch_size = batch_size.to_string();
        }
        if let Some(epochs) = training.epochs {
            form.epochs = epochs.to_string();
        }
        if let Some(split) = training.validation_split {
            form.validation_split = split.to_string();
        }
        form
    }
}


/// The document being written by the editor.
///
/// # Example
/// ```no_run
/// use indexmap::IndexMap;
/// use modelsmith::editor::{ConfigEditor, DataForm};
/// use std::path::Path;
///
/// let mut editor = ConfigEditor::new();
/// editor.configure_data(DataForm {
///     source: "csv".into(),
///     path: "data.csv".into(),
///     inputs: "a, b".into(),
///     outputs: "c".into(),
/// });
/// let mut params = IndexMap::new();
/// params.insert("units".to_string(), "8".to_string());
/// editor.add_layer("Dense", params);
/// editor.write_model_config(Some(Path::new("model.yaml")))?;
/// # Ok::<(), modelsmith::error::EditorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigEditor {
    config: ModelConfig,
}


impl Default for ConfigEditor {
    fn default() -> Self {
        Self::new()
    }
}


impl ConfigEditor {
    /// An editor with an empty document:
    /// `sequential`, no layers, no training values, seed `0`.
    pub fn new() -> Self {
        let config = ModelConfig {
            data: Some(DataSection::default()),
            layers: Vec::new(),
            training: TrainingSection::default(),
            random_seed: 0,
            ..ModelConfig::default()
        };
        Self { config }
    }


    /// The document as currently edited.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }


    /// Replace the `data` section.
    pub fn configure_data(&mut self, form: DataForm) {
        let data = DataSection {
            source: Some(form.source.trim().to_string()),
            path: Some(form.path.trim().to_string()),
            inputs: Some(split_list(&form.inputs)),
            outputs: Some(split_list(&form.outputs)),
        };
        tracing::debug!("data configuration: {data:?}");
        self.config.data = Some(data);
    }


    /// Replace the `training` section.
    /// If a number does not parse, the section is left as it was.
    pub fn configure_training(&mut self, form: TrainingForm)
        -> Result<(), EditorError>
    {
        let training = TrainingSection {
            optimizer: Some(form.optimizer.trim().to_string()),
            loss: Some(form.loss.trim().to_string()),
            learning_rate: Some(parse_field("Learning Rate", &form.learning_rate)?),
            metrics: Some(split_list(&form.metrics)),
            batch_size: Some(parse_field("Batch Size", &form.batch_size)?),
            epochs: Some(parse_field("Epochs", &form.epochs)?),
            validation_split: Some(
                parse_field("Validation Split", &form.validation_split)?
            ),
        };
        tracing::debug!("training configuration: {training:?}");
        self.config.training = training;
        Ok(())
    }


    /// Set the model family.
    pub fn configure_model(&mut self, name: &str) -> Result<(), EditorError> {
        let name = name.trim();
        if !SUPPORTED_MODELS.contains(&name) {
            return Err(EditorError::UnsupportedModel(name.to_string()));
        }
        self.config.model = name.to_string();
        Ok(())
    }


    /// Set the seed written to `random_seed`.
    pub fn set_random_seed(&mut self, seed: u64) {
        self.config.random_seed = seed;
    }


    /// Append a layer.
    /// Each value is coerced to a number, boolean, list, or string.
    /// A parameter named `type` replaces `kind`.
    /// Neither the type nor the parameter names are checked here.
    pub fn add_layer<S: ToString>(
        &mut self,
        kind: S,
        mut params: IndexMap<String, String>,
    ) -> &LayerSpec
    {
        let kind = match params.shift_remove("type") {
            Some(kind) => kind.trim().to_string(),
            None => kind.to_string(),
        };
        let params = params.into_iter()
            .map(|(name, value)| (name, ParamValue::coerce(value)))
            .collect();
        let spec = LayerSpec { kind, params };
        tracing::debug!("added layer: {}", spec.describe());
        self.config.layers.push(spec);
        &self.config.layers[self.config.layers.len() - 1]
    }


    /// One line per layer: `1: Dense (units=8, activation=relu)`.
    pub fn layer_display(&self) -> Vec<String> {
        self.config.layers.iter()
            .enumerate()
            .map(|(i, spec)| format!("{}: {}", i + 1, spec.describe()))
            .collect()
    }


    /// Write the document to `path`.
    /// `None` means the save was cancelled; nothing is written
    /// and `Ok(false)` is returned.
    pub fn write_model_config(&self, path: Option<&Path>)
        -> Result<bool, EditorError>
    {
        let Some(path) = path else { return Ok(false); };
        self.config.save(path)?;
        tracing::info!("wrote {}", path.display());
        Ok(true)
    }
}


/// Split comma-separated text, trimming entries and dropping empty ones.
fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}


fn parse_field<T: std::str::FromStr>(field: &'static str, text: &str)
    -> Result<T, EditorError>
{
    text.trim()
        .parse()
        .map_err(|_| EditorError::InvalidField { field, value: text.to_string() })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_lists_are_trimmed() {
        assert_eq!(split_list(" a, b ,,c,"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }


    #[test]
    fn invalid_number_keeps_section() {
        let mut editor = ConfigEditor::new();
        editor.configure_training(TrainingForm::default()).unwrap();

        let form = TrainingForm {
            batch_size: "eight".into(),
            ..TrainingForm::default()
        };
        let err = editor.configure_training(form).unwrap_err();
        assert!(matches!(
            err,
            EditorError::InvalidField { field: "Batch Size", .. }
        ));
        assert_eq!(editor.config().training.batch_size, Some(8));
    }


    #[test]
    fn layer_display_is_one_indexed() {
        let mut editor = ConfigEditor::new();
        let mut params = IndexMap::new();
        params.insert("units".to_string(), "8".to_string());
        params.insert("activation".to_string(), "relu".to_string());
        let spec = editor.add_layer("Dense", params);
        assert_eq!(spec.get("units"), Some(&ParamValue::Int(8)));

        editor.add_layer("Flatten", IndexMap::new());
        assert_eq!(
            editor.layer_display(),
            vec!["1: Dense (units=8, activation=relu)", "2: Flatten ()"]
        );
    }


    #[test]
    fn only_sequential_model() {
        let mut editor = ConfigEditor::new();
        assert!(editor.configure_model("sequential").is_ok());
        assert!(matches!(
            editor.configure_model("functional"),
            Err(EditorError::UnsupportedModel(_))
        ));
        assert_eq!(editor.config().model, "sequential");
    }


    #[test]
    fn forms_reopen_with_section_values() {
        let mut training = TrainingSection::default();
        training.epochs = Some(5);
        let form = TrainingForm::from_section(&training);
        assert_eq!(form.epochs, "5");
        assert_eq!(form.optimizer, "adam");

        let form = DataForm::from_section(None);
        assert_eq!(form.source, "csv");
        assert!(form.inputs.is_empty());
    }


    #[test]
    fn cancelled_save_writes_nothing() {
        let editor = ConfigEditor::new();
        assert!(!editor.write_model_config(None).unwrap());
    }
}
