use indexmap::IndexMap;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::console::Console;
use crate::error::EditorError;
use crate::network::LayerRegistry;
use super::{ConfigEditor, DataForm, TrainingForm};


const MENU: [&str; 7] = [
    "Configure Data",
    "Configure Training",
    "Configure Model",
    "Add Layer",
    "Set Random Seed",
    "Save Config",
    "Quit",
];


/// The menu-driven editor over a [`Console`].
///
/// Every form shows the current values as defaults;
/// an empty answer keeps them. End of input leaves the current form,
/// and at the main menu it ends the session.
pub struct EditorSession<R, W> {
    editor: ConfigEditor,
    console: Console<R, W>,
}


impl<R: BufRead, W: Write> EditorSession<R, W> {
    /// Construct a session over an empty document.
    pub fn new(console: Console<R, W>) -> Self {
        Self { editor: ConfigEditor::new(), console }
    }


    /// The document being edited.
    pub fn editor(&self) -> &ConfigEditor {
        &self.editor
    }


    /// Consume the session and return the editor and the console.
    pub fn into_parts(self) -> (ConfigEditor, Console<R, W>) {
        (self.editor, self.console)
    }


    /// Show the menu until `Quit` or end of input.
    pub fn run(&mut self) -> Result<(), EditorError> {
        self.console.notice("ModelSmith Configurator")?;
        loop {
            self.show_menu()?;
            let Some(choice) = self.console.prompt("Choice:")? else {
                return Ok(());
            };
            match choice.as_str() {
                "1" => self.data_form()?,
                "2" => self.training_form()?,
                "3" => self.model_form()?,
                "4" => self.layer_form()?,
                "5" => self.seed_form()?,
                "6" => self.save_form()?,
                "7" | "q" => return Ok(()),
                "" => {},
                _ => self.console.warn(format!("Unknown choice '{choice}'."))?,
            }
        }
    }


    fn show_menu(&mut self) -> Result<(), EditorError> {
        self.console.say("")?;
        for (i, item) in MENU.iter().enumerate() {
            self.console.say(format!("  {}) {item}", i + 1))?;
        }
        self.console.say("Layers:")?;
        for line in self.editor.layer_display() {
            self.console.say(format!("  {line}"))?;
        }
        Ok(())
    }


    fn data_form(&mut self) -> Result<(), EditorError> {
        let current = DataForm::from_section(self.editor.config().data.as_ref());
        let fields = [
            ("Type", current.source),
            ("Path", current.path),
            ("Inputs (comma-separated)", current.inputs),
            ("Outputs (comma-separated)", current.outputs),
        ];
        let Some(answers) = self.ask_all(fields)? else { return Ok(()); };
        let [source, path, inputs, outputs] = answers;

        self.editor.configure_data(DataForm { source, path, inputs, outputs });
        Ok(())
    }


    fn training_form(&mut self) -> Result<(), EditorError> {
        let mut form = TrainingForm::from_section(&self.editor.config().training);
        loop {
            let fields = [
                ("Optimizer", form.optimizer.clone()),
                ("Loss", form.loss.clone()),
                ("Learning Rate", form.learning_rate.clone()),
                ("Metrics (comma-separated)", form.metrics.clone()),
                ("Batch Size", form.batch_size.clone()),
                ("Epochs", form.epochs.clone()),
                ("Validation Split", form.validation_split.clone()),
            ];
            let Some(answers) = self.ask_all(fields)? else { return Ok(()); };
            let [
                optimizer,
                loss,
                learning_rate,
                metrics,
                batch_size,
                epochs,
                validation_split,
            ] = answers;
            form = TrainingForm {
                optimizer,
                loss,
                learning_rate,
                metrics,
                batch_size,
                epochs,
                validation_split,
            };

            match self.editor.configure_training(form.clone()) {
                Ok(()) => return Ok(()),
                Err(err @ EditorError::InvalidField { .. }) => {
                    self.console.warn(err.to_string())?;
                },
                Err(err) => return Err(err),
            }
        }
    }


    fn model_form(&mut self) -> Result<(), EditorError> {
        let current = self.editor.config().model.clone();
        let question = format!("Select Model Type {:?}", super::SUPPORTED_MODELS);
        let Some(name) = self.console.prompt_default(&question, &current)? else {
            return Ok(());
        };
        match self.editor.configure_model(&name) {
            Ok(()) => {},
            Err(err @ EditorError::UnsupportedModel(_)) => {
                self.console.warn(err.to_string())?;
            },
            Err(err) => return Err(err),
        }
        Ok(())
    }


    fn layer_form(&mut self) -> Result<(), EditorError> {
        let names = LayerRegistry::names().join(", ");
        self.console.say(format!("Available layer types: {names}"))?;
        let kind = match self.console.prompt("Layer Type:")? {
            Some(kind) if !kind.is_empty() => kind,
            _ => return Ok(()),
        };

        let mut params = IndexMap::new();
        loop {
            let question = "Add Parameter (\"-\" removes the last, empty to finish):";
            let name = match self.console.prompt(question)? {
                Some(name) if !name.is_empty() => name,
                _ => break,
            };
            if name == "-" {
                if let Some((removed, _)) = params.pop() {
                    self.console.say(format!("Removed parameter: {removed}"))?;
                }
                continue;
            }
            let value = self.console.prompt(&format!("{name}:"))?
                .unwrap_or_default();
            params.insert(name, value);
        }

        let spec = self.editor.add_layer(kind, params);
        let line = format!("Added layer: {}", spec.describe());
        self.console.notice(line)?;
        Ok(())
    }


    fn seed_form(&mut self) -> Result<(), EditorError> {
        let current = self.editor.config().random_seed.to_string();
        let Some(seed) = self.console.prompt_default("Random Seed", &current)?
        else {
            return Ok(());
        };
        match seed.parse::<u64>() {
            Ok(seed) => self.editor.set_random_seed(seed),
            Err(_) => {
                let err = EditorError::InvalidField {
                    field: "Random Seed",
                    value: seed,
                };
                self.console.warn(err.to_string())?;
            },
        }
        Ok(())
    }


    fn save_form(&mut self) -> Result<(), EditorError> {
        let path = self.console.prompt("Save as (empty to cancel):")?
            .filter(|path| !path.is_empty())
            .map(|path| {
                let mut path = PathBuf::from(path);
                if path.extension().is_none() {
                    path.set_extension("yaml");
                }
                path
            });

        // A failed write keeps the document so another path can be tried.
        match self.editor.write_model_config(path.as_deref()) {
            Ok(true) => self.console.notice("Configuration saved successfully!")?,
            Ok(false) => self.console.say("Save cancelled.")?,
            Err(err @ EditorError::Config(_)) => {
                self.console.warn(format!("Could not save: {err}"))?;
            },
            Err(err) => return Err(err),
        }
        Ok(())
    }


    /// Ask every field in order.
    /// Returns `None` if the input ends before the last answer.
    fn ask_all<const N: usize>(&mut self, fields: [(&str, String); N])
        -> Result<Option<[String; N]>, EditorError>
    {
        let mut answers = Vec::with_capacity(N);
        for (label, default) in fields {
            match self.console.prompt_default(label, &default)? {
                Some(answer) => answers.push(answer),
                None => return Ok(None),
            }
        }
        Ok(answers.try_into().ok())
    }
}
