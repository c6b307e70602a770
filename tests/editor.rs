use std::env;
use std::io::Cursor;

use indexmap::IndexMap;
use modelsmith::prelude::*;
use modelsmith::console::Console;
use modelsmith::editor::EditorSession;
use modelsmith::error::EditorError;



/// Tests for the configuration editor.
#[cfg(test)]
pub mod editor_tests {
    use super::*;

    #[test]
    fn initial_document() {
        let editor = ConfigEditor::new();
        let config = editor.config();
        assert_eq!(config.model, "sequential");
        assert_eq!(config.random_seed, 0);
        assert!(config.layers.is_empty());
        assert_eq!(config.training, TrainingSection::default());
        assert_eq!(config.data, Some(DataSection::default()));
    }


    #[test]
    fn forms_fill_the_document() {
        let mut editor = ConfigEditor::new();
        editor.configure_data(DataForm {
            source: "csv".into(),
            path: "train.csv".into(),
            inputs: "a, b,".into(),
            outputs: "c".into(),
        });
        editor.configure_training(TrainingForm::default()).unwrap();
        editor.set_random_seed(7);

        let mut params = IndexMap::new();
        params.insert("shape".to_string(), "[2]".to_string());
        editor.add_layer("Input", params);

        let mut params = IndexMap::new();
        params.insert("units".to_string(), "1".to_string());
        params.insert("activation".to_string(), "sigmoid".to_string());
        editor.add_layer("Dense", params);

        let config = editor.config();
        let data = config.data.as_ref().unwrap();
        assert_eq!(data.inputs, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(config.training.batch_size, Some(8));
        assert_eq!(config.training.epochs, Some(1000));
        assert_eq!(config.training.learning_rate, Some(0.001));
        assert_eq!(config.random_seed, 7);
        assert_eq!(
            config.layers[0].get("shape"),
            Some(&ParamValue::List(vec![ParamValue::Int(2)]))
        );

        // The builder accepts what the editor writes.
        let layer = LayerRegistry::construct(&config.layers[1]).unwrap();
        assert_eq!(layer.kind(), "Dense");
    }


    #[test]
    fn write_and_read_back() {
        let mut editor = ConfigEditor::new();
        editor.add_layer("Flatten", IndexMap::new());

        let mut path = env::temp_dir();
        path.push("modelsmith_editor_write.yaml");
        assert!(editor.write_model_config(Some(path.as_path())).unwrap());

        let read = ModelConfig::load(&path).unwrap();
        assert_eq!(&read, editor.config());
    }


    #[test]
    fn invalid_training_value() {
        let mut editor = ConfigEditor::new();
        let form = TrainingForm {
            learning_rate: "fast".into(),
            ..TrainingForm::default()
        };
        let err = editor.configure_training(form).unwrap_err();
        assert!(matches!(
            err,
            EditorError::InvalidField { field: "Learning Rate", ref value } if value == "fast"
        ));
        assert_eq!(editor.config().training, TrainingSection::default());
    }


    #[test]
    fn scripted_session() {
        let mut path = env::temp_dir();
        path.push("modelsmith_editor_session");
        let save_as = path.to_string_lossy().into_owned();

        let script = [
            // Configure Data: type, path, inputs, outputs.
            "1", "", "toy.csv", "a,b", "c",
            // Configure Training: bad batch size, then accept.
            "2", "sgd", "", "", "", "eight", "", "",
            "", "", "", "", "16", "5", "",
            // Configure Model.
            "3", "functional",
            // Add Layer: a parameter is added, removed, and added again.
            "4", "Dense", "units", "4", "use_bias", "False", "-",
            "activation", "relu", "",
            // Set Random Seed.
            "5", "42",
            // Save Config.
            "6", save_as.as_str(),
            // Quit.
            "7",
        ].join("\n") + "\n";

        let console = Console::new(Cursor::new(script), Vec::new());
        let mut session = EditorSession::new(console);
        session.run().unwrap();

        let (editor, console) = session.into_parts();
        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains("Configuration saved successfully!"), "{output}");
        assert!(output.contains("Model functional not supported."), "{output}");
        assert!(output.contains("Invalid value 'eight' for Batch Size."), "{output}");
        assert!(output.contains("Removed parameter: use_bias"), "{output}");
        assert!(output.contains("1: Dense (units=4, activation=relu)"), "{output}");

        let mut saved = path.clone();
        saved.set_extension("yaml");
        let config = ModelConfig::load(&saved).unwrap();
        assert_eq!(&config, editor.config());

        assert_eq!(config.model, "sequential");
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.training.optimizer(), "sgd");
        assert_eq!(config.training.batch_size, Some(16));
        assert_eq!(config.training.epochs, Some(5));
        assert_eq!(config.layers.len(), 1);
        let keys = config.layers[0].params.keys()
            .map(String::as_str)
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["units", "activation"]);
        assert_eq!(
            config.data.as_ref().and_then(|d| d.outputs.clone()),
            Some(vec!["c".to_string()])
        );
    }


    #[test]
    fn type_parameter_replaces_the_kind() {
        let mut editor = ConfigEditor::new();
        let mut params = IndexMap::new();
        params.insert("units".to_string(), "4".to_string());
        params.insert("type".to_string(), "Dense".to_string());
        let spec = editor.add_layer("Dropout", params);
        assert_eq!(spec.kind, "Dense");
        assert!(spec.get("type").is_none());

        let mut path = env::temp_dir();
        path.push("modelsmith_editor_type_param.yaml");
        editor.write_model_config(Some(path.as_path())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("type:").count(), 1, "{text}");
        let read = ModelConfig::load(&path).unwrap();
        assert_eq!(&read, editor.config());
        assert!(LayerRegistry::construct(&read.layers[0]).is_ok());
    }


    #[test]
    fn failed_save_keeps_the_session() {
        let mut bad = env::temp_dir();
        bad.push("modelsmith_no_such_dir");
        bad.push("nested");
        bad.push("model");
        let bad = bad.to_string_lossy().into_owned();

        let mut good = env::temp_dir();
        good.push("modelsmith_editor_retry.yaml");
        let good_name = good.to_string_lossy().into_owned();

        let script = [
            "4", "Dense", "units", "2", "",
            "6", bad.as_str(),
            "6", good_name.as_str(),
            "7",
        ].join("\n") + "\n";

        let console = Console::new(Cursor::new(script), Vec::new());
        let mut session = EditorSession::new(console);
        session.run().unwrap();

        let (editor, console) = session.into_parts();
        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains("Could not save"), "{output}");
        assert_eq!(output.matches("Configuration saved successfully!").count(), 1);

        let read = ModelConfig::load(&good).unwrap();
        assert_eq!(&read, editor.config());
        assert_eq!(read.layers.len(), 1);
    }


    #[test]
    fn end_of_input_quits() {
        let console = Console::new(Cursor::new(""), Vec::new());
        let mut session = EditorSession::new(console);
        session.run().unwrap();
        assert!(session.editor().config().layers.is_empty());
    }
}
