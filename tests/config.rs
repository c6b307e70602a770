use modelsmith::prelude::*;
use modelsmith::config::{DEFAULT_BATCH_SIZE, DEFAULT_SEED};



/// Tests for `ModelConfig`.
#[cfg(test)]
pub mod config_tests {
    use super::*;

    fn full_config() -> ModelConfig {
        let data = DataSection {
            source: Some("csv".into()),
            path: Some("data/train.csv".into()),
            inputs: Some(vec!["a".into(), "b".into()]),
            outputs: Some(vec!["c".into()]),
        };
        let training = TrainingSection {
            optimizer: Some("adam".into()),
            loss: Some("binary_crossentropy".into()),
            learning_rate: Some(0.001),
            metrics: Some(vec!["accuracy".into()]),
            batch_size: Some(8),
            epochs: Some(1000),
            validation_split: Some(0.2),
        };
        ModelConfig {
            data: Some(data),
            model: "sequential".into(),
            layers: vec![
                LayerSpec::new("Input").param("shape", vec![2_i64]),
                LayerSpec::new("Dense")
                    .param("units", 8_i64)
                    .param("activation", "relu"),
                LayerSpec::new("Dropout").param("rate", 0.5),
                LayerSpec::new("Dense")
                    .param("units", 1_i64)
                    .param("activation", "sigmoid"),
            ],
            training,
            random_seed: 0,
        }
    }


    #[test]
    fn round_trip() {
        let config = full_config();
        let text = config.to_yaml_string().unwrap();
        let read = ModelConfig::from_yaml_str(&text).unwrap();
        assert_eq!(config, read);
    }


    #[test]
    fn top_level_keys_in_order() {
        let text = full_config().to_yaml_string().unwrap();
        let positions = ["data:", "model:", "layers:", "training:", "random_seed:"]
            .into_iter()
            .map(|key| {
                text.lines()
                    .position(|line| line.starts_with(key))
                    .unwrap_or_else(|| panic!("{key} missing in\n{text}"))
            })
            .collect::<Vec<_>>();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
    }


    #[test]
    fn layers_keep_order_and_fields() {
        let text = "\
layers:
- type: Dense
  units: 8
  activation: relu
  use_bias: false
- type: Dropout
  rate: 0.25
- type: Dense
  units: 1
";
        let config = ModelConfig::from_yaml_str(text).unwrap();
        let kinds = config.layers.iter()
            .map(|spec| spec.kind.as_str())
            .collect::<Vec<_>>();
        assert_eq!(kinds, vec!["Dense", "Dropout", "Dense"]);

        let first = &config.layers[0];
        let keys = first.params.keys().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(keys, vec!["units", "activation", "use_bias"]);
        assert_eq!(first.get("units"), Some(&ParamValue::Int(8)));
        assert_eq!(first.get("use_bias"), Some(&ParamValue::Bool(false)));
        assert_eq!(
            config.layers[1].get("rate"),
            Some(&ParamValue::Float(0.25))
        );

        // Written back, every record starts with its type.
        let written = config.to_yaml_string().unwrap();
        assert!(written.contains("- type: Dense\n  units: 8\n  activation: relu"));
    }


    #[test]
    fn missing_sections_take_defaults() {
        let config = ModelConfig::from_yaml_str("model: sequential\n").unwrap();
        assert!(config.data.is_none());
        assert!(config.layers.is_empty());
        assert_eq!(config.random_seed, DEFAULT_SEED);
        assert_eq!(config.training.batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(config.training.optimizer(), "adam");
        assert_eq!(config.training.metrics(), vec!["accuracy".to_string()]);

        let config = ModelConfig::from_yaml_str("").unwrap();
        assert_eq!(config.model, "sequential");

        let config = ModelConfig::from_yaml_str("layers:\ntraining:\n").unwrap();
        assert!(config.layers.is_empty());
        assert_eq!(config.training, TrainingSection::default());
    }


    #[test]
    fn save_and_load() {
        let mut path = std::env::temp_dir();
        path.push("modelsmith_config_save_and_load.yaml");

        let config = full_config();
        config.save(&path).unwrap();
        let read = ModelConfig::load(&path).unwrap();
        assert_eq!(config, read);
    }


    #[test]
    fn editor_values_are_coerced() {
        assert_eq!(ParamValue::coerce("8"), ParamValue::Int(8));
        assert_eq!(ParamValue::coerce("0.5"), ParamValue::Float(0.5));
        assert_eq!(ParamValue::coerce("True"), ParamValue::Bool(true));
        assert_eq!(
            ParamValue::coerce("[4, 2]"),
            ParamValue::List(vec![ParamValue::Int(4), ParamValue::Int(2)])
        );
        assert_eq!(ParamValue::coerce("relu"), ParamValue::Str("relu".into()));
    }
}
