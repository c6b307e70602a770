use std::env;
use modelsmith::prelude::*;
use modelsmith::error::{ConfigError, DataError, Error};



/// Tests for loading the `data` section.
#[cfg(test)]
pub mod data_tests {
    use super::*;

    fn toy_path() -> String {
        let mut path = env::current_dir().unwrap();
        path.push("tests/dataset/toy.csv");
        path.to_string_lossy().into_owned()
    }


    fn config_with(data: Option<DataSection>) -> ModelConfig {
        ModelConfig { data, ..ModelConfig::default() }
    }


    fn toy_section() -> DataSection {
        DataSection {
            source: Some("csv".into()),
            path: Some(toy_path()),
            inputs: Some(vec!["a".into(), "b".into()]),
            outputs: Some(vec!["c".into()]),
        }
    }


    #[test]
    fn csv_shapes() {
        let dataset = load_dataset(&config_with(Some(toy_section()))).unwrap();
        let rows = dataset.len();
        assert_eq!(rows, 60);
        assert_eq!(dataset.input_shape(), (rows, 2));
        assert_eq!(dataset.target_shape(), (rows, 1));
        assert_eq!(dataset.input_names(), ["a".to_string(), "b".to_string()]);

        let (x, y) = dataset.at(0);
        assert!((x[0] - 0.974).abs() < 1e-6 && (x[1] - 1.736).abs() < 1e-6);
        assert_eq!(y, [1.0_f32]);
    }


    #[test]
    fn column_order_follows_the_config() {
        let mut section = toy_section();
        section.inputs = Some(vec!["b".into(), "a".into()]);
        let dataset = load_dataset(&config_with(Some(section))).unwrap();
        let (x, _) = dataset.at(0);
        assert!((x[0] - 1.736).abs() < 1e-6 && (x[1] - 0.974).abs() < 1e-6);
    }


    #[test]
    fn absent_data_section() {
        let err = load_dataset(&config_with(None)).unwrap_err();
        assert!(err.is_config_error());
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingSection("data"))
        ));
    }


    #[test]
    fn empty_data_section() {
        let config = ModelConfig::from_yaml_str("data: {}\n").unwrap();
        let err = load_dataset(&config).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingSection("data"))
        ));
    }


    #[test]
    fn only_csv_is_supported() {
        let mut section = toy_section();
        section.source = Some("CSV".into());
        let err = load_dataset(&config_with(Some(section))).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::UnsupportedDataType(ref t)) if t == "CSV"
        ));
    }


    #[test]
    fn missing_path_and_columns() {
        let mut section = toy_section();
        section.path = None;
        let err = load_dataset(&config_with(Some(section))).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField("data.path"))
        ));

        let mut section = toy_section();
        section.outputs = Some(Vec::new());
        let err = load_dataset(&config_with(Some(section))).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField("data.outputs"))
        ));
    }


    #[test]
    fn missing_column() {
        let mut section = toy_section();
        section.outputs = Some(vec!["label".into()]);
        let err = load_dataset(&config_with(Some(section))).unwrap_err();
        assert!(matches!(
            err,
            Error::Data(DataError::MissingColumn(ref c)) if c == "label"
        ));
    }


    #[test]
    fn missing_file() {
        let mut section = toy_section();
        section.path = Some("tests/dataset/no_such_file.csv".into());
        let err = load_dataset(&config_with(Some(section))).unwrap_err();
        assert!(matches!(err, Error::Data(DataError::Csv(_))));
    }


    #[test]
    fn text_and_empty_cells_are_not_numbers() {
        let mut path = env::current_dir().unwrap();
        path.push("tests/dataset/broken.csv");
        let path = path.to_string_lossy().into_owned();

        let section = DataSection {
            path: Some(path.clone()),
            inputs: Some(vec!["a".into(), "b".into()]),
            outputs: Some(vec!["a".into()]),
            ..toy_section()
        };
        let err = load_dataset(&config_with(Some(section))).unwrap_err();
        assert!(matches!(
            err,
            Error::Data(DataError::NonNumeric { ref column }) if column == "b"
        ));

        let section = DataSection {
            path: Some(path),
            inputs: Some(vec!["a".into()]),
            outputs: Some(vec!["c".into()]),
            ..toy_section()
        };
        let err = load_dataset(&config_with(Some(section))).unwrap_err();
        assert!(matches!(
            err,
            Error::Data(DataError::NonNumeric { ref column }) if column == "c"
        ));
    }


    #[test]
    fn reader_builder() {
        let dataset = DataReader::new()
            .file(toy_path())
            .has_header(true)
            .inputs(["a"])
            .outputs(["b", "c"])
            .read()
            .unwrap();
        assert_eq!(dataset.input_shape(), (60, 1));
        assert_eq!(dataset.target_shape(), (60, 2));
    }
}
