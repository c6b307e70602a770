use polars::prelude::*;

use std::path::{Path, PathBuf};

use crate::error::DataError;
use super::dataset::Dataset;


/// A struct that reads a CSV file into a [`Dataset`].
/// # Example
/// The following code reads the columns `a, b` as features
/// and the column `c` as target.
/// ```no_run
/// use modelsmith::DataReader;
///
/// let dataset = DataReader::new()
///     .file("/path/to/csv/file.csv")
///     .has_header(true)
///     .inputs(["a", "b"])
///     .outputs(["c"])
///     .read()?;
/// assert_eq!(dataset.input_shape().1, 2);
/// # Ok::<(), modelsmith::error::DataError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DataReader {
    file: Option<PathBuf>,
    has_header: bool,
    inputs: Vec<String>,
    outputs: Vec<String>,
}


impl Default for DataReader {
    fn default() -> Self {
        Self::new()
    }
}


impl DataReader {
    /// Construct a new instance of [`DataReader`].
    /// The header row is expected by default.
    pub fn new() -> Self {
        Self {
            file: None,
            has_header: true,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }


    /// Set the file name.
    pub fn file<P: AsRef<Path>>(mut self, file: P) -> Self {
        self.file = Some(file.as_ref().to_path_buf());
        self
    }


    /// Set the flag whether the file has the header row or not.
    /// Without a header, columns are named `column_1`, `column_2`, ...
    pub fn has_header(mut self, flag: bool) -> Self {
        self.has_header = flag;
        self
    }


    /// Set the feature columns, in order.
    pub fn inputs<I, S>(mut self, columns: I) -> Self
        where I: IntoIterator<Item = S>,
              S: ToString,
    {
        self.inputs = columns.into_iter().map(|c| c.to_string()).collect();
        self
    }


    /// Set the target columns, in order.
    pub fn outputs<I, S>(mut self, columns: I) -> Self
        where I: IntoIterator<Item = S>,
              S: ToString,
    {
        self.outputs = columns.into_iter().map(|c| c.to_string()).collect();
        self
    }


    /// Reads the file and selects the configured columns.
    /// Every selected column is cast to `f32`.
    /// This method consumes `self`.
    pub fn read(self) -> Result<Dataset, DataError> {
        let file = self.file.ok_or_else(|| {
            let err = std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "The file name for csv is not set",
            );
            DataError::Csv(PolarsError::from(err))
        })?;

        let df = CsvReader::from_path(&file)?
            .has_header(self.has_header)
            .finish()?;

        // Every referenced column must exist before anything is converted.
        let names = df.get_column_names();
        let missing = self.inputs.iter()
            .chain(&self.outputs)
            .find(|column| !names.contains(&column.as_str()));
        if let Some(column) = missing {
            return Err(DataError::MissingColumn(column.clone()));
        }

        let inputs = select_rows(&df, &self.inputs)?;
        let targets = select_rows(&df, &self.outputs)?;

        tracing::debug!(
            "read {} rows from {}", df.height(), file.display()
        );

        Ok(Dataset::new(inputs, targets, self.inputs, self.outputs))
    }
}


/// Convert the given columns of `df` into rows of `f32`.
fn select_rows(df: &DataFrame, columns: &[String])
    -> Result<Vec<Vec<f32>>, DataError>
{
    let n_rows = df.height();
    let mut rows = vec![Vec::with_capacity(columns.len()); n_rows];

    for name in columns {
        let series = df.column(name)?
            .cast(&DataType::Float32)?;
        let values = series.f32()?
            .into_iter()
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| DataError::NonNumeric { column: name.clone() })?;

        rows.iter_mut()
            .zip(values)
            .for_each(|(row, v)| row.push(v));
    }
    Ok(rows)
}
