/// A feature matrix and a target matrix of `f32`, stored by rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub(crate) inputs: Vec<Vec<f32>>,
    pub(crate) targets: Vec<Vec<f32>>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}


impl Dataset {
    /// Construct a dataset from row-major matrices.
    /// `inputs` and `targets` must have the same number of rows.
    pub fn new(
        inputs: Vec<Vec<f32>>,
        targets: Vec<Vec<f32>>,
        input_names: Vec<String>,
        output_names: Vec<String>,
    ) -> Self
    {
        assert_eq!(inputs.len(), targets.len());
        Self { inputs, targets, input_names, output_names }
    }


    /// Construct a dataset without column names.
    pub fn from_rows(inputs: Vec<Vec<f32>>, targets: Vec<Vec<f32>>) -> Self {
        let n_in = inputs.first().map_or(0, |r| r.len());
        let n_out = targets.first().map_or(0, |r| r.len());
        let input_names = (1..=n_in).map(|i| format!("x{i}")).collect();
        let output_names = (1..=n_out).map(|i| format!("y{i}")).collect();
        Self::new(inputs, targets, input_names, output_names)
    }


    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }


    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }


    /// Returns the pair of the number of rows and
    /// the number of input columns.
    /// Same as [`Dataset::input_shape`].
    pub fn shape(&self) -> (usize, usize) {
        self.input_shape()
    }


    /// Shape `(rows, n_inputs)` of the feature matrix.
    pub fn input_shape(&self) -> (usize, usize) {
        (self.len(), self.input_names.len())
    }


    /// Shape `(rows, n_outputs)` of the target matrix.
    pub fn target_shape(&self) -> (usize, usize) {
        (self.len(), self.output_names.len())
    }


    /// The feature matrix.
    pub fn inputs(&self) -> &[Vec<f32>] {
        &self.inputs[..]
    }


    /// The target matrix.
    pub fn targets(&self) -> &[Vec<f32>] {
        &self.targets[..]
    }


    /// Feature column names.
    pub fn input_names(&self) -> &[String] {
        &self.input_names[..]
    }


    /// Target column names.
    pub fn output_names(&self) -> &[String] {
        &self.output_names[..]
    }


    /// The `i`-th row as `(x, y)`.
    pub fn at(&self, i: usize) -> (&[f32], &[f32]) {
        (&self.inputs[i][..], &self.targets[i][..])
    }


    /// Split into the first `n` rows and the rest.
    pub fn split_at(&self, n: usize) -> (Self, Self) {
        let n = n.min(self.len());
        let head = (0..n).collect::<Vec<_>>();
        let tail = (n..self.len()).collect::<Vec<_>>();
        (self.subset(&head), self.subset(&tail))
    }


    /// A new dataset with the rows at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Self {
        let inputs = indices.iter().map(|&i| self.inputs[i].clone()).collect();
        let targets = indices.iter().map(|&i| self.targets[i].clone()).collect();
        Self {
            inputs,
            targets,
            input_names: self.input_names.clone(),
            output_names: self.output_names.clone(),
        }
    }
}
