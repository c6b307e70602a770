use colored::Colorize;
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;

use crate::data::Dataset;
use crate::error::ModelError;
use super::history::{EpochRecord, History};
use super::layer::*;
use super::loss::Loss;
use super::metric::Metric;
use super::optimizer::Optimizer;

const WIDTH: usize = 9;
const RULE: &str =
    "----------------------------------------------------------------";


/// Training configuration attached by [`Sequential::compile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compiled {
    /// The update rule.
    pub optimizer: Optimizer,
    /// The loss to minimize.
    pub loss: Loss,
    /// Metrics reported by `fit` and `evaluate`.
    pub metrics: Vec<Metric>,
}


/// Options of [`Sequential::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    batch_size: usize,
    epochs: usize,
    validation_split: f64,
    verbose: bool,
}


impl Default for FitOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            epochs: 1,
            validation_split: 0.0,
            verbose: true,
        }
    }
}


impl FitOptions {
    /// Set the mini-batch size.
    /// Default is `32`.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }


    /// Set the number of epochs.
    /// Default is `1`.
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }


    /// Set the fraction of rows, taken from the end of the data
    /// before shuffling, that is held out for validation.
    /// Default is `0`.
    pub fn validation_split(mut self, split: f64) -> Self {
        self.validation_split = split;
        self
    }


    /// If `true`, `fit` prints one line per epoch.
    /// Default is `true`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}


/// Loss and metric values over a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Mean loss.
    pub loss: f32,
    /// Metric values, in compile order.
    pub metrics: Vec<(String, f32)>,
}


impl Evaluation {
    /// The first metric of the accuracy family, if any.
    pub fn accuracy(&self) -> Option<f32> {
        self.metrics.iter()
            .find(|(name, _)| {
                Metric::from_name(name).is_ok_and(|m| m.is_accuracy())
            })
            .map(|(_, value)| *value)
    }
}


/// Per-layer gradients. `None` for layers without parameters.
struct Gradients(Vec<Option<DenseGrad>>);


impl Gradients {
    fn zeros(layers: &[Layer]) -> Self {
        let grads = layers.iter()
            .map(|layer| match layer {
                Layer::Dense(dense) => Some(DenseGrad::zeros(dense)),
                _ => None,
            })
            .collect();
        Self(grads)
    }


    fn add(&mut self, other: &Self) {
        self.0.iter_mut()
            .zip(&other.0)
            .for_each(|(a, b)| {
                if let (Some(a), Some(b)) = (a, b) { a.add(b); }
            });
    }


    fn scale(&mut self, c: f32) {
        self.0.iter_mut()
            .flatten()
            .for_each(|g| g.scale(c));
    }
}


/// A linear stack of layers.
/// ```text
///  x ─▶ [layer 1] ─▶ [layer 2] ─▶ ... ─▶ [layer L] ─▶ y
/// ```
/// # Example
/// ```no_run
/// use modelsmith::prelude::*;
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let mut rng = StdRng::seed_from_u64(83);
/// let mut model = Sequential::new();
/// model.add(Layer::Dense(Dense::new(8, Activation::Relu)));
/// model.add(Layer::Dense(Dense::new(1, Activation::Sigmoid)));
/// model.compile(
///     Optimizer::resolve("adam", 1e-2),
///     Loss::BinaryCrossentropy,
///     vec![Metric::Accuracy],
/// );
/// # let dataset = Dataset::from_rows(vec![vec![0.0, 1.0]], vec![vec![1.0]]);
/// let history = model.fit(&dataset, FitOptions::default().epochs(5), &mut rng)?;
/// # Ok::<(), modelsmith::error::ModelError>(())
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sequential {
    layers: Vec<Layer>,
    input_dim: Option<usize>,
    compiled: Option<Compiled>,
}


impl Sequential {
    /// Construct an empty model.
    pub fn new() -> Self {
        Self::default()
    }


    /// Append a layer at the end of the stack.
    pub fn add(&mut self, layer: Layer) {
        self.layers.push(layer);
        // The new layer has no weights yet.
        self.input_dim = None;
    }


    /// The layers, in order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers[..]
    }


    /// Number of layers, including an `Input` layer.
    pub fn len(&self) -> usize {
        self.layers.len()
    }


    /// Returns `true` if there are no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }


    /// Returns `true` if all weights are allocated.
    pub fn is_built(&self) -> bool {
        self.input_dim.is_some()
    }


    /// Input dimension declared by a leading `Input` layer.
    pub fn declared_input_dim(&self) -> Option<usize> {
        match self.layers.first() {
            Some(Layer::Input(input)) => Some(input.shape.iter().product()),
            _ => None,
        }
    }


    /// The training configuration, if compiled.
    pub fn compiled(&self) -> Option<&Compiled> {
        self.compiled.as_ref()
    }


    /// Allocate the weights of every layer for `input_dim` features
    /// and returns the output dimension.
    pub fn build<R: Rng>(&mut self, input_dim: usize, rng: &mut R)
        -> Result<usize, ModelError>
    {
        if self.layers.is_empty() {
            return Err(ModelError::EmptyModel);
        }
        if let Some(pos) = self.layers.iter().skip(1).position(Layer::is_input) {
            return Err(ModelError::MisplacedInput(pos + 1));
        }

        let mut dim = input_dim;
        for layer in self.layers.iter_mut() {
            dim = layer.build(dim, rng)?;
        }
        if self.input_dim != Some(input_dim) {
            if let Some(compiled) = self.compiled.as_mut() {
                compiled.optimizer.reset();
            }
        }
        self.input_dim = Some(input_dim);
        Ok(dim)
    }


    /// Output dimension, if the input dimension is known.
    pub fn output_dim(&self) -> Option<usize> {
        let input_dim = self.input_dim.or_else(|| self.declared_input_dim())?;
        let dim = self.layers.iter()
            .fold(input_dim, |dim, layer| layer.output_dim(dim));
        Some(dim)
    }


    /// Attach the optimizer, the loss, and the metrics.
    pub fn compile(
        &mut self,
        optimizer: Optimizer,
        loss: Loss,
        metrics: Vec<Metric>,
    )
    {
        self.compiled = Some(Compiled { optimizer, loss, metrics });
    }


    /// Evaluate the given rows in inference mode.
    pub fn predict(&self, inputs: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, ModelError> {
        let input_dim = self.input_dim.ok_or(ModelError::NotBuilt)?;
        if let Some(row) = inputs.iter().find(|row| row.len() != input_dim) {
            return Err(ModelError::ShapeMismatch {
                expected: input_dim,
                actual: row.len(),
            });
        }

        let outputs = inputs.par_iter()
            .map(|x| {
                self.layers.iter()
                    .fold(x.clone(), |z, layer| layer.forward(z))
            })
            .collect();
        Ok(outputs)
    }


    /// Train the model on `data`.
    ///
    /// The last `validation_split` fraction of rows is held out
    /// before shuffling. The remaining rows are shuffled by `rng`
    /// at every epoch and split into mini-batches.
    /// Per-example gradients of a mini-batch are computed in parallel.
    pub fn fit<R: Rng>(
        &mut self,
        data: &Dataset,
        options: FitOptions,
        rng: &mut R,
    ) -> Result<History, ModelError>
    {
        let (loss, metrics) = match &self.compiled {
            Some(compiled) => (compiled.loss, compiled.metrics.clone()),
            None => return Err(ModelError::NotCompiled),
        };
        if data.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let n_features = data.input_shape().1;
        let output_dim = self.build(n_features, rng)?;
        let n_targets = data.target_shape().1;
        if output_dim != n_targets {
            return Err(ModelError::ShapeMismatch {
                expected: output_dim,
                actual: n_targets,
            });
        }

        let split = options.validation_split.clamp(0.0, 1.0);
        let n_train = (data.len() as f64 * (1.0 - split)) as usize;
        let (train, valid) = data.split_at(n_train);
        if train.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        tracing::debug!(
            "fit on {} rows, validate on {} rows", train.len(), valid.len()
        );

        let batch_size = options.batch_size.max(1);
        let mut order = (0..train.len()).collect::<Vec<_>>();
        let mut history = History::default();
        let now = Instant::now();

        for epoch in 1..=options.epochs {
            order.shuffle(rng);

            let mut loss_sum = 0.0_f32;
            let mut preds = vec![Vec::new(); train.len()];
            for batch in order.chunks(batch_size) {
                let seeds = batch.iter()
                    .map(|_| rng.gen::<u64>())
                    .collect::<Vec<_>>();

                let results = batch.par_iter()
                    .zip(seeds.par_iter())
                    .map(|(&i, &seed)| {
                        let mut sample_rng = StdRng::seed_from_u64(seed);
                        let (x, y) = train.at(i);
                        self.sample_gradient(x, y, loss, &mut sample_rng)
                    })
                    .collect::<Vec<_>>();

                let mut total = Gradients::zeros(&self.layers);
                for ((grad, value, pred), &i) in results.into_iter().zip(batch) {
                    total.add(&grad);
                    loss_sum += value;
                    preds[i] = pred;
                }
                total.scale(1.0 / batch.len() as f32);
                self.apply_gradients(total);
            }

            let train_loss = loss_sum / train.len() as f32;
            let train_metrics = metrics.iter()
                .map(|m| (m.to_string(), m.compute(loss, &preds, train.targets())))
                .collect::<Vec<_>>();
            let (val_loss, val_metrics) = if valid.is_empty() {
                (None, Vec::new())
            } else {
                let eval = self.evaluate_with(&valid, loss, &metrics)?;
                (Some(eval.loss), eval.metrics)
            };

            let record = EpochRecord {
                epoch,
                loss: train_loss,
                metrics: train_metrics,
                val_loss,
                val_metrics,
                time_ms: now.elapsed().as_millis(),
            };
            if options.verbose {
                print_epoch(&record, options.epochs);
            }
            tracing::debug!("epoch {epoch}: loss = {train_loss}");
            history.epochs.push(record);
        }

        Ok(history)
    }


    /// Compute the loss and the compiled metrics on `data`.
    pub fn evaluate(&self, data: &Dataset) -> Result<Evaluation, ModelError> {
        let compiled = self.compiled.as_ref().ok_or(ModelError::NotCompiled)?;
        if data.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        self.evaluate_with(data, compiled.loss, &compiled.metrics)
    }


    fn evaluate_with(&self, data: &Dataset, loss: Loss, metrics: &[Metric])
        -> Result<Evaluation, ModelError>
    {
        let preds = self.predict(data.inputs())?;
        // Summed in row order so that the value does not depend on scheduling.
        let total = preds.iter()
            .zip(data.targets())
            .map(|(p, y)| loss.eval(p, y))
            .sum::<f32>();
        let metrics = metrics.iter()
            .map(|m| (m.to_string(), m.compute(loss, &preds, data.targets())))
            .collect();
        Ok(Evaluation { loss: total / data.len() as f32, metrics })
    }


    /// Forward and backward pass for one example.
    /// Returns the gradients, the loss value, and the prediction.
    fn sample_gradient<R: Rng>(
        &self,
        x: &[f32],
        y: &[f32],
        loss: Loss,
        rng: &mut R,
    ) -> (Gradients, f32, Vec<f32>)
    {
        let mut traces = Vec::with_capacity(self.layers.len());
        let mut z = x.to_vec();
        for layer in &self.layers {
            let (output, trace) = layer.forward_train(z, rng);
            traces.push(trace);
            z = output;
        }

        let value = loss.eval(&z, y);
        let mut delta = loss.diff(&z, y);
        let mut grads = Gradients::zeros(&self.layers);
        let backward = self.layers.iter()
            .zip(traces)
            .zip(grads.0.iter_mut())
            .rev();
        for ((layer, trace), grad) in backward {
            delta = layer.backward(trace, delta, grad.as_mut());
        }
        (grads, value, z)
    }


    fn apply_gradients(&mut self, grads: Gradients) {
        let Some(compiled) = self.compiled.as_mut() else { return; };
        let optimizer = &mut compiled.optimizer;
        optimizer.begin_step();

        let mut slot = 0;
        for (layer, grad) in self.layers.iter_mut().zip(grads.0) {
            if let (Layer::Dense(dense), Some(grad)) = (layer, grad) {
                let [kernel, bias] = dense.params_mut();
                optimizer.apply(slot, kernel, &grad.kernel);
                optimizer.apply(slot + 1, bias, &grad.bias);
                slot += 2;
            }
        }
    }


    /// Total number of trainable parameters, if the input dimension is known.
    pub fn param_count(&self) -> Option<usize> {
        let mut dim = self.input_dim.or_else(|| self.declared_input_dim())?;
        let mut total = 0;
        for layer in &self.layers {
            total += layer.param_count(dim);
            dim = layer.output_dim(dim);
        }
        Some(total)
    }


    /// Renders a table of layers, output shapes, and parameter counts.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        lines.push("Model: \"sequential\"".to_string());
        lines.push(RULE.to_string());
        lines.push(format!(
            " {:<30}{:<20}{:>10}", "Layer (type)", "Output Shape", "Param #"
        ));
        lines.push(RULE.replace('-', "="));

        let mut counts = HashMap::new();
        let mut dim = self.input_dim.or_else(|| self.declared_input_dim());
        for layer in &self.layers {
            let name = match layer.name() {
                Some(name) => name.to_string(),
                None => auto_name(layer.kind(), &mut counts),
            };
            let params = dim.map(|d| layer.param_count(d));
            dim = dim.map(|d| layer.output_dim(d))
                .or_else(|| match layer {
                    Layer::Dense(dense) => Some(dense.units),
                    _ => None,
                });

            let shape = match dim {
                Some(d) => format!("(None, {d})"),
                None => "(None, ?)".to_string(),
            };
            let params = params.map_or_else(|| "?".to_string(), |p| p.to_string());
            lines.push(format!(
                " {:<30}{:<20}{:>10}",
                format!("{name} ({})", layer.kind()), shape, params
            ));
        }
        lines.push(RULE.replace('-', "="));

        let total = self.param_count()
            .map_or_else(|| "?".to_string(), |p| p.to_string());
        lines.push(format!(" Total params: {total}"));
        if let Some(compiled) = &self.compiled {
            let metrics = compiled.metrics.iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!(
                " Optimizer: {}, loss: {}, metrics: [{metrics}]",
                compiled.optimizer, compiled.loss,
            ));
        }
        lines.push(RULE.to_string());
        lines.join("\n")
    }


    /// Save the model (layers, weights, and training configuration) as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }


    /// Load a model written by [`Sequential::save`].
    /// Optimizer state starts afresh.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let file = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(file)?)
    }
}


/// `dense`, `dense_1`, `dense_2`, ...
fn auto_name(kind: &'static str, counts: &mut HashMap<&'static str, usize>)
    -> String
{
    let base = kind.to_ascii_lowercase();
    let count = counts.entry(kind).or_insert(0);
    let name = if *count == 0 { base } else { format!("{base}_{count}") };
    *count += 1;
    name
}


fn print_epoch(record: &EpochRecord, epochs: usize) {
    let metrics = record.metrics.iter()
        .map(|(name, v)| format!("{name}: {v:.4}"))
        .collect::<Vec<_>>()
        .join("  ");
    let mut line = format!(
        "{}    {}    {}",
        format!("  [Epoch {:>5}/{epochs}]", record.epoch).bold().red(),
        format!("[loss {:>WIDTH$.4}]", record.loss).bold().green(),
        format!("[{metrics}]").bold().yellow(),
    );
    if let Some(val_loss) = record.val_loss {
        let val_metrics = record.val_metrics.iter()
            .map(|(name, v)| format!("val_{name}: {v:.4}"))
            .collect::<Vec<_>>()
            .join("  ");
        line.push_str(&format!(
            "    {}",
            format!("[val_loss {val_loss:>WIDTH$.4}  {val_metrics}]").bold().cyan()
        ));
    }
    println!("{line}");
}
