use rand::prelude::*;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::error::ModelError;
use super::activation::Activation;
use super::initializer::Initializer;


/// One layer of a [`Sequential`](super::Sequential) model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Layer {
    /// Declares the input shape. Must be the first layer.
    Input(InputLayer),
    /// Fully connected layer.
    Dense(Dense),
    /// Randomly zeroes inputs while training.
    Dropout(Dropout),
    /// Applies an activation function.
    Activation(ActivationLayer),
    /// Flattens the input. Rows are already flat, so this is the identity.
    Flatten(Flatten),
}


/// `Input(shape=[n, ...])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputLayer {
    /// Optional layer name.
    pub name: Option<String>,
    /// Shape of one example.
    pub shape: Vec<usize>,
}


/// `Dense(units, activation, use_bias, ...)`.
/// Computes `z = activation(Wx + b)`.
/// Here, `x` is an `n`-dimensional vector,
/// `W` is a matrix of size `units x n`,
/// and `b` is a `units`-dimensional vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    /// Optional layer name.
    pub name: Option<String>,
    /// Output dimension.
    pub units: usize,
    /// Activation applied to `Wx + b`.
    pub activation: Activation,
    /// Whether `b` is used.
    pub use_bias: bool,
    /// Initializer of `W`.
    pub kernel_initializer: Initializer,
    /// Initializer of `b`.
    pub bias_initializer: Initializer,
    pub(crate) input_dim: Option<usize>,
    /// Row-major `units x input_dim` matrix.
    pub(crate) kernel: Vec<f32>,
    pub(crate) bias: Vec<f32>,
}


/// `Dropout(rate)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dropout {
    /// Optional layer name.
    pub name: Option<String>,
    /// Fraction of inputs to drop, in `[0, 1)`.
    pub rate: f32,
}


/// `Activation(activation)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationLayer {
    /// Optional layer name.
    pub name: Option<String>,
    /// The activation function.
    pub activation: Activation,
}


/// `Flatten()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flatten {
    /// Optional layer name.
    pub name: Option<String>,
}


/// What a layer keeps from the forward pass for back propagation.
pub(crate) enum Trace {
    Identity,
    Dense { input: Vec<f32>, pre: Vec<f32>, output: Vec<f32> },
    Activation { pre: Vec<f32>, output: Vec<f32> },
    Dropout { mask: Vec<f32> },
}


/// Gradient of a [`Dense`] layer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DenseGrad {
    pub(crate) kernel: Vec<f32>,
    pub(crate) bias: Vec<f32>,
}


impl DenseGrad {
    pub(crate) fn zeros(dense: &Dense) -> Self {
        Self {
            kernel: vec![0.0; dense.kernel.len()],
            bias: vec![0.0; dense.bias.len()],
        }
    }


    pub(crate) fn add(&mut self, other: &Self) {
        add_assign(&mut self.kernel, &other.kernel);
        add_assign(&mut self.bias, &other.bias);
    }


    pub(crate) fn scale(&mut self, c: f32) {
        self.kernel.iter_mut().for_each(|k| *k *= c);
        self.bias.iter_mut().for_each(|b| *b *= c);
    }
}


impl Layer {
    /// The registry name of this layer type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "Input",
            Self::Dense(_) => "Dense",
            Self::Dropout(_) => "Dropout",
            Self::Activation(_) => "Activation",
            Self::Flatten(_) => "Flatten",
        }
    }


    /// The user given name, if any.
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            Self::Input(l) => &l.name,
            Self::Dense(l) => &l.name,
            Self::Dropout(l) => &l.name,
            Self::Activation(l) => &l.name,
            Self::Flatten(l) => &l.name,
        };
        name.as_deref()
    }


    /// Returns `true` for the distinguished input layer.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input(_))
    }


    /// Output dimension for the given input dimension.
    pub fn output_dim(&self, input_dim: usize) -> usize {
        match self {
            Self::Input(l) => l.shape.iter().product(),
            Self::Dense(l) => l.units,
            _ => input_dim,
        }
    }


    /// Number of trainable parameters for the given input dimension.
    pub fn param_count(&self, input_dim: usize) -> usize {
        match self {
            Self::Dense(l) => {
                let bias = if l.use_bias { l.units } else { 0 };
                l.units * input_dim + bias
            },
            _ => 0,
        }
    }


    /// Allocate the weights for the given input dimension.
    /// Layers that are already built for `input_dim` are left untouched.
    pub(crate) fn build<R: Rng>(&mut self, input_dim: usize, rng: &mut R)
        -> Result<usize, ModelError>
    {
        match self {
            Self::Input(l) => {
                let expected = l.shape.iter().product();
                if expected != input_dim {
                    return Err(ModelError::ShapeMismatch {
                        expected,
                        actual: input_dim,
                    });
                }
            },
            Self::Dense(l) => l.build(input_dim, rng),
            _ => {},
        }
        Ok(self.output_dim(input_dim))
    }


    /// Forward propagation without randomness (inference mode).
    pub(crate) fn forward(&self, x: Vec<f32>) -> Vec<f32> {
        match self {
            Self::Dense(l) => {
                let u = l.affine(&x);
                l.activation.eval(&u)
            },
            Self::Activation(l) => l.activation.eval(&x),
            _ => x,
        }
    }


    /// Forward propagation in training mode.
    pub(crate) fn forward_train<R: Rng>(&self, x: Vec<f32>, rng: &mut R)
        -> (Vec<f32>, Trace)
    {
        match self {
            Self::Dense(l) => {
                let pre = l.affine(&x);
                let output = l.activation.eval(&pre);
                let z = output.clone();
                (z, Trace::Dense { input: x, pre, output })
            },
            Self::Activation(l) => {
                let output = l.activation.eval(&x);
                let z = output.clone();
                (z, Trace::Activation { pre: x, output })
            },
            Self::Dropout(l) if l.rate > 0.0 => {
                let keep = 1.0 - l.rate;
                let mask = x.iter()
                    .map(|_| if rng.gen::<f32>() < l.rate { 0.0 } else { 1.0 / keep })
                    .collect::<Vec<_>>();
                let z = x.iter().zip(&mask).map(|(xi, m)| xi * m).collect();
                (z, Trace::Dropout { mask })
            },
            _ => (x, Trace::Identity),
        }
    }


    /// Back propagation.
    /// Accumulates the parameter gradient into `grad` (for `Dense`)
    /// and returns the gradient w.r.t. the input of this layer.
    pub(crate) fn backward(
        &self,
        trace: Trace,
        delta: Vec<f32>,
        grad: Option<&mut DenseGrad>,
    ) -> Vec<f32>
    {
        match (self, trace) {
            (Self::Dense(l), Trace::Dense { input, pre, output }) => {
                let delta = l.activation.backward(&pre, &output, &delta);
                if let Some(grad) = grad {
                    l.accumulate(&input, &delta, grad);
                }
                l.transpose_product(&delta)
            },
            (Self::Activation(l), Trace::Activation { pre, output }) => {
                l.activation.backward(&pre, &output, &delta)
            },
            (_, Trace::Dropout { mask }) => {
                delta.into_iter().zip(mask).map(|(d, m)| d * m).collect()
            },
            _ => delta,
        }
    }
}


impl Dense {
    /// A `Dense` layer with `glorot_uniform` kernel and zero bias.
    pub fn new(units: usize, activation: Activation) -> Self {
        Self {
            name: None,
            units,
            activation,
            use_bias: true,
            kernel_initializer: Initializer::GlorotUniform,
            bias_initializer: Initializer::Zeros,
            input_dim: None,
            kernel: Vec::new(),
            bias: Vec::new(),
        }
    }


    /// Returns `true` if the weights are allocated.
    pub fn is_built(&self) -> bool {
        self.input_dim.is_some()
    }


    fn build<R: Rng>(&mut self, input_dim: usize, rng: &mut R) {
        if self.input_dim == Some(input_dim) { return; }

        self.kernel = self.kernel_initializer
            .sample(input_dim, self.units, self.units * input_dim, rng);
        self.bias = if self.use_bias {
            self.bias_initializer.sample(input_dim, self.units, self.units, rng)
        } else {
            Vec::new()
        };
        self.input_dim = Some(input_dim);
    }


    /// Computes `Wx + b`.
    #[inline(always)]
    pub(crate) fn affine(&self, x: &[f32]) -> Vec<f32> {
        let n = self.input_dim.unwrap_or(x.len()).max(1);
        let mut u = self.kernel.par_chunks(n)
            .map(|w| inner_product(w, x))
            .collect::<Vec<f32>>();
        if self.use_bias {
            add_assign(&mut u, &self.bias);
        }
        u
    }


    /// Computes `W^T delta`.
    #[inline(always)]
    fn transpose_product(&self, delta: &[f32]) -> Vec<f32> {
        let n = self.input_dim.unwrap_or(0);
        let mut out = vec![0.0; n];
        self.kernel.chunks(n.max(1))
            .zip(delta)
            .for_each(|(row, d)| {
                out.iter_mut()
                    .zip(row)
                    .for_each(|(o, w)| { *o += w * d; });
            });
        out
    }


    /// `dW += delta x^T`, `db += delta`.
    #[inline(always)]
    fn accumulate(&self, x: &[f32], delta: &[f32], grad: &mut DenseGrad) {
        let n = x.len();
        grad.kernel.chunks_mut(n.max(1))
            .zip(delta)
            .for_each(|(row, d)| {
                row.iter_mut()
                    .zip(x)
                    .for_each(|(g, xi)| { *g += d * xi; });
            });
        if self.use_bias {
            add_assign(&mut grad.bias, delta);
        }
    }


    /// Parameter slices in optimizer slot order: kernel, then bias.
    pub(crate) fn params_mut(&mut self) -> [&mut [f32]; 2] {
        [&mut self.kernel[..], &mut self.bias[..]]
    }
}


/// Compute the inner-product of the given two slices.
#[inline(always)]
pub(crate) fn inner_product(v1: &[f32], v2: &[f32]) -> f32 {
    v1.iter()
        .zip(v2)
        .map(|(a, b)| a * b)
        .sum::<f32>()
}


#[inline(always)]
pub(crate) fn add_assign(acc: &mut [f32], other: &[f32]) {
    acc.iter_mut()
        .zip(other)
        .for_each(|(a, b)| { *a += b; });
}
