use serde::{Serialize, Deserialize};
use std::fmt;

/// Activation functions available to layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Identity function
    Linear,
    /// ReLU function.
    Relu,
    /// Sigmoid function
    Sigmoid,
    /// Hyperbolic tangent
    Tanh,
    /// Soft Max function
    Softmax,
    /// Exponential linear unit with `alpha = 1`
    Elu,
    /// `ln(1 + e^x)`
    Softplus,
}


impl Activation {
    /// All names accepted by [`Activation::from_name`].
    pub const NAMES: [&'static str; 7] = [
        "linear", "relu", "sigmoid", "tanh", "softmax", "elu", "softplus",
    ];


    /// Look up an activation by name.
    /// `None` and `"None"` mean `linear`.
    pub fn from_name(name: &str) -> Option<Self> {
        let act = match name.to_ascii_lowercase().as_str() {
            "linear" | "none" => Self::Linear,
            "relu" => Self::Relu,
            "sigmoid" => Self::Sigmoid,
            "tanh" => Self::Tanh,
            "softmax" => Self::Softmax,
            "elu" => Self::Elu,
            "softplus" => Self::Softplus,
            _ => return None,
        };
        Some(act)
    }


    /// Returns the canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Relu => "relu",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Softmax => "softmax",
            Self::Elu => "elu",
            Self::Softplus => "softplus",
        }
    }


    pub(crate) fn eval(&self, x: &[f32]) -> Vec<f32> {
        match self {
            Self::Softmax => softmax(x),
            _ => x.iter().map(|&xi| self.scalar(xi)).collect(),
        }
    }


    /// Given the input `u`, the output `z = f(u)`,
    /// and the gradient w.r.t. `z`,
    /// returns the gradient w.r.t. `u`.
    pub(crate) fn backward(&self, u: &[f32], z: &[f32], grad: &[f32])
        -> Vec<f32>
    {
        match self {
            Self::Softmax => {
                // Jacobian-vector product of softmax.
                let dot = z.iter()
                    .zip(grad)
                    .map(|(zi, gi)| zi * gi)
                    .sum::<f32>();
                z.iter()
                    .zip(grad)
                    .map(|(zi, gi)| zi * (gi - dot))
                    .collect()
            },
            _ => {
                u.iter()
                    .zip(z)
                    .zip(grad)
                    .map(|((&ui, &zi), gi)| self.scalar_diff(ui, zi) * gi)
                    .collect()
            },
        }
    }


    #[inline(always)]
    fn scalar(&self, x: f32) -> f32 {
        match self {
            Self::Linear => x,
            Self::Relu => x.max(0.0),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
            Self::Elu => if x > 0.0 { x } else { x.exp() - 1.0 },
            Self::Softplus => {
                // Avoid overflow of `e^x` for large inputs.
                if x > 20.0 { x } else { x.exp().ln_1p() }
            },
            Self::Softmax => unreachable!("softmax is not elementwise"),
        }
    }


    /// Derivative at `u`, given the output `z = f(u)`.
    #[inline(always)]
    fn scalar_diff(&self, u: f32, z: f32) -> f32 {
        match self {
            Self::Linear => 1.0,
            Self::Relu => if u > 0.0 { 1.0 } else { 0.0 },
            Self::Sigmoid => z * (1.0 - z),
            Self::Tanh => 1.0 - z * z,
            Self::Elu => if u > 0.0 { 1.0 } else { z + 1.0 },
            Self::Softplus => 1.0 / (1.0 + (-u).exp()),
            Self::Softmax => unreachable!("softmax is not elementwise"),
        }
    }
}


impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}


#[inline]
fn softmax(x: &[f32]) -> Vec<f32> {
    let max = x.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps = x.iter().map(|xi| (xi - max).exp()).collect::<Vec<_>>();
    let sum = exps.iter().sum::<f32>();
    exps.into_iter().map(|e| e / sum).collect()
}
