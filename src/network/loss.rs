use serde::{Serialize, Deserialize};
use std::fmt;

use crate::error::ConfigError;

const EPSILON: f32 = 1e-7;


/// Loss functions available to [`Sequential`](super::Sequential).
/// Each loss is computed per example and averaged over the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    /// Mean of `-(y ln p + (1 - y) ln(1 - p))` over the outputs.
    BinaryCrossentropy,
    /// `-sum(y ln p)` over the outputs.
    CategoricalCrossentropy,
    /// Mean of `(p - y)^2`.
    MeanSquaredError,
    /// Mean of `|p - y|`.
    MeanAbsoluteError,
}


impl fmt::Display for Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BinaryCrossentropy => "binary_crossentropy",
            Self::CategoricalCrossentropy => "categorical_crossentropy",
            Self::MeanSquaredError => "mean_squared_error",
            Self::MeanAbsoluteError => "mean_absolute_error",
        };
        write!(f, "{name}")
    }
}


impl Loss {
    /// Look up a loss by name.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        let loss = match name.to_ascii_lowercase().as_str() {
            "binary_crossentropy" => Self::BinaryCrossentropy,
            "categorical_crossentropy" => Self::CategoricalCrossentropy,
            "mean_squared_error" | "mse" => Self::MeanSquaredError,
            "mean_absolute_error" | "mae" => Self::MeanAbsoluteError,
            _ => return Err(ConfigError::UnknownLoss(name.to_string())),
        };
        Ok(loss)
    }


    /// Loss value of a single example.
    pub fn eval(&self, p: &[f32], y: &[f32]) -> f32 {
        let n = p.len().max(1) as f32;
        match self {
            Self::BinaryCrossentropy => {
                p.iter()
                    .zip(y)
                    .map(|(&pi, &yi)| {
                        let pi = pi.clamp(EPSILON, 1.0 - EPSILON);
                        -(yi * pi.ln() + (1.0 - yi) * (1.0 - pi).ln())
                    })
                    .sum::<f32>() / n
            },
            Self::CategoricalCrossentropy => {
                p.iter()
                    .zip(y)
                    .map(|(&pi, &yi)| -yi * pi.clamp(EPSILON, 1.0).ln())
                    .sum::<f32>()
            },
            Self::MeanSquaredError => {
                p.iter()
                    .zip(y)
                    .map(|(pi, yi)| (pi - yi).powi(2))
                    .sum::<f32>() / n
            },
            Self::MeanAbsoluteError => {
                p.iter()
                    .zip(y)
                    .map(|(pi, yi)| (pi - yi).abs())
                    .sum::<f32>() / n
            },
        }
    }


    /// Returns the gradient of [`Loss::eval`] w.r.t. the prediction `p`.
    pub fn diff(&self, p: &[f32], y: &[f32]) -> Vec<f32> {
        let n = p.len().max(1) as f32;
        match self {
            Self::BinaryCrossentropy => {
                p.iter()
                    .zip(y)
                    .map(|(&pi, &yi)| {
                        let pi = pi.clamp(EPSILON, 1.0 - EPSILON);
                        (pi - yi) / (pi * (1.0 - pi)) / n
                    })
                    .collect()
            },
            Self::CategoricalCrossentropy => {
                p.iter()
                    .zip(y)
                    .map(|(&pi, &yi)| -yi / pi.clamp(EPSILON, 1.0))
                    .collect()
            },
            Self::MeanSquaredError => {
                p.iter()
                    .zip(y)
                    .map(|(pi, yi)| 2.0 * (pi - yi) / n)
                    .collect()
            },
            Self::MeanAbsoluteError => {
                p.iter()
                    .zip(y)
                    .map(|(pi, yi)| (pi - yi).signum() / n)
                    .collect()
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(Loss::from_name("mse").unwrap(), Loss::MeanSquaredError);
        assert_eq!(
            Loss::from_name("Binary_Crossentropy").unwrap(),
            Loss::BinaryCrossentropy
        );
        assert!(Loss::from_name("hinge_of_doom").is_err());
    }


    #[test]
    fn gradients_match_finite_differences() {
        let p = [0.3_f32, 0.6];
        let y = [0.0_f32, 1.0];
        let h = 1e-3_f32;
        for loss in [
            Loss::BinaryCrossentropy,
            Loss::CategoricalCrossentropy,
            Loss::MeanSquaredError,
        ] {
            let analytic = loss.diff(&p, &y);
            for i in 0..p.len() {
                let mut up = p;
                let mut dn = p;
                up[i] += h;
                dn[i] -= h;
                let numeric = (loss.eval(&up, &y) - loss.eval(&dn, &y)) / (2.0 * h);
                assert!(
                    (analytic[i] - numeric).abs() < 1e-2,
                    "{loss}: {} vs {numeric}", analytic[i]
                );
            }
        }
    }


    #[test]
    fn perfect_prediction() {
        let loss = Loss::MeanSquaredError;
        assert_eq!(loss.eval(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }
}
