use serde::{Serialize, Deserialize};
use std::fmt;

use crate::error::ConfigError;
use super::loss::Loss;

const THRESHOLD: f32 = 0.5;


/// Metrics reported during training and evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Binary or categorical accuracy, chosen from the loss
    /// and the output width.
    Accuracy,
    /// Fraction of outputs on the right side of `0.5`.
    BinaryAccuracy,
    /// Fraction of rows whose arg-max matches.
    CategoricalAccuracy,
    /// Mean squared error.
    Mse,
    /// Mean absolute error.
    Mae,
}


impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Accuracy => "accuracy",
            Self::BinaryAccuracy => "binary_accuracy",
            Self::CategoricalAccuracy => "categorical_accuracy",
            Self::Mse => "mse",
            Self::Mae => "mae",
        };
        write!(f, "{name}")
    }
}


impl Metric {
    /// Look up a metric by name.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        let metric = match name.trim().to_ascii_lowercase().as_str() {
            "accuracy" | "acc" => Self::Accuracy,
            "binary_accuracy" => Self::BinaryAccuracy,
            "categorical_accuracy" => Self::CategoricalAccuracy,
            "mse" | "mean_squared_error" => Self::Mse,
            "mae" | "mean_absolute_error" => Self::Mae,
            _ => return Err(ConfigError::UnknownMetric(name.to_string())),
        };
        Ok(metric)
    }


    /// Returns `true` for the accuracy family.
    pub fn is_accuracy(&self) -> bool {
        matches!(
            self,
            Self::Accuracy | Self::BinaryAccuracy | Self::CategoricalAccuracy
        )
    }


    /// Compute the metric over all rows.
    pub fn compute(&self, loss: Loss, preds: &[Vec<f32>], targets: &[Vec<f32>])
        -> f32
    {
        if preds.is_empty() { return 0.0; }

        match self {
            Self::Accuracy => {
                let width = preds[0].len();
                let categorical = loss == Loss::CategoricalCrossentropy
                    || (width > 1 && loss != Loss::BinaryCrossentropy);
                if categorical {
                    Self::CategoricalAccuracy.compute(loss, preds, targets)
                } else {
                    Self::BinaryAccuracy.compute(loss, preds, targets)
                }
            },
            Self::BinaryAccuracy => {
                let (hits, total) = preds.iter()
                    .zip(targets)
                    .flat_map(|(p, y)| p.iter().zip(y))
                    .fold((0_usize, 0_usize), |(hits, total), (p, y)| {
                        let hit = (*p > THRESHOLD) == (*y > THRESHOLD);
                        (hits + hit as usize, total + 1)
                    });
                hits as f32 / total.max(1) as f32
            },
            Self::CategoricalAccuracy => {
                let hits = preds.iter()
                    .zip(targets)
                    .filter(|(p, y)| argmax(p) == argmax(y))
                    .count();
                hits as f32 / preds.len() as f32
            },
            Self::Mse => elementwise_mean(preds, targets, |d| d * d),
            Self::Mae => elementwise_mean(preds, targets, f32::abs),
        }
    }
}


fn argmax(v: &[f32]) -> usize {
    v.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, max), (i, &x)| {
            if x > max { (i, x) } else { (best, max) }
        })
        .0
}


fn elementwise_mean<F>(preds: &[Vec<f32>], targets: &[Vec<f32>], f: F) -> f32
    where F: Fn(f32) -> f32,
{
    let (sum, total) = preds.iter()
        .zip(targets)
        .flat_map(|(p, y)| p.iter().zip(y))
        .fold((0.0_f32, 0_usize), |(sum, total), (p, y)| {
            (sum + f(p - y), total + 1)
        });
    sum / total.max(1) as f32
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_accuracy() {
        let preds = vec![vec![0.9], vec![0.2], vec![0.7], vec![0.4]];
        let targets = vec![vec![1.0], vec![0.0], vec![0.0], vec![0.0]];
        let acc = Metric::Accuracy
            .compute(Loss::BinaryCrossentropy, &preds, &targets);
        assert!((acc - 0.75).abs() < 1e-6);
    }


    #[test]
    fn categorical_accuracy() {
        let preds = vec![vec![0.1, 0.7, 0.2], vec![0.5, 0.3, 0.2]];
        let targets = vec![vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
        let acc = Metric::Accuracy
            .compute(Loss::CategoricalCrossentropy, &preds, &targets);
        assert!((acc - 0.5).abs() < 1e-6);
    }


    #[test]
    fn unknown_metric() {
        assert!(Metric::from_name("f9_score").is_err());
        assert_eq!(Metric::from_name("ACC").unwrap(), Metric::Accuracy);
    }
}
