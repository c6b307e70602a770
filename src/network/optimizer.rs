use serde::{Serialize, Deserialize};
use std::fmt;

const BETA_1: f32 = 0.9;
const BETA_2: f32 = 0.999;
const RHO: f32 = 0.9;
const EPSILON: f32 = 1e-7;
const ADAGRAD_INITIAL_ACCUMULATOR: f32 = 0.1;


/// Update rules available to [`Sequential`](super::Sequential).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    /// Stochastic gradient descent with optional momentum.
    Sgd {
        /// Momentum factor, `0` disables it.
        momentum: f32,
        /// Use Nesterov momentum.
        nesterov: bool,
    },
    /// Adam.
    Adam,
    /// RMSprop.
    RmsProp,
    /// Adagrad.
    Adagrad,
}


/// Moment estimates of one parameter slice.
#[derive(Debug, Clone, Default)]
struct Slot {
    first: Vec<f32>,
    second: Vec<f32>,
}


/// An optimizer with its learning rate and per-parameter state.
///
/// Parameters are addressed by slot number;
/// the model passes its parameter slices in the same order every step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Optimizer {
    kind: OptimizerKind,
    learning_rate: f32,
    #[serde(skip)]
    slots: Vec<Slot>,
    #[serde(skip)]
    iterations: u64,
}


impl fmt::Display for Optimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(learning_rate={})", self.name(), self.learning_rate)
    }
}


impl Optimizer {
    /// Construct a new optimizer.
    pub fn new(kind: OptimizerKind, learning_rate: f32) -> Self {
        Self { kind, learning_rate, slots: Vec::new(), iterations: 0 }
    }


    /// Resolve an optimizer by name, ignoring case.
    /// Unknown names fall back to `Adam`.
    ///
    /// Any spelling of a known name matches, so `sgd`, `SGD` and `Sgd`
    /// all give SGD. A lookup of the title-cased name alone
    /// (`"sgd"` -> `"Sgd"`) would miss `SGD` and `RMSprop`
    /// and silently train with Adam instead.
    pub fn resolve(name: &str, learning_rate: f32) -> Self {
        let kind = match name.trim().to_ascii_lowercase().as_str() {
            "adam" => OptimizerKind::Adam,
            "sgd" => OptimizerKind::Sgd { momentum: 0.0, nesterov: false },
            "rmsprop" => OptimizerKind::RmsProp,
            "adagrad" => OptimizerKind::Adagrad,
            _ => {
                tracing::warn!("unknown optimizer '{name}', using Adam");
                OptimizerKind::Adam
            },
        };
        Self::new(kind, learning_rate)
    }


    /// The update rule.
    pub fn kind(&self) -> OptimizerKind {
        self.kind
    }


    /// The registry name of the update rule.
    pub fn name(&self) -> &'static str {
        match self.kind {
            OptimizerKind::Sgd { .. } => "SGD",
            OptimizerKind::Adam => "Adam",
            OptimizerKind::RmsProp => "RMSprop",
            OptimizerKind::Adagrad => "Adagrad",
        }
    }


    /// The learning rate.
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }


    /// Number of steps taken so far.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }


    /// Drop all state, e.g. when the model is rebuilt.
    pub(crate) fn reset(&mut self) {
        self.slots.clear();
        self.iterations = 0;
    }


    /// Start a new step. Must be called once before the `apply` calls
    /// of a mini-batch.
    pub(crate) fn begin_step(&mut self) {
        self.iterations += 1;
    }


    /// Update `param` in place with the gradient `grad`.
    pub(crate) fn apply(&mut self, slot: usize, param: &mut [f32], grad: &[f32]) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, Slot::default);
        }
        let state = &mut self.slots[slot];
        if state.first.len() != param.len() {
            let init = match self.kind {
                OptimizerKind::Adagrad => ADAGRAD_INITIAL_ACCUMULATOR,
                _ => 0.0,
            };
            state.first = vec![0.0; param.len()];
            state.second = vec![init; param.len()];
        }

        let lr = self.learning_rate;
        match self.kind {
            OptimizerKind::Sgd { momentum, nesterov } => {
                let velocity = &mut state.first;
                for ((p, g), v) in param.iter_mut().zip(grad).zip(velocity) {
                    *v = momentum * *v - lr * g;
                    if nesterov {
                        *p += momentum * *v - lr * g;
                    } else {
                        *p += *v;
                    }
                }
            },
            OptimizerKind::Adam => {
                let t = self.iterations.max(1) as i32;
                let correction = (1.0 - BETA_2.powi(t)).sqrt()
                    / (1.0 - BETA_1.powi(t));
                let lr_t = lr * correction;
                let moments = state.first.iter_mut().zip(state.second.iter_mut());
                for ((p, g), (m, v)) in param.iter_mut().zip(grad).zip(moments) {
                    *m = BETA_1 * *m + (1.0 - BETA_1) * g;
                    *v = BETA_2 * *v + (1.0 - BETA_2) * g * g;
                    *p -= lr_t * *m / (v.sqrt() + EPSILON);
                }
            },
            OptimizerKind::RmsProp => {
                let average = &mut state.second;
                for ((p, g), v) in param.iter_mut().zip(grad).zip(average) {
                    *v = RHO * *v + (1.0 - RHO) * g * g;
                    *p -= lr * g / (v.sqrt() + EPSILON);
                }
            },
            OptimizerKind::Adagrad => {
                let accumulator = &mut state.second;
                for ((p, g), acc) in param.iter_mut().zip(grad).zip(accumulator) {
                    *acc += g * g;
                    *p -= lr * g / (acc.sqrt() + EPSILON);
                }
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_ignores_case() {
        assert_eq!(Optimizer::resolve("SGD", 0.1).name(), "SGD");
        assert_eq!(Optimizer::resolve("RmsProp", 0.1).name(), "RMSprop");
        assert_eq!(Optimizer::resolve("adagrad", 0.1).name(), "Adagrad");
        assert_eq!(Optimizer::resolve("RMSPROP", 0.1).name(), "RMSprop");
        assert_eq!(Optimizer::resolve("sgd", 0.1).name(), "SGD");
    }


    #[test]
    fn unknown_name_falls_back_to_adam() {
        let opt = Optimizer::resolve("notreal", 0.01);
        assert_eq!(opt.kind(), OptimizerKind::Adam);
        assert_eq!(opt.learning_rate(), 0.01);
    }


    #[test]
    fn every_rule_descends() {
        // Minimize f(p) = p^2 starting at p = 1.
        for name in ["sgd", "adam", "rmsprop", "adagrad"] {
            let mut opt = Optimizer::resolve(name, 0.1);
            let mut p = [1.0_f32];
            for _ in 0..50 {
                let g = [2.0 * p[0]];
                opt.begin_step();
                opt.apply(0, &mut p, &g);
            }
            assert!(p[0].abs() < 0.9, "{name}: {}", p[0]);
        }
    }
}
