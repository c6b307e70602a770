use rand::prelude::*;
use rand::distributions::Uniform;
use rand_distr::Normal;
use serde::{Serialize, Deserialize};

const RANDOM_NORMAL_DEVIATION: f32 = 0.05;


/// Weight initialization schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    /// `U(-l, l)` with `l = sqrt(6 / (fan_in + fan_out))`.
    GlorotUniform,
    /// `N(0, 2 / (fan_in + fan_out))`.
    GlorotNormal,
    /// `N(0, 2 / fan_in)`.
    HeNormal,
    /// `U(-l, l)` with `l = sqrt(6 / fan_in)`.
    HeUniform,
    /// `N(0, 0.05^2)`.
    RandomNormal,
    /// All zeros.
    Zeros,
    /// All ones.
    Ones,
}


impl Initializer {
    /// Look up an initializer by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let init = match name.to_ascii_lowercase().as_str() {
            "glorot_uniform" => Self::GlorotUniform,
            "glorot_normal" => Self::GlorotNormal,
            "he_normal" => Self::HeNormal,
            "he_uniform" => Self::HeUniform,
            "random_normal" => Self::RandomNormal,
            "zeros" => Self::Zeros,
            "ones" => Self::Ones,
            _ => return None,
        };
        Some(init)
    }


    /// Draw `n` values for a weight with the given fan-in/fan-out.
    pub(crate) fn sample<R: Rng>(
        &self,
        fan_in: usize,
        fan_out: usize,
        n: usize,
        rng: &mut R,
    ) -> Vec<f32>
    {
        let fan_in = fan_in.max(1) as f32;
        let fan_avg = (fan_in + fan_out.max(1) as f32) / 2.0;
        match self {
            Self::GlorotUniform => uniform((3.0 / fan_avg).sqrt(), n, rng),
            Self::HeUniform => uniform((6.0 / fan_in).sqrt(), n, rng),
            Self::GlorotNormal => normal((1.0 / fan_avg).sqrt(), n, rng),
            Self::HeNormal => normal((2.0 / fan_in).sqrt(), n, rng),
            Self::RandomNormal => normal(RANDOM_NORMAL_DEVIATION, n, rng),
            Self::Zeros => vec![0.0; n],
            Self::Ones => vec![1.0; n],
        }
    }
}


fn uniform<R: Rng>(limit: f32, n: usize, rng: &mut R) -> Vec<f32> {
    let dist = Uniform::new_inclusive(-limit, limit);
    dist.sample_iter(rng).take(n).collect()
}


fn normal<R: Rng>(deviation: f32, n: usize, rng: &mut R) -> Vec<f32> {
    let dist = Normal::new(0.0_f32, deviation)
        .expect("deviation is positive and finite");
    dist.sample_iter(rng).take(n).collect()
}
