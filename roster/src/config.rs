//! Objective weights and solver configuration. Layered the same way
//! `clockify-flex-rust` layers its own `dotenv` defaults under `clap` flags:
//! defaults → JSON config file → per-field CLI override.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub fill_bonus: f64,
    pub pref_bonus: f64,
    pub designated_bonus: f64,
    pub special_bonus: f64,
    pub fairness_coef: f64,
    pub designated_min: u32,
    pub big_penalty: f64,
    pub consecutive_penalty: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            fill_bonus: 1.0,
            pref_bonus: 10.0,
            designated_bonus: 5.0,
            special_bonus: 20.0,
            fairness_coef: 20.0,
            designated_min: 3,
            big_penalty: 1000.0,
            consecutive_penalty: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Best-effort wall-clock cutoff. See [`crate::backend::MipBackend::solve`].
    #[serde(default, with = "duration_secs_option")]
    pub time_limit: Option<Duration>,
}

mod duration_secs_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        value.map(|d| d.as_secs_f64()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let secs: Option<f64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs_f64))
    }
}
