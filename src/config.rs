use anyhow::Result;
use figment::{providers::{Env, Format, Serialized, Toml}, Figment};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::simulation::EnvironmentConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "SCS__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// Settings of the demo thermostat runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub episodes: u32,
    pub max_steps: u64,
    /// Months advanced per step (0 keeps the season fixed)
    pub months_per_step: u32,
    pub target_temperature_c: f64,
    pub hysteresis_c: f64,
    /// Energy per °C of deviation from the target
    pub gain: f64,
    pub max_energy: f64,
    /// Energy spent while inside the hysteresis band
    pub idle_energy: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            episodes: 4,
            max_steps: 50,
            months_per_step: 1,
            target_temperature_c: 21.0,
            hysteresis_c: 1.0,
            gain: 2.0,
            max_energy: 3.0,
            idle_energy: 0.1,
        }
    }
}

impl SimulatorConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Defaults, then the TOML file (if present), then `SCS__` environment variables
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(SimulatorConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Ok(figment.extract()?)
    }
}
