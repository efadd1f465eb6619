//! TOML run configuration.
//!
//! ```toml
//! [sim]
//! minutes_per_iteration = 1.0
//! total_ticks           = 720
//! seed                  = 42
//!
//! [movement]
//! relocate_probability = 0.05
//!
//! [population]
//! count                = 250
//! min_stay_minutes     = 30.0
//! max_stay_minutes     = 180.0
//! arrival_window_ticks = 120
//! ```
//!
//! Every table and every key is optional; missing values fall back to the
//! defaults of [`SimConfig`], [`MovementParams`] and [`PopulationConfig`].

use std::path::Path;

use mall_agent::PopulationBuilder;
use mall_behavior::{MomentumNoveltyModel, MovementParams};
use mall_core::SimConfig;
use serde::{Deserialize, Serialize};

use crate::{SimError, SimResult};

/// The whole run configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MallConfig {
    pub sim:        SimConfig,
    pub movement:   MovementParams,
    pub population: PopulationConfig,
}

/// How many shoppers to create and how long they may stay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub count:                usize,
    pub min_stay_minutes:     f64,
    pub max_stay_minutes:     f64,
    /// Start ticks are spread uniformly over `[0, arrival_window_ticks]`.
    pub arrival_window_ticks: u64,
    pub name_prefix:          String,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            count:                100,
            min_stay_minutes:     30.0,
            max_stay_minutes:     180.0,
            arrival_window_ticks: 0,
            name_prefix:          "shopper-".into(),
        }
    }
}

impl MallConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> SimResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run can use.
    pub fn validate(&self) -> SimResult<()> {
        self.sim.validate()?;
        self.movement.validate()?;

        let p = &self.population;
        if u32::try_from(p.count).is_err() {
            return Err(SimError::Config(format!("population.count {} is too large", p.count)));
        }
        if !(p.min_stay_minutes.is_finite() && p.min_stay_minutes >= 0.0) {
            return Err(SimError::Config(format!(
                "population.min_stay_minutes must be finite and non-negative, got {}",
                p.min_stay_minutes
            )));
        }
        if p.max_stay_minutes.is_nan() || p.max_stay_minutes < p.min_stay_minutes {
            return Err(SimError::Config(format!(
                "population.max_stay_minutes ({}) is below min_stay_minutes ({})",
                p.max_stay_minutes, p.min_stay_minutes
            )));
        }
        Ok(())
    }

    /// A population builder seeded with the run seed.
    pub fn population_builder(&self) -> PopulationBuilder {
        let p = &self.population;
        PopulationBuilder::new(p.count, self.sim.seed)
            .max_stay_range(p.min_stay_minutes, p.max_stay_minutes)
            .arrival_window(p.arrival_window_ticks)
            .name_prefix(p.name_prefix.clone())
    }

    /// The movement model described by `[movement]`.
    pub fn model(&self) -> SimResult<MomentumNoveltyModel> {
        Ok(MomentumNoveltyModel::new(self.movement.clone())?)
    }
}
