//! Fluent builder for a shopper population and its RNGs.
//!
//! # Usage
//!
//! ```rust
//! use mall_agent::PopulationBuilder;
//!
//! let (shoppers, rngs) = PopulationBuilder::new(200, /*seed=*/ 42)
//!     .max_stay_range(30.0, 120.0)
//!     .arrival_window(60)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(shoppers.len(), 200);
//! assert_eq!(rngs.len(), 200);
//! ```

use mall_core::{AgentId, SimRng, Tick};

use crate::{AgentError, AgentResult, Shopper, ShopperRngs};

/// Offset separating the population stream from other uses of the run seed.
const POPULATION_STREAM: u64 = 0x5107;

/// Builds `count` shoppers with ids `0..count`, stay budgets drawn uniformly
/// from a range and start ticks spread uniformly over an arrival window.
///
/// The same `(count, seed, settings)` always yields the same population.
pub struct PopulationBuilder {
    count:          usize,
    seed:           u64,
    min_stay:       f64,
    max_stay:       f64,
    arrival_window: u64,
    name_prefix:    String,
}

impl PopulationBuilder {
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            count,
            seed,
            min_stay:       30.0,
            max_stay:       180.0,
            arrival_window: 0,
            name_prefix:    "shopper-".into(),
        }
    }

    /// Stay budgets, in minutes, are drawn uniformly from `[min, max]`.
    pub fn max_stay_range(mut self, min: f64, max: f64) -> Self {
        self.min_stay = min;
        self.max_stay = max;
        self
    }

    /// Every shopper gets the same stay budget.
    pub fn fixed_max_stay(self, minutes: f64) -> Self {
        self.max_stay_range(minutes, minutes)
    }

    /// Start ticks are drawn uniformly from `[0, ticks]`.  Zero (the default)
    /// admits everyone on the first tick.
    pub fn arrival_window(mut self, ticks: u64) -> Self {
        self.arrival_window = ticks;
        self
    }

    /// Display names are `"{prefix}{id}"`.
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Construct the shoppers and their per-agent RNGs.
    ///
    /// # Errors
    ///
    /// [`AgentError::Config`] if the stay range is negative, non-finite at
    /// the lower end, or reversed, or if `count` does not fit an `AgentId`.
    pub fn build(self) -> AgentResult<(Vec<Shopper>, ShopperRngs)> {
        if !(self.min_stay.is_finite() && self.min_stay >= 0.0) {
            return Err(AgentError::Config(format!(
                "minimum stay must be finite and non-negative, got {}",
                self.min_stay
            )));
        }
        if self.max_stay.is_nan() || self.max_stay < self.min_stay {
            return Err(AgentError::Config(format!(
                "stay range [{}, {}] is empty",
                self.min_stay, self.max_stay
            )));
        }
        if u32::try_from(self.count).is_err() {
            return Err(AgentError::Config(format!("{} shoppers exceed the id space", self.count)));
        }

        let mut rng = SimRng::new(self.seed).child(POPULATION_STREAM);
        let shoppers = (0..self.count as u32)
            .map(|i| {
                let id = AgentId(i);
                let stay = if self.max_stay > self.min_stay && self.max_stay.is_finite() {
                    rng.gen_range(self.min_stay..=self.max_stay)
                } else {
                    self.max_stay
                };
                let start = if self.arrival_window > 0 {
                    rng.gen_range(0..=self.arrival_window)
                } else {
                    0
                };
                Shopper::new(id, format!("{}{}", self.name_prefix, i), stay)
                    .with_start_tick(Tick(start))
            })
            .collect();

        let rngs = ShopperRngs::new(self.count, self.seed);
        tracing::debug!(count = self.count, seed = self.seed, "population built");
        Ok((shoppers, rngs))
    }
}
