//! Fluent builder for constructing a [`Sim`].

use mall_agent::{Shopper, ShopperRngs};
use mall_behavior::TransitionModel;
use mall_core::{AgentId, SimConfig};
use mall_spatial::Environment;

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<E, M>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: minutes per tick, total ticks, seed, …
/// - `Vec<Shopper>` + [`ShopperRngs`]: from [`mall_agent::PopulationBuilder`]
/// - `E: Environment`: mall geometry plus notification sink
/// - `M: TransitionModel`: e.g. [`mall_behavior::MomentumNoveltyModel`]
///
/// # Example
///
/// ```rust,ignore
/// let (shoppers, rngs) = PopulationBuilder::new(n, seed).build()?;
/// let mut sim = SimBuilder::new(config, shoppers, rngs, env, MomentumNoveltyModel::default())
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<E: Environment, M: TransitionModel> {
    config:   SimConfig,
    shoppers: Vec<Shopper>,
    rngs:     ShopperRngs,
    env:      E,
    model:    M,
}

impl<E: Environment, M: TransitionModel> SimBuilder<E, M> {
    /// Create a builder with all required inputs.
    pub fn new(
        config:   SimConfig,
        shoppers: Vec<Shopper>,
        rngs:     ShopperRngs,
        env:      E,
        model:    M,
    ) -> Self {
        Self { config, shoppers, rngs, env, model }
    }

    /// Validate inputs and return a ready-to-run [`Sim`].
    ///
    /// The environment's geometry is not checked here: a malformed
    /// environment is reported by the first tick that consults it.
    pub fn build(self) -> SimResult<Sim<E, M>> {
        self.config.validate()?;

        let count = self.shoppers.len();
        if self.rngs.len() != count {
            return Err(SimError::AgentCountMismatch {
                expected: count,
                got:      self.rngs.len(),
                what:     "shopper RNGs",
            });
        }
        if let Some((i, s)) = self
            .shoppers
            .iter()
            .enumerate()
            .find(|(i, s)| AgentId::try_from(*i).ok() != Some(s.id()))
        {
            return Err(SimError::Config(format!(
                "shopper at index {i} has id {}; ids must equal their index",
                s.id()
            )));
        }

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Sim {
            clock:    self.config.make_clock(),
            config:   self.config,
            shoppers: self.shoppers,
            rngs:     self.rngs,
            env:      self.env,
            model:    self.model,
            totals:   Default::default(),
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}
