//! `mall-sim`: tick loop driver for the mall shopper simulation.
//!
//! # Two-phase tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks (or until every shopper has departed):
//!   ① Admit    : shoppers whose start tick ≤ now and who have not departed.
//!   ② Decide   : Shopper::plan_tick for each admitted shopper
//!                 (parallel with the `parallel` feature).
//!   ③ Apply    : for each plan in ascending AgentId order:
//!                   Move(Enter / Relocate) → update shopper, notify env
//!                   Move(Idle / SelfLoop)  → count the tick only
//!                   Depart                 → end session, notify env
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the decision phase on Rayon's thread pool.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use mall_sim::{MallConfig, NoopObserver, SimBuilder};
//!
//! let config = MallConfig::load("mall.toml")?;
//! let (shoppers, rngs) = config.population_builder().build()?;
//! let mut sim = SimBuilder::new(config.sim.clone(), shoppers, rngs, env, config.model()?)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use config::{MallConfig, PopulationConfig};
pub use error::{SimError, SimResult};
pub use observer::{MoveLog, NoopObserver, SimObserver, TickSummary};
pub use sim::{RunTotals, Sim};
