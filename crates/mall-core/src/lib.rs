//! `mall-core`: foundational types for the mall shopper simulation.
//!
//! This crate is a dependency of every other `mall-*` crate.  It has no
//! `mall-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `LocationId`                               |
//! | [`geo`]         | `Vec2`: planar direction / momentum vector            |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]         | `RandomSource`, `AgentRng` (per-agent), `SimRng`      |
//! | [`error`]       | `MallError`, `MallResult`                             |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `serde`   | Adds `Serialize`/`Deserialize` to all public types.      |
//! | `testing` | Exposes `rng::ScriptedRandom` for forcing random draws.  |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{MallError, MallResult};
pub use geo::Vec2;
pub use ids::{AgentId, LocationId};
pub use rng::{AgentRng, RandomSource, SimRng};
pub use time::{SimClock, SimConfig, Tick};

#[cfg(any(test, feature = "testing"))]
pub use rng::{Draw, ScriptedRandom};
