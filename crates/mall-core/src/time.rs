//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter.  The
//! mapping to simulated minutes is held in `SimClock`:
//!
//!   elapsed_minutes = tick * minutes_per_iteration
//!
//! Shopper stay budgets are expressed in minutes, so the same multiplication
//! is what a shopper uses to recompute its own elapsed stay each tick.

use std::fmt;

use crate::{MallError, MallResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and simulated minutes.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// How many simulated minutes one tick represents.
    pub minutes_per_iteration: f64,
    /// The current tick: advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(minutes_per_iteration: f64) -> Self {
        Self {
            minutes_per_iteration,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated minutes since tick 0.
    #[inline]
    pub fn elapsed_minutes(&self) -> f64 {
        self.current_tick.0 as f64 * self.minutes_per_iteration
    }

    /// Break elapsed time into (hour, minute) components from sim start.
    pub fn elapsed_hm(&self) -> (u64, u32) {
        let total = self.elapsed_minutes().max(0.0) as u64;
        (total / 60, (total % 60) as u32)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m) = self.elapsed_hm();
        write!(f, "{} (+{:02}:{:02})", self.current_tick, h, m)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from the `[sim]` table of a TOML file by `mall-sim` and
/// passed to the simulation runner.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Simulated minutes per tick.  Also scales the per-tick walking radius.
    pub minutes_per_iteration: f64,

    /// Total ticks to simulate.  The run also stops early once every shopper
    /// has departed.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical trajectories.
    pub seed: u64,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Emit a snapshot every N ticks.  0 disables snapshots.
    pub snapshot_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            minutes_per_iteration:   1.0,
            total_ticks:             12 * 60,
            seed:                    0,
            num_threads:             None,
            snapshot_interval_ticks: 0,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.minutes_per_iteration)
    }

    /// Reject configurations the tick loop cannot run.
    pub fn validate(&self) -> MallResult<()> {
        if !(self.minutes_per_iteration.is_finite() && self.minutes_per_iteration > 0.0) {
            return Err(MallError::Config(format!(
                "minutes_per_iteration must be positive and finite, got {}",
                self.minutes_per_iteration
            )));
        }
        if self.num_threads == Some(0) {
            return Err(MallError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}
