//! Simulation observer trait for progress reporting and data collection.

use mall_agent::Shopper;
use mall_core::Tick;
use mall_spatial::MoveNotice;

/// Per-tick counts reported to [`SimObserver::on_tick_end`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Shoppers admitted and not departed at the start of the tick.
    pub active:   usize,
    /// Realized moves this tick (entries included, departures excluded).
    pub moved:    usize,
    /// Shoppers whose session ended this tick.
    pub departed: usize,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  `E` is the simulation's environment type,
/// handed to [`on_snapshot`](Self::on_snapshot).
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress { interval: u64 }
///
/// impl<E> SimObserver<E> for Progress {
///     fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: {} browsing", summary.active);
///         }
///     }
/// }
/// ```
pub trait SimObserver<E> {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per environment notification during the apply phase, in
    /// the order the environment receives them.
    fn on_move(&mut self, _tick: Tick, _notice: &MoveNotice) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called at snapshot intervals (every `config.snapshot_interval_ticks`
    /// ticks), after the tick has been applied.
    fn on_snapshot(&mut self, _tick: Tick, _shoppers: &[Shopper], _env: &E) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl<E> SimObserver<E> for NoopObserver {}

/// Keeps every notice with the tick it happened on.
#[derive(Debug, Default)]
pub struct MoveLog {
    pub moves: Vec<(Tick, MoveNotice)>,
}

impl<E> SimObserver<E> for MoveLog {
    fn on_move(&mut self, tick: Tick, notice: &MoveNotice) {
        self.moves.push((tick, *notice));
    }
}
