//! The `Sim` struct and its tick loop.

use mall_agent::{AgentResult, Shopper, ShopperRngs, TickPlan};
use mall_behavior::TransitionModel;
use mall_core::{SimClock, SimConfig, Tick};
use mall_spatial::{Environment, MallGeometry, MoveNotice, MoveSink};

use crate::{SimObserver, SimResult, TickSummary};

/// Running totals over every tick processed so far.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub ticks:      u64,
    pub moves:      u64,
    pub departures: u64,
}

// ── Notification relay ────────────────────────────────────────────────────────

/// Forwards each notice to the environment, then to the observer.
struct Relay<'a, E, O> {
    env:      &'a mut E,
    observer: &'a mut O,
    tick:     Tick,
    moved:    usize,
}

impl<E: MoveSink, O: SimObserver<E>> MoveSink for Relay<'_, E, O> {
    fn notify_move(&mut self, notice: &MoveNotice) {
        self.env.notify_move(notice);
        if notice.to.is_some() {
            self.moved += 1;
        }
        self.observer.on_move(self.tick, notice);
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// Each tick has two phases:
///
/// 1. **Decision phase** (optionally parallel with the `parallel` feature):
///    every admitted, browsing shopper plans its tick with
///    [`Shopper::plan_tick`].  Nothing is mutated except the shoppers' own
///    RNGs, so a failing plan leaves every shopper and the environment as
///    they were.
/// 2. **Apply phase** (sequential, ascending `AgentId` for determinism): each
///    plan is applied and its notice delivered to the environment and the
///    observer.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<E: Environment, M: TransitionModel> {
    /// Global configuration (minutes per tick, total ticks, seed, …).
    pub config: SimConfig,

    /// Simulation clock: tracks the current tick and elapsed minutes.
    pub clock: SimClock,

    /// Every shopper, indexed by `AgentId`.
    pub shoppers: Vec<Shopper>,

    /// Per-shopper deterministic RNGs, separated for the split-borrow pattern.
    pub rngs: ShopperRngs,

    /// Mall geometry and notification sink.
    pub env: E,

    /// The transition model.  Called once per browsing shopper per tick.
    pub model: M,

    pub(crate) totals: RunTotals,

    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,
}

impl<E: Environment, M: TransitionModel> Sim<E, M> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`, or until every
    /// shopper has departed.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    ///
    /// # Errors
    ///
    /// The first shopper error (lowest `AgentId`) of a tick stops the run;
    /// that tick is not applied.
    pub fn run<O: SimObserver<E>>(&mut self, observer: &mut O) -> SimResult<()> {
        tracing::info!(
            shoppers = self.shoppers.len(),
            locations = self.env.location_count(),
            total_ticks = self.config.total_ticks,
            minutes_per_iteration = self.config.minutes_per_iteration,
            seed = self.config.seed,
            "simulation starting"
        );

        loop {
            let now = self.clock.current_tick;
            if now >= self.config.end_tick() {
                break;
            }
            if self.all_departed() {
                tracing::info!(tick = %now, "every shopper has departed");
                break;
            }
            self.step(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);

        tracing::info!(
            clock = %self.clock,
            ticks = self.totals.ticks,
            moves = self.totals.moves,
            departures = self.totals.departures,
            present = self.present_count(),
            "simulation finished"
        );
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`
    /// and does not stop early).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver<E>>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Shoppers currently inside the mall.
    pub fn present_count(&self) -> usize {
        self.shoppers.iter().filter(|s| s.current().is_some()).count()
    }

    /// `true` once every shopper's session has ended (vacuously for an empty
    /// population).
    pub fn all_departed(&self) -> bool {
        self.shoppers.iter().all(Shopper::is_departed)
    }

    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver<E>>(&mut self, observer: &mut O) -> SimResult<TickSummary> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let summary = self.process_tick(now, observer)?;
        observer.on_tick_end(now, &summary);

        let interval = self.config.snapshot_interval_ticks;
        if interval > 0 && now.0.is_multiple_of(interval) {
            observer.on_snapshot(now, &self.shoppers, &self.env);
        }

        self.clock.advance();
        Ok(summary)
    }

    fn process_tick<O: SimObserver<E>>(&mut self, now: Tick, observer: &mut O) -> SimResult<TickSummary> {
        let minutes = self.config.minutes_per_iteration;

        // ── Phase 1: decisions ────────────────────────────────────────────
        let plans = self.decide(now)?;
        let mut summary = TickSummary { active: plans.len(), ..Default::default() };

        // ── Phase 2: apply in ascending AgentId ───────────────────────────
        // Every plan is checked before any is applied, so a rejected plan
        // leaves the whole tick unapplied.
        for (index, plan) in &plans {
            self.shoppers[*index].check_plan(plan)?;
        }
        let mut relay = Relay { env: &mut self.env, observer, tick: now, moved: 0 };
        for (index, plan) in plans {
            if plan == TickPlan::Depart {
                summary.departed += 1;
            }
            self.shoppers[index].apply_tick(plan, minutes, &mut relay)?;
        }
        summary.moved = relay.moved;

        self.totals.ticks += 1;
        self.totals.moves += summary.moved as u64;
        self.totals.departures += summary.departed as u64;

        tracing::trace!(
            tick = %now,
            active = summary.active,
            moved = summary.moved,
            departed = summary.departed,
            "tick applied"
        );
        Ok(summary)
    }

    /// Plan the tick for every admitted, browsing shopper.
    ///
    /// Returns `(index, plan)` pairs in ascending index order, or the error of
    /// the lowest-indexed shopper that failed.
    fn decide(&mut self, now: Tick) -> SimResult<Vec<(usize, TickPlan)>> {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let minutes                        = self.config.minutes_per_iteration;
        let geometry: &dyn MallGeometry    = &self.env;
        let model:    &dyn TransitionModel = &self.model;
        let shoppers                       = self.shoppers.as_slice();
        let rngs                           = &mut self.rngs.inner;

        #[cfg(not(feature = "parallel"))]
        let results: Vec<(usize, AgentResult<TickPlan>)> = shoppers
            .iter()
            .zip(rngs.iter_mut())
            .enumerate()
            .filter(|(_, (s, _))| s.is_active_at(now))
            .map(|(i, (s, rng))| (i, s.plan_tick(geometry, model, minutes, rng)))
            .collect();

        #[cfg(feature = "parallel")]
        let results: Vec<(usize, AgentResult<TickPlan>)> = {
            use rayon::prelude::*;

            let mut plan_all = || {
                shoppers
                    .par_iter()
                    .zip(rngs.par_iter_mut())
                    .enumerate()
                    .filter(|(_, (s, _))| s.is_active_at(now))
                    .map(|(i, (s, rng))| (i, s.plan_tick(geometry, model, minutes, rng)))
                    .collect::<Vec<_>>()
            };
            match &self.pool {
                Some(pool) => pool.install(plan_all),
                None       => plan_all(),
            }
        };

        let mut plans = Vec::with_capacity(results.len());
        for (index, result) in results {
            plans.push((index, result?));
        }
        Ok(plans)
    }
}
