//! The shopper session state machine.
//!
//! ```text
//!            advance (stay within budget)
//!           ┌──────────────┐
//!           ▼              │
//!      ┌──────────┐────────┘        ┌──────────┐
//!  ──▶ │ Browsing │ ──────────────▶ │ Departed │ ──┐ advance = no-op
//!      └──────────┘  stay > budget  └──────────┘ ◀─┘
//! ```
//!
//! # Two-phase ticks
//!
//! A tick is split into [`Shopper::plan_tick`] (read-only, may fail, consumes
//! the shopper's random draws) and [`Shopper::apply_tick`] (mutates the
//! shopper and emits at most one [`MoveNotice`]).  Any error surfaces from
//! the plan, before the shopper or the environment has been touched.
//! [`Shopper::advance`] runs both phases back to back.

use mall_behavior::{MoveDecision, ShopperView, TransitionModel};
use mall_core::{AgentId, LocationId, RandomSource, Tick, Vec2};
use mall_spatial::{Environment, MallGeometry, MoveNotice, MoveSink};

use crate::{AgentError, AgentResult};

// ── SessionState ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    Browsing,
    /// Terminal.  The shopper has left the mall and never acts again.
    Departed,
}

// ── TickPlan ──────────────────────────────────────────────────────────────────

/// What one tick will do to a shopper, computed without mutating it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TickPlan {
    /// The shopper has already departed; applying this does nothing.
    Finished,
    /// The stay budget is exhausted; the shopper leaves without moving.
    Depart,
    /// Apply the model's decision and count the tick.
    Move(MoveDecision),
}

// ── Shopper ───────────────────────────────────────────────────────────────────

/// One simulated shopper.
///
/// Fields are read-only from outside the crate; all mutation goes through
/// the lifecycle methods so the invariants checked by
/// [`check_invariants`](Self::check_invariants) hold.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shopper {
    pub(crate) id:         AgentId,
    pub(crate) name:       String,
    pub(crate) state:      SessionState,
    pub(crate) current:    Option<LocationId>,
    pub(crate) previous:   Option<LocationId>,
    pub(crate) momentum:   Vec2,
    pub(crate) visited:    Vec<LocationId>,
    pub(crate) iterations: u64,
    pub(crate) elapsed:    f64,
    pub(crate) max_stay:   f64,
    pub(crate) start_tick: Tick,
}

impl Shopper {
    /// A browsing shopper with no location that leaves once it has stayed
    /// longer than `max_stay` minutes.
    pub fn new(id: AgentId, name: impl Into<String>, max_stay: f64) -> Self {
        Self {
            id,
            name:       name.into(),
            state:      SessionState::Browsing,
            current:    None,
            previous:   None,
            momentum:   Vec2::ZERO,
            visited:    Vec::new(),
            iterations: 0,
            elapsed:    0.0,
            max_stay,
            start_tick: Tick::ZERO,
        }
    }

    /// Set the tick at which the shopper walks into the mall.
    pub fn with_start_tick(mut self, tick: Tick) -> Self {
        self.start_tick = tick;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline] pub fn id(&self) -> AgentId { self.id }
    #[inline] pub fn name(&self) -> &str { &self.name }
    #[inline] pub fn state(&self) -> SessionState { self.state }
    #[inline] pub fn current(&self) -> Option<LocationId> { self.current }
    #[inline] pub fn previous(&self) -> Option<LocationId> { self.previous }
    #[inline] pub fn momentum(&self) -> Vec2 { self.momentum }
    #[inline] pub fn visited(&self) -> &[LocationId] { &self.visited }
    #[inline] pub fn iterations(&self) -> u64 { self.iterations }
    #[inline] pub fn max_stay(&self) -> f64 { self.max_stay }
    #[inline] pub fn start_tick(&self) -> Tick { self.start_tick }

    /// Minutes spent in the mall so far (`iterations × minutes_per_iteration`
    /// as of the last counted tick).
    #[inline]
    pub fn elapsed_stay(&self) -> f64 {
        self.elapsed
    }

    #[inline]
    pub fn is_departed(&self) -> bool {
        self.state == SessionState::Departed
    }

    /// `true` if the shopper has entered by `now` and not yet left.
    #[inline]
    pub fn is_active_at(&self, now: Tick) -> bool {
        !self.is_departed() && self.start_tick <= now
    }

    /// `true` if the next tick will end the session.
    #[inline]
    pub fn stay_exhausted(&self) -> bool {
        self.state == SessionState::Browsing && self.elapsed > self.max_stay
    }

    /// The read-only slice of state handed to transition models.
    pub fn view(&self) -> ShopperView<'_> {
        ShopperView::new(self.id, self.current, self.momentum, &self.visited)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Decide this tick's outcome without mutating anything.
    ///
    /// Consumes the random draws of the movement attempt (none when the
    /// shopper is departed or departing).
    ///
    /// # Errors
    ///
    /// [`AgentError::Behavior`] if the model rejects the geometry.
    pub fn plan_tick(
        &self,
        geometry:              &dyn MallGeometry,
        model:                 &dyn TransitionModel,
        minutes_per_iteration: f64,
        rng:                   &mut dyn RandomSource,
    ) -> AgentResult<TickPlan> {
        if self.is_departed() {
            return Ok(TickPlan::Finished);
        }
        if self.stay_exhausted() {
            return Ok(TickPlan::Depart);
        }
        model
            .decide(&self.view(), geometry, minutes_per_iteration, rng)
            .map(TickPlan::Move)
            .map_err(|source| AgentError::Behavior { agent: self.id, source })
    }

    /// Check that `plan` still fits this shopper's state, without applying it.
    ///
    /// # Errors
    ///
    /// [`AgentError::InvalidState`] if the plan was computed for a different
    /// state: a relocation from somewhere other than the current location, an
    /// entry for a placed shopper, or a move for a departed one.
    pub fn check_plan(&self, plan: &TickPlan) -> AgentResult<()> {
        match *plan {
            TickPlan::Finished if !self.is_departed() => {
                Err(self.invalid("finished plan applied to a browsing shopper"))
            }
            TickPlan::Depart if self.is_departed() => {
                Err(self.invalid("departure applied to a departed shopper"))
            }
            TickPlan::Move(decision) => self.check_decision(decision),
            _ => Ok(()),
        }
    }

    /// Apply a plan produced by [`plan_tick`](Self::plan_tick) on this
    /// shopper's current state.  Returns the shopper's location afterwards.
    ///
    /// # Errors
    ///
    /// Whatever [`check_plan`](Self::check_plan) reports.  Nothing is mutated
    /// in that case.
    pub fn apply_tick(
        &mut self,
        plan:                  TickPlan,
        minutes_per_iteration: f64,
        sink:                  &mut dyn MoveSink,
    ) -> AgentResult<Option<LocationId>> {
        self.check_plan(&plan)?;
        match plan {
            TickPlan::Finished => Ok(None),
            TickPlan::Depart => {
                self.depart(sink);
                Ok(None)
            }
            TickPlan::Move(decision) => {
                self.apply_decision(decision, sink);
                self.iterations += 1;
                self.elapsed = self.iterations as f64 * minutes_per_iteration;
                Ok(self.current)
            }
        }
    }

    /// Run one tick: plan, then apply.
    ///
    /// Departed shoppers are left untouched and yield `None`.  A shopper whose
    /// elapsed stay already exceeds its budget departs without attempting a
    /// move.  Otherwise the model is consulted, the iteration counter bumped
    /// and elapsed stay recomputed.
    pub fn advance<E: Environment>(
        &mut self,
        env:                   &mut E,
        model:                 &dyn TransitionModel,
        minutes_per_iteration: f64,
        rng:                   &mut dyn RandomSource,
    ) -> AgentResult<Option<LocationId>> {
        let plan = self.plan_tick(&*env, model, minutes_per_iteration, rng)?;
        self.apply_tick(plan, minutes_per_iteration, env)
    }

    /// One movement attempt, without counting a tick.
    ///
    /// Returns the model's decision after applying it.  Departed shoppers
    /// cannot move.
    pub fn attempt_move<E: Environment>(
        &mut self,
        env:                   &mut E,
        model:                 &dyn TransitionModel,
        minutes_per_iteration: f64,
        rng:                   &mut dyn RandomSource,
    ) -> AgentResult<MoveDecision> {
        if self.is_departed() {
            return Err(self.invalid("move attempted by a departed shopper"));
        }
        let decision = model
            .decide(&self.view(), &*env, minutes_per_iteration, rng)
            .map_err(|source| AgentError::Behavior { agent: self.id, source })?;
        self.check_decision(decision)?;
        self.apply_decision(decision, env);
        Ok(decision)
    }

    /// End the session.
    ///
    /// The environment is told about the departure only if the shopper was
    /// standing somewhere.  Calling this on a departed shopper does nothing.
    pub fn depart(&mut self, sink: &mut dyn MoveSink) {
        if self.is_departed() {
            return;
        }
        self.previous = self.current;
        self.current = None;
        self.state = SessionState::Departed;

        if let Some(from) = self.previous {
            sink.notify_move(&MoveNotice { agent: self.id, from: Some(from), to: None });
        }
        tracing::debug!(
            agent = %self.id,
            stay = self.elapsed,
            max_stay = self.max_stay,
            visits = self.visited.len(),
            "shopper departed"
        );
    }

    fn check_decision(&self, decision: MoveDecision) -> AgentResult<()> {
        if self.is_departed() {
            return Err(self.invalid("move applied to a departed shopper"));
        }
        match decision {
            MoveDecision::Idle => Ok(()),
            MoveDecision::SelfLoop { at } if self.current != Some(at) => {
                Err(self.invalid(format!("self-loop at {at} but shopper is elsewhere")))
            }
            MoveDecision::Enter { .. } if self.current.is_some() => {
                Err(self.invalid("entry planned for a shopper that is already placed"))
            }
            MoveDecision::Relocate { from, .. } if self.current != Some(from) => {
                Err(self.invalid(format!("relocation planned from {from} but shopper is elsewhere")))
            }
            _ => Ok(()),
        }
    }

    /// `previous` takes the current location on every attempt, moved or not.
    fn apply_decision(&mut self, decision: MoveDecision, sink: &mut dyn MoveSink) {
        self.previous = self.current;
        match decision {
            MoveDecision::Idle => {
                tracing::trace!(agent = %self.id, "no relocation this tick");
            }
            MoveDecision::SelfLoop { at } => {
                tracing::trace!(agent = %self.id, %at, "relocation drew the current location");
            }
            MoveDecision::Enter { to } => {
                self.current = Some(to);
                self.visited.push(to);
                sink.notify_move(&MoveNotice { agent: self.id, from: None, to: Some(to) });
                tracing::debug!(agent = %self.id, %to, "shopper entered");
            }
            MoveDecision::Relocate { from, to, momentum } => {
                self.current = Some(to);
                self.momentum = momentum;
                self.visited.push(to);
                sink.notify_move(&MoveNotice { agent: self.id, from: Some(from), to: Some(to) });
                tracing::debug!(agent = %self.id, %from, %to, "shopper relocated");
            }
        }
    }

    // ── Invariants ────────────────────────────────────────────────────────

    /// Verify the lifecycle invariants.
    ///
    /// # Errors
    ///
    /// [`AgentError::InvalidState`] naming the first violated invariant.
    pub fn check_invariants(&self) -> AgentResult<()> {
        if self.is_departed() && self.current.is_some() {
            return Err(self.invalid("departed shopper still has a location"));
        }
        if let Some(at) = self.current {
            match self.visited.last() {
                None => return Err(self.invalid("placed shopper has an empty visit history")),
                Some(&last) if last != at => {
                    return Err(self.invalid(format!("current location {at} is not the last visit {last}")));
                }
                Some(_) => {}
            }
        }
        if self.visited.len() as u64 > self.iterations {
            return Err(self.invalid(format!(
                "{} visits recorded in {} ticks",
                self.visited.len(),
                self.iterations
            )));
        }
        if self.visited.len() < 2 && !self.momentum.is_zero() {
            return Err(self.invalid("momentum set before any relocation"));
        }
        if self.max_stay.is_nan() || self.max_stay < 0.0 {
            return Err(self.invalid(format!("max stay {} is not a non-negative duration", self.max_stay)));
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> AgentError {
        AgentError::InvalidState { agent: self.id, reason: reason.into() }
    }
}
