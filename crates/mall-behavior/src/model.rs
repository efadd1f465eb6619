//! The `TransitionModel` trait and its implementations.

use mall_core::{LocationId, RandomSource};
use mall_spatial::{check_geometry, MallGeometry, SpatialError};

use crate::{candidate_weights, BehaviorError, BehaviorResult, MoveDecision, MovementParams, ShopperView};

/// Pluggable movement rule.
///
/// Given a read-only [`ShopperView`], the mall geometry and a random source,
/// decide what the shopper does this tick.  Implementations must not keep
/// per-shopper state: everything that varies per shopper lives in the view.
///
/// # Draw order
///
/// Every random decision must consume exactly one `rng` call, always in the
/// same order for the same branch, so a seeded source reproduces a trajectory
/// and a scripted source can force each branch.
///
/// # Thread safety
///
/// The simulation may call `decide` for many shoppers in parallel via
/// Rayon, so implementations must be `Send + Sync`.
pub trait TransitionModel: Send + Sync + 'static {
    fn decide(
        &self,
        view:                  &ShopperView<'_>,
        geometry:              &dyn MallGeometry,
        minutes_per_iteration: f64,
        rng:                   &mut dyn RandomSource,
    ) -> BehaviorResult<MoveDecision>;
}

/// Uniform first placement over all `n` locations (one `uniform_index` call).
fn enter_uniformly(n: usize, rng: &mut dyn RandomSource) -> BehaviorResult<MoveDecision> {
    let index = rng.uniform_index(n).ok_or(SpatialError::NoLocations)?;
    Ok(MoveDecision::Enter { to: LocationId(index as u32) })
}

// ── MomentumNoveltyModel ──────────────────────────────────────────────────────

/// Speed-limited random walk biased towards continuing in the same direction
/// and towards places not yet visited.
///
/// Draw order for a placed shopper: `bernoulli` → (reachable set, no draw)
/// → `weighted_index`.  For an unplaced shopper: `uniform_index` only.
#[derive(Clone, Debug, Default)]
pub struct MomentumNoveltyModel {
    params: MovementParams,
}

impl MomentumNoveltyModel {
    /// Build a model, rejecting parameters that cannot form a distribution.
    pub fn new(params: MovementParams) -> BehaviorResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &MovementParams {
        &self.params
    }
}

impl TransitionModel for MomentumNoveltyModel {
    fn decide(
        &self,
        view:                  &ShopperView<'_>,
        geometry:              &dyn MallGeometry,
        minutes_per_iteration: f64,
        rng:                   &mut dyn RandomSource,
    ) -> BehaviorResult<MoveDecision> {
        let n = check_geometry(geometry)?;

        let Some(from) = view.current else {
            return enter_uniformly(n, rng);
        };

        if !rng.bernoulli(self.params.relocate_probability) {
            return Ok(MoveDecision::Idle);
        }

        let candidates = candidate_weights(view, from, geometry, &self.params, minutes_per_iteration)?;
        let pick = rng
            .weighted_index(&candidates.weights)
            .ok_or(BehaviorError::DegenerateWeights { from })?;
        let to = candidates.locations[pick];

        tracing::trace!(
            agent = %view.agent,
            %from,
            %to,
            candidates = candidates.len(),
            "relocation draw"
        );

        if to == from {
            Ok(MoveDecision::SelfLoop { at: from })
        } else {
            Ok(MoveDecision::Relocate { from, to, momentum: geometry.direction(from, to) })
        }
    }
}

// ── StationaryModel ───────────────────────────────────────────────────────────

/// Enters at a uniformly random location and never moves again.
///
/// Useful as a placeholder in tests or for "passive" shoppers (staff, people
/// queueing) that occupy a location without browsing.
pub struct StationaryModel;

impl TransitionModel for StationaryModel {
    fn decide(
        &self,
        view:                   &ShopperView<'_>,
        geometry:               &dyn MallGeometry,
        _minutes_per_iteration: f64,
        rng:                    &mut dyn RandomSource,
    ) -> BehaviorResult<MoveDecision> {
        let n = check_geometry(geometry)?;
        match view.current {
            None    => enter_uniformly(n, rng),
            Some(_) => Ok(MoveDecision::Idle),
        }
    }
}
