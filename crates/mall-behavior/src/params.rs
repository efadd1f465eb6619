//! Tunable constants of the transition model.

use crate::{BehaviorError, BehaviorResult};

/// Pedestrian walking speed, distance units per simulated minute.
pub const WALKING_SPEED_PER_MINUTE: f64 = 83.0;

/// Probability that a placed shopper tries to relocate on a given tick.
pub const RELOCATE_PROBABILITY: f64 = 0.05;

/// Parameters of [`MomentumNoveltyModel`][crate::MomentumNoveltyModel].
///
/// The defaults are the calibrated values of the model; tests and what-if
/// runs override individual fields.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MovementParams {
    /// Distance a shopper can cover per minute.  A candidate must be strictly
    /// closer than `walking_speed * minutes_per_iteration`.
    pub walking_speed: f64,

    /// Per-tick probability of attempting a relocation once placed.
    pub relocate_probability: f64,

    /// Base weight when the candidate direction is orthogonal to momentum
    /// (always the case before the first realized move).
    pub neutral_weight: f64,

    /// Base weight when the candidate lies ahead (positive alignment).
    pub forward_weight: f64,

    /// Base weight when the candidate lies behind (negative alignment).
    pub backward_weight: f64,

    /// Added to candidates already in the shopper's visit history.
    pub revisit_bonus: f64,

    /// Added to candidates the shopper has never visited.
    pub novelty_bonus: f64,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            walking_speed:        WALKING_SPEED_PER_MINUTE,
            relocate_probability: RELOCATE_PROBABILITY,
            neutral_weight:       0.5,
            forward_weight:       0.9,
            backward_weight:      0.1,
            revisit_bonus:        0.05,
            novelty_bonus:        0.95,
        }
    }
}

impl MovementParams {
    /// Maximum distance reachable in one tick of `minutes_per_iteration`.
    #[inline]
    pub fn max_reach(&self, minutes_per_iteration: f64) -> f64 {
        self.walking_speed * minutes_per_iteration
    }

    /// Base weight for a candidate with the given alignment.
    #[inline]
    pub fn alignment_weight(&self, alignment: f64) -> f64 {
        if alignment > 0.0 {
            self.forward_weight
        } else if alignment < 0.0 {
            self.backward_weight
        } else {
            self.neutral_weight
        }
    }

    /// Novelty adjustment for a candidate.
    #[inline]
    pub fn novelty_weight(&self, visited: bool) -> f64 {
        if visited { self.revisit_bonus } else { self.novelty_bonus }
    }

    /// Weight the current location always receives: it is orthogonal to any
    /// momentum and is always in the visit history.
    #[inline]
    pub fn self_weight(&self) -> f64 {
        self.neutral_weight + self.revisit_bonus
    }

    /// Reject parameter sets that cannot yield a valid distribution.
    pub fn validate(&self) -> BehaviorResult<()> {
        if !(self.walking_speed.is_finite() && self.walking_speed > 0.0) {
            return Err(BehaviorError::Config(format!(
                "walking_speed must be positive and finite, got {}",
                self.walking_speed
            )));
        }
        if !(0.0..=1.0).contains(&self.relocate_probability) {
            return Err(BehaviorError::Config(format!(
                "relocate_probability must lie in [0, 1], got {}",
                self.relocate_probability
            )));
        }
        let weights = [
            ("neutral_weight", self.neutral_weight),
            ("forward_weight", self.forward_weight),
            ("backward_weight", self.backward_weight),
            ("revisit_bonus", self.revisit_bonus),
            ("novelty_bonus", self.novelty_bonus),
        ];
        if let Some((name, w)) = weights.iter().find(|(_, w)| !(w.is_finite() && *w >= 0.0)) {
            return Err(BehaviorError::Config(format!("{name} must be finite and non-negative, got {w}")));
        }
        if self.self_weight() <= 0.0 {
            return Err(BehaviorError::Config(
                "neutral_weight + revisit_bonus must be positive so staying put is always possible".into(),
            ));
        }
        Ok(())
    }
}
