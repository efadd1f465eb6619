//! Candidate set and unnormalized weights for one relocation attempt.

use mall_core::LocationId;
use mall_spatial::{reachable_within, MallGeometry};

use crate::{BehaviorResult, MovementParams, ShopperView};

/// Reachable locations and their unnormalized weights, index-aligned.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidates {
    pub locations: Vec<LocationId>,
    pub weights:   Vec<f64>,
}

impl Candidates {
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Normalized probabilities (sum to 1).  Empty if the total weight is
    /// not positive.
    pub fn probabilities(&self) -> Vec<f64> {
        let total = self.total_weight();
        if total <= 0.0 {
            return Vec::new();
        }
        self.weights.iter().map(|w| w / total).collect()
    }

    /// Weight of `location`, if it is a candidate.
    pub fn weight_of(&self, location: LocationId) -> Option<f64> {
        self.locations
            .iter()
            .position(|&l| l == location)
            .map(|i| self.weights[i])
    }
}

/// Compute the candidates for a shopper standing at `from`.
///
/// The current location's direction entry is unused: it counts as orthogonal
/// to the momentum and so always gets the neutral base weight.
///
/// # Errors
///
/// Propagates [`mall_spatial::SpatialError`] for malformed geometry, an
/// out-of-range `from`, or an empty reachable set.
pub fn candidate_weights(
    view:                  &ShopperView<'_>,
    from:                  LocationId,
    geometry:              &dyn MallGeometry,
    params:                &MovementParams,
    minutes_per_iteration: f64,
) -> BehaviorResult<Candidates> {
    let radius = params.max_reach(minutes_per_iteration);
    let locations = reachable_within(geometry, from, radius)?;

    let weights = locations
        .iter()
        .map(|&to| {
            let alignment = if to == from {
                0.0
            } else {
                geometry.direction(from, to).dot(view.momentum)
            };
            params.alignment_weight(alignment) + params.novelty_weight(view.has_visited(to))
        })
        .collect();

    Ok(Candidates { locations, weights })
}
