//! Outcome of one movement attempt.

use mall_core::{LocationId, Vec2};

/// What a [`TransitionModel`][crate::TransitionModel] decided for one tick.
///
/// Only [`Enter`][Self::Enter] and [`Relocate`][Self::Relocate] change the
/// shopper's location; the other two are observable no-ops.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MoveDecision {
    /// The relocation trial failed; the shopper stays without sampling.
    Idle,

    /// The trial succeeded but the draw picked the current location.
    SelfLoop { at: LocationId },

    /// First placement of a shopper that had no location.
    Enter { to: LocationId },

    /// A realized transition.  `momentum` is `direction(from, to)`.
    Relocate {
        from:     LocationId,
        to:       LocationId,
        momentum: Vec2,
    },
}

impl MoveDecision {
    /// `true` if applying this decision changes the shopper's location.
    #[inline]
    pub fn is_realized(&self) -> bool {
        matches!(self, MoveDecision::Enter { .. } | MoveDecision::Relocate { .. })
    }

    /// The location the shopper ends up at, if the decision moves it.
    #[inline]
    pub fn destination(&self) -> Option<LocationId> {
        match *self {
            MoveDecision::Enter { to } | MoveDecision::Relocate { to, .. } => Some(to),
            MoveDecision::Idle | MoveDecision::SelfLoop { .. } => None,
        }
    }
}
