//! Read-only view of one shopper, passed to every transition model call.

use mall_core::{AgentId, LocationId, Vec2};

/// The part of a shopper's state a [`TransitionModel`][crate::TransitionModel]
/// may look at.
///
/// Borrowed from the shopper for the duration of one decision; models cannot
/// mutate the shopper through it.
#[derive(Copy, Clone, Debug)]
pub struct ShopperView<'a> {
    pub agent: AgentId,

    /// Where the shopper is now.  `None` before its first placement.
    pub current: Option<LocationId>,

    /// Direction of the most recent realized move; zero before the first one.
    pub momentum: Vec2,

    /// Every location entered so far, in order, revisits included.
    pub visited: &'a [LocationId],
}

impl<'a> ShopperView<'a> {
    #[inline]
    pub fn new(
        agent:    AgentId,
        current:  Option<LocationId>,
        momentum: Vec2,
        visited:  &'a [LocationId],
    ) -> Self {
        Self { agent, current, momentum, visited }
    }

    /// `true` if `location` appears anywhere in the visit history.
    #[inline]
    pub fn has_visited(&self, location: LocationId) -> bool {
        self.visited.contains(&location)
    }
}
