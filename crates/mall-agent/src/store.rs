//! Per-shopper random sources, kept apart from the shoppers themselves.
//!
//! The decision phase needs `&Shopper` (read) and `&mut AgentRng` (exclusive)
//! for every active shopper at once.  Holding the RNGs in their own `Vec`
//! lets the simulation zip `shoppers.par_iter()` with `rngs.par_iter_mut()`
//! without fighting the borrow checker.

use mall_core::{AgentId, AgentRng};

/// One deterministic RNG per shopper, indexed by `AgentId`.
///
/// Each RNG is only ever touched by the worker currently deciding for its
/// shopper.
pub struct ShopperRngs {
    pub inner: Vec<AgentRng>,
}

impl ShopperRngs {
    /// Seed `count` RNGs from `global_seed`, one per `AgentId(0..count)`.
    pub fn new(count: usize, global_seed: u64) -> Self {
        let inner = (0..count as u32)
            .map(|i| AgentRng::new(global_seed, AgentId(i)))
            .collect();
        Self { inner }
    }

    /// Mutable reference to one shopper's RNG.  `None` if out of range.
    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> Option<&mut AgentRng> {
        self.inner.get_mut(agent.index())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, AgentRng> {
        self.inner.iter_mut()
    }
}
