//! Deterministic per-agent and simulation-level random sources.
//!
//! # The `RandomSource` seam
//!
//! Every stochastic decision a shopper makes goes through [`RandomSource`],
//! and each decision consumes exactly **one** call:
//!
//! | Decision                         | Call                  |
//! |----------------------------------|-----------------------|
//! | "try to relocate this tick?"     | `bernoulli(p)`        |
//! | first location on entry          | `uniform_index(n)`    |
//! | next location among candidates   | `weighted_index(w)`   |
//!
//! Because the call sequence is fixed, a seeded source reproduces a
//! trajectory exactly and a scripted source can force any branch in tests.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent IDs uniformly across the seed space.
//! Agents never share RNG state, so the decision phase can run on any number
//! of threads and still produce the same trajectories.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── RandomSource ──────────────────────────────────────────────────────────────

/// A source of the three kinds of random decision the movement model makes.
pub trait RandomSource {
    /// `true` with probability `p` (clamped to [0, 1]).
    fn bernoulli(&mut self, p: f64) -> bool;

    /// Uniform index in `0..len`.  `None` when `len == 0`.
    fn uniform_index(&mut self, len: usize) -> Option<usize>;

    /// Index drawn with probability proportional to `weights[i]`.
    ///
    /// The weights need not be normalized.  Returns `None` if `weights` is
    /// empty, contains a negative or non-finite value, or sums to zero.
    fn weighted_index(&mut self, weights: &[f64]) -> Option<usize>;
}

fn draw_weighted(rng: &mut SmallRng, weights: &[f64]) -> Option<usize> {
    WeightedIndex::new(weights).ok().map(|dist| dist.sample(rng))
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Create one per shopper at population build time and keep it alongside the
/// shopper.  During a parallel decision phase each RNG is only touched by
/// the worker deciding for its shopper.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }
}

impl RandomSource for AgentRng {
    #[inline]
    fn bernoulli(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    #[inline]
    fn uniform_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.0.gen_range(0..len))
    }

    #[inline]
    fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        draw_weighted(&mut self.0, weights)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for global operations (population generation, stay
/// budgets, arrival spread).
///
/// Used only in single-threaded contexts.  If you need parallel randomness,
/// give each worker its own child seeded from this one.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}

impl RandomSource for SimRng {
    #[inline]
    fn bernoulli(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    #[inline]
    fn uniform_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.0.gen_range(0..len))
    }

    #[inline]
    fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        draw_weighted(&mut self.0, weights)
    }
}

// ── ScriptedRandom ────────────────────────────────────────────────────────────

/// One pre-recorded outcome for [`ScriptedRandom`].
#[cfg(any(test, feature = "testing"))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Draw {
    Bernoulli(bool),
    Uniform(usize),
    Weighted(usize),
}

/// A [`RandomSource`] that replays a fixed script of outcomes.
///
/// Each call pops the next [`Draw`] and panics if its kind does not match the
/// call, so a test both forces the branch it wants and asserts the call
/// order.  The weights passed to the most recent `weighted_index` call are
/// kept for inspection.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    script:       std::collections::VecDeque<Draw>,
    consumed:     Vec<Draw>,
    last_weights: Option<Vec<f64>>,
}

#[cfg(any(test, feature = "testing"))]
impl ScriptedRandom {
    pub fn new(script: impl IntoIterator<Item = Draw>) -> Self {
        Self {
            script:       script.into_iter().collect(),
            consumed:     Vec::new(),
            last_weights: None,
        }
    }

    /// Draws not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Every draw consumed so far, in call order.
    pub fn consumed(&self) -> &[Draw] {
        &self.consumed
    }

    /// Weights seen by the most recent `weighted_index` call.
    pub fn last_weights(&self) -> Option<&[f64]> {
        self.last_weights.as_deref()
    }

    fn next(&mut self, call: &str) -> Draw {
        let draw = self
            .script
            .pop_front()
            .unwrap_or_else(|| panic!("scripted random source exhausted on {call}"));
        self.consumed.push(draw);
        draw
    }
}

#[cfg(any(test, feature = "testing"))]
impl RandomSource for ScriptedRandom {
    fn bernoulli(&mut self, _p: f64) -> bool {
        match self.next("bernoulli") {
            Draw::Bernoulli(b) => b,
            other => panic!("expected a Bernoulli draw, script has {other:?}"),
        }
    }

    fn uniform_index(&mut self, len: usize) -> Option<usize> {
        match self.next("uniform_index") {
            Draw::Uniform(i) if i < len => Some(i),
            Draw::Uniform(i) => panic!("scripted uniform index {i} out of range 0..{len}"),
            other => panic!("expected a Uniform draw, script has {other:?}"),
        }
    }

    fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        self.last_weights = Some(weights.to_vec());
        match self.next("weighted_index") {
            Draw::Weighted(i) if i < weights.len() => Some(i),
            Draw::Weighted(i) => panic!("scripted weighted index {i} out of range 0..{}", weights.len()),
            other => panic!("expected a Weighted draw, script has {other:?}"),
        }
    }
}
