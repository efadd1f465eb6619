//! `mall-behavior`: how a shopper picks its next location.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`params`]   | `MovementParams`: walking speed, relocation odds, weight table    |
//! | [`view`]     | `ShopperView<'a>`: read-only slice of one shopper's state         |
//! | [`decision`] | `MoveDecision`: the outcome of one tick's movement attempt        |
//! | [`weights`]  | `candidate_weights`: reachable set + unnormalized weights         |
//! | [`model`]    | `TransitionModel` trait, `MomentumNoveltyModel`, `StationaryModel` |
//! | [`error`]    | `BehaviorError`, `BehaviorResult<T>`                              |
//!
//! # Transition rule
//!
//! A shopper without a location enters at a uniformly random location.  A
//! placed shopper relocates with small probability each tick; when it does,
//! every location strictly closer than `walking_speed × minutes` is a
//! candidate, weighted by
//!
//! ```text
//! weight(j) = alignment(direction(current, j) · momentum)
//!           + novelty(j ∉ visited)
//! ```
//!
//! and one candidate is drawn in proportion to its weight.
//!
//! Models never mutate anything: they return a [`MoveDecision`] and the
//! caller (mall-agent) applies it.  This keeps the decision phase free of
//! side effects so it can run in parallel across shoppers.

pub mod decision;
pub mod error;
pub mod model;
pub mod params;
pub mod view;
pub mod weights;


pub use decision::MoveDecision;
pub use error::{BehaviorError, BehaviorResult};
pub use model::{MomentumNoveltyModel, StationaryModel, TransitionModel};
pub use params::MovementParams;
pub use view::ShopperView;
pub use weights::{candidate_weights, Candidates};
