//! `mall-spatial`: the environment a shopper moves through.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`geometry`]    | `MallGeometry` (read side), `MoveSink` (write side), `MoveNotice` |
//! | [`environment`] | `MatrixEnvironment` + builder, `Location`, occupancy counts     |
//! | [`error`]       | `SpatialError`, `SpatialResult<T>`                              |
//!
//! # Read / write split
//!
//! The movement model only ever *reads* geometry (location count, distance,
//! direction) and *writes* through a single notification call.  Keeping the
//! two halves as separate traits lets the simulation share `&G` across
//! worker threads during the decision phase while notifications are applied
//! afterwards, one at a time, through `&mut S`.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod environment;
pub mod error;
pub mod geometry;


pub use environment::{Location, MatrixEnvironment, MatrixEnvironmentBuilder};
pub use error::{SpatialError, SpatialResult};
pub use geometry::{check_geometry, reachable_within, Environment, MallGeometry, MoveNotice, MoveSink};
