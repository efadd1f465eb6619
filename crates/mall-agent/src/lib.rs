//! `mall-agent`: shopper session lifecycle and population storage.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`shopper`]   | `Shopper`, `SessionState`, `TickPlan`: the state machine    |
//! | [`store`]     | `ShopperRngs` (one deterministic RNG per shopper)           |
//! | [`builder`]   | `PopulationBuilder` (fluent construction)                   |
//! | [`error`]     | `AgentError`, `AgentResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                    |
//! |---------|-----------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Shopper` and state. |

pub mod builder;
pub mod error;
pub mod shopper;
pub mod store;


pub use builder::PopulationBuilder;
pub use error::{AgentError, AgentResult};
pub use shopper::{SessionState, Shopper, TickPlan};
pub use store::ShopperRngs;
