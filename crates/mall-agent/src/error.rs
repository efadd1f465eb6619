use mall_behavior::BehaviorError;
use mall_core::AgentId;
use mall_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// A lifecycle invariant does not hold.  Unreachable when shoppers are
    /// only driven through `advance` / `plan_tick` + `apply_tick`.
    #[error("shopper {agent} is in an invalid state: {reason}")]
    InvalidState { agent: AgentId, reason: String },

    /// The transition model failed for this shopper.
    #[error("shopper {agent}: {source}")]
    Behavior {
        agent:  AgentId,
        #[source]
        source: BehaviorError,
    },

    #[error("population config error: {0}")]
    Config(String),
}

impl AgentError {
    /// `true` if the underlying cause is malformed mall geometry.
    pub fn is_invalid_environment(&self) -> bool {
        matches!(
            self,
            AgentError::Behavior { source: BehaviorError::InvalidEnvironment(_), .. }
        )
    }

    /// The spatial error behind an `InvalidEnvironment`, if any.
    pub fn spatial(&self) -> Option<&SpatialError> {
        match self {
            AgentError::Behavior { source: BehaviorError::InvalidEnvironment(e), .. } => Some(e),
            _ => None,
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
