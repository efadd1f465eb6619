use std::path::PathBuf;

use mall_agent::AgentError;
use mall_behavior::BehaviorError;
use mall_core::MallError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match shopper count {expected}")]
    AgentCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    /// A shopper's tick failed; the run stops at that tick.
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error(transparent)]
    Core(#[from] MallError),

    #[error("cannot read config {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot start worker pool: {0}")]
    ThreadPool(String),
}

pub type SimResult<T> = Result<T, SimError>;
