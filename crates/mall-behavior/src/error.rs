use mall_core::LocationId;
use mall_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("invalid environment: {0}")]
    InvalidEnvironment(#[from] SpatialError),

    #[error("invalid environment: candidate weights from {from} do not form a distribution")]
    DegenerateWeights { from: LocationId },

    #[error("movement configuration error: {0}")]
    Config(String),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
