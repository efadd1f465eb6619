//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `MallError` as one
//! variant via `#[from]`, keeping error sites clean.

use thiserror::Error;

/// The top-level error type for `mall-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum MallError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `mall-*` crates.
pub type MallResult<T> = Result<T, MallError>;
