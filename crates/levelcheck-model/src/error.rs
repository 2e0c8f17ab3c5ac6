//! Errors for model-library construction and lookup.

use levelcheck_core::TextId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// No registered model's base type and conditions matched a device's
    /// key and parameter string.
    #[error("no model found for key {key:?}")]
    NoMatchingModel { key: TextId },

    /// A voltage-limit definition could not be parsed as a literal or a
    /// named reference to another limit.
    #[error("invalid voltage limit definition {definition:?} on model key {key:?}")]
    InvalidVoltageLimit { key: TextId, definition: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
