//! Error types for the engine.
//!
//! Every failure an engine operation can produce is one of three recoverable
//! conditions. Callers receive them as typed values and decide how to react;
//! nothing in this crate panics on bad input.

use thiserror::Error;

/// Result type used by all engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failure conditions surfaced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Malformed or out-of-domain input, such as a negative AQI value,
    /// a zero-length horizon or an unknown location.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Too few usable rows to derive features or train a model.
    #[error("insufficient data: {available} usable rows, {required} required")]
    InsufficientData {
        /// Rows the operation needed.
        required: usize,
        /// Rows actually available after cleaning.
        available: usize,
    },

    /// A prediction was requested before any successful fit.
    #[error("model not fitted: call fit before requesting predictions")]
    ModelNotFitted,
}

impl EngineError {
    /// Build an [`EngineError::InvalidInput`] from any message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Build an [`EngineError::InsufficientData`] with the given row counts.
    pub fn insufficient_data(required: usize, available: usize) -> Self {
        Self::InsufficientData {
            required,
            available,
        }
    }

    /// True when retrying with more history could succeed.
    pub fn is_data_related(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
