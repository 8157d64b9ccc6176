//! Encoding errors.

use thiserror::Error;

/// Errors raised by the container encoder and reader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// An invariant the encoder relies on did not hold. Always a defect
    /// upstream, never caused by user input.
    #[error("internal encoding error: {0}")]
    Internal(String),

    /// Bytes handed to [`crate::inspect`] are not a GLB 2.0 container.
    #[error("malformed container: {0}")]
    Malformed(String),
}

impl EncodeError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
