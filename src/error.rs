//! Error types shared by every sequence and time-series operation.
//!
//! Every variant is a programmer error: an exhausted sequence being read, an
//! invalid construction argument, a bad range. Nothing here is transient and
//! nothing is retried internally.

use thiserror::Error;

/// Result type alias for sequence operations
pub type Result<T> = std::result::Result<T, SeqError>;

/// Errors raised by sequences, combinators and time series
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeqError {
    /// `try_next` was called although `has_next` is false
    #[error("Sequence exhausted: no next element")]
    Exhausted,

    /// A construction-time argument is unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A key range is empty or reversed
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// An index window falls outside the collection
    #[error("Index out of bounds: [{start}, {end}) for length {len}")]
    IndexOutOfBounds { start: usize, end: usize, len: usize },

    /// A seedless reduction was asked to reduce nothing
    #[error("Cannot reduce an empty sequence without a seed")]
    EmptyReduction,

    /// A fixed-capacity fork buffer is full
    #[error("Fork buffer overflow: capacity {capacity} exceeded")]
    BufferOverflow { capacity: usize },
}

impl SeqError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        SeqError::InvalidArgument(reason.into())
    }

    pub(crate) fn invalid_range(reason: impl Into<String>) -> Self {
        SeqError::InvalidRange(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            SeqError::Exhausted.to_string(),
            "Sequence exhausted: no next element"
        );
        assert_eq!(
            SeqError::invalid_argument("no moduli").to_string(),
            "Invalid argument: no moduli"
        );
        assert_eq!(
            SeqError::IndexOutOfBounds {
                start: 2,
                end: 9,
                len: 4
            }
            .to_string(),
            "Index out of bounds: [2, 9) for length 4"
        );
        assert_eq!(
            SeqError::BufferOverflow { capacity: 8 }.to_string(),
            "Fork buffer overflow: capacity 8 exceeded"
        );
    }

    #[test]
    fn propagates_with_question_mark() {
        fn inner() -> Result<u8> {
            Err(SeqError::EmptyReduction)
        }

        fn outer() -> Result<u8> {
            let v = inner()?;
            Ok(v + 1)
        }

        assert_eq!(outer(), Err(SeqError::EmptyReduction));
    }

    #[test]
    fn implements_std_error() {
        let error: &dyn std::error::Error = &SeqError::invalid_range("from == to");
        assert_eq!(error.to_string(), "Invalid range: from == to");
    }
}
