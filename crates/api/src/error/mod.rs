//! Error handling for streaming transform operations

use std::fmt;

pub mod validate;

/// The error type for stream operations
///
/// API-sequence violations (double open, operation before open) are not
/// represented here: they signal a caller bug and panic via
/// [`crate::stream::StreamState`]. Everything below is a recoverable
/// fault reported to the caller.
#[derive(Debug)]
pub enum Error {
    /// Key, IV or nonce length validation error, surfaced at `open()`
    /// before any engine call
    InvalidLength {
        /// Context where the length error occurred
        context: &'static str,
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Total input is not a multiple of the cipher block size at
    /// finalization
    NotAligned {
        /// Context where the alignment error occurred
        context: &'static str,
        /// Block size the data must be a multiple of
        block_size: usize,
        /// Actual length observed
        actual: usize,
    },

    /// Padding recovered at decrypt finalization is malformed
    InvalidPadding {
        /// Context where the padding error occurred
        context: &'static str,
    },

    /// Invalid configuration parameter
    InvalidParameter {
        /// Name of the invalid parameter
        context: &'static str,
        /// Reason why the parameter is invalid
        reason: &'static str,
    },

    /// Passthrough of an underlying cipher/compressor failure, wrapped
    /// with enough context to diagnose which engine and which call failed
    Engine {
        /// Engine that reported the failure
        engine: &'static str,
        /// Call that failed
        operation: &'static str,
        /// Engine-reported details
        message: String,
    },

    /// I/O failure in a leaf stream
    Io {
        /// Context where the I/O error occurred
        context: &'static str,
        /// Detailed error message
        message: String,
    },
}

/// Result type for stream operations
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLength {
                context,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Invalid length for {}: expected {}, got {}",
                    context, expected, actual
                )
            }
            Error::NotAligned {
                context,
                block_size,
                actual,
            } => {
                write!(
                    f,
                    "Data not aligned for {}: {} bytes is not a multiple of the {}-byte block",
                    context, actual, block_size
                )
            }
            Error::InvalidPadding { context } => {
                write!(f, "Invalid padding in {}", context)
            }
            Error::InvalidParameter { context, reason } => {
                write!(f, "Invalid parameter '{}': {}", context, reason)
            }
            Error::Engine {
                engine,
                operation,
                message,
            } => {
                write!(f, "Engine error from {} during {}: {}", engine, operation, message)
            }
            Error::Io { context, message } => {
                write!(f, "I/O error in {}: {}", context, message)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            context: "stream I/O",
            message: e.to_string(),
        }
    }
}
