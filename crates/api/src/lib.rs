//! Public API traits and types for the streamcrypt library
//!
//! This crate defines the minimal contract shared by every stream in a
//! pipeline: the pull-based [`stream::InputStream`] and push-based
//! [`stream::OutputStream`] capability sets, the `Created → Opened →
//! Closed` lifecycle, and the error taxonomy surfaced by transform
//! streams.

pub mod error;
pub mod stream;

// Re-export the primary error type and result
pub use error::{Error, Result};

// Re-export the stream contract
pub use stream::{InputStream, OutputStream, StreamState};
