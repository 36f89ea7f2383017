//! Error type shared by the sequence adapter, the combinators and the search
//! operations.
//!
//! Failures raised by caller-supplied callbacks are never folded into [`Error`].
//! The `try_*` operations hand the callback's own error back to the caller as-is,
//! and routines driven by [`async_exec`](crate::async_exec) settle with their own
//! error type.

use thiserror::Error;

/// Result alias used by every fallible operation of this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the sequence layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The value exposes neither native iteration nor indexed access.
    #[error("value is not iterable: {value}")]
    NotIterable {
        /// Rendering of the offending value.
        value: String,
    },
}

impl Error {
    pub(crate) fn not_iterable(value: impl Into<String>) -> Self {
        Error::NotIterable {
            value: value.into(),
        }
    }
}
