//! Error types for timetally
//!
//! This module defines the error types used throughout the timetally library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use timetally::error::{Result, TallyError};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to TallyError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for timetally operations
///
/// Three families matter to callers: `Validation`/`InvalidMonth` (bad input,
/// surfaced immediately, never retried), `Upstream`/`Network` (any failure of
/// the time tracking provider, surfaced as a whole-report failure), and
/// `NotConfigured` (no credentials yet, checked before any upstream call).
#[derive(Error, Debug)]
pub enum TallyError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed month selector
    #[error("invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    /// Internally-impossible aggregate input (negative hours, NaN)
    #[error("invalid input: {0}")]
    Validation(String),

    /// Non-2xx response from the time tracking provider
    #[error("provider request failed with status {status}: {message}")]
    Upstream {
        /// HTTP status code returned by the provider
        status: u16,
        /// Response body, when one was readable
        message: String,
    },

    /// Network-level failure talking to the provider
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// No account credentials configured yet
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results in timetally
///
/// # Example
///
/// ```
/// use timetally::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, TallyError>;
