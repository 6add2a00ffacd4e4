//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the docket scraper, providing a closed set of
//! error variants matched explicitly at each component boundary.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from transport, session, extraction and scheduling
//! - **Output**: Structured error values with enough context (county, status code)
//!   to diagnose a failed run
//! - **Error Categories**: Validation, Session, Transport, Extraction, Scheduler
//!
//! ## Key Features
//! - Tagged variants with payload fields instead of an exception hierarchy
//! - Automatic conversion from underlying library errors
//! - Recoverability classification for the retry layer
//! - Structured logging integration

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Closed error set for a scrape run
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Malformed or out-of-policy input, raised before any network access
    #[error("validation failed for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// Landing page unreachable or the verification token element is missing
    #[error("session bootstrap failed: {details}")]
    Session { details: String },

    /// Non-success response after the retry budget is exhausted
    #[error("HTTP {status_code}: {message}")]
    Http { status_code: u16, message: String },

    /// Transport failure where no status code was ever observed
    #[error("network error: {details}")]
    Network { details: String },

    /// The assumed page structure is gone; structural, never retried
    #[error("extraction failed: {details}")]
    Extraction { details: String },

    /// Per-county job failure with the failing county attached
    #[error("job for county '{county}' failed: {source}")]
    Job {
        county: String,
        #[source]
        source: Box<ScrapeError>,
    },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// I/O errors from the output writers
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors from the output writers
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal invariant violations (task join failures, bad selectors)
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ScrapeError {
    /// Check whether the error class is transient enough to be retried
    pub fn is_recoverable(&self) -> bool {
        match self {
            ScrapeError::Network { .. } => true,
            ScrapeError::Http { status_code, .. } => retryable_status(*status_code),
            ScrapeError::Job { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            ScrapeError::Validation { .. } => "validation",
            ScrapeError::Session { .. } => "session",
            ScrapeError::Http { .. } | ScrapeError::Network { .. } => "transport",
            ScrapeError::Extraction { .. } => "extraction",
            ScrapeError::Job { source, .. } => source.category(),
            ScrapeError::Config { .. } => "configuration",
            ScrapeError::Io(_) | ScrapeError::Json(_) => "output",
            ScrapeError::Internal { .. } => "internal",
        }
    }
}

/// Status codes the transport is allowed to retry: request timeout, rate
/// limiting, and all server-side errors. Other 4xx codes are client mistakes
/// and retrying them would only repeat the mistake.
pub fn retryable_status(status_code: u16) -> bool {
    status_code == 408 || status_code == 429 || (500..=599).contains(&status_code)
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ScrapeError::Http {
                status_code: status.as_u16(),
                message: err.to_string(),
            },
            None => ScrapeError::Network {
                details: err.to_string(),
            },
        }
    }
}

impl From<toml::de::Error> for ScrapeError {
    fn from(err: toml::de::Error) -> Self {
        ScrapeError::Config {
            message: err.to_string(),
        }
    }
}
