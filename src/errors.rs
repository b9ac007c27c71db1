//! Unified error type for the ingestion pipeline.
//!
//! Storage failures are the only fatal condition in a cycle and get their own
//! variant so callers can tell them apart from "nothing found", which is never
//! an error. Fetch, parse and notification failures are recovered close to
//! where they happen; their variants exist so those local boundaries have
//! something explicit to log.

use thiserror::Error;

/// All errors produced by `promo-radar`.
#[derive(Debug, Error)]
pub enum Error {
    /// The persistence backend failed (connection, query or constraint error).
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description of the problem
        message: String,
    },

    /// An outbound HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A remote endpoint answered with a non-success status.
    #[error("Remote endpoint answered with status {status}")]
    HttpStatus {
        /// HTTP status code returned
        status: u16,
    },

    /// A CSS selector in a source profile failed to parse.
    #[error("Invalid selector '{selector}': {message}")]
    Selector {
        /// The selector text as configured
        selector: String,
        /// Parser diagnostic
        message: String,
    },

    /// An article element did not have the shape a source profile expects.
    #[error("Malformed article: {reason}")]
    MalformedArticle {
        /// What was missing or invalid
        reason: String,
    },

    /// A kind filter string did not name a known promotion kind.
    #[error("Unknown promotion kind: {value}")]
    UnknownKind {
        /// The rejected filter value
        value: String,
    },

    /// The trigger secret did not match the configured one.
    #[error("Unauthorized")]
    Unauthorized,

    /// Local I/O failure (e.g. creating the database directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output could not be produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error came from the storage layer.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
