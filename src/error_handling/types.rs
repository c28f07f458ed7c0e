//! Error type definitions.
//!
//! This module defines the error enums for each layer and the event types
//! counted by the statistics trackers.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// A backend was selected without the settings it needs.
    #[error("Missing configuration for {backend} backend: {setting}")]
    MissingSettingError {
        backend: &'static str,
        setting: &'static str,
    },
}

/// Error types for database setup.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Errors raised by storage backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record with this id already exists.
    #[error("{entity} with id '{id}' already exists")]
    Conflict { entity: &'static str, id: String },

    /// Input failed validation.
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The backend does not accept writes.
    #[error("The {0} backend is read-only")]
    ReadOnly(&'static str),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    /// HTTP transport error talking to a remote store.
    #[error("HTTP error: {0}")]
    Http(#[from] ReqwestError),

    /// The remote store answered with an error status.
    #[error("Remote store returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// A stored JSON column or document could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing a JSON file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Shorthand for a validation failure.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Maps an insert failure to `Conflict` when it is a unique-key violation.
    pub(crate) fn from_insert(error: sqlx::Error, entity: &'static str, id: &str) -> Self {
        let is_duplicate = error
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if is_duplicate {
            StoreError::Conflict {
                entity,
                id: id.to_string(),
            }
        } else {
            StoreError::Sql(error)
        }
    }
}

/// Errors raised by the Google Places integration.
#[derive(Error, Debug)]
pub enum PlacesError {
    /// Live calls are disabled and nothing is cached for this place.
    #[error("Places is in cache-only mode and place '{0}' is not cached")]
    CacheOnly(String),

    /// The API answered with a non-OK status.
    #[error("Places API returned {status}: {message}")]
    Api { status: String, message: String },

    /// HTTP transport failure.
    #[error("Places request failed: {0}")]
    Http(#[from] ReqwestError),

    /// The business has no Google place id to sync from.
    #[error("Business '{0}' has no Google place id")]
    NoPlaceId(String),

    /// The business does not exist.
    #[error("Business '{0}' not found")]
    BusinessNotFound(String),

    /// Reading or writing the cache failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A cached payload could not be decoded.
    #[error("Cached place payload is corrupt: {0}")]
    Cache(#[from] serde_json::Error),
}

impl PlacesError {
    /// Transient failures are worth retrying (timeouts, connection errors, 5xx, 429).
    pub fn is_transient(&self) -> bool {
        match self {
            PlacesError::Http(e) => {
                if let Some(status) = e.status() {
                    return status.is_server_error() || status.as_u16() == 429;
                }
                e.is_timeout() || e.is_connect() || e.is_request()
            }
            PlacesError::Api { status, .. } => status == "UNKNOWN_ERROR",
            _ => false,
        }
    }
}

/// Events counted for the API server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum RequestEvent {
    /// A listing request answered from the primary store
    ListingServed,
    /// A listing request answered from the fallback chain
    FallbackServed,
    /// A review was submitted
    ReviewSubmitted,
    /// A scam report was submitted
    ReportSubmitted,
    /// Successful admin login
    AdminLogin,
    /// Rejected admin login
    AdminLoginRejected,
    /// A request ended in a 4xx response
    ClientError,
    /// A request ended in a 5xx response
    ServerError,
}

/// Events counted by the Places cost control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum PlacesEvent {
    /// A billed call to the Places API
    ApiCall,
    /// A request served from stored data
    CacheHit,
    /// A request refused because live calls are disabled
    BlockedCall,
    /// A billed call that failed
    ApiError,
}
