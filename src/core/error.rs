//! Typed error handling for the query compiler
//!
//! Every failure the compiler can report is a [`QueryError`]. Callers that
//! only care about rejecting a request can turn it straight into an HTTP
//! response; callers that want to react to specific cases can match on the
//! category enums.
//!
//! # Error Categories
//!
//! - [`InvalidDataError`]: the request asked for fields or an ordering the
//!   entity does not allow
//! - [`ConfigError`]: the static entity query configuration could not be
//!   loaded or does not know the requested entity
//!
//! # Example
//!
//! ```rust,ignore
//! use query_config::prelude::*;
//!
//! match prepare_list_query(&request, &config) {
//!     Ok(prepared) => run(prepared.list_config),
//!     Err(QueryError::InvalidData(InvalidDataError::FieldsNotAllowed { fields })) => {
//!         println!("rejected: {:?}", fields);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = QueryError> = std::result::Result<T, E>;

/// The main error type of the crate
#[derive(Debug, Error)]
pub enum QueryError {
    /// The request itself is invalid for this entity
    #[error(transparent)]
    InvalidData(#[from] InvalidDataError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl QueryError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::InvalidData(_) => StatusCode::BAD_REQUEST,
            QueryError::Config(e) => e.status_code(),
            QueryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::InvalidData(_) => "INVALID_DATA",
            QueryError::Config(e) => e.error_code(),
            QueryError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this is the validation failure surfaced to API clients
    pub fn is_invalid_data(&self) -> bool {
        matches!(self, QueryError::InvalidData(_))
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            QueryError::InvalidData(InvalidDataError::FieldsNotAllowed { fields }) => {
                Some(serde_json::json!({ "fields": fields }))
            }
            QueryError::InvalidData(InvalidDataError::OrderNotAllowed { field }) => {
                Some(serde_json::json!({ "order": field }))
            }
            QueryError::Config(ConfigError::UnknownEntity { entity }) => {
                Some(serde_json::json!({ "entity": entity }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Invalid Data Errors
// =============================================================================

/// Validation failures of a client-supplied query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDataError {
    /// One or more selected fields or relations are outside the allowlist.
    /// Lists every offending entry, not only the first.
    #[error("Requested fields [{}] are not valid", .fields.join(", "))]
    FieldsNotAllowed { fields: Vec<String> },

    /// The order field is outside the allowlist
    #[error("Order field {field} is not valid")]
    OrderNotAllowed { field: String },

    /// The query string does not decode into query parameters
    #[error("Invalid query parameters: {message}")]
    MalformedQuery { message: String },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to the entity query configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse query config{}: {message}", describe_file(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Configuration file not found
    #[error("Query config file not found: {path}")]
    FileNotFound { path: String },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },

    /// No query configuration is registered for the entity
    #[error("No query config registered for entity '{entity}'")]
    UnknownEntity { entity: String },

    /// The route was not given a query configuration
    #[error("Route has no query config installed")]
    MissingRouteConfig,
}

fn describe_file(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" file '{}'", f))
        .unwrap_or_default()
}

impl ConfigError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::UnknownEntity { .. } => "UNKNOWN_ENTITY",
            ConfigError::MissingRouteConfig => "MISSING_ROUTE_CONFIG",
            _ => "CONFIG_ERROR",
        }
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_yaml::Error> for QueryError {
    fn from(err: serde_yaml::Error) -> Self {
        QueryError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for QueryError {
    fn from(err: std::io::Error) -> Self {
        QueryError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for QueryError {
    fn from(err: anyhow::Error) -> Self {
        // Preserve typed errors that were boxed into anyhow on the way up
        match err.downcast::<QueryError>() {
            Ok(query_err) => query_err,
            Err(err) => QueryError::Internal(err.to_string()),
        }
    }
}
