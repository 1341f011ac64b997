//! Error taxonomy for the shortening core and its HTTP mapping.
//!
//! Every fallible service and repository operation returns [`AppError`];
//! the migration runner has its own [`MigrationError`].
//! The variants follow how callers are expected to react:
//!
//! | Variant                 | HTTP | Retry                                  |
//! |-------------------------|------|----------------------------------------|
//! | `InvalidUrl`            | 400  | never                                  |
//! | `DuplicateCode`         | 409  | handled inside the service, bounded    |
//! | `GenerationExhausted`   | 500  | whole shorten call may be retried      |
//! | `NotFound`              | 404  | never                                  |
//! | `Unavailable`           | 503  | safe, with backoff                     |
//! | `Internal`              | 500  | never                                  |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload returned to HTTP clients.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("Short code already exists: {code}")]
    DuplicateCode { code: String },

    #[error("Failed to generate a unique short code after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },

    #[error("Short link not found: {code}")]
    NotFound { code: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn invalid_url(reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            reason: reason.into(),
        }
    }

    pub fn not_found(code: impl Into<String>) -> Self {
        Self::NotFound { code: code.into() }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Returns true for transient store failures that a caller may retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Returns the HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
            Self::DuplicateCode { .. } => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::GenerationExhausted { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converts the error into its client-facing payload.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, details) = match self {
            Self::InvalidUrl { reason } => ("invalid_url", json!({ "reason": reason })),
            Self::DuplicateCode { code } => ("duplicate_code", json!({ "code": code })),
            Self::GenerationExhausted { attempts } => {
                ("generation_exhausted", json!({ "attempts": attempts }))
            }
            Self::NotFound { code } => ("not_found", json!({ "code": code })),
            Self::Unavailable { .. } => ("unavailable", json!({ "retryable": true })),
            Self::Internal { details, .. } => ("internal_error", details.clone()),
        };

        ErrorInfo {
            code,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let reason = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());

        Self::InvalidUrl { reason }
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::InvalidUrl {
            reason: rejection.body_text(),
        }
    }
}

/// Errors raised by the migration runner and its history store.
///
/// Every variant except [`MigrationError::RollbackOutOfOrder`] and
/// [`MigrationError::Irreversible`] is fatal to startup.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Invalid migration registry: {0}")]
    InvalidRegistry(String),

    #[error("Migration history has a gap: version {missing} is pending but {later} is applied")]
    Gap { missing: i64, later: i64 },

    #[error("Migration history contains version {0} which is not in the registry")]
    UnknownVersion(i64),

    #[error("Migration {version} is recorded as '{recorded}' but the registry names it '{expected}'")]
    NameMismatch {
        version: i64,
        recorded: String,
        expected: &'static str,
    },

    #[error("Migration {version} was applied concurrently by another instance")]
    Conflict { version: i64 },

    #[error("Migration {version} ({name}) failed: {source}")]
    Failed {
        version: i64,
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Only the latest applied migration ({latest}) can be rolled back, not {requested}")]
    RollbackOutOfOrder { requested: i64, latest: i64 },

    #[error("Migration {0} has no down step")]
    Irreversible(i64),

    #[error("Migration history store error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

/// Classifies a sqlx error into the service taxonomy.
///
/// Pool exhaustion and connection-level failures become [`AppError::Unavailable`].
/// Unique violations are reported as a generic conflict here; repositories that
/// know which key was violated map them to [`AppError::DuplicateCode`] themselves.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::PoolTimedOut => AppError::unavailable("timed out acquiring a connection"),
        sqlx::Error::PoolClosed => AppError::unavailable("connection pool is closed"),
        sqlx::Error::Io(io) => AppError::unavailable(format!("connection error: {io}")),
        sqlx::Error::Tls(tls) => AppError::unavailable(format!("tls error: {tls}")),
        other => {
            if let Some(db) = other.as_database_error() {
                if db.is_unique_violation() {
                    return AppError::internal(
                        "Unique constraint violation",
                        json!({ "constraint": db.constraint() }),
                    );
                }
            }

            tracing::error!(error = %other, "Database error");
            AppError::internal("Database error", json!({}))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::invalid_url("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("abc").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::unavailable("pool").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::GenerationExhausted { attempts: 5 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(AppError::unavailable("pool").is_retryable());
        assert!(!AppError::invalid_url("bad").is_retryable());
        assert!(!AppError::not_found("abc").is_retryable());
        assert!(!AppError::GenerationExhausted { attempts: 5 }.is_retryable());
    }

    #[test]
    fn test_pool_timeout_maps_to_unavailable() {
        let err = map_sqlx_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Unavailable { .. }));

        let err = map_sqlx_error(sqlx::Error::PoolClosed);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_row_not_found_maps_to_internal() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[test]
    fn test_error_info_codes() {
        let info = AppError::not_found("zzz").to_error_info();
        assert_eq!(info.code, "not_found");
        assert_eq!(info.details["code"], "zzz");

        let info = AppError::invalid_url("Malformed URL").to_error_info();
        assert_eq!(info.code, "invalid_url");
        assert!(info.message.contains("Malformed URL"));
    }
}
