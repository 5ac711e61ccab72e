use crate::db::errors::DbError;
use crate::types::Resource;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Malformed input, or a reference to a row outside the actor's organisation
    #[error("{message}")]
    ValidationFailed { message: String },

    /// Target row does not exist or lies outside the actor's scope. The two cases are
    /// deliberately reported identically.
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Storage operation error
    #[error(transparent)]
    Database(DbError),

    /// Conflict error, e.g. a username that is already taken
    #[error("Conflict: {message}")]
    Conflict { message: String },
}

/// Unique violations surface as conflicts carrying a user-facing message
impl From<DbError> for Error {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { constraint, table, .. } => Error::Conflict {
                message: unique_violation_message(table.as_deref(), constraint.as_deref()),
            },
            other => Error::Database(other),
        }
    }
}

impl Error {
    /// Out-of-scope or missing row of the given resource type
    pub fn not_found(resource: Resource, id: impl ToString) -> Self {
        Error::NotFound {
            resource: resource.singular().to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::ValidationFailed { message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Conflict { .. } => StatusCode::CONFLICT,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::ValidationFailed { message } => message.clone(),
            Error::NotFound { resource, id } if id.is_empty() => format!("{resource} not found"),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { constraint, table, .. } => unique_violation_message(table.as_deref(), constraint.as_deref()),
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Conflict { message } => message.clone(),
        }
    }
}

fn unique_violation_message(table: Option<&str>, constraint: Option<&str>) -> String {
    match (table, constraint) {
        (Some("accounts"), Some(c)) if c.contains("email") => "An account with this email address already exists".to_string(),
        (Some("accounts"), Some(c)) if c.contains("username") => "This username is already taken".to_string(),
        (Some("organisations"), _) => "This account already owns an organisation".to_string(),
        (Some("agents"), _) => "This account is already an agent".to_string(),
        _ => "Resource already exists".to_string(),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log level follows severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } => {
                tracing::info!("Authentication error: {}", self);
            }
            Error::ValidationFailed { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
            Error::Conflict { .. } => {
                tracing::warn!("Conflict error: {}", self);
            }
        }

        let status = self.status_code();
        match &self {
            Error::Conflict { .. } | Error::Database(DbError::UniqueViolation { .. }) => {
                let body = json!({ "message": self.user_message() });
                (status, Json(body)).into_response()
            }
            _ => (status, self.user_message()).into_response(),
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
