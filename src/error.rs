//! Typed errors, their classification, and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}'")]
    InvalidVar { name: &'static str, value: String },
}

/// One rejected input field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database: {0}")]
    Db(sqlx::Error),
    #[error("persistence: {0}")]
    Persistence(String),
}

/// The four failure classes every error reaching the HTTP boundary falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Persistence,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Persistence => "PERSISTENCE_ERROR",
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Db(_) | AppError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn unique_violation(constraint: Option<&str>) -> Self {
        AppError::Conflict(format!(
            "unique constraint violated ({})",
            constraint.unwrap_or("unknown")
        ))
    }

    pub fn foreign_key_violation(constraint: Option<&str>) -> Self {
        AppError::Conflict(format!(
            "referenced record does not exist ({})",
            constraint.unwrap_or("unknown")
        ))
    }
}

/// Constraint violations become conflicts; a missing row is a not-found; the rest stays a store failure.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return AppError::NotFound("Record not found".into());
        }
        if let Some(db) = err.as_database_error() {
            if db.is_unique_violation() {
                return AppError::unique_violation(db.constraint());
            }
            if db.is_foreign_key_violation() {
                return AppError::foreign_key_violation(db.constraint());
            }
            if db.is_check_violation() {
                return AppError::Conflict(format!(
                    "check constraint violated ({})",
                    db.constraint().unwrap_or("unknown")
                ));
            }
        }
        AppError::Db(err)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl AppError {
    fn into_body(self) -> ErrorBody {
        let code = self.kind().code().to_string();
        match self {
            AppError::Validation(errors) => ErrorBody {
                message: "Validation failed".into(),
                code,
                errors: Some(errors),
            },
            AppError::NotFound(message) => ErrorBody {
                message,
                code,
                errors: None,
            },
            AppError::Conflict(message) => ErrorBody {
                message,
                code,
                errors: None,
            },
            AppError::Db(_) | AppError::Persistence(_) => ErrorBody {
                message: "Internal server error".into(),
                code,
                errors: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        match kind {
            ErrorKind::Persistence => tracing::error!(error = %self, "request failed"),
            ErrorKind::Conflict => tracing::warn!(error = %self, "request conflicted"),
            ErrorKind::Validation | ErrorKind::NotFound => tracing::debug!(error = %self, "request rejected"),
        }
        (kind.status(), Json(self.into_body())).into_response()
    }
}
