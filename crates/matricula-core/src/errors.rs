//! Application error type and its HTTP representation.
//!
//! Every failure in the API is an [`AppError`]: an HTTP status, the underlying
//! [`anyhow::Error`] and, for validation failures, the list of offending
//! fields. Handlers return `Result<_, AppError>` and axum turns the error into
//! the JSON error envelope:
//!
//! ```json
//! {
//!   "status": "error",
//!   "message": "Erro de validação",
//!   "errors": [{ "field": "cpf", "message": "CPF inválido" }]
//! }
//! ```
//!
//! Server errors are logged with their full context chain. When the
//! `APP_ENV` environment variable is `production`, their message is replaced
//! by a generic one so internal details never reach clients.

use std::sync::OnceLock;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const VALIDATION_ERROR_MESSAGE: &str = "Erro de validação";
pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno no servidor";

static HIDE_INTERNAL_ERRORS: OnceLock<bool> = OnceLock::new();

fn hide_internal_errors() -> bool {
    *HIDE_INTERNAL_ERRORS.get_or_init(|| {
        std::env::var("APP_ENV")
            .map(|env| env.eq_ignore_ascii_case("production"))
            .unwrap_or(false)
    })
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Name of the offending field as it appears in the request payload
    pub field: String,
    /// Human readable message
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

/// The JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `"error"`
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub errors: Vec<FieldError>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            errors: Vec::new(),
        }
    }

    /// 400 carrying the list of field errors.
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(VALIDATION_ERROR_MESSAGE),
            errors,
        }
    }

    /// 400 for a single offending field.
    pub fn field(field: &str, message: &str) -> Self {
        Self::validation(vec![FieldError::new(field, message)])
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    /// 404 with the `"{resource} não encontrado(a)"` message.
    pub fn resource_not_found(resource: &str) -> Self {
        Self::not_found(anyhow::anyhow!("{resource} não encontrado(a)"))
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message.into()))
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    /// The message sent to the client.
    ///
    /// Only the outermost context is used so database details added with
    /// `.context()` stay in the logs.
    pub fn message(&self) -> String {
        if self.status.is_server_error() && hide_internal_errors() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = ?self.error, "Request failed");
        }

        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.message(),
            errors: if self.errors.is_empty() {
                None
            } else {
                Some(self.errors)
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}
