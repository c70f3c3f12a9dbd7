//! The JSON success envelope.
//!
//! ```json
//! {
//!   "object": "student",
//!   "status": "success",
//!   "message": "Estudante criado com sucesso",
//!   "data": { ... }
//! }
//! ```

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<&'static str>,
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(object: &'static str, message: impl Into<String>, data: T) -> Self {
        Self {
            object: Some(object),
            status: "success",
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// An envelope with neither `object` nor `data`.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            object: None,
            status: "success",
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
