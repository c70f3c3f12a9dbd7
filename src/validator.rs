//! Request extractors that reject with the JSON error envelope.
//!
//! axum's own `Json`, `Query` and `Path` reject with plain-text bodies.
//! These wrappers map every rejection to a 400 [`AppError`] instead. Payload
//! validation itself happens in the services, which know whether a request
//! is a create or an update.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use matricula_core::AppError;

pub const INVALID_BODY_MESSAGE: &str = "Corpo da requisição inválido";
pub const INVALID_QUERY_MESSAGE: &str = "Parâmetros de consulta inválidos";
pub const INVALID_ID_MESSAGE: &str = "ID inválido";

fn json_rejection(rejection: JsonRejection) -> AppError {
    tracing::debug!(error = %rejection.body_text(), "Rejected request body");

    match rejection {
        JsonRejection::MissingJsonContentType(_) => AppError::bad_request(anyhow!(
            "Cabeçalho 'Content-Type: application/json' ausente"
        )),
        _ => AppError::bad_request(anyhow!(INVALID_BODY_MESSAGE)),
    }
}

/// JSON body extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        Ok(AppJson(value))
    }
}

/// Query string extractor.
#[derive(Debug, Clone, Default)]
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| {
                tracing::debug!(error = %rejection.body_text(), "Rejected query string");
                AppError::bad_request(anyhow!(INVALID_QUERY_MESSAGE))
            })?;

        Ok(AppQuery(value))
    }
}

/// Path parameter extractor, used for the typed entity ids.
#[derive(Debug, Clone, Copy)]
pub struct PathId<T>(pub T);

impl<T, S> FromRequestParts<S> for PathId<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| {
                tracing::debug!(error = %rejection.body_text(), "Rejected path parameter");
                AppError::bad_request(anyhow!(INVALID_ID_MESSAGE))
            })?;

        Ok(PathId(value))
    }
}
