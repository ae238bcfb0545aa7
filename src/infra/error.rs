//! Types for reporting errors that happened during a request.
//!
//! Every handler returns an [`ApiResult`], and [`ApiError`]'s [`IntoResponse`]
//! implementation is the one place where failures become status codes and bodies.

use super::extract::Json;
use axum::{
    extract::rejection::{BytesRejection, PathRejection},
    response::IntoResponse,
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::ResponseForPanic;
use utoipa::ToSchema;

/// The body of a failed response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// A description of the error.
    #[schema(example = "Column 'name' cannot be null")]
    error: String,
}

impl ErrorBody {
    pub(crate) fn new(error: String) -> Self {
        Self { error }
    }

    /// The error message.
    pub fn error(&self) -> &str {
        self.error.as_ref()
    }
}

/// A body carrying a single human readable message.
///
/// Used for confirmations and for resources that do not exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    /// The message.
    #[schema(example = "Item deleted")]
    message: String,
}

impl MessageBody {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message.
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }
}

/// An error from our API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// An error caused by the client.
    #[error("{0}")]
    ClientError(#[from] ClientError),
    /// An internal error.
    #[error("{0}")]
    InternalError(#[from] InternalError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::ClientError(e) => e.into_response(),
            ApiError::InternalError(e) => {
                tracing::error!("internal error: {}", e);
                e.into_response()
            }
        }
    }
}

/// The result of calling API-related functions.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::InternalError(InternalError::SqlxError(e))
    }
}

/// Errors caused by the client.
/// The client can do something to fix these.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The resource was not found.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The request could not be extracted.
    #[error("{1}")]
    Custom(StatusCode, String),
}

impl From<BytesRejection> for ClientError {
    fn from(value: BytesRejection) -> Self {
        ClientError::Custom(value.status(), value.body_text())
    }
}

impl From<PathRejection> for ClientError {
    fn from(value: PathRejection) -> Self {
        ClientError::Custom(value.status(), value.body_text())
    }
}

impl IntoResponse for ClientError {
    fn into_response(self) -> axum::response::Response {
        let msg = self.to_string();
        match self {
            Self::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(MessageBody::new(msg))).into_response()
            }
            Self::Custom(status, _) => (status, Json(ErrorBody::new(msg))).into_response(),
        }
    }
}

/// An internal error.
/// The client cannot do anything about this, but is told what went wrong.
#[derive(Debug, thiserror::Error)]
pub enum InternalError {
    /// An [`sqlx`] error.
    #[error("{}", database_message(.0))]
    SqlxError(#[from] sqlx::Error),
    /// Other miscellaneous errors.
    #[error("{0}")]
    Other(String),
}

/// The server's own text for errors it reported, without sqlx's prefix.
fn database_message(e: &sqlx::Error) -> String {
    match e {
        sqlx::Error::Database(e) => e.message().to_string(),
        e => e.to_string(),
    }
}

impl IntoResponse for InternalError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorBody::new(self.to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// A handler for converting panics into proper responses for the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanicHandler;

impl ResponseForPanic for PanicHandler {
    type ResponseBody = axum::body::Body;

    fn response_for_panic(
        &mut self,
        _: Box<dyn std::any::Any + Send + 'static>,
    ) -> http::Response<Self::ResponseBody> {
        ApiError::InternalError(InternalError::Other("panic".to_string())).into_response()
    }
}
