//! Request-time error model.
//!
//! Every error path produces a structured problem body — `title`, `status`
//! and an optional `detail` — in whatever content type the response was
//! negotiated for, so success and failure stay consistent on the wire.

use axum::response::{IntoResponse, Response};
use axum::Json;
use fragua_openapi::{ApiType, FieldDescriptor, StructDescriptor, TypeDescriptor};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub enum HttpError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Unprocessable(String),
    Internal(String),
    Custom { status: StatusCode, body: Value },
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden(_) => StatusCode::FORBIDDEN,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Custom { status, .. } => *status,
        }
    }

    /// Structured problem body for this error.
    pub fn problem(&self) -> Value {
        match self {
            HttpError::Custom { body, .. } => body.clone(),
            other => {
                let status = other.status();
                serde_json::to_value(ErrorBody {
                    title: status
                        .canonical_reason()
                        .unwrap_or("Error")
                        .to_string(),
                    status: status.as_u16(),
                    detail: Some(other.message().to_string()).filter(|m| !m.is_empty()),
                })
                .unwrap_or_else(|_| Value::Null)
            }
        }
    }

    /// Human-readable detail carried by the variant. Empty for custom
    /// bodies, which speak for themselves.
    pub fn message(&self) -> &str {
        match self {
            HttpError::NotFound(msg)
            | HttpError::Unauthorized(msg)
            | HttpError::Forbidden(msg)
            | HttpError::BadRequest(msg)
            | HttpError::Unprocessable(msg)
            | HttpError::Internal(msg) => msg,
            HttpError::Custom { .. } => "",
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.problem())).into_response()
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            HttpError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            HttpError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            HttpError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            HttpError::Unprocessable(msg) => write!(f, "Unprocessable: {msg}"),
            HttpError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            HttpError::Custom { status, body } => write!(f, "Error ({status}): {body}"),
        }
    }
}

impl std::fmt::Debug for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

/// The wire shape of a default error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiType for ErrorBody {
    fn descriptor() -> TypeDescriptor {
        StructDescriptor::new::<Self>()
            .field(FieldDescriptor::new::<String>("title").validate("required"))
            .field(FieldDescriptor::new::<u16>("status").validate("required"))
            .field(FieldDescriptor::new::<String>("detail").omit_empty())
            .build()
    }

    fn openapi_name() -> Option<&'static str> {
        Some("HttpError")
    }

    fn openapi_description() -> Option<&'static str> {
        Some("Structured error response")
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::Internal(err.to_string())
    }
}

/// Generate `From<E> for HttpError` implementations mapping error types to
/// a specific variant.
///
/// ```ignore
/// fragua_core::map_error! {
///     sqlx::Error => Internal,
///     MyDomainError => BadRequest,
/// }
/// ```
#[macro_export]
macro_rules! map_error {
    ( $( $err_ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$err_ty> for $crate::HttpError {
                fn from(err: $err_ty) -> Self {
                    $crate::HttpError::$variant(err.to_string())
                }
            }
        )*
    };
}
