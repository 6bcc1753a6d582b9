//! Generic handler adapter.
//!
//! Turns a plain `async fn(C) -> Result<T, HttpError>` into an axum
//! handler. The pipeline is fixed: build the context, run the handler,
//! transform the output value, then serialize it under the negotiated
//! content type. Every failure along the way funnels into the same error
//! path, so a route has exactly one error shape.

use crate::context::{ReadOptions, RequestContext};
use crate::error::HttpError;
use crate::serialize::{serialize_error, serialize_value, EncoderSet, SerializerFn};
use axum::extract::Request;
use axum::response::Response;
use axum::routing::{on, MethodFilter, MethodRouter};
use http::{header, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Transform applied to the serialized output value before encoding.
pub type TransformFn = Arc<dyn Fn(Value) -> Result<Value, HttpError> + Send + Sync>;

/// Rewrite applied to every error before it is serialized.
pub type ErrorHandlerFn = Arc<dyn Fn(HttpError) -> HttpError + Send + Sync>;

/// Server-wide hooks shared by every adapted handler.
#[derive(Clone, Default)]
pub struct Hooks {
    pub transform: Option<TransformFn>,
    pub error_handler: Option<ErrorHandlerFn>,
    pub encoders: EncoderSet,
    pub custom_serializer: Option<SerializerFn>,
    pub read_options: ReadOptions,
}

/// Adapt a typed handler into a [`MethodRouter`] for one HTTP method.
/// `filter` of `None` matches any method.
pub fn into_method_router<C, T, F, Fut>(
    filter: Option<MethodFilter>,
    hooks: Arc<Hooks>,
    handler: F,
) -> MethodRouter
where
    C: RequestContext + 'static,
    T: Serialize + Send + 'static,
    F: Fn(C) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T, HttpError>> + Send + 'static,
{
    let adapted = move |req: Request| {
        let hooks = hooks.clone();
        let handler = handler.clone();
        async move {
            let accept = req
                .headers()
                .get(header::ACCEPT)
                .and_then(|value| value.to_str().ok())
                .map(String::from);
            match run(req, &hooks, handler).await {
                Ok(response) => response,
                Err(err) => error_path(&hooks, accept.as_deref(), err),
            }
        }
    };
    match filter {
        Some(filter) => on(filter, adapted),
        None => axum::routing::any(adapted),
    }
}

async fn run<C, T, F, Fut>(req: Request, hooks: &Hooks, handler: F) -> Result<Response, HttpError>
where
    C: RequestContext,
    T: Serialize,
    F: Fn(C) -> Fut,
    Fut: Future<Output = Result<T, HttpError>>,
{
    let accept = req
        .headers()
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    let context = C::build(req, hooks.read_options).await?;
    let output = handler(context).await?;
    let value = serde_json::to_value(output)
        .map_err(|err| HttpError::Internal(format!("cannot serialize handler output: {err}")))?;
    let value = match &hooks.transform {
        Some(transform) => transform(value)?,
        None => value,
    };
    if value.is_null() {
        return Ok(empty_response());
    }
    if let Some(serializer) = &hooks.custom_serializer {
        return Ok(serializer(value));
    }
    serialize_value(&hooks.encoders, accept.as_deref(), &value)
}

fn error_path(hooks: &Hooks, accept: Option<&str>, err: HttpError) -> Response {
    let err = match &hooks.error_handler {
        Some(handler) => handler(err),
        None => err,
    };
    debug!(status = err.status().as_u16(), message = %err.message(), "request failed");
    serialize_error(&hooks.encoders, accept, &err)
}

fn empty_response() -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .body(axum::body::Body::empty())
        .unwrap_or_default()
}

/// Method filter used when registering a route. `None` matches any method.
pub fn method_filter(method: &Method) -> Option<MethodFilter> {
    match *method {
        Method::GET => Some(MethodFilter::GET),
        Method::POST => Some(MethodFilter::POST),
        Method::PUT => Some(MethodFilter::PUT),
        Method::PATCH => Some(MethodFilter::PATCH),
        Method::DELETE => Some(MethodFilter::DELETE),
        Method::HEAD => Some(MethodFilter::HEAD),
        Method::OPTIONS => Some(MethodFilter::OPTIONS),
        Method::TRACE => Some(MethodFilter::TRACE),
        _ => None,
    }
}
