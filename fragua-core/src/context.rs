//! Typed request contexts.
//!
//! A handler declares the shape of request it needs by its context
//! parameter: no body, a typed body, typed query parameters, or both.
//! The adapter builds the context before the handler runs, so a handler
//! that receives its context never sees a malformed request.

use crate::error::HttpError;
use axum::extract::{FromRequestParts, Query, RawPathParams, Request};
use fragua_openapi::ApiType;
use http::{header, HeaderMap, Method, Uri};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::ops::Deref;

const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Limits and strictness applied while reading a request.
#[derive(Clone, Copy, Debug)]
pub struct ReadOptions {
    pub max_body_size: usize,
    /// Reject bodies carrying fields the target type does not declare.
    pub disallow_unknown_fields: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            disallow_unknown_fields: false,
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Context shapes the adapter knows how to build. Implemented only by the
/// context types in this module.
pub trait RequestContext: sealed::Sealed + Sized + Send {
    /// Body type documented as the operation's request body. `()` means
    /// the operation takes no body.
    type Body: ApiType + DeserializeOwned + Send;

    fn build(
        req: Request,
        options: ReadOptions,
    ) -> impl Future<Output = Result<Self, HttpError>> + Send;
}

/// Request metadata without a decoded body.
pub struct ContextNoBody {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    path_params: Vec<(String, String)>,
}

impl ContextNoBody {
    async fn from_request(req: Request) -> (Self, axum::body::Body) {
        let (mut parts, body) = req.into_parts();
        let path_params = match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(params) => params
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            Err(_) => Vec::new(),
        };
        let context = Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            path_params,
        };
        (context, body)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn accept(&self) -> Option<&str> {
        self.header(header::ACCEPT.as_str())
    }

    /// Value of one path parameter, as matched by the route pattern.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_params()
            .into_iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    pub fn query_params(&self) -> Vec<(String, String)> {
        let raw = self.uri.query().unwrap_or("");
        form_urlencoded::parse(raw.as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }
}

impl sealed::Sealed for ContextNoBody {}

impl RequestContext for ContextNoBody {
    type Body = ();

    async fn build(req: Request, _options: ReadOptions) -> Result<Self, HttpError> {
        let (context, _body) = Self::from_request(req).await;
        Ok(context)
    }
}

/// Context carrying a JSON-decoded request body.
pub struct ContextWithBody<B> {
    base: ContextNoBody,
    pub body: B,
}

impl<B> Deref for ContextWithBody<B> {
    type Target = ContextNoBody;

    fn deref(&self) -> &ContextNoBody {
        &self.base
    }
}

impl<B> sealed::Sealed for ContextWithBody<B> {}

impl<B> RequestContext for ContextWithBody<B>
where
    B: ApiType + DeserializeOwned + Send,
{
    type Body = B;

    async fn build(req: Request, options: ReadOptions) -> Result<Self, HttpError> {
        let (base, body) = ContextNoBody::from_request(req).await;
        let body = decode_body(body, options).await?;
        Ok(Self { base, body })
    }
}

/// Context carrying typed query parameters decoded from the URI.
pub struct ContextWithQuery<Q> {
    base: ContextNoBody,
    pub query: Q,
}

impl<Q> Deref for ContextWithQuery<Q> {
    type Target = ContextNoBody;

    fn deref(&self) -> &ContextNoBody {
        &self.base
    }
}

impl<Q> sealed::Sealed for ContextWithQuery<Q> {}

impl<Q> RequestContext for ContextWithQuery<Q>
where
    Q: DeserializeOwned + Send,
{
    type Body = ();

    async fn build(req: Request, _options: ReadOptions) -> Result<Self, HttpError> {
        let (base, _body) = ContextNoBody::from_request(req).await;
        let query = decode_query(base.uri())?;
        Ok(Self { base, query })
    }
}

/// Context carrying both a decoded body and typed query parameters.
pub struct ContextFull<B, Q> {
    base: ContextNoBody,
    pub body: B,
    pub query: Q,
}

impl<B, Q> Deref for ContextFull<B, Q> {
    type Target = ContextNoBody;

    fn deref(&self) -> &ContextNoBody {
        &self.base
    }
}

impl<B, Q> sealed::Sealed for ContextFull<B, Q> {}

impl<B, Q> RequestContext for ContextFull<B, Q>
where
    B: ApiType + DeserializeOwned + Send,
    Q: DeserializeOwned + Send,
{
    type Body = B;

    async fn build(req: Request, options: ReadOptions) -> Result<Self, HttpError> {
        let (base, body) = ContextNoBody::from_request(req).await;
        let query = decode_query(base.uri())?;
        let body = decode_body(body, options).await?;
        Ok(Self { base, body, query })
    }
}

async fn decode_body<B: DeserializeOwned>(
    body: axum::body::Body,
    options: ReadOptions,
) -> Result<B, HttpError> {
    let limited = Limited::new(body, options.max_body_size);
    let bytes = match limited.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(HttpError::BadRequest(format!(
                "request body exceeds {} bytes",
                options.max_body_size
            )))
        }
        Err(err) => {
            return Err(HttpError::BadRequest(format!(
                "cannot read request body: {err}"
            )))
        }
    };
    // An absent body decodes as JSON `null`, so `Option<T>` and `()` work.
    let slice: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    if options.disallow_unknown_fields {
        return decode_json_strict(slice);
    }
    serde_json::from_slice(slice)
        .map_err(|err| HttpError::BadRequest(format!("cannot decode request body: {err}")))
}

/// Strict JSON decoding: any field the target type ignores fails the
/// request instead of being dropped.
fn decode_json_strict<B: DeserializeOwned>(slice: &[u8]) -> Result<B, HttpError> {
    let mut deserializer = serde_json::Deserializer::from_slice(slice);
    let mut unknown: Option<String> = None;
    let decoded = serde_ignored::deserialize(&mut deserializer, |path| {
        unknown.get_or_insert_with(|| path.to_string());
    })
    .map_err(|err| HttpError::BadRequest(format!("cannot decode request body: {err}")))?;
    deserializer
        .end()
        .map_err(|err| HttpError::BadRequest(format!("cannot decode request body: {err}")))?;
    if let Some(field) = unknown {
        return Err(HttpError::BadRequest(format!(
            "unknown field `{field}` in request body"
        )));
    }
    Ok(decoded)
}

fn decode_query<Q: DeserializeOwned>(uri: &Uri) -> Result<Q, HttpError> {
    Query::<Q>::try_from_uri(uri)
        .map(|query| query.0)
        .map_err(|err| HttpError::BadRequest(format!("cannot decode query parameters: {err}")))
}
