//! Content-negotiated serialization.
//!
//! Success and error paths share one encoder set keyed by content type.
//! JSON is the default and always present; YAML ships built in; anything
//! else can be plugged in per server. A configured custom serializer
//! replaces negotiation entirely.

use crate::error::HttpError;
use axum::response::Response;
use http::{header, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_YAML: &str = "application/yaml";

/// Encode an already-transformed value into bytes for one content type.
pub type EncoderFn = Arc<dyn Fn(&Value) -> Result<Vec<u8>, EncodeError> + Send + Sync>;

/// Full replacement for the default negotiation + encoding step.
pub type SerializerFn = Arc<dyn Fn(Value) -> Response + Send + Sync>;

#[derive(Debug)]
pub struct EncodeError {
    pub message: String,
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<EncodeError> for HttpError {
    fn from(err: EncodeError) -> Self {
        HttpError::Internal(format!("cannot serialize response: {err}"))
    }
}

/// Ordered set of output encoders; negotiation scans the Accept header in
/// preference order against it.
#[derive(Clone)]
pub struct EncoderSet {
    entries: Vec<(String, EncoderFn)>,
}

impl Default for EncoderSet {
    fn default() -> Self {
        Self {
            entries: vec![
                (APPLICATION_JSON.to_string(), json_encoder()),
                (APPLICATION_YAML.to_string(), yaml_encoder()),
            ],
        }
    }
}

impl EncoderSet {
    /// Register an encoder, replacing any existing one for the same
    /// content type.
    pub fn insert(&mut self, content_type: &str, encoder: EncoderFn) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|(registered, _)| registered.as_str() == content_type)
        {
            existing.1 = encoder;
        } else {
            self.entries.push((content_type.to_string(), encoder));
        }
    }

    /// Pick an encoder for the request's accept preference. Unknown or
    /// absent preferences fall back to the first registered entry (JSON).
    pub fn negotiate(&self, accept: Option<&str>) -> (&str, &EncoderFn) {
        if let Some(accept) = accept {
            for item in accept.split(',') {
                let media = item.split(';').next().unwrap_or("").trim();
                if media.is_empty() || media == "*/*" {
                    break;
                }
                if let Some((content_type, encoder)) = self.lookup(media) {
                    return (content_type, encoder);
                }
            }
        }
        let (content_type, encoder) = &self.entries[0];
        (content_type.as_str(), encoder)
    }

    fn lookup(&self, media: &str) -> Option<(&str, &EncoderFn)> {
        if let Some(prefix) = media.strip_suffix("/*") {
            return self
                .entries
                .iter()
                .find(|(registered, _)| registered.starts_with(prefix))
                .map(|(registered, encoder)| (registered.as_str(), encoder));
        }
        self.entries
            .iter()
            .find(|(registered, _)| registered == media)
            .map(|(registered, encoder)| (registered.as_str(), encoder))
    }
}

pub fn json_encoder() -> EncoderFn {
    Arc::new(|value| {
        serde_json::to_vec(value).map_err(|err| EncodeError {
            message: err.to_string(),
        })
    })
}

pub fn yaml_encoder() -> EncoderFn {
    Arc::new(|value| {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|err| EncodeError {
                message: err.to_string(),
            })
    })
}

/// Serialize a success value under the negotiated content type.
pub fn serialize_value(
    encoders: &EncoderSet,
    accept: Option<&str>,
    value: &Value,
) -> Result<Response, HttpError> {
    let (content_type, encoder) = encoders.negotiate(accept);
    let bytes = encoder(value)?;
    Ok(plain_response(StatusCode::OK, content_type, bytes))
}

/// Serialize an error under the negotiated content type. This never fails:
/// if the negotiated encoder itself errors, a hardcoded JSON body keeps the
/// response well-formed with the intended status.
pub fn serialize_error(encoders: &EncoderSet, accept: Option<&str>, err: &HttpError) -> Response {
    let status = err.status();
    let body = err.problem();
    let (content_type, encoder) = encoders.negotiate(accept);
    match encoder(&body) {
        Ok(bytes) => plain_response(status, content_type, bytes),
        Err(encode_err) => {
            error!(%encode_err, "error encoder failed, falling back to JSON");
            let bytes = serde_json::to_vec(&body)
                .unwrap_or_else(|_| br#"{"title":"Internal Server Error","status":500}"#.to_vec());
            plain_response(status, APPLICATION_JSON, bytes)
        }
    }
}

fn plain_response(status: StatusCode, content_type: &str, bytes: Vec<u8>) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(axum::body::Body::from(bytes))
        .unwrap_or_default()
}
