//! Typed axum handlers with an OpenAPI document derived from the same
//! type information.
//!
//! A handler is a plain `async fn(C) -> Result<T, HttpError>`: `C` names
//! the request shape it needs, `T` the value it returns. Registering it
//! on a [`Server`] wires the route and documents the operation in one
//! call, so the document can never drift from the code.

pub mod context;
pub mod error;
pub mod group;
pub mod handler;
pub mod response;
pub mod serialize;
pub mod server;

pub use context::{ContextFull, ContextNoBody, ContextWithBody, ContextWithQuery, ReadOptions, RequestContext};
pub use error::{ErrorBody, HttpError};
pub use group::{Route, RouterGroup};
pub use handler::{ErrorHandlerFn, Hooks, TransformFn};
pub use response::DataOrTemplate;
pub use serialize::{EncoderFn, EncoderSet, SerializerFn, APPLICATION_JSON, APPLICATION_YAML};
pub use server::{default_cors, init_tracing, Server, ServerConfig};
