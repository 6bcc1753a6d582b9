//! Fragua — typed axum handlers with an OpenAPI document derived from the
//! same type information.
//!
//! This facade re-exports the sub-crates through a single dependency.
//! Import everything you need with:
//!
//! ```ignore
//! use fragua::prelude::*;
//! ```

pub extern crate fragua_core;
pub extern crate fragua_openapi;

pub use fragua_core::*;

/// Unified prelude — import everything with `use fragua::prelude::*`.
pub mod prelude {
    pub use fragua_core::{
        ContextFull, ContextNoBody, ContextWithBody, ContextWithQuery, DataOrTemplate, ErrorBody,
        HttpError, ReadOptions, RequestContext, Route, RouterGroup, Server, ServerConfig,
    };
    pub use fragua_openapi::{
        ApiType, FieldDescriptor, ParamDecl, ParamLocation, SchemaDecl, StructDescriptor,
        TypeDescriptor,
    };
}
