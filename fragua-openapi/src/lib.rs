//! OpenAPI 3.1 derivation engine for Fragua.
//!
//! The pipeline is: an [`ApiType`] describes itself as a [`TypeDescriptor`];
//! the [`walker`] resolves descriptors into canonical names and schema
//! references, populating a per-server [`SchemaRegistry`]; the
//! [`operation`] builder composes route and group metadata into documented
//! [`Operation`]s inside a typed [`OpenApi`] document.
//!
//! This crate is HTTP-agnostic: the serving side lives in `fragua-core`.

pub mod annotate;
pub mod descriptor;
pub mod document;
pub mod operation;
pub mod paths;
pub mod schema;
pub mod walker;

pub use descriptor::{ApiType, FieldDescriptor, PrimitiveKind, StructDescriptor, TypeDescriptor};
pub use document::{
    Components, Info, MediaType, OpenApi, Operation, ParamLocation, Parameter, PathItem,
    RequestBody, RequestBodyRef, Response, SecurityScheme, SpecError, Tag,
};
pub use operation::{
    register_operation, GroupMeta, ParamDecl, ResponseDecl, RouteMeta, SchemaDecl,
    APPLICATION_JSON,
};
pub use paths::{
    brace_to_colon, colon_to_brace, default_operation_id, normalize_pattern, openapi_path,
    parse_path_params,
};
pub use schema::{Schema, SchemaRef, SchemaRegistry, SchemaType};
pub use walker::{resolve, resolve_with_depth, SchemaTag, DEFAULT_MAX_DEPTH, UNKNOWN_INTERFACE};
