//! The operation builder: route + group metadata in, documented operation
//! out.
//!
//! Building is additive across repeated calls on the same route: tags
//! accumulate, caller-set fields are preserved, and only an empty operation
//! id is defaulted. Schema problems degrade to placeholders — registration
//! never aborts because documentation fell short.

use crate::descriptor::TypeDescriptor;
use crate::document::{
    media_content, OpenApi, Operation, ParamLocation, Parameter, RequestBody, RequestBodyRef,
    Response, Tag,
};
use crate::paths::{default_operation_id, openapi_path, parse_path_params};
use crate::schema::SchemaRegistry;
use crate::walker::{self, UNKNOWN_INTERFACE};
use serde_json::Value;
use tracing::debug;

pub const APPLICATION_JSON: &str = "application/json";

/// Schema declaration for a request or response body: the type to resolve,
/// the content types it is served under, and a human description.
#[derive(Debug, Clone)]
pub struct SchemaDecl {
    pub descriptor: Option<TypeDescriptor>,
    pub content_types: Vec<String>,
    pub description: String,
}

impl Default for SchemaDecl {
    fn default() -> Self {
        Self {
            descriptor: None,
            content_types: vec![APPLICATION_JSON.to_string()],
            description: String::new(),
        }
    }
}

impl SchemaDecl {
    pub fn of(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor: Some(descriptor),
            ..Self::default()
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// A declared non-success response: status code plus its schema.
#[derive(Debug, Clone)]
pub struct ResponseDecl {
    pub code: u16,
    pub schema: SchemaDecl,
}

/// An inheritable parameter declared on a group.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub location: ParamLocation,
    pub description: String,
    pub required: bool,
    pub example: Option<Value>,
}

/// Group-side inputs to operation building: the tag chain snapshot, the
/// synthesized path-segment tag, and inherited parameters.
#[derive(Debug, Clone, Default)]
pub struct GroupMeta {
    pub tags: Vec<String>,
    pub group_tag: Option<String>,
    pub hide_group_tag: bool,
    pub params: Vec<ParamDecl>,
}

/// Route-side inputs to operation building.
#[derive(Debug, Clone)]
pub struct RouteMeta {
    pub method: String,
    /// Full path in brace form, group prefix included.
    pub path: String,
    pub request: SchemaDecl,
    pub response: SchemaDecl,
    pub errors: Vec<ResponseDecl>,
    /// Pre-supplied operation; builder augments, never replaces.
    pub operation: Option<Operation>,
}

impl RouteMeta {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            request: SchemaDecl::default(),
            response: SchemaDecl::default(),
            errors: Vec::new(),
            operation: None,
        }
    }
}

/// Build and register the operation for one route.
///
/// `auto_group_tags` gates the synthesized path-segment tag;
/// `global_responses` are the server-wide default responses applied before
/// route-local declarations so local ones win per status code.
pub fn register_operation(
    spec: &mut OpenApi,
    registry: &mut SchemaRegistry,
    global_responses: &[ResponseDecl],
    group: &GroupMeta,
    route: &RouteMeta,
    auto_group_tags: bool,
) -> Operation {
    let mut operation = route.operation.clone().unwrap_or_default();

    // Tags: the group chain snapshot, then the synthesized group tag.
    operation.tags.extend(group.tags.iter().cloned());
    if auto_group_tags {
        if let Some(group_tag) = &group.group_tag {
            operation.tags.push(group_tag.clone());
            if !group.hide_group_tag {
                spec.add_tag(Tag {
                    name: group_tag.clone(),
                    description: None,
                });
            }
        }
    }

    // Inherited parameters, outermost first.
    for param in &group.params {
        operation.add_parameter(declared_parameter(param));
    }

    // Request body: shared by reference across routes using the same type.
    if operation.request_body.is_none() {
        if let Some(descriptor) = &route.request.descriptor {
            let tag = walker::resolve(registry, Some(descriptor));
            if tag.name != UNKNOWN_INTERFACE {
                let body = RequestBody {
                    description: non_empty(&route.request.description),
                    required: true,
                    content: media_content(&tag.schema, &route.request.content_types),
                };
                spec.components.request_bodies.insert(tag.name.clone(), body);
                operation.request_body = Some(RequestBodyRef::component(&tag.name));
            }
        }
    }

    // Responses: globals, then locals, then the 200 success — later
    // registration replaces the map entry at that status code.
    for declared in global_responses {
        add_response(&mut operation, registry, declared.code, &declared.schema);
    }
    for declared in &route.errors {
        add_response(&mut operation, registry, declared.code, &declared.schema);
    }
    if route.response.descriptor.is_some() {
        add_response(&mut operation, registry, 200, &route.response);
    }

    // Path parameters.
    for token in parse_path_params(&route.path) {
        let (name, catch_all) = match token.strip_prefix('*') {
            Some(rest) => (rest, true),
            None => (token.as_str(), false),
        };
        if name.is_empty() {
            continue;
        }
        let mut parameter = Parameter::path(name);
        if catch_all {
            parameter.description = Some("might contain slashes".to_string());
        }
        operation.add_parameter(parameter);
    }

    if operation.operation_id.is_empty() {
        operation.operation_id = default_operation_id(&route.method, &route.path);
    }

    let document_path = openapi_path(&route.path);
    debug!(method = %route.method, path = %document_path, "documented operation");
    spec.add_operation(&document_path, &route.method, operation.clone());
    operation
}

fn add_response(operation: &mut Operation, registry: &mut SchemaRegistry, code: u16, decl: &SchemaDecl) {
    let tag = walker::resolve(registry, decl.descriptor.as_ref());
    let response = Response::with_content(&decl.description, &tag.schema, &decl.content_types);
    operation.add_response(code, response);
}

fn declared_parameter(declared: &ParamDecl) -> Parameter {
    let mut parameter = Parameter::new(&declared.name, declared.location);
    parameter.description = non_empty(&declared.description);
    parameter.required = declared.required;
    parameter.example = declared.example.clone();
    parameter
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
