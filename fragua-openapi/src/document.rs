//! Typed OpenAPI 3.1 document model.
//!
//! Only the fields the derivation engine actually produces are modeled;
//! everything serializes with `skip_serializing_if` so absent values vanish
//! from the output. The document can check itself for internal consistency
//! (unresolved references, duplicate operation ids) before being handed to
//! callers.

use crate::schema::{Schema, SchemaRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const OPENAPI_VERSION: &str = "3.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApi {
    pub openapi: String,
    pub info: Info,
    pub paths: BTreeMap<String, PathItem>,
    #[serde(skip_serializing_if = "Components::is_empty", default)]
    pub components: Components,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations under one path, keyed by lowercase HTTP method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(flatten)]
    pub operations: BTreeMap<String, Operation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId", skip_serializing_if = "String::is_empty", default)]
    pub operation_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyRef>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub responses: BTreeMap<String, Response>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub deprecated: bool,
}

impl Operation {
    /// Add a parameter, replacing any previous one with the same name and
    /// location.
    pub fn add_parameter(&mut self, parameter: Parameter) {
        if let Some(existing) = self
            .parameters
            .iter_mut()
            .find(|p| p.name == parameter.name && p.location == parameter.location)
        {
            *existing = parameter;
        } else {
            self.parameters.push(parameter);
        }
    }

    /// Add a response; a later registration for the same status code
    /// replaces the earlier one.
    pub fn add_response(&mut self, code: u16, response: Response) {
        self.responses.insert(code.to_string(), response);
    }
}

/// Where a parameter is located in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub required: bool,
    pub schema: SchemaRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

impl Parameter {
    /// Required string-typed path parameter, the shape every `{token}`
    /// produces.
    pub fn path(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: ParamLocation::Path,
            description: None,
            required: true,
            schema: SchemaRef::inline(Schema::primitive(crate::schema::SchemaType::String)),
            example: None,
        }
    }

    pub fn new(name: &str, location: ParamLocation) -> Self {
        Self {
            name: name.to_string(),
            location,
            description: None,
            required: false,
            schema: SchemaRef::inline(Schema::primitive(crate::schema::SchemaType::String)),
            example: None,
        }
    }
}

/// Either a named pointer into `components/requestBodies` or an inline
/// request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBodyRef {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Inline(RequestBody),
}

impl RequestBodyRef {
    pub fn component(name: &str) -> Self {
        RequestBodyRef::Ref {
            reference: format!("#/components/requestBodies/{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: SchemaRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub content: BTreeMap<String, MediaType>,
}

impl Response {
    /// Response carrying `schema` under each of the given content types.
    pub fn with_content(description: &str, schema: &SchemaRef, content_types: &[String]) -> Self {
        Self {
            description: description.to_string(),
            content: media_content(schema, content_types),
        }
    }
}

/// Content-type → media-type map sharing one schema reference.
pub fn media_content(schema: &SchemaRef, content_types: &[String]) -> BTreeMap<String, MediaType> {
    content_types
        .iter()
        .map(|content_type| {
            (
                content_type.clone(),
                MediaType {
                    schema: schema.clone(),
                },
            )
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub schemas: BTreeMap<String, Schema>,
    #[serde(rename = "requestBodies", skip_serializing_if = "BTreeMap::is_empty", default)]
    pub request_bodies: BTreeMap<String, RequestBody>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub responses: BTreeMap<String, Response>,
    #[serde(rename = "securitySchemes", skip_serializing_if = "BTreeMap::is_empty", default)]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

impl Components {
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.request_bodies.is_empty()
            && self.responses.is_empty()
            && self.security_schemes.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
}

impl SecurityScheme {
    pub fn bearer_jwt() -> Self {
        Self {
            scheme_type: "http".to_string(),
            scheme: Some("bearer".to_string()),
            bearer_format: Some("JWT".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ── Consistency validation ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    UndefinedReference { reference: String },
    DuplicateOperationId { operation_id: String },
}

impl std::fmt::Display for SpecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecError::UndefinedReference { reference } => {
                write!(f, "undefined reference: {reference}")
            }
            SpecError::DuplicateOperationId { operation_id } => {
                write!(f, "duplicate operation id: {operation_id}")
            }
        }
    }
}

impl std::error::Error for SpecError {}

impl OpenApi {
    pub fn new(title: &str, version: &str, description: Option<&str>) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: title.to_string(),
                version: version.to_string(),
                description: description.map(str::to_string),
            },
            paths: BTreeMap::new(),
            components: Components::default(),
            tags: Vec::new(),
        }
    }

    /// Insert `operation` at (path, method), replacing any previous entry.
    pub fn add_operation(&mut self, path: &str, method: &str, operation: Operation) {
        self.paths
            .entry(path.to_string())
            .or_default()
            .operations
            .insert(method.to_lowercase(), operation);
    }

    pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
        self.paths
            .get(path)?
            .operations
            .get(&method.to_lowercase())
    }

    /// Register a spec-level tag once; duplicates by name are ignored.
    pub fn add_tag(&mut self, tag: Tag) {
        if !self.tags.iter().any(|existing| existing.name == tag.name) {
            self.tags.push(tag);
        }
    }

    /// Serialize to JSON, optionally pretty-printed.
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Internal-consistency check: every `$ref` must resolve inside
    /// `components`, and operation ids must be unique across the document.
    pub fn validate(&self) -> Result<(), SpecError> {
        let mut seen_ids = std::collections::BTreeSet::new();
        for item in self.paths.values() {
            for operation in item.operations.values() {
                if !operation.operation_id.is_empty()
                    && !seen_ids.insert(operation.operation_id.clone())
                {
                    return Err(SpecError::DuplicateOperationId {
                        operation_id: operation.operation_id.clone(),
                    });
                }
                for parameter in &operation.parameters {
                    self.check_schema_ref(&parameter.schema)?;
                }
                if let Some(RequestBodyRef::Ref { reference }) = &operation.request_body {
                    let name = reference
                        .strip_prefix("#/components/requestBodies/")
                        .unwrap_or("");
                    if !self.components.request_bodies.contains_key(name) {
                        return Err(SpecError::UndefinedReference {
                            reference: reference.clone(),
                        });
                    }
                }
                if let Some(RequestBodyRef::Inline(body)) = &operation.request_body {
                    for media in body.content.values() {
                        self.check_schema_ref(&media.schema)?;
                    }
                }
                for response in operation.responses.values() {
                    for media in response.content.values() {
                        self.check_schema_ref(&media.schema)?;
                    }
                }
            }
        }
        for schema in self.components.schemas.values() {
            self.check_schema(schema)?;
        }
        for body in self.components.request_bodies.values() {
            for media in body.content.values() {
                self.check_schema_ref(&media.schema)?;
            }
        }
        Ok(())
    }

    fn check_schema_ref(&self, schema_ref: &SchemaRef) -> Result<(), SpecError> {
        match schema_ref {
            SchemaRef::Ref(path) => {
                let name = path.strip_prefix("#/components/schemas/").unwrap_or("");
                if name.is_empty() || !self.components.schemas.contains_key(name) {
                    return Err(SpecError::UndefinedReference {
                        reference: path.clone(),
                    });
                }
                Ok(())
            }
            SchemaRef::Inline(schema) => self.check_schema(schema),
        }
    }

    fn check_schema(&self, schema: &Schema) -> Result<(), SpecError> {
        for property in schema.properties.values() {
            self.check_schema_ref(property)?;
        }
        if let Some(items) = &schema.items {
            self.check_schema_ref(items)?;
        }
        Ok(())
    }
}
