//! Generated schema values and the per-server schema registry.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Schema kind, serialized as the OpenAPI `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
}

/// A generated schema value.
///
/// Property order is deterministic (`BTreeMap`), and the required list keeps
/// insertion order so repeated generation yields byte-identical documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub properties: BTreeMap<String, SchemaRef>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaRef>>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

impl Schema {
    pub fn object() -> Self {
        Self {
            schema_type: Some(SchemaType::Object),
            ..Self::default()
        }
    }

    pub fn array(items: SchemaRef) -> Self {
        Self {
            schema_type: Some(SchemaType::Array),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    pub fn primitive(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    pub fn is_integer(&self) -> bool {
        self.schema_type == Some(SchemaType::Integer)
    }

    pub fn is_string(&self) -> bool {
        self.schema_type == Some(SchemaType::String)
    }
}

/// Either a named pointer into `components/schemas` or an inline schema —
/// never both.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaRef {
    Ref(String),
    Inline(Box<Schema>),
}

impl SchemaRef {
    /// Named reference to a registered component.
    pub fn component(name: &str) -> Self {
        SchemaRef::Ref(format!("#/components/schemas/{name}"))
    }

    pub fn inline(schema: Schema) -> Self {
        SchemaRef::Inline(Box::new(schema))
    }

    pub fn as_ref_path(&self) -> Option<&str> {
        match self {
            SchemaRef::Ref(path) => Some(path),
            SchemaRef::Inline(_) => None,
        }
    }

    pub fn as_inline(&self) -> Option<&Schema> {
        match self {
            SchemaRef::Ref(_) => None,
            SchemaRef::Inline(schema) => Some(schema),
        }
    }
}

impl Serialize for SchemaRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SchemaRef::Ref(path) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$ref", path)?;
                map.end()
            }
            SchemaRef::Inline(schema) => schema.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SchemaRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if let Some(path) = value.get("$ref").and_then(Value::as_str) {
            return Ok(SchemaRef::Ref(path.to_string()));
        }
        let schema = serde_json::from_value(value).map_err(serde::de::Error::custom)?;
        Ok(SchemaRef::Inline(Box::new(schema)))
    }
}

/// Append-only mapping from canonical type name to generated schema.
///
/// Owned by one server instance; populated during the registration phase and
/// merged into `components/schemas` when the document is produced.
/// Re-registration under an existing name reuses the stored schema.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `name`, generating and storing the schema on first use.
    ///
    /// The name is reserved with a placeholder before the generator runs:
    /// a generator that reaches `name` again through a reference cycle sees
    /// it as already registered and resolves to a `$ref` instead of
    /// recursing. The placeholder is replaced once generation finishes.
    pub fn get_or_create(&mut self, name: &str, generate: impl FnOnce(&mut Self) -> Schema) -> Schema {
        if let Some(existing) = self.schemas.get(name) {
            return existing.clone();
        }
        self.schemas.insert(name.to_string(), Schema::object());
        let schema = generate(self);
        self.schemas.insert(name.to_string(), schema.clone());
        schema
    }

    pub fn register(&mut self, name: &str, schema: Schema) {
        self.schemas.entry(name.to_string()).or_insert(schema);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Snapshot of the registered schemas, for embedding in the document.
    pub fn schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }
}
