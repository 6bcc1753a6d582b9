//! The type walker: descriptor in, canonical name + schema reference out.
//!
//! Indirections (pointers, maps, the data-or-template wrapper) are
//! transparent; sequences become array schemas that share their element's
//! identity; struct and primitive leaves are generated once and reused from
//! the registry. A depth guard caps pathological nesting at
//! [`DEFAULT_MAX_DEPTH`] indirections.

use crate::annotate;
use crate::descriptor::{PrimitiveKind, StructDescriptor, TypeDescriptor};
use crate::schema::{Schema, SchemaRef, SchemaRegistry, SchemaType};
use tracing::warn;

/// Maximum number of indirections unwrapped before giving up and returning
/// the `default` sentinel.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Name of the sentinel schema returned when the depth guard trips.
pub const DEFAULT_SCHEMA_NAME: &str = "default";

/// Name of the schema used for absent or erased types.
pub const UNKNOWN_INTERFACE: &str = "unknown-interface";

/// Canonical name plus schema reference for one resolved type.
///
/// The same source type always yields the same `name` within one registry
/// instance; sequences share their element's name while their schema
/// differs by kind.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaTag {
    pub name: String,
    pub schema: SchemaRef,
}

impl SchemaTag {
    fn component(name: &str) -> Self {
        Self {
            name: name.to_string(),
            schema: SchemaRef::component(name),
        }
    }
}

/// Resolve a type descriptor to its schema tag, registering any schemas it
/// produces along the way. `None` stands for an absent type and maps to the
/// always-materialized `unknown-interface` schema.
pub fn resolve(registry: &mut SchemaRegistry, descriptor: Option<&TypeDescriptor>) -> SchemaTag {
    resolve_with_depth(registry, descriptor, DEFAULT_MAX_DEPTH)
}

pub fn resolve_with_depth(
    registry: &mut SchemaRegistry,
    descriptor: Option<&TypeDescriptor>,
    max_depth: usize,
) -> SchemaTag {
    match descriptor {
        None => unknown_interface(registry),
        Some(descriptor) => dive(registry, descriptor, max_depth),
    }
}

fn unknown_interface(registry: &mut SchemaRegistry) -> SchemaTag {
    // Always materialized so downstream tooling can resolve the reference.
    registry.register(UNKNOWN_INTERFACE, Schema::object());
    SchemaTag::component(UNKNOWN_INTERFACE)
}

fn dive(registry: &mut SchemaRegistry, descriptor: &TypeDescriptor, max_depth: usize) -> SchemaTag {
    if max_depth == 0 {
        registry.register(DEFAULT_SCHEMA_NAME, Schema::object());
        return SchemaTag::component(DEFAULT_SCHEMA_NAME);
    }

    match descriptor {
        TypeDescriptor::Indirection { inner } | TypeDescriptor::Wrapper { inner } => {
            dive(registry, &inner(), max_depth - 1)
        }
        TypeDescriptor::Sequence { element } => {
            let item = dive(registry, &element(), max_depth - 1);
            SchemaTag {
                name: item.name,
                schema: SchemaRef::inline(Schema::array(item.schema)),
            }
        }
        TypeDescriptor::Unknown => unknown_interface(registry),
        TypeDescriptor::Primitive(kind) => {
            let name = kind.name();
            registry.register(name, Schema::primitive(primitive_schema_type(*kind)));
            SchemaTag::component(name)
        }
        TypeDescriptor::Structure(struct_descriptor) => {
            let name = canonical_name(struct_descriptor);
            registry.get_or_create(&name, |registry| {
                build_struct_schema(registry, struct_descriptor, max_depth)
            });
            SchemaTag::component(&name)
        }
    }
}

fn primitive_schema_type(kind: PrimitiveKind) -> SchemaType {
    match kind {
        PrimitiveKind::String => SchemaType::String,
        PrimitiveKind::Integer => SchemaType::Integer,
        PrimitiveKind::Number => SchemaType::Number,
        PrimitiveKind::Boolean => SchemaType::Boolean,
    }
}

// ── Canonical naming ────────────────────────────────────────────────────────

/// Canonicalize a struct's name: custom name wins, otherwise the module
/// path is stripped and, for generic types, the bracketed parameter segment
/// is replaced by the capitalized parameter names so that two
/// instantiations never collide (`Paged<i32>` → `PagedI32`).
pub fn canonical_name(descriptor: &StructDescriptor) -> String {
    if let Some(custom) = descriptor.custom_name {
        if !custom.is_empty() {
            return custom.to_string();
        }
    }

    let raw = descriptor.raw_name;
    let (base, generic) = match raw.split_once('<') {
        Some((base, generic)) => (base, Some(generic.trim_end_matches('>'))),
        None => (raw, None),
    };

    let mut name = last_path_segment(base).to_string();
    if let Some(generic) = generic {
        name.push_str(&generic_label(generic));
    }
    name
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Flatten a generic parameter segment into a collision-resistant suffix:
/// each type word loses its module path and gets its first letter
/// capitalized (`alloc::string::String, i32` → `StringI32`).
fn generic_label(generic: &str) -> String {
    let mut label = String::with_capacity(generic.len());
    let words = generic.split(|c: char| matches!(c, '<' | '>' | ',' | ' ' | '(' | ')' | '&' | '\''));
    for word in words {
        if word.is_empty() {
            continue;
        }
        let segment = last_path_segment(word);
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            label.extend(first.to_uppercase());
            label.push_str(chars.as_str());
        }
    }
    label
}

// ── Struct schema generation ────────────────────────────────────────────────

fn build_struct_schema(
    registry: &mut SchemaRegistry,
    descriptor: &StructDescriptor,
    max_depth: usize,
) -> Schema {
    let mut schema = Schema::object();
    if let Some(description) = descriptor.description {
        schema.description = Some(description.to_string());
    }

    collect_properties(registry, descriptor, &mut schema, max_depth);
    annotate::apply_field_tags(descriptor, &mut schema);
    schema
}

fn collect_properties(
    registry: &mut SchemaRegistry,
    descriptor: &StructDescriptor,
    schema: &mut Schema,
    max_depth: usize,
) {
    for field in &descriptor.fields {
        if field.skip {
            continue;
        }
        let field_descriptor = (field.ty)();
        if field.flatten {
            match field_descriptor {
                TypeDescriptor::Structure(inner) => {
                    collect_properties(registry, &inner, schema, max_depth);
                }
                _ => warn!(field = field.name, "flattened field is not a struct, skipping"),
            }
            continue;
        }
        let property = property_schema(registry, &field_descriptor, max_depth);
        schema.properties.insert(field.name.to_string(), property);
    }
}

/// Schema for one property: primitives and sequences stay inline so the
/// annotator can attach bounds to them, structs become shared references.
fn property_schema(
    registry: &mut SchemaRegistry,
    descriptor: &TypeDescriptor,
    max_depth: usize,
) -> SchemaRef {
    if max_depth == 0 {
        registry.register(DEFAULT_SCHEMA_NAME, Schema::object());
        return SchemaRef::component(DEFAULT_SCHEMA_NAME);
    }

    match descriptor {
        TypeDescriptor::Indirection { inner } | TypeDescriptor::Wrapper { inner } => {
            property_schema(registry, &inner(), max_depth - 1)
        }
        TypeDescriptor::Sequence { element } => {
            let items = property_schema(registry, &element(), max_depth - 1);
            SchemaRef::inline(Schema::array(items))
        }
        TypeDescriptor::Primitive(kind) => {
            SchemaRef::inline(Schema::primitive(primitive_schema_type(*kind)))
        }
        TypeDescriptor::Unknown => SchemaRef::inline(Schema::object()),
        TypeDescriptor::Structure(_) => dive(registry, descriptor, max_depth).schema,
    }
}
