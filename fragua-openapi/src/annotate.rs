//! Field-tag annotation: folds declarative field metadata into a freshly
//! generated object schema. Best-effort by design — a missing property or a
//! malformed tag is logged and skipped, never an error, so registration
//! always completes.

use crate::descriptor::{FieldDescriptor, StructDescriptor, TypeDescriptor};
use crate::schema::{Schema, SchemaRef};
use serde_json::Value;
use tracing::{debug, warn};

/// Apply every field's tags to `schema`. Embedded (flattened) fields
/// recurse against the same target schema, mirroring how their properties
/// were collected.
pub fn apply_field_tags(descriptor: &StructDescriptor, schema: &mut Schema) {
    for field in &descriptor.fields {
        if field.skip {
            continue;
        }
        if field.flatten {
            if let TypeDescriptor::Structure(inner) = (field.ty)() {
                apply_field_tags(&inner, schema);
            }
            continue;
        }
        apply_one(field, schema);
    }
}

fn apply_one(field: &FieldDescriptor, schema: &mut Schema) {
    // `required` lands on the parent schema, so handle it before the
    // property lookup can bail out.
    let tokens: Vec<&str> = field
        .validate
        .map(|tags| tags.split(',').map(str::trim).collect())
        .unwrap_or_default();
    if tokens.contains(&"required") && !schema.required.iter().any(|name| name == field.name) {
        schema.required.push(field.name.to_string());
    }

    let Some(property) = schema.properties.get(field.name) else {
        warn!(property = field.name, "property not found in schema, skipping annotation");
        return;
    };

    // Copy-then-write: the same named schema may be referenced from several
    // operations, so the stored property value is never mutated in place.
    let mut value = match property {
        SchemaRef::Inline(inner) => inner.as_ref().clone(),
        SchemaRef::Ref(path) => {
            debug!(property = field.name, reference = %path, "shared property reference left unannotated");
            return;
        }
    };

    if let Some(example) = field.example {
        value.example = Some(example_value(&value, example));
    }

    for token in &tokens {
        if let Some(raw) = token.strip_prefix("min=") {
            match raw.parse::<i64>() {
                Ok(min) if value.is_integer() => value.minimum = Some(min as f64),
                Ok(min) if value.is_string() => value.min_length = Some(min.max(0) as u64),
                Ok(_) => {}
                Err(err) => warn!(property = field.name, %err, "min bound is not an integer"),
            }
        } else if let Some(raw) = token.strip_prefix("max=") {
            match raw.parse::<i64>() {
                Ok(max) if value.is_integer() => value.maximum = Some(max as f64),
                Ok(max) if value.is_string() => value.max_length = Some(max.max(0) as u64),
                Ok(_) => {}
                Err(err) => warn!(property = field.name, %err, "max bound is not an integer"),
            }
        }
    }

    if let Some(description) = field.description {
        value.description = Some(description.to_string());
    }
    if field.omit_empty {
        value.nullable = true;
    }

    schema
        .properties
        .insert(field.name.to_string(), SchemaRef::inline(value));
}

/// Examples are written as strings; integer-typed properties get theirs
/// parsed, with the raw string as a logged fallback.
fn example_value(property: &Schema, example: &str) -> Value {
    if property.is_integer() {
        match example.parse::<i64>() {
            Ok(number) => return Value::from(number),
            Err(err) => {
                warn!(example, %err, "example should be an integer, keeping raw string");
            }
        }
    }
    Value::from(example)
}
