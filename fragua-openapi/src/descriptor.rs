//! Runtime type descriptors.
//!
//! Rust has no ambient reflection, so every type that participates in
//! documentation derivation describes itself through [`ApiType`]. The
//! resulting [`TypeDescriptor`] tree is what the walker traverses: it knows
//! about pointer-like indirections, sequences, the transparent
//! data-or-template wrapper, struct leaves with field metadata, and
//! primitives. Inner types are referenced through `fn()` thunks so that
//! recursive types can be described without infinite construction; the
//! schema registry breaks reference cycles at resolution time.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

/// Lazy reference to another type's descriptor.
pub type DescriptorFn = fn() -> TypeDescriptor;

/// Structural description of a Rust type, as seen by the type walker.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// A pointer-like wrapper (`Box`, `Arc`, `Option`, map value types, …).
    /// Transparent: resolution dives into the inner type.
    Indirection { inner: DescriptorFn },
    /// `Vec<T>`, arrays and slices. Resolves to an array schema whose item
    /// is the recursively resolved element.
    Sequence { element: DescriptorFn },
    /// The data-or-template wrapper. Transparent: resolution dives into the
    /// data member's type.
    Wrapper { inner: DescriptorFn },
    /// A struct leaf with named fields.
    Structure(StructDescriptor),
    /// A primitive leaf.
    Primitive(PrimitiveKind),
    /// No type information (unit, erased values). Resolves to the
    /// `unknown-interface` schema.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl PrimitiveKind {
    /// Canonical component name for this primitive.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

/// Descriptor for a struct leaf.
///
/// `raw_name` keeps the full `std::any::type_name` output (module path and
/// generic arguments included); canonicalization happens in the walker so
/// that naming rules live in one place.
#[derive(Debug, Clone)]
pub struct StructDescriptor {
    pub raw_name: &'static str,
    pub custom_name: Option<&'static str>,
    pub description: Option<&'static str>,
    pub fields: Vec<FieldDescriptor>,
}

impl StructDescriptor {
    /// Start a descriptor for `T`, picking up its capability hooks.
    pub fn new<T: ApiType>() -> Self {
        Self {
            raw_name: std::any::type_name::<T>(),
            custom_name: T::openapi_name(),
            description: T::openapi_description(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::Structure(self)
    }
}

/// Declarative metadata attached to one struct field.
///
/// This is the Rust rendition of the struct-tag vocabulary: serialization
/// name, skip markers, and the `description` / `example` / `validate`
/// annotations the annotator folds into the generated schema.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Serialization name of the field (explicit rename already applied).
    pub name: &'static str,
    pub ty: DescriptorFn,
    /// Field is not serialized at all; the annotator ignores it.
    pub skip: bool,
    /// Field carries an omit-if-empty marker; maps to `nullable`.
    pub omit_empty: bool,
    /// Embedded field: annotation recurses into the inner struct against
    /// the same target schema.
    pub flatten: bool,
    pub description: Option<&'static str>,
    pub example: Option<&'static str>,
    /// Comma-separated token list: `required`, `min=N`, `max=N`.
    pub validate: Option<&'static str>,
}

impl FieldDescriptor {
    pub fn new<T: ApiType>(name: &'static str) -> Self {
        Self {
            name,
            ty: T::descriptor,
            skip: false,
            omit_empty: false,
            flatten: false,
            description: None,
            example: None,
            validate: None,
        }
    }

    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn example(mut self, example: &'static str) -> Self {
        self.example = Some(example);
        self
    }

    pub fn validate(mut self, tokens: &'static str) -> Self {
        self.validate = Some(tokens);
        self
    }
}

/// Types that can describe themselves for documentation purposes.
///
/// The two `openapi_*` hooks are optional capabilities: a custom name wins
/// over canonical naming, a custom description lands on the generated
/// schema. Containers and primitives are covered below; user structs
/// implement this by hand with [`StructDescriptor`]:
///
/// ```
/// use fragua_openapi::{ApiType, FieldDescriptor, StructDescriptor, TypeDescriptor};
///
/// struct User {
///     name: String,
///     age: i64,
/// }
///
/// impl ApiType for User {
///     fn descriptor() -> TypeDescriptor {
///         StructDescriptor::new::<Self>()
///             .field(FieldDescriptor::new::<String>("name").validate("required,min=3,max=10"))
///             .field(FieldDescriptor::new::<i64>("age").validate("min=18,max=100"))
///             .build()
///     }
/// }
/// ```
pub trait ApiType {
    fn descriptor() -> TypeDescriptor;

    /// Custom OpenAPI component name. Overrides canonical naming entirely.
    fn openapi_name() -> Option<&'static str> {
        None
    }

    /// Custom schema description.
    fn openapi_description() -> Option<&'static str> {
        None
    }
}

// ── Primitive impls ─────────────────────────────────────────────────────────

macro_rules! primitive_api_type {
    ( $kind:expr => $( $ty:ty ),+ $(,)? ) => {
        $(
            impl ApiType for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::Primitive($kind)
                }
            }
        )+
    };
}

primitive_api_type!(PrimitiveKind::String => String, &str);
primitive_api_type!(PrimitiveKind::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
primitive_api_type!(PrimitiveKind::Number => f32, f64);
primitive_api_type!(PrimitiveKind::Boolean => bool);

impl ApiType for () {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Unknown
    }
}

impl ApiType for serde_json::Value {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Unknown
    }
}

// ── Container impls ─────────────────────────────────────────────────────────

impl<T: ApiType> ApiType for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Indirection { inner: T::descriptor }
    }
}

impl<T: ApiType> ApiType for Box<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Indirection { inner: T::descriptor }
    }
}

impl<T: ApiType> ApiType for Arc<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Indirection { inner: T::descriptor }
    }
}

impl<T: ApiType> ApiType for Rc<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Indirection { inner: T::descriptor }
    }
}

impl<T: ApiType> ApiType for &T {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Indirection { inner: T::descriptor }
    }
}

impl<T: ApiType> ApiType for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Sequence { element: T::descriptor }
    }
}

impl<T: ApiType, const N: usize> ApiType for [T; N] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Sequence { element: T::descriptor }
    }
}

impl<T: ApiType> ApiType for &[T] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Sequence { element: T::descriptor }
    }
}

// Maps dive into their value type, like the other indirections.
impl<K, V: ApiType> ApiType for HashMap<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Indirection { inner: V::descriptor }
    }
}

impl<K, V: ApiType> ApiType for BTreeMap<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Indirection { inner: V::descriptor }
    }
}
