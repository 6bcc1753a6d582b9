//! Dual-purpose response wrapper.

use fragua_openapi::{ApiType, TypeDescriptor};
use serde::{Serialize, Serializer};

/// Carries either API data or the name of a template to render it with.
/// On the wire and in the document it is transparent: it serializes and
/// documents exactly as its inner data type.
pub struct DataOrTemplate<T> {
    pub data: T,
    pub template: Option<String>,
}

impl<T> DataOrTemplate<T> {
    pub fn data(data: T) -> Self {
        Self {
            data,
            template: None,
        }
    }

    pub fn with_template(data: T, template: impl Into<String>) -> Self {
        Self {
            data,
            template: Some(template.into()),
        }
    }
}

impl<T: Serialize> Serialize for DataOrTemplate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

impl<T: ApiType> ApiType for DataOrTemplate<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Wrapper {
            inner: T::descriptor,
        }
    }
}
