//! Field descriptors as declared by model columns.
//!
//! A descriptor is an open JSON object. Only `type`, `result_type` and
//! `usage` mean anything to this crate; every other property is carried
//! through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::UsageError;

pub const TYPE_KEY: &str = "type";
pub const RESULT_TYPE_KEY: &str = "result_type";
pub const USAGE_KEY: &str = "usage";

/// Pseudo-type tag of fields whose value is derived from other fields.
pub const COMPUTED_TYPE: &str = "computed";

/// Mapping of field properties to their values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldDescriptor {
    properties: Map<String, Value>,
}

impl FieldDescriptor {
    pub fn new(properties: Map<String, Value>) -> Self {
        Self { properties }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Pseudo-type of the field. Null and non-string values count as unset.
    pub fn field_type(&self) -> Option<&str> {
        self.str_property(TYPE_KEY)
    }

    pub fn result_type(&self) -> Option<&str> {
        self.str_property(RESULT_TYPE_KEY)
    }

    /// Explicit usage override, if present and non-empty.
    pub fn usage(&self) -> Option<&str> {
        self.str_property(USAGE_KEY).filter(|usage| !usage.is_empty())
    }

    pub fn is_computed(&self) -> bool {
        self.field_type() == Some(COMPUTED_TYPE)
    }

    /// Type the field's values actually have: the result type when one is
    /// declared, otherwise the pseudo-type.
    pub fn effective_type(&self) -> Option<&str> {
        self.result_type().or_else(|| self.field_type())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.properties
    }

    fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for FieldDescriptor {
    fn from(properties: Map<String, Value>) -> Self {
        Self::new(properties)
    }
}

impl TryFrom<Value> for FieldDescriptor {
    type Error = UsageError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(properties) => Ok(Self::new(properties)),
            other => Err(UsageError::InvalidSchema {
                message: format!("field descriptor must be an object, got {other}"),
            }),
        }
    }
}

/// Ensures the descriptor carries a `result_type` property.
///
/// A missing or null `result_type` takes the value of `type`, which may
/// itself be null. `type` is never rewritten.
pub fn normalize(descriptor: FieldDescriptor) -> FieldDescriptor {
    let mut properties = descriptor.into_map();
    let has_result_type = properties
        .get(RESULT_TYPE_KEY)
        .is_some_and(|value| !value.is_null());
    if !has_result_type {
        let pseudo_type = properties.get(TYPE_KEY).cloned().unwrap_or(Value::Null);
        properties.insert(RESULT_TYPE_KEY.to_string(), pseudo_type);
    }
    FieldDescriptor::new(properties)
}
