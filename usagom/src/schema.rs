//! Entity schemas: the ordered fields of one model.
//!
//! Schema documents look like
//!
//! ```text
//! {
//!     "entity": "core\\Permission",
//!     "fields": {
//!         "class_name": { "type": "string", "required": true },
//!         "rights_txt": { "type": "computed", "result_type": "string" }
//!     }
//! }
//! ```
//!
//! and may equally be written in TOML.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::descriptor::FieldDescriptor;
use crate::errors::{UsageError, ValidationError, ValidationIssue};
use crate::field::Field;
use crate::usage::{DefaultUsageFactory, UsageFactory};

/// Result types of relation fields that hold collections of foreign ids.
const COLLECTION_RELATIONS: &[&str] = &["one2many", "many2many"];

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    entity: String,
    #[serde(default)]
    description: Option<String>,
    fields: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct ModelSchema {
    entity: String,
    description: Option<String>,
    fields: IndexMap<String, Field>,
}

impl ModelSchema {
    pub fn from_columns(entity: impl Into<String>, columns: Map<String, Value>) -> Result<Self, UsageError> {
        Self::from_columns_with_factory(entity, columns, Arc::new(DefaultUsageFactory))
    }

    /// Builds one field per column, in declaration order, sharing `factory`.
    pub fn from_columns_with_factory(
        entity: impl Into<String>,
        columns: Map<String, Value>,
        factory: Arc<dyn UsageFactory>,
    ) -> Result<Self, UsageError> {
        let entity = entity.into();
        let mut fields = IndexMap::with_capacity(columns.len());
        for (name, descriptor) in columns {
            let descriptor = FieldDescriptor::try_from(descriptor).map_err(|_| UsageError::InvalidSchema {
                message: format!("{entity}.{name}: field descriptor must be an object"),
            })?;
            let field = Field::with_factory(descriptor, Arc::clone(&factory)).named(name.clone());
            fields.insert(name, field);
        }
        Ok(Self {
            entity,
            description: None,
            fields,
        })
    }

    pub fn from_json_str(source: &str) -> Result<Self, UsageError> {
        let document: SchemaDocument = serde_json::from_str(source)?;
        Self::from_document(document)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, UsageError> {
        let document: SchemaDocument = toml::from_str(source)?;
        Self::from_document(document)
    }

    /// Loads a `.json` or `.toml` schema document.
    pub fn load(path: &Path) -> Result<Self, UsageError> {
        let source = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            Some("toml") => Self::from_toml_str(&source),
            _ => Err(UsageError::InvalidSchema {
                message: format!("{}: expected a .json or .toml schema", path.display()),
            }),
        }
    }

    fn from_document(document: SchemaDocument) -> Result<Self, UsageError> {
        if document.entity.is_empty() {
            return Err(UsageError::InvalidSchema {
                message: "schema entity name is empty".to_string(),
            });
        }
        let mut schema = Self::from_columns(document.entity, document.fields)?;
        schema.description = document.description;
        Ok(schema)
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields holding a value of their own, i.e. everything except
    /// one-to-many and many-to-many relations.
    pub fn exportable_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, field)| {
                field
                    .descriptor()
                    .effective_type()
                    .is_none_or(|effective| !COLLECTION_RELATIONS.contains(&effective))
            })
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Validates a record against the schema.
    ///
    /// Null values count as unset. Fields declared `required` must be set.
    /// Issues from every field are reported together.
    pub fn validate(&self, record: &Map<String, Value>) -> Result<(), UsageError> {
        let mut issues = Vec::new();

        for key in record.keys().filter(|key| !self.fields.contains_key(*key)) {
            issues.push(ValidationIssue::new(
                key.clone(),
                "unknown_field",
                format!("Field is not part of entity {}.", self.entity),
            ));
        }

        for (name, field) in &self.fields {
            match record.get(name).filter(|value| !value.is_null()) {
                Some(value) => match field.validate(value) {
                    Ok(()) => {}
                    Err(UsageError::Validation(err)) => issues.extend(err.issues),
                    Err(other) => return Err(other),
                },
                None if is_required(field) => {
                    issues.push(ValidationIssue::new(name.clone(), "missing_value", "Field is required."));
                }
                None => {}
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues).into())
        }
    }
}

fn is_required(field: &Field) -> bool {
    field.descriptor().get("required").and_then(Value::as_bool).unwrap_or(false)
}
