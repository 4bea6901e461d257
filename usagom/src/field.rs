use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::alias::{PseudoType, usage_string_for};
use crate::constraint::{ConstraintSet, INVALID_TYPE, expected_kind, merge, type_constraint};
use crate::descriptor::{FieldDescriptor, RESULT_TYPE_KEY, normalize};
use crate::errors::{UnrecognizedUsageError, UsageError, ValidationError, ValidationIssue};
use crate::usage::{DefaultUsageFactory, UntypedUsage, Usage, UsageFactory};
use crate::value::ValueKind;

/// Usage string implied by a descriptor's type, ignoring any `usage` override.
///
/// Computed fields are classified by their result type. Types outside the
/// alias table are returned as they are. Returns `None` for untyped fields.
pub fn resolve_usage_string(descriptor: &FieldDescriptor) -> Option<&str> {
    let mut effective_type = descriptor.field_type()?;
    if descriptor.is_computed()
        && let Some(result_type) = descriptor.result_type()
    {
        effective_type = result_type;
    }
    if PseudoType::parse(effective_type).is_none() {
        log::debug!("type '{effective_type}' has no usage alias, using it as the usage string");
    }
    Some(usage_string_for(effective_type))
}

/// A model field: its normalized descriptor plus the usage resolved from it.
///
/// The usage is resolved on first use and cached for the lifetime of the
/// field; concurrent first calls resolve it once.
#[derive(Clone)]
pub struct Field {
    name: String,
    descriptor: FieldDescriptor,
    factory: Arc<dyn UsageFactory>,
    usage: OnceCell<Arc<dyn Usage>>,
}

impl Field {
    /// Creates a field resolved through [`DefaultUsageFactory`].
    pub fn new(descriptor: FieldDescriptor) -> Self {
        Self::with_factory(descriptor, Arc::new(DefaultUsageFactory))
    }

    pub fn with_factory(descriptor: FieldDescriptor, factory: Arc<dyn UsageFactory>) -> Self {
        let descriptor = normalize(descriptor);
        if let Some(result_type) = descriptor.result_type()
            && ValueKind::from_name(expected_kind(result_type)).is_none()
        {
            log::warn!("result type '{result_type}' names no runtime kind, no value will pass its type check");
        }
        Self {
            name: String::new(),
            descriptor,
            factory,
            usage: OnceCell::new(),
        }
    }

    /// Sets the name reported in validation issues.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized descriptor. It always carries `result_type`.
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn usage_string(&self) -> Option<&str> {
        resolve_usage_string(&self.descriptor)
    }

    /// Resolves the field's usage, building it at most once.
    ///
    /// An explicit `usage` property takes precedence over the type.
    pub fn usage(&self) -> Result<Arc<dyn Usage>, UnrecognizedUsageError> {
        self.usage.get_or_try_init(|| self.resolve_usage()).cloned()
    }

    fn resolve_usage(&self) -> Result<Arc<dyn Usage>, UnrecognizedUsageError> {
        if let Some(explicit) = self.descriptor.usage() {
            log::debug!("field '{}' uses explicit usage '{explicit}'", self.name);
            return self.factory.create(explicit);
        }
        match self.usage_string() {
            Some(usage) => {
                log::debug!("field '{}' resolved to usage '{usage}'", self.name);
                self.factory.create(usage)
            }
            None => {
                log::debug!("field '{}' has no type, leaving it unconstrained", self.name);
                Ok(Arc::new(UntypedUsage))
            }
        }
    }

    /// Type check plus every constraint of the usage. Recomputed on each call.
    ///
    /// A null result type has no type check, so only the usage constraints
    /// apply.
    pub fn constraints(&self) -> Result<ConstraintSet, UsageError> {
        if !self.descriptor.contains_key(RESULT_TYPE_KEY) {
            return Err(UsageError::MissingResultType {
                field: self.name.clone(),
            });
        }
        let usage = self.usage()?;
        match self.descriptor.result_type() {
            Some(result_type) => Ok(merge(type_constraint(result_type), usage.constraints())),
            None => Ok(usage
                .constraints()
                .into_iter()
                .filter(|(key, _)| key != INVALID_TYPE)
                .collect()),
        }
    }

    /// Checks `value` against every constraint of the field.
    pub fn validate(&self, value: &Value) -> Result<(), UsageError> {
        let constraints = self.constraints()?;
        let issues: Vec<_> = constraints
            .violations(value)
            .map(|(code, constraint)| ValidationIssue::new(self.name.clone(), code, constraint.message()))
            .collect();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues).into())
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .field("usage", &self.usage.get())
            .finish_non_exhaustive()
    }
}
