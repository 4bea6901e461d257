//! Named value constraints and the intrinsic type check.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::value::ValueKind;

/// Key of the constraint checking a value against the field's result type.
pub const INVALID_TYPE: &str = "invalid_type";

pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A named rule a value must satisfy.
///
/// Predicates are pure: they never panic and have no side effects.
#[derive(Clone)]
pub struct Constraint {
    message: String,
    predicate: Predicate,
}

impl Constraint {
    pub fn new<F>(message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` when `value` satisfies the constraint.
    pub fn check(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint").field("message", &self.message).finish_non_exhaustive()
    }
}

/// Constraints keyed by name, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    entries: IndexMap<String, Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a constraint, returning the one previously stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, constraint: Constraint) -> Option<Constraint> {
        self.entries.insert(key.into(), constraint)
    }

    pub fn with(mut self, key: impl Into<String>, constraint: Constraint) -> Self {
        self.insert(key, constraint);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Constraint> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.entries.iter().map(|(key, constraint)| (key.as_str(), constraint))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of the constraints `value` violates, in order.
    pub fn violations<'a>(&'a self, value: &'a Value) -> impl Iterator<Item = (&'a str, &'a Constraint)> + 'a {
        self.iter().filter(move |(_, constraint)| !constraint.check(value))
    }
}

impl IntoIterator for ConstraintSet {
    type Item = (String, Constraint);
    type IntoIter = indexmap::map::IntoIter<String, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Constraint)> for ConstraintSet {
    fn from_iter<T: IntoIterator<Item = (K, Constraint)>>(iter: T) -> Self {
        let mut set = ConstraintSet::new();
        for (key, constraint) in iter {
            set.insert(key, constraint);
        }
        set
    }
}

/// Runtime kind name expected for values of `result_type`.
///
/// Result types without an entry name their own kind.
pub fn expected_kind(result_type: &str) -> &str {
    match result_type {
        "bool" => "boolean",
        "int" => "integer",
        "float" => "double",
        "text" => "string",
        "date" | "datetime" => "integer",
        "file" | "binary" => "string",
        "many2one" => "integer",
        "one2many" | "many2many" => "array",
        other => other,
    }
}

/// Builds the `invalid_type` constraint for a result type.
pub fn type_constraint(result_type: &str) -> Constraint {
    let expected = expected_kind(result_type).to_string();
    Constraint::new(format!("Value is not of type {result_type}."), move |value| {
        ValueKind::of(value).name() == expected
    })
}

/// Combines the intrinsic type check with usage constraints.
///
/// The intrinsic entry always wins `invalid_type`; a usage entry under that
/// key is dropped.
pub fn merge(intrinsic: Constraint, usage_constraints: ConstraintSet) -> ConstraintSet {
    let mut merged = ConstraintSet::new().with(INVALID_TYPE, intrinsic);
    for (key, constraint) in usage_constraints {
        if key == INVALID_TYPE {
            log::warn!("usage constraint '{INVALID_TYPE}' ignored, the type check is fixed by the result type");
            continue;
        }
        merged.insert(key, constraint);
    }
    merged
}
