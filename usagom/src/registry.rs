use crate::schema::ModelSchema;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

static REGISTRY: OnceLock<RwLock<HashMap<String, Arc<ModelSchema>>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, Arc<ModelSchema>>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Registers a schema under its entity name, replacing any previous one.
///
/// Returned handles share the schema's fields, so usages resolved through
/// one handle are visible to every other.
pub fn register_schema(schema: ModelSchema) -> Arc<ModelSchema> {
    let schema = Arc::new(schema);
    let previous = registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(schema.entity().to_string(), Arc::clone(&schema));
    if previous.is_some() {
        log::debug!("schema for '{}' replaced", schema.entity());
    }
    schema
}

pub fn get_schema(entity: &str) -> Option<Arc<ModelSchema>> {
    registry().read().unwrap_or_else(PoisonError::into_inner).get(entity).cloned()
}

pub fn unregister_schema(entity: &str) -> Option<Arc<ModelSchema>> {
    registry().write().unwrap_or_else(PoisonError::into_inner).remove(entity)
}

/// Entity names of all registered schemas, sorted.
pub fn registered_entities() -> Vec<String> {
    let mut entities: Vec<_> = registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect();
    entities.sort();
    entities
}
