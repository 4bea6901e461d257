use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use serial_test::serial;
use usagom::{
    INVALID_TYPE, ModelSchema, UsageError, get_schema, register_schema, registered_entities, unregister_schema,
};

const PERMISSION: &str = "core\\Permission";

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/permission.json")
}

fn permission_schema() -> ModelSchema {
    ModelSchema::load(&fixture_path()).expect("fixture schema loads")
}

fn record(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("record must be an object"),
    }
}

#[test]
fn fixture_fields_resolve_their_usages() {
    let schema = permission_schema();
    assert_eq!(schema.entity(), PERMISSION);
    assert_eq!(schema.len(), 9);

    let usages: Vec<_> = ["class_name", "object_id", "group_id", "rights", "rights_txt"]
        .into_iter()
        .map(|name| {
            let field = schema.field(name).expect("field declared");
            field.usage().expect("usage resolves").usage_string().to_string()
        })
        .collect();
    assert_eq!(
        usages,
        vec!["text/plain:255", "number/integer:9", "number/integer:9", "number/integer:9", "text/plain:255"]
    );
}

#[test]
fn alias_fields_have_no_usage() {
    let schema = permission_schema();
    let name = schema.field("name").expect("alias declared");
    assert_eq!(name.usage_string(), Some("alias"));
    let err = name.usage().expect_err("alias is not a usage");
    assert_eq!(err.usage, "alias");
}

#[test]
fn exportable_fields_leave_out_collections() {
    let schema = permission_schema();
    let exportable = schema.exportable_fields();
    assert!(!exportable.contains(&"users_ids"));
    assert!(exportable.contains(&"rights_txt"));
    assert!(exportable.contains(&"group_id"));
    assert_eq!(exportable.len(), 8);
}

#[test]
fn valid_permission_record_passes() {
    let schema = permission_schema();
    let permission = record(json!({
        "class_name": "core\\User",
        "domain": null,
        "object_id": 12,
        "group_id": 1,
        "rights": 6,
        "rights_txt": "read, write"
    }));
    assert!(schema.validate(&permission).is_ok());
}

#[test]
fn invalid_permission_record_reports_every_issue() {
    let schema = permission_schema();
    let permission = record(json!({
        "object_id": "twelve",
        "user_id": 1_000_000_000,
        "rights": 6.5,
        "owner": "nobody"
    }));
    let err = schema.validate(&permission).expect_err("record is invalid");
    let UsageError::Validation(err) = err else {
        panic!("expected validation issues");
    };

    assert!(err.has("class_name", "missing_value"));
    assert!(err.has("object_id", INVALID_TYPE));
    assert!(err.has("user_id", "too_many_digits"));
    assert!(err.has("rights", INVALID_TYPE));
    assert!(err.has("rights", "not_integer"));
    assert!(err.has("owner", "unknown_field"));
    assert!(!err.has("user_id", INVALID_TYPE));
}

#[test]
fn unresolvable_field_aborts_validation() {
    let schema = permission_schema();
    let err = schema
        .validate(&record(json!({ "class_name": "core\\User", "name": "core\\User" })))
        .expect_err("alias fields cannot be validated");
    assert!(matches!(err, UsageError::UnrecognizedUsage(_)));
}

#[test]
#[serial]
fn registry_shares_resolved_usages() {
    let registered = register_schema(permission_schema());
    let looked_up = get_schema(PERMISSION).expect("schema registered");
    assert!(Arc::ptr_eq(&registered, &looked_up));

    let first = registered.field("rights").expect("rights").usage().expect("usage");
    let second = looked_up.field("rights").expect("rights").usage().expect("usage");
    assert!(Arc::ptr_eq(&first, &second));

    unregister_schema(PERMISSION);
    assert!(get_schema(PERMISSION).is_none());
}

#[test]
#[serial]
fn registry_lists_entities_sorted() {
    let group = ModelSchema::from_columns("core\\Group", record(json!({ "name": { "type": "string" } })))
        .expect("valid columns");
    register_schema(group);
    register_schema(permission_schema());

    let entities = registered_entities();
    let group_at = entities.iter().position(|e| e == "core\\Group").expect("group listed");
    let permission_at = entities.iter().position(|e| e == PERMISSION).expect("permission listed");
    assert!(group_at < permission_at);

    unregister_schema("core\\Group");
    unregister_schema(PERMISSION);
}
