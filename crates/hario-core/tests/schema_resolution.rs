//! Integration tests: registry extension, detector precedence, and custom schemas.

mod common;

use hario_core::har;
use hario_core::model::Entry;
use hario_core::schema::{
    entry_shape, fallible, DetectorError, FieldKind, FieldSpec, Schema, SchemaError, SchemaRegistry,
    CHROME_DEVTOOLS, HAR_1_2,
};
use serde_json::json;

fn safari() -> Schema {
    let shape = entry_shape().refine("safari-entry", [FieldSpec::required("webkitTrace", FieldKind::Mapping)]);
    Schema::of::<Entry>("safari", "1.2", shape)
}

#[test]
fn extended_registry_resolves_custom_entries() {
    let standard = SchemaRegistry::standard();
    let registry = standard
        .to_builder()
        .register(|raw: &hario_core::RawRecord| raw.contains_key("webkitTrace"), safari())
        .build();

    let mut entry = common::cleaned_entry();
    entry["webkitTrace"] = json!({"frames": 3});
    let resolved = registry.validate(common::record(entry.clone())).unwrap();
    assert_eq!(resolved.schema().name(), "safari");
    let dumped = resolved.to_record().unwrap();
    assert_eq!(dumped["webkitTrace"]["frames"], 3);

    // the snapshot taken by to_builder leaves the original untouched
    assert_eq!(standard.resolve(&common::record(entry)).unwrap().name(), HAR_1_2);
    assert_eq!(standard.schemas().count(), registry.schemas().count() - 1);
}

#[test]
fn earlier_rules_win() {
    let registry = SchemaRegistry::standard()
        .to_builder()
        .register(|_: &hario_core::RawRecord| true, safari())
        .build();
    let resolved = registry.validate(common::record(common::devtools_entry())).unwrap();
    assert_eq!(resolved.schema().name(), CHROME_DEVTOOLS);
}

#[test]
fn custom_schema_reports_its_own_missing_fields() {
    let registry = SchemaRegistry::builder(safari()).build();
    let err = registry.validate(common::record(common::cleaned_entry())).unwrap_err();
    match err {
        SchemaError::Validation(e) => {
            assert_eq!(e.schema, "safari");
            assert!(e.has_path("webkitTrace"), "{e}");
        }
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn detector_errors_propagate_through_the_loader() {
    let registry = SchemaRegistry::standard()
        .to_builder()
        .register(
            fallible(|raw: &hario_core::RawRecord| {
                if raw.contains_key("broken") {
                    Err(DetectorError::new("cannot classify entry"))
                } else {
                    Ok(false)
                }
            }),
            safari(),
        )
        .build();

    let mut bad = common::cleaned_entry();
    bad["broken"] = json!(true);
    let doc = common::har_document(vec![common::cleaned_entry(), bad]);
    let err = har::validate_value(doc, &registry).unwrap_err();
    assert_eq!(err.entry_index(), Some(1));
    match err {
        har::LoadError::Entry {
            source: SchemaError::Detector(e),
            ..
        } => assert_eq!(e.message(), "cannot classify entry"),
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn lower_depth_limit_rejects_deep_initiator_stacks() {
    let mut stack = json!({"callFrames": []});
    for _ in 0..10 {
        stack = json!({"callFrames": [], "parent": stack});
    }
    let mut entry = common::devtools_entry();
    entry["_initiator"]["stack"] = stack;

    let strict = SchemaRegistry::standard().to_builder().max_depth(8).build();
    assert!(strict.validate(common::record(entry.clone())).is_err());
    assert!(SchemaRegistry::standard().validate(common::record(entry)).is_ok());
}
