use super::*;
use crate::strategy::{EdgeBiz, EdgeProto, EdgeStrategy, FieldBiz, FieldProto, FieldStrategy};
use serde_json::json;

fn bag(value: Value) -> AnnotationBag {
    AnnotationBag::from([(ANNOTATION_KEY.to_string(), value)])
}

#[test]
fn missing_entry_is_absent() {
    assert!(decode(&AnnotationBag::new()).is_none());

    let other = AnnotationBag::from([("entsql".to_string(), json!({ "table": "users" }))]);
    assert!(decode(&other).is_none());
}

#[test]
fn key_is_case_insensitive_and_accepts_pascal_aliases() {
    let bag = AnnotationBag::from([(
        "Tripod".to_string(),
        json!({ "BizName": "UUID", "ProtoName": "uuid", "ProtoFieldID": 4 }),
    )]);
    let annotation = decode(&bag).expect("annotation");

    assert_eq!(annotation.biz_name.as_deref(), Some("UUID"));
    assert_eq!(annotation.proto_name.as_deref(), Some("uuid"));
    assert_eq!(annotation.proto_field_id, Some(4));
}

#[test]
fn field_id_alias_takes_precedence() {
    let annotation = decode(&bag(json!({ "proto_field_id": 3, "field_id": 7 }))).expect("a");

    assert_eq!(annotation.proto_field_id, Some(7));
}

#[test]
fn numbers_may_arrive_as_floats() {
    let annotation = decode(&bag(json!({
        "proto_field_id": 2.0,
        "field_in_strategy": 513.0,
        "enum_values": { "ACTIVE": 1.0, "BANNED": 2 },
    })))
    .expect("annotation");

    assert_eq!(annotation.proto_field_id, Some(2));
    assert_eq!(annotation.field_in_strategy, Some(RawStrategy::Bits(513)));
    assert_eq!(
        annotation.enum_values,
        Some(BTreeMap::from([
            ("ACTIVE".to_string(), 1),
            ("BANNED".to_string(), 2)
        ]))
    );
}

#[test]
fn wrong_shapes_fall_back_to_defaults() {
    let annotation = decode(&bag(json!({
        "biz_name": 12,
        "virtual": "yes",
        "proto_field_id": -1,
        "edge_in_strategy": "message",
        "unknown_key": true,
    })))
    .expect("annotation");

    assert_eq!(annotation, Annotation::default());
}

#[test]
fn non_object_entry_is_absent() {
    assert!(decode(&bag(json!("biz_name=foo"))).is_none());
}

#[test]
fn zero_strategy_is_unset() {
    let annotation = decode(&bag(json!({ "edge_out_strategy": 0 }))).expect("annotation");

    assert!(annotation.edge_out_strategy.is_none());
}

#[test]
fn merge_prefers_later_non_empty_values() {
    let merged = merge([
        Annotation::new()
            .with_biz_name("First")
            .with_proto_field_id(3)
            .virtual_field(),
        Annotation::new()
            .with_biz_name("")
            .with_proto_name("second")
            .with_proto_field_id(0),
        Annotation {
            field_in_strategy: Some(RawStrategy::Bits(0)),
            ..Annotation::default()
        },
    ]);

    assert_eq!(merged.biz_name.as_deref(), Some("First"));
    assert_eq!(merged.proto_name.as_deref(), Some("second"));
    assert_eq!(merged.proto_field_id, Some(3));
    assert!(merged.is_virtual, "virtual is sticky");
    assert!(merged.field_in_strategy.is_none());
}

#[test]
fn merge_replaces_maps_wholesale() {
    let merged = merge([
        Annotation::new().with_enum_values([("A", 1), ("B", 2)]),
        Annotation::new().with_enum_values([("C", 5)]),
    ]);

    assert_eq!(
        merged.enum_values,
        Some(BTreeMap::from([("C".to_string(), 5)]))
    );
}

#[test]
fn bag_round_trip_preserves_typed_strategies() {
    let annotation = Annotation::new()
        .with_proto_validation("string.min_len: 1")
        .with_field_strategies(
            FieldStrategy::new(FieldProto::Optional, FieldBiz::Pointer),
            FieldStrategy::new(FieldProto::Excluded, FieldBiz::Excluded),
        )
        .with_edge_strategies(
            EdgeStrategy::new(EdgeProto::Id, EdgeBiz::IdOnly).bits(),
            EdgeStrategy::new(EdgeProto::Message, EdgeBiz::Pointer),
        );

    let decoded = decode(&annotation.clone().into_bag()).expect("annotation");

    assert_eq!(decoded, annotation);
}

#[test]
fn attach_merges_into_existing_entry() {
    let mut bag = AnnotationBag::from([("TRIPOD".to_string(), json!({ "biz_name": "Kept" }))]);
    attach(&mut bag, Annotation::new().with_proto_name("added"));

    assert_eq!(bag.len(), 1);
    let annotation = decode(&bag).expect("annotation");
    assert_eq!(annotation.biz_name.as_deref(), Some("Kept"));
    assert_eq!(annotation.proto_name.as_deref(), Some("added"));
}
