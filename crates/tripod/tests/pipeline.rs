use tripod::{
    build::proto::rules::{ENUM_DEFINED_ONLY, UUID_ITEMS, UUID_STRING},
    descriptors_json,
    prelude::*,
};

const FIXTURE: &str = include_str!("fixtures/graph.json");

fn fixture(config: &Config) -> Generation {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    match generate_json(FIXTURE, config) {
        Ok(generation) => generation,
        Err(e) => panic!("fixture failed to generate:\n{e}"),
    }
}

fn single() -> ProtoFile {
    fixture(&Config::default())
        .files
        .into_iter()
        .next()
        .expect("single file")
}

fn message<'a>(file: &'a ProtoFile, name: &str) -> &'a PbMessage {
    file.message(name)
        .unwrap_or_else(|| panic!("missing message {name}"))
}

#[test]
fn single_mode_emits_every_node_in_order() {
    let file = single();

    assert_eq!(file.name, "dtos_gen.proto");
    assert_eq!(file.package, "api.v1");
    assert_eq!(file.go_package, "api/v1;v1");

    let names: Vec<_> = file
        .elements
        .iter()
        .map(|e| match e {
            PbElement::Enum(e) => e.name.as_str(),
            PbElement::Message(m) => m.name.as_str(),
        })
        .collect();
    assert_eq!(
        names,
        [
            "Group",
            "GroupInput",
            "Post",
            "PostInput",
            "Session",
            "SessionInput",
            "UserStatus",
            "User",
            "UserInput",
        ]
    );
}

#[test]
fn imports_are_sorted_and_minimal() {
    let file = single();

    assert_eq!(
        file.imports,
        ["buf/validate/validate.proto", "google/protobuf/timestamp.proto"]
    );
}

#[test]
fn explicit_enum_numbers_drop_unmapped_literals() {
    let file = single();
    let status = file.enumeration("UserStatus").expect("enum");

    let values: Vec<_> = status
        .values
        .iter()
        .map(|v| (v.name.as_str(), v.number))
        .collect();
    assert_eq!(values, [("USER_STATUS_ACTIVE", 1), ("USER_STATUS_BANNED", 2)]);

    let generation = fixture(&Config::default());
    let user = generation.domain_model("User").expect("domain user");
    let variants = &user.enums[0].variants;
    assert_eq!(variants, &["Active", "Banned", "Pending"]);
}

#[test]
fn input_rules_cover_defaults_and_explicit_text() {
    let file = single();
    let input = message(&file, "UserInput");

    let rules = |name: &str| input.field(name).map(|f| f.rules.clone());
    assert_eq!(rules("id").as_deref(), Some(UUID_STRING));
    assert_eq!(rules("status").as_deref(), Some(ENUM_DEFINED_ONLY));
    assert_eq!(
        rules("email").as_deref(),
        Some(".string = { min_len: 3, max_len: 254 }")
    );
    assert_eq!(rules("groups_id").as_deref(), Some(UUID_ITEMS));
}

#[test]
fn annotation_keys_are_case_insensitive() {
    let file = single();
    let login = message(&file, "User").field("login_count").expect("field");

    assert_eq!(login.ty, "int64");

    let generation = fixture(&Config::default());
    let conversions = generation.conversions.to_string();
    assert!(conversions.contains("login_count : i64 :: from (src . login_count)"));
}

#[test]
fn per_entity_mode_splits_files() {
    let config = Config {
        mode: Mode::PerEntity,
        ..Config::default()
    };
    let generation = fixture(&config);

    let names: Vec<_> = generation.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        ["group.proto", "post.proto", "session.proto", "user.proto"]
    );

    // Post nests User on the way out; User only references groups by id
    let post = generation.file("post.proto").expect("post");
    assert!(post.imports.iter().any(|i| i == "user.proto"));
    let user = generation.file("user.proto").expect("user");
    assert!(user.imports.iter().any(|i| i == "post.proto"));
    assert!(user.imports.iter().all(|i| i != "group.proto"));
}

#[test]
fn nodes_without_storage_get_wire_mappers_only() {
    let generation = fixture(&Config::default());
    let conversions = generation.conversions.to_string();

    assert!(conversions.contains("pub fn session_domain_to_wire"));
    assert!(conversions.contains("pub fn session_wire_to_domain"));
    assert!(!conversions.contains("session_storage_to_domain"));
}

#[test]
fn domain_models_carry_edge_members() {
    let generation = fixture(&Config::default());
    let user = generation.domain_model("User").expect("user");

    assert!(user.field("posts").is_some());
    assert!(user.field("groups_id").is_some());
    assert!(user.field("password").is_some());

    let tokens = generation.domain_tokens().to_string();
    assert!(tokens.contains("pub struct User"));
    assert!(tokens.contains("pub enum UserStatus"));
}

#[test]
fn descriptors_serialize_for_the_renderer() {
    let generation = fixture(&Config::default());
    let json = descriptors_json(&generation).expect("json");

    assert!(json.contains("\"kind\": \"message\""));
    assert!(json.contains("\"type\": \"google.protobuf.Timestamp\""));
}

#[test]
fn generation_is_deterministic() {
    let first = fixture(&Config::default());
    let second = fixture(&Config::default());

    assert_eq!(first.files, second.files);
    assert_eq!(
        first.conversions.to_string(),
        second.conversions.to_string()
    );
    assert_eq!(
        first.domain_tokens().to_string(),
        second.domain_tokens().to_string()
    );
}

#[test]
fn invalid_config_is_rejected_before_building() {
    let config = Config {
        package: "api..v1".to_string(),
        ..Config::default()
    };

    let err = generate_json(FIXTURE, &config).expect_err("bad package");
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn malformed_json_is_a_schema_error() {
    let err = generate_json("{ \"nodes\": 3 }", &Config::default()).expect_err("bad json");

    assert!(matches!(err, Error::Schema(_)));
}
