use super::*;
use crate::{
    annotation::Annotation,
    raw::{RawEdge, RawField},
};
use quote::ToTokens;

fn uuid_id() -> RawField {
    RawField::new("id", Primitive::Uuid)
}

fn user() -> RawNode {
    RawNode::new("User", uuid_id())
        .field(RawField::new("name", Primitive::Text))
        .field(RawField::new("nickname", Primitive::Text).optional().nillable())
        .field(RawField::new("password", Primitive::Text).sensitive())
        .field(RawField::enumeration("status", ["active", "banned"]))
        .edge(RawEdge::new("posts", "Post").inverse("author"))
}

fn post() -> RawNode {
    RawNode::new("Post", uuid_id())
        .field(RawField::new("title", Primitive::Text))
        .edge(RawEdge::new("author", "User").unique().inverse("posts"))
}

fn graph() -> RawGraph {
    RawGraph::new().node(user()).node(post())
}

fn adapt_ok(raw: &RawGraph) -> Graph {
    match adapt(raw) {
        Ok(graph) => graph,
        Err(e) => panic!("adapt failed:\n{e}"),
    }
}

fn adapt_err(raw: &RawGraph) -> ErrorTree {
    match adapt(raw) {
        Ok(_) => panic!("adapt should have failed"),
        Err(e) => e.errors().clone(),
    }
}

fn tokens(ty: &syn::Type) -> String {
    ty.to_token_stream().to_string()
}

#[test]
fn nodes_are_sorted_by_name() {
    let graph = adapt_ok(&graph());
    let names: Vec<_> = graph.nodes().iter().map(Node::name).collect();

    assert_eq!(names, ["Post", "User"]);
    assert!(graph.get("User").is_some());
    assert!(graph.get("Comment").is_none());
}

#[test]
fn default_strategies_follow_field_flags() {
    let graph = adapt_ok(&graph());
    let user = graph.get("User").expect("user");

    let name = user.field("name").expect("name");
    for direction in Direction::ALL {
        assert_eq!(
            name.strategy(direction),
            Strategy::new(FieldProto::Required, FieldBiz::Value)
        );
    }

    let nickname = user.field("nickname").expect("nickname");
    assert_eq!(
        nickname.strategy(Direction::Out),
        Strategy::new(FieldProto::Optional, FieldBiz::Pointer)
    );
    assert!(nickname.is_domain_pointer());

    let password = user.field("password").expect("password");
    assert_eq!(
        password.strategy(Direction::In),
        Strategy::new(FieldProto::Required, FieldBiz::Value)
    );
    assert!(password.strategy(Direction::Out).is_excluded());
    assert!(password.has_domain_member());

    let posts = user.edge("posts").expect("posts");
    assert_eq!(
        posts.strategy(Direction::In),
        Strategy::new(EdgeProto::Message, EdgeBiz::Pointer)
    );
    assert!(posts.cardinality().is_many());
}

#[test]
fn explicit_strategies_override_defaults_per_direction() {
    let status = RawField::new("status", Primitive::Text).annotate(
        Annotation::new().with_field_strategies(
            FieldStrategy::new(FieldProto::Optional, FieldBiz::Pointer),
            FieldStrategy::new(FieldProto::Excluded, FieldBiz::Excluded),
        ),
    );
    let raw = RawGraph::new().node(RawNode::new("User", uuid_id()).field(status));

    let graph = adapt_ok(&raw);
    let field = graph.get("User").and_then(|n| n.field("status")).expect("status");

    assert_eq!(
        field.strategy(Direction::In),
        Strategy::new(FieldProto::Optional, FieldBiz::Pointer)
    );
    assert!(!field.on_wire(Direction::Out));
    assert!(field.on_wire(Direction::In));
}

#[test]
fn partial_bits_fill_missing_axis_from_default() {
    let field = RawField::new("bio", Primitive::Text)
        .optional()
        .annotate(Annotation::new().with_field_strategies(1_u32 << 10, 0_u32));
    let raw = RawGraph::new().node(RawNode::new("User", uuid_id()).field(field));

    let graph = adapt_ok(&raw);
    let bio = graph.get("User").and_then(|n| n.field("bio")).expect("bio");

    assert_eq!(
        bio.strategy(Direction::In),
        Strategy::new(FieldProto::Optional, FieldBiz::Excluded)
    );
    assert_eq!(
        bio.strategy(Direction::Out),
        Strategy::new(FieldProto::Optional, FieldBiz::Pointer)
    );
}

#[test]
fn invalid_bits_name_the_field() {
    let field = RawField::new("bio", Primitive::Text)
        .annotate(Annotation::new().with_field_strategies(0b11_u32, 0_u32));
    let raw = RawGraph::new().node(RawNode::new("User", uuid_id()).field(field));

    let errs = adapt_err(&raw);
    let flat = errs.flatten();

    assert_eq!(flat.len(), 1);
    assert_eq!(flat[0].0, "User.bio");
    assert!(flat[0].1.contains("strategy for field 'bio'"));
}

#[test]
fn default_names_and_types() {
    let graph = adapt_ok(&graph());
    let user = graph.get("User").expect("user");

    let id = user.id();
    assert!(id.is_id());
    assert_eq!(tokens(id.storage_type()), ":: uuid :: Uuid");
    assert_eq!(tokens(id.biz_type()), ":: std :: string :: String");
    assert_eq!(id.proto_type(), "string");

    let status = user.field("status").expect("status");
    assert_eq!(tokens(status.storage_type()), "user :: Status");
    assert_eq!(tokens(status.biz_type()), "UserStatus");
    assert_eq!(status.proto_type(), "UserStatus");
    assert!(status.is_local_enum());

    let posts = user.edge("posts").expect("posts");
    assert_eq!(posts.biz_name(Direction::Out), "posts");
    assert_eq!(posts.proto_name(Direction::Out), "posts");
    assert_eq!(posts.target_key().node(), "Post");
    assert_eq!(posts.target_key().primitive(), Primitive::Uuid);
}

#[test]
fn id_strategies_append_id_suffix() {
    let author = RawEdge::new("author", "User").unique().annotate(
        Annotation::new().with_edge_strategies(
            EdgeStrategy::new(EdgeProto::Id, EdgeBiz::Pointer),
            EdgeStrategy::new(EdgeProto::Id, EdgeBiz::IdOnly),
        ),
    );
    let raw = RawGraph::new()
        .node(RawNode::new("User", uuid_id()))
        .node(RawNode::new("Post", uuid_id()).edge(author));

    let graph = adapt_ok(&raw);
    let edge = graph.get("Post").and_then(|n| n.edge("author")).expect("author");

    assert_eq!(edge.proto_name(Direction::In), "author_id");
    assert_eq!(edge.biz_name(Direction::In), "author");
    assert_eq!(edge.biz_name(Direction::Out), "author_id");
}

#[test]
fn explicit_names_and_types_are_honored() {
    let name = RawField::new("name", Primitive::Text).annotate(
        Annotation::new()
            .with_biz_name("display_name")
            .with_proto_name("label")
            .with_biz_type("::std::borrow::Cow<'static, str>"),
    );
    let raw = RawGraph::new().node(RawNode::new("User", uuid_id()).field(name));

    let graph = adapt_ok(&raw);
    let field = graph.get("User").and_then(|n| n.field("name")).expect("name");

    assert_eq!(field.biz_name(), "display_name");
    assert_eq!(field.proto_name(), "label");
    assert!(field.has_explicit_biz_type());
    assert!(!field.has_explicit_proto_type());
}

#[test]
fn enum_literals_number_in_declaration_order() {
    let graph = adapt_ok(&graph());
    let status = graph.get("User").and_then(|n| n.field("status")).expect("status");
    let values = status.enum_kind().expect("enum").values();

    assert_eq!(
        values
            .iter()
            .map(|v| (v.literal(), v.number()))
            .collect::<Vec<_>>(),
        [("active", 0), ("banned", 1)]
    );
    assert_eq!(values[1].variant(), "Banned");
}

#[test]
fn explicit_enum_map_skips_omitted_literals() {
    let status = RawField::enumeration("status", ["draft", "live", "archived"])
        .annotate(Annotation::new().with_enum_values([("draft", 0), ("live", 5)]));
    let raw = RawGraph::new().node(RawNode::new("Post", uuid_id()).field(status));

    let graph = adapt_ok(&raw);
    let field = graph.get("Post").and_then(|n| n.field("status")).expect("status");
    let values: Vec<_> = field
        .enum_kind()
        .expect("enum")
        .values()
        .iter()
        .map(|v| (v.literal().to_string(), v.number()))
        .collect();

    assert_eq!(
        values,
        [("draft".to_string(), 0), ("live".to_string(), 5)]
    );
}

#[test]
fn duplicate_enum_numbers_are_rejected() {
    let status = RawField::enumeration("status", ["draft", "live"])
        .annotate(Annotation::new().with_enum_values([("draft", 1), ("live", 1)]));
    let raw = RawGraph::new().node(RawNode::new("Post", uuid_id()).field(status));

    assert!(adapt_err(&raw).contains("share number 1"));
}

#[test]
fn external_enum_is_a_string_on_the_wire() {
    let kind = RawField::new("kind", Primitive::Enum).external("crate::types::Kind");
    let raw = RawGraph::new().node(RawNode::new("Post", uuid_id()).field(kind));

    let graph = adapt_ok(&raw);
    let field = graph.get("Post").and_then(|n| n.field("kind")).expect("kind");

    assert!(field.is_external_enum());
    assert_eq!(field.proto_type(), "string");
    assert_eq!(tokens(field.storage_type()), "crate :: types :: Kind");
}

#[test]
fn generated_enums_keep_their_types() {
    let status = RawField::enumeration("status", ["draft", "live"]).annotate(
        Annotation::new()
            .with_proto_type("string")
            .with_biz_type("::std::string::String"),
    );
    let raw = RawGraph::new().node(RawNode::new("Post", uuid_id()).field(status));

    let errs = adapt_err(&raw);
    assert!(errs.contains("cannot override its proto_type with 'string'"));
    assert!(errs.contains("cannot override its biz_type"));

    let named = RawField::enumeration("status", ["draft", "live"])
        .annotate(Annotation::new().with_proto_type("PostStatus"));
    adapt_ok(&RawGraph::new().node(RawNode::new("Post", uuid_id()).field(named)));
}

#[test]
fn unknown_edge_target_is_reported() {
    let raw = RawGraph::new()
        .node(RawNode::new("Post", uuid_id()).edge(RawEdge::new("tags", "Tag")));

    assert!(adapt_err(&raw).contains("targets unknown node 'Tag'"));
}

#[test]
fn conflicting_edge_strategy_is_rejected() {
    let author = RawEdge::new("author", "User").unique().annotate(
        Annotation::new().with_edge_strategies(
            EdgeStrategy::new(EdgeProto::Message, EdgeBiz::Pointer),
            EdgeStrategy::new(EdgeProto::Message, EdgeBiz::IdOnly),
        ),
    );
    let raw = RawGraph::new()
        .node(RawNode::new("User", uuid_id()))
        .node(RawNode::new("Post", uuid_id()).edge(author));

    let errs = adapt_err(&raw);

    assert_eq!(errs.len(), 1);
    assert!(errs.contains("id-only domain field with a nested proto message"));
}

#[test]
fn missing_inverse_is_reported() {
    let raw = RawGraph::new()
        .node(RawNode::new("User", uuid_id()))
        .node(RawNode::new("Post", uuid_id()).edge(RawEdge::new("author", "User").inverse("posts")));

    assert!(adapt_err(&raw).contains("inverse edge 'posts' does not exist"));
}

#[test]
fn colliding_names_are_reported_together() {
    let raw = RawGraph::new().node(
        RawNode::new("User", uuid_id())
            .field(RawField::new("name", Primitive::Text))
            .field(
                RawField::new("label", Primitive::Text)
                    .annotate(Annotation::new().with_proto_name("name")),
            )
            .field(
                RawField::new("title", Primitive::Text)
                    .annotate(Annotation::new().with_biz_name("name")),
            ),
    );

    let errs = adapt_err(&raw);

    assert!(errs.contains("proto field 'name' in message 'User'"));
    assert!(errs.contains("proto field 'name' in message 'UserInput'"));
    assert!(errs.contains("domain name 'name' is claimed by both"));
}

#[test]
fn explicit_tags_are_checked() {
    let raw = RawGraph::new().node(
        RawNode::new("User", uuid_id())
            .field(
                RawField::new("name", Primitive::Text)
                    .annotate(Annotation::new().with_proto_field_id(4)),
            )
            .field(
                RawField::new("email", Primitive::Text)
                    .annotate(Annotation::new().with_proto_field_id(4)),
            )
            .field(
                RawField::new("bio", Primitive::Text)
                    .annotate(Annotation::new().with_proto_field_id(19_500)),
            ),
    );

    let errs = adapt_err(&raw);

    assert!(errs.contains("explicit tag 4 is already used"));
    assert!(errs.contains("reserved range"));
    assert_eq!(errs.len(), 2);
}

#[test]
fn bad_node_names_are_rejected() {
    let raw = RawGraph::new()
        .node(RawNode::new("user_profile", uuid_id()))
        .node(RawNode::new("Post", uuid_id()))
        .node(RawNode::new("Post", uuid_id()));

    let errs = adapt_err(&raw);

    assert!(errs.contains("UpperCamelCase"));
    assert!(errs.contains("duplicate node name 'Post'"));
}

#[test]
fn upper_camel_node_names_are_accepted() {
    let raw = RawGraph::new()
        .node(RawNode::new("UserProfile", uuid_id()))
        .node(RawNode::new("Post", uuid_id()));

    let graph = adapt_ok(&raw);
    assert!(graph.get("UserProfile").is_some());
}

#[test]
fn adaptation_is_deterministic() {
    let raw = graph();
    let a = format!("{:?}", adapt_ok(&raw));
    let b = format!("{:?}", adapt_ok(&raw));

    assert_eq!(a, b);
}
