//! Wire message and enum descriptors.

pub mod descriptor;
pub mod rules;
pub mod tags;


pub use descriptor::{PbElement, PbEnum, PbEnumValue, PbField, PbMessage, ProtoFile};

use crate::{
    Error,
    config::{Config, Mode},
    edge::wire_edge,
};
use std::collections::BTreeSet;
use tags::TagAllocator;
use tracing::debug;
use tripod_schema::{naming, prelude::*};

pub const TIMESTAMP_IMPORT: &str = "google/protobuf/timestamp.proto";

/// File a node's messages land in under per-entity mode.
#[must_use]
pub fn entity_file_name(node: &str) -> String {
    format!("{}.proto", naming::snake(node))
}

///
/// Member
/// a message member before tag assignment
///

struct Member {
    field: PbField,
    explicit_tag: Option<u32>,
    nests: Option<String>,
}

///
/// ProtoBuilder
///

pub struct ProtoBuilder<'a> {
    graph: &'a Graph,
    config: &'a Config,
}

impl<'a> ProtoBuilder<'a> {
    #[must_use]
    pub const fn new(graph: &'a Graph, config: &'a Config) -> Self {
        Self { graph, config }
    }

    pub fn build(&self) -> Result<Vec<ProtoFile>, Error> {
        match self.config.mode {
            Mode::Single => {
                let nodes: Vec<&Node> = self.graph.nodes().iter().collect();
                let file = self.file(self.config.file_name.clone(), &nodes)?;

                Ok(vec![file])
            }
            Mode::PerEntity => self
                .graph
                .nodes()
                .iter()
                .map(|node| self.file(entity_file_name(node.name()), &[node]))
                .collect(),
        }
    }

    fn file(&self, name: String, nodes: &[&Node]) -> Result<ProtoFile, Error> {
        let mut elements = Vec::new();
        let mut nested = BTreeSet::new();

        for node in nodes {
            elements.extend(enums(node).into_iter().map(PbElement::Enum));

            for direction in [Direction::Out, Direction::In] {
                let (message, targets) = self.message(node, direction)?;
                nested.extend(targets);
                elements.push(PbElement::Message(message));
            }
        }

        let imports = self.imports(&elements, nodes, &nested);
        debug!(
            file = %name,
            elements = elements.len(),
            imports = imports.len(),
            "built proto file"
        );

        Ok(ProtoFile {
            name,
            package: self.config.package.clone(),
            go_package: self.config.go_package(),
            imports,
            elements,
        })
    }

    fn imports(
        &self,
        elements: &[PbElement],
        nodes: &[&Node],
        nested: &BTreeSet<String>,
    ) -> Vec<String> {
        let fields = elements.iter().flat_map(|element| match element {
            PbElement::Message(message) => message.fields.as_slice(),
            PbElement::Enum(_) => &[],
        });

        let mut imports = BTreeSet::new();
        for field in fields {
            if field.ty == PROTO_TIMESTAMP {
                imports.insert(TIMESTAMP_IMPORT.to_string());
            }
            if !field.rules.is_empty()
                && let Some(import) = self.config.validator.import()
            {
                imports.insert(import.to_string());
            }
        }

        if self.config.mode == Mode::PerEntity {
            for target in nested {
                if !nodes.iter().any(|n| n.name() == target.as_str()) {
                    imports.insert(entity_file_name(target));
                }
            }
        }

        imports.into_iter().collect()
    }

    /// One message plus the nodes whose messages it nests.
    fn message(&self, node: &Node, direction: Direction) -> Result<(PbMessage, Vec<String>), Error> {
        let mut members: Vec<Member> = node
            .all_fields()
            .filter(|field| field.on_wire(direction))
            .map(|field| self.field_member(field, direction))
            .collect();

        for edge in node.edges() {
            if let Some(member) = self.edge_member(edge, direction) {
                members.push(member);
            }
        }

        let explicit: Vec<Option<u32>> = members.iter().map(|m| m.explicit_tag).collect();
        let name = node.message_name(direction);
        let tags = TagAllocator::assign(&explicit).ok_or_else(|| Error::Codegen {
            node: node.name().to_string(),
            message: format!("message '{name}' ran out of field numbers"),
        })?;

        let mut targets = Vec::new();
        let fields = members
            .into_iter()
            .zip(tags)
            .map(|(member, tag)| {
                targets.extend(member.nests);
                PbField { tag, ..member.field }
            })
            .collect();

        Ok((
            PbMessage {
                name,
                comment: node.comment().map(str::to_string),
                fields,
            },
            targets,
        ))
    }

    fn rules(&self, direction: Direction, rules: impl FnOnce() -> String) -> String {
        if direction.is_in() && self.config.validator.is_enabled() {
            rules()
        } else {
            String::new()
        }
    }

    fn field_member(&self, field: &Field, direction: Direction) -> Member {
        let repeated = field.is_list();
        let singular_value = field.is_local_enum() || rules::is_scalar(field.proto_type());
        let optional = !repeated
            && singular_value
            && field.strategy(direction).proto == FieldProto::Optional;

        Member {
            field: PbField {
                name: field.proto_name().to_string(),
                ty: field.proto_type().to_string(),
                tag: 0,
                repeated,
                optional,
                rules: self.rules(direction, || rules::field_rules(field)),
                comment: field.comment().map(str::to_string),
            },
            explicit_tag: field.tag(),
            nests: None,
        }
    }

    fn edge_member(&self, edge: &Edge, direction: Direction) -> Option<Member> {
        let wire = wire_edge(edge, direction)?;
        let nests = (edge.strategy(direction).proto == EdgeProto::Message)
            .then(|| edge.target().to_string());

        Some(Member {
            field: PbField {
                name: edge.proto_name(direction).to_string(),
                ty: wire.ty,
                tag: 0,
                repeated: wire.repeated,
                optional: wire.optional,
                rules: self.rules(direction, || rules::edge_rules(edge, direction)),
                comment: edge.comment().map(str::to_string),
            },
            explicit_tag: edge.tag(),
            nests,
        })
    }
}

/// Enum descriptors for a node's locally defined enums.
fn enums(node: &Node) -> Vec<PbEnum> {
    node.all_fields()
        .filter_map(|field| match field.enum_kind() {
            Some(EnumKind::Local {
                type_name, values, ..
            }) => {
                let prefix = naming::upper_snake(type_name);
                let values = values
                    .iter()
                    .map(|value| PbEnumValue {
                        name: format!("{prefix}_{}", naming::upper_snake(value.literal())),
                        number: value.number(),
                    })
                    .collect();

                Some(PbEnum {
                    name: type_name.clone(),
                    values,
                })
            }
            _ => None,
        })
        .collect()
}
