use crate::{naming::is_ident, node::Node, prelude::*};
use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};

///
/// DomainMember
/// a member of the domain struct and the element that produces it
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct DomainMember<'a> {
    owner: &'a str,
    kind: &'static str,
}

// Validate member naming: storage names, domain names and per-message wire names.
pub fn validate_members(node: &Node, errs: &mut ErrorTree) {
    validate_storage_names(node, errs);
    validate_domain_names(node, errs);

    for direction in Direction::ALL {
        validate_wire_names(node, direction, errs);
    }
}

fn validate_storage_names(node: &Node, errs: &mut ErrorTree) {
    let mut seen = BTreeSet::new();
    let names = node
        .all_fields()
        .map(Field::name)
        .chain(node.edges().iter().map(Edge::name));

    for name in names {
        if !seen.insert(name) {
            err!(errs.at(name), "duplicate member name '{name}'");
        }
    }
}

fn validate_domain_names(node: &Node, errs: &mut ErrorTree) {
    let mut claims: Vec<(&str, DomainMember)> = node
        .all_fields()
        .filter(|f| f.has_domain_member())
        .map(|f| {
            let member = DomainMember {
                owner: f.name(),
                kind: "field",
            };
            (f.biz_name(), member)
        })
        .collect();

    for edge in node.edges() {
        for direction in Direction::ALL {
            let kind = match edge.strategy(direction).biz {
                EdgeBiz::Pointer => "pointer",
                EdgeBiz::IdOnly => "id only",
                EdgeBiz::Excluded => continue,
            };
            let member = DomainMember {
                owner: edge.name(),
                kind,
            };
            claims.push((edge.biz_name(direction), member));
        }
    }

    let mut members: BTreeMap<&str, DomainMember> = BTreeMap::new();
    for (name, member) in claims {
        if !is_ident(name) {
            err!(
                errs.at(member.owner),
                "domain name '{name}' is not a valid identifier"
            );
            continue;
        }

        match members.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(member);
            }
            // both directions of one edge agreeing on the same member
            Entry::Occupied(slot) if *slot.get() == member => {}
            Entry::Occupied(slot) => {
                let previous = slot.get();
                err!(
                    errs.at(member.owner),
                    "domain name '{name}' is claimed by both '{}' ({}) and '{}' ({})",
                    previous.owner,
                    previous.kind,
                    member.owner,
                    member.kind
                );
            }
        }
    }
}

fn validate_wire_names(node: &Node, direction: Direction, errs: &mut ErrorTree) {
    let message = node.message_name(direction);
    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();

    let fields = node
        .all_fields()
        .filter(|f| f.on_wire(direction))
        .map(|f| (f.name(), f.proto_name()));
    let edges = node
        .edges()
        .iter()
        .filter(|e| e.on_wire(direction))
        .map(|e| (e.name(), e.proto_name(direction)));

    for (owner, proto_name) in fields.chain(edges) {
        if !is_ident(proto_name) {
            err!(
                errs.at(owner),
                "proto name '{proto_name}' is not a valid identifier"
            );
            continue;
        }
        if let Some(previous) = seen.insert(proto_name, owner) {
            err!(
                errs.at(owner),
                "proto field '{proto_name}' in message '{message}' is produced by both '{previous}' and '{owner}'"
            );
        }
    }
}
