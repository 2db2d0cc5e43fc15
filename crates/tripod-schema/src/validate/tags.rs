use crate::{node::Node, prelude::*};
use std::collections::{BTreeMap, BTreeSet};

// Explicit tags must be usable protobuf field numbers and unique per message.
pub fn validate_tags(node: &Node, errs: &mut ErrorTree) {
    let explicit: Vec<(&str, u32)> = node
        .all_fields()
        .filter_map(|f| f.tag().map(|tag| (f.name(), tag)))
        .chain(
            node.edges()
                .iter()
                .filter_map(|e| e.tag().map(|tag| (e.name(), tag))),
        )
        .collect();

    for &(owner, tag) in &explicit {
        if RESERVED_TAGS.contains(&tag) {
            err!(
                errs.at(owner),
                "tag {tag} lies in the reserved range {}..={}",
                RESERVED_TAGS.start(),
                RESERVED_TAGS.end()
            );
        } else if tag > MAX_TAG {
            err!(errs.at(owner), "tag {tag} exceeds the maximum {MAX_TAG}");
        }
    }

    // the same pair may collide in both messages; report it once
    let mut collisions = BTreeSet::new();
    for direction in Direction::ALL {
        let mut seen: BTreeMap<u32, &str> = BTreeMap::new();
        let on_wire = |name: &str| {
            node.field(name).map_or_else(
                || node.edge(name).is_some_and(|e| e.on_wire(direction)),
                |f| f.on_wire(direction),
            )
        };

        for &(owner, tag) in explicit.iter().filter(|(owner, _)| on_wire(owner)) {
            if let Some(previous) = seen.insert(tag, owner) {
                collisions.insert((owner, previous, tag));
            }
        }
    }

    for (owner, previous, tag) in collisions {
        err!(
            errs.at(owner),
            "explicit tag {tag} is already used by '{previous}'"
        );
    }
}
