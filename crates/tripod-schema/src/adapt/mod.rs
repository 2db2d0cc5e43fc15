//! Raw graph in, enriched read-only IR out.
//!
//! Annotations are decoded exactly once here. Every downstream builder reads
//! the resolved names, types and strategies through accessors on the IR.

mod edge;
mod field;

#[cfg(test)]
mod tests;

use crate::{
    naming,
    node::{Graph, Node, TargetKey},
    prelude::*,
    raw::{RawGraph, RawNode},
    validate::validate_graph,
};
use convert_case::{Case, Casing};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// AdaptError
///

#[derive(Debug, ThisError)]
pub enum AdaptError {
    #[error("schema validation failed:\n{0}")]
    Validation(ErrorTree),
}

impl AdaptError {
    #[must_use]
    pub const fn errors(&self) -> &ErrorTree {
        match self {
            Self::Validation(tree) => tree,
        }
    }
}

/// Build the enriched graph, nodes sorted by name.
pub fn adapt(raw: &RawGraph) -> Result<Graph, AdaptError> {
    let _span = tracing::debug_span!("adapt", nodes = raw.nodes.len()).entered();
    let mut errs = ErrorTree::new();

    // Phase 1: order nodes by name and reject unusable node names.
    let order = order_nodes(raw, &mut errs);

    // Phase 2: identifiers first so every edge can see its target's key.
    let mut ids = BTreeMap::new();
    for (name, node) in &order {
        let id_errs = errs.at(*name).at(node.id.name.as_str());
        if let Some(id) = field::adapt_field(name, &node.id, true, id_errs) {
            ids.insert(*name, id);
        }
    }

    let keys: BTreeMap<String, TargetKey> = ids
        .iter()
        .map(|(name, id)| ((*name).to_string(), TargetKey::from_id(name, id)))
        .collect();

    // Phase 3: fields and edges in declaration order.
    let mut nodes = Vec::with_capacity(order.len());
    for (name, raw_node) in order {
        let node_errs = errs.at(name);

        let fields = raw_node
            .fields
            .iter()
            .filter_map(|f| field::adapt_field(name, f, false, node_errs.at(f.name.as_str())))
            .collect();

        let edges = raw_node
            .edges
            .iter()
            .filter_map(|e| edge::adapt_edge(e, &keys, node_errs.at(e.name.as_str())))
            .collect();

        let Some(id) = ids.remove(name) else {
            continue;
        };

        nodes.push(Node {
            name: name.to_string(),
            comment: raw_node.comment.clone(),
            skip_storage: raw_node.skip_storage,
            id,
            fields,
            edges,
        });
    }
    errs.result().map_err(AdaptError::Validation)?;

    // Phase 4: graph-wide invariants over the typed IR.
    let graph = Graph { nodes };
    validate_graph(&graph).map_err(AdaptError::Validation)?;

    tracing::debug!(nodes = graph.len(), "graph adapted");

    Ok(graph)
}

fn order_nodes<'a>(raw: &'a RawGraph, errs: &mut ErrorTree) -> BTreeMap<&'a str, &'a RawNode> {
    let mut order = BTreeMap::new();

    for node in &raw.nodes {
        let name = node.name.as_str();

        if !naming::is_ident(name) || name.to_case(Case::UpperCamel) != name {
            err!(errs.at(name), "node name '{name}' must be an UpperCamelCase identifier");
            continue;
        }
        if order.insert(name, node).is_some() {
            err!(errs.at(name), "duplicate node name '{name}'");
        }
    }

    order
}

impl TargetKey {
    fn from_id(node: &str, id: &Field) -> Self {
        Self {
            node: node.to_string(),
            id: id.clone(),
        }
    }
}
