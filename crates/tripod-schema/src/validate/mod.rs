//! Graph-wide validation over the typed IR.

pub mod naming;
pub mod relation;
pub mod tags;

use crate::{node::Graph, prelude::*};

/// Run full graph validation in a staged, deterministic order.
pub(crate) fn validate_graph(graph: &Graph) -> Result<(), ErrorTree> {
    let mut errs = ErrorTree::new();

    // Phase 1: per-node invariants.
    for node in graph.nodes() {
        let node_errs = errs.at(node.name());
        naming::validate_members(node, node_errs);
        tags::validate_tags(node, node_errs);
    }

    // Phase 2: relations need the whole graph.
    relation::validate_edges(graph, &mut errs);

    errs.result()
}
