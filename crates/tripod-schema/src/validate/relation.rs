use crate::{node::Graph, prelude::*};

// Validate edge strategies and inverse references across the graph.
pub fn validate_edges(graph: &Graph, errs: &mut ErrorTree) {
    for node in graph.nodes() {
        for edge in node.edges() {
            let edge_errs = errs.at(node.name()).at(edge.name());

            // Phase 1: an id-only domain member cannot source a nested message.
            for direction in Direction::ALL {
                let strategy = edge.strategy(direction);
                if strategy.is_conflicting() {
                    err!(
                        edge_errs,
                        "edge '{}' {direction} strategy {strategy} pairs an id-only domain field with a nested proto message",
                        edge.name()
                    );
                }
            }

            // Phase 2: inverse edges must exist and point back.
            let Some(inverse) = edge.inverse() else {
                continue;
            };
            let Some(target) = graph.get(edge.target()) else {
                continue;
            };
            match target.edge(inverse) {
                None => err!(
                    edge_errs,
                    "inverse edge '{inverse}' does not exist on '{}'",
                    target.name()
                ),
                Some(back) if back.target() != node.name() => err!(
                    edge_errs,
                    "inverse edge '{}.{inverse}' targets '{}', not '{}'",
                    target.name(),
                    back.target(),
                    node.name()
                ),
                Some(_) => {}
            }
        }
    }
}
