use crate::{
    annotation,
    naming,
    node::{Edge, TargetKey},
    prelude::*,
    raw::RawEdge,
    strategy::RawStrategy,
};
use std::collections::BTreeMap;

pub(super) fn adapt_edge(
    raw: &RawEdge,
    keys: &BTreeMap<String, TargetKey>,
    errs: &mut ErrorTree,
) -> Option<Edge> {
    if !naming::is_ident(&raw.name) {
        err!(errs, "edge name '{}' is not a valid identifier", raw.name);
        return None;
    }
    let Some(target_key) = keys.get(&raw.target) else {
        err!(
            errs,
            "edge '{}' targets unknown node '{}'",
            raw.name,
            raw.target
        );
        return None;
    };

    let annotation = annotation::decode(&raw.annotations);
    let ann = annotation.clone().unwrap_or_default();

    let strategy_in = resolve_strategy(Direction::In, raw, ann.edge_in_strategy.as_ref(), errs);
    let strategy_out = resolve_strategy(Direction::Out, raw, ann.edge_out_strategy.as_ref(), errs);

    let base = naming::snake(&raw.name);
    let biz_names = [strategy_in, strategy_out].map(|strategy| {
        ann.biz_name.clone().unwrap_or_else(|| match strategy.biz {
            EdgeBiz::IdOnly => format!("{base}_id"),
            _ => base.clone(),
        })
    });
    let proto_names = [strategy_in, strategy_out].map(|strategy| {
        ann.proto_name.clone().unwrap_or_else(|| match strategy.proto {
            EdgeProto::Id => format!("{base}_id"),
            _ => base.clone(),
        })
    });

    Some(Edge {
        name: raw.name.clone(),
        target: raw.target.clone(),
        cardinality: Cardinality::from_unique(raw.unique),
        inverse: raw.inverse.clone(),
        comment: raw.comment.clone(),
        strategy_in,
        strategy_out,
        biz_names,
        proto_names,
        target_key: target_key.clone(),
        tag: ann.proto_field_id,
        validation: ann.proto_validation.clone(),
        annotation,
    })
}

fn resolve_strategy(
    direction: Direction,
    raw: &RawEdge,
    explicit: Option<&RawStrategy>,
    errs: &mut ErrorTree,
) -> EdgeStrategy {
    let default = EdgeStrategy::default_for(direction);

    match explicit.map(RawStrategy::resolve::<EdgeProto, EdgeBiz>) {
        None => default,
        Some(Ok(partial)) => partial.resolve(default),
        Some(Err(e)) => {
            err!(
                errs,
                "invalid {direction} strategy for edge '{}': {e}",
                raw.name
            );
            default
        }
    }
}
