//! Filter tree construction from aggregated query groups

use std::collections::HashSet;

use log::debug;
use sieve_core::{FieldCondition, Filter, FilterOperator, FilterValue, and_all};

use crate::aggregate::{FilterItem, GroupAgg, GroupOp, aggregate};

/// Build one filter per query-string group, in sorted group order.
pub fn build_groups(query: &str) -> Vec<Filter> {
    let mut filters = Vec::new();
    for (id, group) in aggregate(query) {
        match build_group(&group) {
            Some(filter) => filters.push(filter),
            None => debug!("filter group {id:?} produced no conditions"),
        }
    }
    filters
}

/// Build the complete filter for a query string, groups AND-combined.
///
/// A single group collapses directly; an unparseable or empty query yields
/// `None` rather than an error.
pub fn build_filter(query: &str) -> Option<Filter> {
    and_all(build_groups(query))
}

fn build_group(group: &GroupAgg) -> Option<Filter> {
    let mut nodes = Vec::new();
    for item in &group.items {
        build_item(item, group, &mut nodes);
    }

    // Fold hints with no concrete condition still travel as standalone Fold
    // conditions so later stages (keyword search) can pick the preference
    // up.
    let referenced: HashSet<&String> = group.items.iter().map(|item| &item.field).collect();
    let stray_folds: Vec<Filter> = group
        .folds
        .iter()
        .filter(|(field, _)| !referenced.contains(field))
        .map(|(field, on)| Filter::Condition(FieldCondition::fold_hint(field.clone(), *on)))
        .collect();

    let body = match (nodes.len(), group.op) {
        (0, _) => None,
        (1, _) => nodes.pop(),
        (_, GroupOp::And) => Some(Filter::And(nodes)),
        (_, GroupOp::Or) => Some(Filter::Or(nodes)),
    };

    match body {
        None if stray_folds.is_empty() => None,
        None => and_all(stray_folds),
        Some(body) if stray_folds.is_empty() => Some(body),
        Some(Filter::And(mut children)) => {
            children.extend(stray_folds);
            Some(Filter::And(children))
        }
        Some(body) => {
            let mut children = vec![body];
            children.extend(stray_folds);
            Some(Filter::And(children))
        }
    }
}

fn build_item(item: &FilterItem, group: &GroupAgg, nodes: &mut Vec<Filter>) {
    let operator = FilterOperator::from_modifier(&item.modifier);

    if matches!(operator, FilterOperator::In | FilterOperator::NotIn) {
        // CSV values flatten into one list condition; an empty list is
        // still emitted and the compilers decide its semantics
        let list: Vec<String> = item
            .values
            .iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        let leaf = Filter::condition(item.field.clone(), operator, FilterValue::List(list));
        nodes.push(negate(leaf, item.negated));
        return;
    }

    // An explicit fold hint always wraps; without one, only contains
    // defaults to case-insensitive.
    let fold = match group.folds.get(&item.field) {
        Some(on) => Some(*on),
        None if operator == FilterOperator::Contains => Some(true),
        None => None,
    };

    let mut variants = Vec::new();
    for raw in &item.values {
        let mut node = Filter::condition(
            item.field.clone(),
            operator,
            FilterValue::String(raw.clone()),
        );
        if let Some(on) = fold {
            node = Filter::And(vec![
                node,
                Filter::Condition(FieldCondition::fold_hint(item.field.clone(), on)),
            ]);
        }
        variants.push(negate(node, item.negated));
    }

    if variants.len() <= 1 || group.op == GroupOp::Or {
        // an OR group absorbs the variants directly instead of nesting a
        // single-purpose OR inside itself
        nodes.extend(variants);
    } else {
        nodes.push(Filter::Or(variants));
    }
}

fn negate(node: Filter, negated: bool) -> Filter {
    if negated {
        Filter::Not(Box::new(node))
    } else {
        node
    }
}
