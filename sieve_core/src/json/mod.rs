//! JSON compilation of filter trees into arbitrary typed destinations
//!
//! Compiles a filter tree into a nested JSON object (lowerCamel field
//! names, `or`/`not` as reserved structural keys) and deserializes it into
//! any destination type sharing that shape, e.g. a generated RPC filter
//! message.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::filter::{FieldCondition, Filter, FilterOperator, FilterValue, and_merge, coerce_scalar};
use crate::naming;
use crate::search::SearchParams;

/// Errors surfaced while marshalling a compiled filter into a destination
#[derive(Debug)]
pub enum JsonCompileError {
    Serialize(serde_json::Error),
    Deserialize(serde_json::Error),
}

impl fmt::Display for JsonCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonCompileError::Serialize(err) => {
                write!(f, "cannot serialize compiled filter: {err}")
            }
            JsonCompileError::Deserialize(err) => {
                write!(f, "destination rejected compiled filter: {err}")
            }
        }
    }
}

impl std::error::Error for JsonCompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JsonCompileError::Serialize(err) | JsonCompileError::Deserialize(err) => Some(err),
        }
    }
}

/// Compile the params' filter, keyword search included, into a JSON value.
pub fn to_value(params: &SearchParams) -> Value {
    Value::Object(compile_params(params))
}

/// Serialize the compiled filter to JSON bytes.
pub fn to_bytes(params: &SearchParams) -> Result<Vec<u8>, JsonCompileError> {
    serde_json::to_vec(&to_value(params)).map_err(JsonCompileError::Serialize)
}

/// Populate a typed destination from the compiled filter.
///
/// The destination may mirror the filter shape directly, or be a wrapper
/// struct with a field named `filter`; the compiled object is offered
/// under both shapes at once and serde ignores whichever key the
/// destination does not know.
pub fn unmarshal<T: DeserializeOwned>(params: &SearchParams) -> Result<T, JsonCompileError> {
    let mut map = compile_params(params);
    let nested = Value::Object(map.clone());
    map.insert("filter".to_string(), nested);
    serde_json::from_value(Value::Object(map)).map_err(JsonCompileError::Deserialize)
}

fn compile_params(params: &SearchParams) -> Map<String, Value> {
    match augment_keyword(params) {
        Some(filter) => compile_node(&filter),
        None => Map::new(),
    }
}

/// Fold the free-text keyword into the filter as one OR of per-column
/// contains conditions.
///
/// Each column's fold preference comes from hints already present in the
/// base tree. Once any explicit hints exist, columns without one drop out
/// of the keyword OR; preferences narrow the search, they never widen it.
fn augment_keyword(params: &SearchParams) -> Option<Filter> {
    let base = params.filter.clone();
    if params.keyword.is_empty() || params.keyword_columns.is_empty() {
        return base;
    }

    let prefs = base
        .as_ref()
        .map(Filter::fold_preferences)
        .unwrap_or_default();
    let mut branches = Vec::new();
    for column in &params.keyword_columns {
        let name = naming::pascal(column);
        let fold_on = match prefs.get(&name) {
            Some(on) => *on,
            None if prefs.is_empty() => true,
            None => continue,
        };
        branches.push(Filter::And(vec![
            Filter::condition(
                name.clone(),
                FilterOperator::Contains,
                FilterValue::String(params.keyword.clone()),
            ),
            Filter::Condition(FieldCondition::fold_hint(name, fold_on)),
        ]));
    }
    if branches.is_empty() {
        return base;
    }
    and_merge(base, Some(Filter::Or(branches)))
}

fn compile_node(filter: &Filter) -> Map<String, Value> {
    match filter {
        Filter::And(children) => {
            let mut scope = Map::new();
            for child in children {
                merge_map(&mut scope, compile_node(child));
            }
            scope
        }
        Filter::Or(children) => {
            let entries = children
                .iter()
                .map(|child| Value::Object(compile_node(child)))
                .collect();
            let mut scope = Map::new();
            scope.insert("or".to_string(), Value::Array(entries));
            scope
        }
        Filter::Not(inner) => {
            let mut scope = Map::new();
            scope.insert("not".to_string(), Value::Object(compile_node(inner)));
            scope
        }
        Filter::Condition(condition) => compile_condition(condition),
    }
}

fn compile_condition(condition: &FieldCondition) -> Map<String, Value> {
    let mut operators = Map::new();
    operators.insert(
        condition.operator.json_key().to_string(),
        coerce_value(condition),
    );
    if condition.fold && condition.operator != FilterOperator::Fold {
        // inline hints surface exactly like a sibling Fold condition
        operators.insert("fold".to_string(), Value::Bool(true));
    }
    let mut scope = Map::new();
    scope.insert(naming::camel(&condition.field), Value::Object(operators));
    scope
}

fn coerce_value(condition: &FieldCondition) -> Value {
    match condition.operator {
        // pattern operators keep the raw text; "10" must stay "10"
        FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
            Value::from(condition.value.to_text())
        }
        FilterOperator::In | FilterOperator::NotIn => Value::Array(
            condition
                .value
                .to_list()
                .iter()
                .map(|item| coerce_scalar(item))
                .collect(),
        ),
        FilterOperator::Fold | FilterOperator::IsNull => Value::Bool(condition.value.as_bool()),
        _ => match &condition.value {
            FilterValue::String(s) => coerce_scalar(s),
            FilterValue::Integer(i) => Value::from(*i),
            FilterValue::Float(f) => Value::from(*f),
            FilterValue::Boolean(b) => Value::Bool(*b),
            FilterValue::List(items) => {
                Value::Array(items.iter().map(|item| coerce_scalar(item)).collect())
            }
        },
    }
}

/// Deep-merge: objects merge recursively, arrays concatenate (`or` lists
/// from sibling nodes), scalars overwrite.
fn merge_map(dst: &mut Map<String, Value>, src: Map<String, Value>) {
    for (key, incoming) in src {
        if let Some(current) = dst.get_mut(&key) {
            match (current, incoming) {
                (Value::Object(existing), Value::Object(incoming)) => {
                    merge_map(existing, incoming);
                }
                (Value::Array(existing), Value::Array(mut incoming)) => {
                    existing.append(&mut incoming);
                }
                (current, incoming) => *current = incoming,
            }
        } else {
            dst.insert(key, incoming);
        }
    }
}
