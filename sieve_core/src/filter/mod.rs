//! Filter tree types and tree-level helpers

mod types;
mod value;

pub use types::{FilterOperator, FilterValue};
pub use value::{coerce_bool, coerce_scalar, escape_like, parse_timestamp};

use std::collections::HashMap;

use crate::naming;

/// A leaf predicate on a single field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCondition {
    /// Logical field name, canonically PascalCase.
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
    /// Inline case-fold hint; honored exactly like a sibling `Fold`
    /// condition on the same field.
    pub fold: bool,
}

impl FieldCondition {
    /// Create a new condition with no inline fold hint
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            fold: false,
        }
    }

    /// Shorthand for a `Fold` preference condition on a field
    pub fn fold_hint(field: impl Into<String>, on: bool) -> Self {
        Self::new(field, FilterOperator::Fold, FilterValue::Boolean(on))
    }
}

/// Boolean expression tree over field conditions.
///
/// Every node is strictly single-purpose; the aggregator expresses a
/// condition with its fold companion as `And([condition, fold])` rather
/// than a mixed node. Empty `And`/`Or` nodes are never emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Condition(FieldCondition),
}

impl Filter {
    /// Leaf constructor
    pub fn condition(
        field: impl Into<String>,
        operator: FilterOperator,
        value: FilterValue,
    ) -> Self {
        Filter::Condition(FieldCondition::new(field, operator, value))
    }

    /// Canonicalize every condition field to PascalCase, in place.
    pub fn normalize_fields(&mut self) {
        match self {
            Filter::And(children) | Filter::Or(children) => {
                for child in children {
                    child.normalize_fields();
                }
            }
            Filter::Not(inner) => inner.normalize_fields(),
            Filter::Condition(condition) => {
                condition.field = naming::pascal(&condition.field);
            }
        }
    }

    /// Collect the case-fold preference per normalized field name.
    ///
    /// Both explicit `Fold` conditions and inline fold hints count; when a
    /// field carries several, the last one seen in tree order wins.
    pub fn fold_preferences(&self) -> HashMap<String, bool> {
        let mut prefs = HashMap::new();
        self.collect_folds(&mut prefs);
        prefs
    }

    fn collect_folds(&self, prefs: &mut HashMap<String, bool>) {
        match self {
            Filter::And(children) | Filter::Or(children) => {
                for child in children {
                    child.collect_folds(prefs);
                }
            }
            Filter::Not(inner) => inner.collect_folds(prefs),
            Filter::Condition(condition) => {
                if condition.operator == FilterOperator::Fold {
                    prefs.insert(naming::pascal(&condition.field), condition.value.as_bool());
                } else if condition.fold {
                    prefs.insert(naming::pascal(&condition.field), true);
                }
            }
        }
    }
}

/// AND-combine a list of filters; a single filter collapses without wrapping.
pub fn and_all(mut filters: Vec<Filter>) -> Option<Filter> {
    match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(Filter::And(filters)),
    }
}

/// AND-merge two optional filters; either side may be absent.
///
/// When the base is already an `And` node the extra filter joins its child
/// list instead of adding another level of nesting.
pub fn and_merge(base: Option<Filter>, extra: Option<Filter>) -> Option<Filter> {
    match (base, extra) {
        (Some(Filter::And(mut children)), Some(extra)) => {
            children.push(extra);
            Some(Filter::And(children))
        }
        (Some(base), Some(extra)) => Some(Filter::And(vec![base, extra])),
        (base, None) => base,
        (None, extra) => extra,
    }
}
