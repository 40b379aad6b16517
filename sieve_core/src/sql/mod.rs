//! SQL compilation of filter trees

use std::collections::HashMap;

use log::debug;

use crate::filter::{FieldCondition, Filter, FilterOperator, FilterValue, escape_like};
use crate::naming;

/// A compiled SQL boolean fragment with positional arguments.
///
/// `query` holds `?` placeholders in left-to-right `args` order; ownership
/// transfers to the caller (typically appended to the listing's WHERE
/// clause by the ORM layer).
#[derive(Debug, Clone, PartialEq)]
pub struct SqlCondition {
    pub query: String,
    pub args: Vec<FilterValue>,
}

/// Compile a filter tree into one SQL boolean expression.
///
/// Fold preferences are keyed by normalized field name and choose LIKE vs
/// ILIKE for pattern operators; a missing entry means case-insensitive
/// (ILIKE). Returns `None` when the tree produces no SQL at all, e.g. a
/// tree of nothing but `Fold` metadata or empty `notIn` conditions.
pub fn compile(filter: &Filter, folds: &HashMap<String, bool>) -> Option<SqlCondition> {
    let (query, args) = compile_node(filter, folds)?;
    debug!("compiled filter SQL: {query}");
    Some(SqlCondition { query, args })
}

/// Compile with fold preferences collected from the tree itself.
pub fn compile_self_folded(filter: &Filter) -> Option<SqlCondition> {
    compile(filter, &filter.fold_preferences())
}

fn compile_node(
    filter: &Filter,
    folds: &HashMap<String, bool>,
) -> Option<(String, Vec<FilterValue>)> {
    match filter {
        Filter::And(children) => compile_children(children, folds, " AND "),
        Filter::Or(children) => compile_children(children, folds, " OR "),
        Filter::Not(inner) => {
            let (query, args) = compile_node(inner, folds)?;
            Some((format!("NOT ({query})"), args))
        }
        Filter::Condition(condition) => compile_condition(condition, folds),
    }
}

// Children producing no SQL are skipped entirely; a stray AND/OR with a
// missing operand must never reach the output.
fn compile_children(
    children: &[Filter],
    folds: &HashMap<String, bool>,
    joiner: &str,
) -> Option<(String, Vec<FilterValue>)> {
    let mut parts = Vec::new();
    let mut args = Vec::new();
    for child in children {
        if let Some((query, child_args)) = compile_node(child, folds) {
            parts.push(query);
            args.extend(child_args);
        }
    }
    match parts.len() {
        0 => None,
        // a single surviving child needs no grouping parentheses
        1 => Some((parts.pop()?, args)),
        _ => {
            let joined = parts
                .iter()
                .map(|part| format!("({part})"))
                .collect::<Vec<_>>()
                .join(joiner);
            Some((joined, args))
        }
    }
}

fn compile_condition(
    condition: &FieldCondition,
    folds: &HashMap<String, bool>,
) -> Option<(String, Vec<FilterValue>)> {
    let column = naming::snake(&condition.field);
    match condition.operator {
        FilterOperator::Fold => None,
        FilterOperator::Eq => Some((format!("{column} = ?"), vec![condition.value.clone()])),
        FilterOperator::Neq => Some((format!("{column} <> ?"), vec![condition.value.clone()])),
        FilterOperator::Gt => Some((format!("{column} > ?"), vec![condition.value.clone()])),
        FilterOperator::Gte => Some((format!("{column} >= ?"), vec![condition.value.clone()])),
        FilterOperator::Lt => Some((format!("{column} < ?"), vec![condition.value.clone()])),
        FilterOperator::Lte => Some((format!("{column} <= ?"), vec![condition.value.clone()])),
        FilterOperator::IsNull => {
            if condition.value.as_bool() {
                Some((format!("{column} IS NULL"), Vec::new()))
            } else {
                Some((format!("{column} IS NOT NULL"), Vec::new()))
            }
        }
        FilterOperator::In => {
            let items = condition.value.to_list();
            if items.is_empty() {
                // empty IN can never match
                Some(("1 = 0".to_string(), Vec::new()))
            } else {
                Some((
                    format!("{column} IN ?"),
                    vec![FilterValue::List(items)],
                ))
            }
        }
        FilterOperator::NotIn => {
            let items = condition.value.to_list();
            if items.is_empty() {
                // empty NOT IN excludes nothing; drop the condition rather
                // than emit an always-true clause
                None
            } else {
                Some((
                    format!("{column} NOT IN ?"),
                    vec![FilterValue::List(items)],
                ))
            }
        }
        FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
            let fold_on = folds
                .get(&naming::pascal(&condition.field))
                .copied()
                .unwrap_or(true);
            let like = if fold_on { "ILIKE" } else { "LIKE" };
            let escaped = escape_like(&condition.value.to_text());
            let pattern = match condition.operator {
                FilterOperator::StartsWith => format!("{escaped}%"),
                FilterOperator::EndsWith => format!("%{escaped}"),
                _ => format!("%{escaped}%"),
            };
            Some((
                format!("{column} {like} ?"),
                vec![FilterValue::String(pattern)],
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(field: &str, operator: FilterOperator, value: FilterValue) -> Filter {
        Filter::condition(field, operator, value)
    }

    fn s(text: &str) -> FilterValue {
        FilterValue::String(text.to_string())
    }

    fn compile_plain(filter: &Filter) -> SqlCondition {
        compile(filter, &HashMap::new()).unwrap()
    }

    #[test]
    fn test_eq_template() {
        let sql = compile_plain(&cond("Status", FilterOperator::Eq, s("A")));
        assert_eq!(sql.query, "status = ?");
        assert_eq!(sql.args, vec![s("A")]);
    }

    #[test]
    fn test_neq_template() {
        let sql = compile_plain(&cond("Status", FilterOperator::Neq, s("A")));
        assert_eq!(sql.query, "status <> ?");
    }

    #[test]
    fn test_ordering_templates() {
        let cases = [
            (FilterOperator::Gt, "price > ?"),
            (FilterOperator::Gte, "price >= ?"),
            (FilterOperator::Lt, "price < ?"),
            (FilterOperator::Lte, "price <= ?"),
        ];
        for (operator, expected) in cases {
            let sql = compile_plain(&cond("Price", operator, s("10")));
            assert_eq!(sql.query, expected);
            assert_eq!(sql.args, vec![s("10")]);
        }
    }

    #[test]
    fn test_is_null_templates() {
        let sql = compile_plain(&cond(
            "ParentId",
            FilterOperator::IsNull,
            FilterValue::Boolean(true),
        ));
        assert_eq!(sql.query, "parent_id IS NULL");
        assert!(sql.args.is_empty());

        let sql = compile_plain(&cond(
            "ParentId",
            FilterOperator::IsNull,
            FilterValue::Boolean(false),
        ));
        assert_eq!(sql.query, "parent_id IS NOT NULL");
    }

    #[test]
    fn test_is_null_non_bool_reads_as_false() {
        let sql = compile_plain(&cond("ParentId", FilterOperator::IsNull, s("maybe")));
        assert_eq!(sql.query, "parent_id IS NOT NULL");
    }

    #[test]
    fn test_in_with_list_arg() {
        let sql = compile_plain(&cond(
            "Status",
            FilterOperator::In,
            FilterValue::List(vec!["A".to_string(), "B".to_string()]),
        ));
        assert_eq!(sql.query, "status IN ?");
        assert_eq!(
            sql.args,
            vec![FilterValue::List(vec!["A".to_string(), "B".to_string()])]
        );
    }

    #[test]
    fn test_empty_in_is_unconditionally_false() {
        let sql = compile_plain(&cond("Status", FilterOperator::In, FilterValue::List(vec![])));
        assert_eq!(sql.query, "1 = 0");
        assert!(sql.args.is_empty());
    }

    #[test]
    fn test_empty_not_in_is_dropped() {
        let filter = cond("Status", FilterOperator::NotIn, FilterValue::List(vec![]));
        assert!(compile(&filter, &HashMap::new()).is_none());
    }

    #[test]
    fn test_not_in_template() {
        let sql = compile_plain(&cond(
            "Status",
            FilterOperator::NotIn,
            FilterValue::List(vec!["C".to_string()]),
        ));
        assert_eq!(sql.query, "status NOT IN ?");
    }

    #[test]
    fn test_contains_defaults_to_ilike() {
        let sql = compile_plain(&cond("Name", FilterOperator::Contains, s("Galaxy")));
        assert_eq!(sql.query, "name ILIKE ?");
        assert_eq!(sql.args, vec![s("%Galaxy%")]);
    }

    #[test]
    fn test_fold_off_forces_like() {
        let folds = HashMap::from([("Name".to_string(), false)]);
        let filter = cond("Name", FilterOperator::Contains, s("Galaxy"));
        let sql = compile(&filter, &folds).unwrap();
        assert_eq!(sql.query, "name LIKE ?");
    }

    #[test]
    fn test_starts_and_ends_with_patterns() {
        let sql = compile_plain(&cond("Name", FilterOperator::StartsWith, s("Ga")));
        assert_eq!(sql.args, vec![s("Ga%")]);
        let sql = compile_plain(&cond("Name", FilterOperator::EndsWith, s("xy")));
        assert_eq!(sql.args, vec![s("%xy")]);
    }

    #[test]
    fn test_like_wildcards_are_escaped() {
        let sql = compile_plain(&cond("Name", FilterOperator::Contains, s("50%_off")));
        assert_eq!(sql.args, vec![s("%50\\%\\_off%")]);
    }

    #[test]
    fn test_fold_condition_emits_nothing() {
        let filter = Filter::Condition(FieldCondition::fold_hint("Name", true));
        assert!(compile(&filter, &HashMap::new()).is_none());
    }

    #[test]
    fn test_and_joins_parenthesized_children() {
        let filter = Filter::And(vec![
            cond("Name", FilterOperator::Contains, s("Galaxy")),
            cond("Price", FilterOperator::Gte, s("10")),
        ]);
        let sql = compile_plain(&filter);
        assert_eq!(sql.query, "(name ILIKE ?) AND (price >= ?)");
        assert_eq!(sql.args, vec![s("%Galaxy%"), s("10")]);
    }

    #[test]
    fn test_or_joins_parenthesized_children() {
        let filter = Filter::Or(vec![
            cond("Status", FilterOperator::Eq, s("A")),
            cond("Status", FilterOperator::Eq, s("B")),
        ]);
        let sql = compile_plain(&filter);
        assert_eq!(sql.query, "(status = ?) OR (status = ?)");
    }

    #[test]
    fn test_not_wraps_child() {
        let filter = Filter::Not(Box::new(cond(
            "Status",
            FilterOperator::In,
            FilterValue::List(vec!["C".to_string()]),
        )));
        let sql = compile_plain(&filter);
        assert_eq!(sql.query, "NOT (status IN ?)");
    }

    #[test]
    fn test_not_of_empty_child_emits_nothing() {
        let filter = Filter::Not(Box::new(Filter::Condition(FieldCondition::fold_hint(
            "Name", true,
        ))));
        assert!(compile(&filter, &HashMap::new()).is_none());
    }

    #[test]
    fn test_empty_children_are_skipped_without_stray_operators() {
        let filter = Filter::And(vec![
            Filter::Condition(FieldCondition::fold_hint("Name", true)),
            cond("Price", FilterOperator::Gte, s("10")),
        ]);
        let sql = compile_plain(&filter);
        assert_eq!(sql.query, "price >= ?");
    }

    #[test]
    fn test_single_surviving_child_is_not_double_wrapped() {
        // a fold-wrapped variant reduces to one compiled child per branch
        let filter = Filter::Or(vec![
            Filter::And(vec![
                cond("Name", FilterOperator::Contains, s("Alpha")),
                Filter::Condition(FieldCondition::fold_hint("Name", true)),
            ]),
            Filter::And(vec![
                cond("Name", FilterOperator::Contains, s("Beta")),
                Filter::Condition(FieldCondition::fold_hint("Name", true)),
            ]),
        ]);
        let sql = compile_self_folded(&filter).unwrap();
        assert_eq!(sql.query, "(name ILIKE ?) OR (name ILIKE ?)");
    }

    #[test]
    fn test_compilation_is_idempotent() {
        let filter = Filter::And(vec![
            cond("Name", FilterOperator::Contains, s("Galaxy")),
            Filter::Or(vec![
                cond("Status", FilterOperator::Eq, s("A")),
                cond("Status", FilterOperator::Eq, s("B")),
            ]),
        ]);
        let first = compile_self_folded(&filter).unwrap();
        let second = compile_self_folded(&filter).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_self_folded_uses_tree_hints() {
        let filter = Filter::And(vec![
            cond("Name", FilterOperator::Contains, s("Galaxy")),
            Filter::Condition(FieldCondition::fold_hint("Name", false)),
        ]);
        let sql = compile_self_folded(&filter).unwrap();
        assert_eq!(sql.query, "name LIKE ?");
    }
}
