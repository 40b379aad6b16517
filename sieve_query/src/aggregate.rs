//! Query-string aggregation into per-group condition lists
//!
//! First stage of the filter front end: decodes a raw query string into
//! ordered per-group lists of (field, modifier, values, negation) plus
//! per-field fold hints. No filter semantics yet; that is the builder's
//! job.

use std::collections::{BTreeMap, HashMap, HashSet};

use sieve_core::naming;
use url::form_urlencoded;

/// Boolean combinator for a group's conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupOp {
    #[default]
    And,
    Or,
}

/// One raw condition gathered from the query string
#[derive(Debug, Clone, PartialEq)]
pub struct FilterItem {
    /// Canonical PascalCase field name.
    pub field: String,
    /// Raw modifier text; mapping to an operator happens at build time.
    pub modifier: String,
    /// Every value supplied for the exact same key, in arrival order.
    pub values: Vec<String>,
    pub negated: bool,
}

/// Accumulated state for one filter group
#[derive(Debug, Clone, Default)]
pub struct GroupAgg {
    pub op: GroupOp,
    pub items: Vec<FilterItem>,
    /// Tri-state fold preference per field: absent, on, or off.
    pub folds: BTreeMap<String, bool>,
}

/// Parse a raw query string into per-group aggregates.
///
/// Keys follow `[f_][<group>.][not.]<field>[.<modifier>]`; a group is
/// declared either by an `<id>.__op` key (which also sets its combinator)
/// or by any grouped condition key, so `__op` itself is optional. The
/// returned map is ordered by group id so downstream output is
/// deterministic regardless of the order keys arrived in. Unparseable keys
/// are skipped, never an error.
pub fn aggregate(query: &str) -> BTreeMap<String, GroupAgg> {
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    // Group ids are declared up front, by `<id>.__op` keys and by grouped
    // condition keys (at least `<id>.<field>.<modifier>`, one segment more
    // when negated), so membership never depends on key order. `not` can
    // head a root negation key and never names a group.
    let mut declared: HashSet<String> = HashSet::new();
    for (key, _) in &pairs {
        let key = key.strip_prefix("f_").unwrap_or(key);
        let segments: Vec<&str> = key.split('.').collect();
        match segments.as_slice() {
            [id, "__op"] if *id != "not" => {
                declared.insert(id.to_string());
            }
            [id, "not", _, _, ..] if *id != "not" && *id != "__op" => {
                declared.insert(id.to_string());
            }
            [id, second, _, ..]
                if *id != "not" && *id != "__op" && *second != "not" && *second != "__op" =>
            {
                declared.insert(id.to_string());
            }
            _ => {}
        }
    }

    let mut groups: BTreeMap<String, GroupAgg> = BTreeMap::new();
    // one item per exact key; repeated keys extend that item's value list
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (raw_key, value) in &pairs {
        let key = raw_key.strip_prefix("f_").unwrap_or(raw_key);
        let segments: Vec<&str> = key.split('.').collect();
        let (group_id, rest) = match segments.split_first() {
            Some((first, rest)) if declared.contains(*first) => (first.to_string(), rest),
            _ => (String::new(), segments.as_slice()),
        };

        let group = groups.entry(group_id).or_default();
        if rest == ["__op"] {
            match value.to_ascii_lowercase().as_str() {
                "or" => group.op = GroupOp::Or,
                "and" => group.op = GroupOp::And,
                _ => {}
            }
            continue;
        }

        let (negated, rest) = match rest {
            ["not", tail @ ..] => (true, tail),
            _ => (false, rest),
        };
        let (field, modifier) = match rest {
            [field] => (*field, ""),
            [field, modifier] => (*field, *modifier),
            _ => continue,
        };
        if field.is_empty() {
            continue;
        }
        let field = naming::pascal(field);

        if modifier.eq_ignore_ascii_case("fold") {
            group.folds.insert(field, fold_state(value));
            continue;
        }

        if let Some(&index) = seen.get(key) {
            group.items[index].values.push(value.clone());
        } else {
            seen.insert(key.to_string(), group.items.len());
            group.items.push(FilterItem {
                field,
                modifier: modifier.to_string(),
                values: vec![value.clone()],
                negated,
            });
        }
    }
    groups
}

// A fold key turns the preference off only for an empty/"false"/"0" value.
fn fold_state(value: &str) -> bool {
    !(value.is_empty() || value.eq_ignore_ascii_case("false") || value == "0")
}
