//! Filter operator and value type definitions

use super::value::coerce_bool;

/// Comparison operators usable in filter conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    IsNull,
    Contains,
    StartsWith,
    EndsWith,
    /// Case-fold preference carrier; metadata, never a predicate on its own.
    Fold,
}

impl FilterOperator {
    /// Map a query-string modifier to an operator.
    ///
    /// Total and case-insensitive; unknown or empty modifiers mean equality.
    pub fn from_modifier(modifier: &str) -> Self {
        match modifier.to_ascii_lowercase().as_str() {
            "ilike" => FilterOperator::Contains,
            "gte" => FilterOperator::Gte,
            "lte" => FilterOperator::Lte,
            "gt" => FilterOperator::Gt,
            "lt" => FilterOperator::Lt,
            "in" => FilterOperator::In,
            "notin" => FilterOperator::NotIn,
            "fold" => FilterOperator::Fold,
            _ => FilterOperator::Eq,
        }
    }

    /// JSON object key for this operator (lowerCamel).
    pub fn json_key(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "notIn",
            FilterOperator::IsNull => "isNull",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::Fold => "fold",
        }
    }
}

/// Values carried by filter conditions
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<String>),
}

impl FilterValue {
    /// Plain-text rendering, used for LIKE patterns and scalar SQL args.
    pub fn to_text(&self) -> String {
        match self {
            FilterValue::String(s) => s.clone(),
            FilterValue::Integer(i) => i.to_string(),
            FilterValue::Float(f) => f.to_string(),
            FilterValue::Boolean(b) => b.to_string(),
            FilterValue::List(items) => items.join(","),
        }
    }

    /// Boolean reading used in `fold` and `isNull` positions.
    ///
    /// Strings follow the lenient `"true"`/`"1"` convention; anything that
    /// carries no boolean meaning reads as false.
    pub fn as_bool(&self) -> bool {
        match self {
            FilterValue::Boolean(b) => *b,
            FilterValue::String(s) => coerce_bool(s),
            FilterValue::Integer(i) => *i == 1,
            _ => false,
        }
    }

    /// List reading used in `in`/`notIn` positions.
    ///
    /// A plain string is treated as comma-separated values; empty entries
    /// are dropped after trimming.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            FilterValue::List(items) => items.clone(),
            FilterValue::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
            other => vec![other.to_text()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_mapping() {
        assert_eq!(
            FilterOperator::from_modifier("ilike"),
            FilterOperator::Contains
        );
        assert_eq!(FilterOperator::from_modifier("gte"), FilterOperator::Gte);
        assert_eq!(FilterOperator::from_modifier("lte"), FilterOperator::Lte);
        assert_eq!(FilterOperator::from_modifier("gt"), FilterOperator::Gt);
        assert_eq!(FilterOperator::from_modifier("lt"), FilterOperator::Lt);
        assert_eq!(FilterOperator::from_modifier("in"), FilterOperator::In);
        assert_eq!(
            FilterOperator::from_modifier("notin"),
            FilterOperator::NotIn
        );
        assert_eq!(FilterOperator::from_modifier("fold"), FilterOperator::Fold);
    }

    #[test]
    fn test_modifier_mapping_is_case_insensitive() {
        assert_eq!(
            FilterOperator::from_modifier("ILIKE"),
            FilterOperator::Contains
        );
        assert_eq!(
            FilterOperator::from_modifier("NotIn"),
            FilterOperator::NotIn
        );
    }

    #[test]
    fn test_unknown_modifier_defaults_to_eq() {
        assert_eq!(FilterOperator::from_modifier(""), FilterOperator::Eq);
        assert_eq!(FilterOperator::from_modifier("like"), FilterOperator::Eq);
        assert_eq!(
            FilterOperator::from_modifier("between"),
            FilterOperator::Eq
        );
    }

    #[test]
    fn test_json_keys() {
        assert_eq!(FilterOperator::NotIn.json_key(), "notIn");
        assert_eq!(FilterOperator::IsNull.json_key(), "isNull");
        assert_eq!(FilterOperator::StartsWith.json_key(), "startsWith");
        assert_eq!(FilterOperator::Eq.json_key(), "eq");
    }

    #[test]
    fn test_value_as_bool() {
        assert!(FilterValue::Boolean(true).as_bool());
        assert!(FilterValue::String("true".to_string()).as_bool());
        assert!(FilterValue::String("1".to_string()).as_bool());
        assert!(!FilterValue::String("0".to_string()).as_bool());
        assert!(!FilterValue::List(vec!["true".to_string()]).as_bool());
    }

    #[test]
    fn test_value_to_list_from_csv() {
        assert_eq!(
            FilterValue::String("A, B ,C".to_string()).to_list(),
            vec!["A", "B", "C"]
        );
        assert!(FilterValue::String(String::new()).to_list().is_empty());
    }

    #[test]
    fn test_value_to_list_from_scalar() {
        assert_eq!(FilterValue::Integer(7).to_list(), vec!["7"]);
    }
}
