//! Field identifier casing helpers

use convert_case::{Case, Casing};

/// Canonicalize a field identifier to PascalCase.
///
/// Snake_case input converts segment-wise and camelCase input gets its
/// first letter raised, so `user_id` and `userId` land on the same logical
/// name. Anything already PascalCase (pre-existing acronyms included)
/// passes through untouched.
pub fn pascal(field: &str) -> String {
    if field.contains('_') {
        field.to_case(Case::Pascal)
    } else if field.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        field.to_case(Case::Pascal)
    } else {
        field.to_string()
    }
}

/// SQL column name for a field (snake_case).
pub fn snake(field: &str) -> String {
    field.to_case(Case::Snake)
}

/// JSON object key for a field (lowerCamel).
pub fn camel(field: &str) -> String {
    field.to_case(Case::Camel)
}
