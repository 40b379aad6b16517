//! Core data structures for admin search filters: the typed filter tree,
//! its SQL and JSON compilers, and the search-request types the pipeline
//! mutates. The textual query-string front end lives in `sieve_query`.

pub mod filter;
pub mod json;
pub mod naming;
pub mod search;
pub mod sql;

pub use filter::{
    FieldCondition, Filter, FilterOperator, FilterValue, and_all, and_merge,
};
pub use search::{OpError, SearchOp, SearchParams};
pub use sql::SqlCondition;
