//! Search request parameters and the business-hook contract

use std::error::Error;

use crate::filter::Filter;
use crate::sql::SqlCondition;

/// Error type business hooks and search functions may surface
pub type OpError = Box<dyn Error + Send + Sync>;

/// Request-scoped search state threaded through the pipeline.
///
/// Built fresh per request and owned by that call; the pipeline mutates it
/// (adopting a base filter, appending SQL conditions) before handing it to
/// the actual search function. Pagination and ordering fields are carried
/// for callers but not interpreted here.
#[derive(Debug, Default)]
pub struct SearchParams {
    pub filter: Option<Filter>,
    pub keyword: String,
    /// Columns the free-text keyword should match against.
    pub keyword_columns: Vec<String>,
    pub sql_conditions: Vec<SqlCondition>,
    pub page: i64,
    pub per_page: i64,
    pub order_bys: Vec<String>,
}

/// A business hook contributing an extra filter fragment to a search.
///
/// Hooks inspect the request but never mutate it; they return an optional
/// filter that the pipeline merges and compiles alongside everything else.
pub trait SearchOp {
    fn filter(&self, params: &SearchParams) -> Result<Option<Filter>, OpError>;
}

impl<F> SearchOp for F
where
    F: Fn(&SearchParams) -> Result<Option<Filter>, OpError>,
{
    fn filter(&self, params: &SearchParams) -> Result<Option<Filter>, OpError> {
        self(params)
    }
}
