//! Search pipeline: base filter adoption, business hooks, SQL compilation

use std::fmt;

use log::debug;
use sieve_core::{OpError, SearchOp, SearchParams, and_all, and_merge, sql};

use crate::build::build_filter;

/// Pipeline-level failures
#[derive(Debug)]
pub enum SearchError {
    /// A business hook refused the request; nothing was merged.
    Op(OpError),
    /// The wrapped search function failed.
    Search(OpError),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::Op(err) => write!(f, "search op failed: {err}"),
            SearchError::Search(err) => write!(f, "search failed: {err}"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Op(err) | SearchError::Search(err) => Some(err.as_ref()),
        }
    }
}

/// Ordered chain of search hooks wrapped around a search function.
#[derive(Default)]
pub struct SearchPipeline {
    ops: Vec<Box<dyn SearchOp>>,
}

impl SearchPipeline {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn with_op(mut self, op: impl SearchOp + 'static) -> Self {
        self.ops.push(Box::new(op));
        self
    }

    /// Resolve the base filter, run every hook, merge, and compile.
    ///
    /// Only the hook-contributed portion is compiled to SQL: the listing
    /// layer has already produced SQL for the base filter, and re-emitting
    /// it would double every condition. Fold preferences still come from
    /// the entire merged tree so UI-level hints govern hook-injected
    /// pattern matches too.
    pub fn prepare(
        &self,
        params: &mut SearchParams,
        raw_query: Option<&str>,
    ) -> Result<(), SearchError> {
        if params.filter.is_none()
            && let Some(raw) = raw_query
            && let Some(mut base) = build_filter(raw)
        {
            base.normalize_fields();
            params.filter = Some(base);
        }

        let mut contributed = Vec::new();
        for op in &self.ops {
            if let Some(mut filter) = op.filter(params).map_err(SearchError::Op)? {
                filter.normalize_fields();
                contributed.push(filter);
            }
        }

        let Some(op_filter) = and_all(contributed) else {
            return Ok(());
        };
        params.filter = and_merge(params.filter.take(), Some(op_filter.clone()));

        let folds = params
            .filter
            .as_ref()
            .map(|filter| filter.fold_preferences())
            .unwrap_or_default();
        if let Some(condition) = sql::compile(&op_filter, &folds) {
            debug!("search ops appended SQL: {}", condition.query);
            params.sql_conditions.push(condition);
        }
        Ok(())
    }

    /// Run the full pipeline, then delegate to the wrapped search function.
    pub fn run<R>(
        &self,
        params: &mut SearchParams,
        raw_query: Option<&str>,
        search: impl FnOnce(&mut SearchParams) -> Result<R, OpError>,
    ) -> Result<R, SearchError> {
        self.prepare(params, raw_query)?;
        search(params).map_err(SearchError::Search)
    }
}
