//! Query-string front end for sieve filter trees: aggregates the compact
//! filter DSL carried in listing URLs, builds `sieve_core` filter trees
//! from it, and runs the search pipeline that lets business hooks
//! contribute extra filter fragments.

pub mod aggregate;
pub mod build;
pub mod pipeline;

pub use aggregate::{FilterItem, GroupAgg, GroupOp, aggregate};
pub use build::{build_filter, build_groups};
pub use pipeline::{SearchError, SearchPipeline};
