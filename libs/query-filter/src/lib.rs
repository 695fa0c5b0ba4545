#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `OData`-style query options for list endpoints.
//!
//! Turns the `$filter`, `$orderby`, `$top` and `$skip` options of a request
//! URL into a validated [`QueryFilter`], renders it into SQL clauses with
//! bound parameters ([`Projection`]) and caps page sizes with continuation
//! links ([`Paginator`]).
//!
//! ```rust,ignore
//! use query_filter::{Flavor, Projection, QueryFilter, QueryFilterConfig};
//!
//! let config = QueryFilterConfig::from_env("BOOKS_")?;
//! let query = QueryFilter::parse::<Book>(&url, &config.limits)?;
//! let plan = config.paginator().plan(&query);
//! let projection = Projection::render(plan.effective(), Flavor::Postgresql);
//! let rows = db.fetch(&projection.sql_with_base("SELECT * FROM books"), &projection.params)?;
//! let page = plan.finish(rows.len());
//! ```
pub mod config;
pub mod errors;
pub mod filter;
mod lexer;
pub mod limits;
pub mod options;
pub mod orderby;
pub mod pagination;
pub mod paging;
pub mod problem;
pub mod problem_mapping;
pub mod query;
pub mod render;
pub mod schema;

pub use config::QueryFilterConfig;
pub use errors::{Error, Result};
pub use filter::{CompareOp, Conjunction, Filter, Literal, PredicateNode, parse_filter};
pub use limits::QueryLimits;
pub use options::{
    OPTION_FILTER, OPTION_ORDERBY, OPTION_SKIP, OPTION_TOP, QueryOption, extract_option,
};
pub use orderby::{OrderBy, OrderKey, SortDir, parse_orderby};
pub use pagination::{PagePlan, PaginationConfig, PaginationResult, Paginator};
pub use paging::parse_page_param;
pub use problem::{APPLICATION_PROBLEM_JSON, Problem};
pub use query::QueryFilter;
pub use render::{Flavor, Projection};
pub use schema::{FieldDescriptor, FieldMap, Queryable, TypeDescriptor};
