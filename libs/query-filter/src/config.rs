//! Configuration of a list endpoint's query handling.

use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};

use crate::limits::QueryLimits;
use crate::pagination::{PaginationConfig, Paginator};

/// Configuration for query parsing and pagination.
///
/// ```yaml
/// pagination:
///   max_page_size: 50
/// limits:
///   max_filter_length: 2000
///   max_predicates: 64
///   max_orderby_fields: 5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct QueryFilterConfig {
    pub pagination: PaginationConfig,
    pub limits: QueryLimits,
}

impl QueryFilterConfig {
    /// Extract the configuration from `figment`, with defaults for anything
    /// it does not set.
    ///
    /// # Errors
    /// Returns the figment error on unknown keys or mistyped values.
    pub fn from_figment(figment: Figment) -> Result<Self, Box<figment::Error>> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(figment)
            .extract()
            .map_err(Box::new)
    }

    /// Defaults overridden by environment variables starting with `prefix`.
    /// Nested keys are separated by `__`, so with the prefix `BOOKS_` the
    /// page size is read from `BOOKS_PAGINATION__MAX_PAGE_SIZE`.
    ///
    /// # Errors
    /// Returns the figment error on unknown keys or mistyped values.
    pub fn from_env(prefix: &str) -> Result<Self, Box<figment::Error>> {
        let config = Self::from_figment(Figment::from(Env::prefixed(prefix).split("__")))?;
        tracing::debug!(
            prefix,
            max_page_size = config.pagination.max_page_size,
            max_filter_length = config.limits.max_filter_length,
            "loaded query filter config"
        );
        Ok(config)
    }

    #[must_use]
    pub fn paginator(&self) -> Paginator {
        Paginator::new(&self.pagination)
    }
}
