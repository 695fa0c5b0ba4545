//! Page-size capping and continuation links.
//!
//! A request may ask for more rows (`$top`) than one page allows. The
//! paginator caps the query at the configured page size, and once the page
//! has been fetched it builds a link for the remainder: same filter and
//! ordering, `$skip` advanced by one page, `$top` reduced to what is left.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::query::QueryFilter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PaginationConfig {
    /// Maximum rows per page (default: 50). Zero is treated as one.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { max_page_size: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    max_page_size: u64,
}

impl Paginator {
    #[must_use]
    pub fn new(config: &PaginationConfig) -> Self {
        Self {
            max_page_size: config.max_page_size.max(1),
        }
    }

    #[must_use]
    pub fn max_page_size(&self) -> u64 {
        self.max_page_size
    }

    /// Cap `query` to one page.
    ///
    /// The effective `$top` is the requested one when it fits the page size,
    /// the page size otherwise (including when no `$top` was given).
    #[must_use]
    pub fn plan(&self, query: &QueryFilter) -> PagePlan {
        let top = query
            .top
            .map_or(self.max_page_size, |t| t.min(self.max_page_size));
        PagePlan {
            effective: query.clone().with_top(top),
            requested_top: query.top,
            max_page_size: self.max_page_size,
        }
    }
}

/// A capped query waiting for its page to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct PagePlan {
    effective: QueryFilter,
    requested_top: Option<u64>,
    max_page_size: u64,
}

impl PagePlan {
    /// The query to hand to the renderer.
    #[must_use]
    pub fn effective(&self) -> &QueryFilter {
        &self.effective
    }

    /// Rows requested beyond this page.
    #[must_use]
    pub fn overflow(&self) -> u64 {
        self.requested_top
            .map_or(0, |t| t.saturating_sub(self.max_page_size))
    }

    /// Complete the plan with the number of rows the backend returned.
    ///
    /// A next link is produced only when the page came back full and the
    /// client asked for more rows than fit in it.
    #[must_use]
    pub fn finish(self, rows_returned: usize) -> PaginationResult {
        let overflow = self.overflow();
        let page_full = self
            .effective
            .top
            .is_some_and(|top| u64::try_from(rows_returned).is_ok_and(|rows| rows == top));

        let next_link = (overflow > 0 && page_full).then(|| {
            let skip = self
                .effective
                .skip
                .unwrap_or(0)
                .saturating_add(self.max_page_size);
            let link = self
                .effective
                .clone()
                .with_skip(skip)
                .with_top(overflow)
                .to_url();
            tracing::debug!(
                next_link = %link,
                skip,
                top = overflow,
                "emitting next page link"
            );
            link
        });

        PaginationResult {
            effective: self.effective,
            overflow,
            next_link,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationResult {
    /// The query that produced the page.
    pub effective: QueryFilter,
    /// Rows requested beyond this page; 0 when the request fit.
    pub overflow: u64,
    /// Link to the remaining rows, when there are any.
    pub next_link: Option<Url>,
}
