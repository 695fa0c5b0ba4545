//! Assembly of the four query options into a single validated `QueryFilter`.

use url::Url;

use crate::errors::Result;
use crate::filter::{Filter, parse_filter};
use crate::limits::QueryLimits;
use crate::options::{QueryOption, encode_component, extract_option, foreign_params};
use crate::orderby::{OrderBy, parse_orderby};
use crate::paging::parse_page_param;
use crate::schema::{FieldMap, Queryable};

/// Validated list query of one request.
///
/// Built once by [`QueryFilter::parse`]; the paginator derives modified
/// copies (effective page, continuation) through the `with_*` builders.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct QueryFilter {
    pub filter: Option<Filter>,
    pub order_by: Option<OrderBy>,
    pub top: Option<u64>,
    pub skip: Option<u64>,
    /// Request URL the options were read from.
    pub source_url: Url,
}

impl QueryFilter {
    /// A query with no options, bound to `source_url`.
    pub fn new(source_url: Url) -> Self {
        Self {
            filter: None,
            order_by: None,
            top: None,
            skip: None,
            source_url,
        }
    }

    /// Parse the query options of `url` against the fields of `T`.
    ///
    /// # Errors
    /// Returns `Error::InvalidTargetType` when `T` has no field map, and the
    /// first parse error otherwise (see [`QueryFilter::parse_with`]).
    pub fn parse<T: Queryable>(url: &Url, limits: &QueryLimits) -> Result<Self> {
        let fields = FieldMap::of::<T>()?;
        Self::parse_with(url, &fields, limits)
    }

    /// Parse the query options of `url` against an explicit field map.
    ///
    /// Options are parsed in the order `$filter`, `$orderby`, `$top`,
    /// `$skip`; the first failure is returned and nothing else is built.
    ///
    /// # Errors
    /// `Error::FilterSyntax`, `Error::OrderBySyntax` or `Error::PageParam`.
    pub fn parse_with(url: &Url, fields: &FieldMap, limits: &QueryLimits) -> Result<Self> {
        let query = url.query().unwrap_or_default();

        let raw_filter = extract_option(query, QueryOption::Filter);
        let raw_orderby = extract_option(query, QueryOption::OrderBy);
        let raw_top = extract_option(query, QueryOption::Top);
        let raw_skip = extract_option(query, QueryOption::Skip);

        let filter = raw_filter
            .as_deref()
            .map(|raw| parse_filter(raw, fields, limits))
            .transpose()?
            .flatten();
        let order_by = raw_orderby
            .as_deref()
            .map(|raw| parse_orderby(raw, fields, limits))
            .transpose()?
            .flatten();
        let top = parse_page_param(raw_top.as_deref(), QueryOption::Top)?;
        let skip = parse_page_param(raw_skip.as_deref(), QueryOption::Skip)?;

        tracing::debug!(
            path = url.path(),
            predicates = filter.as_ref().map_or(0, Filter::len),
            order_keys = order_by.as_ref().map_or(0, |o| o.keys().len()),
            top = ?top,
            skip = ?skip,
            "parsed list query"
        );

        Ok(Self {
            filter,
            order_by,
            top,
            skip,
            source_url: url.clone(),
        })
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_top(mut self, top: u64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    #[must_use]
    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    /// Serialize this query back onto its source URL.
    ///
    /// Parameters other than the four options are kept as they were, in
    /// order. The options are then appended as `$filter`, `$orderby`,
    /// `$skip`, `$top`, each only when set; `$filter` and `$orderby` carry
    /// their raw text, percent-encoded.
    #[must_use]
    pub fn to_url(&self) -> Url {
        let mut url = self.source_url.clone();
        let mut params: Vec<String> = foreign_params(url.query().unwrap_or_default())
            .into_iter()
            .map(str::to_owned)
            .collect();

        if let Some(filter) = &self.filter {
            params.push(format!(
                "{}={}",
                QueryOption::Filter,
                encode_component(filter.raw())
            ));
        }
        if let Some(order_by) = &self.order_by {
            params.push(format!(
                "{}={}",
                QueryOption::OrderBy,
                encode_component(order_by.raw())
            ));
        }
        if let Some(skip) = self.skip {
            params.push(format!("{}={skip}", QueryOption::Skip));
        }
        if let Some(top) = self.top {
            params.push(format!("{}={top}", QueryOption::Top));
        }

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&params.join("&")));
        }
        url
    }
}
