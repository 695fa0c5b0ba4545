//! Rendering of a `QueryFilter` into SQL clause fragments.
//!
//! Literal values never appear in the produced text: every value becomes a
//! placeholder and is returned, in placeholder order, in
//! [`Projection::params`] for the driver to bind.

use crate::filter::{Filter, Literal};
use crate::query::QueryFilter;

/// Placeholder dialect of the target database.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flavor {
    /// `$1`, `$2`, ...
    #[default]
    Postgresql,
    /// `?1`, `?2`, ...
    Sqlite,
    /// `?`
    Mysql,
}

impl Flavor {
    /// Placeholder for the 1-based parameter `index`.
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Flavor::Postgresql => format!("${index}"),
            Flavor::Sqlite => format!("?{index}"),
            Flavor::Mysql => "?".to_owned(),
        }
    }
}

/// Backend-ready clauses of a list query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Projection {
    /// Predicate without the `WHERE` keyword, e.g. `title = $1 AND rate > $2`.
    pub predicate: Option<String>,
    /// Values for the predicate placeholders, in order.
    pub params: Vec<Literal>,
    /// Sort expression without `ORDER BY`, e.g. `rate DESC, title`.
    pub order_by: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl Projection {
    #[must_use]
    pub fn render(query: &QueryFilter, flavor: Flavor) -> Self {
        let (predicate, params) = query
            .filter
            .as_ref()
            .map(|filter| render_predicate(filter, flavor))
            .unzip();

        Self {
            predicate,
            params: params.unwrap_or_default(),
            order_by: query.order_by.as_ref().map(ToString::to_string),
            offset: query.skip,
            limit: query.top,
        }
    }

    /// The present clauses as `WHERE`, `ORDER BY`, `OFFSET`, `LIMIT`, one per
    /// line. Empty when nothing is set.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut clauses = Vec::with_capacity(4);
        if let Some(predicate) = &self.predicate {
            clauses.push(format!("WHERE {predicate}"));
        }
        if let Some(order_by) = &self.order_by {
            clauses.push(format!("ORDER BY {order_by}"));
        }
        if let Some(offset) = self.offset {
            clauses.push(format!("OFFSET {offset}"));
        }
        if let Some(limit) = self.limit {
            clauses.push(format!("LIMIT {limit}"));
        }
        clauses.join("\n")
    }

    /// `select` (e.g. `SELECT * FROM books`) followed by the clauses.
    #[must_use]
    pub fn sql_with_base(&self, select: &str) -> String {
        let clauses = self.to_sql();
        if clauses.is_empty() {
            select.to_owned()
        } else {
            format!("{select}\n{clauses}")
        }
    }
}

fn render_predicate(filter: &Filter, flavor: Flavor) -> (String, Vec<Literal>) {
    let mut parts = Vec::with_capacity(filter.len() * 2);
    let mut params = Vec::with_capacity(filter.len());

    for node in filter {
        params.push(node.value.clone());
        parts.push(format!(
            "{} {} {}",
            node.column,
            node.op,
            flavor.placeholder(params.len())
        ));
        if let Some(conj) = node.conjunction {
            parts.push(conj.to_string());
        }
    }

    (parts.join(" "), params)
}
