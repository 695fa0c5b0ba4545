//! `$orderby` grammar: `field [asc|desc] (, field [asc|desc])*`.
//!
//! Field names are translated to columns and directions upper-cased. When a
//! key carries no direction none is injected, leaving the backend default.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::lexer::{Token, TokenKind, tokenize};
use crate::limits::{QueryLimits, truncate};
use crate::schema::FieldMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl SortDir {
    /// Case-insensitive `asc` / `desc`.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("asc") {
            Some(SortDir::Asc)
        } else if word.eq_ignore_ascii_case("desc") {
            Some(SortDir::Desc)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderKey {
    /// Physical column name.
    pub column: String,
    /// `None` when the query gave no direction.
    pub dir: Option<SortDir>,
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dir {
            Some(dir) => write!(f, "{} {}", self.column, dir.as_sql()),
            None => f.write_str(&self.column),
        }
    }
}

/// Parsed `$orderby`. `Display` renders the canonical sort expression,
/// e.g. `rate DESC, title`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    raw: String,
    keys: Vec<OrderKey>,
}

impl OrderBy {
    /// The `$orderby` text as received, for continuation links.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn keys(&self) -> &[OrderKey] {
        &self.keys
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

/// Parse a raw `$orderby` value against `fields`.
///
/// Blank input means "no ordering" and yields `Ok(None)`.
///
/// # Errors
/// Returns `Error::OrderBySyntax` with the offending fragment when the input
/// is not fully explained by the grammar, references a field missing from
/// `fields`, or has more keys than `limits` allow.
pub fn parse_orderby(raw: &str, fields: &FieldMap, limits: &QueryLimits) -> Result<Option<OrderBy>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let tokens = tokenize(raw)
        .map_err(|e| Error::orderby_syntax(truncate(&raw[e.offset()..]), e.reason()))?;
    let mut rest = tokens.as_slice();
    let mut keys = Vec::new();

    loop {
        let (key, tail) = order_key(raw, rest, fields)?;
        keys.push(key);
        limits.validate_orderby_count(keys.len(), raw)?;

        match tail {
            [] => break,
            [comma, next @ ..] if comma.kind == TokenKind::Comma => {
                if next.is_empty() {
                    return Err(Error::orderby_syntax(",", "trailing comma"));
                }
                rest = next;
            }
            [other, ..] => return Err(error_at(raw, *other, "expected `,`")),
        }
    }

    Ok(Some(OrderBy {
        raw: raw.to_owned(),
        keys,
    }))
}

/// One `field [dir]` item; returns the key and the unconsumed tokens.
fn order_key<'a, 't>(
    raw: &str,
    tokens: &'t [Token<'a>],
    fields: &FieldMap,
) -> Result<(OrderKey, &'t [Token<'a>])> {
    let Some((field, mut rest)) = tokens.split_first() else {
        return Err(Error::orderby_syntax(
            truncate(raw.trim()),
            "expected a field name, found end of input",
        ));
    };

    let TokenKind::Word(name) = field.kind else {
        return Err(error_at(raw, *field, "expected a field name"));
    };
    let column = fields
        .column(name)
        .ok_or_else(|| Error::orderby_syntax(name, format!("unknown field `{name}`")))?;

    let mut dir = None;
    if let Some((token, tail)) = rest.split_first()
        && let TokenKind::Word(word) = token.kind
    {
        let parsed = SortDir::from_keyword(word)
            .ok_or_else(|| Error::orderby_syntax(word, format!("unsupported direction `{word}`")))?;
        if !token.spaced {
            return Err(error_at(raw, *token, "missing whitespace"));
        }
        dir = Some(parsed);
        rest = tail;
    }

    Ok((
        OrderKey {
            column: column.to_owned(),
            dir,
        },
        rest,
    ))
}

fn error_at(raw: &str, token: Token<'_>, reason: &str) -> Error {
    Error::orderby_syntax(truncate(&raw[token.start..]), reason)
}
