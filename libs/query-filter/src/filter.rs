//! `$filter` grammar: a flat chain of comparisons joined by `and` / `or`.
//!
//! ```text
//! filter     := predicate (WS conjunction WS predicate)*
//! predicate  := field WS operator WS value
//! operator   := eq | ne | gt | lt | ge | gte | le | lte
//! conjunction:= and | or            (case-insensitive)
//! value      := [0-9]+ | '[^']*'
//! ```
//!
//! The whole input must be explained by the grammar. Anything left over, an
//! unknown field, or a dangling conjunction rejects the filter as a whole.

use std::fmt;

use serde::Serialize;

use crate::errors::{Error, Result};
use crate::lexer::{Token, TokenKind, tokenize};
use crate::limits::{QueryLimits, truncate};
use crate::schema::FieldMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    /// Resolve an operator keyword (`eq`, `gte`, ...). Keywords are lowercase.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "eq" => CompareOp::Eq,
            "ne" => CompareOp::Ne,
            "gt" => CompareOp::Gt,
            "lt" => CompareOp::Lt,
            "ge" | "gte" => CompareOp::Ge,
            "le" | "lte" => CompareOp::Le,
            _ => return None,
        })
    }

    /// Canonical backend symbol.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("and") {
            Some(Conjunction::And)
        } else if word.eq_ignore_ascii_case("or") {
            Some(Conjunction::Or)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal from the filter, handed to the backend as a bound parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Integer(i64),
    String(String),
}

/// Renders the literal in query syntax. Integers are normalized, so `007`
/// displays as `7`.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::String(s) => write!(f, "'{s}'"),
        }
    }
}

/// One comparison of the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredicateNode {
    /// Physical column name.
    pub column: String,
    pub op: CompareOp,
    pub value: Literal,
    /// Connective to the next node; always `None` on the last node.
    pub conjunction: Option<Conjunction>,
}

/// Parsed `$filter`: predicates in source order plus the raw text they came
/// from, kept so continuation links can carry the filter verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    raw: String,
    nodes: Vec<PredicateNode>,
}

impl Filter {
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn nodes(&self) -> &[PredicateNode] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PredicateNode> {
        self.nodes.iter()
    }

    /// Literals in predicate order, i.e. bind order.
    pub fn values(&self) -> impl Iterator<Item = &Literal> {
        self.nodes.iter().map(|n| &n.value)
    }
}

impl<'a> IntoIterator for &'a Filter {
    type Item = &'a PredicateNode;
    type IntoIter = std::slice::Iter<'a, PredicateNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Parse a raw `$filter` value against `fields`.
///
/// Blank input means "no filter" and yields `Ok(None)`.
///
/// # Errors
/// Returns `Error::FilterSyntax` with the offending fragment when the input
/// is not fully explained by the grammar, references a field missing from
/// `fields`, or exceeds `limits`.
pub fn parse_filter(raw: &str, fields: &FieldMap, limits: &QueryLimits) -> Result<Option<Filter>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    limits.validate_filter_length(raw)?;

    let tokens = tokenize(raw)
        .map_err(|e| Error::filter_syntax(truncate(&raw[e.offset()..]), e.reason()))?;

    let mut parser = FilterParser {
        raw,
        tokens: &tokens,
        pos: 0,
        fields,
    };

    let mut nodes = Vec::new();
    loop {
        let (column, op, value) = parser.predicate()?;
        limits.validate_predicate_count(nodes.len() + 1, raw)?;

        let conjunction = parser.conjunction()?;
        let last = conjunction.is_none();
        nodes.push(PredicateNode {
            column,
            op,
            value,
            conjunction,
        });
        if last {
            break;
        }
    }

    Ok(Some(Filter {
        raw: raw.to_owned(),
        nodes,
    }))
}

struct FilterParser<'a, 't> {
    raw: &'a str,
    tokens: &'t [Token<'a>],
    pos: usize,
    fields: &'t FieldMap,
}

impl<'a> FilterParser<'a, '_> {
    fn predicate(&mut self) -> Result<(String, CompareOp, Literal)> {
        let field = self.expect("expected a field name")?;
        let column = match field.kind {
            TokenKind::Word(name) => self
                .fields
                .column(name)
                .ok_or_else(|| Error::filter_syntax(name, format!("unknown field `{name}`")))?,
            _ => return Err(self.error_at(field, "expected a field name")),
        };
        let column = column.to_owned();

        let op_token = self.expect("expected an operator")?;
        let op = match op_token.kind {
            TokenKind::Word(word) => CompareOp::from_keyword(word).ok_or_else(|| {
                Error::filter_syntax(word, format!("unsupported operator `{word}`"))
            })?,
            _ => return Err(self.error_at(op_token, "expected an operator")),
        };

        let value_token = self.expect("expected a value")?;
        let value = match value_token.kind {
            TokenKind::Integer(digits) => digits.parse::<i64>().map(Literal::Integer).map_err(
                |_| Error::filter_syntax(digits, "integer literal out of range"),
            )?,
            TokenKind::Quoted(s) => Literal::String(s.to_owned()),
            _ => {
                return Err(self.error_at(
                    value_token,
                    "expected an integer or a single-quoted string",
                ));
            }
        };

        Ok((column, op, value))
    }

    /// `None` at end of input; a connective must be followed by a predicate.
    fn conjunction(&mut self) -> Result<Option<Conjunction>> {
        let Some(token) = self.next() else {
            return Ok(None);
        };
        let conj = match token.kind {
            TokenKind::Word(word) => Conjunction::from_keyword(word),
            _ => None,
        };
        let Some(conj) = conj else {
            return Err(self.error_at(token, "expected `and` or `or`"));
        };
        if !token.spaced {
            return Err(self.error_at(token, "missing whitespace"));
        }
        if self.peek().is_none() {
            return Err(Error::filter_syntax(
                token.text,
                format!("dangling conjunction `{}`", token.text),
            ));
        }
        Ok(Some(conj))
    }

    fn expect(&mut self, what: &str) -> Result<Token<'a>> {
        let token = self.next().ok_or_else(|| {
            Error::filter_syntax(truncate(self.raw.trim()), format!("{what}, found end of input"))
        })?;
        if !token.spaced {
            return Err(self.error_at(token, "missing whitespace"));
        }
        Ok(token)
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    /// Error pointing at the remainder of the input starting at `token`.
    fn error_at(&self, token: Token<'_>, reason: &str) -> Error {
        Error::filter_syntax(truncate(&self.raw[token.start..]), reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> FieldMap {
        FieldMap::new()
            .insert("Title", "title")
            .insert("Rate", "rate")
            .insert("Genre", "genre")
    }

    fn parse(raw: &str) -> Result<Option<Filter>> {
        parse_filter(raw, &fields(), &QueryLimits::default())
    }

    fn node(column: &str, op: CompareOp, value: Literal, conj: Option<Conjunction>) -> PredicateNode {
        PredicateNode {
            column: column.to_owned(),
            op,
            value,
            conjunction: conj,
        }
    }

    #[test]
    fn parses_single_predicate() {
        let filter = parse("Rate gt 3").unwrap().unwrap();
        assert_eq!(
            filter.nodes(),
            &[node("rate", CompareOp::Gt, Literal::Integer(3), None)]
        );
        assert_eq!(filter.raw(), "Rate gt 3");
    }

    #[test]
    fn parses_chain_in_source_order() {
        let filter = parse("Title eq 'Dune' and Rate gt 3 OR Genre ne 'Horror'")
            .unwrap()
            .unwrap();
        assert_eq!(
            filter.nodes(),
            &[
                node(
                    "title",
                    CompareOp::Eq,
                    Literal::String("Dune".to_owned()),
                    Some(Conjunction::And)
                ),
                node(
                    "rate",
                    CompareOp::Gt,
                    Literal::Integer(3),
                    Some(Conjunction::Or)
                ),
                node(
                    "genre",
                    CompareOp::Ne,
                    Literal::String("Horror".to_owned()),
                    None
                ),
            ]
        );
    }

    #[test]
    fn every_operator_keyword_translates() {
        let cases = [
            ("eq", "="),
            ("ne", "!="),
            ("gt", ">"),
            ("lt", "<"),
            ("ge", ">="),
            ("gte", ">="),
            ("le", "<="),
            ("lte", "<="),
        ];
        for (keyword, symbol) in cases {
            let filter = parse(&format!("Rate {keyword} 1")).unwrap().unwrap();
            assert_eq!(filter.nodes()[0].op.symbol(), symbol, "keyword {keyword}");
        }
    }

    #[test]
    fn operators_are_lowercase_only() {
        assert!(matches!(parse("Rate EQ 1"), Err(Error::FilterSyntax { .. })));
    }

    #[test]
    fn conjunctions_are_case_insensitive() {
        let filter = parse("Rate gt 1 And Rate lt 9 oR Rate eq 5").unwrap().unwrap();
        let conjs: Vec<_> = filter.iter().map(|n| n.conjunction).collect();
        assert_eq!(
            conjs,
            vec![Some(Conjunction::And), Some(Conjunction::Or), None]
        );
    }

    #[test]
    fn blank_input_is_no_filter() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn unknown_field_is_rejected_with_its_name() {
        let err = parse("Title eq 'Dune' and Price lt 10").unwrap_err();
        assert_eq!(
            err,
            Error::FilterSyntax {
                fragment: "Price".to_owned(),
                reason: "unknown field `Price`".to_owned(),
            }
        );
    }

    #[test]
    fn column_names_are_not_field_names() {
        assert!(parse("rate gt 1").is_err());
    }

    #[test]
    fn unsupported_operator_is_rejected() {
        let err = parse("Title like 'Dune'").unwrap_err();
        assert_eq!(err.fragment(), Some("like"));
    }

    #[test]
    fn dangling_conjunction_is_rejected() {
        let err = parse("Rate gt 3 and").unwrap_err();
        assert!(matches!(err, Error::FilterSyntax { ref reason, .. } if reason.contains("dangling")));
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(parse("Rate gt 3 garbage").is_err());
        assert!(parse("Rate gt 3 Title eq 'x'").is_err());
        assert!(parse("Rate gt 3,").is_err());
    }

    #[test]
    fn incomplete_predicates_are_rejected() {
        assert!(parse("Rate").is_err());
        assert!(parse("Rate gt").is_err());
        assert!(parse("and Rate gt 1").is_err());
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(parse("Rate gt -1").is_err());
        assert!(parse("Rate gt 1.5").is_err());
        assert!(parse("Rate gt Title").is_err());
        assert!(parse("Rate gt 99999999999999999999").is_err());
        let err = parse("Title eq 'Dune").unwrap_err();
        assert!(matches!(err, Error::FilterSyntax { ref reason, .. } if reason.contains("unterminated")));
    }

    #[test]
    fn tokens_must_be_separated_by_whitespace() {
        assert!(parse("Rate gt 3and Rate lt 5").is_err());
        assert!(parse("Title eq 'a''b'").is_err());
    }

    #[test]
    fn string_literals_keep_their_content() {
        let filter = parse("Title eq 'Salt & Pepper, vol 2'").unwrap().unwrap();
        assert_eq!(
            filter.nodes()[0].value,
            Literal::String("Salt & Pepper, vol 2".to_owned())
        );
        assert_eq!(filter.nodes()[0].value.to_string(), "'Salt & Pepper, vol 2'");
    }

    #[test]
    fn integer_literals_are_normalized() {
        let filter = parse("Rate eq 007").unwrap().unwrap();
        assert_eq!(filter.nodes()[0].value, Literal::Integer(7));
        assert_eq!(filter.nodes()[0].value.to_string(), "7");
        assert_eq!(filter.raw(), "Rate eq 007");
    }

    #[test]
    fn conjunction_glued_to_a_string_literal_is_rejected() {
        let err = parse("Title eq 'Dune'and Rate gt 3").unwrap_err();
        assert_eq!(
            err,
            Error::FilterSyntax {
                fragment: "and Rate gt 3".to_owned(),
                reason: "missing whitespace".to_owned(),
            }
        );
        assert!(parse("Title eq 'Dune' and Rate gt 3").is_ok());
    }

    #[test]
    fn predicate_cap_is_enforced() {
        let limits = QueryLimits::new().with_max_predicates(2);
        let raw = "Rate gt 1 and Rate gt 2 and Rate gt 3";
        assert!(parse_filter(raw, &fields(), &limits).is_err());
        assert!(parse_filter("Rate gt 1 and Rate gt 2", &fields(), &limits).is_ok());
    }

    #[test]
    fn literals_serialize_as_plain_values() {
        assert_eq!(serde_json::to_string(&Literal::Integer(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&Literal::String("Dune".to_owned())).unwrap(),
            "\"Dune\""
        );
    }
}
