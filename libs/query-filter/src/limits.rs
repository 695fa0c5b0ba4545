//! Input size caps applied while parsing query options.
//!
//! These keep pathological requests from turning into huge predicate chains:
//! - Maximum `$filter` length in characters
//! - Maximum number of predicates in a `$filter`
//! - Maximum number of `$orderby` keys

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct QueryLimits {
    /// Maximum length of `$filter` in characters (default: 2000)
    pub max_filter_length: usize,
    /// Maximum number of predicates in `$filter` (default: 64)
    pub max_predicates: usize,
    /// Maximum number of keys in `$orderby` (default: 5)
    pub max_orderby_fields: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_filter_length: 2000,
            max_predicates: 64,
            max_orderby_fields: 5,
        }
    }
}

impl QueryLimits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_filter_length(mut self, max: usize) -> Self {
        self.max_filter_length = max;
        self
    }

    #[must_use]
    pub fn with_max_predicates(mut self, max: usize) -> Self {
        self.max_predicates = max;
        self
    }

    #[must_use]
    pub fn with_max_orderby_fields(mut self, max: usize) -> Self {
        self.max_orderby_fields = max;
        self
    }

    /// Validate a raw `$filter` length.
    ///
    /// # Errors
    /// Returns `Error::FilterSyntax` if the expression is too long.
    pub fn validate_filter_length(&self, raw: &str) -> Result<()> {
        if raw.chars().count() > self.max_filter_length {
            return Err(Error::filter_syntax(
                truncate(raw),
                format!(
                    "filter exceeds maximum length of {} characters",
                    self.max_filter_length
                ),
            ));
        }
        Ok(())
    }

    /// Validate the number of predicates parsed so far.
    ///
    /// # Errors
    /// Returns `Error::FilterSyntax` if `count` is above the cap.
    pub fn validate_predicate_count(&self, count: usize, fragment: &str) -> Result<()> {
        if count > self.max_predicates {
            return Err(Error::filter_syntax(
                truncate(fragment),
                format!("too many predicates (max: {})", self.max_predicates),
            ));
        }
        Ok(())
    }

    /// Validate the number of `$orderby` keys parsed so far.
    ///
    /// # Errors
    /// Returns `Error::OrderBySyntax` if `count` is above the cap.
    pub fn validate_orderby_count(&self, count: usize, fragment: &str) -> Result<()> {
        if count > self.max_orderby_fields {
            return Err(Error::orderby_syntax(
                truncate(fragment),
                format!("too many orderby fields (max: {})", self.max_orderby_fields),
            ));
        }
        Ok(())
    }
}

/// Shorten long client input before echoing it back in an error.
pub(crate) fn truncate(s: &str) -> String {
    const MAX_ECHO: usize = 64;
    match s.char_indices().nth(MAX_ECHO) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_owned(),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = QueryLimits::default();
        assert_eq!(limits.max_filter_length, 2000);
        assert_eq!(limits.max_predicates, 64);
        assert_eq!(limits.max_orderby_fields, 5);
    }

    #[test]
    fn test_validate_filter_length() {
        let limits = QueryLimits::default();
        assert!(limits.validate_filter_length("Rate eq 3").is_ok());
        let long_filter = "x".repeat(2001);
        let err = limits.validate_filter_length(&long_filter).unwrap_err();
        assert!(matches!(err, Error::FilterSyntax { .. }));
        assert!(err.fragment().unwrap().ends_with("..."));
    }

    #[test]
    fn test_validate_counts() {
        let limits = QueryLimits::new()
            .with_max_predicates(2)
            .with_max_orderby_fields(1);
        assert!(limits.validate_predicate_count(2, "").is_ok());
        assert!(limits.validate_predicate_count(3, "").is_err());
        assert!(limits.validate_orderby_count(1, "").is_ok());
        assert!(matches!(
            limits.validate_orderby_count(2, "Title"),
            Err(Error::OrderBySyntax { .. })
        ));
    }

    #[test]
    fn test_custom_filter_length() {
        let limits = QueryLimits::new().with_max_filter_length(5);
        assert!(limits.validate_filter_length("12345").is_ok());
        assert!(limits.validate_filter_length("123456").is_err());
    }

    #[test]
    fn test_truncate_short_input_unchanged() {
        assert_eq!(truncate("abc"), "abc");
        assert_eq!(truncate(&"y".repeat(70)).len(), 67);
    }
}
