//! Error taxonomy for the query-filter subsystem.
//!
//! Every variant is terminal for the current request. None of them are retried
//! internally; the HTTP layer maps them to a Problem response (see
//! `problem_mapping`).

use crate::options::QueryOption;

/// Unified error type for parsing and validating list-endpoint query options.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Field metadata cannot be derived from the target type.
    ///
    /// This is a wiring error: a handler asked for a field map of something
    /// that is not a struct, or of a struct that nests itself.
    #[error("invalid target type `{type_name}`: {reason}")]
    InvalidTargetType {
        type_name: String,
        reason: &'static str,
    },

    #[error("invalid $filter near `{fragment}`: {reason}")]
    FilterSyntax { fragment: String, reason: String },

    #[error("invalid $orderby near `{fragment}`: {reason}")]
    OrderBySyntax { fragment: String, reason: String },

    #[error("invalid {option} value `{value}`: expected a non-negative integer")]
    PageParam { option: QueryOption, value: String },
}

impl Error {
    pub(crate) fn filter_syntax(fragment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FilterSyntax {
            fragment: fragment.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn orderby_syntax(fragment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OrderBySyntax {
            fragment: fragment.into(),
            reason: reason.into(),
        }
    }

    /// The part of the client input that caused the failure, if any.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Error::InvalidTargetType { .. } => None,
            Error::FilterSyntax { fragment, .. } | Error::OrderBySyntax { fragment, .. } => {
                Some(fragment)
            }
            Error::PageParam { value, .. } => Some(value),
        }
    }

    /// Whether the error was caused by client input rather than server wiring.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::InvalidTargetType { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
