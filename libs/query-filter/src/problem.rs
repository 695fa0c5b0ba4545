//! RFC 9457 Problem Details for rejected list queries (pure data, no HTTP
//! framework dependencies).

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::options::QueryOption;

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

mod status_as_u16 {
    use http::StatusCode;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
    pub fn serialize<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(status.as_u16())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StatusCode, D::Error> {
        let code = u16::deserialize(deserializer)?;
        StatusCode::from_u16(code).map_err(serde::de::Error::custom)
    }
}

/// Problem Details body for a query that could not be accepted.
///
/// Besides the RFC 9457 members it carries two extension members, `option`
/// and `fragment`, naming the query option and the part of the input that
/// was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    /// Serializes as u16.
    #[serde(with = "status_as_u16")]
    pub status: StatusCode,
    pub detail: String,
    /// Set by the HTTP layer, usually to the request path.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance: String,
    /// Machine-readable error code, e.g. `QUERY_INVALID_FILTER`.
    pub code: String,
    /// `$filter`, `$orderby`, `$top` or `$skip`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            option: None,
            fragment: None,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_option(mut self, option: QueryOption) -> Self {
        self.option = Some(option.as_str().to_owned());
        self
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }
}

/// Catalog entry for one kind of rejected query.
#[derive(Debug, Clone, Copy)]
pub struct ErrDef {
    pub status: StatusCode,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
    /// Option the error belongs to; `None` for server-side failures.
    pub option: Option<QueryOption>,
}

impl ErrDef {
    pub fn as_problem(&self, detail: impl Into<String>) -> Problem {
        let mut problem = Problem::new(self.status, self.title, detail)
            .with_code(self.code)
            .with_type(self.type_url);
        problem.option = self.option.map(|o| o.as_str().to_owned());
        problem
    }
}
