//! Mapping from query errors to Problem (pure data)
//!
//! The HTTP layer adds the instance path before serializing the Problem as
//! `application/problem+json`.

use http::StatusCode;

use crate::errors::Error;
use crate::options::QueryOption;
use crate::problem::{ErrDef, Problem};

const INVALID_FILTER: ErrDef = ErrDef {
    status: StatusCode::BAD_REQUEST,
    title: "Invalid Filter",
    code: "QUERY_INVALID_FILTER",
    type_url: "https://errors.cyberfabric.io/query/invalid-filter",
    option: Some(QueryOption::Filter),
};

const INVALID_ORDERBY: ErrDef = ErrDef {
    status: StatusCode::BAD_REQUEST,
    title: "Invalid OrderBy",
    code: "QUERY_INVALID_ORDERBY",
    type_url: "https://errors.cyberfabric.io/query/invalid-orderby",
    option: Some(QueryOption::OrderBy),
};

const INVALID_TOP: ErrDef = ErrDef {
    status: StatusCode::BAD_REQUEST,
    title: "Invalid Top",
    code: "QUERY_INVALID_TOP",
    type_url: "https://errors.cyberfabric.io/query/invalid-top",
    option: Some(QueryOption::Top),
};

const INVALID_SKIP: ErrDef = ErrDef {
    status: StatusCode::BAD_REQUEST,
    title: "Invalid Skip",
    code: "QUERY_INVALID_SKIP",
    type_url: "https://errors.cyberfabric.io/query/invalid-skip",
    option: Some(QueryOption::Skip),
};

const INTERNAL: ErrDef = ErrDef {
    status: StatusCode::INTERNAL_SERVER_ERROR,
    title: "Internal Server Error",
    code: "QUERY_INTERNAL",
    type_url: "https://errors.cyberfabric.io/query/internal",
    option: None,
};

impl From<Error> for Problem {
    fn from(err: Error) -> Self {
        let def = match &err {
            Error::FilterSyntax { .. } => INVALID_FILTER,
            Error::OrderBySyntax { .. } => INVALID_ORDERBY,
            Error::PageParam {
                option: QueryOption::Skip,
                ..
            } => INVALID_SKIP,
            Error::PageParam { .. } => INVALID_TOP,
            // Type name is logged, not echoed to the client.
            Error::InvalidTargetType { type_name, reason } => {
                tracing::error!(type_name = type_name.as_str(), reason, "list query on an invalid target type");
                return INTERNAL.as_problem("An internal error occurred while processing the query");
            }
        };

        let mut problem = def.as_problem(err.to_string());
        problem.fragment = err.fragment().map(str::to_owned);
        problem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_error_converts_to_problem() {
        let err = Error::FilterSyntax {
            fragment: "Price".to_owned(),
            reason: "unknown field `Price`".to_owned(),
        };
        let problem: Problem = err.into();

        assert_eq!(problem.status, StatusCode::BAD_REQUEST);
        assert_eq!(problem.title, "Invalid Filter");
        assert!(problem.detail.contains("Price"));
        assert_eq!(problem.code, "QUERY_INVALID_FILTER");
        assert_eq!(problem.option.as_deref(), Some("$filter"));
        assert_eq!(problem.fragment.as_deref(), Some("Price"));
    }

    #[test]
    fn orderby_error_converts_to_problem() {
        let problem: Problem = Error::OrderBySyntax {
            fragment: "Rate down".to_owned(),
            reason: "unsupported direction `down`".to_owned(),
        }
        .into();

        assert_eq!(problem.status, StatusCode::BAD_REQUEST);
        assert_eq!(problem.title, "Invalid OrderBy");
        assert!(problem.detail.contains("Rate down"));
    }

    #[test]
    fn page_param_errors_name_the_option() {
        let top: Problem = Error::PageParam {
            option: QueryOption::Top,
            value: "abc".to_owned(),
        }
        .into();
        assert_eq!(top.code, "QUERY_INVALID_TOP");
        assert!(top.detail.contains("abc"));

        let skip: Problem = Error::PageParam {
            option: QueryOption::Skip,
            value: "-1".to_owned(),
        }
        .into();
        assert_eq!(skip.code, "QUERY_INVALID_SKIP");
        assert_eq!(skip.fragment.as_deref(), Some("-1"));
        assert_eq!(skip.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_target_type_is_a_server_error() {
        let problem: Problem = Error::InvalidTargetType {
            type_name: "u32".to_owned(),
            reason: "not a struct",
        }
        .into();
        assert_eq!(problem.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!problem.detail.contains("u32"));
        assert_eq!(problem.option, None);
        assert_eq!(problem.fragment, None);
    }
}
