//! # query-filter-macros
//!
//! `#[derive(Queryable)]` for `query-filter` targets.
//!
//! The derive describes a struct's fields (in declaration order) so that
//! `query_filter::schema::FieldMap` can translate query-level field names to
//! storage columns. Generated code refers to `::query_filter`.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;
use syn::{DeriveInput, parse_macro_input};

mod queryable;

/// Derive `query_filter::schema::Queryable` for a struct with named fields.
///
/// Field attributes:
/// - `#[odata(column = "title")]`: the field can be used in `$filter` and
///   `$orderby` and maps to the `title` column
/// - `#[odata(name = "Title")]`: query-level name; defaults to the field
///   name in `UpperCamelCase`
/// - `#[odata(nested)]`: merge the queryable fields of the field's type,
///   which must itself implement `Queryable`
///
/// Only `pub` fields are exposed.
///
/// # Example
///
/// ```ignore
/// use query_filter_macros::Queryable;
///
/// #[derive(Queryable)]
/// pub struct Book {
///     #[odata(column = "title")]
///     pub title: String,
///     #[odata(name = "Stars", column = "rate")]
///     pub rate: i32,
///     #[odata(nested)]
///     pub author: Author,
/// }
/// ```
#[proc_macro_derive(Queryable, attributes(odata))]
#[proc_macro_error]
pub fn derive_queryable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    queryable::expand_derive_queryable(&input).into()
}
