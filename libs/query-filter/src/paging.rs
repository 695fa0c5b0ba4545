//! `$top` / `$skip` values.

use crate::errors::{Error, Result};
use crate::options::QueryOption;

/// Parse a raw `$top` or `$skip` value.
///
/// Absent or blank values yield `Ok(None)`. No upper bound is applied here;
/// capping `$top` is the paginator's job.
///
/// # Errors
/// Returns `Error::PageParam` when the trimmed value is not made of ASCII
/// digits only (signs, decimals and words are rejected) or overflows `u64`.
pub fn parse_page_param(raw: Option<&str>, option: QueryOption) -> Result<Option<u64>> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let invalid = || Error::PageParam {
        option,
        value: value.to_owned(),
    };

    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    value.parse::<u64>().map(Some).map_err(|_| invalid())
}
