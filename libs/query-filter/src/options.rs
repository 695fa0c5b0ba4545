//! Extraction of the raw `$filter`, `$orderby`, `$top` and `$skip` values
//! from a URL query component.
//!
//! The extractor works on the raw (still percent-encoded) query string rather
//! than on decoded key/value pairs. A value normally ends at the next `&`.
//! Inside a single-quoted `$filter` literal (quote written as `'` or `%27`)
//! an `&` only ends the value when it introduces another `$`-prefixed
//! option, so `'Salt & Pepper'` survives unencoded.

use std::borrow::Cow;
use std::fmt;

pub const OPTION_FILTER: &str = "$filter";
pub const OPTION_ORDERBY: &str = "$orderby";
pub const OPTION_TOP: &str = "$top";
pub const OPTION_SKIP: &str = "$skip";

/// The four recognized query options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryOption {
    Filter,
    OrderBy,
    Top,
    Skip,
}

impl QueryOption {
    pub const ALL: [QueryOption; 4] = [
        QueryOption::Filter,
        QueryOption::OrderBy,
        QueryOption::Top,
        QueryOption::Skip,
    ];

    /// The literal option name as it appears in a URL, e.g. `$filter`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QueryOption::Filter => OPTION_FILTER,
            QueryOption::OrderBy => OPTION_ORDERBY,
            QueryOption::Top => OPTION_TOP,
            QueryOption::Skip => OPTION_SKIP,
        }
    }

    /// Resolve an option from its literal name (exact, case-sensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str() == name)
    }
}

impl fmt::Display for QueryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the decoded value of `option` from a raw query string.
///
/// A leading `?` is ignored. Returns `None` when the option is absent or its
/// value is blank; extraction itself never fails. When an option is repeated
/// the first occurrence wins.
#[must_use]
pub fn extract_option(query: &str, option: QueryOption) -> Option<String> {
    let param = params(query).find(|p| p.option == Some(option))?;
    let decoded = decode_component(param.value);

    if decoded.trim().is_empty() {
        None
    } else {
        Some(decoded.into_owned())
    }
}

/// One `key=value` parameter of a raw query string.
struct Param<'a> {
    /// Set when the key is one of the recognized options.
    option: Option<QueryOption>,
    /// The whole parameter as written, key included.
    text: &'a str,
    /// Still-encoded value of a recognized option.
    value: &'a str,
}

/// Split a raw query string into parameters, left to right.
fn params(query: &str) -> impl Iterator<Item = Param<'_>> {
    let mut rest = Some(query.strip_prefix('?').unwrap_or(query));
    std::iter::from_fn(move || {
        let current = rest?;
        let recognized = QueryOption::ALL
            .into_iter()
            .find_map(|opt| key_len(current, opt.as_str()).map(|len| (opt, len)));

        let (end, value) = match recognized {
            Some((opt, len)) => {
                let value_len = value_end(&current[len..], opt);
                (len + value_len, &current[len..len + value_len])
            }
            None => (current.find('&').unwrap_or(current.len()), ""),
        };
        rest = current.get(end + 1..);

        Some(Param {
            option: recognized.map(|(opt, _)| opt),
            text: &current[..end],
            value,
        })
    })
}

/// If `segment` starts with `<name>=` (with the `$` optionally written as
/// `%24`), return the length of that key including the `=`.
fn key_len(segment: &str, name: &str) -> Option<usize> {
    let bare = name.strip_prefix('$')?;
    let after_dollar = if segment.starts_with('$') {
        1
    } else if starts_with_ignore_case(segment, "%24") {
        3
    } else {
        return None;
    };

    let tail = &segment[after_dollar..];
    let tail = tail.strip_prefix(bare)?;
    tail.starts_with('=').then_some(after_dollar + bare.len() + 1)
}

/// Length of the value of `option` at the start of `rest`.
fn value_end(rest: &str, option: QueryOption) -> usize {
    let bytes = rest.as_bytes();
    let mut quoted = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' if option == QueryOption::Filter => quoted = !quoted,
            b'%' if option == QueryOption::Filter && starts_with_ignore_case(&rest[i..], "%27") => {
                quoted = !quoted;
                i += 3;
                continue;
            }
            b'&' if !quoted || starts_option(&rest[i + 1..]) => return i,
            _ => {}
        }
        i += 1;
    }
    rest.len()
}

fn starts_option(s: &str) -> bool {
    s.starts_with('$') || starts_with_ignore_case(s, "%24")
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Query parameters that are not one of the recognized options, in their
/// original order and encoding.
pub(crate) fn foreign_params(query: &str) -> Vec<&str> {
    params(query)
        .filter(|p| p.option.is_none() && !p.text.is_empty())
        .map(|p| p.text)
        .collect()
}

/// Percent-encode an option value so that `extract_option` reads it back
/// unchanged; `&`, `$`, `+` and spaces never survive unescaped.
pub(crate) fn encode_component(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Form-url decoding: `+` is a space, `%XX` sequences are bytes. Invalid
/// UTF-8 is replaced rather than rejected; the grammar parsers reject it later.
fn decode_component(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['+', '%']) {
        return Cow::Borrowed(raw);
    }
    let spaced = raw.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_each_option_independently() {
        let q = "$filter=Rate gt 3&$orderby=Rate desc&$top=5&$skip=10";
        assert_eq!(
            extract_option(q, QueryOption::Filter).as_deref(),
            Some("Rate gt 3")
        );
        assert_eq!(
            extract_option(q, QueryOption::OrderBy).as_deref(),
            Some("Rate desc")
        );
        assert_eq!(extract_option(q, QueryOption::Top).as_deref(), Some("5"));
        assert_eq!(extract_option(q, QueryOption::Skip).as_deref(), Some("10"));
    }

    #[test]
    fn absent_and_empty_options_are_none() {
        assert_eq!(extract_option("", QueryOption::Filter), None);
        assert_eq!(extract_option("page=2&sort=x", QueryOption::Top), None);
        assert_eq!(extract_option("$top=&$skip=3", QueryOption::Top), None);
        assert_eq!(extract_option("$filter=%20%20", QueryOption::Filter), None);
    }

    #[test]
    fn leading_question_mark_is_ignored() {
        assert_eq!(
            extract_option("?$top=7", QueryOption::Top).as_deref(),
            Some("7")
        );
    }

    #[test]
    fn option_name_must_match_exactly() {
        assert_eq!(extract_option("$topx=1", QueryOption::Top), None);
        assert_eq!(
            extract_option("$topx=1&$top=2", QueryOption::Top).as_deref(),
            Some("2")
        );
        assert_eq!(extract_option("x$top=1", QueryOption::Top), None);
    }

    #[test]
    fn ampersand_inside_value_does_not_end_it() {
        let q = "$filter=Title eq 'Salt & Pepper'&$top=3";
        assert_eq!(
            extract_option(q, QueryOption::Filter).as_deref(),
            Some("Title eq 'Salt & Pepper'")
        );
        assert_eq!(extract_option(q, QueryOption::Top).as_deref(), Some("3"));
    }

    #[test]
    fn percent_encoded_values_and_keys_are_decoded() {
        let q = "%24filter=Title%20eq%20%27Dune%27&%24top=5&$orderby=Rate+desc";
        assert_eq!(
            extract_option(q, QueryOption::Filter).as_deref(),
            Some("Title eq 'Dune'")
        );
        assert_eq!(extract_option(q, QueryOption::Top).as_deref(), Some("5"));
        assert_eq!(
            extract_option(q, QueryOption::OrderBy).as_deref(),
            Some("Rate desc")
        );
    }

    #[test]
    fn plain_parameters_after_an_option_are_not_part_of_its_value() {
        let q = "$top=5&page=2&$orderby=Rate desc&sort=x";
        assert_eq!(extract_option(q, QueryOption::Top).as_deref(), Some("5"));
        assert_eq!(
            extract_option(q, QueryOption::OrderBy).as_deref(),
            Some("Rate desc")
        );
        assert_eq!(
            extract_option("$filter=Rate gt 3&page=2", QueryOption::Filter).as_deref(),
            Some("Rate gt 3")
        );
    }

    #[test]
    fn ampersand_in_a_quoted_literal_ends_only_at_the_next_option() {
        let q = "$filter=Title eq 'Salt & Pepper' and Rate gt 1&page=2";
        assert_eq!(
            extract_option(q, QueryOption::Filter).as_deref(),
            Some("Title eq 'Salt & Pepper' and Rate gt 1")
        );

        let encoded = "$filter=Title%20eq%20%27a&b%27&page=2&$top=1";
        assert_eq!(
            extract_option(encoded, QueryOption::Filter).as_deref(),
            Some("Title eq 'a&b'")
        );
        assert_eq!(extract_option(encoded, QueryOption::Top).as_deref(), Some("1"));
    }

    #[test]
    fn first_occurrence_wins() {
        assert_eq!(
            extract_option("$top=1&$top=2", QueryOption::Top).as_deref(),
            Some("1")
        );
    }

    #[test]
    fn option_names_round_trip() {
        for opt in QueryOption::ALL {
            assert_eq!(QueryOption::from_name(opt.as_str()), Some(opt));
        }
        assert_eq!(QueryOption::from_name("$select"), None);
    }

    #[test]
    fn foreign_params_drop_recognized_options() {
        let q = "?page=2&$filter=Title eq 'a & b'&$select=Title&%24top=5&$skip=1";
        assert_eq!(foreign_params(q), vec!["page=2", "$select=Title"]);
        assert_eq!(
            foreign_params("$top=5&page=2&$filter=Rate gt 3&sort=x"),
            vec!["page=2", "sort=x"]
        );
        assert!(foreign_params("$top=1").is_empty());
        assert!(foreign_params("").is_empty());
    }

    #[test]
    fn encoded_values_read_back_unchanged() {
        let raw = "Title eq 'Salt & Pepper' and Rate gt 1+1 $x";
        let q = format!("$filter={}&$top=2", encode_component(raw));
        assert_eq!(extract_option(&q, QueryOption::Filter).as_deref(), Some(raw));
        assert_eq!(extract_option(&q, QueryOption::Top).as_deref(), Some("2"));
    }
}
