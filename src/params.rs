//! Typed decoding of captured path segments.
//!
//! [`decode`] parses every requested segment, even after one has failed, and
//! then reports the first failure in the order the names were given. The
//! order is the array the caller passes in, never the map's iteration order.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! let raw = HashMap::from([
//!     ("user".to_owned(), "7".to_owned()),
//!     ("book".to_owned(), "9".to_owned()),
//! ]);
//! let [user, book] = httpcmp::params::decode::<i64, 2>(&raw, ["user", "book"]).unwrap();
//! assert_eq!((user, book), (7, 9));
//! ```

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

use crate::outcome::{Category, Classify, Failure};

/// A path segment that could not be turned into the requested type.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DecodeError {
    #[error("missing path parameter `{0}`")]
    Missing(String),

    #[error("invalid path parameter `{name}`: parsing {value:?}: {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

impl DecodeError {
    /// Name of the offending segment.
    pub fn name(&self) -> &str {
        match self {
            Self::Missing(name) | Self::Invalid { name, .. } => name,
        }
    }
}

impl Classify for DecodeError {
    fn category(&self) -> Category {
        Category::BadRequest
    }
}

impl From<DecodeError> for Failure {
    fn from(err: DecodeError) -> Self {
        Failure::classify(&err)
    }
}

/// Decodes `names` from `params`, returning values in the same order.
///
/// All segments are parsed. On failure the first error in `names` order is
/// returned and the rest are dropped. Use [`decode_all`] to keep them.
pub fn decode<T, const N: usize>(
    params: &HashMap<String, String>,
    names: [&str; N],
) -> Result<[T; N], DecodeError>
where
    T: FromStr + Default,
    T::Err: Display,
{
    let mut first = None;
    let values = parse_all::<T, N>(params, names).map(|parsed| {
        parsed.unwrap_or_else(|err| {
            if first.is_none() {
                first = Some(err);
            }
            T::default()
        })
    });

    match first {
        Some(err) => Err(err),
        None => Ok(values),
    }
}

/// Like [`decode`], but reports every failure, in `names` order.
pub fn decode_all<T, const N: usize>(
    params: &HashMap<String, String>,
    names: [&str; N],
) -> Result<[T; N], Vec<DecodeError>>
where
    T: FromStr + Default,
    T::Err: Display,
{
    let mut errors = Vec::new();
    let values = parse_all::<T, N>(params, names).map(|parsed| {
        parsed.unwrap_or_else(|err| {
            errors.push(err);
            T::default()
        })
    });

    if errors.is_empty() { Ok(values) } else { Err(errors) }
}

fn parse_all<T, const N: usize>(
    params: &HashMap<String, String>,
    names: [&str; N],
) -> [Result<T, DecodeError>; N]
where
    T: FromStr,
    T::Err: Display,
{
    names.map(|name| parse_segment(params, name))
}

fn parse_segment<T>(params: &HashMap<String, String>, name: &str) -> Result<T, DecodeError>
where
    T: FromStr,
    T::Err: Display,
{
    let value = params
        .get(name)
        .ok_or_else(|| DecodeError::Missing(name.to_owned()))?;

    value.parse().map_err(|e: T::Err| DecodeError::Invalid {
        name: name.to_owned(),
        value: value.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn raw(user: &str, book: &str) -> HashMap<String, String> {
        HashMap::from([
            ("user".to_owned(), user.to_owned()),
            ("book".to_owned(), book.to_owned()),
        ])
    }

    thread_local! {
        static PARSED: Cell<usize> = const { Cell::new(0) };
    }

    /// An integer that counts how many times it has been parsed on this thread.
    #[derive(Debug, Default)]
    struct Counted(i64);

    impl FromStr for Counted {
        type Err = std::num::ParseIntError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            PARSED.with(|n| n.set(n.get() + 1));
            s.parse().map(Counted)
        }
    }

    #[test]
    fn decodes_valid_integers() {
        let [user, book] = decode::<i64, 2>(&raw("1", "1"), ["user", "book"]).unwrap();
        assert_eq!((user, book), (1, 1));

        let [user, book] = decode::<i64, 2>(&raw("-42", "9000000000"), ["user", "book"]).unwrap();
        assert_eq!((user, book), (-42, 9_000_000_000));
    }

    #[test]
    fn reports_the_failing_segment() {
        let err = decode::<i64, 2>(&raw("a", "1"), ["user", "book"]).unwrap_err();
        assert_eq!(err.name(), "user");
        assert!(err.to_string().contains("\"a\""));

        let err = decode::<i64, 2>(&raw("1", "b"), ["user", "book"]).unwrap_err();
        assert_eq!(err.name(), "book");
    }

    #[test]
    fn first_error_wins_in_name_order() {
        let err = decode::<i64, 2>(&raw("a", "b"), ["user", "book"]).unwrap_err();
        assert_eq!(err.name(), "user");

        let err = decode::<i64, 2>(&raw("a", "b"), ["book", "user"]).unwrap_err();
        assert_eq!(err.name(), "book");
    }

    #[test]
    fn parses_every_segment_after_a_failure() {
        PARSED.with(|n| n.set(0));
        let err = decode::<Counted, 2>(&raw("a", "1"), ["user", "book"]).unwrap_err();
        assert_eq!(err.name(), "user");
        assert_eq!(PARSED.with(Cell::get), 2);
    }

    #[test]
    fn missing_segment_is_reported() {
        let params = HashMap::from([("user".to_owned(), "1".to_owned())]);
        let err = decode::<i64, 2>(&params, ["user", "book"]).unwrap_err();
        assert_eq!(err, DecodeError::Missing("book".to_owned()));
    }

    #[test]
    fn decode_all_keeps_every_error() {
        let errs = decode_all::<i64, 2>(&raw("a", "b"), ["user", "book"]).unwrap_err();
        let names: Vec<_> = errs.iter().map(DecodeError::name).collect();
        assert_eq!(names, ["user", "book"]);

        assert_eq!(decode_all::<i64, 2>(&raw("3", "4"), ["user", "book"]).unwrap(), [3, 4]);
    }

    #[test]
    fn classifies_as_bad_request() {
        let failure: Failure = DecodeError::Missing("user".to_owned()).into();
        assert_eq!(failure.category(), Category::BadRequest);
        assert_eq!(failure.message(), "missing path parameter `user`");
    }
}
