//! [`FuzzPattern`] definition.

use derive_more::Display;
use itertools::Itertools as _;
use postgres_types::{FromSql, ToSql};

/// `SIMILAR TO` pattern for fuzzy searching, e.g. bookings by a part of the
/// client's name.
///
/// Matches rows containing any whitespace-separated word of the input, with
/// all the pattern metacharacters of the input escaped.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct FuzzPattern(String);

impl FuzzPattern {
    /// Builds a new [`FuzzPattern`] out of the given `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self(format!(
            "({})",
            input.split_ascii_whitespace().format_with("|", |word, f| {
                f(&format_args!(
                    "%{}%",
                    word.replace('\\', r"\\")
                        .replace('%', r"\%")
                        .replace('|', r"\|")
                        .replace('*', r"\*")
                        .replace('+', r"\+")
                        .replace('?', r"\?")
                        .replace('{', r"\{")
                        .replace('}', r"\}")
                        .replace('(', r"\(")
                        .replace(')', r"\)")
                        .replace('[', r"\[")
                        .replace(']', r"\]")
                        .replace('_', r"\_")
                ))
            }),
        ))
    }
}

#[cfg(test)]
mod spec {
    use super::FuzzPattern;

    #[test]
    fn splits_words_into_alternatives() {
        assert_eq!(
            FuzzPattern::new("mario rossi").to_string(),
            "(%mario%|%rossi%)",
        );
    }

    #[test]
    fn escapes_metacharacters() {
        assert_eq!(
            FuzzPattern::new("100%_off").to_string(),
            r"(%100\%\_off%)",
        );
    }
}
