//! Angel number input normalization.
//!
//! Users type or dictate angel numbers either as digits (`111`) or as spoken
//! number words (`one-one-one`, `Four Four`). Everything stored downstream is
//! the canonical digit form: one to four ASCII digits.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of digits in a canonical angel number.
pub const MAX_DIGITS: usize = 4;

static CANONICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,4}$").expect("valid canonical pattern"));

static WORD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s-]+").expect("valid separator pattern"));

const NUMBER_WORDS: [(&str, char); 10] = [
    ("zero", '0'),
    ("one", '1'),
    ("two", '2'),
    ("three", '3'),
    ("four", '4'),
    ("five", '5'),
    ("six", '6'),
    ("seven", '7'),
    ("eight", '8'),
    ("nine", '9'),
];

/// Rejections produced while validating user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Nothing was entered
    #[error("Angel number is required")]
    Empty,

    /// A word outside the zero..nine vocabulary was used
    #[error("Could not read \"{word}\" as a number; enter digits (e.g. 111) or words (e.g. one-one-one)")]
    UnrecognizedWord { word: String },

    /// The input maps to more digits than allowed
    #[error("Angel numbers have at most {MAX_DIGITS} digits, got {digits}")]
    TooManyDigits { digits: usize },

    /// A stored value was not in canonical form
    #[error("Not a canonical angel number: {0:?}")]
    NotCanonical(String),

    /// A value outside a closed vocabulary
    #[error("Unknown {field} \"{value}\"; expected one of: {allowed}")]
    UnknownChoice {
        field: &'static str,
        value: String,
        allowed: String,
    },

    /// Notes exceed the allowed length
    #[error("Notes cannot exceed {max} characters (got {actual})")]
    NotesTooLong { max: usize, actual: usize },
}

/// A canonical angel number: one to four ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AngelNumber(String);

impl AngelNumber {
    /// Accept a value only if it is already canonical.
    pub fn from_canonical(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if CANONICAL.is_match(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::NotCanonical(value))
        }
    }

    /// Normalize free-form digits or number words into canonical form.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        parse_angel_number(input)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the digits (leading zeros are dropped).
    #[must_use]
    pub fn as_u32(&self) -> u32 {
        // At most four ASCII digits, so this cannot overflow.
        self.0
            .bytes()
            .fold(0, |acc, digit| acc * 10 + u32::from(digit - b'0'))
    }
}

impl fmt::Display for AngelNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AngelNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_angel_number(s)
    }
}

impl TryFrom<String> for AngelNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_canonical(value)
    }
}

impl From<AngelNumber> for String {
    fn from(value: AngelNumber) -> Self {
        value.0
    }
}

/// Convert angel number input into its canonical digit form.
///
/// Input that is entirely one to four ASCII digits is returned as is. Anything
/// else is read as number words separated by spaces or hyphens, matched
/// case-insensitively. Digits and words cannot be mixed, and inputs longer
/// than four digits are rejected rather than truncated.
///
/// # Examples
///
/// ```
/// use whisperlog_core::parse_angel_number;
///
/// assert_eq!(parse_angel_number("111").unwrap().as_str(), "111");
/// assert_eq!(parse_angel_number("one-one-one").unwrap().as_str(), "111");
/// assert!(parse_angel_number("11111").is_err());
/// ```
pub fn parse_angel_number(input: &str) -> Result<AngelNumber, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::Empty);
    }

    if CANONICAL.is_match(input) {
        return Ok(AngelNumber(input.to_string()));
    }
    if input.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ValidationError::TooManyDigits {
            digits: input.len(),
        });
    }

    let mut digits = String::new();
    for word in WORD_SEPARATOR.split(input).filter(|word| !word.is_empty()) {
        let digit = word_to_digit(word).ok_or_else(|| ValidationError::UnrecognizedWord {
            word: word.to_string(),
        })?;
        digits.push(digit);
    }

    if digits.is_empty() {
        return Err(ValidationError::Empty);
    }
    if digits.len() > MAX_DIGITS {
        return Err(ValidationError::TooManyDigits {
            digits: digits.len(),
        });
    }

    Ok(AngelNumber(digits))
}

fn word_to_digit(word: &str) -> Option<char> {
    let word = word.to_lowercase();
    NUMBER_WORDS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, digit)| *digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<String, ValidationError> {
        parse_angel_number(input).map(String::from)
    }

    #[test]
    fn digits_are_returned_unchanged() {
        for input in ["0", "7", "11", "111", "1111", "0000", "0123"] {
            assert_eq!(parse(input).unwrap(), input);
        }
    }

    #[test]
    fn hyphenated_words_map_to_digits() {
        assert_eq!(parse("one-one-one").unwrap(), "111");
        assert_eq!(parse("four-four-four-four").unwrap(), "4444");
        assert_eq!(parse("zero").unwrap(), "0");
    }

    #[test]
    fn words_are_case_insensitive_and_space_separated() {
        assert_eq!(parse("Seven Seven").unwrap(), "77");
        assert_eq!(parse("NINE - one  one").unwrap(), "911");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(parse("  222 ").unwrap(), "222");
        assert_eq!(parse(" two-two ").unwrap(), "22");
    }

    #[test]
    fn rejects_unknown_words() {
        assert_eq!(
            parse("abc"),
            Err(ValidationError::UnrecognizedWord {
                word: "abc".to_string()
            })
        );
        assert!(parse("one-eleven").is_err());
    }

    #[test]
    fn rejects_more_than_four_digits() {
        assert_eq!(
            parse("11111"),
            Err(ValidationError::TooManyDigits { digits: 5 })
        );
        assert_eq!(
            parse("one-one-one-one-one"),
            Err(ValidationError::TooManyDigits { digits: 5 })
        );
    }

    #[test]
    fn mixed_digits_and_words_are_not_supported() {
        assert!(parse("11-one").is_err());
        assert!(parse("one 1").is_err());
    }

    #[test]
    fn rejects_empty_and_separator_only_input() {
        assert_eq!(parse(""), Err(ValidationError::Empty));
        assert_eq!(parse("   "), Err(ValidationError::Empty));
        assert_eq!(parse("- -"), Err(ValidationError::Empty));
    }

    #[test]
    fn non_ascii_digits_are_not_canonical() {
        assert!(parse("١١١").is_err());
        assert!(AngelNumber::from_canonical("١١١").is_err());
    }

    #[test]
    fn from_canonical_is_strict() {
        assert!(AngelNumber::from_canonical("111").is_ok());
        assert!(AngelNumber::from_canonical("one").is_err());
        assert!(AngelNumber::from_canonical(" 111").is_err());
    }

    #[test]
    fn numeric_value_drops_leading_zeros() {
        assert_eq!(parse_angel_number("0111").unwrap().as_u32(), 111);
        assert_eq!(parse_angel_number("9999").unwrap().as_u32(), 9999);
    }

    #[test]
    fn serde_rejects_non_canonical_values() {
        let ok: AngelNumber = serde_json::from_str("\"444\"").unwrap();
        assert_eq!(ok.as_str(), "444");
        assert!(serde_json::from_str::<AngelNumber>("\"four\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"444\"");
    }
}
