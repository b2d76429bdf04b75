//! Bangladeshi mobile phone numbers.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^01[3-9][0-9]{8}$").expect("Invalid regex"));

/// Error returned for anything that is not a local mobile number.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Please enter a valid Bangladeshi mobile number.")]
pub struct PhoneError;

/// An 11-digit Bangladeshi mobile number (`01[3-9]XXXXXXXX`).
///
/// ```
/// use afrah_core::Phone;
///
/// assert!(Phone::parse("01830989616").is_ok());
/// assert!(Phone::parse("01230989616").is_err());
/// assert!(Phone::parse("+8801830989616").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a phone number, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError`] when the input does not match the mobile format.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if MOBILE.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(PhoneError)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_every_operator_prefix() {
        for prefix in 3..=9 {
            assert!(Phone::parse(&format!("01{prefix}12345678")).is_ok());
        }
    }

    #[test]
    fn test_rejects_invalid() {
        assert_eq!(Phone::parse("01212345678"), Err(PhoneError));
        assert_eq!(Phone::parse("0171234567"), Err(PhoneError));
        assert_eq!(Phone::parse("017123456789"), Err(PhoneError));
        assert_eq!(Phone::parse("0171234567a"), Err(PhoneError));
        assert_eq!(Phone::parse(""), Err(PhoneError));
    }

    #[test]
    fn test_rejects_non_ascii_digits() {
        assert_eq!(Phone::parse("018৩০৯৮৯৬১৬"), Err(PhoneError));
        assert_eq!(Phone::parse("০১৮৩০৯৮৯৬১৬"), Err(PhoneError));
        assert_eq!(Phone::parse("0171234567٨"), Err(PhoneError));
    }

    #[test]
    fn test_trims() {
        assert_eq!(Phone::parse(" 01712345678 ").map(Phone::into_inner), Ok("01712345678".to_owned()));
    }

    #[test]
    fn test_message() {
        assert_eq!(
            PhoneError.to_string(),
            "Please enter a valid Bangladeshi mobile number."
        );
    }
}
