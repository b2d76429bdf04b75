//! Form validation results.
//!
//! Each field gets at most one message, the first rule it broke. Forms
//! re-render with these messages next to their inputs.

use std::collections::BTreeMap;

use serde::Serialize;

/// Field name to error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. A field keeps its first message.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Record `message` unless `value` has at least `min` characters after
    /// trimming.
    pub fn min_chars(&mut self, field: &'static str, value: &str, min: usize, message: &str) {
        if value.trim().chars().count() < min {
            self.add(field, message);
        }
    }

    /// Keep the value of `result`, recording its error under `field`.
    pub fn check<T, E: ToString>(&mut self, field: &'static str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Phone;

    #[test]
    fn test_first_message_wins() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Name must be at least 2 characters.");
        errors.add("name", "something else");
        assert_eq!(errors.get("name"), Some("Name must be at least 2 characters."));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_min_chars_counts_trimmed_characters() {
        let mut errors = ValidationErrors::new();
        errors.min_chars("name", "  A ", 2, "too short");
        errors.min_chars("city", "ঢাকা", 2, "too short");
        assert_eq!(errors.get("name"), Some("too short"));
        assert_eq!(errors.get("city"), None);
    }

    #[test]
    fn test_check_records_parse_error() {
        let mut errors = ValidationErrors::new();
        assert!(errors.check("phone", Phone::parse("12345")).is_none());
        assert!(errors.check("phone2", Phone::parse("01712345678")).is_some());
        assert_eq!(
            errors.get("phone"),
            Some("Please enter a valid Bangladeshi mobile number.")
        );
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_empty_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_display_joins_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("b", "two");
        errors.add("a", "one");
        assert_eq!(errors.to_string(), "a: one; b: two");
    }
}
