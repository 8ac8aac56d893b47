//! Field-keyed validation errors.
//!
//! Every rejected request body or query string is reported as a map from
//! field name to the messages for that field, so clients can attach errors
//! to the right input.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// A collection of validation failures keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("{}", self.summary())]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an error set holding a single message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if at least one message was recorded for `field`.
    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Messages recorded for `field`, in insertion order.
    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Consumes the collection, returning `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Builds field errors from a deserialization failure rendered as
    /// `path: message`, the form a path-tracking serde error displays as.
    ///
    /// Failures that cannot be pinned to a field are reported under `body`.
    pub fn from_deserialize_error(detail: &str) -> Self {
        let detail = detail
            .rfind(" at line ")
            .map_or(detail, |idx| &detail[..idx]);

        if let Some(field) = detail
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next())
        {
            return Self::single(field, format!("The {} field is required.", label(field)));
        }

        match detail.split_once(": ") {
            Some((path, message)) if is_field_path(path) => {
                let field = path.split(['.', '[']).next().unwrap_or(path);
                let message = if message.contains("expected a string") {
                    format!("The {} field must be a string.", label(field))
                } else {
                    format!("The {} field is invalid.", label(field))
                };
                Self::single(field, message)
            }
            _ => Self::single("body", "The request body is invalid."),
        }
    }

    /// Human readable summary: the first message plus a count of the rest.
    pub fn summary(&self) -> String {
        let mut all = self.errors.values().flatten();
        let Some(first) = all.next() else {
            return "The given data was invalid.".to_string();
        };

        match all.count() {
            0 => first.clone(),
            1 => format!("{first} (and 1 more error)"),
            n => format!("{first} (and {n} more errors)"),
        }
    }
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn is_field_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_errors_convert_to_ok() {
        let errors = ValidationErrors::new();
        assert_eq!(errors.into_result(42), Ok(42));
    }

    #[test]
    fn test_messages_are_grouped_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "The title field is required.");
        errors.add("due_date", "The due date field must be a valid date.");
        errors.add("title", "The title field must not be greater than 255 characters.");

        assert!(errors.has("title"));
        assert_eq!(errors.messages("title").len(), 2);
        assert_eq!(errors.messages("missing"), &[] as &[String]);
    }

    #[test]
    fn test_summary_counts_remaining_errors() {
        let mut errors = ValidationErrors::single("email", "The email field is required.");
        assert_eq!(errors.summary(), "The email field is required.");

        errors.add("password", "The password field is required.");
        assert_eq!(
            errors.summary(),
            "The email field is required. (and 1 more error)"
        );

        errors.add("name", "The name field is required.");
        assert!(errors.to_string().ends_with("(and 2 more errors)"));
    }

    #[test]
    fn test_serializes_as_field_map() {
        let errors = ValidationErrors::single("title", "The title field is required.");
        let json = serde_json::to_value(&errors).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "errors": { "title": ["The title field is required."] } })
        );
    }

    #[test]
    fn test_wrong_type_is_reported_on_its_field() {
        let errors = ValidationErrors::from_deserialize_error(
            "due_date: invalid type: integer `5`, expected a string at line 1 column 15",
        );

        assert_eq!(
            errors.messages("due_date"),
            ["The due date field must be a string."]
        );
    }

    #[test]
    fn test_other_data_errors_are_invalid() {
        let errors =
            ValidationErrors::from_deserialize_error("title: invalid value: map, expected x");

        assert_eq!(errors.messages("title"), ["The title field is invalid."]);
    }

    #[test]
    fn test_missing_field_is_required() {
        let errors = ValidationErrors::from_deserialize_error("missing field `title`");

        assert_eq!(errors.messages("title"), ["The title field is required."]);
    }

    #[test]
    fn test_unlocated_error_falls_back_to_body() {
        let errors = ValidationErrors::from_deserialize_error(
            "invalid type: sequence, expected struct CreateTaskRequest at line 1 column 1",
        );

        assert_eq!(errors.messages("body"), ["The request body is invalid."]);
    }
}
