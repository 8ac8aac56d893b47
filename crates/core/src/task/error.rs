use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors that can occur when validating task input or list filters.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    #[error("The title field is required.")]
    TitleRequired,
    #[error("The title field must not be greater than 255 characters.")]
    TitleTooLong,
    #[error("The due date field must be a valid date.")]
    InvalidDueDate,
    #[error("The due date field must be a date after or equal to today.")]
    DueDateInPast,
    #[error("The due date from field must be a valid date.")]
    InvalidDueDateFrom,
    #[error("The due date to field must be a valid date.")]
    InvalidDueDateTo,
    #[error("The due date to field must be a date after or equal to due date from.")]
    InvalidDueDateRange,
    #[error("The selected sort is invalid.")]
    InvalidSort,
}

impl TaskError {
    /// Name of the request field this error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::TitleRequired | Self::TitleTooLong => "title",
            Self::InvalidDueDate | Self::DueDateInPast => "due_date",
            Self::InvalidDueDateFrom => "due_date_from",
            Self::InvalidDueDateTo | Self::InvalidDueDateRange => "due_date_to",
            Self::InvalidSort => "sort",
        }
    }

    /// Records this error under its field.
    pub fn record(self, errors: &mut ValidationErrors) {
        errors.add(self.field(), self.to_string());
    }
}

impl From<TaskError> for ValidationErrors {
    fn from(err: TaskError) -> Self {
        ValidationErrors::single(err.field(), err.to_string())
    }
}
