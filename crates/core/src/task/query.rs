//! List filters, ordering and the cache fingerprint of a list query.
//!
//! A [`TaskQuery`] is the validated form of the list endpoint's query string.
//! Storage backends translate it into their own query language; the
//! in-memory predicate and ordering defined here are the reference semantics.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::serde::deserialize_optional_string;
use crate::validation::ValidationErrors;

use super::error::TaskError;
use super::operations::parse_date;
use super::pagination::PER_PAGE;
use super::types::Task;

/// Sort direction on `due_date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(TaskError::InvalidSort),
        }
    }
}

/// Raw query string parameters of `GET /tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTasksParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub due_date_from: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub due_date_to: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub page: Option<String>,
}

/// Validated list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    /// Case-insensitive substring matched against title or description.
    pub search: Option<String>,
    /// Inclusive lower bound on `due_date`.
    pub due_date_from: Option<NaiveDate>,
    /// Inclusive upper bound on `due_date`.
    pub due_date_to: Option<NaiveDate>,
    /// Explicitly requested direction. `None` means the default (`desc`).
    pub sort: Option<SortDirection>,
    /// 1-based page number.
    pub page: u32,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self::page(1)
    }
}

impl TaskQuery {
    /// An unfiltered query for the given page.
    pub fn page(page: u32) -> Self {
        Self {
            search: None,
            due_date_from: None,
            due_date_to: None,
            sort: None,
            page: page.max(1),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_due_date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.due_date_from = from;
        self.due_date_to = to;
        self
    }

    pub fn with_sort(mut self, sort: SortDirection) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Validates raw query parameters.
    ///
    /// Blank values count as absent. A missing, unparsable or non-positive
    /// page falls back to the first page.
    pub fn from_params(params: ListTasksParams) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let due_date_from = params.due_date_from.as_deref().and_then(|raw| {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                TaskError::InvalidDueDateFrom.record(&mut errors);
            }
            parsed
        });

        let due_date_to = params.due_date_to.as_deref().and_then(|raw| {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                TaskError::InvalidDueDateTo.record(&mut errors);
            }
            parsed
        });

        if let (Some(from), Some(to)) = (due_date_from, due_date_to) {
            if from > to {
                TaskError::InvalidDueDateRange.record(&mut errors);
            }
        }

        let sort = params
            .sort
            .as_deref()
            .and_then(|raw| raw.parse().map_err(|e: TaskError| e.record(&mut errors)).ok());

        let page = params
            .page
            .as_deref()
            .and_then(|raw| raw.parse::<u32>().ok())
            .unwrap_or(1);

        errors.into_result(Self {
            search: params.search,
            due_date_from,
            due_date_to,
            sort,
            page: page.max(1),
        })
    }

    /// Returns true if no filter or sort parameter is present.
    ///
    /// Only such queries are served from the cache; filtered views always
    /// reflect live state.
    pub fn is_cacheable(&self) -> bool {
        self.search.is_none()
            && self.due_date_from.is_none()
            && self.due_date_to.is_none()
            && self.sort.is_none()
    }

    /// Deterministic cache key component, or `None` for filtered queries.
    pub fn fingerprint(&self) -> Option<String> {
        self.is_cacheable().then(|| format!("page={}", self.page))
    }

    /// Effective sort direction.
    pub fn direction(&self) -> SortDirection {
        self.sort.unwrap_or_default()
    }

    /// Number of rows to skip for the requested page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * PER_PAGE
    }

    /// Returns true if `task` satisfies every filter. Filters combine with AND.
    ///
    /// Search compares Unicode-lowercased text, as the SQLite backend does.
    /// Tasks without a due date never satisfy a date bound.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&needle);
            let in_description = task
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }

        if let Some(from) = self.due_date_from {
            if !task.due_date.is_some_and(|d| d >= from) {
                return false;
            }
        }

        if let Some(to) = self.due_date_to {
            if !task.due_date.is_some_and(|d| d <= to) {
                return false;
            }
        }

        true
    }
}

/// Orders two tasks for a list response.
///
/// Tasks with a due date come first, ordered in `direction`; tasks without
/// one come last. Ties fall back to newest `created_at`, then id.
pub fn compare_tasks(a: &Task, b: &Task, direction: SortDirection) -> Ordering {
    let by_due_date = match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => match direction {
            SortDirection::Asc => x.cmp(&y),
            SortDirection::Desc => y.cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_due_date
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sorts tasks in place for a list response.
pub fn sort_tasks(tasks: &mut [Task], direction: SortDirection) {
    tasks.sort_by(|a, b| compare_tasks(a, b, direction));
}
