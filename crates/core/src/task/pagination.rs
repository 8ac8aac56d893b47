//! Page slices and the paginated list envelope.

use serde::{Deserialize, Serialize};

use super::types::Task;

/// Number of tasks per list page.
pub const PER_PAGE: usize = 10;

/// Path the list endpoint is mounted on. Page URLs are built from it.
pub const TASKS_PATH: &str = "/api/tasks";

const PREVIOUS_LABEL: &str = "&laquo; Previous";
const NEXT_LABEL: &str = "Next &raquo;";
const ON_EACH_SIDE: u32 = 3;

/// One page of tasks together with the total across all pages.
///
/// This is what repositories return and what the cache stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub total: usize,
}

impl TaskPage {
    pub fn new(tasks: Vec<Task>, total: usize) -> Self {
        Self { tasks, total }
    }

    /// Slices an already filtered and ordered list down to `page`.
    pub fn from_sorted(tasks: Vec<Task>, page: u32) -> Self {
        let total = tasks.len();
        let offset = (page.max(1) as usize - 1) * PER_PAGE;
        let tasks = tasks.into_iter().skip(offset).take(PER_PAGE).collect();
        Self { tasks, total }
    }
}

/// A navigation link in the paginated envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

impl PageLink {
    fn page(page: u32, current: u32) -> Self {
        Self {
            url: Some(page_url(page)),
            label: page.to_string(),
            active: page == current,
        }
    }

    fn separator() -> Self {
        Self {
            url: None,
            label: "...".to_string(),
            active: false,
        }
    }
}

/// Paginated list response body.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub current_page: u32,
    pub data: Vec<T>,
    pub first_page_url: String,
    pub from: Option<usize>,
    pub last_page: u32,
    pub last_page_url: String,
    pub links: Vec<PageLink>,
    pub next_page_url: Option<String>,
    pub path: String,
    pub per_page: usize,
    pub prev_page_url: Option<String>,
    pub to: Option<usize>,
    pub total: usize,
}

impl Paginated<Task> {
    /// Wraps a page slice in the envelope for `current_page`.
    pub fn from_page(page: TaskPage, current_page: u32) -> Self {
        let current_page = current_page.max(1);
        let total = page.total;
        let last_page = last_page(total);
        let count = page.tasks.len();

        let (from, to) = if count == 0 {
            (None, None)
        } else {
            let first = (current_page as usize - 1) * PER_PAGE + 1;
            (Some(first), Some(first + count - 1))
        };

        let prev_page_url = (current_page > 1).then(|| page_url(current_page - 1));
        let next_page_url = (current_page < last_page).then(|| page_url(current_page + 1));

        let mut links = Vec::new();
        links.push(PageLink {
            url: prev_page_url.clone(),
            label: PREVIOUS_LABEL.to_string(),
            active: false,
        });
        links.extend(page_window(current_page, last_page));
        links.push(PageLink {
            url: next_page_url.clone(),
            label: NEXT_LABEL.to_string(),
            active: false,
        });

        Self {
            current_page,
            data: page.tasks,
            first_page_url: page_url(1),
            from,
            last_page,
            last_page_url: page_url(last_page),
            links,
            next_page_url,
            path: TASKS_PATH.to_string(),
            per_page: PER_PAGE,
            prev_page_url,
            to,
            total,
        }
    }
}

/// Last page number for `total` items. Never less than 1.
pub fn last_page(total: usize) -> u32 {
    total.div_ceil(PER_PAGE).max(1) as u32
}

fn page_url(page: u32) -> String {
    format!("{TASKS_PATH}?page={page}")
}

/// Numbered links around `current`, with `...` separators once there are too
/// many pages to list them all.
fn page_window(current: u32, last: u32) -> Vec<PageLink> {
    let range = |start: u32, end: u32| (start..=end).map(move |p| PageLink::page(p, current));

    if last < ON_EACH_SIDE * 2 + 8 {
        return range(1, last).collect();
    }

    let window = ON_EACH_SIDE + 4;
    let mut links = Vec::new();
    if current <= window {
        links.extend(range(1, window + ON_EACH_SIDE));
        links.push(PageLink::separator());
        links.extend(range(last - 1, last));
    } else if current > last - window {
        links.extend(range(1, 2));
        links.push(PageLink::separator());
        links.extend(range(last - (window + ON_EACH_SIDE - 1), last));
    } else {
        links.extend(range(1, 2));
        links.push(PageLink::separator());
        links.extend(range(current - ON_EACH_SIDE, current + ON_EACH_SIDE));
        links.push(PageLink::separator());
        links.extend(range(last - 1, last));
    }
    links
}
