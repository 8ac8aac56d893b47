//! Task domain: the entity, request payloads, validation and list queries.

mod error;
mod operations;
mod pagination;
mod query;
mod requests;
mod types;

pub use error::TaskError;
pub use operations::{
    apply_update, build_task, parse_date, validate_due_date, validate_title, TITLE_MAX_CHARS,
};
pub use pagination::{last_page, PageLink, Paginated, TaskPage, PER_PAGE, TASKS_PATH};
pub use query::{compare_tasks, sort_tasks, ListTasksParams, SortDirection, TaskQuery};
pub use requests::{CreateTaskRequest, UpdateTaskRequest};
pub use types::Task;
