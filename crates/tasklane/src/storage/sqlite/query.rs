//! SQL assembly for the filtered task list.

use uuid::Uuid;

use tasklane_core::task::{SortDirection, TaskQuery, PER_PAGE};

use super::conversions::format_date;
use super::schema::TASK_COLUMNS;

/// A list query split into its count and page statements, sharing one set of
/// positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListStatement {
    pub count_sql: String,
    pub select_sql: String,
    pub params: Vec<String>,
}

/// Escapes `LIKE` wildcards so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// SQL function registered on every connection that lowercases with full
/// Unicode case mapping. The built-in `lower()` and `LIKE` only fold ASCII.
pub const UNICODE_LOWER: &str = "unicode_lower";

/// Builds the statements for one page of `owner`'s tasks.
///
/// The search term is lowercased here and compared against
/// `unicode_lower(column)`, matching the in-memory backend.
pub fn build_list_statement(owner: Uuid, query: &TaskQuery) -> ListStatement {
    let mut clauses = vec!["user_id = ?1".to_string()];
    let mut params = vec![owner.to_string()];

    if let Some(search) = &query.search {
        params.push(format!("%{}%", escape_like(&search.to_lowercase())));
        let n = params.len();
        clauses.push(format!(
            "({UNICODE_LOWER}(title) LIKE ?{n} ESCAPE '\\' \
             OR {UNICODE_LOWER}(description) LIKE ?{n} ESCAPE '\\')"
        ));
    }

    if let Some(from) = query.due_date_from {
        params.push(format_date(&from));
        clauses.push(format!("due_date >= ?{}", params.len()));
    }

    if let Some(to) = query.due_date_to {
        params.push(format_date(&to));
        clauses.push(format!("due_date <= ?{}", params.len()));
    }

    let where_clause = clauses.join(" AND ");
    let direction = match query.direction() {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };

    let count_sql = format!("SELECT COUNT(*) FROM tasks WHERE {where_clause}");
    let select_sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE {where_clause} \
         ORDER BY due_date IS NULL, due_date {direction}, created_at DESC, id ASC \
         LIMIT {PER_PAGE} OFFSET {offset}",
        offset = query.offset(),
    );

    ListStatement {
        count_sql,
        select_sql,
        params,
    }
}
