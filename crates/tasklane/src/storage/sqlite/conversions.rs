//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Row;
use uuid::Uuid;

use tasklane_core::task::Task;
use tasklane_core::user::User;

/// Convert a SQLite row to a User.
///
/// Expected columns: id, name, email, password_hash, created_at, updated_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;

    Ok(User {
        id: parse_uuid(&id)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Convert a SQLite row to a Task.
///
/// Expected columns: id, user_id, title, description, due_date, created_at, updated_at
pub fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let due_date: Option<String> = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Task {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        title: row.get(2)?,
        description: row.get(3)?,
        due_date: due_date.as_deref().map(parse_date).transpose()?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

fn conversion_error<E>(err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(conversion_error)
}

/// Parse a date from ISO 8601 string (YYYY-MM-DD).
fn parse_date(s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(conversion_error)
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(conversion_error)
}

/// Format a DateTime<Utc> for SQLite storage.
///
/// Fixed-width nanosecond RFC 3339 with a `Z` suffix, so text comparison in
/// `ORDER BY created_at` agrees with chronological order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Format a NaiveDate for SQLite storage (YYYY-MM-DD).
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_datetime_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let fractional = whole + chrono::Duration::microseconds(1);

        let a = format_datetime(&whole);
        let b = format_datetime(&fractional);

        assert_eq!(a, "2024-01-02T03:04:05.000000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2030, 7, 4).unwrap();
        assert_eq!(format_date(&date), "2030-07-04");
    }

    #[test]
    fn test_parse_datetime_round_trip() {
        let now = Utc::now();
        assert_eq!(parse_datetime(&format_datetime(&now)).unwrap(), now);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_uuid("not-a-uuid").is_err());
        assert!(parse_date("2030-13-01").is_err());
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn test_row_to_task() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();

        let task = conn
            .query_row(
                "SELECT ?1, ?2, 'Title', NULL, '2030-01-15', \
                 '2024-01-01T00:00:00.000000000Z', '2024-01-01T00:00:00.000000000Z'",
                [id.to_string(), owner.to_string()],
                row_to_task,
            )
            .unwrap();

        assert_eq!(task.id, id);
        assert_eq!(task.user_id, owner);
        assert_eq!(task.title, "Title");
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2030, 1, 15));
    }
}
