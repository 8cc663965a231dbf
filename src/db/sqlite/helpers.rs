//! Shared helper functions for SQLite repositories.

use sqlx::{QueryBuilder, Sqlite};

use crate::db::{DbError, PageQuery};

/// Map a sqlx error onto the store's error kinds.
///
/// Foreign key and CHECK failures become `Constraint`, everything else
/// is a generic `Database` failure.
pub fn storage_error(e: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_err) = &e
        && (db_err.is_foreign_key_violation()
            || db_err.is_check_violation()
            || db_err.is_unique_violation())
    {
        return DbError::Constraint {
            message: db_err.message().to_string(),
        };
    }

    DbError::Database {
        message: e.to_string(),
    }
}

/// Build a `LIKE` pattern matching `needle` anywhere, with `\` as the
/// escape character for literal `%`, `_` and `\`.
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Append `<column> LIKE ? ESCAPE '\'` for the query's search term, if any.
///
/// `has_where` tells whether a WHERE clause was already started.
pub fn push_search(
    builder: &mut QueryBuilder<'_, Sqlite>,
    column: &str,
    query: &PageQuery,
    has_where: bool,
) {
    if let Some(term) = query.search_term() {
        builder.push(if has_where { " AND " } else { " WHERE " });
        builder.push(column);
        builder.push(" LIKE ");
        builder.push_bind(like_pattern(term));
        builder.push(" ESCAPE '\\'");
    }
}

/// Append `LIMIT ? OFFSET ?` for the query's window.
pub fn push_limit_offset(builder: &mut QueryBuilder<'_, Sqlite>, query: &PageQuery) {
    builder.push(" LIMIT ");
    builder.push_bind(to_sql_int(query.limit()));
    builder.push(" OFFSET ");
    builder.push_bind(to_sql_int(query.offset()));
}

/// SQLite integers are signed 64-bit; saturate anything larger.
pub fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Convert a COUNT(*) result back to a length.
pub fn to_count(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}
