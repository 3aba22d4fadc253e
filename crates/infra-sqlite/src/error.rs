// sqlx::Error -> AppError mapping

use lineup_core::error::AppError;

/// Store failures surface as `StoreUnavailable` (retryable); constraint
/// violations and schema mismatches map to `Internal`. The message keeps
/// the SQLite specifics for the logs.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            // SQLite error codes: https://www.sqlite.org/rescode.html
            match db_err.code().as_deref() {
                Some("2067") | Some("1555") => AppError::Internal(format!(
                    "Unique constraint violation: {}",
                    db_err.message()
                )),
                Some("19") | Some("275") | Some("787") | Some("1299") => AppError::Internal(
                    format!("Constraint violation: {}", db_err.message()),
                ),
                Some("5") => AppError::StoreUnavailable(format!(
                    "Database locked (SQLITE_BUSY): {}",
                    db_err.message()
                )),
                Some("6") => AppError::StoreUnavailable(format!(
                    "Table locked (SQLITE_LOCKED): {}",
                    db_err.message()
                )),
                Some("13") => {
                    AppError::StoreUnavailable(format!("Database full: {}", db_err.message()))
                }
                Some(code) => AppError::StoreUnavailable(format!(
                    "Database error [{}]: {}",
                    code,
                    db_err.message()
                )),
                None => AppError::StoreUnavailable(format!("Database error: {}", db_err.message())),
            }
        }
        sqlx::Error::PoolTimedOut => {
            AppError::StoreUnavailable("Timed out waiting for a connection".to_string())
        }
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Internal(format!("Column not found: {}", col))
        }
        _ => AppError::StoreUnavailable(err.to_string()),
    }
}
