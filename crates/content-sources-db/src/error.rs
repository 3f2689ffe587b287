//! Database error types.

use thiserror::Error;

const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";

pub const DUPLICATE_URL_MESSAGE: &str = "Repository with this URL already belongs to organization";

#[derive(Debug, Error)]
pub enum DbError {
    /// Lookup miss, scoped by organization and id.
    #[error("{0}")]
    NotFound(String),

    /// Constraint or validation failure the caller can fix.
    #[error("{0}")]
    BadValidation(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return DbError::BadValidation(DUPLICATE_URL_MESSAGE.to_string());
                }
                Some(CHECK_VIOLATION) => {
                    return DbError::BadValidation(format!(
                        "Invalid value: {}",
                        db_err.constraint().unwrap_or("check constraint")
                    ));
                }
                _ => {}
            }
        }
        DbError::Database(err)
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;
