use crate::errors::ApiError;

pub mod address;
pub mod admin;
pub mod card;
pub mod course;
pub mod enrollment;
pub mod student;
pub mod teacher;
pub mod video;

/// Unique-constraint violations surface as 409s with a domain message; the
/// in-transaction existence checks catch the common case, this catches the
/// race the checks cannot.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> ApiError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::conflict(message.to_string())
        }
        other => ApiError::from(other),
    }
}
