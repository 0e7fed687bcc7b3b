//! Ownership policy shared by every endpoint that touches a
//! principal-owned resource. The original handlers each carried (or
//! forgot) their own copy of this check; it lives here once instead.

use sqlx::{Pool, Postgres};

use crate::errors::ApiError;
use crate::models;

/// Existence is decided before ownership, so a missing target yields 404
/// even when the caller would not have been allowed to touch it. That
/// ordering leaks resource existence to unauthorized callers and is pinned
/// down by tests.
pub fn check_owner(
    exists: bool,
    resource: &str,
    owner_id: i64,
    principal_id: i64,
) -> Result<(), ApiError> {
    if !exists {
        return Err(ApiError::not_found(format!("{resource} not found")));
    }
    if owner_id != principal_id {
        return Err(ApiError::forbidden(
            "You are not authorized to perform this action",
        ));
    }
    Ok(())
}

pub async fn ensure_student_owner(
    pool: &Pool<Postgres>,
    student_id: i64,
    principal_id: i64,
) -> Result<(), ApiError> {
    let exists = models::student::student_exists(pool, student_id).await?;
    check_owner(exists, "Student", student_id, principal_id)
}

pub async fn ensure_teacher_owner(
    pool: &Pool<Postgres>,
    teacher_id: i64,
    principal_id: i64,
) -> Result<(), ApiError> {
    let exists = models::teacher::teacher_exists(pool, teacher_id).await?;
    check_owner(exists, "Teacher", teacher_id, principal_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_resource_is_not_found() {
        let err = check_owner(false, "Student", 1, 1).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn not_found_takes_precedence_over_forbidden() {
        // Both conditions fail: the target does not exist AND the caller is
        // not the owner. The policy answers 404, leaking existence.
        let err = check_owner(false, "Student", 1, 99).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn owner_mismatch_is_forbidden() {
        let err = check_owner(true, "Student", 1, 99).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(
            err.to_string(),
            "You are not authorized to perform this action"
        );
    }

    #[test]
    fn owner_match_passes() {
        assert!(check_owner(true, "Teacher", 5, 5).is_ok());
    }
}
