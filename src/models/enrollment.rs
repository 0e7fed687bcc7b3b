use sqlx::{Pool, Postgres};

use super::conflict_on_unique;
use super::student::StudentProfile;
use crate::errors::ApiError;

pub const ALREADY_ENROLLED: &str = "Student is already enrolled in this course";

/// Check-then-insert runs inside one transaction; the table's unique
/// constraint backstops concurrent enrollments of the same pair.
pub async fn enroll_student(
    pool: &Pool<Postgres>,
    student_id: i64,
    course_id: i64,
) -> Result<i64, ApiError> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT enrollment_id FROM enrollments WHERE student_id = $1 AND course_id = $2",
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_optional(&mut *tx)
    .await?;

    if existing.is_some() {
        return Err(ApiError::conflict(ALREADY_ENROLLED));
    }

    let enrollment_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO enrollments (student_id, course_id) VALUES ($1, $2) RETURNING enrollment_id",
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| conflict_on_unique(e, ALREADY_ENROLLED))?;

    tx.commit().await?;
    Ok(enrollment_id)
}

/// Distinct students across every course the teacher runs.
pub async fn students_enrolled_with_teacher(
    pool: &Pool<Postgres>,
    teacher_id: i64,
) -> Result<Vec<StudentProfile>, ApiError> {
    let students = sqlx::query_as::<_, StudentProfile>(
        "SELECT DISTINCT students.student_id, students.name, students.email \
         FROM students \
         JOIN enrollments ON students.student_id = enrollments.student_id \
         JOIN courses ON enrollments.course_id = courses.course_id \
         WHERE courses.teacher_id = $1 \
         ORDER BY students.student_id",
    )
    .bind(teacher_id)
    .fetch_all(pool)
    .await?;

    Ok(students)
}
