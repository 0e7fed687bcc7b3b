use serde::Serialize;
use sqlx::{Pool, Postgres};

use super::conflict_on_unique;
use crate::errors::ApiError;

#[derive(Debug, sqlx::FromRow)]
pub struct StudentAccount {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StudentProfile {
    pub student_id: i64,
    pub name: String,
    pub email: String,
}

pub const EMAIL_TAKEN: &str = "Student with this email already exists";

pub async fn find_student_by_email(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<StudentAccount>, ApiError> {
    let student = sqlx::query_as::<_, StudentAccount>(
        "SELECT student_id, name, email, password FROM students WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(student)
}

pub async fn email_taken(pool: &Pool<Postgres>, email: &str) -> Result<bool, ApiError> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT student_id FROM students WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(existing.is_some())
}

pub async fn insert_student(
    pool: &Pool<Postgres>,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64, ApiError> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO students (name, email, password) VALUES ($1, $2, $3) RETURNING student_id",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, EMAIL_TAKEN))
}

pub async fn student_exists(pool: &Pool<Postgres>, student_id: i64) -> Result<bool, ApiError> {
    let existing =
        sqlx::query_scalar::<_, i64>("SELECT student_id FROM students WHERE student_id = $1")
            .bind(student_id)
            .fetch_optional(pool)
            .await?;

    Ok(existing.is_some())
}

pub async fn get_student_profile(
    pool: &Pool<Postgres>,
    student_id: i64,
) -> Result<Option<StudentProfile>, ApiError> {
    let student = sqlx::query_as::<_, StudentProfile>(
        "SELECT student_id, name, email FROM students WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await?;

    Ok(student)
}

pub async fn list_students(pool: &Pool<Postgres>) -> Result<Vec<StudentProfile>, ApiError> {
    let students = sqlx::query_as::<_, StudentProfile>(
        "SELECT student_id, name, email FROM students ORDER BY student_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(students)
}

pub async fn update_student_profile(
    pool: &Pool<Postgres>,
    student_id: i64,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE students SET name = COALESCE($2, name), email = COALESCE($3, email) \
         WHERE student_id = $1",
    )
    .bind(student_id)
    .bind(name)
    .bind(email)
    .execute(pool)
    .await
    .map_err(|e| conflict_on_unique(e, EMAIL_TAKEN))?;

    Ok(())
}

pub async fn update_student_password(
    pool: &Pool<Postgres>,
    student_id: i64,
    password_hash: &str,
) -> Result<(), ApiError> {
    sqlx::query("UPDATE students SET password = $2 WHERE student_id = $1")
        .bind(student_id)
        .bind(password_hash)
        .execute(pool)
        .await?;

    Ok(())
}
