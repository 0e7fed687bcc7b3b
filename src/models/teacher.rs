use serde::Serialize;
use sqlx::{Pool, Postgres};

use super::conflict_on_unique;
use crate::errors::ApiError;

#[derive(Debug, sqlx::FromRow)]
pub struct TeacherAccount {
    pub teacher_id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// The shape that leaves the server; password hashes stay in
/// `TeacherAccount`.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TeacherProfile {
    pub teacher_id: i64,
    pub name: String,
    pub email: String,
}

pub const EMAIL_TAKEN: &str = "Teacher with this email already exists";

pub async fn find_teacher_by_email(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<TeacherAccount>, ApiError> {
    let teacher = sqlx::query_as::<_, TeacherAccount>(
        "SELECT teacher_id, name, email, password FROM teachers WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(teacher)
}

pub async fn email_taken(pool: &Pool<Postgres>, email: &str) -> Result<bool, ApiError> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT teacher_id FROM teachers WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(existing.is_some())
}

pub async fn insert_teacher(
    pool: &Pool<Postgres>,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64, ApiError> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO teachers (name, email, password) VALUES ($1, $2, $3) RETURNING teacher_id",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, EMAIL_TAKEN))
}

pub async fn teacher_exists(pool: &Pool<Postgres>, teacher_id: i64) -> Result<bool, ApiError> {
    let existing =
        sqlx::query_scalar::<_, i64>("SELECT teacher_id FROM teachers WHERE teacher_id = $1")
            .bind(teacher_id)
            .fetch_optional(pool)
            .await?;

    Ok(existing.is_some())
}

pub async fn get_teacher_profile(
    pool: &Pool<Postgres>,
    teacher_id: i64,
) -> Result<Option<TeacherProfile>, ApiError> {
    let teacher = sqlx::query_as::<_, TeacherProfile>(
        "SELECT teacher_id, name, email FROM teachers WHERE teacher_id = $1",
    )
    .bind(teacher_id)
    .fetch_optional(pool)
    .await?;

    Ok(teacher)
}

pub async fn list_teachers(pool: &Pool<Postgres>) -> Result<Vec<TeacherProfile>, ApiError> {
    let teachers = sqlx::query_as::<_, TeacherProfile>(
        "SELECT teacher_id, name, email FROM teachers ORDER BY teacher_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(teachers)
}

/// Partial profile update; absent fields keep their stored values.
pub async fn update_teacher_profile(
    pool: &Pool<Postgres>,
    teacher_id: i64,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE teachers SET name = COALESCE($2, name), email = COALESCE($3, email) \
         WHERE teacher_id = $1",
    )
    .bind(teacher_id)
    .bind(name)
    .bind(email)
    .execute(pool)
    .await
    .map_err(|e| conflict_on_unique(e, EMAIL_TAKEN))?;

    Ok(())
}

pub async fn update_teacher_password(
    pool: &Pool<Postgres>,
    teacher_id: i64,
    password_hash: &str,
) -> Result<(), ApiError> {
    sqlx::query("UPDATE teachers SET password = $2 WHERE teacher_id = $1")
        .bind(teacher_id)
        .bind(password_hash)
        .execute(pool)
        .await?;

    Ok(())
}
