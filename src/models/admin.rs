use sqlx::{Pool, Postgres};

use crate::errors::ApiError;

#[derive(Debug, sqlx::FromRow)]
pub struct Admin {
    pub admin_id: i64,
    pub email: String,
    pub password: String,
}

pub async fn find_admin_by_email(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<Admin>, ApiError> {
    let admin =
        sqlx::query_as::<_, Admin>("SELECT admin_id, email, password FROM admins WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

    Ok(admin)
}
