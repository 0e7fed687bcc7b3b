use sqlx::{Pool, Postgres};

use crate::errors::ApiError;

pub async fn insert_video(
    pool: &Pool<Postgres>,
    course_id: i64,
    title: &str,
    url: &str,
) -> Result<i64, ApiError> {
    let video_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO videos (course_id, video_title, video_url) VALUES ($1, $2, $3) \
         RETURNING video_id",
    )
    .bind(course_id)
    .bind(title)
    .bind(url)
    .fetch_one(pool)
    .await?;

    Ok(video_id)
}
