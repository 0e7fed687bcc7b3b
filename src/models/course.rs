use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Postgres};

use crate::errors::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Draft,
    Published,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Course {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
    pub teacher_id: Option<i64>,
}

/// Course without its teacher link, used by the flat search endpoints.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CourseSummary {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
}

/// One row of the courses ⟕ videos join. Video columns are NULL for a
/// course that has no videos yet.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourseVideoRow {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
    pub video_id: Option<i64>,
    pub video_title: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct VideoEntry {
    pub video_id: i64,
    pub video_title: String,
    pub video_url: String,
}

#[derive(Debug, Serialize)]
pub struct CourseWithVideos {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
    pub videos: Vec<VideoEntry>,
}

/// Nests the flat join rows into one entry per course, preserving row
/// arrival order for both courses and their videos. A course whose video
/// columns are NULL contributes an entry with an empty `videos` list.
pub fn nest_course_rows(rows: Vec<CourseVideoRow>) -> Vec<CourseWithVideos> {
    let mut courses: Vec<CourseWithVideos> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let slot = match index.get(&row.course_id) {
            Some(&slot) => slot,
            None => {
                courses.push(CourseWithVideos {
                    course_id: row.course_id,
                    title: row.title.clone(),
                    description: row.description.clone(),
                    status: row.status,
                    created_at: row.created_at,
                    videos: Vec::new(),
                });
                index.insert(row.course_id, courses.len() - 1);
                courses.len() - 1
            }
        };

        if let (Some(video_id), Some(video_title), Some(video_url)) =
            (row.video_id, row.video_title, row.video_url)
        {
            courses[slot].videos.push(VideoEntry {
                video_id,
                video_title,
                video_url,
            });
        }
    }

    courses
}

const COURSE_VIDEO_SELECT: &str = "SELECT courses.course_id, courses.title, \
     courses.description, courses.status, courses.created_at, \
     videos.video_id, videos.video_title, videos.video_url \
     FROM courses LEFT JOIN videos ON courses.course_id = videos.course_id";

pub async fn all_courses_with_videos(
    pool: &Pool<Postgres>,
) -> Result<Vec<CourseWithVideos>, ApiError> {
    let rows = sqlx::query_as::<_, CourseVideoRow>(&format!(
        "{COURSE_VIDEO_SELECT} ORDER BY courses.course_id, videos.video_id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(nest_course_rows(rows))
}

pub async fn course_with_videos(
    pool: &Pool<Postgres>,
    course_id: i64,
) -> Result<Option<CourseWithVideos>, ApiError> {
    let rows = sqlx::query_as::<_, CourseVideoRow>(&format!(
        "{COURSE_VIDEO_SELECT} WHERE courses.course_id = $1 ORDER BY videos.video_id"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    Ok(nest_course_rows(rows).into_iter().next())
}

pub async fn courses_taught_with_videos(
    pool: &Pool<Postgres>,
    teacher_id: i64,
) -> Result<Vec<CourseWithVideos>, ApiError> {
    let rows = sqlx::query_as::<_, CourseVideoRow>(&format!(
        "{COURSE_VIDEO_SELECT} WHERE courses.teacher_id = $1 \
         ORDER BY courses.course_id, videos.video_id"
    ))
    .bind(teacher_id)
    .fetch_all(pool)
    .await?;

    Ok(nest_course_rows(rows))
}

const ENROLLED_COURSE_VIDEO_SELECT: &str = "SELECT courses.course_id, courses.title, \
     courses.description, courses.status, courses.created_at, \
     videos.video_id, videos.video_title, videos.video_url \
     FROM courses \
     INNER JOIN enrollments ON courses.course_id = enrollments.course_id \
     LEFT JOIN videos ON courses.course_id = videos.course_id";

pub async fn enrolled_courses_with_videos(
    pool: &Pool<Postgres>,
    student_id: i64,
) -> Result<Vec<CourseWithVideos>, ApiError> {
    let rows = sqlx::query_as::<_, CourseVideoRow>(&format!(
        "{ENROLLED_COURSE_VIDEO_SELECT} WHERE enrollments.student_id = $1 \
         ORDER BY courses.course_id, videos.video_id"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(nest_course_rows(rows))
}

pub async fn enrolled_course_with_videos(
    pool: &Pool<Postgres>,
    student_id: i64,
    course_id: i64,
) -> Result<Option<CourseWithVideos>, ApiError> {
    let rows = sqlx::query_as::<_, CourseVideoRow>(&format!(
        "{ENROLLED_COURSE_VIDEO_SELECT} WHERE enrollments.student_id = $1 \
         AND courses.course_id = $2 ORDER BY videos.video_id"
    ))
    .bind(student_id)
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    Ok(nest_course_rows(rows).into_iter().next())
}

pub async fn insert_course(
    pool: &Pool<Postgres>,
    title: &str,
    description: Option<&str>,
) -> Result<i64, ApiError> {
    let course_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO courses (title, description) VALUES ($1, $2) RETURNING course_id",
    )
    .bind(title)
    .bind(description)
    .fetch_one(pool)
    .await?;

    Ok(course_id)
}

pub async fn course_exists(pool: &Pool<Postgres>, course_id: i64) -> Result<bool, ApiError> {
    let existing =
        sqlx::query_scalar::<_, i64>("SELECT course_id FROM courses WHERE course_id = $1")
            .bind(course_id)
            .fetch_optional(pool)
            .await?;

    Ok(existing.is_some())
}

pub async fn get_course(
    pool: &Pool<Postgres>,
    course_id: i64,
) -> Result<Option<Course>, ApiError> {
    let course = sqlx::query_as::<_, Course>(
        "SELECT course_id, title, description, status, created_at, teacher_id \
         FROM courses WHERE course_id = $1",
    )
    .bind(course_id)
    .fetch_optional(pool)
    .await?;

    Ok(course)
}

pub async fn get_teacher_course(
    pool: &Pool<Postgres>,
    course_id: i64,
    teacher_id: i64,
) -> Result<Option<Course>, ApiError> {
    let course = sqlx::query_as::<_, Course>(
        "SELECT course_id, title, description, status, created_at, teacher_id \
         FROM courses WHERE course_id = $1 AND teacher_id = $2",
    )
    .bind(course_id)
    .bind(teacher_id)
    .fetch_optional(pool)
    .await?;

    Ok(course)
}

pub async fn assign_teacher(
    pool: &Pool<Postgres>,
    course_id: i64,
    teacher_id: i64,
) -> Result<(), ApiError> {
    sqlx::query("UPDATE courses SET teacher_id = $2 WHERE course_id = $1")
        .bind(course_id)
        .bind(teacher_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn search_all_courses(
    pool: &Pool<Postgres>,
    query: &str,
) -> Result<Vec<CourseSummary>, ApiError> {
    let pattern = format!("%{query}%");
    let courses = sqlx::query_as::<_, CourseSummary>(
        "SELECT course_id, title, description, status, created_at FROM courses \
         WHERE title ILIKE $1 OR description ILIKE $1 ORDER BY course_id",
    )
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    Ok(courses)
}

pub async fn search_teacher_courses(
    pool: &Pool<Postgres>,
    teacher_id: i64,
    query: &str,
) -> Result<Vec<CourseSummary>, ApiError> {
    let pattern = format!("%{query}%");
    let courses = sqlx::query_as::<_, CourseSummary>(
        "SELECT course_id, title, description, status, created_at FROM courses \
         WHERE teacher_id = $1 AND (title ILIKE $2 OR description ILIKE $2) \
         ORDER BY course_id",
    )
    .bind(teacher_id)
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    Ok(courses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(course_id: i64, video: Option<(i64, &str, &str)>) -> CourseVideoRow {
        CourseVideoRow {
            course_id,
            title: format!("Course {course_id}"),
            description: Some("about something".to_string()),
            status: CourseStatus::Draft,
            created_at: Utc::now(),
            video_id: video.map(|(id, _, _)| id),
            video_title: video.map(|(_, t, _)| t.to_string()),
            video_url: video.map(|(_, _, u)| u.to_string()),
        }
    }

    #[test]
    fn course_without_videos_yields_empty_list() {
        let nested = nest_course_rows(vec![row(1, None)]);

        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].course_id, 1);
        assert!(nested[0].videos.is_empty());
    }

    #[test]
    fn videos_group_under_their_course_in_row_order() {
        let rows = vec![
            row(1, Some((10, "intro", "https://v/10"))),
            row(1, Some((11, "part two", "https://v/11"))),
            row(2, None),
        ];

        let nested = nest_course_rows(rows);

        assert_eq!(nested.len(), 2);
        assert_eq!(
            nested[0].videos,
            vec![
                VideoEntry {
                    video_id: 10,
                    video_title: "intro".to_string(),
                    video_url: "https://v/10".to_string(),
                },
                VideoEntry {
                    video_id: 11,
                    video_title: "part two".to_string(),
                    video_url: "https://v/11".to_string(),
                },
            ]
        );
        assert!(nested[1].videos.is_empty());
    }

    #[test]
    fn interleaved_rows_still_group_by_course() {
        let rows = vec![
            row(5, Some((1, "a", "https://v/1"))),
            row(6, Some((2, "b", "https://v/2"))),
            row(5, Some((3, "c", "https://v/3"))),
        ];

        let nested = nest_course_rows(rows);

        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0].course_id, 5);
        assert_eq!(nested[0].videos.len(), 2);
        assert_eq!(nested[1].course_id, 6);
        assert_eq!(nested[1].videos.len(), 1);
    }

    #[test]
    fn empty_input_yields_no_courses() {
        assert!(nest_course_rows(Vec::new()).is_empty());
    }

    #[test]
    fn serialized_course_keeps_an_explicit_empty_videos_field() {
        let nested = nest_course_rows(vec![row(1, None)]);
        let json = serde_json::to_value(&nested).unwrap();

        assert_eq!(json[0]["videos"], serde_json::json!([]));
    }
}
