use actix_multipart::Multipart;
use actix_web::{
    get, post, put,
    web::{self, Json},
    HttpResponse,
};
use futures_util::StreamExt;

use super::{removal_cookie, session_cookie};
use crate::errors::ApiError;
use crate::guard;
use crate::middlewares::TeacherClaims;
use crate::models::{course, enrollment, teacher, video};
use crate::schema::teacher::{
    EditTeacherProfileRequest, TeacherChangePasswordRequest, UploadedVideoResponse,
};
use crate::schema::{validate_payload, LoginRequest, LoginResponse, MessageResponse, SearchQuery};
use crate::tokens::{self, Principal};
use crate::utils::{hash_password, verify_password};
use crate::GlobalState;
use serde_json::json;

#[post("/login")]
pub async fn teacher_login(
    data: web::Data<GlobalState>,
    body: Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_payload(&*body)?;

    let teacher = teacher::find_teacher_by_email(&data.pool, &body.email)
        .await?
        .ok_or_else(|| ApiError::auth("Invalid credentials"))?;

    if verify_password(&body.password, &teacher.password).is_err() {
        return Err(ApiError::auth("Invalid credentials"));
    }

    let token = tokens::issue(
        teacher.teacher_id,
        &teacher.email,
        Principal::Teacher,
        &data.config.jwt,
    )?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(Principal::Teacher, &token))
        .json(LoginResponse {
            message: "Login successful",
            token,
        }))
}

#[get("/get-courses-taught-by-teacher/{teacher_id}")]
pub async fn get_courses_taught_by_teacher(
    data: web::Data<GlobalState>,
    claims: TeacherClaims,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let teacher_id = path.into_inner();
    guard::ensure_teacher_owner(&data.pool, teacher_id, claims.0.sub).await?;

    let courses = course::courses_taught_with_videos(&data.pool, teacher_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "courses": courses })))
}

#[get("/get-students-enrolled-in-teacher-course/{teacher_id}")]
pub async fn get_students_enrolled_in_teacher_course(
    data: web::Data<GlobalState>,
    claims: TeacherClaims,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let teacher_id = path.into_inner();
    guard::ensure_teacher_owner(&data.pool, teacher_id, claims.0.sub).await?;

    let students = enrollment::students_enrolled_with_teacher(&data.pool, teacher_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "students": students })))
}

async fn read_text_field(field: &mut actix_multipart::Field) -> Result<String, ApiError> {
    let bytes = read_bytes_field(field).await?;
    String::from_utf8(bytes).map_err(|_| ApiError::validation("Malformed multipart payload"))
}

async fn read_bytes_field(field: &mut actix_multipart::Field) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|_| ApiError::validation("Malformed multipart payload"))?;
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[post("/upload-video-to-course")]
pub async fn upload_video_to_course(
    data: web::Data<GlobalState>,
    claims: TeacherClaims,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let mut course_id: Option<i64> = None;
    let mut title: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|_| ApiError::validation("Malformed multipart payload"))?;
        match field.name() {
            "course_id" => {
                let text = read_text_field(&mut field).await?;
                course_id = Some(
                    text.trim()
                        .parse::<i64>()
                        .map_err(|_| ApiError::validation("course_id must be a number"))?,
                );
            }
            "title" => title = Some(read_text_field(&mut field).await?),
            "video" => {
                let file_name = field
                    .content_disposition()
                    .get_filename()
                    .unwrap_or("upload.mp4")
                    .to_owned();
                file = Some((file_name, read_bytes_field(&mut field).await?));
            }
            _ => {
                // Drain and ignore unknown parts.
                while field.next().await.is_some() {}
            }
        }
    }

    let course_id = course_id.ok_or_else(|| ApiError::validation("course_id is required"))?;
    let title = title.ok_or_else(|| ApiError::validation("title is required"))?;
    let (file_name, bytes) = file.ok_or_else(|| ApiError::validation("No file uploaded"))?;

    let course = course::get_course(&data.pool, course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    if course.teacher_id != Some(claims.0.sub) {
        return Err(ApiError::forbidden(
            "You are not authorized to perform this action",
        ));
    }

    let uploaded = data.media.upload_video(course_id, &file_name, bytes).await?;
    let video_id =
        video::insert_video(&data.pool, course_id, &title, &uploaded.secure_url).await?;

    Ok(HttpResponse::Created().json(UploadedVideoResponse {
        message: "Video uploaded successfully",
        video_id,
    }))
}

#[get("/search-courses")]
pub async fn search_courses(
    data: web::Data<GlobalState>,
    claims: TeacherClaims,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let courses = course::search_teacher_courses(&data.pool, claims.0.sub, &query.query).await?;
    Ok(HttpResponse::Ok().json(json!({ "courses": courses })))
}

#[get("/get-single-course/{course_id}")]
pub async fn get_single_course(
    data: web::Data<GlobalState>,
    claims: TeacherClaims,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let course_id = path.into_inner();

    let course = course::get_teacher_course(&data.pool, course_id, claims.0.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    Ok(HttpResponse::Ok().json(json!({ "course": course })))
}

#[get("/get-single-teacher/{teacher_id}")]
pub async fn get_single_teacher(
    data: web::Data<GlobalState>,
    claims: TeacherClaims,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let teacher_id = path.into_inner();
    guard::ensure_teacher_owner(&data.pool, teacher_id, claims.0.sub).await?;

    let profile = teacher::get_teacher_profile(&data.pool, teacher_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher not found"))?;

    Ok(HttpResponse::Ok().json(json!({ "teacher": profile })))
}

#[put("/edit-profile")]
pub async fn edit_profile(
    data: web::Data<GlobalState>,
    claims: TeacherClaims,
    body: Json<EditTeacherProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_payload(&*body)?;
    guard::ensure_teacher_owner(&data.pool, body.teacher_id, claims.0.sub).await?;

    teacher::update_teacher_profile(
        &data.pool,
        body.teacher_id,
        body.name.as_deref(),
        body.email.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Teacher profile updated successfully",
    }))
}

#[put("/change-password")]
pub async fn change_password(
    data: web::Data<GlobalState>,
    claims: TeacherClaims,
    body: Json<TeacherChangePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_payload(&*body)?;
    body.ensure_passwords_match()?;
    guard::ensure_teacher_owner(&data.pool, body.teacher_id, claims.0.sub).await?;

    let password_hash = hash_password(&body.new_password)?;
    teacher::update_teacher_password(&data.pool, body.teacher_id, &password_hash).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Password updated successfully",
    }))
}

#[post("/teacher-logout")]
pub async fn teacher_logout(_claims: TeacherClaims) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(Principal::Teacher))
        .json(MessageResponse {
            message: "Logout successful",
        }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};

    use crate::errors::ErrorBody;
    use crate::schema::teacher::TeacherChangePasswordRequest;
    use crate::test_init_app::{init, TestTokens};
    use crate::tokens::Principal;

    #[actix_web::test]
    async fn change_password_rejects_mismatched_confirmation() {
        let app = init().await;
        let token = TestTokens::valid(Principal::Teacher, 1, "t@example.com");

        let body = TeacherChangePasswordRequest {
            teacher_id: 1,
            new_password: "first".to_string(),
            confirm_new_password: "second".to_string(),
        };

        let res = test::TestRequest::put()
            .set_json(body)
            .append_header(("Authorization", format!("Bearer {token}")))
            .uri("/api/teachers/change-password")
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(res).await;
        assert_eq!(body.error, "Passwords do not match");
    }

    #[actix_web::test]
    async fn logout_clears_the_teacher_cookie() {
        let app = init().await;
        let token = TestTokens::valid(Principal::Teacher, 1, "t@example.com");

        let res = test::TestRequest::post()
            .append_header(("Authorization", format!("Bearer {token}")))
            .uri("/api/teachers/teacher-logout")
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let cleared = res
            .response()
            .cookies()
            .any(|c| c.name() == Principal::Teacher.cookie_name());
        assert!(cleared);
    }
}
