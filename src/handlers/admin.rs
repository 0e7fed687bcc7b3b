use actix_web::{
    get, post,
    web::{self, Json},
    HttpResponse,
};
use serde::Serialize;
use serde_json::json;

use super::session_cookie;
use crate::email;
use crate::errors::ApiError;
use crate::models::address::{self, AddressKind};
use crate::models::student::StudentProfile;
use crate::models::{admin, course, enrollment, student, teacher};
use crate::schema::admin::{
    AssignTeacherRequest, CourseDetailsQuery, CreateCourseRequest, CreatedCourseResponse,
    EnrollStudentRequest, RegisterPrincipalRequest, RegisteredStudentResponse,
    RegisteredTeacherResponse,
};
use crate::schema::{validate_payload, LoginRequest, LoginResponse, MessageResponse};
use crate::tokens::{self, Principal};
use crate::utils::{hash_password, verify_password};
use crate::GlobalState;

#[post("/login")]
pub async fn admin_login(
    data: web::Data<GlobalState>,
    body: Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_payload(&*body)?;

    let admin = admin::find_admin_by_email(&data.pool, &body.email)
        .await?
        .ok_or_else(|| ApiError::auth("Invalid credentials"))?;

    if verify_password(&body.password, &admin.password).is_err() {
        return Err(ApiError::auth("Invalid credentials"));
    }

    let token = tokens::issue(admin.admin_id, &admin.email, Principal::Admin, &data.config.jwt)?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(Principal::Admin, &token))
        .json(LoginResponse {
            message: "Login successful",
            token,
        }))
}

#[post("/register-new-student")]
pub async fn register_new_student(
    data: web::Data<GlobalState>,
    body: Json<RegisterPrincipalRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_payload(&*body)?;

    if student::email_taken(&data.pool, &body.email).await? {
        return Err(ApiError::conflict(student::EMAIL_TAKEN));
    }

    let password_hash = hash_password(&body.password)?;
    let student_id =
        student::insert_student(&data.pool, &body.name, &body.email, &password_hash).await?;

    email::send_welcome_in_background(data.mailer.clone(), body.name.clone(), body.email.clone());

    Ok(HttpResponse::Created().json(RegisteredStudentResponse {
        message: "Student registered successfully",
        student_id,
    }))
}

#[post("/register-new-teacher")]
pub async fn register_new_teacher(
    data: web::Data<GlobalState>,
    body: Json<RegisterPrincipalRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_payload(&*body)?;

    if teacher::email_taken(&data.pool, &body.email).await? {
        return Err(ApiError::conflict(teacher::EMAIL_TAKEN));
    }

    let password_hash = hash_password(&body.password)?;
    let teacher_id =
        teacher::insert_teacher(&data.pool, &body.name, &body.email, &password_hash).await?;

    email::send_welcome_in_background(data.mailer.clone(), body.name.clone(), body.email.clone());

    Ok(HttpResponse::Created().json(RegisteredTeacherResponse {
        message: "Teacher registered successfully",
        teacher_id,
    }))
}

#[post("/create-course")]
pub async fn create_course(
    data: web::Data<GlobalState>,
    body: Json<CreateCourseRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_payload(&*body)?;

    let course_id =
        course::insert_course(&data.pool, &body.title, body.description.as_deref()).await?;

    Ok(HttpResponse::Created().json(CreatedCourseResponse {
        message: "Course created successfully",
        course_id,
    }))
}

#[post("/assign-teacher-to-course")]
pub async fn assign_teacher_to_course(
    data: web::Data<GlobalState>,
    body: Json<AssignTeacherRequest>,
) -> Result<HttpResponse, ApiError> {
    if !course::course_exists(&data.pool, body.course_id).await? {
        return Err(ApiError::not_found("Course not found"));
    }
    if !teacher::teacher_exists(&data.pool, body.teacher_id).await? {
        return Err(ApiError::not_found("Teacher not found"));
    }

    course::assign_teacher(&data.pool, body.course_id, body.teacher_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Teacher assigned to course successfully",
    }))
}

#[post("/enroll-student-in-course")]
pub async fn enroll_student_in_course(
    data: web::Data<GlobalState>,
    body: Json<EnrollStudentRequest>,
) -> Result<HttpResponse, ApiError> {
    if !student::student_exists(&data.pool, body.student_id).await? {
        return Err(ApiError::not_found("Student not found"));
    }
    if !course::course_exists(&data.pool, body.course_id).await? {
        return Err(ApiError::not_found("Course not found"));
    }

    enrollment::enroll_student(&data.pool, body.student_id, body.course_id).await?;

    Ok(HttpResponse::Created().json(MessageResponse {
        message: "Student enrolled in the course successfully",
    }))
}

#[get("/get-all-students")]
pub async fn get_all_students(data: web::Data<GlobalState>) -> Result<HttpResponse, ApiError> {
    let students = student::list_students(&data.pool).await?;
    Ok(HttpResponse::Ok().json(json!({ "students": students })))
}

#[get("/get-all-teachers")]
pub async fn get_all_teachers(data: web::Data<GlobalState>) -> Result<HttpResponse, ApiError> {
    let teachers = teacher::list_teachers(&data.pool).await?;
    Ok(HttpResponse::Ok().json(json!({ "teachers": teachers })))
}

#[get("/get-single-teacher/{teacher_id}")]
pub async fn get_single_teacher(
    data: web::Data<GlobalState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let teacher_id = path.into_inner();

    let profile = teacher::get_teacher_profile(&data.pool, teacher_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher not found"))?;

    Ok(HttpResponse::Ok().json(json!({ "teacher": profile })))
}

/// Student plus whichever addresses are on file.
#[derive(Debug, Serialize)]
struct StudentDetail {
    #[serde(flatten)]
    profile: StudentProfile,
    billing_address: Option<address::Address>,
    delivery_address: Option<address::Address>,
}

#[get("/get-single-student/{student_id}")]
pub async fn get_single_student(
    data: web::Data<GlobalState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let student_id = path.into_inner();

    let profile = student::get_student_profile(&data.pool, student_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;

    let billing_address = address::get_address(&data.pool, AddressKind::Billing, student_id).await?;
    let delivery_address =
        address::get_address(&data.pool, AddressKind::Delivery, student_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "student": StudentDetail {
            profile,
            billing_address,
            delivery_address,
        }
    })))
}

#[get("/get-all-courses")]
pub async fn get_all_courses(data: web::Data<GlobalState>) -> Result<HttpResponse, ApiError> {
    let courses = course::all_courses_with_videos(&data.pool).await?;
    Ok(HttpResponse::Ok().json(json!({ "courses": courses })))
}

#[get("/get-course-details")]
pub async fn get_course_details(
    data: web::Data<GlobalState>,
    query: web::Query<CourseDetailsQuery>,
) -> Result<HttpResponse, ApiError> {
    let course = course::course_with_videos(&data.pool, query.course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    Ok(HttpResponse::Ok().json(json!({ "course": course })))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};

    use crate::errors::ErrorBody;
    use crate::schema::LoginRequest;
    use crate::test_init_app::init;

    #[actix_web::test]
    async fn login_rejects_a_malformed_email_before_touching_the_db() {
        let app = init().await;

        let body = LoginRequest {
            email: "not-an-email".to_string(),
            password: "whatever".to_string(),
        };

        let res = test::TestRequest::post()
            .set_json(body)
            .uri("/api/admin/login")
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn guarded_admin_routes_require_a_token() {
        let app = init().await;

        let res = test::TestRequest::get()
            .uri("/api/admin/get-all-students")
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorBody = test::read_body_json(res).await;
        assert_eq!(body.error, "No token, authorization denied");
    }
}
