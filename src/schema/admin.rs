use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration payload shared by the register-student and register-teacher
/// endpoints.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RegisterPrincipalRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisteredStudentResponse {
    pub message: &'static str,
    #[serde(rename = "studentId")]
    pub student_id: i64,
}

#[derive(Debug, Serialize)]
pub struct RegisteredTeacherResponse {
    pub message: &'static str,
    #[serde(rename = "teacherId")]
    pub teacher_id: i64,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedCourseResponse {
    pub message: &'static str,
    #[serde(rename = "courseId")]
    pub course_id: i64,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTeacherRequest {
    pub course_id: i64,
    pub teacher_id: i64,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollStudentRequest {
    pub student_id: i64,
    pub course_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailsQuery {
    pub course_id: i64,
}
