use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::ApiError;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct EditTeacherProfileRequest {
    pub teacher_id: i64,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct TeacherChangePasswordRequest {
    pub teacher_id: i64,
    #[validate(length(min = 1))]
    pub new_password: String,
    pub confirm_new_password: String,
}

impl TeacherChangePasswordRequest {
    pub fn ensure_passwords_match(&self) -> Result<(), ApiError> {
        if self.new_password != self.confirm_new_password {
            return Err(ApiError::validation("Passwords do not match"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UploadedVideoResponse {
    pub message: &'static str,
    #[serde(rename = "videoId")]
    pub video_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_passwords_are_rejected() {
        let req = TeacherChangePasswordRequest {
            teacher_id: 1,
            new_password: "first".to_string(),
            confirm_new_password: "second".to_string(),
        };
        let err = req.ensure_passwords_match().unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[test]
    fn matching_passwords_pass() {
        let req = TeacherChangePasswordRequest {
            teacher_id: 1,
            new_password: "same".to_string(),
            confirm_new_password: "same".to_string(),
        };
        assert!(req.ensure_passwords_match().is_ok());
    }
}
