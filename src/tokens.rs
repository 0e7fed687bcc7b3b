use chrono::{Duration, Utc};
use derive_more::Display;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtSecrets;

/// Session tokens live for two days; the cookie max-age matches.
pub const TOKEN_TTL_DAYS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Principal {
    #[display("admin")]
    Admin,
    #[display("teacher")]
    Teacher,
    #[display("student")]
    Student,
}

impl Principal {
    pub fn secret<'a>(&self, secrets: &'a JwtSecrets) -> &'a str {
        match self {
            Principal::Admin => &secrets.admin,
            Principal::Teacher => &secrets.teacher,
            Principal::Student => &secrets.student,
        }
    }

    pub fn cookie_name(&self) -> &'static str {
        match self {
            Principal::Admin => "teachablesadminaccesstoken",
            Principal::Teacher => "teachablesteacheraccesstoken",
            Principal::Student => "teachablesstudentaccesstoken",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The principal's numeric id.
    pub sub: i64,
    pub email: String,
    pub exp: usize,
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Access token has expired")]
    Expired,
    #[error("Access token is not valid")]
    Invalid,
}

pub fn issue(
    principal_id: i64,
    email: &str,
    kind: Principal,
    secrets: &JwtSecrets,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize;
    let claims = Claims {
        sub: principal_id,
        email: email.to_owned(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(kind.secret(secrets).as_bytes()),
    )
}

pub fn verify(token: &str, kind: Principal, secrets: &JwtSecrets) -> Result<Claims, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(kind.secret(secrets).as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets() -> JwtSecrets {
        JwtSecrets {
            admin: "admin-secret".to_string(),
            teacher: "teacher-secret".to_string(),
            student: "student-secret".to_string(),
        }
    }

    #[test]
    fn issue_then_verify_roundtrip() {
        let secrets = secrets();
        for kind in [Principal::Admin, Principal::Teacher, Principal::Student] {
            let token = issue(7, "someone@example.com", kind, &secrets).unwrap();
            let claims = verify(&token, kind, &secrets).unwrap();
            assert_eq!(claims.sub, 7);
            assert_eq!(claims.email, "someone@example.com");
        }
    }

    #[test]
    fn token_for_one_kind_fails_under_every_other() {
        let secrets = secrets();
        let kinds = [Principal::Admin, Principal::Teacher, Principal::Student];
        for issued in kinds {
            let token = issue(1, "x@example.com", issued, &secrets).unwrap();
            for verified in kinds {
                if verified == issued {
                    continue;
                }
                assert_eq!(
                    verify(&token, verified, &secrets),
                    Err(TokenError::Invalid),
                    "{issued} token accepted by {verified} verifier"
                );
            }
        }
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let secrets = secrets();
        // One hour past, well beyond the default validation leeway.
        let claims = Claims {
            sub: 3,
            email: "late@example.com".to_string(),
            exp: (Utc::now() - Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secrets.student.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            verify(&token, Principal::Student, &secrets),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn garbage_token_is_invalid() {
        let secrets = secrets();
        assert_eq!(
            verify("not-a-jwt", Principal::Admin, &secrets),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn cookie_names_are_distinct_per_kind() {
        let names = [
            Principal::Admin.cookie_name(),
            Principal::Teacher.cookie_name(),
            Principal::Student.cookie_name(),
        ];
        assert_ne!(names[0], names[1]);
        assert_ne!(names[1], names[2]);
        assert_ne!(names[0], names[2]);
    }
}
