use std::future::{ready, Ready};

use actix_web::{
    dev::{Payload, ServiceRequest},
    http::header,
    FromRequest, HttpMessage, HttpRequest,
};

use crate::errors::ApiError;
use crate::tokens::{Claims, Principal, TokenError};

pub mod admin;
pub mod student;
pub mod teacher;

/// Bearer header first, per-kind cookie as the fallback. Returns `None` only
/// when neither carrier is present.
pub(crate) fn bearer_or_cookie(req: &ServiceRequest, kind: Principal) -> Option<String> {
    let header_token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start_matches("Bearer ").trim().to_owned())
        .filter(|value| !value.is_empty());

    if header_token.is_some() {
        return header_token;
    }

    req.request()
        .cookie(kind.cookie_name())
        .map(|cookie| cookie.value().to_owned())
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            // Expired tokens stay a 401 so clients re-authenticate; any other
            // verification failure is a malformed request.
            TokenError::Expired => ApiError::auth(err.to_string()),
            TokenError::Invalid => ApiError::validation(err.to_string()),
        }
    }
}

/// Kind-specific claim wrappers. Each gate inserts its own type, so a
/// student token can never satisfy a handler expecting `TeacherClaims` even
/// if a request somehow bypassed the scope wiring.
macro_rules! claims_extractor {
    ($name:ident) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub Claims);

        impl FromRequest for $name {
            type Error = ApiError;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(
                    req.extensions()
                        .get::<$name>()
                        .cloned()
                        .ok_or_else(|| ApiError::auth("No token, authorization denied")),
                )
            }
        }
    };
}

claims_extractor!(AdminClaims);
claims_extractor!(TeacherClaims);
claims_extractor!(StudentClaims);

#[cfg(test)]
mod tests {
    use actix_web::{
        get, http::StatusCode, middleware::from_fn, test, web, App, HttpResponse, Responder,
    };

    use super::*;
    use crate::errors::ErrorBody;
    use crate::test_init_app::{test_state, TestTokens};
    use crate::tokens;

    #[get("/whoami")]
    async fn admin_probe(claims: AdminClaims) -> impl Responder {
        HttpResponse::Ok().json(claims.0)
    }

    #[get("/whoami")]
    async fn teacher_probe(claims: TeacherClaims) -> impl Responder {
        HttpResponse::Ok().json(claims.0)
    }

    #[get("/whoami")]
    async fn student_probe(claims: StudentClaims) -> impl Responder {
        HttpResponse::Ok().json(claims.0)
    }

    async fn gated_app() -> impl actix_service::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        test::init_service(
            App::new()
                .app_data(test_state())
                .service(
                    web::scope("/admin")
                        .wrap(from_fn(super::admin::admin_middleware))
                        .service(admin_probe),
                )
                .service(
                    web::scope("/teachers")
                        .wrap(from_fn(super::teacher::teacher_middleware))
                        .service(teacher_probe),
                )
                .service(
                    web::scope("/students")
                        .wrap(from_fn(super::student::student_middleware))
                        .service(student_probe),
                ),
        )
        .await
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let app = gated_app().await;

        let res = test::TestRequest::get()
            .uri("/students/whoami")
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorBody = test::read_body_json(res).await;
        assert_eq!(body.error, "No token, authorization denied");
    }

    #[actix_web::test]
    async fn garbage_token_is_a_bad_request() {
        let app = gated_app().await;

        let res = test::TestRequest::get()
            .uri("/admin/whoami")
            .append_header(("Authorization", "Bearer not-a-jwt"))
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(res).await;
        assert_eq!(body.error, "Access token is not valid");
    }

    #[actix_web::test]
    async fn expired_token_is_unauthorized_with_distinct_message() {
        let app = gated_app().await;
        let token = TestTokens::expired(tokens::Principal::Teacher);

        let res = test::TestRequest::get()
            .uri("/teachers/whoami")
            .append_header(("Authorization", format!("Bearer {token}")))
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorBody = test::read_body_json(res).await;
        assert_eq!(body.error, "Access token has expired");
    }

    #[actix_web::test]
    async fn student_token_never_satisfies_the_teacher_gate() {
        let app = gated_app().await;
        let token = TestTokens::valid(tokens::Principal::Student, 1, "s@example.com");

        for uri in ["/teachers/whoami", "/admin/whoami"] {
            let res = test::TestRequest::get()
                .uri(uri)
                .append_header(("Authorization", format!("Bearer {}", token.clone())))
                .send_request(&app)
                .await;

            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "leak via {uri}");
        }
    }

    #[actix_web::test]
    async fn bearer_header_passes_the_matching_gate() {
        let app = gated_app().await;
        let token = TestTokens::valid(tokens::Principal::Admin, 42, "root@example.com");

        let res = test::TestRequest::get()
            .uri("/admin/whoami")
            .append_header(("Authorization", format!("Bearer {token}")))
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let claims: tokens::Claims = test::read_body_json(res).await;
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "root@example.com");
    }

    #[actix_web::test]
    async fn cookie_is_accepted_when_no_header_is_present() {
        let app = gated_app().await;
        let token = TestTokens::valid(tokens::Principal::Student, 9, "c@example.com");

        let res = test::TestRequest::get()
            .uri("/students/whoami")
            .cookie(actix_web::cookie::Cookie::new(
                tokens::Principal::Student.cookie_name(),
                token,
            ))
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn cookie_for_another_kind_does_not_count() {
        let app = gated_app().await;
        let token = TestTokens::valid(tokens::Principal::Student, 9, "c@example.com");

        // Student cookie on the teacher gate: not even looked at, so the
        // request reads as carrying no token at all.
        let res = test::TestRequest::get()
            .uri("/teachers/whoami")
            .cookie(actix_web::cookie::Cookie::new(
                tokens::Principal::Student.cookie_name(),
                token,
            ))
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
