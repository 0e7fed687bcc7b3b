use actix_web::cookie::{time, Cookie};
use actix_web::{get, Responder};

use crate::tokens::{Principal, TOKEN_TTL_DAYS};

pub mod admin;
pub mod student;
pub mod teacher;

#[get("/")]
pub async fn index() -> impl Responder {
    "Hello, world!"
}

/// Session cookie matching the token's 2-day lifetime.
pub(crate) fn session_cookie(kind: Principal, token: &str) -> Cookie<'static> {
    Cookie::build(kind.cookie_name(), token.to_owned())
        .http_only(true)
        .path("/")
        .max_age(time::Duration::days(TOKEN_TTL_DAYS))
        .finish()
}

pub(crate) fn removal_cookie(kind: Principal) -> Cookie<'static> {
    let mut cookie = Cookie::new(kind.cookie_name(), "");
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use actix_web::test;

    use crate::test_init_app::init;

    #[actix_web::test]
    async fn index_greets() {
        let app = init().await;

        let req = test::TestRequest::get().uri("/").to_request();
        let res = test::call_service(&app, req).await;

        let body_bytes = test::read_body(res).await;
        let body_str = std::str::from_utf8(&body_bytes).unwrap();

        assert_eq!(body_str, "Hello, world!");
    }
}
