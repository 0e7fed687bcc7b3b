use actix_web::{middleware::from_fn, web, App, HttpServer, Scope};
use dotenv::dotenv;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing_subscriber::EnvFilter;

mod config;
mod email;
mod errors;
mod guard;
mod handlers;
mod media;
mod middlewares;
mod models;
mod schema;
#[cfg(test)]
mod test_init_app;
mod tokens;
mod utils;
mod vault;

use config::AppConfig;
use email::Mailer;
use errors::{ApiError, StartupError};
use media::MediaClient;
use vault::VaultClient;

pub struct GlobalState {
    pub pool: Pool<Postgres>,
    pub config: AppConfig,
    pub mailer: Mailer,
    pub media: MediaClient,
    pub vault: VaultClient,
}

/// The whole HTTP surface. Login routes sit outside the gated sub-scopes;
/// everything else passes the matching principal's middleware first.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .service(
            web::scope("/admin")
                .service(handlers::admin::admin_login)
                .service(
                    web::scope("")
                        .wrap(from_fn(middlewares::admin::admin_middleware))
                        .service(handlers::admin::register_new_student)
                        .service(handlers::admin::register_new_teacher)
                        .service(handlers::admin::create_course)
                        .service(handlers::admin::assign_teacher_to_course)
                        .service(handlers::admin::enroll_student_in_course)
                        .service(handlers::admin::get_all_students)
                        .service(handlers::admin::get_all_teachers)
                        .service(handlers::admin::get_single_teacher)
                        .service(handlers::admin::get_single_student)
                        .service(handlers::admin::get_all_courses)
                        .service(handlers::admin::get_course_details),
                ),
        )
        .service(
            web::scope("/teachers")
                .service(handlers::teacher::teacher_login)
                .service(
                    web::scope("")
                        .wrap(from_fn(middlewares::teacher::teacher_middleware))
                        .service(handlers::teacher::get_courses_taught_by_teacher)
                        .service(handlers::teacher::get_students_enrolled_in_teacher_course)
                        .service(handlers::teacher::upload_video_to_course)
                        .service(handlers::teacher::search_courses)
                        .service(handlers::teacher::get_single_course)
                        .service(handlers::teacher::get_single_teacher)
                        .service(handlers::teacher::edit_profile)
                        .service(handlers::teacher::change_password)
                        .service(handlers::teacher::teacher_logout),
                ),
        )
        .service(
            web::scope("/students")
                .service(handlers::student::student_login)
                .service(
                    web::scope("")
                        .wrap(from_fn(middlewares::student::student_middleware))
                        .service(handlers::student::add_credit_card)
                        .service(handlers::student::edit_credit_card)
                        .service(handlers::student::add_billing_address)
                        .service(handlers::student::edit_billing_address)
                        .service(handlers::student::add_delivery_address)
                        .service(handlers::student::edit_delivery_address)
                        .service(handlers::student::edit_profile)
                        .service(handlers::student::change_password)
                        .service(handlers::student::get_single_student)
                        .service(handlers::student::get_credit_card_details)
                        .service(handlers::student::get_billing_address)
                        .service(handlers::student::get_delivery_address)
                        .service(handlers::student::get_student_courses)
                        .service(handlers::student::get_single_course)
                        .service(handlers::student::search_courses)
                        .service(handlers::student::student_logout),
                ),
        )
}

/// Malformed JSON bodies answer with the same 400 shape as schema failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::validation(err.to_string()).into())
}

#[actix_web::main]
async fn main() -> Result<(), StartupError> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|_e| StartupError::DbConnect)?;

    let mailer = Mailer::new(config.smtp.clone());
    let media = MediaClient::new(config.media.clone())?;
    let vault = VaultClient::new(config.vault.clone())?;

    let app_data = web::Data::new(GlobalState {
        pool,
        config: config.clone(),
        mailer,
        media,
        vault,
    });

    tracing::info!(addr = %config.bind_addr, "starting server");

    HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .app_data(json_config())
            .service(handlers::index)
            .service(api_scope())
    })
    .bind(&config.bind_addr)
    .map_err(|_e| StartupError::SocketBind)?
    .run()
    .await
    .map_err(|_e| StartupError::ServerStart)?;

    Ok(())
}
