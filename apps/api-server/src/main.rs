//! # Gazette API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::middleware::ErrorHandlers;
use actix_web::{App, HttpServer, ResponseError, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;

use config::AppConfig;
use gazette_core::ports::{PasswordService, TokenService};
use gazette_infra::{Argon2PasswordService, JwtTokenService};
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Gazette API Server on {}:{}",
        config.host,
        config.port
    );

    let db = match gazette_infra::database::connect(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(db, config.page_size);

    let token_service: web::Data<Arc<dyn TokenService>> =
        web::Data::new(Arc::new(JwtTokenService::from_env()));
    let password_service: web::Data<Arc<dyn PasswordService>> =
        web::Data::new(Arc::new(Argon2PasswordService::new()));

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::FORBIDDEN, handlers::render_403)
                    .handler(StatusCode::INTERNAL_SERVER_ERROR, handlers::render_500),
            )
            .app_data(web::Data::new(state.clone()))
            .app_data(token_service.clone())
            .app_data(password_service.clone())
            .app_data(not_found_path_config())
            .configure(handlers::configure_routes)
            .default_service(web::route().to(handlers::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

/// Malformed path segments (e.g. a bad UUID in `/posts/{post_id}/`)
/// read as a missing resource, not a client error.
pub fn not_found_path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        actix_web::error::InternalError::from_response(
            err,
            middleware::error::AppError::NotFound("No such page".to_string()).error_response(),
        )
        .into()
    })
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,api_server=debug,gazette_infra=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}
