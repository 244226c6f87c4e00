mod auth;
mod cart;
mod catalog;
mod config;
mod error;
mod handlers;
mod models;
mod onboarding;
mod pricing;
mod services;
mod state;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};

use config::Config;
use services::supabase::SupabaseClient;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder().parse_filters(&filters).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };
    let client = SupabaseClient::new(&config).map_err(|e| {
        log::error!("failed to build platform client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let port = config.port;
    log::info!("ShareTraveller backend on 0.0.0.0:{} using {}", port, config.supabase_url);
    let app_state = web::Data::new(AppState::new(Arc::new(client), config));

    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(handlers::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
