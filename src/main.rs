pub mod health;
pub mod modules;
pub mod shared;
pub use modules::upload;

use crate::shared::api::fallback::route_not_found;
use crate::shared::config::AppConfig;
use crate::shared::telemetry::{init_tracing, LogFormat};
use crate::upload::adapter::outgoing::cloud_storage::GcsObjectStorage;
use crate::upload::application::{
    services::UploadFileService, upload_use_cases::UploadUseCases,
};

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use tracing::info;

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub upload: UploadUseCases,
}

#[actix_web::main]
#[cfg(not(tarpaulin_include))]
async fn start() -> anyhow::Result<()> {
    // Try .env.{environment} first, then fall back to .env
    let env = std::env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
    let env_file = format!(".env.{}", env);
    if dotenvy::from_filename(&env_file).is_err() {
        dotenvy::dotenv().ok();
    }

    init_tracing(LogFormat::from_env());

    info!("Starting upload proxy...");

    let config = AppConfig::from_env()?;

    info!(
        bucket = %config.storage.bucket,
        allowed_extensions = ?config.policy.allowed_extensions(),
        max_file_size_bytes = ?config.policy.max_file_size_bytes(),
        public_read = config.storage.public_read,
        "Upload policy loaded"
    );

    let storage = GcsObjectStorage::new(config.storage.clone());
    let state = AppState {
        upload: UploadUseCases {
            policy: Arc::new(config.policy.clone()),
            upload_file: Arc::new(UploadFileService::new(storage)),
        },
    };

    let server_url = config.server_address();
    info!("Server run on: {}", server_url);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(init_routes)
            .default_service(web::to(route_not_found))
    });

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server
        .bind((config.host.as_str(), config.port))?
        .run()
        .await?;

    Ok(())
}

#[cfg(not(tarpaulin_include))]
fn init_routes(cfg: &mut web::ServiceConfig) {
    // Health
    cfg.service(crate::health::health);
    cfg.service(crate::health::healthz);
    // Upload
    cfg.configure(crate::upload::adapter::incoming::web::routes::configure_upload_routes);
}

#[cfg(not(tarpaulin_include))]
fn main() {
    if let Err(e) = start() {
        eprintln!("Error starting app: {e}");
        std::process::exit(1);
    }
}
