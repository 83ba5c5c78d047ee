//! Main entry point for the anonymous chat server.
//!
//! Loads configuration, starts the session controller actor and launches the
//! HTTP server with the chat WebSocket endpoint.

use actix::Actor;
use actix_web::{web, App, HttpServer};
use log::info;

use chat::controller::SessionController;
use config::server::ServerConfig;
use server::directory::SessionDirectory;

pub mod config;
mod chat;
mod server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // A local .env is optional; real deployments set the environment directly.
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    // Start the SessionController actor (owns the wait queue, pairings and live sessions).
    let controller = SessionController::new(SessionDirectory::new()).start();

    // Shared application state for HTTP/WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(controller));

    info!("[Main] Listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*"))
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
