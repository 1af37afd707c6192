//! Main entry point for the backend server.
//!
//! Initializes the actor system (stats worker, session coordinator), configures the
//! application state, and launches the HTTP server with its WebSocket endpoint.

use std::sync::Arc;

use actix::Actor;
use actix_web::{App, HttpServer, web};
use log::info;

use config::AppConfig;
use server::coordinator::CoordinatorActor;
use stats::{MemoryStatsStore, StatsWorker};

pub mod config;
mod game;
mod server;
mod stats;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    info!("[Server] Starting with {:?}", config);

    // Stats I/O runs on its own actor, outside the coordinator's mailbox.
    let stats_store = Arc::new(MemoryStatsStore::new());
    let stats_worker = StatsWorker::new(Arc::clone(&stats_store), config.stats_timeout).start();

    let coordinator = CoordinatorActor::new(
        stats_worker.clone().recipient(),
        stats_worker.recipient(),
        config.prompt_timeout,
    )
    .start();

    // Shared application state for HTTP/WebSocket handlers.
    let bind_addr = config.bind_addr();
    let state = web::Data::new(server::state::AppState::new(coordinator, stats_store, config));

    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*")),
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind(bind_addr)?
    .run()
    .await
}
