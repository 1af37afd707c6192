// src/server/state.rs

//! Application state for the backend server.
//!
//! Shared between HTTP/WebSocket handlers and the actor system.

use std::sync::Arc;

use actix::Addr;

use crate::config::AppConfig;
use crate::server::coordinator::CoordinatorActor;
use crate::stats::MemoryStatsStore;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the session coordinator actor.
    pub coordinator: Addr<CoordinatorActor>,
    /// Store behind the stats worker, read directly by the HTTP API.
    pub stats_store: Arc<MemoryStatsStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        coordinator: Addr<CoordinatorActor>,
        stats_store: Arc<MemoryStatsStore>,
        config: AppConfig,
    ) -> Self {
        AppState {
            coordinator,
            stats_store,
            config,
        }
    }
}
