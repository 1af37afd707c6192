//! HTTP endpoints over the statistics store.

use actix_web::{HttpResponse, http::StatusCode, web};
use log::{info, warn};
use serde::Deserialize;

use crate::config::matchmaking::RANKINGS_LIMIT;
use crate::server::state::AppState;
use crate::server::ws_error::{INVALID_USERNAME, STATS_UNAVAILABLE, http_error_response};
use crate::stats::{GameResult, StatsError, StatsStore, bounded};

fn stats_unavailable(what: &str, e: StatsError) -> HttpResponse {
    warn!("[Stats] {} failed: {}", what, e);
    http_error_response(
        STATS_UNAVAILABLE,
        "Statistics are temporarily unavailable.",
        StatusCode::SERVICE_UNAVAILABLE,
    )
}

/// `GET /api/stats/{username}`: the same payload pushed in `StatsUpdate` frames.
pub async fn get_player_stats(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let username = path.into_inner();
    let lookup = data.stats_store.get_stats(&username);
    match bounded(data.config.stats_timeout, lookup).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => stats_unavailable(&format!("Lookup for {}", username), e),
    }
}

/// `GET /api/rankings`: top players by winrate.
pub async fn get_rankings(data: web::Data<AppState>) -> HttpResponse {
    let lookup = data.stats_store.rankings(RANKINGS_LIMIT);
    match bounded(data.config.stats_timeout, lookup).await {
        Ok(rankings) => HttpResponse::Ok().json(rankings),
        Err(e) => stats_unavailable("Rankings lookup", e),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatsRequest {
    pub username: String,
    pub result: GameResult,
}

/// `POST /api/update-stats`: record a game played outside the server (e.g. against a
/// local bot) and return the refreshed stats.
pub async fn update_stats(
    body: web::Json<UpdateStatsRequest>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let UpdateStatsRequest { username, result } = body.into_inner();
    let username = username.trim();
    if username.is_empty() {
        return http_error_response(
            INVALID_USERNAME,
            "A username is required.",
            StatusCode::BAD_REQUEST,
        );
    }

    let timeout = data.config.stats_timeout;
    if let Err(e) = bounded(timeout, data.stats_store.record_outcome(username, result)).await {
        return stats_unavailable(&format!("Recording {:?} for {}", result, username), e);
    }
    info!("[Stats] Recorded external {:?} for {}", result, username);
    match bounded(timeout, data.stats_store.get_stats(username)).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => stats_unavailable(&format!("Lookup for {}", username), e),
    }
}
