//! HTTP and WebSocket routing configuration.

use actix_web::web;

use crate::server::api::{get_player_stats, get_rankings, update_stats};
use crate::server::ws_session::ws_connect;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").to(ws_connect))
        .service(web::resource("/api/stats/{username}").route(web::get().to(get_player_stats)))
        .service(web::resource("/api/rankings").route(web::get().to(get_rankings)))
        .service(web::resource("/api/update-stats").route(web::post().to(update_stats)));
}
