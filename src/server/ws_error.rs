/// Centralized helpers for WebSocket and HTTP error responses.
///
/// Every error carries a stable code and a human-readable message.
use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;

use crate::server::messages::ServerMessage;

pub const INVALID_MESSAGE: &str = "INVALID_MESSAGE";
pub const RATE_LIMITED: &str = "RATE_LIMITED";
pub const STATS_UNAVAILABLE: &str = "STATS_UNAVAILABLE";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
pub const PROMPT_EXPIRED: &str = "PROMPT_EXPIRED";
pub const INVALID_USERNAME: &str = "INVALID_USERNAME";

/// Formats a WebSocket error frame as a JSON string.
pub fn ws_error_message(code: &str, message: &str) -> String {
    serde_json::to_string(&ServerMessage::error(code, message)).unwrap_or_else(|_| {
        format!(r#"{{"action":"Error","data":{{"code":"{}","message":""}}}}"#, INTERNAL_ERROR)
    })
}

/// Returns an HTTP error response with a JSON body.
pub fn http_error_response(code: &str, message: &str, status: StatusCode) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "error": { "code": code, "message": message }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_error_is_a_regular_error_frame() {
        let text = ws_error_message(INVALID_MESSAGE, "Invalid client message");
        let frame: ServerMessage = serde_json::from_str(&text).unwrap();
        assert_eq!(frame, ServerMessage::error(INVALID_MESSAGE, "Invalid client message"));
    }

    #[test]
    fn http_error_keeps_status() {
        let response = http_error_response(STATS_UNAVAILABLE, "down", StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
