// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the backend server components:
//! - Application state and HTTP/WebSocket routing
//! - The wire protocol and its error frames
//! - The per-connection WebSocket actor with flood protection
//! - The session coordinator (admission, sessions, rematch negotiation)

pub mod anti_spam;
pub mod api;
pub mod coordinator;
pub mod messages;
pub mod router;
pub mod state;
pub mod ws_error;
pub mod ws_session;
