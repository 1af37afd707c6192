//! Wire protocol between clients and the server.
//!
//! Every frame is a JSON object of the form `{"action": <kind>, "data": <payload>}`.

use actix::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::types::Mark;
use crate::stats::PlayerStats;

fn default_auto_match() -> bool {
    true
}

// Message client -> serveur
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", content = "data")]
pub enum ClientMessage {
    /// Bind a display name. With `auto_match` off, admission waits for `RequestMatch`.
    Identify {
        name: String,
        #[serde(default = "default_auto_match")]
        auto_match: bool,
    },
    RequestMatch,
    JoinQueue,
    Move {
        index: usize,
    },
    ContinueChoice {
        accept: bool,
    },
    RequestStats {
        username: String,
    },
    Ping,
}

// Message serveur -> client
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "action", content = "data")]
pub enum ServerMessage {
    Waiting,
    QueuePosition {
        position: usize,
    },
    MatchStarted {
        mark: Mark,
        opponent: String,
    },
    Move {
        index: usize,
        mark: Mark,
        turn: Mark,
    },
    TurnUpdate {
        turn: Mark,
    },
    GameOver {
        winner: Option<Mark>,
    },
    ContinuePrompt,
    OpponentLeft,
    WaitingForOpponent,
    StatsUpdate {
        stats: PlayerStats,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ServerMessage {
    pub fn match_started(mark: Mark, opponent: &str) -> Self {
        Self::MatchStarted { mark, opponent: opponent.to_string() }
    }
    pub fn error(code: &str, message: &str) -> Self {
        Self::Error { code: code.to_string(), message: message.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_defaults_to_auto_match() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"Identify","data":{"name":"alice"}}"#).unwrap();
        assert_eq!(msg, ClientMessage::Identify { name: "alice".into(), auto_match: true });
    }

    #[test]
    fn unit_actions_need_no_payload() {
        let msg: ClientMessage = serde_json::from_str(r#"{"action":"RequestMatch"}"#).unwrap();
        assert_eq!(msg, ClientMessage::RequestMatch);
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"ContinueChoice","data":{"accept":false}}"#).unwrap();
        assert_eq!(msg, ClientMessage::ContinueChoice { accept: false });
    }

    #[test]
    fn outbound_frames_use_action_and_data() {
        let json = serde_json::to_value(ServerMessage::match_started(Mark::X, "bob")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "MatchStarted", "data": {"mark": "X", "opponent": "bob"}})
        );
        let json = serde_json::to_value(ServerMessage::GameOver { winner: None }).unwrap();
        assert_eq!(json, serde_json::json!({"action": "GameOver", "data": {"winner": null}}));
    }
}
