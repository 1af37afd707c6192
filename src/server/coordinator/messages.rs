use actix::prelude::*;

use super::types::ConnectionId;
use crate::server::messages::{ClientMessage, ServerMessage};

/// Message: a transport handshake completed.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: ConnectionId,
    pub addr: Recipient<ServerMessage>,
}

/// Message: a transport closed.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: ConnectionId,
}

/// Message: a decoded client frame.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientEvent {
    pub id: ConnectionId,
    pub msg: ClientMessage,
}
