use thiserror::Error;

use super::types::{ConnectionId, Seat, SessionId};

/// Coordinator invariant violations. Each one aborts the operation that hit it
/// and leaves every other piece of state as it was.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("session {0} is not in the live set")]
    SessionNotFound(SessionId),
    #[error("seat {seat:?} of session {session} is already occupied")]
    SeatOccupied { session: SessionId, seat: Seat },
    #[error("seat {seat:?} of session {session} has no remaining occupant to pair with")]
    NoIncumbent { session: SessionId, seat: Seat },
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),
}
