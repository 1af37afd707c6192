//! State of one match between two seats.
//!
//! A session alternates between `Phase::Active` (moves accepted) and
//! `Phase::AwaitingResolution` (the post-round negotiation). Teardown is done by the
//! coordinator removing the session from its live set.

use crate::game::board::Board;
use crate::game::types::{Mark, RoundOutcome};

use super::error::CoordinatorError;
use super::types::{ConnectionId, Seat, SessionId};

/// Post-round negotiation. Exactly one shape is live at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Negotiation {
    /// The queue was empty when the round ended: both seats answer.
    /// `winner` orders re-queueing when the answers disagree.
    BothMustChoose {
        answers: [Option<bool>; 2],
        winner: Option<Seat>,
    },
    /// Someone was queued when `winner` won. The losing seat is already vacant.
    WinnerDecides { winner: Seat },
    /// The winner accepted but nobody was queued; the next queue arrival takes the open seat.
    AwaitingChallenger { winner: Seat },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Active,
    AwaitingResolution(Negotiation),
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Played {
    pub mark: Mark,
    pub next_turn: Mark,
    pub outcome: Option<RoundOutcome>,
}

#[derive(Debug)]
pub struct GameSession {
    pub id: SessionId,
    seats: [Option<ConnectionId>; 2],
    board: Board,
    turn: Mark,
    first_seat: Seat,
    round: u32,
    phase: Phase,
}

impl GameSession {
    pub fn new(id: SessionId, seat_a: ConnectionId, seat_b: ConnectionId, first_seat: Seat) -> Self {
        Self {
            id,
            seats: [Some(seat_a), Some(seat_b)],
            board: Board::new(),
            turn: Mark::X,
            first_seat,
            round: 1,
            phase: Phase::Active,
        }
    }

    pub fn occupant(&self, seat: Seat) -> Option<ConnectionId> {
        self.seats[seat.index()]
    }

    pub fn occupants(&self) -> impl Iterator<Item = (Seat, ConnectionId)> + '_ {
        Seat::BOTH
            .into_iter()
            .filter_map(|seat| self.occupant(seat).map(|id| (seat, id)))
    }

    pub fn seat_of(&self, id: ConnectionId) -> Option<Seat> {
        Seat::BOTH.into_iter().find(|&seat| self.occupant(seat) == Some(id))
    }

    /// Mark played by `seat` in the current round.
    pub fn mark_of(&self, seat: Seat) -> Mark {
        if seat == self.first_seat { Mark::X } else { Mark::O }
    }

    pub fn seat_with_mark(&self, mark: Mark) -> Seat {
        if mark == Mark::X { self.first_seat } else { self.first_seat.other() }
    }

    pub fn first_seat(&self) -> Seat {
        self.first_seat
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn negotiation(&self) -> Option<&Negotiation> {
        match &self.phase {
            Phase::AwaitingResolution(negotiation) => Some(negotiation),
            Phase::Active => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Apply a move from `seat`. Anything out of turn, on a taken cell, or outside an
    /// active round is rejected without touching state.
    pub fn play(&mut self, seat: Seat, index: usize) -> Option<Played> {
        if !self.is_active() || self.occupant(seat).is_none() {
            return None;
        }
        let mark = self.mark_of(seat);
        if mark != self.turn || !self.board.place(index, mark) {
            return None;
        }
        self.turn = mark.other();
        Some(Played {
            mark,
            next_turn: self.turn,
            outcome: self.board.outcome(),
        })
    }

    /// Enter the negotiation window after a terminal move.
    pub fn await_resolution(&mut self, negotiation: Negotiation) {
        self.phase = Phase::AwaitingResolution(negotiation);
    }

    /// Store one seat's answer in a both-must-choose negotiation.
    /// Returns both answers once the second one arrives.
    pub fn record_answer(&mut self, seat: Seat, accept: bool) -> Option<[bool; 2]> {
        let Phase::AwaitingResolution(Negotiation::BothMustChoose { answers, .. }) = &mut self.phase else {
            return None;
        };
        answers[seat.index()] = Some(accept);
        match answers {
            [Some(a), Some(b)] => Some([*a, *b]),
            _ => None,
        }
    }

    /// Clear the seat and hand back whoever sat there.
    pub fn vacate(&mut self, seat: Seat) -> Option<ConnectionId> {
        self.seats[seat.index()].take()
    }

    /// Put `incoming` into a vacant seat.
    pub fn fill(&mut self, seat: Seat, incoming: ConnectionId) -> Result<(), CoordinatorError> {
        if self.occupant(seat).is_some() {
            return Err(CoordinatorError::SeatOccupied { session: self.id, seat });
        }
        self.seats[seat.index()] = Some(incoming);
        Ok(())
    }

    /// Clear the board, hand the opening mark to the other seat and reopen play.
    pub fn start_next_round(&mut self) {
        self.board.reset();
        self.turn = Mark::X;
        self.first_seat = self.first_seat.other();
        self.round += 1;
        self.phase = Phase::Active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (GameSession, ConnectionId, ConnectionId) {
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        (GameSession::new(SessionId::new(), a, b, Seat::A), a, b)
    }

    #[test]
    fn turn_alternates_and_mistimed_moves_are_ignored() {
        let (mut session, _, _) = session();
        assert_eq!(session.play(Seat::B, 0), None);

        let played = session.play(Seat::A, 0).unwrap();
        assert_eq!((played.mark, played.next_turn), (Mark::X, Mark::O));

        // Same seat again, then an occupied cell.
        assert_eq!(session.play(Seat::A, 1), None);
        assert_eq!(session.play(Seat::B, 0), None);
        assert_eq!(session.turn(), Mark::O);
        assert_eq!(session.board().get(0), Some(Mark::X));

        assert!(session.play(Seat::B, 4).is_some());
        assert_eq!(session.turn(), Mark::X);
    }

    #[test]
    fn terminal_move_reports_outcome_and_blocks_further_play() {
        let (mut session, _, _) = session();
        for (seat, index) in [(Seat::A, 0), (Seat::B, 3), (Seat::A, 1), (Seat::B, 4)] {
            assert_eq!(session.play(seat, index).unwrap().outcome, None);
        }
        let last = session.play(Seat::A, 2).unwrap();
        assert_eq!(last.outcome, Some(RoundOutcome::Win(Mark::X)));

        session.await_resolution(Negotiation::WinnerDecides { winner: Seat::A });
        assert_eq!(session.play(Seat::B, 8), None);
    }

    #[test]
    fn next_round_flips_the_opening_seat() {
        let (mut session, _, _) = session();
        assert_eq!(session.mark_of(Seat::A), Mark::X);
        session.play(Seat::A, 0);
        session.start_next_round();

        assert_eq!(session.first_seat(), Seat::B);
        assert_eq!(session.mark_of(Seat::A), Mark::O);
        assert_eq!(session.seat_with_mark(Mark::X), Seat::B);
        assert_eq!(session.turn(), Mark::X);
        assert_eq!(session.round(), 2);
        assert_eq!(session.board().get(0), None);
    }

    #[test]
    fn answers_complete_only_when_both_seats_reply() {
        let (mut session, _, _) = session();
        session.await_resolution(Negotiation::BothMustChoose { answers: [None, None], winner: None });
        assert_eq!(session.record_answer(Seat::B, true), None);
        assert_eq!(session.record_answer(Seat::A, false), Some([false, true]));
    }

    #[test]
    fn seats_can_only_be_filled_when_vacant() {
        let (mut session, a, _) = session();
        let c = ConnectionId::new();
        assert!(session.fill(Seat::A, c).is_err());
        assert_eq!(session.vacate(Seat::A), Some(a));
        assert_eq!(session.fill(Seat::A, c), Ok(()));
        assert_eq!(session.seat_of(c), Some(Seat::A));
    }
}
