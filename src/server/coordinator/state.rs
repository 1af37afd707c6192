//! Session coordinator core.
//!
//! Owns every piece of shared matchmaking state: the connection arena, the lone waiting
//! slot, the match queue, the live sessions and the alternating-starter memory. It is a
//! plain synchronous state machine: each operation handles one inbound event to
//! completion and returns the [`Effect`]s it produced, in the order they must be
//! delivered. The actor in `server.rs` is the only caller in production and provides
//! the single-writer serialization.

use std::collections::HashMap;
use std::mem;

use log::{debug, error, info};

use crate::game::types::RoundOutcome;
use crate::server::messages::ServerMessage;
use crate::server::ws_error::PROMPT_EXPIRED;
use crate::stats::GameResult;

use super::error::CoordinatorError;
use super::queue::MatchQueue;
use super::session::{GameSession, Negotiation, Phase};
use super::types::{ConnectionId, Seat, SessionId};

/// Identity and session linkage bound to one connection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Connection {
    pub name: Option<String>,
    pub session: Option<SessionId>,
    pub opponent: Option<ConnectionId>,
}

/// Side effect requested by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send { to: ConnectionId, message: ServerMessage },
    /// Display-only stats lookup for `username`, delivered to every recipient.
    FetchStats { username: String, recipients: Vec<ConnectionId> },
    /// Round results to persist; each participant then receives refreshed stats.
    RecordOutcomes { results: Vec<(ConnectionId, String, GameResult)> },
    /// Start the expiry timer for the negotiation opened in `round`.
    ArmPromptTimer { session: SessionId, round: u32 },
}

#[derive(Debug, Default)]
pub struct Coordinator {
    connections: HashMap<ConnectionId, Connection>,
    /// A lone connection waiting for a first opponent.
    lone_waiting: Option<ConnectionId>,
    sessions: HashMap<SessionId, GameSession>,
    queue: MatchQueue,
    /// Whoever opened the most recently started round, across all sessions.
    last_opener: Option<ConnectionId>,
    effects: Vec<Effect>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- read access -----

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn session(&self, id: SessionId) -> Option<&GameSession> {
        self.sessions.get(&id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &GameSession> {
        self.sessions.values()
    }

    pub fn lone_waiting(&self) -> Option<ConnectionId> {
        self.lone_waiting
    }

    pub fn queue(&self) -> &MatchQueue {
        &self.queue
    }

    // ----- inbound events -----

    /// Transport handshake completed.
    pub fn connect(&mut self, id: ConnectionId) -> Vec<Effect> {
        self.connections.entry(id).or_default();
        debug!("[Coordinator] Connection {} opened", id);
        self.take_effects()
    }

    /// Bind `name` to the connection and, unless `auto_match` is off, admit it.
    pub fn register(&mut self, id: ConnectionId, name: &str, auto_match: bool) -> Vec<Effect> {
        let name = name.trim();
        let Some(conn) = self.connections.get_mut(&id) else {
            debug!("[Coordinator] Identify from unknown connection {}", id);
            return self.take_effects();
        };
        if name.is_empty() || conn.name.is_some() {
            debug!("[Coordinator] Ignored identify from {} (empty or already named)", id);
            return self.take_effects();
        }
        conn.name = Some(name.to_string());
        info!("[Coordinator] {} identified as {}", id, name);
        self.effects.push(Effect::FetchStats { username: name.to_string(), recipients: vec![id] });

        if auto_match {
            match self.lone_waiting.take() {
                Some(waiting) => self.start_session(waiting, id),
                None if self.sessions.is_empty() => self.make_lone_waiting(id),
                None => self.enqueue(id),
            }
        }
        self.take_effects()
    }

    /// Explicit (re)entry into matchmaking after the mode-selection step.
    pub fn request_match(&mut self, id: ConnectionId) -> Vec<Effect> {
        if !self.is_idle(id) {
            debug!("[Coordinator] Ignored match request from {}", id);
            return self.take_effects();
        }
        if self.queue.remove(id).is_some() {
            self.notify_queue_positions();
        }
        if self.lone_waiting != Some(id) && self.take_open_seat(id) {
            return self.take_effects();
        }
        match self.lone_waiting {
            Some(waiting) if waiting == id => self.send(id, ServerMessage::Waiting),
            Some(waiting) => {
                self.lone_waiting = None;
                self.start_session(waiting, id);
            }
            None => self.make_lone_waiting(id),
        }
        self.take_effects()
    }

    /// Explicit queue admission.
    pub fn join_queue(&mut self, id: ConnectionId) -> Vec<Effect> {
        if !self.is_idle(id) {
            debug!("[Coordinator] Ignored queue request from {}", id);
            return self.take_effects();
        }
        if self.lone_waiting == Some(id) {
            self.lone_waiting = None;
        }
        self.enqueue(id);
        self.take_effects()
    }

    /// Attempt to play `index` for the connection's seat.
    pub fn play(&mut self, id: ConnectionId, index: usize) -> Vec<Effect> {
        let Some((session_id, seat)) = self.seat_of(id) else {
            debug!("[Coordinator] Move from {} outside any session", id);
            return self.take_effects();
        };
        let Some(session) = self.sessions.get_mut(&session_id) else {
            return self.take_effects();
        };
        let Some(played) = session.play(seat, index) else {
            debug!("[Session] Rejected move {} from {} in {}", index, id, session_id);
            return self.take_effects();
        };
        debug!("[Session] {} played {:?} at {} in {}", id, played.mark, index, session_id);

        self.broadcast(
            session_id,
            ServerMessage::Move { index, mark: played.mark, turn: played.next_turn },
        );
        self.broadcast(session_id, ServerMessage::TurnUpdate { turn: played.next_turn });
        if let Some(outcome) = played.outcome {
            // Moves of this round are out before the outcome.
            self.finish_round(session_id, outcome);
        }
        self.take_effects()
    }

    /// Answer to a pending continue prompt.
    pub fn continue_choice(&mut self, id: ConnectionId, accept: bool) -> Vec<Effect> {
        let Some((session_id, seat)) = self.seat_of(id) else {
            return self.take_effects();
        };
        let Some(negotiation) = self.sessions.get(&session_id).and_then(|s| s.negotiation()).cloned()
        else {
            debug!("[Coordinator] Continue choice from {} with no pending prompt", id);
            return self.take_effects();
        };

        match negotiation {
            Negotiation::BothMustChoose { answers, .. } => {
                if answers[seat.index()].is_some() {
                    return self.take_effects();
                }
                let complete = self
                    .sessions
                    .get_mut(&session_id)
                    .and_then(|s| s.record_answer(seat, accept));
                if let Some(answers) = complete {
                    self.resolve_both(session_id, answers);
                }
            }
            Negotiation::WinnerDecides { winner } if winner == seat => {
                if accept {
                    self.seat_challenger(session_id, winner);
                } else {
                    info!("[Coordinator] Winner {} left session {}", id, session_id);
                    self.close_session(session_id);
                    self.enqueue(id);
                }
            }
            _ => debug!("[Coordinator] Continue choice from {} not expected", id),
        }
        self.take_effects()
    }

    /// Pass-through stats lookup for the requester.
    pub fn request_stats(&mut self, id: ConnectionId, username: &str) -> Vec<Effect> {
        if self.connections.contains_key(&id) {
            self.effects.push(Effect::FetchStats {
                username: username.to_string(),
                recipients: vec![id],
            });
        }
        self.take_effects()
    }

    /// Transport closed: drop every trace of the connection.
    pub fn disconnect(&mut self, id: ConnectionId) -> Vec<Effect> {
        let Some(conn) = self.connections.get(&id).cloned() else {
            return self.take_effects();
        };
        if self.queue.remove(id).is_some() {
            self.notify_queue_positions();
        }
        if self.lone_waiting == Some(id) {
            self.lone_waiting = None;
        }
        if self.last_opener == Some(id) {
            self.last_opener = None;
        }
        if let Some(session_id) = conn.session {
            self.seat_abandoned(session_id, id);
        }
        self.connections.remove(&id);
        info!("[Coordinator] Connection {} ({}) closed", id, conn.name.as_deref().unwrap_or("anonymous"));
        self.take_effects()
    }

    /// The continue prompt of `round` went unanswered for too long.
    pub fn prompt_expired(&mut self, session_id: SessionId, round: u32) -> Vec<Effect> {
        let Some(session) = self.sessions.get(&session_id) else {
            return self.take_effects();
        };
        if session.round() != round {
            return self.take_effects();
        }
        match session.negotiation().cloned() {
            Some(Negotiation::BothMustChoose { answers, .. }) => {
                info!("[Coordinator] Prompt expired in {}; silent seats leave", session_id);
                let silent: Vec<_> = Seat::BOTH
                    .into_iter()
                    .filter(|seat| answers[seat.index()].is_none())
                    .filter_map(|seat| session.occupant(seat))
                    .collect();
                for id in silent {
                    self.send(id, prompt_expired_notice());
                }
                let answers = [answers[0].unwrap_or(false), answers[1].unwrap_or(false)];
                self.resolve_both(session_id, answers);
            }
            Some(Negotiation::WinnerDecides { winner }) => {
                // Same as a decline: the session closes and the winner queues.
                info!("[Coordinator] Winner never answered in {}; closing", session_id);
                let winner = session.occupant(winner);
                if let Some(id) = winner {
                    self.send(id, prompt_expired_notice());
                }
                self.close_session(session_id);
                if let Some(id) = winner {
                    self.enqueue(id);
                }
            }
            _ => {}
        }
        self.take_effects()
    }

    // ----- seat replacement -----

    /// Seat `incoming` in the vacant `seat` of a running session and start a fresh round
    /// against the remaining occupant. Whoever left that seat has already been dealt with.
    /// The frames it produces are delivered with the next drained batch.
    pub fn replace_seat(
        &mut self,
        session_id: SessionId,
        seat: Seat,
        incoming: ConnectionId,
    ) -> Result<(), CoordinatorError> {
        let incumbent = self.check_vacancy(session_id, seat)?;
        if !self.connections.contains_key(&incoming) {
            return Err(CoordinatorError::UnknownConnection(incoming));
        }
        let session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(CoordinatorError::SessionNotFound(session_id))?;
        session.fill(seat, incoming)?;
        session.start_next_round();

        if let Some(conn) = self.connections.get_mut(&incoming) {
            conn.session = Some(session_id);
            conn.opponent = Some(incumbent);
        }
        if let Some(conn) = self.connections.get_mut(&incumbent) {
            conn.opponent = Some(incoming);
        }
        info!(
            "[Coordinator] {} took seat {:?} of session {} against {}",
            incoming, seat, session_id, incumbent
        );
        self.begin_round(session_id);
        self.push_pairing_stats(incumbent, incoming);
        Ok(())
    }

    /// Pop the queue head into `seat`, validating before anything is dequeued.
    fn fill_from_queue(&mut self, session_id: SessionId, seat: Seat) -> Result<bool, CoordinatorError> {
        self.check_vacancy(session_id, seat)?;
        let Some(incoming) = self.queue.pop_front() else {
            return Ok(false);
        };
        self.notify_queue_positions();
        self.replace_seat(session_id, seat, incoming)?;
        Ok(true)
    }

    /// The seat must be vacant and the other one occupied. Returns the occupant.
    fn check_vacancy(&self, session_id: SessionId, seat: Seat) -> Result<ConnectionId, CoordinatorError> {
        let session = self
            .sessions
            .get(&session_id)
            .ok_or(CoordinatorError::SessionNotFound(session_id))?;
        if session.occupant(seat).is_some() {
            return Err(CoordinatorError::SeatOccupied { session: session_id, seat });
        }
        session
            .occupant(seat.other())
            .ok_or(CoordinatorError::NoIncumbent { session: session_id, seat })
    }

    /// The winner accepted: bring in the next queued connection, or hold the seat open.
    fn seat_challenger(&mut self, session_id: SessionId, winner: Seat) {
        match self.fill_from_queue(session_id, winner.other()) {
            Ok(true) => {}
            Ok(false) => {
                if let Some(session) = self.sessions.get_mut(&session_id) {
                    session.await_resolution(Negotiation::AwaitingChallenger { winner });
                    if let Some(id) = session.occupant(winner) {
                        self.send(id, ServerMessage::WaitingForOpponent);
                    }
                }
            }
            Err(e) => error!("[Coordinator] Seat replacement aborted: {}", e),
        }
    }

    /// Seat `id` directly in a session holding a seat open for a challenger, if any.
    fn take_open_seat(&mut self, id: ConnectionId) -> bool {
        let Some((session_id, seat)) = self.open_seat() else { return false };
        match self.replace_seat(session_id, seat, id) {
            Ok(()) => true,
            Err(e) => {
                error!("[Coordinator] Seat replacement aborted: {}", e);
                false
            }
        }
    }

    fn open_seat(&self) -> Option<(SessionId, Seat)> {
        self.sessions.values().find_map(|s| match s.negotiation() {
            Some(Negotiation::AwaitingChallenger { winner }) => Some((s.id, winner.other())),
            _ => None,
        })
    }

    /// Hand queued connections to sessions holding a seat open for a challenger.
    fn fill_open_seats(&mut self) {
        while !self.queue.is_empty() {
            let Some((session_id, seat)) = self.open_seat() else { break };
            if let Err(e) = self.fill_from_queue(session_id, seat) {
                error!("[Coordinator] Seat replacement aborted: {}", e);
                break;
            }
        }
    }

    // ----- round lifecycle -----

    fn start_session(&mut self, first: ConnectionId, second: ConnectionId) {
        let first_seat = if self.last_opener == Some(first) { Seat::B } else { Seat::A };
        let session_id = SessionId::new();
        self.sessions
            .insert(session_id, GameSession::new(session_id, first, second, first_seat));
        for (id, opponent) in [(first, second), (second, first)] {
            if let Some(conn) = self.connections.get_mut(&id) {
                conn.session = Some(session_id);
                conn.opponent = Some(opponent);
            }
        }
        info!("[Coordinator] Session {} created for {} and {}", session_id, first, second);
        self.begin_round(session_id);
        self.push_pairing_stats(first, second);
    }

    /// Announce marks for the round that just started, opener first.
    fn begin_round(&mut self, session_id: SessionId) {
        let Some(session) = self.sessions.get(&session_id) else { return };
        let opener_seat = session.first_seat();
        let mut announcements = Vec::with_capacity(2);
        for seat in [opener_seat, opener_seat.other()] {
            if let (Some(id), Some(opponent)) = (session.occupant(seat), session.occupant(seat.other())) {
                announcements.push((id, session.mark_of(seat), opponent));
            }
        }
        self.last_opener = session.occupant(opener_seat);
        debug!("[Session] Round {} of {} begins", session.round(), session_id);

        for (id, mark, opponent) in announcements {
            let opponent_name = self.name_of(opponent);
            self.send(id, ServerMessage::match_started(mark, &opponent_name));
        }
    }

    fn finish_round(&mut self, session_id: SessionId, outcome: RoundOutcome) {
        self.broadcast(session_id, ServerMessage::GameOver { winner: outcome.winner() });
        let Some(session) = self.sessions.get(&session_id) else { return };
        let round = session.round();
        let winner = outcome.winner().map(|mark| session.seat_with_mark(mark));
        info!("[Session] Round {} of {} over: {:?}", round, session_id, outcome);

        let results: Vec<_> = session
            .occupants()
            .map(|(seat, id)| {
                let result = match winner {
                    None => GameResult::Draw,
                    Some(w) if w == seat => GameResult::Win,
                    Some(_) => GameResult::Loss,
                };
                (id, self.name_of(id), result)
            })
            .collect();
        self.effects.push(Effect::RecordOutcomes { results });

        match (winner, self.queue.is_empty()) {
            (winner, true) => {
                self.set_negotiation(session_id, Negotiation::BothMustChoose { answers: [None, None], winner });
                let order = match winner {
                    Some(w) => [w, w.other()],
                    None => Seat::BOTH,
                };
                for seat in order {
                    self.prompt(session_id, seat);
                }
                self.effects.push(Effect::ArmPromptTimer { session: session_id, round });
            }
            (None, false) => {
                if let Some(session) = self.sessions.get_mut(&session_id) {
                    session.start_next_round();
                }
                self.begin_round(session_id);
            }
            (Some(winner), false) => {
                self.set_negotiation(session_id, Negotiation::WinnerDecides { winner });
                self.prompt(session_id, winner);
                let loser = self
                    .sessions
                    .get_mut(&session_id)
                    .and_then(|s| s.vacate(winner.other()));
                if let Some(loser) = loser {
                    self.unlink(loser);
                    if let Some(id) = self.sessions.get(&session_id).and_then(|s| s.occupant(winner)) {
                        if let Some(conn) = self.connections.get_mut(&id) {
                            conn.opponent = None;
                        }
                    }
                    self.enqueue(loser);
                }
                self.effects.push(Effect::ArmPromptTimer { session: session_id, round });
            }
        }
    }

    /// Settle a both-must-choose negotiation once every answer is in.
    fn resolve_both(&mut self, session_id: SessionId, answers: [bool; 2]) {
        let Some(session) = self.sessions.get_mut(&session_id) else { return };
        let all_present = session.occupants().count() == 2;
        if answers == [true, true] && all_present {
            info!("[Coordinator] Both seats continue in {}", session_id);
            session.start_next_round();
            self.begin_round(session_id);
            return;
        }

        let order = match session.negotiation() {
            Some(Negotiation::BothMustChoose { winner: Some(w), .. }) => [*w, w.other()],
            _ => Seat::BOTH,
        };
        let continuing: Vec<ConnectionId> = order
            .into_iter()
            .filter(|seat| answers[seat.index()])
            .filter_map(|seat| session.occupant(seat))
            .collect();
        info!("[Coordinator] Session {} ends after negotiation", session_id);
        self.close_session(session_id);
        for id in continuing {
            self.enqueue(id);
        }
    }

    /// A seated connection went away.
    fn seat_abandoned(&mut self, session_id: SessionId, id: ConnectionId) {
        let Some(session) = self.sessions.get_mut(&session_id) else { return };
        let Some(seat) = session.seat_of(id) else { return };
        session.vacate(seat);
        let phase = session.phase().clone();
        let remaining = session.occupant(seat.other());
        self.unlink(id);

        if let Some(opponent) = remaining {
            if let Some(conn) = self.connections.get_mut(&opponent) {
                conn.opponent = None;
            }
            self.send(opponent, ServerMessage::OpponentLeft);
        }

        match phase {
            Phase::Active => {
                if remaining.is_some() && !self.queue.is_empty() {
                    if let Err(e) = self.fill_from_queue(session_id, seat) {
                        error!("[Coordinator] Seat replacement aborted: {}", e);
                    }
                } else {
                    self.close_session(session_id);
                }
            }
            Phase::AwaitingResolution(Negotiation::BothMustChoose { .. }) => {
                let complete = self
                    .sessions
                    .get_mut(&session_id)
                    .and_then(|s| s.record_answer(seat, false));
                if let Some(answers) = complete {
                    self.resolve_both(session_id, answers);
                }
            }
            Phase::AwaitingResolution(_) => self.close_session(session_id),
        }
    }

    /// Remove a session from the live set and clear its occupants' back-references.
    fn close_session(&mut self, session_id: SessionId) {
        let Some(session) = self.sessions.remove(&session_id) else { return };
        for (_, id) in session.occupants() {
            self.unlink(id);
        }
        info!("[Coordinator] Session {} closed ({} live)", session_id, self.sessions.len());
        self.promote_idle_queue();
    }

    // ----- queue handling -----

    fn enqueue(&mut self, id: ConnectionId) {
        if self.queue.remove(id).is_some() {
            self.notify_queue_positions();
        }
        let position = self.queue.push(id);
        debug!("[Queue] {} queued at position {}", id, position);
        self.send(id, ServerMessage::QueuePosition { position });
        self.fill_open_seats();
        self.promote_idle_queue();
    }

    /// With no session running the queue has nothing to wait for: pair its head with the
    /// lone waiting connection, or make it the lone waiting connection.
    fn promote_idle_queue(&mut self) {
        let mut moved = false;
        while self.sessions.is_empty() {
            let Some(next) = self.queue.pop_front() else { break };
            moved = true;
            match self.lone_waiting.take() {
                Some(waiting) => self.start_session(waiting, next),
                None => self.make_lone_waiting(next),
            }
        }
        if moved {
            self.notify_queue_positions();
        }
    }

    fn notify_queue_positions(&mut self) {
        let positions: Vec<_> = self.queue.positions().collect();
        for (id, position) in positions {
            self.send(id, ServerMessage::QueuePosition { position });
        }
    }

    fn make_lone_waiting(&mut self, id: ConnectionId) {
        self.lone_waiting = Some(id);
        self.send(id, ServerMessage::Waiting);
    }

    // ----- helpers -----

    /// Named, known, and not holding a seat.
    fn is_idle(&self, id: ConnectionId) -> bool {
        self.connections
            .get(&id)
            .is_some_and(|conn| conn.name.is_some() && conn.session.is_none())
    }

    fn seat_of(&self, id: ConnectionId) -> Option<(SessionId, Seat)> {
        let session_id = self.connections.get(&id)?.session?;
        let seat = self.sessions.get(&session_id)?.seat_of(id)?;
        Some((session_id, seat))
    }

    fn set_negotiation(&mut self, session_id: SessionId, negotiation: Negotiation) {
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.await_resolution(negotiation);
        }
    }

    fn prompt(&mut self, session_id: SessionId, seat: Seat) {
        if let Some(id) = self.sessions.get(&session_id).and_then(|s| s.occupant(seat)) {
            self.send(id, ServerMessage::ContinuePrompt);
        }
    }

    fn unlink(&mut self, id: ConnectionId) {
        if let Some(conn) = self.connections.get_mut(&id) {
            conn.session = None;
            conn.opponent = None;
        }
    }

    fn name_of(&self, id: ConnectionId) -> String {
        self.connections
            .get(&id)
            .and_then(|conn| conn.name.clone())
            .unwrap_or_default()
    }

    /// Each side gets its own stats, then its opponent's.
    fn push_pairing_stats(&mut self, a: ConnectionId, b: ConnectionId) {
        for (id, other) in [(a, b), (b, a)] {
            let username = self.name_of(id);
            self.effects.push(Effect::FetchStats { username, recipients: vec![id, other] });
        }
    }

    fn broadcast(&mut self, session_id: SessionId, message: ServerMessage) {
        let Some(session) = self.sessions.get(&session_id) else { return };
        let targets: Vec<_> = session.occupants().map(|(_, id)| id).collect();
        for id in targets {
            self.send(id, message.clone());
        }
    }

    fn send(&mut self, to: ConnectionId, message: ServerMessage) {
        self.effects.push(Effect::Send { to, message });
    }

    fn take_effects(&mut self) -> Vec<Effect> {
        mem::take(&mut self.effects)
    }
}

/// Sent to a seat removed because its continue prompt went unanswered.
fn prompt_expired_notice() -> ServerMessage {
    ServerMessage::error(PROMPT_EXPIRED, "The continue prompt expired; you left the session.")
}
