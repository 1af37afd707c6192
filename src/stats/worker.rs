/// Stats worker actor.
///
/// Receives fire-and-forget record/fetch requests from the coordinator, runs them
/// against the store with a bounded wait, and pushes `StatsUpdate` frames to the
/// interested connections. Failures are logged and otherwise dropped.
use std::sync::Arc;
use std::time::Duration;

use actix::prelude::*;
use log::{debug, warn};

use super::bounded;
use super::store::{GameResult, StatsStore};
use crate::server::messages::ServerMessage;

/// Message: look up `username` and deliver the result to every recipient.
#[derive(Message)]
#[rtype(result = "()")]
pub struct FetchStats {
    pub username: String,
    pub recipients: Vec<Recipient<ServerMessage>>,
}

/// One participant's result of a finished round.
pub struct RecordedResult {
    pub username: String,
    pub result: GameResult,
    /// Receives the refreshed stats once recorded.
    pub notify: Option<Recipient<ServerMessage>>,
}

/// Message: record the results of a finished round, then push refreshed stats.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RecordOutcomes {
    pub results: Vec<RecordedResult>,
}

pub struct StatsWorker<S: StatsStore> {
    store: Arc<S>,
    timeout: Duration,
}

impl<S: StatsStore> StatsWorker<S> {
    pub fn new(store: Arc<S>, timeout: Duration) -> Self {
        Self { store, timeout }
    }
}

impl<S: StatsStore> Actor for StatsWorker<S> {
    type Context = Context<Self>;
}

impl<S: StatsStore> Handler<FetchStats> for StatsWorker<S> {
    type Result = ();

    fn handle(&mut self, msg: FetchStats, _ctx: &mut Self::Context) -> Self::Result {
        let store = Arc::clone(&self.store);
        let timeout = self.timeout;
        actix::spawn(async move {
            match bounded(timeout, store.get_stats(&msg.username)).await {
                Ok(stats) => {
                    for recipient in &msg.recipients {
                        recipient.do_send(ServerMessage::StatsUpdate { stats: stats.clone() });
                    }
                }
                Err(e) => warn!("[Stats] Lookup for {} failed: {}", msg.username, e),
            }
        });
    }
}

impl<S: StatsStore> Handler<RecordOutcomes> for StatsWorker<S> {
    type Result = ();

    fn handle(&mut self, msg: RecordOutcomes, _ctx: &mut Self::Context) -> Self::Result {
        let store = Arc::clone(&self.store);
        let timeout = self.timeout;
        actix::spawn(async move {
            for entry in &msg.results {
                if let Err(e) = bounded(timeout, store.record_outcome(&entry.username, entry.result)).await {
                    warn!("[Stats] Could not record {:?} for {}: {}", entry.result, entry.username, e);
                }
            }
            for entry in msg.results {
                let Some(recipient) = entry.notify else { continue };
                match bounded(timeout, store.get_stats(&entry.username)).await {
                    Ok(stats) => recipient.do_send(ServerMessage::StatsUpdate { stats }),
                    Err(e) => warn!("[Stats] Refresh for {} failed: {}", entry.username, e),
                }
            }
            debug!("[Stats] Round results recorded");
        });
    }
}
