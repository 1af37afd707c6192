/// Session coordinator actor.
///
/// Serializes every inbound event through its mailbox, runs it against the
/// [`Coordinator`] core, and delivers the resulting effects before the next event is
/// handled: frames go to the connection actors, stats work goes to the stats worker,
/// and negotiation timers are armed on this actor's context.
use std::collections::HashMap;
use std::time::Duration;

use actix::prelude::*;
use log::{debug, info};

use super::messages::{ClientEvent, Connect, Disconnect};
use super::state::{Coordinator, Effect};
use super::types::{ConnectionId, SessionId};
use crate::server::messages::{ClientMessage, ServerMessage};
use crate::stats::{FetchStats, RecordOutcomes, RecordedResult};

pub struct CoordinatorActor {
    core: Coordinator,
    /// Outbound channel of every live connection.
    recipients: HashMap<ConnectionId, Recipient<ServerMessage>>,
    stats_fetch: Recipient<FetchStats>,
    stats_record: Recipient<RecordOutcomes>,
    /// `None` disables prompt expiry.
    prompt_timeout: Option<Duration>,
}

impl CoordinatorActor {
    pub fn new(
        stats_fetch: Recipient<FetchStats>,
        stats_record: Recipient<RecordOutcomes>,
        prompt_timeout: Option<Duration>,
    ) -> Self {
        Self {
            core: Coordinator::new(),
            recipients: HashMap::new(),
            stats_fetch,
            stats_record,
            prompt_timeout,
        }
    }

    /// Deliver effects in the order the core produced them.
    fn apply(&mut self, effects: Vec<Effect>, ctx: &mut Context<Self>) {
        for effect in effects {
            match effect {
                Effect::Send { to, message } => match self.recipients.get(&to) {
                    Some(addr) => addr.do_send(message),
                    None => debug!("[Coordinator] Dropped frame for closed connection {}", to),
                },
                Effect::FetchStats { username, recipients } => {
                    let recipients = recipients
                        .iter()
                        .filter_map(|id| self.recipients.get(id).cloned())
                        .collect();
                    self.stats_fetch.do_send(FetchStats { username, recipients });
                }
                Effect::RecordOutcomes { results } => {
                    let results = results
                        .into_iter()
                        .map(|(id, username, result)| RecordedResult {
                            username,
                            result,
                            notify: self.recipients.get(&id).cloned(),
                        })
                        .collect();
                    self.stats_record.do_send(RecordOutcomes { results });
                }
                Effect::ArmPromptTimer { session, round } => self.arm_prompt_timer(session, round, ctx),
            }
        }
    }

    fn arm_prompt_timer(&mut self, session: SessionId, round: u32, ctx: &mut Context<Self>) {
        let Some(timeout) = self.prompt_timeout else { return };
        ctx.run_later(timeout, move |act, ctx| {
            let effects = act.core.prompt_expired(session, round);
            act.apply(effects, ctx);
        });
    }
}

impl Actor for CoordinatorActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[Coordinator] Started");
    }
}

impl Handler<Connect> for CoordinatorActor {
    type Result = ();

    fn handle(&mut self, msg: Connect, ctx: &mut Self::Context) -> Self::Result {
        self.recipients.insert(msg.id, msg.addr);
        let effects = self.core.connect(msg.id);
        self.apply(effects, ctx);
    }
}

impl Handler<Disconnect> for CoordinatorActor {
    type Result = ();

    /// Cleanup runs while the connection's recipient is still known, then it is dropped.
    fn handle(&mut self, msg: Disconnect, ctx: &mut Self::Context) -> Self::Result {
        let effects = self.core.disconnect(msg.id);
        self.apply(effects, ctx);
        self.recipients.remove(&msg.id);
    }
}

impl Handler<ClientEvent> for CoordinatorActor {
    type Result = ();

    fn handle(&mut self, msg: ClientEvent, ctx: &mut Self::Context) -> Self::Result {
        let id = msg.id;
        let effects = match msg.msg {
            ClientMessage::Identify { name, auto_match } => self.core.register(id, &name, auto_match),
            ClientMessage::RequestMatch => self.core.request_match(id),
            ClientMessage::JoinQueue => self.core.join_queue(id),
            ClientMessage::Move { index } => self.core.play(id, index),
            ClientMessage::ContinueChoice { accept } => self.core.continue_choice(id, accept),
            ClientMessage::RequestStats { username } => self.core.request_stats(id, &username),
            ClientMessage::Ping => Vec::new(),
        };
        self.apply(effects, ctx);
    }
}
