/// WebSocket connection actor.
///
/// One actor per client transport. It registers the connection with the coordinator,
/// decodes client frames into coordinator events, and serializes server frames back
/// to the client. Liveness is tracked with ping/pong; flooding closes the socket.
use std::borrow::Cow;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{Error, HttpRequest, HttpResponse, web};
use actix_web_actors::ws;
use log::{debug, error, info, warn};

use crate::server::anti_spam::RateLimiter;
use crate::server::coordinator::messages::{ClientEvent, Connect, Disconnect};
use crate::server::coordinator::{ConnectionId, CoordinatorActor};
use crate::server::messages::{ClientMessage, ServerMessage};
use crate::server::state::AppState;
use crate::server::ws_error::{INTERNAL_ERROR, INVALID_MESSAGE, RATE_LIMITED, ws_error_message};

pub struct WsConnection {
    pub id: ConnectionId,
    pub coordinator: Addr<CoordinatorActor>,
    /// Identify frame sent on behalf of the client once the handshake completes.
    pub handshake: Option<ClientMessage>,
    limiter: RateLimiter,
    /// Last time the client showed any sign of life.
    last_seen: Instant,
    heartbeat_interval: Duration,
    client_timeout: Duration,
}

impl WsConnection {
    pub fn new(
        coordinator: Addr<CoordinatorActor>,
        handshake: Option<ClientMessage>,
        max_requests_per_second: u32,
        heartbeat_interval: Duration,
        client_timeout: Duration,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            coordinator,
            handshake,
            limiter: RateLimiter::new(max_requests_per_second),
            last_seen: Instant::now(),
            heartbeat_interval,
            client_timeout,
        }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(self.heartbeat_interval, |act, ctx| {
            if Instant::now().duration_since(act.last_seen) > act.client_timeout {
                info!("[Ws] Connection {} timed out", act.id);
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn close_for_flooding(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.text(ws_error_message(RATE_LIMITED, "Too many messages per second."));
        ctx.close(Some(ws::CloseReason {
            code: ws::CloseCode::Policy,
            description: Some("Rate limit exceeded".into()),
        }));
        ctx.stop();
    }
}

impl Actor for WsConnection {
    type Context = ws::WebsocketContext<Self>;

    /// Register with the coordinator, then replay the handshake identify if any.
    fn started(&mut self, ctx: &mut Self::Context) {
        info!("[Ws] Connection {} opened", self.id);
        self.coordinator.do_send(Connect {
            id: self.id,
            addr: ctx.address().recipient(),
        });
        if let Some(msg) = self.handshake.take() {
            self.coordinator.do_send(ClientEvent { id: self.id, msg });
        }
        self.heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!("[Ws] Connection {} closed", self.id);
        self.coordinator.do_send(Disconnect { id: self.id });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsConnection {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                warn!("[Ws] Protocol error on {}: {}", self.id, e);
                ctx.stop();
                return;
            }
        };
        self.last_seen = Instant::now();
        match msg {
            ws::Message::Text(text) => {
                if self.limiter.record_request(&self.id.to_string()) {
                    self.close_for_flooding(ctx);
                    return;
                }
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Ping) => {}
                    Ok(msg) => self.coordinator.do_send(ClientEvent { id: self.id, msg }),
                    Err(e) => {
                        debug!("[Ws] Undecodable frame from {}: {}", self.id, e);
                        ctx.text(ws_error_message(INVALID_MESSAGE, "Invalid client message"));
                    }
                }
            }
            ws::Message::Ping(bytes) => ctx.pong(&bytes),
            ws::Message::Pong(_) => {}
            ws::Message::Close(reason) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => (),
        }
    }
}

impl Handler<ServerMessage> for WsConnection {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                error!("[Ws] Failed to serialize frame for {}: {}", self.id, e);
                ctx.text(ws_error_message(INTERNAL_ERROR, "Internal server error"));
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Error,
                    description: Some("Internal server error".into()),
                }));
                ctx.stop();
            }
        }
    }
}

/// Build the handshake identify from `name` and `auto_match` query parameters.
fn handshake_from_query(query: &str) -> Option<ClientMessage> {
    let mut name = String::new();
    let mut auto_match = true;
    for kv in query.split('&') {
        let mut split = kv.split('=');
        match (split.next(), split.next()) {
            (Some("name"), Some(value)) => {
                name = urlencoding::decode(value)
                    .unwrap_or_else(|_| Cow::Borrowed(""))
                    .trim()
                    .to_string();
            }
            (Some("auto_match"), Some(value)) => auto_match = value != "false",
            _ => {}
        }
    }
    (!name.is_empty()).then(|| ClientMessage::Identify { name, auto_match })
}

/// WebSocket endpoint.
///
/// Optional query parameters: `name` (URL-encoded display name) and `auto_match`.
/// Without `name`, the client identifies with its first frame.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let config = &data.config;
    ws::start(
        WsConnection::new(
            data.coordinator.clone(),
            handshake_from_query(req.query_string()),
            config.max_requests_per_second,
            config.heartbeat_interval,
            config.client_timeout,
        ),
        &req,
        stream,
    )
}
