/// Realtime chat channel
///
/// One WebSocket per authenticated session, multiplexed across conversations
/// by the `conversation_id` carried in every frame. The lifecycle is an
/// explicit state machine — Disconnected, Connecting, Connected, Backoff —
/// with exponential-backoff reconnection and a shutdown signal from the
/// owning client, so a dropped view never leaks a live socket.
use crate::chat::types::{ChatEvent, OutboundFrame};
use crate::config::Config;
use crate::session::Session;
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, watch};
use tokio::time::interval;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

/// Connection state of the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No socket, not trying
    Disconnected,
    /// Socket construction in flight
    Connecting,
    /// Frames flowing; the view may show a Live indicator
    Connected,
    /// Lost the link, waiting out the reconnect delay
    Backoff,
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct RealtimeChannel {
    url: String,
    heartbeat_interval: Duration,
    reconnect_floor: Duration,
    reconnect_ceiling: Duration,
    state_tx: watch::Sender<ChannelState>,
    events_tx: broadcast::Sender<ChatEvent>,
    shutdown_rx: watch::Receiver<bool>,
}

impl RealtimeChannel {
    pub fn new(config: &Config, session: &Session, shutdown_rx: watch::Receiver<bool>) -> Self {
        let (state_tx, _) = watch::channel(ChannelState::Disconnected);
        let (events_tx, _) = broadcast::channel(256);
        Self {
            url: config.chat_socket_url(&session.token),
            heartbeat_interval: config.heartbeat_interval,
            reconnect_floor: config.reconnect_floor,
            reconnect_ceiling: config.reconnect_ceiling,
            state_tx,
            events_tx,
            shutdown_rx,
        }
    }

    /// Observe state transitions (Live/Offline indicator).
    pub fn state(&self) -> watch::Receiver<ChannelState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to inbound events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events_tx.subscribe()
    }

    /// Run until shutdown: connect, pump frames, back off, reconnect.
    pub async fn run(&self) {
        if let Err(e) = Url::parse(&self.url) {
            warn!("Invalid chat gateway URL {}: {}", self.url, e);
            return;
        }

        let mut shutdown = self.shutdown_rx.clone();
        let mut attempt: u32 = 0;
        loop {
            if *shutdown.borrow() {
                break;
            }
            self.set_state(ChannelState::Connecting);
            match connect_async(self.url.as_str()).await {
                Ok((socket, _)) => {
                    attempt = 0;
                    self.set_state(ChannelState::Connected);
                    info!("Chat gateway connected");
                    self.pump(socket, &mut shutdown).await;
                    if *shutdown.borrow() {
                        break;
                    }
                    warn!("Chat gateway connection lost");
                }
                Err(e) => {
                    warn!("Chat gateway connect failed: {}", e);
                }
            }

            self.set_state(ChannelState::Backoff);
            let delay = with_jitter(backoff_delay(
                attempt,
                self.reconnect_floor,
                self.reconnect_ceiling,
            ));
            attempt = attempt.saturating_add(1);
            debug!("Reconnecting to chat gateway in {:?}", delay);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {}
            }
        }
        self.set_state(ChannelState::Disconnected);
    }

    /// Pump one live connection until it drops or shutdown fires.
    async fn pump(&self, socket: WsStream, shutdown: &mut watch::Receiver<bool>) {
        let (mut sink, mut stream) = socket.split();
        let mut heartbeat = interval(self.heartbeat_interval);
        // the first tick of an interval is immediate
        heartbeat.tick().await;

        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(WsMessage::Text(text))) => self.dispatch(&text),
                    Some(Ok(WsMessage::Ping(payload))) => {
                        let _ = sink.send(WsMessage::Pong(payload)).await;
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        debug!("Chat gateway sent close");
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Chat gateway read error: {}", e);
                        return;
                    }
                    None => return,
                },
                _ = heartbeat.tick() => {
                    let ping = serde_json::to_string(&OutboundFrame::Ping).unwrap_or_default();
                    if let Err(e) = sink.send(WsMessage::Text(ping)).await {
                        warn!("Heartbeat send failed: {}", e);
                        return;
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        let _ = sink.send(WsMessage::Close(None)).await;
                        return;
                    }
                }
            }
        }
    }

    fn dispatch(&self, text: &str) {
        match serde_json::from_str::<ChatEvent>(text) {
            // send only fails with no subscribers, which is fine
            Ok(event) => {
                let _ = self.events_tx.send(event);
            }
            Err(e) => debug!("Ignoring unparseable gateway frame: {}", e),
        }
    }

    fn set_state(&self, state: ChannelState) {
        self.state_tx.send_replace(state);
    }
}

/// Exponential backoff: floor * 2^attempt, capped at the ceiling.
pub fn backoff_delay(attempt: u32, floor: Duration, ceiling: Duration) -> Duration {
    let factor = 1u32 << attempt.min(16);
    floor.saturating_mul(factor).min(ceiling)
}

fn with_jitter(delay: Duration) -> Duration {
    let jitter: f64 = rand::thread_rng().gen_range(0.0..0.25);
    delay + delay.mul_f64(jitter)
}
