#![allow(dead_code)]
//! In-process stub of the CareLink backend: a hyper REST server that records
//! every request, plus a chat-gateway WebSocket acceptor that pushes frames
//! to the connected client.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request as WsRequest, Response as WsResponse,
};
use tokio_tungstenite::tungstenite::Message as WsMessage;

use carelink_core::{Config, Session};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: Value,
    pub authorized: bool,
}

#[derive(Default)]
pub struct StubState {
    pub conversations: Vec<Value>,
    pub messages: HashMap<String, Vec<Value>>,
    pub users: Vec<Value>,
    pub patients: Vec<Value>,
    pub bank_accounts: Vec<Value>,
    pub studies: Vec<Value>,
    pub requests: Vec<RecordedRequest>,
    pub ws_path: Option<String>,
}

enum WsCommand {
    Send(String),
    Close,
}

pub struct StubBackend {
    state: Arc<Mutex<StubState>>,
    ws_tx: Arc<Mutex<Option<mpsc::UnboundedSender<WsCommand>>>>,
    pub http_addr: SocketAddr,
    pub ws_addr: SocketAddr,
}

impl StubBackend {
    pub async fn start(state: StubState) -> Self {
        let state = Arc::new(Mutex::new(state));

        let http_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let http_addr = http_listener.local_addr().unwrap();
        let ws_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_addr = ws_listener.local_addr().unwrap();

        // REST side
        {
            let state = state.clone();
            tokio::spawn(async move {
                loop {
                    let Ok((stream, _)) = http_listener.accept().await else {
                        break;
                    };
                    let io = TokioIo::new(stream);
                    let state = state.clone();
                    tokio::spawn(async move {
                        let svc = service_fn(move |req| {
                            let state = state.clone();
                            async move { Ok::<_, Infallible>(handle(req, state).await) }
                        });
                        let _ = http1::Builder::new().serve_connection(io, svc).await;
                    });
                }
            });
        }

        // Gateway side
        let ws_tx: Arc<Mutex<Option<mpsc::UnboundedSender<WsCommand>>>> =
            Arc::new(Mutex::new(None));
        {
            let slot = ws_tx.clone();
            let state = state.clone();
            tokio::spawn(async move {
                loop {
                    let Ok((stream, _)) = ws_listener.accept().await else {
                        break;
                    };
                    let path_state = state.clone();
                    let callback = move |req: &WsRequest,
                                         resp: WsResponse|
                          -> Result<WsResponse, ErrorResponse> {
                        path_state.lock().unwrap().ws_path = Some(req.uri().path().to_string());
                        Ok(resp)
                    };
                    let Ok(ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await
                    else {
                        continue;
                    };
                    let (tx, mut rx) = mpsc::unbounded_channel::<WsCommand>();
                    *slot.lock().unwrap() = Some(tx);
                    let (mut sink, mut source) = ws.split();
                    loop {
                        tokio::select! {
                            cmd = rx.recv() => match cmd {
                                Some(WsCommand::Send(text)) => {
                                    if sink.send(WsMessage::Text(text)).await.is_err() {
                                        break;
                                    }
                                }
                                Some(WsCommand::Close) | None => break,
                            },
                            frame = source.next() => match frame {
                                // client pings and other frames are irrelevant here
                                Some(Ok(_)) => {}
                                _ => break,
                            }
                        }
                    }
                    *slot.lock().unwrap() = None;
                }
            });
        }

        Self {
            state,
            ws_tx,
            http_addr,
            ws_addr,
        }
    }

    /// Config pointing the client at this stub, with timings tight enough
    /// for tests.
    pub fn config(&self) -> Config {
        Config {
            api_base: format!("http://{}", self.http_addr),
            ws_base: format!("ws://{}", self.ws_addr),
            request_timeout: Duration::from_secs(5),
            heartbeat_interval: Duration::from_millis(200),
            reconnect_floor: Duration::from_millis(50),
            reconnect_ceiling: Duration::from_millis(200),
            typing_stale_after: Duration::from_secs(10),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count_requests(&self, method: &str, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn ws_path(&self) -> Option<String> {
        self.state.lock().unwrap().ws_path.clone()
    }

    /// Push a frame to the connected gateway client, waiting for the
    /// connection if it is not up yet.
    pub async fn push_event(&self, event: Value) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            {
                let slot = self.ws_tx.lock().unwrap();
                if let Some(tx) = slot.as_ref() {
                    tx.send(WsCommand::Send(event.to_string())).unwrap();
                    return;
                }
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "no gateway client connected"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Drop the live gateway connection to exercise reconnection.
    pub async fn drop_ws(&self) {
        let slot = self.ws_tx.lock().unwrap();
        if let Some(tx) = slot.as_ref() {
            let _ = tx.send(WsCommand::Close);
        }
    }
}

fn json_resp(status: StatusCode, value: Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(value.to_string())))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

fn json_ok(value: Value) -> Response<Full<Bytes>> {
    json_resp(StatusCode::OK, value)
}

async fn handle(req: Request<Incoming>, state: Arc<Mutex<StubState>>) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().unwrap_or("").to_string();
    let authorized = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Bearer "))
        .unwrap_or(false);
    let body_bytes = req
        .collect()
        .await
        .map(|c| c.to_bytes())
        .unwrap_or_default();
    let body: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    let mut state = state.lock().unwrap();
    state.requests.push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: query.clone(),
        body: body.clone(),
        authorized,
    });

    match (method.clone(), path.as_str()) {
        (Method::GET, "/api/chat/conversations") => {
            json_ok(json!({ "conversations": state.conversations }))
        }
        (Method::GET, "/api/chat/unread-count") => {
            let total: u64 = state
                .conversations
                .iter()
                .map(|c| c["unread_count"].as_u64().unwrap_or(0))
                .sum();
            json_ok(json!({ "unread_count": total }))
        }
        (Method::POST, "/api/chat/conversations") => {
            let participant = body["participant_ids"][0]
                .as_str()
                .unwrap_or("")
                .to_string();
            let existing = state.conversations.iter().find(|c| {
                c["participants"]
                    .as_array()
                    .map(|ps| ps.iter().any(|p| p["id"] == json!(participant)))
                    .unwrap_or(false)
            });
            if let Some(conv) = existing {
                json_ok(json!({ "conversation": conv, "existing": true }))
            } else {
                let conv = json!({
                    "id": format!("c-{}", participant),
                    "chat_type": "direct",
                    "participants": [{"id": participant, "name": participant, "role": "staff"}],
                    "display_name": null,
                    "last_message_preview": null,
                    "last_message_at": null,
                    "unread_count": 0
                });
                state.conversations.insert(0, conv.clone());
                json_ok(json!({ "conversation": conv, "existing": false }))
            }
        }
        (Method::GET, "/api/chat/users/search") => {
            let needle = parse_query(&query, "query").unwrap_or_default().to_lowercase();
            let users: Vec<Value> = state
                .users
                .iter()
                .filter(|u| {
                    u["name"]
                        .as_str()
                        .map(|n| n.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
                .cloned()
                .collect();
            json_ok(json!({ "users": users }))
        }
        (Method::GET, "/api/patients") => json_ok(json!({ "patients": state.patients })),
        (Method::POST, "/api/patients") => {
            let mut patient = body.clone();
            patient["id"] = json!(format!("p-{}", state.patients.len() + 1));
            state.patients.push(patient.clone());
            json_ok(json!({ "patient": patient }))
        }
        (Method::GET, "/finance/bank-accounts") => {
            json_ok(json!({ "accounts": state.bank_accounts }))
        }
        (Method::POST, "/finance/bank-accounts") => {
            let mut account = body.clone();
            account["id"] = json!(format!("b-{}", state.bank_accounts.len() + 1));
            state.bank_accounts.push(account.clone());
            json_ok(json!({ "account": account }))
        }
        (Method::GET, "/api/radiology/worklist") => json_ok(json!({ "studies": state.studies })),
        (Method::GET, "/api/appointments") => json_ok(json!({ "appointments": [] })),
        _ => {
            // dynamic chat segments
            if let Some(rest) = path.strip_prefix("/api/chat/conversations/") {
                if let Some(id) = rest.strip_suffix("/messages") {
                    if method == Method::GET {
                        let messages = state.messages.get(id).cloned().unwrap_or_default();
                        return json_ok(json!({ "messages": messages }));
                    }
                    if method == Method::POST {
                        let content = body["content"].as_str().unwrap_or("").to_string();
                        let message = json!({
                            "id": format!("srv-{}", uuid::Uuid::new_v4()),
                            "sender_id": "u1",
                            "sender_name": "Test User",
                            "sender_role": "staff",
                            "content": content,
                            "sent_at": chrono::Utc::now().to_rfc3339(),
                            "read_by": []
                        });
                        state
                            .messages
                            .entry(id.to_string())
                            .or_default()
                            .push(message.clone());
                        return json_ok(json!({ "message": message }));
                    }
                }
                if let Some(id) = rest.strip_suffix("/read") {
                    if method == Method::POST {
                        for conv in state.conversations.iter_mut() {
                            if conv["id"] == json!(id) {
                                conv["unread_count"] = json!(0);
                            }
                        }
                        return json_ok(json!({ "success": true }));
                    }
                }
            }
            if path.starts_with("/api/admin/staff/") && path.ends_with("/deactivate") {
                return json_ok(json!({ "success": true }));
            }
            if path.starts_with("/api/departments/") && path.ends_with("/roster") {
                return json_ok(json!({ "staff": [] }));
            }
            json_resp(StatusCode::NOT_FOUND, json!({ "error": "not found" }))
        }
    }
}

fn parse_query(query: &str, key: &str) -> Option<String> {
    for pair in query.split('&') {
        if let Some((k, v)) = pair.split_once('=') {
            if k == key {
                return Some(v.to_string());
            }
        }
    }
    None
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn session() -> Session {
    Session::new("u1", "Test User", "staff", "test-token")
}

pub fn conversation_fixture(id: &str, participant_id: &str, name: &str, unread: u64) -> Value {
    json!({
        "id": id,
        "chat_type": "direct",
        "participants": [
            {"id": "u1", "name": "Test User", "role": "staff"},
            {"id": participant_id, "name": name, "role": "nurse"}
        ],
        "display_name": null,
        "last_message_preview": null,
        "last_message_at": null,
        "unread_count": unread
    })
}

pub fn message_fixture(id: &str, content: &str, offset_secs: i64) -> Value {
    let sent_at = chrono::Utc::now() + chrono::Duration::seconds(offset_secs);
    json!({
        "id": id,
        "sender_id": "u2",
        "sender_name": "Kofi Owusu",
        "sender_role": "nurse",
        "content": content,
        "sent_at": sent_at.to_rfc3339(),
        "read_by": []
    })
}

/// Poll until `check` passes or the deadline hits.
pub async fn wait_until<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if check().await {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {}",
            what
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
