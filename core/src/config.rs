/// Configuration management
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Client configuration, built once at startup and injected into everything
/// that needs it. No module-level globals.
#[derive(Debug, Clone)]
pub struct Config {
    /// REST base URL, e.g. "https://emr.korle-bu.example.org"
    pub api_base: String,

    /// WebSocket base URL; derived from `api_base` when the file/env leave it unset
    pub ws_base: String,

    /// Per-request timeout for REST calls
    pub request_timeout: Duration,

    /// Interval between outbound ping frames while the channel is connected
    pub heartbeat_interval: Duration,

    /// First reconnect delay after a lost connection
    pub reconnect_floor: Duration,

    /// Upper bound on the reconnect delay
    pub reconnect_ceiling: Duration,

    /// Age after which a typing indicator is ignored by the view
    pub typing_stale_after: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let api_base = "http://127.0.0.1:8000".to_string();
        let ws_base = derive_ws_base(&api_base);
        Self {
            api_base,
            ws_base,
            request_timeout: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(30),
            reconnect_floor: Duration::from_secs(1),
            reconnect_ceiling: Duration::from_secs(30),
            typing_stale_after: Duration::from_secs(10),
        }
    }
}

/// On-disk representation. Only the fields an operator actually tunes;
/// everything else falls back to `Default`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    api_base: Option<String>,
    ws_base: Option<String>,
    request_timeout_secs: Option<u64>,
    heartbeat_secs: Option<u64>,
    reconnect_floor_secs: Option<u64>,
    reconnect_ceiling_secs: Option<u64>,
}

impl Config {
    /// Load from the platform config file, then apply environment overrides
    /// (CARELINK_API_BASE, CARELINK_WS_BASE). Missing or corrupt files fall
    /// back to defaults.
    pub fn load() -> Self {
        let file = config_path()
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|text| match toml::from_str::<ConfigFile>(&text) {
                Ok(f) => Some(f),
                Err(e) => {
                    warn!("Ignoring unreadable config file: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        let mut config = Self::from_file(file);

        if let Ok(base) = std::env::var("CARELINK_API_BASE") {
            config.api_base = normalize_base(&base);
            config.ws_base = derive_ws_base(&config.api_base);
        }
        if let Ok(ws) = std::env::var("CARELINK_WS_BASE") {
            config.ws_base = ws.trim_end_matches('/').to_string();
        }

        config
    }

    /// Load from an explicit TOML file path.
    pub fn load_from(path: &Path) -> Self {
        let file = fs::read_to_string(path)
            .ok()
            .and_then(|text| toml::from_str::<ConfigFile>(&text).ok())
            .unwrap_or_default();
        Self::from_file(file)
    }

    fn from_file(file: ConfigFile) -> Self {
        let defaults = Self::default();
        let api_base = file
            .api_base
            .map(|b| normalize_base(&b))
            .unwrap_or(defaults.api_base);
        let ws_base = file
            .ws_base
            .map(|w| w.trim_end_matches('/').to_string())
            .unwrap_or_else(|| derive_ws_base(&api_base));
        Self {
            api_base,
            ws_base,
            request_timeout: file
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            heartbeat_interval: file
                .heartbeat_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.heartbeat_interval),
            reconnect_floor: file
                .reconnect_floor_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.reconnect_floor),
            reconnect_ceiling: file
                .reconnect_ceiling_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.reconnect_ceiling),
            typing_stale_after: defaults.typing_stale_after,
        }
    }

    /// Full URL for the chat gateway socket of one authenticated session.
    pub fn chat_socket_url(&self, token: &str) -> String {
        format!("{}/ws/chat/{}", self.ws_base, token)
    }
}

/// Accept bare hosts the way operators type them.
pub fn normalize_base(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// http -> ws, https -> wss, same host.
fn derive_ws_base(api_base: &str) -> String {
    if let Some(rest) = api_base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = api_base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        format!("wss://{}", api_base)
    }
}

fn config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("org", "carelink", "CareLink")?;
    Some(proj.config_dir().join("carelink.toml"))
}
