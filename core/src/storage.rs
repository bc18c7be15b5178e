/// Preference storage
///
/// The client persists exactly one UI preference: the last region selection
/// used to pick a facility. It lives in a small TOML file under the platform
/// config directory with defined get/set/clear semantics. There is no other
/// client-side persistence.
use crate::error::{ClientError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Preferences {
    region: Option<String>,
}

pub struct PreferenceStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferenceStore {
    /// Open the store at the platform default location.
    pub fn open() -> Result<Self> {
        let path = default_path()
            .ok_or_else(|| ClientError::Storage("no config directory available".to_string()))?;
        Ok(Self::open_at(path))
    }

    /// Open the store at an explicit path. A missing or corrupt file starts
    /// from defaults rather than failing.
    pub fn open_at(path: PathBuf) -> Self {
        let prefs = match fs::read_to_string(&path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!("Ignoring unreadable preferences file: {}", e);
                    Preferences::default()
                }
            },
            Err(_) => Preferences::default(),
        };
        Self { path, prefs }
    }

    pub fn region(&self) -> Option<&str> {
        self.prefs.region.as_deref()
    }

    pub fn set_region(&mut self, region: impl Into<String>) -> Result<()> {
        self.prefs.region = Some(region.into());
        self.persist()
    }

    pub fn clear_region(&mut self) -> Result<()> {
        self.prefs.region = None;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ClientError::Storage(format!("create {}: {}", parent.display(), e)))?;
        }
        let text = toml::to_string_pretty(&self.prefs)
            .map_err(|e| ClientError::Storage(format!("encode preferences: {}", e)))?;
        fs::write(&self.path, text)
            .map_err(|e| ClientError::Storage(format!("write {}: {}", self.path.display(), e)))
    }
}

fn default_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("org", "carelink", "CareLink")?;
    Some(proj.config_dir().join("preferences.toml"))
}
