//! Persistent user settings.
//!
//! Stored as JSON at `~/.config/larder/settings.json`. Loading never fails:
//! a missing or unreadable file yields defaults so the CLI can always start.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::{
    API_KEY_ENV_VAR, DEFAULT_API_BASE_URL, DEFAULT_CAMERA_DEVICE, DEFAULT_VOICE,
    LEGACY_API_KEY_ENV_VAR, Service,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Gemini API key (falls back to GEMINI_API_KEY / API_KEY)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-service model overrides, keyed by service name
    #[serde(default)]
    pub models: HashMap<Service, String>,

    /// Prebuilt voice for narration
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Camera device path for still capture
    #[serde(default = "default_camera_device")]
    pub camera_device: String,

    /// Where saved recipes and the shopping list live (None = platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Per-request timeout; None leaves requests unbounded
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// API base URL override (proxies, regional endpoints)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_camera_device() -> String {
    DEFAULT_CAMERA_DEVICE.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            models: HashMap::new(),
            voice: default_voice(),
            camera_device: default_camera_device(),
            data_dir: None,
            request_timeout_secs: None,
            api_base_url: default_api_base_url(),
        }
    }
}

impl Settings {
    /// Path of the settings file
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("larder")
            .join("settings.json")
    }

    /// Load settings from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load settings from a specific file, returning defaults on any error
    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                crate::verbose!("Ignoring unreadable settings at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Save settings to a specific file (0600 on Unix, it may hold a key)
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Resolve the API key: settings file, then `GEMINI_API_KEY`, then `API_KEY`.
    ///
    /// A `.env` file in the working directory is loaded first.
    pub fn api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Some(key.trim().to_string());
        }

        let _ = dotenvy::dotenv();
        [API_KEY_ENV_VAR, LEGACY_API_KEY_ENV_VAR]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }

    /// Model name for a service, honoring overrides
    pub fn model_for(&self, service: Service) -> String {
        self.models
            .get(&service)
            .cloned()
            .unwrap_or_else(|| service.default_model().to_string())
    }

    /// Directory holding persisted collections
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("larder")
        })
    }
}

/// Sanity check an API key before saving it.
///
/// Google API keys start with `AIza` and are 39 characters long; anything
/// shorter than 20 characters is certainly a typo.
pub fn validate_api_key(key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("API key is empty");
    }
    if !key.starts_with("AIza") {
        anyhow::bail!("Invalid Gemini key format. Keys start with 'AIza'");
    }
    if key.len() < 20 {
        anyhow::bail!("API key seems too short");
    }
    Ok(())
}
