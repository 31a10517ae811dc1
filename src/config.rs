//! Configuration handling for the form layer

use crate::binders::upload::DEFAULT_MAX_FILE_SIZE;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Environment variable overriding [`FormsConfig::backend_url`]
pub const BACKEND_URL_ENV: &str = "SASA_FORMS_BACKEND_URL";

/// User configuration for one page view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// How long an alert stays visible
    pub alert_lifetime_ms: u64,
    /// Delay before following a server redirect
    pub redirect_delay_ms: u64,
    /// Size limit for file inputs without `data-max-size`
    pub default_max_file_size: u64,
    /// Submission timeout; the HTTP client default when unset
    pub request_timeout_secs: Option<u64>,
    /// Submit control label while a request is in flight
    pub loading_label: String,
    /// Rewrite local phone numbers (`07…`) into `254…` form on blur
    pub normalize_phone_on_blur: bool,
    /// Base for relative form actions instead of the page location
    pub backend_url: Option<Url>,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            alert_lifetime_ms: 5_000,
            redirect_delay_ms: 1_000,
            default_max_file_size: DEFAULT_MAX_FILE_SIZE,
            request_timeout_secs: None,
            loading_label: "Loading...".to_string(),
            normalize_phone_on_blur: false,
            backend_url: None,
        }
    }
}

impl FormsConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "sasa", "sasa-forms")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path)?;
                tracing::debug!(path = %path.display(), "loaded configuration");
                serde_json::from_str(&content)?
            }
            _ => Self::default(),
        };
        config.apply_env(std::env::var(BACKEND_URL_ENV).ok().as_deref())?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    fn apply_env(&mut self, backend_url: Option<&str>) -> Result<()> {
        if let Some(raw) = backend_url.filter(|v| !v.is_empty()) {
            self.backend_url = Some(Url::parse(raw)?);
        }
        Ok(())
    }

    pub fn alert_lifetime(&self) -> Duration {
        Duration::from_millis(self.alert_lifetime_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
