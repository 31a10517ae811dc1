//! Transient user-facing alerts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Default time an alert stays visible
pub const DEFAULT_ALERT_LIFETIME: Duration = Duration::from_secs(5);

/// Alert severity, mapped to the `alert-{kind}` style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: Uuid,
    pub kind: AlertKind,
    pub message: String,
    pub shown_at: DateTime<Utc>,
    #[serde(skip)]
    expires_at: Instant,
}

impl Alert {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// The alert container shared by all binders of one page view
#[derive(Debug, Clone)]
pub struct AlertCenter {
    alerts: Vec<Alert>,
    lifetime: Duration,
}

impl Default for AlertCenter {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_LIFETIME)
    }
}

impl AlertCenter {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            alerts: Vec::new(),
            lifetime,
        }
    }

    /// Show an alert at `now`; it expires once the configured lifetime has
    /// elapsed
    pub fn show(&mut self, kind: AlertKind, message: impl Into<String>, now: Instant) -> Uuid {
        let alert = Alert {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            shown_at: Utc::now(),
            expires_at: now + self.lifetime,
        };
        let id = alert.id;
        tracing::debug!(?kind, message = %alert.message, "showing alert");
        self.alerts.push(alert);
        id
    }

    pub fn success(&mut self, message: impl Into<String>, now: Instant) -> Uuid {
        self.show(AlertKind::Success, message, now)
    }

    pub fn error(&mut self, message: impl Into<String>, now: Instant) -> Uuid {
        self.show(AlertKind::Error, message, now)
    }

    /// Close an alert before it expires
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    /// Drop alerts whose lifetime has elapsed
    pub fn expire(&mut self, now: Instant) {
        self.alerts.retain(|a| !a.is_expired(now));
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn latest(&self) -> Option<&Alert> {
        self.alerts.last()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
