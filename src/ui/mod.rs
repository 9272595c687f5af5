// UI module for rendering status-bar records.
// Contains the Waybar output record and per-module tooltip builders.

pub mod moon;
pub mod weather;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SkybarError;

/// Record emitted if serialization itself ever fails.
const FALLBACK_RECORD: &str = r#"{"text":"❌","tooltip":"skybar: failed to render output"}"#;

/// One status-bar update: short text plus Pango-markup tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaybarOutput {
    pub text: String,
    pub tooltip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl WaybarOutput {
    pub fn new(text: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tooltip: tooltip.into(),
            class: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Error record so the bar keeps rendering something meaningful.
    pub fn error(error: &SkybarError) -> Self {
        let tooltip = match error {
            SkybarError::NotFound(path) if path.ends_with(".conf") => {
                format!("Config file {} not found", path)
            }
            SkybarError::MissingConfig(key) => format!("{} not set in skybar.conf", key),
            other => other.to_string(),
        };
        Self::new("❌", escape_markup(&tooltip)).with_class("error")
    }

    /// Serialize to the single JSON line the bar reads.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| FALLBACK_RECORD.to_string())
    }
}

/// Format a timestamp relative to now (e.g., "2h ago").
pub fn format_relative_time(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(*dt);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Escape text for inclusion in Pango markup.
pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
