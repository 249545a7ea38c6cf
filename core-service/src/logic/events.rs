//! Log Events
//!
//! The operational event record consumed by the evaluation pipeline.
//! Absent-field defaults are defined here and nowhere else.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Action recorded when the producer did not send one
pub const DEFAULT_ACTION: &str = "UNKNOWN";

/// One operational log event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// ISO-8601 timestamp. Filled by the ingestion side when absent.
    #[serde(default)]
    pub timestamp: Option<String>,

    /// Who performed the action
    #[serde(default, alias = "user")]
    pub actor: Option<String>,

    /// What was done
    #[serde(default = "default_action", deserialize_with = "action_or_default")]
    pub action: String,

    /// What it was done to
    #[serde(default)]
    pub resource: Option<String>,

    /// Free-text log line
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

fn default_action() -> String {
    DEFAULT_ACTION.to_string()
}

/// Explicit `null` behaves like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn action_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_action))
}

impl Default for LogEvent {
    fn default() -> Self {
        Self {
            timestamp: None,
            actor: None,
            action: default_action(),
            resource: None,
            message: String::new(),
        }
    }
}

impl LogEvent {
    pub fn new(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Ingestion default: stamp "now" when the producer sent no timestamp
    pub fn stamped(mut self) -> Self {
        let missing = self.timestamp.as_deref().map_or(true, |t| t.trim().is_empty());
        if missing {
            self.timestamp = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true));
        }
        self
    }

    /// Timestamp text, empty when absent
    pub fn timestamp_str(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let event: LogEvent = serde_json::from_str(r#"{"message": "login ok"}"#).unwrap();
        assert_eq!(event.action, DEFAULT_ACTION);
        assert_eq!(event.message, "login ok");
        assert!(event.timestamp.is_none());
        assert!(event.actor.is_none());
    }

    #[test]
    fn test_null_fields_take_defaults() {
        let event: LogEvent =
            serde_json::from_str(r#"{"action": null, "message": null, "user": null}"#).unwrap();
        assert_eq!(event.action, DEFAULT_ACTION);
        assert_eq!(event.message, "");
        assert!(event.actor.is_none());
    }

    #[test]
    fn test_user_alias_maps_to_actor() {
        let event: LogEvent = serde_json::from_str(r#"{"user": "dr.smith", "action": "READ"}"#).unwrap();
        assert_eq!(event.actor.as_deref(), Some("dr.smith"));
        assert_eq!(event.action, "READ");
        assert_eq!(event.message, "");
    }

    #[test]
    fn test_stamped_fills_only_missing_timestamp() {
        let stamped = LogEvent::new("READ", "x").stamped();
        let ts = stamped.timestamp.clone().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());

        let kept = LogEvent::new("READ", "x")
            .with_timestamp("2024-01-01T03:00:00Z")
            .stamped();
        assert_eq!(kept.timestamp_str(), "2024-01-01T03:00:00Z");
    }
}
