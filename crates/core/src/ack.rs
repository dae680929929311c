//! Acknowledgement returned by every inbound trigger.

use serde::{Deserialize, Serialize};

/// `{"status": "ok", ...}` or `{"status": "error", "reason": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Ack {
    Ok {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<serde_json::Value>,
    },
    Error {
        reason: String,
    },
}

impl Ack {
    #[must_use]
    pub const fn ok() -> Self {
        Self::Ok { detail: None }
    }

    /// Success carrying a serializable payload. Falls back to a bare `ok`
    /// if the payload cannot be serialized.
    pub fn ok_with<T: Serialize>(detail: &T) -> Self {
        match serde_json::to_value(detail) {
            Ok(value) => Self::Ok { detail: Some(value) },
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize ack detail");
                Self::ok()
            },
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error { reason: reason.into() }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}
