//! Coverage API wire models
//!
//! Every endpoint answers with the same envelope:
//! `{"meta": {"status": {...}, "next_token": ...}, "data": [...]}`. Error
//! bodies sometimes carry a top-level `message` instead of (or besides)
//! `meta.status.message`.

use crate::domain::errors::truncate_message;
use crate::domain::RawRow;
use serde::{Deserialize, Serialize};

/// Response envelope shared by data, report and metadata endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub meta: ApiMeta,

    #[serde(default, deserialize_with = "rows_or_empty")]
    pub data: Vec<RawRow>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<serde_json::Value>,
}

/// Envelope metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApiStatus>,

    /// Continuation token for paginated report endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Server-side status block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub id: Option<u16>,

    #[serde(default)]
    pub message: Option<String>,
}

/// `data` is normally an array of objects; anything else is treated as no rows
fn rows_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<RawRow>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

impl ApiEnvelope {
    /// Parse a response body, falling back to an empty envelope carrying the
    /// raw text as its message when the body isn't JSON
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<ApiEnvelope>(body) {
            Ok(envelope) => envelope,
            Err(_) => ApiEnvelope {
                message: (!body.trim().is_empty())
                    .then(|| serde_json::Value::String(body.trim().to_string())),
                ..Default::default()
            },
        }
    }

    /// Server message, truncated for logs and errors
    ///
    /// Prefers the top-level `message`, then `meta.status.message`.
    pub fn server_message(&self) -> Option<String> {
        let top = self.message.as_ref().and_then(|m| match m {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        });
        top.or_else(|| self.meta.status.as_ref().and_then(|s| s.message.clone()))
            .filter(|m| !m.trim().is_empty())
            .map(|m| truncate_message(&m))
    }

    /// Continuation token, if the server returned a non-empty one
    pub fn next_token(&self) -> Option<&str> {
        self.meta
            .next_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Result of one transport call that was not retried into an error
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status of the final attempt
    pub status: u16,

    /// Parsed body
    pub body: ApiEnvelope,
}

impl ApiResponse {
    pub fn new(status: u16, body: ApiEnvelope) -> Self {
        Self { status, body }
    }

    /// Convenience for a 200 response carrying the given rows
    pub fn ok(rows: Vec<RawRow>) -> Self {
        Self::new(
            200,
            ApiEnvelope {
                data: rows,
                ..Default::default()
            },
        )
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Non-retryable client error (any 4xx the transport passed through)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.body.data
    }

    pub fn into_rows(self) -> Vec<RawRow> {
        self.body.data
    }
}
