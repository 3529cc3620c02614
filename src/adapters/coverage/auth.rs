//! License token lifecycle
//!
//! The coverage API hands out a short-lived bearer token from the
//! license-agreement endpoint. The token is wrapped in `secrecy::Secret` so
//! it is zeroized on drop and redacted from `Debug` output; only a masked
//! form ever reaches the logs.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use secrecy::{DebugSecret, ExposeSecret, Secret};
use zeroize::Zeroize;

/// Bearer token value
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct TokenValue(String);

impl DebugSecret for TokenValue {}

impl From<String> for TokenValue {
    fn from(s: String) -> Self {
        TokenValue(s)
    }
}

impl TokenValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Mask a token for logging: first 8 and last 4 characters
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "***".to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Token state held by one transport instance
#[derive(Debug, Default)]
pub struct TokenState {
    token: Option<Secret<TokenValue>>,
    acquired_at: Option<DateTime<Utc>>,
}

impl TokenState {
    /// Record a license acknowledgement, with or without a token
    pub fn install(&mut self, token: Option<String>, now: DateTime<Utc>) {
        self.token = token
            .filter(|t| !t.trim().is_empty())
            .map(|t| Secret::new(TokenValue::from(t)));
        self.acquired_at = Some(now);
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn acquired_at(&self) -> Option<DateTime<Utc>> {
        self.acquired_at
    }

    /// True when the license was never acknowledged or was acknowledged at
    /// least `refresh_after_secs` ago
    pub fn is_stale_at(&self, now: DateTime<Utc>, refresh_after_secs: u64) -> bool {
        match self.acquired_at {
            None => true,
            Some(acquired) => {
                let threshold = ChronoDuration::seconds(refresh_after_secs as i64);
                now - acquired >= threshold
            }
        }
    }

    /// `Authorization` header value, when a token is held
    pub fn bearer(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|t| format!("Bearer {}", t.expose_secret().as_str()))
    }

    /// Masked token for logs
    pub fn masked(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|t| mask_token(t.expose_secret().as_str()))
    }
}
