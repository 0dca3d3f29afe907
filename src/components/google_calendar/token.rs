use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens are treated as expired this long before their actual expiry
const EXPIRY_DELTA_SECS: i64 = 10;

/// Raw token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// OAuth2 token held in memory only
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    /// Empty when the provider did not issue one
    pub refresh_token: String,
    /// None means the token never expires
    pub expiry: Option<DateTime<Utc>>,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("has_refresh_token", &!self.refresh_token.is_empty())
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl Token {
    /// Build a token from a token endpoint response received now
    pub fn from_response(response: TokenResponse) -> Self {
        Self::from_response_at(response, Utc::now())
    }

    /// Build a token from a token endpoint response received at `now`.
    ///
    /// An `expires_in` outside chrono's range is treated as no expiry.
    pub fn from_response_at(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let expiry = response
            .expires_in
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime));

        Self {
            access_token: response.access_token,
            token_type: response
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: response.refresh_token.unwrap_or_default(),
            expiry,
        }
    }

    /// Whether the token has expired (or is about to)
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= now + Duration::seconds(EXPIRY_DELTA_SECS),
            None => false,
        }
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Token metadata as returned to API callers
    pub fn metadata(&self) -> TokenMetadata {
        TokenMetadata {
            token_type: self.token_type.clone(),
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expire: self.expiry,
        }
    }
}

/// Body of a successful token exchange response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenMetadata {
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expire: Option<DateTime<Utc>>,
}
