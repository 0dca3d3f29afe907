use super::token::{Token, TokenResponse};
use crate::error::{config_error, upstream_error, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Google OAuth endpoints used when the credentials file omits them
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Full read/write access to the user's calendars
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Static state token carried through the consent redirect
pub const STATE_TOKEN: &str = "state-token";

/// OAuth client configuration, immutable once loaded
#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: Url,
    pub token_uri: Url,
    /// First redirect URI listed in the credentials file, or empty
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

/// Structure of the credentials JSON downloaded from Google Cloud Console
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
}

#[derive(Debug, Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    auth_uri: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl OAuthClientConfig {
    /// Create a configuration against Google's default endpoints
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_uri: Url::parse(GOOGLE_AUTH_URI).expect("static auth URI is valid"),
            token_uri: Url::parse(GOOGLE_TOKEN_URI).expect("static token URI is valid"),
            redirect_uri: redirect_uri.into(),
            scopes: vec![CALENDAR_SCOPE.to_string()],
        }
    }

    /// Load the client configuration from a credentials file
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            config_error(&format!(
                "Failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_json(&content)?;
        info!("Loaded OAuth client configuration from {}", path.display());
        Ok(config)
    }

    /// Parse the client configuration from credentials JSON
    pub fn from_json(json: &str) -> AppResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json)
            .map_err(|e| config_error(&format!("Failed to parse credentials JSON: {}", e)))?;

        let section = file
            .web
            .or(file.installed)
            .ok_or_else(|| config_error("No 'installed' or 'web' credentials found"))?;

        if section.client_id.is_empty() {
            return Err(config_error("Credentials are missing client_id"));
        }

        let auth_uri = parse_endpoint(section.auth_uri.as_deref(), GOOGLE_AUTH_URI, "auth_uri")?;
        let token_uri =
            parse_endpoint(section.token_uri.as_deref(), GOOGLE_TOKEN_URI, "token_uri")?;

        Ok(Self {
            client_id: section.client_id,
            client_secret: section.client_secret,
            auth_uri,
            token_uri,
            redirect_uri: section.redirect_uris.into_iter().next().unwrap_or_default(),
            scopes: vec![CALENDAR_SCOPE.to_string()],
        })
    }

    /// Build the provider consent URL requesting offline access
    pub fn auth_code_url(&self, state: &str) -> String {
        let mut url = self.auth_uri.clone();
        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", state);
        url.to_string()
    }
}

fn parse_endpoint(value: Option<&str>, default: &str, field: &str) -> AppResult<Url> {
    let raw = value.filter(|v| !v.is_empty()).unwrap_or(default);
    Url::parse(raw).map_err(|e| config_error(&format!("Invalid {} '{}': {}", field, raw, e)))
}

/// Operations the OAuth2 identity provider offers
#[async_trait]
pub trait OAuthProvider: Send + Sync + 'static {
    /// Consent URL for the given state token
    fn auth_url(&self, state: &str) -> String;

    /// Exchange a one-time authorization code for a token
    async fn exchange_code(&self, code: &str) -> AppResult<Token>;

    /// Obtain a fresh access token from a refresh token
    async fn refresh_token(&self, refresh_token: &str) -> AppResult<Token>;
}

/// Google implementation of the OAuth2 authorization-code flow
#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    config: OAuthClientConfig,
    client: Client,
}

impl GoogleOAuth {
    pub fn new(config: OAuthClientConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// POST a form to the token endpoint and decode the token response
    async fn retrieve_token(&self, params: &[(&str, &str)]) -> AppResult<TokenResponse> {
        let response = self
            .client
            .post(self.config.token_uri.clone())
            .form(params)
            .send()
            .await
            .map_err(|e| upstream_error(&format!("cannot fetch token: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| upstream_error(&format!("cannot fetch token: {}", e)))?;

        if !status.is_success() {
            return Err(upstream_error(&format!(
                "cannot fetch token: {}\nResponse: {}",
                status, body
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| upstream_error(&format!("cannot parse token response: {}", e)))?;

        if token.access_token.is_empty() {
            return Err(upstream_error("server response missing access_token"));
        }

        Ok(token)
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuth {
    fn auth_url(&self, state: &str) -> String {
        self.config.auth_code_url(state)
    }

    async fn exchange_code(&self, code: &str) -> AppResult<Token> {
        debug!("Exchanging authorization code at {}", self.config.token_uri);

        let response = self
            .retrieve_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .await?;

        info!("Obtained OAuth token from authorization code");
        Ok(Token::from_response(response))
    }

    async fn refresh_token(&self, refresh_token: &str) -> AppResult<Token> {
        let response = self
            .retrieve_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .await?;

        let mut token = Token::from_response(response);
        // Google usually omits the refresh token on refresh; keep the old one
        if token.refresh_token.is_empty() {
            token.refresh_token = refresh_token.to_string();
        }

        info!("Refreshed OAuth access token");
        Ok(token)
    }
}
