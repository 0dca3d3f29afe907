use crate::components::google_calendar::oauth::OAuthClientConfig;
use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Default path of the OAuth client credentials file
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";

/// Default time zone attached to created events
pub const DEFAULT_EVENT_TIMEZONE: &str = "Asia/Jakarta";

/// Default listening port
pub const DEFAULT_PORT: u16 = 8080;

/// Main configuration structure for the service
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client configuration loaded from the credentials file
    pub oauth: OAuthClientConfig,
    /// Address to bind the HTTP server to
    pub host: IpAddr,
    /// Port to bind the HTTP server to
    pub port: u16,
    /// IANA time zone name forwarded with event dates
    pub event_timezone: String,
}

impl Config {
    /// Load configuration from environment and the credentials file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let credentials_path = env::var("GOOGLE_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CREDENTIALS_PATH));

        let host = match env::var("HOST") {
            Ok(value) => value.parse::<IpAddr>().map_err(|_| env_error("HOST"))?,
            Err(_) => IpAddr::from([0, 0, 0, 0]),
        };

        let port = match env::var("PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| env_error("PORT"))?,
            Err(_) => DEFAULT_PORT,
        };

        let event_timezone =
            env::var("EVENT_TIMEZONE").unwrap_or_else(|_| DEFAULT_EVENT_TIMEZONE.to_string());
        validate_timezone(&event_timezone)?;

        // The credentials file is read exactly once, here
        let oauth = OAuthClientConfig::from_file(&credentials_path)?;

        Ok(Config {
            oauth,
            host,
            port,
            event_timezone,
        })
    }

    /// Socket address the server listens on
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Check that a time zone name is a known IANA zone
pub fn validate_timezone(name: &str) -> AppResult<()> {
    name.parse::<Tz>()
        .map(|_| ())
        .map_err(|_| config_error(&format!("Unknown event time zone: {}", name)))
}
