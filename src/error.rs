use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use miette::Diagnostic;
use thiserror::Error;
use tracing::error;

/// Message returned when a calendar operation runs before any token exchange
pub const AUTHENTICATE_FIRST: &str = "authenticate first";

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(ohana::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(ohana::config), help("check GOOGLE_CREDENTIALS_PATH and the credentials file contents"))]
    Config(String),

    #[error("authenticate first")]
    #[diagnostic(code(ohana::unauthenticated))]
    Unauthenticated,

    #[error("{0}")]
    #[diagnostic(code(ohana::bad_request))]
    BadRequest(String),

    #[error("{0}")]
    #[diagnostic(code(ohana::upstream))]
    Upstream(String),

    #[error(transparent)]
    #[diagnostic(code(ohana::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(ohana::serialization))]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        // Body is the bare message encoded as a JSON string
        (status, Json(self.to_string())).into_response()
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create bad request errors
pub fn bad_request(message: &str) -> Error {
    Error::BadRequest(message.to_string())
}

/// Helper to create upstream (provider or calendar service) errors
pub fn upstream_error(message: &str) -> Error {
    Error::Upstream(message.to_string())
}
