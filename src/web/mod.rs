mod handlers;

use crate::components::GoogleCalendarHandle;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use handlers::{
    auth_url_handler, create_calendar_handler, create_event_handler, health_handler,
    list_calendars_handler, token_handler,
};

pub use handlers::{HealthResponse, TokenQuery};

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// Google Calendar operations and the session they run under
    pub calendar: GoogleCalendarHandle,
}

impl AppState {
    pub fn new(calendar: GoogleCalendarHandle) -> Self {
        Self { calendar }
    }
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/google/calendars/auth", get(auth_url_handler))
        .route("/api/google/calendars/token", get(token_handler))
        .route(
            "/api/calendars",
            get(list_calendars_handler).post(create_calendar_handler),
        )
        .route("/api/calendars/events", post(create_event_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
