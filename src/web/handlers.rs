use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::components::google_calendar::models::{
    AuthUrlResponse, CalendarListEntry, CreatedCalendar, Event, NewEventRequest,
};
use crate::components::google_calendar::TokenMetadata;
use crate::error::{bad_request, AppResult, Error};

/// Query string of the OAuth redirect
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub authenticated: bool,
}

/// Liveness probe
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        authenticated: state.calendar.is_authenticated().await,
    })
}

/// Handler returning the provider consent URL
pub async fn auth_url_handler(State(state): State<AppState>) -> Json<AuthUrlResponse> {
    Json(state.calendar.auth_url())
}

/// Handler for the OAuth redirect carrying the authorization code
pub async fn token_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> AppResult<Json<TokenMetadata>> {
    let metadata = state.calendar.exchange_code(&query.code).await?;
    info!("Authorization code exchanged successfully");
    Ok(Json(metadata))
}

/// Handler creating a new calendar
pub async fn create_calendar_handler(
    State(state): State<AppState>,
) -> AppResult<Json<CreatedCalendar>> {
    Ok(Json(state.calendar.create_calendar().await?))
}

/// Handler listing the account's calendars
pub async fn list_calendars_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CalendarListEntry>>> {
    Ok(Json(state.calendar.list_calendars().await?))
}

/// Handler creating an event
pub async fn create_event_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewEventRequest>, JsonRejection>,
) -> AppResult<Json<Event>> {
    // Authentication is checked before the body is looked at
    if !state.calendar.is_authenticated().await {
        return Err(Error::Unauthenticated);
    }

    let Json(request) = payload.map_err(|rejection| bad_request(&rejection.body_text()))?;
    Ok(Json(state.calendar.create_event(request).await?))
}
