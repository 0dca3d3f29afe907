use super::api::{CalendarApi, CalendarApiClient};
use super::models::{
    AuthUrlResponse, Calendar, CalendarListEntry, CreatedCalendar, Event, EventDateTime,
    EventReminder, EventReminders, NewEventRequest,
};
use super::oauth::{GoogleOAuth, OAuthProvider, STATE_TOKEN};
use super::session::{Session, SessionStore};
use super::token::TokenMetadata;
use crate::config::Config;
use crate::error::{bad_request, upstream_error, AppResult, Error};
use crate::utils::event_id::new_event_id;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Summary given to every calendar created through the service
pub const NEW_CALENDAR_SUMMARY: &str = "Ohana Customer";
/// Description given to every calendar created through the service
pub const NEW_CALENDAR_DESCRIPTION: &str = "Google calendar for Ohana customer";

/// Recurrence rule attached to every created event
pub const EVENT_RECURRENCE_RULE: &str = "RRULE:FREQ=DAILY";
/// Reminder override attached to every created event
pub const EVENT_REMINDER_METHOD: &str = "popup";
pub const EVENT_REMINDER_MINUTES: i64 = 60;

/// Handle for the Google Calendar operations exposed over HTTP
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    oauth: Arc<dyn OAuthProvider>,
    api: Arc<dyn CalendarApi>,
    sessions: Arc<SessionStore>,
    event_timezone: String,
}

impl GoogleCalendarHandle {
    /// Create a handle talking to Google's OAuth and Calendar endpoints
    pub fn new(config: &Config) -> Self {
        Self::with_backends(
            Arc::new(GoogleOAuth::new(config.oauth.clone())),
            Arc::new(CalendarApiClient::new()),
            config.event_timezone.clone(),
        )
    }

    /// Create a handle over arbitrary provider and calendar backends
    pub fn with_backends(
        oauth: Arc<dyn OAuthProvider>,
        api: Arc<dyn CalendarApi>,
        event_timezone: impl Into<String>,
    ) -> Self {
        Self {
            oauth,
            api,
            sessions: Arc::new(SessionStore::new()),
            event_timezone: event_timezone.into(),
        }
    }

    /// Consent URL carrying the static state token
    pub fn auth_url(&self) -> AuthUrlResponse {
        AuthUrlResponse {
            auth_url: self.oauth.auth_url(STATE_TOKEN),
        }
    }

    /// Exchange an authorization code and install the resulting session.
    ///
    /// On failure the previously installed session, if any, stays in place.
    pub async fn exchange_code(&self, code: &str) -> AppResult<TokenMetadata> {
        if code.is_empty() {
            return Err(bad_request("missing authorization code"));
        }

        let token = self.oauth.exchange_code(code).await?;
        let metadata = token.metadata();
        self.sessions.install(Session::new(token)).await;

        Ok(metadata)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.sessions.is_authenticated().await
    }

    /// Current session, refreshed first if its token has expired
    pub async fn session(&self) -> AppResult<Arc<Session>> {
        let session = self.sessions.current().await.ok_or(Error::Unauthenticated)?;

        if !session.token().is_expired() {
            return Ok(session);
        }

        if !session.token().has_refresh_token() {
            warn!("Access token expired and no refresh token is available");
            return Err(upstream_error("token expired and refresh token is not set"));
        }

        debug!("Access token expired, refreshing");
        let token = self
            .oauth
            .refresh_token(&session.token().refresh_token)
            .await?;

        Ok(self.sessions.replace(&session, Session::new(token)).await)
    }

    /// Create a calendar with the fixed summary and description
    pub async fn create_calendar(&self) -> AppResult<CreatedCalendar> {
        let session = self.session().await?;

        let calendar = Calendar {
            summary: Some(NEW_CALENDAR_SUMMARY.to_string()),
            description: Some(NEW_CALENDAR_DESCRIPTION.to_string()),
            ..Default::default()
        };

        let created = self.api.insert_calendar(&session, &calendar).await?;
        let calendar_id = created
            .id
            .ok_or_else(|| upstream_error("calendar service returned no calendar id"))?;

        info!("Created calendar {}", calendar_id);
        Ok(CreatedCalendar { calendar_id })
    }

    /// All calendars visible to the authorized account
    pub async fn list_calendars(&self) -> AppResult<Vec<CalendarListEntry>> {
        let session = self.session().await?;
        let calendars = self.api.list_calendars(&session).await?;

        debug!("Listed {} calendars", calendars.len());
        Ok(calendars)
    }

    /// Create an event with a fresh id and the fixed recurrence and reminder
    pub async fn create_event(&self, request: NewEventRequest) -> AppResult<Event> {
        let session = self.session().await?;
        request.validate()?;

        let event = self.build_event(&request);
        let created = self
            .api
            .insert_event(&session, &request.calendar_id, &event)
            .await?;

        info!(
            "Created event {} in calendar {}",
            created.id.as_deref().unwrap_or_default(),
            request.calendar_id
        );
        Ok(created)
    }

    /// Event body sent to the calendar service for a request
    pub fn build_event(&self, request: &NewEventRequest) -> Event {
        let date = |value: &str| EventDateTime {
            date: Some(value.to_string()),
            date_time: None,
            time_zone: Some(self.event_timezone.clone()),
        };

        Event {
            id: Some(new_event_id()),
            summary: Some(request.title.clone()),
            location: non_empty(&request.location),
            description: non_empty(&request.description),
            recurrence: vec![EVENT_RECURRENCE_RULE.to_string()],
            start: Some(date(&request.start_date)),
            end: Some(date(&request.end_date)),
            reminders: Some(EventReminders {
                use_default: false,
                overrides: vec![EventReminder {
                    method: EVENT_REMINDER_METHOD.to_string(),
                    minutes: EVENT_REMINDER_MINUTES,
                }],
            }),
            ..Default::default()
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
