#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use ohana_calendar::components::google_calendar::models::{Calendar, CalendarListEntry, Event};
use ohana_calendar::components::google_calendar::{CalendarApi, OAuthProvider, Session, Token};
use ohana_calendar::error::{upstream_error, AppResult};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock OAuth provider counting exchanges and refreshes
pub struct MockOAuth {
    pub exchanges: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub fail_exchange: AtomicBool,
    /// Lifetime of issued tokens; negative issues already-expired tokens
    pub token_lifetime: Duration,
    /// Refresh token handed out on exchange, empty for none
    pub refresh_token: String,
}

impl MockOAuth {
    pub fn new() -> Self {
        Self {
            exchanges: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
            fail_exchange: AtomicBool::new(false),
            token_lifetime: Duration::hours(1),
            refresh_token: "1//mock-refresh".to_string(),
        }
    }

    /// Provider issuing tokens that are already expired
    pub fn expiring(refresh_token: &str) -> Self {
        Self {
            token_lifetime: Duration::seconds(-60),
            refresh_token: refresh_token.to_string(),
            ..Self::new()
        }
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthProvider for MockOAuth {
    fn auth_url(&self, state: &str) -> String {
        format!(
            "https://accounts.example.com/o/oauth2/auth?access_type=offline&client_id=mock&response_type=code&state={}",
            state
        )
    }

    async fn exchange_code(&self, code: &str) -> AppResult<Token> {
        let n = self.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_exchange.load(Ordering::SeqCst) {
            return Err(upstream_error(
                "cannot fetch token: 400 Bad Request\nResponse: {\"error\": \"invalid_grant\"}",
            ));
        }

        Ok(Token {
            access_token: format!("access-{}-{}", code, n),
            token_type: "Bearer".to_string(),
            refresh_token: self.refresh_token.clone(),
            expiry: Some(Utc::now() + self.token_lifetime),
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> AppResult<Token> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;

        Ok(Token {
            access_token: format!("refreshed-{}", n),
            token_type: "Bearer".to_string(),
            refresh_token: refresh_token.to_string(),
            expiry: Some(Utc::now() + Duration::hours(1)),
        })
    }
}

/// Mock calendar service recording every call
#[derive(Default)]
pub struct MockCalendarApi {
    pub calls: AtomicUsize,
    /// When set, every call fails with this message
    pub failure: Mutex<Option<String>>,
    pub last_event: Mutex<Option<(String, Event)>>,
    pub last_access_token: Mutex<Option<String>>,
}

impl MockCalendarApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn last_access_token(&self) -> Option<String> {
        self.last_access_token.lock().unwrap().clone()
    }

    fn record(&self, session: &Session) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_access_token.lock().unwrap() = Some(session.token().access_token.clone());

        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(upstream_error(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CalendarApi for MockCalendarApi {
    async fn insert_calendar(&self, session: &Session, calendar: &Calendar) -> AppResult<Calendar> {
        self.record(session)?;

        let mut created = calendar.clone();
        created.id = Some("c_123@group.calendar.google.com".to_string());
        created
            .extra
            .insert("kind".to_string(), json!("calendar#calendar"));
        Ok(created)
    }

    async fn list_calendars(&self, session: &Session) -> AppResult<Vec<CalendarListEntry>> {
        self.record(session)?;

        let primary: CalendarListEntry = serde_json::from_value(json!({
            "kind": "calendar#calendarListEntry",
            "id": "owner@example.com",
            "summary": "owner@example.com",
            "primary": true,
            "accessRole": "owner",
            "backgroundColor": "#9fe1e7"
        }))?;
        let secondary: CalendarListEntry = serde_json::from_value(json!({
            "kind": "calendar#calendarListEntry",
            "id": "c_123@group.calendar.google.com",
            "summary": "Ohana Customer",
            "accessRole": "owner"
        }))?;

        Ok(vec![primary, secondary])
    }

    async fn insert_event(
        &self,
        session: &Session,
        calendar_id: &str,
        event: &Event,
    ) -> AppResult<Event> {
        self.record(session)?;
        *self.last_event.lock().unwrap() = Some((calendar_id.to_string(), event.clone()));

        // Echo the event back the way the service decorates it
        let mut created = event.clone();
        created.extra.insert("kind".to_string(), json!("calendar#event"));
        created.extra.insert("status".to_string(), json!("confirmed"));
        Ok(created)
    }
}

/// True when `id` looks like a generated event id
pub fn is_event_id(id: &str) -> bool {
    id.len() == 26 && id.chars().all(|c| c.is_ascii_digit() || ('a'..='v').contains(&c))
}
