use super::models::{Calendar, CalendarList, CalendarListEntry, Event};
use super::session::Session;
use crate::error::{upstream_error, AppResult};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Google Calendar v3 REST root
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

/// Calendar service operations, each authorized by an explicit session
#[async_trait]
pub trait CalendarApi: Send + Sync + 'static {
    /// Create a secondary calendar
    async fn insert_calendar(&self, session: &Session, calendar: &Calendar) -> AppResult<Calendar>;

    /// List calendars on the account's calendar list (single page)
    async fn list_calendars(&self, session: &Session) -> AppResult<Vec<CalendarListEntry>>;

    /// Create an event in the given calendar
    async fn insert_event(
        &self,
        session: &Session,
        calendar_id: &str,
        event: &Event,
    ) -> AppResult<Event>;
}

/// reqwest-backed client for the Google Calendar API
#[derive(Debug, Clone)]
pub struct CalendarApiClient {
    client: Client,
    base_url: Url,
}

impl Default for CalendarApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarApiClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: Url::parse(CALENDAR_API_BASE).expect("static calendar API URL is valid"),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Build an endpoint URL, percent-encoding each path segment
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| upstream_error("calendar API base URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl CalendarApi for CalendarApiClient {
    async fn insert_calendar(&self, session: &Session, calendar: &Calendar) -> AppResult<Calendar> {
        let url = self.endpoint(&["calendars"])?;
        debug!("POST {}", url);

        let response = session
            .authorize(self.client.post(url))
            .json(calendar)
            .send()
            .await
            .map_err(|e| upstream_error(&e.to_string()))?;

        decode(response).await
    }

    async fn list_calendars(&self, session: &Session) -> AppResult<Vec<CalendarListEntry>> {
        let url = self.endpoint(&["users", "me", "calendarList"])?;
        debug!("GET {}", url);

        let response = session
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| upstream_error(&e.to_string()))?;

        let list: CalendarList = decode(response).await?;
        Ok(list.items)
    }

    async fn insert_event(
        &self,
        session: &Session,
        calendar_id: &str,
        event: &Event,
    ) -> AppResult<Event> {
        let url = self.endpoint(&["calendars", calendar_id, "events"])?;
        debug!("POST {}", url);

        let response = session
            .authorize(self.client.post(url))
            .json(event)
            .send()
            .await
            .map_err(|e| upstream_error(&e.to_string()))?;

        decode(response).await
    }
}

/// Error body returned by Google APIs
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    #[serde(default)]
    reason: String,
}

/// Decode a successful response or turn a failed one into an upstream error
async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| upstream_error(&format!("failed to read response: {}", e)))?;

    if !status.is_success() {
        return Err(upstream_error(&render_api_error(status, &body)));
    }

    serde_json::from_str(&body)
        .map_err(|e| upstream_error(&format!("invalid calendar API response: {}", e)))
}

/// Render an API error the way Google client libraries report it
pub fn render_api_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => {
            let reasons: Vec<&str> = error
                .errors
                .iter()
                .map(|e| e.reason.as_str())
                .filter(|r| !r.is_empty())
                .collect();

            if reasons.is_empty() {
                format!("googleapi: Error {}: {}", error.code, error.message)
            } else {
                format!(
                    "googleapi: Error {}: {}, {}",
                    error.code,
                    error.message,
                    reasons.join(", ")
                )
            }
        }
        Err(_) => format!(
            "googleapi: got HTTP response code {} with body: {}",
            status.as_u16(),
            body
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_calendar_id() {
        let client = CalendarApiClient::new();
        let url = client
            .endpoint(&["calendars", "team@group.calendar.google.com", "events"])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team@group.calendar.google.com/events"
        );

        let url = client.endpoint(&["calendars", "a/b c", "events"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/a%2Fb%20c/events"
        );
    }

    #[test]
    fn test_endpoint_with_custom_base() {
        let client = CalendarApiClient::new()
            .with_base_url(Url::parse("http://127.0.0.1:9000/calendar/v3").unwrap());
        let url = client.endpoint(&["users", "me", "calendarList"]).unwrap();

        assert_eq!(url.as_str(), "http://127.0.0.1:9000/calendar/v3/users/me/calendarList");
    }

    #[test]
    fn test_render_google_error() {
        let body = r#"{"error":{"code":404,"message":"Not Found","errors":[{"domain":"global","reason":"notFound","message":"Not Found"}]}}"#;

        assert_eq!(
            render_api_error(StatusCode::NOT_FOUND, body),
            "googleapi: Error 404: Not Found, notFound"
        );
    }

    #[test]
    fn test_render_error_without_reasons() {
        let body = r#"{"error":{"code":401,"message":"Request had invalid authentication credentials."}}"#;

        assert_eq!(
            render_api_error(StatusCode::UNAUTHORIZED, body),
            "googleapi: Error 401: Request had invalid authentication credentials."
        );
    }

    #[test]
    fn test_render_unstructured_error() {
        assert_eq!(
            render_api_error(StatusCode::BAD_GATEWAY, "upstream down"),
            "googleapi: got HTTP response code 502 with body: upstream down"
        );
    }
}
