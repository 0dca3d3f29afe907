pub mod api;
mod handle;
pub mod models;
pub mod oauth;
pub mod session;
pub mod token;

pub use api::{CalendarApi, CalendarApiClient};
pub use handle::{
    GoogleCalendarHandle, EVENT_RECURRENCE_RULE, EVENT_REMINDER_METHOD, EVENT_REMINDER_MINUTES,
    NEW_CALENDAR_DESCRIPTION, NEW_CALENDAR_SUMMARY,
};
pub use models::{CalendarListEntry, Event, NewEventRequest};
pub use oauth::{GoogleOAuth, OAuthClientConfig, OAuthProvider};
pub use session::{Session, SessionStore};
pub use token::{Token, TokenMetadata};
