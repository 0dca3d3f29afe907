use super::token::Token;
use reqwest::RequestBuilder;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Authorized transport: attaches the bearer token to outgoing requests.
///
/// A session is never mutated after construction. Refreshing a token
/// produces a new session which replaces this one in the [`SessionStore`].
#[derive(Debug, Clone)]
pub struct Session {
    token: Token,
}

impl Session {
    pub fn new(token: Token) -> Self {
        Self { token }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Attach the bearer token to a request
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token.access_token)
    }
}

/// Holder of the one session the process can have at a time
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current session, returning the installed one
    pub async fn install(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let mut current = self.current.write().await;
        if current.is_some() {
            info!("Replacing existing calendar session");
        } else {
            info!("Calendar session established");
        }
        *current = Some(Arc::clone(&session));
        session
    }

    /// Replace `expected` with `next`, unless another session was installed meanwhile.
    ///
    /// Returns whichever session is current afterwards.
    pub async fn replace(&self, expected: &Arc<Session>, next: Session) -> Arc<Session> {
        let mut current = self.current.write().await;
        match current.as_ref() {
            Some(existing) if !Arc::ptr_eq(existing, expected) => {
                debug!("Session changed during refresh, keeping the newer one");
                Arc::clone(existing)
            }
            _ => {
                let next = Arc::new(next);
                *current = Some(Arc::clone(&next));
                next
            }
        }
    }

    /// Snapshot of the current session, if any
    pub async fn current(&self) -> Option<Arc<Session>> {
        self.current.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }
}
