//! In-memory session store and the cookie middleware that attaches a
//! [`SessionContext`] to every request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use budgetbook_core::session::SessionContext;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "budgetbook_session";

/// Sessions untouched for this long are dropped.
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Shared handle to one user's session. Handlers lock it for the duration of
/// the request so bookmark reads and writes are not interleaved.
pub type SessionHandle = Arc<Mutex<SessionContext>>;

/// Request extension carrying the caller's session.
#[derive(Clone)]
pub struct Session(pub SessionHandle);

struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionEntry>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::new(DEFAULT_SESSION_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        SessionStore {
            sessions: Arc::new(DashMap::new()),
            idle_timeout,
        }
    }

    /// Returns the session for `id`, or a fresh one with a new id. The flag
    /// is true when the session was created. An expired id counts as unknown.
    pub fn load_or_create(&self, id: Option<&str>) -> (String, SessionHandle, bool) {
        let now = Instant::now();
        if let Some(id) = id {
            if let Some(mut entry) = self.sessions.get_mut(id) {
                if now.duration_since(entry.last_seen) < self.idle_timeout {
                    entry.last_seen = now;
                    return (id.to_string(), Arc::clone(&entry.handle), false);
                }
            }
            self.sessions.remove(id);
        }
        let id = Uuid::new_v4().to_string();
        let handle: SessionHandle = Arc::new(Mutex::new(SessionContext::default()));
        self.sessions.insert(
            id.clone(),
            SessionEntry {
                handle: Arc::clone(&handle),
                last_seen: now,
            },
        );
        (id, handle, true)
    }

    /// Drops every session idle for longer than the timeout at `now`.
    /// Returns how many were removed.
    pub fn prune_idle(&self, now: Instant) -> usize {
        let before = self.len();
        self.sessions
            .retain(|_, entry| now.saturating_duration_since(entry.last_seen) < self.idle_timeout);
        before.saturating_sub(self.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Sweeps idle sessions every `every` until the runtime shuts down.
pub fn spawn_session_sweeper(store: SessionStore, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.prune_idle(Instant::now());
            if removed > 0 {
                tracing::debug!(
                    "Dropped {} idle sessions, {} remaining",
                    removed,
                    store.len()
                );
            }
        }
    });
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub async fn session_middleware(
    State(store): State<SessionStore>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie = cookie_value(request.headers(), SESSION_COOKIE);
    let (id, handle, created) = store.load_or_create(cookie.as_deref());
    request.extensions_mut().insert(Session(handle));

    let mut response = next.run(request).await;

    if created {
        let cookie = format!("{}={}; HttpOnly; SameSite=Lax; Path=/", SESSION_COOKIE, id);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Could not set session cookie: {}", e),
        }
    }
    response
}
