// session - server-side sessions keyed by an opaque cookie id

pub mod cookie;

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::security::csrf;

#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: Option<i64>,
    csrf_secret: Option<String>,
    last_seen: DateTime<Utc>,
}

impl SessionRecord {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            user_id: None,
            csrf_secret: None,
            last_seen: now,
        }
    }
}

/// In-memory session table with idle expiry
#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
    ttl: Duration,
}

/// What the response should do with the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieAction {
    Keep,
    Set,
    Clear,
}

#[derive(Debug)]
struct HandleState {
    id: String,
    cookie: CookieAction,
}

/// Per-request view of one session, shared between middleware and handlers
#[derive(Clone, Debug)]
pub struct Session {
    store: SessionStore,
    state: Arc<Mutex<HandleState>>,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: i64::try_from(ttl_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
        }
    }

    /// Resolve the session named by the cookie. Unknown or expired ids are
    /// never adopted; a fresh id is minted instead.
    pub async fn resolve(&self, cookie_id: Option<&str>) -> Session {
        self.resolve_at(cookie_id, Utc::now()).await
    }

    pub async fn resolve_at(&self, cookie_id: Option<&str>, now: DateTime<Utc>) -> Session {
        let mut sessions = self.sessions.write().await;

        if let Some(id) = cookie_id {
            let expired = match sessions.get_mut(id) {
                Some(record) if now - record.last_seen <= self.ttl => {
                    record.last_seen = now;
                    return self.handle(id.to_string(), CookieAction::Keep);
                }
                Some(_) => true,
                None => false,
            };
            if expired {
                debug!("Session expired, minting a new one");
                sessions.remove(id);
            }
        }

        let id = Self::mint_id(&sessions);
        sessions.insert(id.clone(), SessionRecord::new(now));
        self.handle(id, CookieAction::Set)
    }

    fn handle(&self, id: String, cookie: CookieAction) -> Session {
        Session {
            store: self.clone(),
            state: Arc::new(Mutex::new(HandleState { id, cookie })),
        }
    }

    fn mint_id(sessions: &HashMap<String, SessionRecord>) -> String {
        loop {
            let id = csrf::random_hex(32);
            if !sessions.contains_key(&id) {
                return id;
            }
        }
    }

    /// Remove sessions idle for longer than the ttl
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| now - record.last_seen <= self.ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn with_record<T>(&self, id: &str, f: impl FnOnce(&mut SessionRecord) -> T) -> T {
        let mut sessions = self.sessions.write().await;
        let record = sessions
            .entry(id.to_string())
            .or_insert_with(|| SessionRecord::new(Utc::now()));
        f(record)
    }
}

impl Session {
    pub async fn id(&self) -> String {
        self.state.lock().await.id.clone()
    }

    pub async fn cookie_action(&self) -> (String, CookieAction) {
        let state = self.state.lock().await;
        (state.id.clone(), state.cookie)
    }

    pub async fn user_id(&self) -> Option<i64> {
        let state = self.state.lock().await;
        let sessions = self.store.sessions.read().await;
        sessions.get(&state.id).and_then(|r| r.user_id)
    }

    /// The session's CSRF secret, generated on first access
    pub async fn csrf_token(&self) -> String {
        let state = self.state.lock().await;
        self.store
            .with_record(&state.id, |record| {
                record
                    .csrf_secret
                    .get_or_insert_with(csrf::generate_token)
                    .clone()
            })
            .await
    }

    pub async fn verify_csrf(&self, supplied: Option<&str>) -> bool {
        let state = self.state.lock().await;
        let sessions = self.store.sessions.read().await;
        let stored = sessions
            .get(&state.id)
            .and_then(|r| r.csrf_secret.as_deref());
        csrf::tokens_match(stored, supplied)
    }

    /// Bind the session to a user under a new id; CSRF secret carries over
    pub async fn authenticate(&self, user_id: i64) {
        let mut state = self.state.lock().await;
        let mut sessions = self.store.sessions.write().await;

        let mut record = sessions
            .remove(&state.id)
            .unwrap_or_else(|| SessionRecord::new(Utc::now()));
        record.user_id = Some(user_id);
        record.last_seen = Utc::now();

        let new_id = SessionStore::mint_id(&sessions);
        sessions.insert(new_id.clone(), record);
        state.id = new_id;
        state.cookie = CookieAction::Set;
    }

    /// Drop all session data and expire the cookie
    pub async fn destroy(&self) {
        let mut state = self.state.lock().await;
        self.store.sessions.write().await.remove(&state.id);
        state.cookie = CookieAction::Clear;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_cookie_is_not_adopted() {
        let store = SessionStore::new(1440);
        let session = store.resolve(Some("attacker-chosen")).await;
        let (id, action) = session.cookie_action().await;
        assert_ne!(id, "attacker-chosen");
        assert_eq!(id.len(), 64);
        assert_eq!(action, CookieAction::Set);
    }

    #[tokio::test]
    async fn known_cookie_resumes_session() {
        let store = SessionStore::new(1440);
        let first = store.resolve(None).await;
        let token = first.csrf_token().await;
        let id = first.id().await;

        let second = store.resolve(Some(&id)).await;
        assert_eq!(second.cookie_action().await, (id, CookieAction::Keep));
        assert_eq!(second.csrf_token().await, token);
        assert!(second.verify_csrf(Some(&token)).await);
        assert!(!second.verify_csrf(Some("nope")).await);
        assert!(!second.verify_csrf(None).await);
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::new(60);
        let start = Utc::now();
        let session = store.resolve_at(None, start).await;
        let id = session.id().await;

        let later = store
            .resolve_at(Some(&id), start + Duration::seconds(61))
            .await;
        assert_ne!(later.id().await, id);
        assert_eq!(store.purge_expired(start + Duration::seconds(200)).await, 1);
    }

    #[tokio::test]
    async fn huge_ttl_never_expires() {
        let store = SessionStore::new(u64::MAX);
        let start = Utc::now();
        let id = store.resolve_at(None, start).await.id().await;

        let later = store
            .resolve_at(Some(&id), start + Duration::days(3650))
            .await;
        assert_eq!(later.cookie_action().await, (id, CookieAction::Keep));
    }

    #[tokio::test]
    async fn authenticate_regenerates_id_and_keeps_csrf() {
        let store = SessionStore::new(1440);
        let session = store.resolve(None).await;
        let old_id = session.id().await;
        let token = session.csrf_token().await;

        session.authenticate(7).await;

        let (new_id, action) = session.cookie_action().await;
        assert_ne!(new_id, old_id);
        assert_eq!(action, CookieAction::Set);
        assert_eq!(session.user_id().await, Some(7));
        assert!(session.verify_csrf(Some(&token)).await);

        let stale = store.resolve(Some(&old_id)).await;
        assert_eq!(stale.user_id().await, None);
    }

    #[tokio::test]
    async fn destroy_clears_data() {
        let store = SessionStore::new(1440);
        let session = store.resolve(None).await;
        session.authenticate(3).await;
        session.destroy().await;

        assert_eq!(session.cookie_action().await.1, CookieAction::Clear);
        assert_eq!(session.user_id().await, None);
        assert_eq!(store.len().await, 0);
    }
}
