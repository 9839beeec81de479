//! Session-scoped in-memory transaction tables.
//!
//! Uploading a statement creates a session holding the decoded rows, and
//! later filter calls look the rows up by an opaque session identifier. The
//! store has an explicit create/get/expire lifecycle so callers can inject
//! and manage it rather than sharing process-wide global state.

use std::{
    collections::HashMap,
    fmt::Display,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::{Error, Transaction};

/// How long a session may sit untouched before it expires.
pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(1);

/// An opaque identifier for a session.
///
/// The identifier carries no information about the session contents; it is
/// a hex-rendered digest minted by [SessionStore::create].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SessionId {
    /// Recreate a session ID from a string previously produced by
    /// [SessionId::to_string], e.g. one round-tripped through a client.
    pub fn from_string(id: &str) -> Self {
        Self(id.to_string())
    }
}

struct Session {
    rows: Vec<Transaction>,
    last_used: OffsetDateTime,
}

/// Holds one in-memory transaction table per active session.
pub struct SessionStore {
    ttl: Duration,
    next_serial: AtomicU64,
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl SessionStore {
    /// Create a store whose sessions expire after `ttl` without use.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_serial: AtomicU64::new(0),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a session holding `rows` and return its identifier.
    pub fn create(&self, rows: Vec<Transaction>) -> SessionId {
        let id = self.generate_id();

        self.sessions.lock().unwrap().insert(
            id.clone(),
            Session {
                rows,
                last_used: OffsetDateTime::now_utc(),
            },
        );

        id
    }

    /// The rows held by the session `id`, or `None` if the session does not
    /// exist or has expired.
    ///
    /// A successful lookup refreshes the session's expiry clock. Callers
    /// that want the "unknown scope yields empty" behaviour of the filter
    /// layer can unwrap to an empty vector.
    pub fn rows(&self, id: &SessionId) -> Option<Vec<Transaction>> {
        let mut sessions = self.sessions.lock().unwrap();
        let now = OffsetDateTime::now_utc();

        match sessions.get_mut(id) {
            Some(session) if now - session.last_used > self.ttl => {
                sessions.remove(id);
                None
            }
            Some(session) => {
                session.last_used = now;
                Some(session.rows.clone())
            }
            None => None,
        }
    }

    /// Append `rows` to the session `id`.
    ///
    /// # Errors
    /// This function will return [Error::NotFound] if the session does not
    /// exist or has expired.
    pub fn append(&self, id: &SessionId, rows: Vec<Transaction>) -> Result<(), Error> {
        let mut sessions = self.sessions.lock().unwrap();
        let now = OffsetDateTime::now_utc();

        match sessions.get_mut(id) {
            Some(session) if now - session.last_used > self.ttl => {
                sessions.remove(id);
                Err(Error::NotFound)
            }
            Some(session) => {
                session.rows.extend(rows);
                session.last_used = now;
                Ok(())
            }
            None => Err(Error::NotFound),
        }
    }

    /// Drop the session `id`. Returns whether a session was removed.
    pub fn remove(&self, id: &SessionId) -> bool {
        self.sessions.lock().unwrap().remove(id).is_some()
    }

    /// Drop every session that has sat untouched longer than the TTL, and
    /// return how many were removed.
    pub fn expire_stale(&self) -> usize {
        let mut sessions = self.sessions.lock().unwrap();
        let now = OffsetDateTime::now_utc();
        let before = sessions.len();

        sessions.retain(|_, session| now - session.last_used <= self.ttl);

        before - sessions.len()
    }

    fn generate_id(&self) -> SessionId {
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();

        let digest = Sha256::digest(format!("{serial}:{nanos}").as_bytes());

        SessionId(digest.iter().map(|byte| format!("{byte:02x}")).collect())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

#[cfg(test)]
mod session_store_tests {
    use time::{Duration, macros::date};

    use crate::{
        Error, Transaction,
        session::{SessionId, SessionStore},
    };

    fn sample_rows() -> Vec<Transaction> {
        vec![Transaction::new_unchecked(
            1,
            "12-3405-0123456-50".to_string(),
            date!(2024 - 01 - 15).midnight().assume_utc(),
            -12.5,
            None,
            "Tesco grocery run".to_string(),
        )]
    }

    #[test]
    fn create_and_rows_round_trip() {
        let store = SessionStore::default();
        let rows = sample_rows();

        let id = store.create(rows.clone());

        assert_eq!(store.rows(&id), Some(rows));
    }

    #[test]
    fn rows_returns_none_for_unknown_session() {
        let store = SessionStore::default();

        let rows = store.rows(&SessionId::from_string("no such session"));

        assert_eq!(rows, None);
    }

    #[test]
    fn session_ids_are_unique() {
        let store = SessionStore::default();

        let first = store.create(sample_rows());
        let second = store.create(sample_rows());

        assert_ne!(first, second);
    }

    #[test]
    fn append_extends_an_existing_session() {
        let store = SessionStore::default();
        let id = store.create(sample_rows());

        store.append(&id, sample_rows()).unwrap();

        assert_eq!(store.rows(&id).unwrap().len(), 2);
    }

    #[test]
    fn append_fails_on_unknown_session() {
        let store = SessionStore::default();

        let result = store.append(&SessionId::from_string("gone"), sample_rows());

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn remove_drops_the_session() {
        let store = SessionStore::default();
        let id = store.create(sample_rows());

        assert!(store.remove(&id));
        assert_eq!(store.rows(&id), None);
    }

    #[test]
    fn expired_sessions_are_gone() {
        let store = SessionStore::new(Duration::ZERO);
        let id = store.create(sample_rows());

        // With a zero TTL any elapsed time at all expires the session.
        std::thread::sleep(std::time::Duration::from_millis(5));

        assert_eq!(store.rows(&id), None);
    }

    #[test]
    fn expire_stale_reports_how_many_sessions_were_dropped() {
        let store = SessionStore::new(Duration::ZERO);
        store.create(sample_rows());
        store.create(sample_rows());

        std::thread::sleep(std::time::Duration::from_millis(5));

        assert_eq!(store.expire_stale(), 2);
        assert_eq!(store.expire_stale(), 0);
    }
}
