use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use super::{ViewKind, VisitorSession};
use crate::errors::StorageError;
use crate::storage::KeyValueStore;

pub const SESSION_KEY: &str = "visitor_session";
pub const VISITOR_ID_KEY: &str = "visitor_id";
pub const DEFAULT_INACTIVITY_MINUTES: i64 = 30;

// long-lived identity, independent of the 30 minute session rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorIdentity {
    pub visitor_id: String,
    pub returning: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredVisitor {
    id: String,
    first_session_id: String,
}

/// Keeps one visitor session per browser and makes sure each post or
/// promotion is counted at most once within it.
///
/// Storage failures never surface to the caller: they are logged and every
/// view is treated as new. When storage is full the oldest recorded views are
/// forgotten first, so the view being recorded is always kept.
pub struct VisitorTracker<S> {
    store: S,
    inactivity: TimeDelta,
}

impl<S: KeyValueStore> VisitorTracker<S> {
    pub const fn new(store: S, inactivity: TimeDelta) -> Self {
        Self { store, inactivity }
    }

    pub fn with_default_inactivity(store: S) -> Self {
        Self::new(store, TimeDelta::minutes(DEFAULT_INACTIVITY_MINUTES))
    }

    #[tracing::instrument(name = "Get or create visitor session", skip(self))]
    pub fn get_or_create_session(&self) -> VisitorSession {
        let now = Utc::now();
        if let Some(session) = self.load::<VisitorSession>(SESSION_KEY) {
            if !session.is_expired(now, self.inactivity) {
                return session;
            }
            tracing::debug!(session_id = %session.id, "Visitor session expired");
        }

        let mut session = VisitorSession::new(now);
        self.persist_session(&mut session);
        session
    }

    /// Returns `true` exactly once per entity and session. The storage write
    /// happens before returning, so a caller that increments remote counters
    /// afterwards cannot double count.
    #[tracing::instrument(name = "Mark entity viewed", skip(self))]
    pub fn mark_viewed(&self, kind: ViewKind, entity_id: &str) -> bool {
        let mut session = self.get_or_create_session();
        self.record_view(&mut session, kind, entity_id)
    }

    // same as `mark_viewed`, for callers already holding the current session
    #[tracing::instrument(name = "Record entity view", skip(self, session), fields(session_id = %session.id))]
    pub fn record_view(&self, session: &mut VisitorSession, kind: ViewKind, entity_id: &str) -> bool {
        if !session.record_view(kind, entity_id, Utc::now()) {
            return false;
        }

        self.persist_session(session);
        true
    }

    #[tracing::instrument(name = "Clear visitor session", skip(self))]
    pub fn clear_session(&self) -> VisitorSession {
        if let Err(e) = self.store.remove(SESSION_KEY) {
            tracing::warn!(error.cause_chain = ?e, "Failed to discard visitor session");
        }

        let mut session = VisitorSession::new(Utc::now());
        self.persist_session(&mut session);
        session
    }

    /// Long-lived visitor id. A visitor counts as returning once they are past
    /// the session in which the id was first issued.
    pub fn visitor_identity(&self, session: &VisitorSession) -> VisitorIdentity {
        if let Some(stored) = self.load::<StoredVisitor>(VISITOR_ID_KEY) {
            return VisitorIdentity {
                returning: stored.first_session_id != session.id,
                visitor_id: stored.id,
            };
        }

        let stored = StoredVisitor {
            id: Uuid::new_v4().to_string(),
            first_session_id: session.id.clone(),
        };
        self.persist(VISITOR_ID_KEY, &stored);
        VisitorIdentity {
            visitor_id: stored.id,
            returning: false,
        }
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, key, "Failed to read visitor storage");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error.message = %e, key, "Discarding malformed visitor storage entry");
                None
            }
        }
    }

    fn persist<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_persist(key, value) {
            tracing::warn!(error.cause_chain = ?e, key, "Failed to write visitor storage");
        }
    }

    // a full store costs the oldest views, never the write itself
    fn persist_session(&self, session: &mut VisitorSession) {
        loop {
            match self.try_persist(SESSION_KEY, &*session) {
                Ok(()) => return,
                Err(StorageError::QuotaExceeded(e)) => {
                    let Some((kind, evicted)) = session.evict_oldest_view() else {
                        tracing::warn!(error.cause_chain = ?e, "Visitor session does not fit in storage");
                        return;
                    };
                    tracing::warn!(?kind, evicted = %evicted, "Visitor storage full, forgetting the oldest view");
                }
                Err(e) => {
                    tracing::warn!(error.cause_chain = ?e, "Failed to write visitor session");
                    return;
                }
            }
        }
    }

    fn try_persist<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|e| StorageError::UnexpectedError(e.into()))?;
        self.store.set(key, &raw)
    }
}
