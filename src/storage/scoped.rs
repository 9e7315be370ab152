use std::collections::BTreeMap;

use super::KeyValueStore;
use crate::errors::StorageError;

const SCOPED_ENTRIES_KEY: &str = "session_scoped_entries";

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct ScopedEntries {
    scope: String,
    entries: BTreeMap<String, String>,
}

/// A view over another store whose entries only live as long as one visitor
/// session.
///
/// Everything is kept under a single key tagged with the owning session id.
/// Entries written under an older session are invisible and get replaced on
/// the next write, so the underlying store never accumulates stale markers.
pub struct SessionScopedStore<S> {
    inner: S,
    scope: String,
}

impl<S: KeyValueStore> SessionScopedStore<S> {
    pub fn new(inner: S, scope: impl Into<String>) -> Self {
        Self {
            inner,
            scope: scope.into(),
        }
    }

    fn fresh(&self) -> ScopedEntries {
        ScopedEntries {
            scope: self.scope.clone(),
            entries: BTreeMap::new(),
        }
    }

    fn load(&self) -> Result<ScopedEntries, StorageError> {
        let Some(raw) = self.inner.get(SCOPED_ENTRIES_KEY)? else {
            return Ok(self.fresh());
        };

        match serde_json::from_str::<ScopedEntries>(&raw) {
            Ok(entries) if entries.scope == self.scope => Ok(entries),
            Ok(_) => Ok(self.fresh()),
            Err(e) => {
                tracing::warn!(error.message = %e, "Discarding malformed session-scoped entries");
                Ok(self.fresh())
            }
        }
    }

    fn save(&self, entries: &ScopedEntries) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries).map_err(|e| StorageError::UnexpectedError(e.into()))?;
        self.inner.set(SCOPED_ENTRIES_KEY, &raw)
    }
}

impl<S: KeyValueStore> KeyValueStore for SessionScopedStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut scoped = self.load()?;
        scoped.entries.insert(key.to_string(), value.to_string());
        self.save(&scoped)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut scoped = self.load()?;
        if scoped.entries.remove(key).is_some() {
            self.save(&scoped)?;
        }
        Ok(())
    }
}
