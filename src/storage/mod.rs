//! Key-value storage port used by the visitor tracker and the promotion
//! frequency markers.
//!
//! Two flavours are injected side by side: a durable store that outlives the
//! visitor session, and a session-scoped store whose entries disappear when the
//! visitor session rotates.

mod cookie;
mod memory;
mod scoped;

pub use cookie::{CookieStore, MAX_STATE_BYTES};
pub use memory::MemoryStore;
pub use scoped::SessionScopedStore;

use crate::errors::StorageError;

pub trait KeyValueStore {
    #[allow(clippy::missing_errors_doc)]
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    #[allow(clippy::missing_errors_doc)]
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    #[allow(clippy::missing_errors_doc)]
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// lets the same store back several views at once (ie. durable + session-scoped)
impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
