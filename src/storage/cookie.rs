use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use anyhow::Context;
use std::collections::HashMap;
use std::future::{Ready, ready};

use super::KeyValueStore;
use crate::errors::StorageError;

// serialized session state, before encryption and base64 push it towards the
// ~4KB browsers accept for a single cookie
pub const MAX_STATE_BYTES: usize = 2400;

// wrapper type for the visitor's signed session cookie
// the cookie is persistent (see startup), so this is the durable store
pub struct CookieStore(Session);

impl CookieStore {
    // size of the session state as the cookie store would serialize it
    // once `key` holds `encoded`
    fn projected_state_size(&self, key: &str, encoded: String) -> Result<usize, StorageError> {
        let mut state: HashMap<String, String> = self.0.entries().clone();
        state.insert(key.to_string(), encoded);
        Ok(serde_json::to_string(&state).context("Failed to measure session state")?.len())
    }
}

impl KeyValueStore for CookieStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0
            .get::<String>(key)
            .map_err(|e| StorageError::Unavailable(anyhow::anyhow!("{e}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value).context("Failed to encode session value")?;
        let size = self.projected_state_size(key, encoded)?;
        if size > MAX_STATE_BYTES {
            return Err(StorageError::QuotaExceeded(anyhow::anyhow!(
                "session state would take {size} bytes, at most {MAX_STATE_BYTES} fit in the cookie"
            )));
        }

        self.0
            .insert(key, value)
            .map_err(|e| StorageError::Unavailable(anyhow::anyhow!("{e}")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.0.remove(key);
        Ok(())
    }
}

impl FromRequest for CookieStore {
    // return the same error as Session's implementation of FromRequest
    type Error = <Session as FromRequest>::Error;

    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self(req.get_session())))
    }
}
