use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::SessionError;

/// Per-tab key/value storage that outlives a page load but not the session.
///
/// Implementations may be unavailable (private browsing, quota); callers
/// treat an error as "nothing remembered" and carry on.
pub trait SessionStore {
    /// # Errors
    ///
    /// Returns [`SessionError`] when the storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// # Errors
    ///
    /// Returns [`SessionError`] when the storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        (**self).set(key, value)
    }
}
