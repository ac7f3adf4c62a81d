//! In-memory credential store.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{CredentialStore, PersistedState, StorageError};

/// Process-local store, used by tests and short-lived sessions.
///
/// Counts writes so callers can assert that an operation left storage alone.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<PersistedState>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `state`.
    #[must_use]
    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(state),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of completed [`modify`](CredentialStore::modify) calls.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<PersistedState, StorageError> {
        let state = self.state.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(state.clone())
    }

    fn modify(&self, f: &mut dyn FnMut(&mut PersistedState)) -> Result<(), StorageError> {
        let mut state = self.state.lock().map_err(|_| StorageError::Poisoned)?;
        f(&mut state);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::{ExposeSecret, SecretString};
    use shopsphere_core::UserId;

    use super::*;
    use crate::api::User;

    fn user() -> User {
        serde_json::from_str(r#"{"id":7,"email":"a@b.co"}"#).unwrap()
    }

    #[test]
    fn test_set_and_clear_credential() {
        let store = MemoryStore::new();
        store
            .set_credential(&SecretString::from("tok"), &user())
            .unwrap();
        assert_eq!(store.token().unwrap().unwrap().expose_secret(), "tok");
        assert_eq!(store.user().unwrap().unwrap().id, UserId::new(7));

        store.record_search("shoes").unwrap();
        store.clear_credential().unwrap();
        let state = store.load().unwrap();
        assert!(state.token.is_none());
        assert!(state.user.is_none());
        assert_eq!(state.recent_searches.as_slice(), ["shoes"]);
        assert_eq!(store.writes(), 3);
    }

    #[test]
    fn test_reads_do_not_count_as_writes() {
        let store = MemoryStore::new();
        let _ = store.token().unwrap();
        let _ = store.load().unwrap();
        assert_eq!(store.writes(), 0);
    }
}
