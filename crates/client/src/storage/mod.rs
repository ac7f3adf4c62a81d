//! Durable client-side storage for the session credential.
//!
//! The store holds three keys: the bearer `token`, a serialized `user`
//! backup and the `recentSearches` list. Writers are login/registration,
//! session recovery and logout; everything else only reads.
//!
//! [`CredentialStore`] is the seam tests use to swap the on-disk
//! [`FileStore`] for a [`MemoryStore`].

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use secrecy::SecretString;
use shopsphere_core::RecentSearches;
use thiserror::Error;

use crate::api::User;

/// Errors reading or writing persisted client state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("storage format error: {0}")]
    Format(#[from] serde_json::Error),

    /// A previous writer panicked while holding the store lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Everything the client persists between runs.
#[derive(Debug, Clone, Default)]
pub struct PersistedState {
    /// Bearer token issued at login or registration.
    pub token: Option<SecretString>,
    /// Backup of the last known user, used when validation is unavailable.
    pub user: Option<User>,
    /// Most recent product searches.
    pub recent_searches: RecentSearches,
}

/// Key-value storage for [`PersistedState`].
///
/// Implementations must apply each [`modify`](Self::modify) atomically with
/// respect to other calls on the same store.
pub trait CredentialStore: Send + Sync {
    /// Read the current persisted state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<PersistedState, StorageError>;

    /// Apply `f` to the persisted state and write the result back.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read or written.
    fn modify(&self, f: &mut dyn FnMut(&mut PersistedState)) -> Result<(), StorageError>;

    /// Persisted bearer token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self.load()?.token)
    }

    /// Persisted user backup, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn user(&self) -> Result<Option<User>, StorageError> {
        Ok(self.load()?.user)
    }

    /// Store a freshly issued credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set_credential(&self, token: &SecretString, user: &User) -> Result<(), StorageError> {
        self.modify(&mut |state| {
            state.token = Some(token.clone());
            state.user = Some(user.clone());
        })
    }

    /// Replace the user backup, keeping the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set_user(&self, user: &User) -> Result<(), StorageError> {
        self.modify(&mut |state| state.user = Some(user.clone()))
    }

    /// Forget the token and user backup. Recent searches are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn clear_credential(&self) -> Result<(), StorageError> {
        self.modify(&mut |state| {
            state.token = None;
            state.user = None;
        })
    }

    /// Record a product search and return the updated list.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn record_search(&self, query: &str) -> Result<RecentSearches, StorageError> {
        let mut updated = RecentSearches::default();
        self.modify(&mut |state| {
            state.recent_searches.record(query);
            updated = state.recent_searches.clone();
        })?;
        Ok(updated)
    }
}
