//! JSON file credential store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shopsphere_core::RecentSearches;
use tracing::debug;

use super::{CredentialStore, PersistedState, StorageError};
use crate::api::User;

/// On-disk layout. Key names match the web client's local storage keys.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
    #[serde(default)]
    recent_searches: RecentSearches,
}

impl From<StoredFile> for PersistedState {
    fn from(file: StoredFile) -> Self {
        Self {
            token: file.token.map(SecretString::from),
            user: file.user,
            recent_searches: file.recent_searches,
        }
    }
}

impl From<&PersistedState> for StoredFile {
    fn from(state: &PersistedState) -> Self {
        Self {
            token: state.token.as_ref().map(|t| t.expose_secret().to_owned()),
            user: state.user.clone(),
            recent_searches: state.recent_searches.clone(),
        }
    }
}

/// Credential store backed by a single JSON file.
///
/// A missing file reads as empty state. Writes go to a sibling temp file that
/// is renamed over the original, so a crash never leaves a truncated file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store at `path`. Nothing is touched until the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<PersistedState, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PersistedState::default()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(PersistedState::default());
        }
        let file: StoredFile = serde_json::from_str(&raw)?;
        Ok(file.into())
    }

    fn write(&self, state: &PersistedState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&StoredFile::from(state))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "Persisted client state");
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Result<PersistedState, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        self.read()
    }

    fn modify(&self, f: &mut dyn FnMut(&mut PersistedState)) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut state = self.read()?;
        f(&mut state);
        self.write(&state)
    }
}

/// The file holds a bearer token; keep it owner-readable only.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
