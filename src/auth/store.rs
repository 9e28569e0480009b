use error_stack::{Result, ResultExt};
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::warn;

use crate::util::Sensitive;

/// Key under which the access token is persisted.
pub const TOKEN_KEY: &str = "access_token";

#[derive(Debug, Error)]
#[error("Failed to access stored credentials")]
pub struct StoreError;

/// Durable storage of the access token across runs.
pub trait CredentialStore: Debug + Send + Sync + 'static {
    fn load(&self) -> Result<Option<Sensitive<String>>, StoreError>;

    fn save(&self, token: &Sensitive<String>) -> Result<(), StoreError>;

    /// Removing a token that is not there is not an error.
    fn remove(&self) -> Result<(), StoreError>;
}

/// Keeps credentials in a JSON object on disk. Keys other than
/// [`TOKEN_KEY`] are left untouched.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn contents(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(None),
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error)
                .change_context(StoreError)
                .attach_printable_lazy(|| format!("could not read {}", self.path.display())),
        }
    }

    fn read(&self) -> Result<Map<String, Value>, StoreError> {
        let Some(contents) = self.contents()? else {
            return Ok(Map::new());
        };

        serde_json::from_str(&contents)
            .change_context(StoreError)
            .attach_printable_lazy(|| format!("{} is not a JSON object", self.path.display()))
    }

    /// Entries to rewrite. A file that does not hold a JSON object is
    /// dropped so the token slot can be written again.
    fn read_for_update(&self) -> Result<Map<String, Value>, StoreError> {
        let Some(contents) = self.contents()? else {
            return Ok(Map::new());
        };

        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(error) => {
                warn!(%error, path = %self.path.display(), "replacing corrupt credentials file");
                Ok(Map::new())
            }
        }
    }

    fn write(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .change_context(StoreError)
                .attach_printable_lazy(|| format!("could not create {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(entries).change_context(StoreError)?;
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, contents)
            .change_context(StoreError)
            .attach_printable_lazy(|| format!("could not write {}", temp.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp, std::fs::Permissions::from_mode(0o600))
                .change_context(StoreError)?;
        }

        std::fs::rename(&temp, &self.path)
            .change_context(StoreError)
            .attach_printable_lazy(|| format!("could not replace {}", self.path.display()))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Sensitive<String>>, StoreError> {
        let entries = self.read()?;
        Ok(entries
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(Sensitive::from))
    }

    fn save(&self, token: &Sensitive<String>) -> Result<(), StoreError> {
        let mut entries = self.read_for_update()?;
        entries.insert(TOKEN_KEY.into(), Value::String(token.as_str().to_string()));
        self.write(&entries)
    }

    fn remove(&self) -> Result<(), StoreError> {
        let mut entries = self.read_for_update()?;
        let removed = entries.remove(TOKEN_KEY).is_some();

        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(error) => Err(error)
                    .change_context(StoreError)
                    .attach_printable_lazy(|| format!("could not remove {}", self.path.display())),
            };
        }

        if removed {
            self.write(&entries)
        } else {
            Ok(())
        }
    }
}

/// Credentials that only live as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<Sensitive<String>>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(Sensitive::new(token.into()))),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Sensitive<String>>, StoreError> {
        Ok(self.token.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, token: &Sensitive<String>) -> Result<(), StoreError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}
