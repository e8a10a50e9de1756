//! JSON file storage for the credential pair.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use bazaar_core::error::StorageError;
use bazaar_core::{CredentialPair, Result, TokenStore};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// On-disk layout of the credential file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    #[serde(flatten)]
    pub credentials: CredentialPair,
    /// When the pair was last written.
    pub saved_at: DateTime<Utc>,
}

/// A [`TokenStore`] backed by a single JSON file.
///
/// Writes go to a temporary file that is renamed over the target, under an
/// exclusive lock on a sibling `.lock` file, so two processes sharing the
/// file never see a torn write.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file including its metadata.
    pub fn load_stored(&self) -> Result<Option<StoredCredentials>> {
        let _lock = self.lock(false)?;

        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let stored = serde_json::from_str(&content).map_err(StorageError::from)?;
        Ok(Some(stored))
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn lock(&self, exclusive: bool) -> Result<LockGuard> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;

        if exclusive {
            file.lock_exclusive()?;
        } else {
            file.lock_shared()?;
        }
        Ok(LockGuard(file))
    }
}

/// Releases the advisory lock on drop.
struct LockGuard(File);

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.0) {
            warn!(error = %e, "Failed to release credential file lock");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<CredentialPair>> {
        Ok(self.load_stored()?.map(|stored| stored.credentials))
    }

    #[instrument(skip(self, credentials), fields(path = %self.path.display()))]
    fn save(&self, credentials: &CredentialPair) -> Result<()> {
        let _lock = self.lock(true)?;

        let stored = StoredCredentials {
            credentials: credentials.clone(),
            saved_at: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&stored).map_err(StorageError::from)?;

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;

            // Restrict before any secret hits the disk
            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))?;

            file.write_all(content.as_bytes())?;
            file.sync_data()?;
        }
        fs::rename(&temp_path, &self.path)?;

        debug!("Saved credentials");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<()> {
        let _lock = self.lock(true)?;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed stored credentials");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
