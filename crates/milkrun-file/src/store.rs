//! Keyed JSON storage under a root directory.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use milkrun_core::Result;
use milkrun_core::error::StorageError;
use milkrun_core::traits::PassLease;
use milkrun_core::types::{Farm, Operator};

pub(crate) const USER_KEY: &str = "user";
pub(crate) const FARMS_KEY: &str = "farms_cache";
pub(crate) const RECORDS_KEY: &str = "records";
pub(crate) const LAST_SYNC_KEY: &str = "last_sync";

/// Filesystem-backed local store.
///
/// Clones share the same in-process writer lock.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    writer: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open the store at `root`, creating the directory if needed.
    ///
    /// The persisted records are loaded once so that a corrupt store is
    /// reported here rather than on first use.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| StorageError::io(&root, e))?;

        let store = Self {
            root,
            writer: Arc::new(Mutex::new(())),
        };

        let records = store.load_records()?;
        debug!(
            root = %store.root.display(),
            records = records.records.len(),
            next_local_id = %records.next_local_id,
            "Opened local store"
        );

        Ok(store)
    }

    pub(crate) fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join("store.lock")
    }

    fn pass_lock_path(&self) -> PathBuf {
        self.root.join("sync.lock")
    }

    /// Read a key, returning `None` if it has never been written.
    pub(crate) fn read_key<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.key_path(key);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&path, e).into()),
        };

        let value = serde_json::from_str(&content).map_err(|e| StorageError::corrupt(&path, e))?;
        Ok(Some(value))
    }

    /// Replace a key's value atomically.
    pub(crate) fn write_key<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.key_path(key);
        let content = serde_json::to_string_pretty(value).map_err(|e| StorageError::Encode {
            message: e.to_string(),
        })?;

        let temp_path = path.with_extension("tmp");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| StorageError::io(&temp_path, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| StorageError::io(&temp_path, e))?;
        file.sync_all().map_err(|e| StorageError::io(&temp_path, e))?;
        fs::rename(&temp_path, &path).map_err(|e| StorageError::io(&path, e))?;

        Ok(())
    }

    fn remove_key(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(&path, e).into()),
        }
    }

    /// Run a read-modify-write sequence with exclusive access to the store.
    ///
    /// Holds the in-process writer mutex and an advisory lock on
    /// `store.lock` for the duration of `f`.
    pub(crate) fn exclusive<R>(&self, f: impl FnOnce() -> Result<R>) -> Result<R> {
        // The mutex guards no data, so a poisoned lock is still usable.
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StorageError::io(&lock_path, e))?;

        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::lock(&lock_path, e))?;

        let result = f();

        FileExt::unlock(&lock_file).map_err(|e| StorageError::lock(&lock_path, e))?;

        result
    }

    /// Claim the store for a reconciliation pass.
    ///
    /// Takes a non-blocking advisory lock on `sync.lock`, so at most one
    /// pass runs per store directory across every handle and process.
    /// Returns `None` if another pass holds it. Separate from `store.lock`,
    /// which is only held for single read-modify-write steps and must stay
    /// available to appends while a pass waits on the network.
    #[instrument(skip(self))]
    pub fn try_begin_pass(&self) -> Result<Option<PassLease>> {
        let path = self.pass_lock_path();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StorageError::io(&path, e))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!("Claimed store for sync pass");
                Ok(Some(PassLease::new(PassLock { file, path })))
            }
            Err(e) if is_contended(&e) => {
                debug!("Sync pass already running on this store");
                Ok(None)
            }
            Err(e) => Err(StorageError::lock(&path, e).into()),
        }
    }

    // ========================================================================
    // Operator
    // ========================================================================

    #[instrument(skip(self, operator), fields(operator = %operator.username))]
    pub fn save_user(&self, operator: &Operator) -> Result<()> {
        self.exclusive(|| self.write_key(USER_KEY, operator))?;
        debug!("Saved operator");
        Ok(())
    }

    pub fn user(&self) -> Result<Option<Operator>> {
        self.read_key(USER_KEY)
    }

    #[instrument(skip(self))]
    pub fn clear_user(&self) -> Result<()> {
        self.exclusive(|| self.remove_key(USER_KEY))
    }

    // ========================================================================
    // Farm cache
    // ========================================================================

    #[instrument(skip(self, farms), fields(count = farms.len()))]
    pub fn save_farms(&self, farms: &[Farm]) -> Result<()> {
        self.exclusive(|| self.write_key(FARMS_KEY, &farms))?;
        debug!("Refreshed farm cache");
        Ok(())
    }

    /// Cached farms; empty if the cache was never filled.
    pub fn farms(&self) -> Result<Vec<Farm>> {
        Ok(self.read_key(FARMS_KEY)?.unwrap_or_default())
    }

    // ========================================================================
    // Last sync
    // ========================================================================

    pub fn set_last_sync(&self, at: DateTime<Utc>) -> Result<()> {
        self.exclusive(|| self.write_key(LAST_SYNC_KEY, &at.to_rfc3339()))
    }

    pub fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.read_key::<String>(LAST_SYNC_KEY)? else {
            return Ok(None);
        };

        let parsed = DateTime::parse_from_rfc3339(&raw).map_err(|e| StorageError::Corrupt {
            path: self.key_path(LAST_SYNC_KEY),
            message: e.to_string(),
        })?;

        Ok(Some(parsed.with_timezone(&Utc)))
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// `sync.lock` held for the lifetime of a [`PassLease`].
struct PassLock {
    file: File,
    path: PathBuf,
}

impl Drop for PassLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            // Closing the file releases the lock anyway.
            warn!(path = %self.path.display(), error = %e, "Failed to unlock sync.lock");
        }
    }
}
