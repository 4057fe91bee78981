//! File-based backing store.

use crate::backend::{object_address, BackingStore};
use crate::error::{StorageError, StorageResult};
use crate::params::ConnectionParams;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Prefix of in-flight temporary files; never a valid key segment.
const TEMP_PREFIX: &str = ".largemsg-";

/// A backing store that keeps each object as a file.
///
/// Objects live at `{root}/{bucket}/{key}`, with every `/`-separated key
/// segment mapped to a directory level. Writes go to a temporary file in
/// the target directory and are renamed into place, so readers never see a
/// partially written object.
///
/// Keys containing `.`/`..`/empty segments, backslashes or a leading `/` are
/// rejected so objects cannot escape the root.
///
/// # Example
///
/// ```no_run
/// use largemsg_storage::{BackingStore, FileStore};
///
/// let store = FileStore::open("/var/lib/largemsg").unwrap();
/// let address = store.put(b"payload", "bucket", "orders/values/1").unwrap();
/// assert_eq!(address, "file://bucket/orders/values/1");
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// The scheme of addresses produced by this store.
    pub const SCHEME: &'static str = "file";

    /// Connection parameter naming the root directory.
    pub const ROOT_DIR_PARAM: &'static str = "root_dir";

    /// Opens a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Opens a store from connection parameters (`root_dir`).
    ///
    /// # Errors
    ///
    /// Returns an error if `root_dir` is missing or cannot be created.
    pub fn from_params(params: &ConnectionParams) -> StorageResult<Self> {
        Self::open(params.require(Self::ROOT_DIR_PARAM)?)
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> StorageResult<PathBuf> {
        if bucket.is_empty()
            || bucket == "."
            || bucket == ".."
            || bucket.contains(['/', '\\'])
        {
            return Err(StorageError::invalid_key(bucket, "invalid bucket name"));
        }
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        let mut path = self.bucket_dir(bucket)?;
        if key.contains('\\') {
            return Err(StorageError::invalid_key(key, "backslashes are not allowed"));
        }
        for segment in key.split('/') {
            match segment {
                "" => return Err(StorageError::invalid_key(key, "empty path segment")),
                "." | ".." => {
                    return Err(StorageError::invalid_key(key, "relative path segment"))
                }
                s if s.starts_with(TEMP_PREFIX) => {
                    return Err(StorageError::invalid_key(key, "reserved segment prefix"))
                }
                s => path.push(s),
            }
        }
        Ok(path)
    }

    fn collect_keys(dir: &Path, base: &str, keys: &mut Vec<(String, PathBuf)>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(TEMP_PREFIX) {
                continue;
            }
            let key = if base.is_empty() {
                name
            } else {
                format!("{base}/{name}")
            };
            if entry.file_type()?.is_dir() {
                Self::collect_keys(&entry.path(), &key, keys)?;
            } else {
                keys.push((key, entry.path()));
            }
        }
        Ok(())
    }

    /// Removes `dir` and its ancestors while they are empty, stopping below
    /// `stop`.
    fn prune_empty_dirs(dir: &Path, stop: &Path) {
        let mut current = dir;
        while current != stop && current.starts_with(stop) {
            // Fails once a directory still has entries.
            if fs::remove_dir(current).is_err() {
                break;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }
}

impl BackingStore for FileStore {
    fn scheme(&self) -> &str {
        Self::SCHEME
    }

    fn put(&self, data: &[u8], bucket: &str, key: &str) -> StorageResult<String> {
        let path = self.object_path(bucket, key)?;
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::invalid_key(key, "object has no parent directory"))?;
        fs::create_dir_all(parent)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(parent)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        Ok(object_address(Self::SCHEME, bucket, key))
    }

    fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::not_found(bucket, key))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn delete_all_objects(&self, bucket: &str, prefix: &str) -> StorageResult<()> {
        let dir = self.bucket_dir(bucket)?;
        if !dir.is_dir() {
            return Ok(());
        }

        let mut keys = Vec::new();
        Self::collect_keys(&dir, "", &mut keys)?;

        for (key, path) in keys.into_iter().filter(|(key, _)| key.starts_with(prefix)) {
            match fs::remove_file(&path) {
                Ok(()) => {
                    if let Some(parent) = path.parent() {
                        Self::prune_empty_dirs(parent, &dir);
                    }
                }
                // Removed concurrently.
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(StorageError::DeleteFailed {
                        failed: 1,
                        message: format!("{key}: {e}"),
                    })
                }
            }
        }
        Ok(())
    }
}
