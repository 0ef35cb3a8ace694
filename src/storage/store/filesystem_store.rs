//! A filesystem store.
//!
//! Keys map to files relative to a base directory, with `/` separated key segments mapped to directories.

use std::{
    collections::HashMap,
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use walkdir::WalkDir;

use crate::{
    byte_range::{validate_byte_ranges, ByteRange},
    storage::{
        Bytes, ListableStorageTraits, ReadableStorageTraits, StorageError, StoreKey, StoreKeys,
        StoreKeysPrefixes, StorePrefix, StorePrefixes, WritableStorageTraits,
    },
};

/// A synchronous file system store.
#[derive(Debug)]
pub struct FilesystemStore {
    base_path: PathBuf,
    sort: bool,
    readonly: bool,
    files: Mutex<HashMap<StoreKey, Arc<RwLock<()>>>>,
}

impl FilesystemStore {
    /// Create a new file system store at a given `base_path`.
    ///
    /// The base directory does not need to exist, it is created on the first write.
    ///
    /// # Errors
    /// Returns a [`FilesystemStoreCreateError`] if `base_path`:
    ///   - is not valid, or
    ///   - it points to an existing file rather than a directory.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, FilesystemStoreCreateError> {
        let base_path = base_path.as_ref().to_path_buf();
        if base_path.to_str().is_none() {
            return Err(FilesystemStoreCreateError::InvalidBasePath(base_path));
        }

        let readonly = if base_path.exists() {
            let metadata = std::fs::metadata(&base_path)?;
            if !metadata.is_dir() {
                return Err(FilesystemStoreCreateError::InvalidBasePath(base_path));
            }
            metadata.permissions().readonly()
        } else {
            false
        };

        Ok(Self {
            base_path,
            sort: false,
            readonly,
            files: Mutex::default(),
        })
    }

    /// Makes the store sort directories/files when listing.
    #[must_use]
    pub const fn sorted(mut self) -> Self {
        self.sort = true;
        self
    }

    /// Maps a [`StoreKey`] to a filesystem [`PathBuf`].
    #[must_use]
    pub fn key_to_fspath(&self, key: &StoreKey) -> PathBuf {
        let mut path = self.base_path.clone();
        path.push(key.as_str());
        path
    }

    /// Maps a store [`StorePrefix`] to a filesystem [`PathBuf`].
    #[must_use]
    pub fn prefix_to_fs_path(&self, prefix: &StorePrefix) -> PathBuf {
        let mut path = self.base_path.clone();
        path.push(prefix.as_str());
        path
    }

    fn fspath_to_key(&self, path: &Path) -> Option<StoreKey> {
        let relative = pathdiff::diff_paths(path, &self.base_path)?;
        StoreKey::new(relative.to_string_lossy().replace('\\', "/")).ok()
    }

    fn get_file_mutex(&self, key: &StoreKey) -> Arc<RwLock<()>> {
        self.files
            .lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::default()))
            .clone()
    }

    fn walk_keys(&self, path: PathBuf) -> StoreKeys {
        WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| self.fspath_to_key(entry.path()))
            .collect()
    }
}

impl ReadableStorageTraits for FilesystemStore {
    fn get_partial_values_key(
        &self,
        key: &StoreKey,
        byte_ranges: &[ByteRange],
    ) -> Result<Option<Vec<Bytes>>, StorageError> {
        let file = self.get_file_mutex(key);
        let _lock = file.read();

        let mut file = match File::open(self.key_to_fspath(key)) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let size = file.metadata()?.len();
        validate_byte_ranges(byte_ranges, size)?;

        let mut out = Vec::with_capacity(byte_ranges.len());
        for byte_range in byte_ranges {
            let range = byte_range.to_range(size);
            file.seek(SeekFrom::Start(range.start))?;
            let mut buffer = vec![0; usize::try_from(range.end - range.start).unwrap_or_default()];
            file.read_exact(&mut buffer)?;
            out.push(Bytes::from(buffer));
        }
        Ok(Some(out))
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        match std::fs::metadata(self.key_to_fspath(key)) {
            Ok(metadata) if metadata.is_file() => Ok(Some(metadata.len())),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl WritableStorageTraits for FilesystemStore {
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        if self.readonly {
            return Err(StorageError::ReadOnly);
        }

        let file = self.get_file_mutex(key);
        let _lock = file.write();

        let key_path = self.key_to_fspath(key);
        if let Some(parent) = key_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(key_path)?;
        file.write_all(&value)?;
        Ok(())
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        if self.readonly {
            return Err(StorageError::ReadOnly);
        }

        let file = self.get_file_mutex(key);
        let _lock = file.write();

        match std::fs::remove_file(self.key_to_fspath(key)) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        if self.readonly {
            return Err(StorageError::ReadOnly);
        }

        let _lock = self.files.lock(); // lock all operations

        match std::fs::remove_dir_all(self.prefix_to_fs_path(prefix)) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

impl ListableStorageTraits for FilesystemStore {
    fn list(&self) -> Result<StoreKeys, StorageError> {
        Ok(self.walk_keys(self.base_path.clone()))
    }

    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        Ok(self.walk_keys(self.prefix_to_fs_path(prefix)))
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let mut keys: StoreKeys = vec![];
        let mut prefixes: StorePrefixes = vec![];
        if let Ok(dir) = std::fs::read_dir(self.prefix_to_fs_path(prefix)) {
            for entry in dir {
                let entry = entry?;
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if entry.file_type()?.is_dir() {
                    prefixes.push(prefix.child(&name)?);
                } else {
                    keys.push(prefix.key(&name)?);
                }
            }
        }
        if self.sort {
            keys.sort();
            prefixes.sort();
        }
        Ok(StoreKeysPrefixes::new(keys, prefixes))
    }
}

/// A filesystem store creation error.
#[derive(Debug, Error)]
pub enum FilesystemStoreCreateError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// The path is not valid on this system.
    #[error("base path {0} is not valid")]
    InvalidBasePath(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    #[cfg_attr(miri, ignore)]
    fn filesystem_set_get() -> Result<(), Box<dyn Error>> {
        let path = tempfile::TempDir::new()?;
        let store = FilesystemStore::new(path.path())?.sorted();
        let key: StoreKey = "a/b".try_into()?;
        store.set(&key, Bytes::from_static(&[0, 1, 2, 3]))?;
        assert!(path.path().join("a").join("b").is_file());
        assert_eq!(store.get(&key)?.unwrap().as_ref(), &[0, 1, 2, 3]);
        assert_eq!(store.size_key(&key)?, Some(4));
        assert_eq!(
            store.get_partial_values_key(
                &key,
                &[
                    ByteRange::FromStart(1, Some(2)),
                    ByteRange::FromEnd(0, Some(1)),
                    ByteRange::FromEnd(1, None)
                ]
            )?,
            Some(vec![
                Bytes::from_static(&[1, 2]),
                Bytes::from_static(&[3]),
                Bytes::from_static(&[0, 1, 2])
            ])
        );
        assert!(store
            .get_partial_values_key(&key, &[ByteRange::FromStart(3, Some(2))])
            .is_err());
        assert!(store.get(&"a/c".try_into()?)?.is_none());
        store.erase(&key)?;
        store.erase(&key)?;
        assert!(!store.exists(&key)?);
        Ok(())
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn filesystem_list() -> Result<(), Box<dyn Error>> {
        let path = tempfile::TempDir::new()?;
        let store = FilesystemStore::new(path.path())?.sorted();
        store.set(&"a/b".try_into()?, Bytes::new())?;
        store.set(&"a/c".try_into()?, Bytes::new())?;
        store.set(&"a/d/e".try_into()?, Bytes::new())?;
        store.set(&"b/c".try_into()?, Bytes::new())?;

        assert_eq!(
            store.list()?,
            &[
                "a/b".try_into()?,
                "a/c".try_into()?,
                "a/d/e".try_into()?,
                "b/c".try_into()?
            ]
        );
        assert_eq!(
            store.list_prefix(&"a/d/".try_into()?)?,
            &["a/d/e".try_into()?]
        );
        let list_dir = store.list_dir(&"a/".try_into()?)?;
        assert_eq!(list_dir.keys(), &["a/b".try_into()?, "a/c".try_into()?]);
        assert_eq!(list_dir.prefixes(), &["a/d/".try_into()?]);

        store.erase_prefix(&"a/".try_into()?)?;
        assert_eq!(store.list()?, &["b/c".try_into()?]);
        Ok(())
    }
}
