//! File-backed storage adapter.
//!
//! One file per key at `<root>/<namespace>/<key>.json`.  Writes go to a
//! sibling temp file which is then renamed over the target, so a crash
//! mid-write leaves the previous blob intact.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use log::warn;

use crate::app::ports::{StorageError, StoragePort};

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(map_io)?;
        Ok(Self { root })
    }

    fn path_for(&self, namespace: &str, key: &str) -> PathBuf {
        self.root.join(namespace).join(format!("{key}.json"))
    }
}

fn map_io(e: io::Error) -> StorageError {
    match e.kind() {
        ErrorKind::NotFound => StorageError::NotFound,
        ErrorKind::InvalidData => StorageError::Corrupted,
        _ => {
            warn!("Store: I/O error: {}", e);
            StorageError::IoError
        }
    }
}

impl StoragePort for FileStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(namespace, key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io(e)),
        }
    }

    fn set(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(namespace, key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(map_io)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(map_io)?;
        fs::rename(&tmp, &path).map_err(map_io)
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(namespace, key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io(e)),
        }
    }
}
