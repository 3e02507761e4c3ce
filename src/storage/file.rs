//! Directory-backed storage backend.
//!
//! Every key becomes one file named after the SHA-256 digest of the key, so
//! file names have a fixed length whatever the tag text. The key itself is
//! kept as a JSON string on the first line of the file, followed by the
//! value.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::storage::{check_quota, Storage};

const RECORD_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

// == File Storage ==
/// Stores each key as a file inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    quota: Option<usize>,
    used: usize,
}

impl FileStorage {
    /// Opens (creating if needed) a storage directory.
    ///
    /// The current usage is recomputed from the files already present.
    pub fn open(dir: impl Into<PathBuf>, quota: Option<usize>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let mut storage = Self {
            dir,
            quota,
            used: 0,
        };
        storage.used = storage.measure()?;
        debug!(
            "Opened file storage at {} ({} bytes in use)",
            storage.dir.display(),
            storage.used
        );
        Ok(storage)
    }

    /// Directory holding the record files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Bytes currently charged against the quota.
    pub fn used_bytes(&self) -> usize {
        self.used
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", record_name(key), RECORD_EXTENSION))
    }

    fn measure(&self) -> Result<usize, StorageError> {
        let mut total = 0;
        for key in self.list_keys()? {
            total += self.stored_size(&key)?;
        }
        Ok(total)
    }

    /// Quota charge of the record under `key`: key bytes plus value bytes.
    fn stored_size(&self, key: &str) -> Result<usize, StorageError> {
        match fs::metadata(self.record_path(key)) {
            Ok(meta) => {
                let value_len = (meta.len() as usize).saturating_sub(encode_header(key).len());
                Ok(key.len() + value_len)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let bytes = match fs::read(self.record_path(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match split_record(&bytes) {
            Some((stored_key, value)) if stored_key == key => {
                // Non-UTF-8 bytes read back as a corrupted record
                Ok(Some(String::from_utf8_lossy(value).into_owned()))
            }
            Some((stored_key, _)) => {
                warn!("Record file for {} holds key {}, ignoring", key, stored_key);
                Ok(None)
            }
            // Unreadable header: hand the bytes back so the cache discards them
            None => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let old_size = self.stored_size(key)?;
        let new_size = key.len() + value.len();
        check_quota(key, self.quota, self.used, old_size, new_size)?;

        let path = self.record_path(key);
        let temp = path.with_extension(TEMP_EXTENSION);
        let mut contents = encode_header(key);
        contents.push_str(value);

        if let Err(e) = fs::write(&temp, contents).and_then(|()| fs::rename(&temp, &path)) {
            if let Err(cleanup) = fs::remove_file(&temp) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove {}: {}", temp.display(), cleanup);
                }
            }
            return Err(e.into());
        }

        // Another process may have touched the file since it was measured
        self.used = self.used.saturating_sub(old_size) + new_size;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        let old_size = self.stored_size(key)?;
        match fs::remove_file(self.record_path(key)) {
            Ok(()) => {
                self.used = self.used.saturating_sub(old_size);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(key) = read_header(&path)? else {
                continue;
            };
            // Files whose name does not match their header are not ours
            if path.file_stem().and_then(|stem| stem.to_str()) != Some(record_name(&key).as_str())
            {
                continue;
            }
            keys.push(key);
        }
        keys.sort();
        Ok(keys)
    }
}

// == Record Layout ==
/// Hex SHA-256 of the key, used as the file stem.
fn record_name(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// First line of a record file: the key as a JSON string.
fn encode_header(key: &str) -> String {
    // A JSON string literal never contains a raw newline
    let mut header = serde_json::Value::from(key).to_string();
    header.push('\n');
    header
}

/// Splits a record file into its key and value bytes.
fn split_record(bytes: &[u8]) -> Option<(String, &[u8])> {
    let newline = bytes.iter().position(|&b| b == b'\n')?;
    let key = serde_json::from_slice::<String>(&bytes[..newline]).ok()?;
    Some((key, &bytes[newline + 1..]))
}

/// Reads only the header line of a record file.
fn read_header(path: &Path) -> io::Result<Option<String>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut line = Vec::new();
    BufReader::new(file).read_until(b'\n', &mut line)?;
    if line.last() != Some(&b'\n') {
        return Ok(None);
    }
    line.pop();
    Ok(serde_json::from_slice::<String>(&line).ok())
}
