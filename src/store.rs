use crate::types::booking::Booking;

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

pub const STORE_FILE: &str = "bookings.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize bookings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The booking collection as a single JSON document on disk.
///
/// No locking happens here; callers serialize access.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_root(root: &Path) -> Self {
        Self::new(root.join(STORE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unparseable document reads as an empty collection.
    pub fn load(&self) -> Result<Vec<Booking>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "booking store missing, using empty collection");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(bookings) => Ok(bookings),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "booking store is not a JSON array of objects, using empty collection"
                );
                Ok(Vec::new())
            }
        }
    }

    pub fn save(&self, bookings: &[Booking]) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(bookings)?;
        atomic_write(&self.path, &contents).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn atomic_write(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("missing parent directory"))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(STORE_FILE);
    let pid = std::process::id();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    for attempt in 0..10u32 {
        let temp_path = parent.join(format!(".{file_name}.tmp-{pid}-{nanos}-{attempt}"));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(mut file) => {
                let written = file
                    .write_all(contents)
                    .and_then(|()| file.flush())
                    .and_then(|()| std::fs::rename(&temp_path, path));
                if written.is_err() {
                    let _ = std::fs::remove_file(&temp_path);
                }
                return written;
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to create temp file",
    ))
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load__should_return_empty_when_document_missing() {
        // Given
        let root = create_temp_root("store-missing");
        let store = Store::in_root(&root);

        // When
        let bookings = store.load().expect("load");

        // Then
        assert!(bookings.is_empty());
        assert!(!store.path().exists());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn load__should_return_empty_when_document_is_corrupt() {
        // Given
        let root = create_temp_root("store-corrupt");
        let store = Store::in_root(&root);
        std::fs::write(store.path(), "[{\"id\": 1,").expect("write corrupt store");

        // When
        let bookings = store.load().expect("load");

        // Then
        assert!(bookings.is_empty());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn load__should_return_empty_when_document_is_not_an_array() {
        // Given
        let root = create_temp_root("store-object");
        let store = Store::in_root(&root);
        std::fs::write(store.path(), r#"{"id": 1}"#).expect("write store");

        // When
        let bookings = store.load().expect("load");

        // Then
        assert!(bookings.is_empty());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn load__should_report_unreadable_document() {
        // Given
        let root = create_temp_root("store-dir");
        let store = Store::in_root(&root);
        std::fs::create_dir(store.path()).expect("create dir in place of store");

        // When
        let result = store.load();

        // Then
        assert!(matches!(result, Err(StoreError::Read { .. })));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn save__should_round_trip_with_field_order() {
        // Given
        let root = create_temp_root("store-round-trip");
        let store = Store::in_root(&root);
        let bookings = vec![
            booking(json!({"zeta": 1, "alpha": {"nested": [1, 2.5, null]}, "id": 10, "timestamp": "t1"})),
            booking(json!({"name": "Ana", "paid": true, "id": 11, "timestamp": "t2"})),
        ];

        // When
        store.save(&bookings).expect("save");
        let loaded = store.load().expect("load");

        // Then
        assert_eq!(loaded, bookings);
        let keys: Vec<&str> = loaded[0].fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "id", "timestamp"]);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn save__should_write_two_space_indented_array() {
        // Given
        let root = create_temp_root("store-format");
        let store = Store::in_root(&root);

        // When
        store
            .save(&[booking(json!({"name": "Ana", "id": 1, "timestamp": "t"}))])
            .expect("save");

        // Then
        let contents = std::fs::read_to_string(store.path()).expect("read store");
        assert_eq!(
            contents,
            "[\n  {\n    \"name\": \"Ana\",\n    \"id\": 1,\n    \"timestamp\": \"t\"\n  }\n]"
        );

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn save__should_not_leave_temp_files_behind() {
        // Given
        let root = create_temp_root("store-temp");
        let store = Store::in_root(&root);

        // When
        store.save(&[]).expect("first save");
        store.save(&[]).expect("second save");

        // Then
        let entries: Vec<String> = std::fs::read_dir(&root)
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec![STORE_FILE.to_string()]);
        assert_eq!(std::fs::read_to_string(store.path()).expect("read"), "[]");

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    fn booking(value: serde_json::Value) -> Booking {
        Booking::from(value.as_object().cloned().expect("object"))
    }

    fn create_temp_root(test_name: &str) -> PathBuf {
        let mut root = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        root.push(format!("bookd-{}-{}", test_name, nanos));
        std::fs::create_dir_all(&root).expect("create temp dir");
        root
    }
}
