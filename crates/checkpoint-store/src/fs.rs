//! Path Resolution and Atomic Record File I/O
//!
//! Shared primitives for both ledgers: map a partition key plus ledger kind to
//! a canonical directory under the store's base directory, and read/write the
//! single JSON record file inside it.
//!
//! ## Storage Layout
//!
//! ```text
//! <base>/<namespace>/<stream>/<group>/ownership/<partition-id>/record
//! <base>/<namespace>/<stream>/<group>/checkpoint/<partition-id>/record
//! ```
//!
//! The full composed path is lowercased before use, so two keys differing only
//! in letter case resolve to the same storage location. Some filesystems are
//! case-insensitive and the store must behave identically everywhere.
//!
//! ## Write Atomicity
//!
//! Writes go to a temporary file in the partition directory and are renamed
//! into place. A concurrent reader never observes a truncated or half-written
//! record; it sees either the previous record or the new one.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::error;

use crate::error::{Error, Result};

/// Record file name within a partition directory.
const RECORD_FILE: &str = "record";
const RECORD_TMP_FILE: &str = "record.tmp";

/// Which of the two ledgers a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LedgerKind {
    Ownership,
    Checkpoint,
}

impl LedgerKind {
    fn as_str(self) -> &'static str {
        match self {
            LedgerKind::Ownership => "ownership",
            LedgerKind::Checkpoint => "checkpoint",
        }
    }
}

/// Resolve the ledger directory for a (namespace, stream, group) key.
///
/// The returned path is fully lowercased, keys differing only in case
/// collide by design.
pub(crate) fn ledger_dir(
    base: &Path,
    namespace: &str,
    stream: &str,
    consumer_group: &str,
    kind: LedgerKind,
) -> PathBuf {
    let composed = base
        .join(namespace)
        .join(stream)
        .join(consumer_group)
        .join(kind.as_str());
    lowercased(composed)
}

/// Resolve the directory holding one partition's record.
pub(crate) fn partition_dir(
    base: &Path,
    namespace: &str,
    stream: &str,
    consumer_group: &str,
    kind: LedgerKind,
    partition_id: &str,
) -> PathBuf {
    let composed = base
        .join(namespace)
        .join(stream)
        .join(consumer_group)
        .join(kind.as_str())
        .join(partition_id);
    lowercased(composed)
}

fn lowercased(path: PathBuf) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}

/// Read and parse the record file inside `dir`.
///
/// Fails with `NotFound` if the file is absent and `CorruptRecord` if the
/// content is not valid JSON for the expected schema. Corruption is surfaced,
/// not skipped: a corrupted ledger entry indicates storage-layer data loss
/// that must not be masked.
pub(crate) async fn read_record<T: DeserializeOwned>(dir: &Path) -> Result<T> {
    let path = dir.join(RECORD_FILE);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| Error::from_io(&path, e))?;

    serde_json::from_slice(&bytes).map_err(|source| {
        error!(path = %path.display(), error = %source, "unable to decode record");
        Error::CorruptRecord { path, source }
    })
}

/// Write `record` as the record file inside `dir`, creating all missing
/// parent directories. Returns the final record path so callers can stamp
/// timestamps from its fresh metadata.
pub(crate) async fn write_record<T: Serialize>(dir: &Path, record: &T) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::from_io(dir, e))?;

    let path = dir.join(RECORD_FILE);
    let data = serde_json::to_vec(record).map_err(|e| Error::from_io(&path, e.into()))?;

    // Write to temporary file first, then atomic rename
    let tmp = dir.join(RECORD_TMP_FILE);
    tokio::fs::write(&tmp, &data)
        .await
        .map_err(|e| Error::from_io(&tmp, e))?;
    tokio::fs::rename(&tmp, &path)
        .await
        .map_err(|e| Error::from_io(&path, e))?;

    Ok(path)
}

/// Modification time of `path` in milliseconds since the Unix epoch.
pub(crate) async fn modified_ms(path: &Path) -> Result<i64> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| Error::from_io(path, e))?;
    let modified = metadata
        .modified()
        .map_err(|e| Error::from_io(path, e))?;
    Ok(system_time_ms(modified))
}

fn system_time_ms(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_millis() as i64,
        // Pre-epoch mtime
        Err(before) => -(before.duration().as_millis() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OwnershipMetadata;
    use tempfile::TempDir;

    #[test]
    fn resolved_paths_are_lowercased() {
        let dir = ledger_dir(
            Path::new("/data/checkpoints"),
            "MyNamespace",
            "Orders",
            "$Default",
            LedgerKind::Ownership,
        );
        assert_eq!(
            dir,
            PathBuf::from("/data/checkpoints/mynamespace/orders/$default/ownership")
        );
    }

    #[test]
    fn case_variants_collide() {
        let base = Path::new("/data");
        let a = partition_dir(base, "NS", "EH", "Group", LedgerKind::Checkpoint, "0");
        let b = partition_dir(base, "ns", "eh", "group", LedgerKind::Checkpoint, "0");
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn read_missing_record_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result: Result<OwnershipMetadata> = read_record(dir.path()).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn read_garbage_is_corrupt_record() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(RECORD_FILE), b"{not valid json").unwrap();

        let result: Result<OwnershipMetadata> = read_record(dir.path()).await;
        assert!(matches!(result, Err(Error::CorruptRecord { .. })));
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let base = TempDir::new().unwrap();
        let dir = base.path().join("deep").join("nested").join("0");

        write_record(
            &dir,
            &OwnershipMetadata {
                ownerid: "consumer-A".to_string(),
            },
        )
        .await
        .unwrap();

        let record: OwnershipMetadata = read_record(&dir).await.unwrap();
        assert_eq!(record.ownerid, "consumer-A");
    }

    #[tokio::test]
    async fn write_leaves_no_temporary_file() {
        let base = TempDir::new().unwrap();
        let dir = base.path().join("0");

        write_record(
            &dir,
            &OwnershipMetadata {
                ownerid: "consumer-A".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(dir.join(RECORD_FILE).exists());
        assert!(!dir.join(RECORD_TMP_FILE).exists());
    }
}
