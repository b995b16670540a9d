//! Filesystem Checkpoint Store Implementation
//!
//! Implements the [`CheckpointStore`] trait on top of a local directory tree:
//!
//! ```text
//! <base>/<namespace>/<stream>/<group>/ownership/<partition-id>/record
//! <base>/<namespace>/<stream>/<group>/checkpoint/<partition-id>/record
//! ```
//!
//! All paths are lowercased before use, and each record write is atomic to
//! readers (temp file + rename). See the crate docs for the concurrency
//! contract; within those limits this backend survives crashes without ever
//! exposing a half-written record.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fs::{self, LedgerKind};
use crate::types::{CheckpointMetadata, OwnershipMetadata};
use crate::{CheckpointRecord, CheckpointStore, OwnershipRecord};

/// Checkpoint store backed by a local directory tree.
///
/// Cheap to clone; clones share the same base directory. Multiple processes
/// (even hosts, if they share the storage root) may point stores at the same
/// base; coordination between them is limited to last-writer-wins.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    base: PathBuf,
}

impl FileCheckpointStore {
    /// Create a store rooted at `base`.
    ///
    /// The base directory is created if it does not already exist.
    pub fn new(base: impl Into<PathBuf>) -> Result<Self> {
        let base = base.into();
        std::fs::create_dir_all(&base).map_err(|e| Error::from_io(&base, e))?;
        Ok(Self { base })
    }

    /// The storage root this store was created with.
    pub fn base_dir(&self) -> &std::path::Path {
        &self.base
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn list_ownership(
        &self,
        namespace: &str,
        stream: &str,
        consumer_group: &str,
    ) -> Result<Vec<OwnershipRecord>> {
        let ledger = fs::ledger_dir(
            &self.base,
            namespace,
            stream,
            consumer_group,
            LedgerKind::Ownership,
        );

        let mut entries = match tokio::fs::read_dir(&ledger).await {
            Ok(entries) => entries,
            // Never-written ledger: no owners yet
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::from_io(&ledger, e)),
        };

        let mut result = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::from_io(&ledger, e))?
        {
            let partition_dir = entry.path();
            let metadata: OwnershipMetadata = fs::read_record(&partition_dir).await?;
            let last_modified_ms = fs::modified_ms(&partition_dir).await?;

            result.push(OwnershipRecord {
                namespace: namespace.to_string(),
                stream: stream.to_string(),
                consumer_group: consumer_group.to_string(),
                partition_id: entry.file_name().to_string_lossy().into_owned(),
                owner_id: metadata.ownerid,
                last_modified_ms,
            });
        }

        Ok(result)
    }

    async fn claim_ownership(
        &self,
        requested: Vec<OwnershipRecord>,
    ) -> Result<Vec<OwnershipRecord>> {
        let mut result = Vec::with_capacity(requested.len());

        for mut ownership in requested {
            let partition_dir = fs::partition_dir(
                &self.base,
                &ownership.namespace,
                &ownership.stream,
                &ownership.consumer_group,
                LedgerKind::Ownership,
                &ownership.partition_id,
            );

            let record_path = fs::write_record(
                &partition_dir,
                &OwnershipMetadata {
                    ownerid: ownership.owner_id.clone(),
                },
            )
            .await?;
            ownership.last_modified_ms = fs::modified_ms(&record_path).await?;

            debug!(
                namespace = %ownership.namespace,
                stream = %ownership.stream,
                consumer_group = %ownership.consumer_group,
                partition = %ownership.partition_id,
                owner = %ownership.owner_id,
                "claimed partition ownership"
            );
            result.push(ownership);
        }

        Ok(result)
    }

    async fn update_checkpoint(&self, checkpoint: &CheckpointRecord) -> Result<()> {
        let partition_dir = fs::partition_dir(
            &self.base,
            &checkpoint.namespace,
            &checkpoint.stream,
            &checkpoint.consumer_group,
            LedgerKind::Checkpoint,
            &checkpoint.partition_id,
        );

        fs::write_record(
            &partition_dir,
            &CheckpointMetadata {
                offset: checkpoint.offset.clone(),
                sequence_number: checkpoint.sequence_number,
            },
        )
        .await?;

        debug!(
            namespace = %checkpoint.namespace,
            stream = %checkpoint.stream,
            consumer_group = %checkpoint.consumer_group,
            partition = %checkpoint.partition_id,
            offset = %checkpoint.offset,
            sequence_number = checkpoint.sequence_number,
            "updated checkpoint"
        );
        Ok(())
    }

    async fn list_checkpoints(
        &self,
        namespace: &str,
        stream: &str,
        consumer_group: &str,
    ) -> Result<Vec<CheckpointRecord>> {
        let ledger = fs::ledger_dir(
            &self.base,
            namespace,
            stream,
            consumer_group,
            LedgerKind::Checkpoint,
        );

        let mut entries = match tokio::fs::read_dir(&ledger).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::from_io(&ledger, e)),
        };

        let mut result = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::from_io(&ledger, e))?
        {
            let metadata: CheckpointMetadata = fs::read_record(&entry.path()).await?;

            result.push(CheckpointRecord {
                namespace: namespace.to_string(),
                stream: stream.to_string(),
                consumer_group: consumer_group.to_string(),
                partition_id: entry.file_name().to_string_lossy().into_owned(),
                offset: metadata.offset,
                sequence_number: metadata.sequence_number,
            });
        }

        Ok(result)
    }
}
