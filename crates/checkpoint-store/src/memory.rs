//! In-Memory Checkpoint Store
//!
//! A map-backed [`CheckpointStore`] with the same observable semantics as the
//! filesystem backend: lowercased keys, unconditional last-writer-wins claims,
//! and write-time `last_modified_ms` stamping. Nothing survives process
//! restart, which makes it suitable for tests and for hosts that want
//! in-process checkpointing without persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::{CheckpointRecord, CheckpointStore, OwnershipRecord};

/// Lowercased composite key, matching the path normalization of the
/// filesystem backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StoreKey {
    namespace: String,
    stream: String,
    consumer_group: String,
    partition_id: String,
}

impl StoreKey {
    fn new(namespace: &str, stream: &str, consumer_group: &str, partition_id: &str) -> Self {
        Self {
            namespace: namespace.to_lowercase(),
            stream: stream.to_lowercase(),
            consumer_group: consumer_group.to_lowercase(),
            partition_id: partition_id.to_lowercase(),
        }
    }

    fn in_group(&self, namespace: &str, stream: &str, consumer_group: &str) -> bool {
        self.namespace == namespace.to_lowercase()
            && self.stream == stream.to_lowercase()
            && self.consumer_group == consumer_group.to_lowercase()
    }
}

#[derive(Debug, Clone)]
struct OwnershipEntry {
    owner_id: String,
    last_modified_ms: i64,
}

#[derive(Debug, Clone)]
struct CheckpointEntry {
    offset: String,
    sequence_number: i64,
}

/// Checkpoint store backed by in-process maps.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    ownership: RwLock<HashMap<StoreKey, OwnershipEntry>>,
    checkpoints: RwLock<HashMap<StoreKey, CheckpointEntry>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn list_ownership(
        &self,
        namespace: &str,
        stream: &str,
        consumer_group: &str,
    ) -> Result<Vec<OwnershipRecord>> {
        let ownership = self.ownership.read().await;

        Ok(ownership
            .iter()
            .filter(|(key, _)| key.in_group(namespace, stream, consumer_group))
            .map(|(key, entry)| OwnershipRecord {
                namespace: namespace.to_string(),
                stream: stream.to_string(),
                consumer_group: consumer_group.to_string(),
                partition_id: key.partition_id.clone(),
                owner_id: entry.owner_id.clone(),
                last_modified_ms: entry.last_modified_ms,
            })
            .collect())
    }

    async fn claim_ownership(
        &self,
        requested: Vec<OwnershipRecord>,
    ) -> Result<Vec<OwnershipRecord>> {
        let mut ownership = self.ownership.write().await;
        let mut result = Vec::with_capacity(requested.len());

        for mut record in requested {
            let key = StoreKey::new(
                &record.namespace,
                &record.stream,
                &record.consumer_group,
                &record.partition_id,
            );
            let now = Self::now_ms();
            ownership.insert(
                key,
                OwnershipEntry {
                    owner_id: record.owner_id.clone(),
                    last_modified_ms: now,
                },
            );
            record.last_modified_ms = now;
            result.push(record);
        }

        Ok(result)
    }

    async fn update_checkpoint(&self, checkpoint: &CheckpointRecord) -> Result<()> {
        let key = StoreKey::new(
            &checkpoint.namespace,
            &checkpoint.stream,
            &checkpoint.consumer_group,
            &checkpoint.partition_id,
        );
        self.checkpoints.write().await.insert(
            key,
            CheckpointEntry {
                offset: checkpoint.offset.clone(),
                sequence_number: checkpoint.sequence_number,
            },
        );
        Ok(())
    }

    async fn list_checkpoints(
        &self,
        namespace: &str,
        stream: &str,
        consumer_group: &str,
    ) -> Result<Vec<CheckpointRecord>> {
        let checkpoints = self.checkpoints.read().await;

        Ok(checkpoints
            .iter()
            .filter(|(key, _)| key.in_group(namespace, stream, consumer_group))
            .map(|(key, entry)| CheckpointRecord {
                namespace: namespace.to_string(),
                stream: stream.to_string(),
                consumer_group: consumer_group.to_string(),
                partition_id: key.partition_id.clone(),
                offset: entry.offset.clone(),
                sequence_number: entry.sequence_number,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ownership(partition_id: &str, owner_id: &str) -> OwnershipRecord {
        OwnershipRecord {
            namespace: "ns1".to_string(),
            stream: "eh1".to_string(),
            consumer_group: "$Default".to_string(),
            partition_id: partition_id.to_string(),
            owner_id: owner_id.to_string(),
            last_modified_ms: 0,
        }
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = InMemoryCheckpointStore::new();
        assert!(store
            .list_ownership("ns1", "eh1", "$Default")
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .list_checkpoints("ns1", "eh1", "$Default")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn claims_are_case_insensitive() {
        let store = InMemoryCheckpointStore::new();
        let mut record = ownership("0", "consumer-A");
        record.namespace = "NS1".to_string();

        store.claim_ownership(vec![record]).await.unwrap();

        let listed = store.list_ownership("ns1", "eh1", "$default").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].owner_id, "consumer-A");
    }

    #[tokio::test]
    async fn last_writer_wins() {
        let store = InMemoryCheckpointStore::new();
        store
            .claim_ownership(vec![ownership("0", "consumer-A")])
            .await
            .unwrap();
        store
            .claim_ownership(vec![ownership("0", "consumer-B")])
            .await
            .unwrap();

        let listed = store.list_ownership("ns1", "eh1", "$Default").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].owner_id, "consumer-B");
    }

    #[tokio::test]
    async fn groups_do_not_bleed_into_each_other() {
        let store = InMemoryCheckpointStore::new();
        store
            .claim_ownership(vec![ownership("0", "consumer-A")])
            .await
            .unwrap();

        assert!(store
            .list_ownership("ns1", "eh1", "other-group")
            .await
            .unwrap()
            .is_empty());
    }
}
