//! Local Checkpoint Store
//!
//! A local-filesystem-backed checkpoint and ownership store for a partitioned
//! event-stream consumer group. It fills the role a distributed
//! lease/checkpoint service plays, scaled down to one machine's filesystem.
//!
//! ## What Does This Do?
//!
//! Per partition of a (namespace, stream, consumer group) key, the store
//! persists two independent ledgers:
//! - **Ownership**: which consumer instance currently claims the partition and
//!   when the claim was last renewed
//! - **Checkpoint**: the last acknowledged read position (offset + sequence
//!   number)
//!
//! Higher-level consumer-group machinery (load balancing, lease expiry,
//! retries) lives in the host. The store is a passive ledger, not an arbiter:
//! it stores and reports claims, it does not decide who should own what.
//!
//! ## Usage
//!
//! ```ignore
//! use checkpoint_store::{CheckpointStore, FileCheckpointStore, OwnershipRecord};
//!
//! let store = FileCheckpointStore::new("./checkpoints")?;
//!
//! // Claim a partition (unconditional overwrite, last writer wins)
//! let claimed = store
//!     .claim_ownership(vec![OwnershipRecord {
//!         namespace: "ns1".to_string(),
//!         stream: "orders".to_string(),
//!         consumer_group: "$Default".to_string(),
//!         partition_id: "0".to_string(),
//!         owner_id: "consumer-A".to_string(),
//!         last_modified_ms: 0,
//!     }])
//!     .await?;
//!
//! // Record progress, then resume from it after a restart
//! store.update_checkpoint(&checkpoint).await?;
//! let checkpoints = store.list_checkpoints("ns1", "orders", "$Default").await?;
//! ```
//!
//! ## Concurrency
//!
//! Operations are self-contained async units with no in-process locking across
//! calls. Concurrent claimants for the same partition both "succeed" with the
//! last completed write winning; there is no compare-and-swap and no fencing.
//! Individual record writes are atomic to readers (temp file + rename), so a
//! reader never observes a half-written record.

pub mod error;
pub mod file_store;
pub mod memory;
pub mod types;

mod fs;

pub use error::{Error, Result};
pub use file_store::FileCheckpointStore;
pub use memory::InMemoryCheckpointStore;
pub use types::{CheckpointRecord, OwnershipRecord};

use async_trait::async_trait;

/// Checkpoint store contract - abstracts over different storage backends.
///
/// The hierarchical-directory layout of [`FileCheckpointStore`] is one valid
/// backing; [`InMemoryCheckpointStore`] substitutes a map with identical
/// observable semantics. All implementations must be `Send + Sync` so a store
/// can be shared across async tasks via `Arc<dyn CheckpointStore>`.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// List all ownership records for a (namespace, stream, consumer group).
    ///
    /// Each record's `last_modified_ms` reflects the current storage
    /// modification time of its partition entry. An uninitialized ledger has
    /// no owners, which is a valid state, not a fault: a never-written key
    /// returns an empty vector.
    ///
    /// Ordering of the returned records is unspecified; callers must not
    /// depend on it.
    ///
    /// # Errors
    ///
    /// Fails fast on the first bad partition entry: `NotFound` if an entry
    /// vanished between enumeration and read, `CorruptRecord` if an entry
    /// cannot be parsed, `PermissionDenied`/`Unexpected` on I/O failure.
    async fn list_ownership(
        &self,
        namespace: &str,
        stream: &str,
        consumer_group: &str,
    ) -> Result<Vec<OwnershipRecord>>;

    /// Claim ownership of the listed partitions.
    ///
    /// For each input record the stored owner is overwritten unconditionally
    /// and `last_modified_ms` is re-stamped from the fresh write. This is an
    /// advisory lease, not a compare-and-swap acquisition: concurrent
    /// claimants all succeed, the last completed write wins, and the returned
    /// records reflect the caller's intent rather than a verified grant.
    async fn claim_ownership(
        &self,
        requested: Vec<OwnershipRecord>,
    ) -> Result<Vec<OwnershipRecord>>;

    /// Persist the read position for one partition.
    ///
    /// Overwrites any prior checkpoint for the partition. The store does not
    /// validate that `sequence_number` is monotonic relative to prior values;
    /// that is the caller's contract.
    async fn update_checkpoint(&self, checkpoint: &CheckpointRecord) -> Result<()>;

    /// List all checkpoint records for a (namespace, stream, consumer group).
    ///
    /// Same empty-ledger, ordering, and failure semantics as
    /// [`list_ownership`](CheckpointStore::list_ownership).
    async fn list_checkpoints(
        &self,
        namespace: &str,
        stream: &str,
        consumer_group: &str,
    ) -> Result<Vec<CheckpointRecord>>;
}
