//! Local Checkpointing Example
//!
//! Mirrors the lifecycle a consumer-group host drives against the store:
//! - Claim a partition for this consumer instance
//! - Process a few (simulated) events
//! - Checkpoint progress after each batch
//! - List both ledgers to show what a restarted host would observe
//!
//! Run with:
//! ```bash
//! cargo run --example consume_with_checkpointing
//! ```

use checkpoint_store::{CheckpointRecord, CheckpointStore, FileCheckpointStore, OwnershipRecord};

const NAMESPACE: &str = "ns1.servicebus.example.net";
const STREAM: &str = "eh1";
const CONSUMER_GROUP: &str = "$Default";
const OWNER_ID: &str = "consumer-A";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let temp_dir = tempfile::tempdir()?;
    let store = FileCheckpointStore::new(temp_dir.path().join("checkpoints"))?;
    println!("📁 Checkpoint store at {}\n", store.base_dir().display());

    // Step 1: claim partition "0" for this consumer instance
    let claimed = store
        .claim_ownership(vec![OwnershipRecord {
            namespace: NAMESPACE.to_string(),
            stream: STREAM.to_string(),
            consumer_group: CONSUMER_GROUP.to_string(),
            partition_id: "0".to_string(),
            owner_id: OWNER_ID.to_string(),
            last_modified_ms: 0,
        }])
        .await?;
    println!(
        "🔒 Claimed partition {} as {} (claim written at {})",
        claimed[0].partition_id, claimed[0].owner_id, claimed[0].last_modified_ms
    );

    // Step 2: process simulated events, checkpointing after each batch
    for batch in 0i64..3 {
        let last_offset = (batch + 1) * 100;
        let last_sequence = (batch + 1) * 5;

        // ... event processing would happen here ...

        store
            .update_checkpoint(&CheckpointRecord {
                namespace: NAMESPACE.to_string(),
                stream: STREAM.to_string(),
                consumer_group: CONSUMER_GROUP.to_string(),
                partition_id: "0".to_string(),
                offset: last_offset.to_string(),
                sequence_number: last_sequence,
            })
            .await?;
        println!(
            "✅ Batch {batch} processed, checkpointed at offset {last_offset} / sequence {last_sequence}"
        );
    }

    // Step 3: what a restarted host would observe
    println!("\n-- ownership ledger --");
    for record in store
        .list_ownership(NAMESPACE, STREAM, CONSUMER_GROUP)
        .await?
    {
        println!(
            "partition {} owned by {} (last modified {})",
            record.partition_id, record.owner_id, record.last_modified_ms
        );
    }

    println!("\n-- checkpoint ledger --");
    for record in store
        .list_checkpoints(NAMESPACE, STREAM, CONSUMER_GROUP)
        .await?
    {
        println!(
            "partition {} resumes at offset {} (sequence {})",
            record.partition_id, record.offset, record.sequence_number
        );
    }

    Ok(())
}
