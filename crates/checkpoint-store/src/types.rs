//! Record Type Definitions
//!
//! ## Types Overview
//!
//! ### OwnershipRecord
//! Tracks which consumer instance currently claims a partition and when the
//! claim was last renewed. The timestamp is derived from the record's storage
//! modification time; it is never stored inside the record file.
//!
//! ### CheckpointRecord
//! Tracks the last durably-processed read position for a partition: an opaque
//! offset token plus a comparable sequence number.
//!
//! ## Design Decisions
//!
//! - Public record types carry the full composite key (namespace, stream,
//!   consumer group, partition) so a record is self-describing
//! - Timestamps are i64 milliseconds since Unix epoch
//! - Offsets are opaque strings; sequence numbers are i64
//! - On-disk schemas are separate private structs so the wire format can stay
//!   stable independently of the public API

use serde::{Deserialize, Deserializer, Serialize};

/// A consumer instance's claim on one partition.
///
/// At most one ownership record exists per (namespace, stream, consumer group,
/// partition) key at any time. Claiming overwrites the prior record
/// unconditionally; records are never deleted by the store, stale entries
/// persist until overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRecord {
    /// Event-streaming endpoint namespace
    pub namespace: String,

    /// Stream (topic) name within the namespace
    pub stream: String,

    /// Consumer group processing the stream
    pub consumer_group: String,

    /// Partition identifier
    pub partition_id: String,

    /// Opaque identifier of the claiming consumer instance
    pub owner_id: String,

    /// When the claim was last written (milliseconds since Unix epoch),
    /// derived from the record's storage modification time
    pub last_modified_ms: i64,
}

/// The last acknowledged read position for one partition.
///
/// Created on first checkpoint update, overwritten on each subsequent update,
/// never deleted. The store does not enforce that `sequence_number` is
/// monotonic; that is the caller's contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// Event-streaming endpoint namespace
    pub namespace: String,

    /// Stream (topic) name within the namespace
    pub stream: String,

    /// Consumer group processing the stream
    pub consumer_group: String,

    /// Partition identifier
    pub partition_id: String,

    /// Opaque position token, stored and returned as a string
    pub offset: String,

    /// Comparable position marker, expected non-decreasing per partition
    pub sequence_number: i64,
}

/// On-disk schema of an ownership record file: `{"ownerid": "<owner>"}`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OwnershipMetadata {
    pub ownerid: String,
}

/// On-disk schema of a checkpoint record file:
/// `{"offset": "<string>", "sequencenumber": <integer>}`.
///
/// Writes always emit an integer sequence number; reads also tolerate a
/// string-encoded integer for round-trip fidelity with other producers of the
/// layout.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CheckpointMetadata {
    pub offset: String,
    #[serde(
        rename = "sequencenumber",
        deserialize_with = "sequence_number_from_int_or_string"
    )]
    pub sequence_number: i64,
}

fn sequence_number_from_int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_metadata_accepts_integer_sequence() {
        let parsed: CheckpointMetadata =
            serde_json::from_str(r#"{"offset": "12345", "sequencenumber": 42}"#).unwrap();
        assert_eq!(parsed.offset, "12345");
        assert_eq!(parsed.sequence_number, 42);
    }

    #[test]
    fn checkpoint_metadata_accepts_string_sequence() {
        let parsed: CheckpointMetadata =
            serde_json::from_str(r#"{"offset": "100", "sequencenumber": "5"}"#).unwrap();
        assert_eq!(parsed.sequence_number, 5);
    }

    #[test]
    fn checkpoint_metadata_rejects_non_numeric_sequence() {
        let result: Result<CheckpointMetadata, _> =
            serde_json::from_str(r#"{"offset": "100", "sequencenumber": "five"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn checkpoint_metadata_writes_integer_sequence() {
        let json = serde_json::to_string(&CheckpointMetadata {
            offset: "100".to_string(),
            sequence_number: 5,
        })
        .unwrap();
        assert_eq!(json, r#"{"offset":"100","sequencenumber":5}"#);
    }

    #[test]
    fn ownership_metadata_round_trips() {
        let json = serde_json::to_string(&OwnershipMetadata {
            ownerid: "consumer-A".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"ownerid":"consumer-A"}"#);

        let parsed: OwnershipMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ownerid, "consumer-A");
    }
}
