//! # Message Identity
//!
//! Raw message records and edit resolution.
//!
//! The store keeps every revision of a message as its own record. An edit
//! carries a `chatReference` naming the signature of the message it
//! supersedes, so all revisions of one logical message share a dedup key:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         EDIT RESOLUTION                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Raw batch (unordered)              Canonical timeline                  │
//! │  ─────────────────────              ──────────────────                  │
//! │                                                                         │
//! │  { sig: "a",            ts: 100 }                                       │
//! │  { sig: "b", ref: "a",  ts: 300 }   key "a" → "b"  (latest revision)    │
//! │  { sig: "c",            ts: 200 }   key "c" → "c"                       │
//! │                                                                         │
//! │  dedup key = chatReference if present, else signature                   │
//! │  winner    = greatest timestamp; exact ties go to the last seen         │
//! │  order     = ascending timestamp, stable (ties keep fetch order)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// One raw message record as returned by the host store.
///
/// Immutable once received. `data` is the opaque base-58 payload; it is
/// never inspected here; the document decoder owns that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// Unique record id
    pub signature: String,
    /// Signature of the prior message this record supersedes, for edits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_reference: Option<String>,
    /// Sender address
    pub sender: String,
    /// Direct recipient address, absent for group messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opaque encoded payload text
    #[serde(default)]
    pub data: String,
    /// Whether the payload is end-to-end encrypted (opaque to this client)
    #[serde(default)]
    pub is_encrypted: bool,
    /// Group the message belongs to
    #[serde(default)]
    pub group_id: i64,
}

impl RawMessage {
    /// The key under which all revisions of one logical message collapse.
    pub fn dedup_key(&self) -> &str {
        self.chat_reference.as_deref().unwrap_or(&self.signature)
    }
}

/// Collapses a raw batch into canonical, edit-resolved messages.
///
/// Single pass: a dedup-key map keeps the revision with the greatest
/// timestamp (`>=` so an exact tie goes to the last seen). The surviving
/// messages are then stable-sorted ascending by timestamp, so equal
/// timestamps preserve fetch order. An edit whose `chat_reference` points
/// outside the batch needs no special handling; it simply participates
/// under its own key.
pub fn resolve_canonical(batch: Vec<RawMessage>) -> Vec<RawMessage> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(batch.len());
    let mut canonical: Vec<RawMessage> = Vec::with_capacity(batch.len());

    for msg in batch {
        match index.get(msg.dedup_key()) {
            Some(&slot) => {
                if msg.timestamp >= canonical[slot].timestamp {
                    canonical[slot] = msg;
                }
            }
            None => {
                index.insert(msg.dedup_key().to_owned(), canonical.len());
                canonical.push(msg);
            }
        }
    }

    canonical.sort_by_key(|m| m.timestamp);
    canonical
}

/// The set of senders across a canonical batch, in order of first
/// appearance. Computed from the *unfiltered* sequence so the participant
/// list is independent of any selected-sender filter.
pub fn participants(canonical: &[RawMessage]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for msg in canonical {
        if seen.insert(&msg.sender) {
            out.push(msg.sender.clone());
        }
    }
    out
}

/// Restricts a canonical sequence to one sender. `None` keeps everything.
pub fn filter_by_sender<'a>(
    canonical: &'a [RawMessage],
    sender: Option<&str>,
) -> Vec<&'a RawMessage> {
    match sender {
        Some(addr) => canonical.iter().filter(|m| m.sender == addr).collect(),
        None => canonical.iter().collect(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
