//! # Host API Boundary
//!
//! The abstract RPC boundary between the chat core and its host
//! environment. Every call is a single request/response with no streaming;
//! the concrete host (gateway process, test double, …) implements
//! [`HostApi`] and the core never knows the difference.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         HOST API SURFACE                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  search_messages(group)    raw message batch for one refresh cycle      │
//! │  send_message(dest, data)  publish an encoded payload                   │
//! │  get_account()             logged-in address + public key               │
//! │  get_names(address)        registered names for an address              │
//! │  publish_resource(...)     upload a hosted resource (media attach)      │
//! │  join_group(id)            membership request from a join action link   │
//! │  open_external(uri)        hand a URI to the host's opener              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::RawMessage;

/// The logged-in account as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account address
    pub address: String,
    /// Account public key
    pub public_key: String,
}

/// One registered name record for an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameInfo {
    /// The registered name
    pub name: String,
    /// Owning address, when the host includes it
    #[serde(default)]
    pub owner: Option<String>,
}

/// Destination of an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendDestination {
    /// A group timeline, by numeric group id
    Group(i64),
    /// A direct recipient, by address
    Direct(String),
}

/// Abstract host request API.
///
/// Suspension points in the core occur only at these calls; the pipeline
/// itself is synchronous given already-fetched data.
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Fetch the full raw message batch for a group. No incremental fetch:
    /// every refresh cycle receives the whole flat, unordered batch.
    async fn search_messages(&self, group_id: i64) -> Result<Vec<RawMessage>>;

    /// Publish an encoded payload to a group or a direct recipient.
    async fn send_message(&self, destination: SendDestination, payload: &str) -> Result<()>;

    /// Fetch the logged-in account.
    async fn get_account(&self) -> Result<Account>;

    /// Fetch the registered names for an address. May be empty.
    async fn get_names(&self, address: &str) -> Result<Vec<NameInfo>>;

    /// Upload a hosted resource (service, identifier, owning name, bytes).
    async fn publish_resource(
        &self,
        service: &str,
        identifier: &str,
        name: &str,
        file: Vec<u8>,
    ) -> Result<()>;

    /// Request membership of a group (join action links land here).
    async fn join_group(&self, group_id: i64) -> Result<()>;

    /// Hand a URI to the host's external opener.
    async fn open_external(&self, uri: &str) -> Result<()>;
}
