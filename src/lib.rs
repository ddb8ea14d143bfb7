//! # Parley Core
//!
//! Client-side synchronization and rendering core for a polling-based
//! group chat.
//!
//! The crate periodically pulls a flat, unordered batch of message records
//! from a remote store, collapses edits into a canonical timeline, renders
//! rich-document payloads into display markup, and diffs the result
//! against the previously rendered view so unchanged messages are never
//! re-rendered.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          PARLEY CORE PIPELINE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   HostApi (external)                                                    │
//! │   search_messages ──► Identity Resolver ──► canonical timeline          │
//! │                        (dedup + edit                │                   │
//! │                         resolution)                 │                   │
//! │                                        ┌────────────┴───────────┐       │
//! │                                        ▼                        ▼       │
//! │                                participant set          sender filter   │
//! │                                                                 │       │
//! │   per message, only when new or revised:                        ▼       │
//! │   ┌──────────────────────────────────────────────┐      View            │
//! │   │ Document Decoder ─► Markup Renderer          │ ◄──  Reconciler      │
//! │   │ (base58 → JSON →    (marks, headings, media, │      (insert /       │
//! │   │  node tree)          reply quotes; links via │       replace /      │
//! │   │                      the Link Resolver)      │       remove)        │
//! │   └──────────────────────────────────────────────┘         │            │
//! │                                                            ▼            │
//! │                                                     RenderTarget        │
//! │                                                     (external UI)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`api`] - Abstract host RPC boundary
//! - [`message`] - Raw records, dedup keys, edit resolution
//! - [`document`] - Rich-text node tree
//! - [`payload`] - Transport payload codec and sentinels
//! - [`render`] - Markup renderer and resource-link resolver
//! - [`view`] - Incremental view reconciliation
//! - [`names`] - Address-to-name resolution with caching
//! - [`session`] - Cycle orchestration, login, send flow
//! - [`scheduler`] - Polling guard flags (reentrancy, pause, stop)
//! - [`time`] - Timestamp utilities
//!
//! ## Failure Isolation
//!
//! One malformed message never takes down a batch: payload failures become
//! per-message placeholder sentinels. A failed fetch abandons the whole
//! cycle without touching render state; the next tick retries.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod api;
pub mod document;
pub mod error;
pub mod message;
pub mod names;
pub mod payload;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod time;
pub mod view;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use api::{Account, HostApi, NameInfo, SendDestination};
pub use document::{DocumentNode, Mark};
pub use error::{Error, Result};
pub use message::{filter_by_sender, participants, resolve_canonical, RawMessage};
pub use names::NameDirectory;
pub use payload::{decode_payload, encode_payload, DecodedContent, MediaRef, ParsedPayload};
pub use render::links::{classify_uri, EmbedKind, LinkTarget};
pub use render::{render_document, render_message, RenderContext};
pub use scheduler::RefreshScheduler;
pub use session::{ChatSession, Participant, SendState, SessionConfig};
pub use view::{ReconcileStats, Reconciler, RenderTarget};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Parley Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================
