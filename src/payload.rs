//! # Transport Payload Codec
//!
//! Encoding and decoding of the message payload wire format.
//!
//! ## Wire Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PAYLOAD WIRE FORMAT                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  {                                                                      │
//! │    "messageText": { ...document node tree... },                         │
//! │    "images": [ { "service", "name", "identifier" }, ... ],              │
//! │    "repliedTo": "<signature>",          // optional                     │
//! │    "version": 3                                                         │
//! │  }                                                                      │
//! │                                                                         │
//! │  → UTF-8 bytes → base-58 text (Bitcoin alphabet)                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Isolation
//!
//! Decoding never returns an error to the pipeline. An encrypted message is
//! opaque by contract and yields [`DecodedContent::Encrypted`]; any decode,
//! encoding, or structural failure yields [`DecodedContent::Undecodable`].
//! Both sentinels render as fixed placeholder strings, so one malformed
//! record can never abort its siblings in a batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::DocumentNode;
use crate::error::Result;

/// Current payload format version.
pub const PAYLOAD_VERSION: u32 = 3;

/// A typed pointer to externally hosted content. Payloads never embed
/// media bytes, only references resolvable through the resource gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Hosting service type (IMAGE, VIDEO, ...)
    #[serde(default)]
    pub service: String,
    /// Owning registered name
    #[serde(default)]
    pub name: String,
    /// Resource identifier under that name
    #[serde(default)]
    pub identifier: String,
}

impl MediaRef {
    /// Composer drafts ship an all-empty ref when no media is attached;
    /// such placeholders are skipped during rendering.
    pub fn is_placeholder(&self) -> bool {
        self.service.is_empty() && self.name.is_empty() && self.identifier.is_empty()
    }
}

/// A fully decoded rich payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPayload {
    /// The rich-text document tree
    pub document: DocumentNode,
    /// Attached media references, in order
    pub media: Vec<MediaRef>,
    /// Signature of the message this one replies to
    pub replied_to: Option<String>,
    /// Wire format version the payload declared
    pub format_version: u32,
}

impl ParsedPayload {
    /// A version-current payload holding one plain-text paragraph, the
    /// shape the composer produces for an ordinary typed message.
    pub fn from_plain_text(text: &str) -> Self {
        Self {
            document: DocumentNode::plain_paragraph(text),
            media: Vec::new(),
            replied_to: None,
            format_version: PAYLOAD_VERSION,
        }
    }
}

/// Decode outcome for one message. The two sentinels are terminal: they
/// carry no document and render as fixed placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedContent {
    /// A structurally valid rich payload
    Rich(ParsedPayload),
    /// Encrypted for someone else; never parsed
    Encrypted,
    /// The payload failed base-58, UTF-8, or structural decoding
    Undecodable,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload {
    message_text: Value,
    #[serde(default)]
    images: Vec<MediaRef>,
    #[serde(default)]
    replied_to: Option<String>,
    #[serde(default = "current_version")]
    version: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePayloadOut<'a> {
    message_text: Value,
    images: &'a [MediaRef],
    #[serde(skip_serializing_if = "Option::is_none")]
    replied_to: Option<&'a str>,
    version: u32,
}

fn current_version() -> u32 {
    PAYLOAD_VERSION
}

/// Decodes one message payload, absorbing every failure into a sentinel.
pub fn decode_payload(data: &str, is_encrypted: bool) -> DecodedContent {
    if is_encrypted {
        return DecodedContent::Encrypted;
    }
    match try_decode(data) {
        Ok(payload) => DecodedContent::Rich(payload),
        Err(err) => {
            tracing::debug!("payload undecodable: {err}");
            DecodedContent::Undecodable
        }
    }
}

fn try_decode(data: &str) -> Result<ParsedPayload> {
    let bytes = bs58::decode(data).into_vec()?;
    let text = std::str::from_utf8(&bytes)?;
    let wire: WirePayload = serde_json::from_str(text)?;
    Ok(ParsedPayload {
        document: DocumentNode::from_value(&wire.message_text),
        media: wire.images,
        replied_to: wire.replied_to,
        format_version: wire.version,
    })
}

/// Encodes a payload for transport: wire JSON, UTF-8, then base-58.
pub fn encode_payload(payload: &ParsedPayload) -> Result<String> {
    let wire = WirePayloadOut {
        message_text: payload.document.to_value(),
        images: &payload.media,
        replied_to: payload.replied_to.as_deref(),
        version: payload.format_version,
    };
    let json = serde_json::to_string(&wire)?;
    Ok(bs58::encode(json.as_bytes()).into_string())
}

// ============================================================================
// TESTS
// ============================================================================
