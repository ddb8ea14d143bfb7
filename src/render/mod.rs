//! # Markup Renderer
//!
//! Converts decoded message content into display markup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RENDER PIPELINE                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  DecodedContent                                                         │
//! │    Encrypted / Undecodable  →  fixed placeholder string                 │
//! │    Rich(payload)                                                        │
//! │       │                                                                 │
//! │       ├─ reply quote      blockquote of the referenced canonical        │
//! │       │                   message (or a not-found marker)               │
//! │       ├─ document tree    marks → tags, paragraphs → <br>,              │
//! │       │                   headings → <hN>, code → <pre>;                │
//! │       │                   text runs through the link resolver           │
//! │       └─ media refs       appended embeds via the resolver's            │
//! │                           embeddable-service rules                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Literal text is HTML-escaped before any tag is wrapped around it, so
//! message content can never inject markup into the view.

pub mod links;

use std::collections::HashMap;

use crate::document::{DocumentNode, Mark};
use crate::message::RawMessage;
use crate::names::{truncate_address, NameDirectory};
use crate::payload::{decode_payload, DecodedContent, MediaRef};
use crate::time::format_timestamp;

use links::{embed_markup, media_kind, rewrite_links, EmbedKind};

/// Placeholder shown for an encrypted message.
pub const ENCRYPTED_PLACEHOLDER: &str = "[Encrypted Message]";
/// Placeholder shown for a payload that failed to decode.
pub const UNDECODABLE_PLACEHOLDER: &str = "[Unable to decode message]";
/// Placeholder shown for a reply whose original is no longer present.
pub const REPLY_MISSING_PLACEHOLDER: &str = "original message not found";

/// Everything the renderer needs from the surrounding cycle.
///
/// Built fresh by the session each refresh; the renderer itself stays a
/// pure function of message plus context.
pub struct RenderContext<'a> {
    /// Canonical messages keyed by dedup key, for reply-quote lookup
    pub by_key: &'a HashMap<String, &'a RawMessage>,
    /// Name directory with every sender of this cycle already resolved
    pub names: &'a NameDirectory,
    /// Logged-in address, for own-message highlighting
    pub own_address: Option<&'a str>,
}

impl RenderContext<'_> {
    fn sender_name(&self, address: &str) -> String {
        match self.names.cached_name(address) {
            Some(name) => name.to_string(),
            None => truncate_address(address),
        }
    }
}

/// Renders a document tree to markup. Text nodes are escaped, decorated
/// with their marks innermost-first in declared order, then passed through
/// the link resolver.
pub fn render_document(node: &DocumentNode) -> String {
    match node {
        DocumentNode::Text { text, marks } => {
            let mut out = escape_html(text);
            for mark in marks {
                out = match mark {
                    Mark::Bold => format!("<b>{out}</b>"),
                    Mark::Italic => format!("<i>{out}</i>"),
                    Mark::Underline => format!("<u>{out}</u>"),
                };
            }
            rewrite_links(&out)
        }
        DocumentNode::Paragraph { content } => {
            let mut out = render_children(content);
            out.push_str("<br>");
            out
        }
        DocumentNode::HardBreak => "<br>".to_string(),
        DocumentNode::Heading { level, content } => {
            format!("<h{level}>{}</h{level}>", render_children(content))
        }
        DocumentNode::CodeBlock { content } => {
            format!("<pre>{}</pre>", render_children(content))
        }
        DocumentNode::Generic { content } => render_children(content),
    }
}

fn render_children(content: &[DocumentNode]) -> String {
    content.iter().map(render_document).collect()
}

/// Renders decoded content to body markup, without header or quote.
pub fn render_content(content: &DecodedContent) -> String {
    match content {
        DecodedContent::Rich(payload) => render_document(&payload.document),
        DecodedContent::Encrypted => ENCRYPTED_PLACEHOLDER.to_string(),
        DecodedContent::Undecodable => UNDECODABLE_PLACEHOLDER.to_string(),
    }
}

/// Renders one canonical message into its full display element: header
/// (avatar, sender name, timestamp), optional reply quote, body, and
/// trailing media embeds.
pub fn render_message(msg: &RawMessage, ctx: &RenderContext<'_>) -> String {
    let decoded = decode_payload(&msg.data, msg.is_encrypted);

    let own = ctx.own_address == Some(msg.sender.as_str());
    let mut out = String::new();
    out.push_str(if own {
        r#"<div class="message-item highlighted-message">"#
    } else {
        r#"<div class="message-item">"#
    });

    if let Some(url) = ctx.names.avatar_url(&msg.sender) {
        out.push_str(&format!(r#"<img class="avatar" src="{}">"#, escape_html(url)));
    }

    out.push_str(r#"<div class="message-content">"#);
    out.push_str(&format!(
        r#"<strong>{}</strong> <span class="timestamp">{}</span><br>"#,
        escape_html(&ctx.sender_name(&msg.sender)),
        format_timestamp(msg.timestamp),
    ));

    if let DecodedContent::Rich(ref payload) = decoded {
        if let Some(ref replied_to) = payload.replied_to {
            out.push_str(&render_quote(replied_to, ctx));
        }
    }

    out.push_str(&render_content(&decoded));

    if let DecodedContent::Rich(ref payload) = decoded {
        for media in payload.media.iter().filter(|m| !m.is_placeholder()) {
            out.push_str(&render_media(media));
        }
    }

    out.push_str("</div></div>");
    out
}

/// A compact quoted rendering of the replied-to message: sender name plus
/// its decoded body. Sentinel-safe: an encrypted or undecodable original
/// quotes as its placeholder. Quotes do not expand their own nested
/// quotes or media.
fn render_quote(replied_to: &str, ctx: &RenderContext<'_>) -> String {
    match ctx.by_key.get(replied_to) {
        Some(original) => {
            let body = render_content(&decode_payload(&original.data, original.is_encrypted));
            format!(
                "<blockquote><strong>{}</strong><br>{}</blockquote>",
                escape_html(&ctx.sender_name(&original.sender)),
                body,
            )
        }
        None => format!("<blockquote>{REPLY_MISSING_PLACEHOLDER}</blockquote>"),
    }
}

/// An appended embed for one media reference, using the same
/// service-type rules as inline resource links. Services outside the
/// media set degrade to a generic embed anchor.
fn render_media(media: &MediaRef) -> String {
    let url = links::resource_url(
        &escape_html(&media.service),
        &escape_html(&media.name),
        &escape_html(&media.identifier),
    );
    let kind = media_kind(&media.service).unwrap_or(EmbedKind::Generic);
    embed_markup(kind, &url, &url)
}

/// Escapes the four HTML-significant characters in literal text.
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{encode_payload, ParsedPayload, PAYLOAD_VERSION};
    use serde_json::json;

    fn doc(value: serde_json::Value) -> DocumentNode {
        DocumentNode::from_value(&value)
    }

    fn raw(sig: &str, sender: &str, ts: i64, data: String) -> RawMessage {
        RawMessage {
            signature: sig.to_string(),
            chat_reference: None,
            sender: sender.to_string(),
            recipient: None,
            timestamp: ts,
            data,
            is_encrypted: false,
            group_id: 0,
        }
    }

    fn encoded_text(text: &str) -> String {
        encode_payload(&ParsedPayload::from_plain_text(text)).unwrap()
    }

    #[test]
    fn test_paragraph_renders_hi_br() {
        let node = doc(json!({
            "type": "paragraph",
            "content": [{ "type": "text", "text": "hi" }],
        }));
        assert_eq!(render_document(&node), "hi<br>");
    }

    #[test]
    fn test_bold_italic_nesting_deterministic() {
        let node = doc(json!({
            "type": "text",
            "text": "hi",
            "marks": [{ "type": "bold" }, { "type": "italic" }],
        }));
        // Declared order, innermost first: bold wraps first, italic outside.
        assert_eq!(render_document(&node), "<i><b>hi</b></i>");
    }

    #[test]
    fn test_underline_mark() {
        let node = doc(json!({
            "type": "text",
            "text": "x",
            "marks": [{ "type": "underline" }],
        }));
        assert_eq!(render_document(&node), "<u>x</u>");
    }

    #[test]
    fn test_hard_break() {
        assert_eq!(render_document(&DocumentNode::HardBreak), "<br>");
    }

    #[test]
    fn test_heading_wraps_level() {
        let node = doc(json!({
            "type": "heading",
            "attrs": { "level": 2 },
            "content": [{ "type": "text", "text": "title" }],
        }));
        assert_eq!(render_document(&node), "<h2>title</h2>");
    }

    #[test]
    fn test_code_block() {
        let node = doc(json!({
            "type": "codeBlock",
            "content": [{ "type": "text", "text": "let x = 1;" }],
        }));
        assert_eq!(render_document(&node), "<pre>let x = 1;</pre>");
    }

    #[test]
    fn test_unknown_node_contributes_children_only() {
        let node = doc(json!({
            "type": "callout",
            "content": [{ "type": "text", "text": "inner" }],
        }));
        assert_eq!(render_document(&node), "inner");

        let childless = doc(json!({ "type": "mystery" }));
        assert_eq!(render_document(&childless), "");
    }

    #[test]
    fn test_text_is_escaped() {
        let node = doc(json!({
            "type": "text",
            "text": "<script>alert(\"x\")</script> & more",
        }));
        let out = render_document(&node);
        assert_eq!(
            out,
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; more"
        );
    }

    #[test]
    fn test_link_resolved_inside_marked_text() {
        let node = doc(json!({
            "type": "text",
            "text": "see parley://IMAGE/alice/cat.png",
            "marks": [{ "type": "bold" }],
        }));
        assert_eq!(
            render_document(&node),
            r#"<b>see <img src="/IMAGE/alice/cat.png"></b>"#
        );
    }

    #[test]
    fn test_sentinel_rendering() {
        assert_eq!(render_content(&DecodedContent::Encrypted), ENCRYPTED_PLACEHOLDER);
        assert_eq!(render_content(&DecodedContent::Undecodable), UNDECODABLE_PLACEHOLDER);
    }

    #[test]
    fn test_roundtrip_plain_text_recovers_content() {
        let encoded = encoded_text("just words");
        let decoded = decode_payload(&encoded, false);
        assert_eq!(render_content(&decoded), "just words<br>");
    }

    fn test_ctx<'a>(
        by_key: &'a HashMap<String, &'a RawMessage>,
        names: &'a NameDirectory,
    ) -> RenderContext<'a> {
        RenderContext { by_key, names, own_address: None }
    }

    #[test]
    fn test_full_message_rendering() {
        let msg = raw("sig-1", "ADDR1234567890", 1_704_112_496_000, encoded_text("hello"));
        let by_key = HashMap::new();
        let names = NameDirectory::new();
        let out = render_message(&msg, &test_ctx(&by_key, &names));

        assert!(out.starts_with(r#"<div class="message-item">"#));
        // Unresolved sender falls back to a truncated address.
        assert!(out.contains("<strong>ADDR1...67890</strong>"));
        assert!(out.contains(r#"<span class="timestamp">12:34:56</span>"#));
        assert!(out.contains("hello<br>"));
        assert!(out.ends_with("</div></div>"));
    }

    #[test]
    fn test_own_message_highlighted() {
        let msg = raw("sig-1", "me", 0, encoded_text("hey"));
        let by_key = HashMap::new();
        let names = NameDirectory::new();
        let ctx = RenderContext { by_key: &by_key, names: &names, own_address: Some("me") };
        assert!(render_message(&msg, &ctx).starts_with(
            r#"<div class="message-item highlighted-message">"#
        ));
    }

    #[test]
    fn test_reply_quote_present() {
        let original = raw("sig-0", "alice", 100, encoded_text("first post"));
        let mut by_key = HashMap::new();
        by_key.insert("sig-0".to_string(), &original);

        let payload = ParsedPayload {
            document: DocumentNode::plain_paragraph("agreed"),
            media: Vec::new(),
            replied_to: Some("sig-0".into()),
            format_version: PAYLOAD_VERSION,
        };
        let reply = raw("sig-1", "bob", 200, encode_payload(&payload).unwrap());

        let names = NameDirectory::new();
        let out = render_message(&reply, &test_ctx(&by_key, &names));
        assert!(out.contains("<blockquote><strong>alice</strong><br>first post<br></blockquote>"));
        assert!(out.contains("agreed<br>"));
    }

    #[test]
    fn test_reply_quote_missing_original() {
        let payload = ParsedPayload {
            document: DocumentNode::plain_paragraph("agreed"),
            media: Vec::new(),
            replied_to: Some("gone".into()),
            format_version: PAYLOAD_VERSION,
        };
        let reply = raw("sig-1", "bob", 200, encode_payload(&payload).unwrap());

        let by_key = HashMap::new();
        let names = NameDirectory::new();
        let out = render_message(&reply, &test_ctx(&by_key, &names));
        assert!(out.contains(&format!("<blockquote>{REPLY_MISSING_PLACEHOLDER}</blockquote>")));
    }

    #[test]
    fn test_reply_quote_of_encrypted_original_is_sentinel_safe() {
        let mut original = raw("sig-0", "alice", 100, "opaque".into());
        original.is_encrypted = true;
        let mut by_key = HashMap::new();
        by_key.insert("sig-0".to_string(), &original);

        let payload = ParsedPayload {
            document: DocumentNode::plain_paragraph("re"),
            media: Vec::new(),
            replied_to: Some("sig-0".into()),
            format_version: PAYLOAD_VERSION,
        };
        let reply = raw("sig-1", "bob", 200, encode_payload(&payload).unwrap());

        let names = NameDirectory::new();
        let out = render_message(&reply, &test_ctx(&by_key, &names));
        assert!(out.contains(ENCRYPTED_PLACEHOLDER));
    }

    #[test]
    fn test_media_embeds_appended() {
        let payload = ParsedPayload {
            document: DocumentNode::plain_paragraph("look"),
            media: vec![
                MediaRef::default(), // placeholder, skipped
                MediaRef {
                    service: "IMAGE".into(),
                    name: "alice".into(),
                    identifier: "cat.png".into(),
                },
            ],
            replied_to: None,
            format_version: PAYLOAD_VERSION,
        };
        let msg = raw("sig-1", "alice", 0, encode_payload(&payload).unwrap());

        let by_key = HashMap::new();
        let names = NameDirectory::new();
        let out = render_message(&msg, &test_ctx(&by_key, &names));
        assert_eq!(out.matches("<img").count(), 1);
        assert!(out.contains(r#"<img src="/IMAGE/alice/cat.png">"#));
    }

    #[test]
    fn test_undecodable_message_renders_placeholder() {
        let msg = raw("sig-1", "alice", 0, "!!garbage!!".into());
        let by_key = HashMap::new();
        let names = NameDirectory::new();
        let out = render_message(&msg, &test_ctx(&by_key, &names));
        assert!(out.contains(UNDECODABLE_PLACEHOLDER));
    }
}
