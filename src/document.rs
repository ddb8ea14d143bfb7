//! # Rich-Text Document Tree
//!
//! The structured document carried inside a message payload.
//!
//! On the wire a document is a tree of JSON objects discriminated by a
//! `type` string. This module gives that tree an explicit sum type with an
//! exhaustive match surface and a single `Generic` fallback arm, so an
//! unknown node type from a newer client degrades gracefully instead of
//! failing the whole payload: its children still render, the unknown
//! wrapper contributes nothing.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          NODE VARIANTS                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  text       { text, marks: [bold|italic|underline] }   leaf             │
//! │  paragraph  { content: [...] }                          block + break   │
//! │  hardBreak  { }                                         line break      │
//! │  heading    { attrs: { level }, content: [...] }        h1..h6          │
//! │  codeBlock  { content: [...] }                          preformatted    │
//! │  <other>    { content?: [...] }                         Generic         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::{json, Value};

/// An inline formatting attribute on a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// Bold weight
    Bold,
    /// Italic slant
    Italic,
    /// Underline
    Underline,
}

impl Mark {
    /// Parse a wire mark-type string. Unknown mark types are ignored by
    /// the caller rather than erroring.
    pub fn from_type(mark_type: &str) -> Option<Self> {
        match mark_type {
            "bold" => Some(Self::Bold),
            "italic" => Some(Self::Italic),
            "underline" => Some(Self::Underline),
            _ => None,
        }
    }

    /// The wire `type` string for this mark.
    pub fn type_str(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
        }
    }
}

/// One node of a rich-text document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentNode {
    /// Leaf text with its active marks in declared order
    Text {
        /// The literal text content
        text: String,
        /// Active marks, innermost first when rendered
        marks: Vec<Mark>,
    },
    /// Block of inline children followed by a line break
    Paragraph {
        /// Child nodes in order
        content: Vec<DocumentNode>,
    },
    /// Explicit line break, no children
    HardBreak,
    /// Heading at a level of 1 through 6
    Heading {
        /// Heading level, already clamped to 1..=6
        level: u8,
        /// Child nodes in order
        content: Vec<DocumentNode>,
    },
    /// Preformatted block
    CodeBlock {
        /// Child nodes in order
        content: Vec<DocumentNode>,
    },
    /// Unrecognized node type: children pass through, wrapper contributes
    /// nothing
    Generic {
        /// Child nodes in order, empty when the wire node had none
        content: Vec<DocumentNode>,
    },
}

impl DocumentNode {
    /// Builds a node tree from a wire JSON value.
    ///
    /// Never fails: anything that is not a recognized node object becomes
    /// a `Generic` node (recursing into `content` when present). Malformed
    /// leaves degrade to empty rather than erroring; structural validity
    /// of the payload as a whole is the decoder's concern.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::Generic { content: Vec::new() };
        };

        let node_type = obj.get("type").and_then(Value::as_str).unwrap_or("");
        match node_type {
            "text" => {
                let text = obj.get("text").and_then(Value::as_str).unwrap_or("").to_string();
                let marks = obj
                    .get("marks")
                    .and_then(Value::as_array)
                    .map(|marks| {
                        marks
                            .iter()
                            .filter_map(|m| m.get("type").and_then(Value::as_str))
                            .filter_map(Mark::from_type)
                            .collect()
                    })
                    .unwrap_or_default();
                Self::Text { text, marks }
            }
            "paragraph" => Self::Paragraph { content: children_of(obj) },
            "hardBreak" => Self::HardBreak,
            "heading" => {
                let level = obj
                    .get("attrs")
                    .and_then(|attrs| attrs.get("level"))
                    .and_then(Value::as_u64)
                    .filter(|level| (1..=6u64).contains(level))
                    .unwrap_or(1) as u8;
                Self::Heading { level, content: children_of(obj) }
            }
            "codeBlock" => Self::CodeBlock { content: children_of(obj) },
            _ => Self::Generic { content: children_of(obj) },
        }
    }

    /// Serializes the node back into its wire JSON shape.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Text { text, marks } => {
                if marks.is_empty() {
                    json!({ "type": "text", "text": text })
                } else {
                    let marks: Vec<Value> =
                        marks.iter().map(|m| json!({ "type": m.type_str() })).collect();
                    json!({ "type": "text", "text": text, "marks": marks })
                }
            }
            Self::Paragraph { content } => {
                json!({ "type": "paragraph", "content": values_of(content) })
            }
            Self::HardBreak => json!({ "type": "hardBreak" }),
            Self::Heading { level, content } => json!({
                "type": "heading",
                "attrs": { "level": level },
                "content": values_of(content),
            }),
            Self::CodeBlock { content } => {
                json!({ "type": "codeBlock", "content": values_of(content) })
            }
            Self::Generic { content } => {
                json!({ "type": "generic", "content": values_of(content) })
            }
        }
    }

    /// A single paragraph holding one unmarked text node.
    pub fn plain_paragraph(text: &str) -> Self {
        Self::Paragraph {
            content: vec![Self::Text { text: text.to_string(), marks: Vec::new() }],
        }
    }
}

fn children_of(obj: &serde_json::Map<String, Value>) -> Vec<DocumentNode> {
    obj.get("content")
        .and_then(Value::as_array)
        .map(|children| children.iter().map(DocumentNode::from_value).collect())
        .unwrap_or_default()
}

fn values_of(content: &[DocumentNode]) -> Vec<Value> {
    content.iter().map(DocumentNode::to_value).collect()
}

// ============================================================================
// TESTS
// ============================================================================
