//! # Resource Link Resolution
//!
//! Rewrites `parley://` URIs inside already-escaped markup into inline
//! embeds or action links.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   parley://<service>/<name>/<identifier>                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  USE-GROUP / action-join / groupid-<digits>  →  join-group action       │
//! │  APP, WEBSITE                                →  open-external action    │
//! │  IMAGE, THUMBNAIL                            →  <img>                   │
//! │  AUDIO, VOICE                                →  <audio>                 │
//! │  VIDEO                                       →  <video>                 │
//! │  DOCUMENT, BLOG, BLOG_POST                   →  generic embed anchor    │
//! │  anything else                               →  open-external action    │
//! │                                                                         │
//! │  Embeds point at the derived resource URL                               │
//! │  /<service>/<name>/<identifier>; the identifier may itself contain      │
//! │  slashes and is carried through verbatim.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Action links are plain anchors carrying `data-action` attributes; the
//! concrete UI layer binds behavior to them and feeds activations back
//! through [`crate::session::ChatSession::activate_link`].

/// The custom URI scheme prefix this resolver scans for.
pub const SCHEME_PREFIX: &str = "parley://";

/// Service name that carries group actions rather than content.
const GROUP_SERVICE: &str = "USE-GROUP";
/// Action name for a group-join link.
const JOIN_ACTION: &str = "action-join";
/// Identifier prefix carrying the numeric group id of a join action.
const GROUP_ID_PREFIX: &str = "groupid-";

const IMAGE_SERVICES: &[&str] = &["IMAGE", "THUMBNAIL"];
const AUDIO_SERVICES: &[&str] = &["AUDIO", "VOICE"];
const VIDEO_SERVICES: &[&str] = &["VIDEO"];
const DOCUMENT_SERVICES: &[&str] = &["DOCUMENT", "BLOG", "BLOG_POST"];

/// Services that open externally by name rather than falling through the
/// generic arm.
const OPEN_SERVICES: &[&str] = &["APP", "WEBSITE"];

/// The kind of inline element an embeddable service produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    /// `<img>`
    Image,
    /// `<audio>`
    Audio,
    /// `<video>`
    Video,
    /// Anchor-style embed for document and blog resources
    Generic,
}

/// What a resolved resource URI means to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Activation requests membership of the given group
    JoinGroup {
        /// The numeric group id parsed from the identifier
        group_id: i64,
    },
    /// Activation hands the URI to the host's external opener
    OpenExternal {
        /// The full matched URI
        uri: String,
    },
    /// Inline media embed, no activation
    Embed {
        /// Element kind to emit
        kind: EmbedKind,
        /// Derived resource URL
        url: String,
    },
    /// The URI was structurally malformed; activation reports the error
    Invalid,
}

/// The three path segments of a well-formed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUri {
    /// Service type segment
    pub service: String,
    /// Name segment
    pub name: String,
    /// Identifier: everything after the second segment, slashes intact
    pub identifier: String,
}

/// Splits a full `parley://` URI into its segments. Returns `None` when
/// the scheme is absent or any of the three segments is missing or empty.
pub fn parse_resource_uri(uri: &str) -> Option<ResourceUri> {
    let rest = uri.strip_prefix(SCHEME_PREFIX)?;
    let mut segments = rest.splitn(3, '/');
    let service = segments.next().filter(|s| !s.is_empty())?;
    let name = segments.next().filter(|s| !s.is_empty())?;
    let identifier = segments.next().filter(|s| !s.is_empty())?;
    Some(ResourceUri {
        service: service.to_string(),
        name: name.to_string(),
        identifier: identifier.to_string(),
    })
}

/// The derived gateway URL for a hosted resource.
pub fn resource_url(service: &str, name: &str, identifier: &str) -> String {
    format!("/{service}/{name}/{identifier}")
}

/// The embed kind for a media-capable service, `None` for non-media
/// services.
pub fn media_kind(service: &str) -> Option<EmbedKind> {
    let matches = |set: &[&str]| set.iter().any(|s| s.eq_ignore_ascii_case(service));
    if matches(IMAGE_SERVICES) {
        Some(EmbedKind::Image)
    } else if matches(AUDIO_SERVICES) {
        Some(EmbedKind::Audio)
    } else if matches(VIDEO_SERVICES) {
        Some(EmbedKind::Video)
    } else if matches(DOCUMENT_SERVICES) {
        Some(EmbedKind::Generic)
    } else {
        None
    }
}

/// Classifies a full URI string into its view meaning.
pub fn classify_uri(uri: &str) -> LinkTarget {
    let Some(parsed) = parse_resource_uri(uri) else {
        return LinkTarget::Invalid;
    };

    if parsed.service.eq_ignore_ascii_case(GROUP_SERVICE) && parsed.name == JOIN_ACTION {
        return match parsed
            .identifier
            .strip_prefix(GROUP_ID_PREFIX)
            .and_then(|digits| digits.parse::<i64>().ok())
        {
            Some(group_id) => LinkTarget::JoinGroup { group_id },
            None => LinkTarget::Invalid,
        };
    }

    if OPEN_SERVICES.iter().any(|s| s.eq_ignore_ascii_case(&parsed.service)) {
        return LinkTarget::OpenExternal { uri: uri.to_string() };
    }

    if let Some(kind) = media_kind(&parsed.service) {
        return LinkTarget::Embed {
            kind,
            url: resource_url(&parsed.service, &parsed.name, &parsed.identifier),
        };
    }

    // Unrecognized services degrade to an external open
    LinkTarget::OpenExternal { uri: uri.to_string() }
}

/// Markup for an inline embed. `url` and `label` must already be
/// HTML-escaped by the caller.
pub(crate) fn embed_markup(kind: EmbedKind, url: &str, label: &str) -> String {
    match kind {
        EmbedKind::Image => format!(r#"<img src="{url}">"#),
        EmbedKind::Audio => format!(r#"<audio controls src="{url}"></audio>"#),
        EmbedKind::Video => format!(r#"<video controls src="{url}"></video>"#),
        EmbedKind::Generic => format!(r#"<a data-embed="resource" href="{url}">{label}</a>"#),
    }
}

/// Scans markup for `parley://` URIs and rewrites each into its embed or
/// action-link form.
///
/// The input is markup whose literal text is already HTML-escaped (the
/// renderer escapes before wrapping marks), so a matched URI slice is safe
/// to re-emit verbatim as display text and as an attribute value. A match
/// ends at whitespace or at a tag boundary.
pub fn rewrite_links(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(start) = rest.find(SCHEME_PREFIX) {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let end = tail
            .find(|c: char| c.is_whitespace() || c == '<' || c == '>')
            .unwrap_or(tail.len());
        out.push_str(&rewrite_one(&tail[..end]));
        rest = &tail[end..];
    }

    out.push_str(rest);
    out
}

fn rewrite_one(uri: &str) -> String {
    match classify_uri(uri) {
        LinkTarget::JoinGroup { group_id } => format!(
            r##"<a href="#" data-action="join-group" data-group-id="{group_id}">{uri}</a>"##
        ),
        LinkTarget::OpenExternal { .. } => format!(
            r##"<a href="#" data-action="open-external" data-uri="{uri}">{uri}</a>"##
        ),
        LinkTarget::Embed { kind, url } => embed_markup(kind, &url, uri),
        LinkTarget::Invalid => {
            format!(r##"<a href="#" data-action="invalid-link">{uri}</a>"##)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
