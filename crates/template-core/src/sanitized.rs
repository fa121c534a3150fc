//! Sanitized content values and their wrapper-proto marshaling.
//!
//! Trusted content travels on the wire as one of six wrapper messages
//! (`google.common.html.types.SafeHtmlProto` and friends), each carrying a
//! single string payload field. On the template side the same content is a
//! [`SanitizedContent`] tagged with the matching [`ContentKind`].

use prost_reflect::{DynamicMessage, FieldDescriptor, MessageDescriptor, ReflectMessage, Value};
use thiserror::Error;

/// The trust kind of a piece of sanitized content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Safe HTML markup
    Html,

    /// Safe script
    Script,

    /// Safe inline style
    Style,

    /// Safe style sheet
    StyleSheet,

    /// Safe URL
    Url,

    /// Trusted resource URL
    TrustedResourceUrl,
}

impl ContentKind {
    /// Fully-qualified name of the wrapper proto for this kind.
    pub fn wrapper_proto_name(self) -> &'static str {
        match self {
            Self::Html => "google.common.html.types.SafeHtmlProto",
            Self::Script => "google.common.html.types.SafeScriptProto",
            Self::Style => "google.common.html.types.SafeStyleProto",
            Self::StyleSheet => "google.common.html.types.SafeStyleSheetProto",
            Self::Url => "google.common.html.types.SafeUrlProto",
            Self::TrustedResourceUrl => "google.common.html.types.TrustedResourceUrlProto",
        }
    }

    /// Look up the kind backed by the given wrapper proto, if any.
    pub fn from_wrapper_proto_name(name: &str) -> Option<Self> {
        match name {
            "google.common.html.types.SafeHtmlProto" => Some(Self::Html),
            "google.common.html.types.SafeScriptProto" => Some(Self::Script),
            "google.common.html.types.SafeStyleProto" => Some(Self::Style),
            "google.common.html.types.SafeStyleSheetProto" => Some(Self::StyleSheet),
            "google.common.html.types.SafeUrlProto" => Some(Self::Url),
            "google.common.html.types.TrustedResourceUrlProto" => {
                Some(Self::TrustedResourceUrl)
            }
            _ => None,
        }
    }
}

/// Content that has already been sanitized for its trust kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedContent {
    /// The trust kind the content was sanitized for
    pub kind: ContentKind,

    /// The sanitized text
    pub content: String,
}

impl SanitizedContent {
    /// Create sanitized content of the given kind.
    pub fn new(kind: ContentKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Error during wrapper-proto marshaling.
#[derive(Debug, Error)]
pub enum SanitizedError {
    /// The message type is not one of the six wrapper protos.
    #[error("message {message} is not a safe-content wrapper proto")]
    NotAWrapper { message: String },

    /// The wrapper has no string payload field numbered 1.
    #[error("wrapper {message} has no string payload field")]
    MissingPayload { message: String },

    /// The content's kind does not match the wrapper being written.
    #[error("expected {expected:?} content, got {actual:?}")]
    KindMismatch {
        expected: ContentKind,
        actual: ContentKind,
    },
}

fn payload_field(descriptor: &MessageDescriptor) -> Result<FieldDescriptor, SanitizedError> {
    descriptor
        .get_field(1)
        .filter(|field| matches!(field.kind(), prost_reflect::Kind::String))
        .ok_or_else(|| SanitizedError::MissingPayload {
            message: descriptor.full_name().to_string(),
        })
}

/// Unwrap a wrapper proto into sanitized content of the given kind.
pub fn from_wrapper_proto(
    kind: ContentKind,
    message: &DynamicMessage,
) -> Result<SanitizedContent, SanitizedError> {
    let field = payload_field(&message.descriptor())?;
    let payload = message
        .get_field(&field)
        .as_str()
        .unwrap_or_default()
        .to_string();
    Ok(SanitizedContent::new(kind, payload))
}

/// Wrap sanitized content back into the wrapper proto for `descriptor`.
///
/// The content's kind must match the kind backed by the wrapper type;
/// a mismatch is a caller error.
pub fn to_wrapper_proto(
    content: &SanitizedContent,
    descriptor: MessageDescriptor,
) -> Result<DynamicMessage, SanitizedError> {
    let expected = ContentKind::from_wrapper_proto_name(descriptor.full_name()).ok_or_else(
        || SanitizedError::NotAWrapper {
            message: descriptor.full_name().to_string(),
        },
    )?;
    if content.kind != expected {
        return Err(SanitizedError::KindMismatch {
            expected,
            actual: content.kind,
        });
    }

    let field = payload_field(&descriptor)?;
    let mut message = DynamicMessage::new(descriptor);
    message.set_field(&field, Value::String(content.content.clone()));
    Ok(message)
}
