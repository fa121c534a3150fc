//! Error types for the proto-field-types crate.

use template_core::{SanitizedError, ValueError};
use thiserror::Error;

/// Errors detected while building a codec from a field descriptor.
///
/// These indicate a malformed or misconfigured schema and are not
/// recoverable by retrying with the same descriptor.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A legacy map codec was requested for a field that is not a repeated
    /// message field.
    #[error("legacy map field {field} must be a repeated message field")]
    LegacyMapNotRepeatedMessage { field: String },

    /// The designated legacy map key field does not exist.
    #[error("legacy map key field {key} not found in {message}")]
    LegacyMapKeyNotFound { message: String, key: String },

    /// The designated legacy map key field is not a string field.
    #[error("legacy map key field {key} in {message} must be a string")]
    LegacyMapKeyNotString { message: String, key: String },
}

/// Errors raised while converting a value in either direction.
///
/// All conversion errors propagate synchronously to the caller; there is no
/// retrying, logging or defaulting at this layer.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A bytes field was given text that is not valid standard base64.
    #[error("invalid base64 in bytes field: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// A 64-bit-as-string field was given non-numeric or out-of-range text.
    #[error("invalid integer literal {text:?}: {source}")]
    InvalidInteger {
        text: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// A value did not have the runtime shape the codec expects. Always a
    /// caller error, never a data-integrity concern.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// No named enum value carries the given number. For closed-syntax
    /// (proto2) enums this is the absence signal the caller must fail fast
    /// on; open-syntax enums never produce it for in-range tags.
    #[error("enum {enum_name} has no value numbered {number}")]
    EnumValueNotFound { enum_name: String, number: i64 },

    /// Sanitized-content marshaling failed (e.g. content kind mismatch).
    #[error(transparent)]
    Sanitized(#[from] SanitizedError),

    /// Forcing a deferred value failed.
    #[error(transparent)]
    Resolve(#[from] ValueError),

    /// Writing legacy map-key fields was never implemented and is
    /// permanently unsupported.
    #[error("writing legacy map-key fields is not supported")]
    LegacyMapWrite,
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
