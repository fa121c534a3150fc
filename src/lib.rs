//! proto-template-bridge: bidirectional conversion between proto message
//! fields and a dynamically-typed template value model.
//!
//! The bridge is split into two crates:
//!
//! - [`template_core`] - the template-side value model (`TemplateValue`,
//!   deferred providers, ordered maps, sanitized content)
//! - [`proto_field_types`] - the per-field codec factory
//!   (`FieldCodec::for_field`) and all converter variants
//!
//! This facade re-exports both for callers that want a single dependency.

pub use proto_field_types::{ConvertError, FieldCodec, SchemaError};
pub use template_core::{
    ContentKind, OrderedMap, SanitizedContent, SanitizedError, TemplateDict, TemplateKey,
    TemplateMap, TemplateValue, ValueError, ValueProvider,
};
