//! Core value types for the proto-template bridge.
//!
//! This crate provides the dynamic value model that field converters decode
//! proto field values into, including:
//!
//! - [`TemplateValue`] - The dynamically-typed template value
//! - [`TemplateKey`] - Concrete map keys (bool / int / string)
//! - [`ValueProvider`] - Immediate or deferred value resolution
//! - [`OrderedMap`] - Insertion-ordered mapping with unique keys
//! - [`SanitizedContent`] - Trusted content tagged with a [`ContentKind`]
//!
//! # Architecture
//!
//! template-core sits at the foundation of the bridge:
//!
//! ```text
//! template-core (this crate)
//!    │
//!    └─── proto-field-types   (builds field codecs producing/consuming
//!                              TemplateValue)
//! ```

pub mod ordered;
pub mod sanitized;
pub mod values;

// Re-exports for convenience
pub use ordered::OrderedMap;
pub use sanitized::{ContentKind, SanitizedContent, SanitizedError};
pub use values::{TemplateDict, TemplateKey, TemplateMap, TemplateValue, ValueError, ValueProvider};
