//! Field conversion between proto field values and template values.
//!
//! This crate builds the decode/encode pair for each schema field: given a
//! `prost_reflect::FieldDescriptor`, [`FieldCodec::for_field`] returns an
//! immutable codec that converts that field's wire values into
//! `template_core::TemplateValue`s and back.
//!
//! # Modules
//!
//! - [`field`] - The codec factory and all converter variants
//! - [`error`] - Schema and conversion error types
//! - [`testing`] - In-process descriptor pool builders for tests
//!
//! # Example
//!
//! ```ignore
//! use proto_field_types::FieldCodec;
//!
//! let codec = FieldCodec::for_field(&field_descriptor);
//! let template_value = codec.decode(&wire_value)?;
//! let wire_value = codec.encode(&template_value)?;
//! ```

pub mod error;
pub mod field;
pub mod testing;

// Re-export main types for convenient access
pub use error::{ConvertError, Result, SchemaError};
pub use field::FieldCodec;
