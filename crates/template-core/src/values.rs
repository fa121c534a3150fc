//! Dynamic value representations for the proto-template bridge.
//!
//! This module defines the template-side value model that proto field values
//! are converted into, and the provider wrapper used for deferred resolution
//! of list elements and map values.

use crate::ordered::OrderedMap;
use crate::sanitized::SanitizedContent;
use prost_reflect::DynamicMessage;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A template map: concrete keys, insertion-ordered, values possibly deferred.
pub type TemplateMap = OrderedMap<TemplateKey, ValueProvider>;

/// A legacy dict: string keys only, insertion-ordered.
pub type TemplateDict = OrderedMap<String, ValueProvider>;

/// Error raised when resolving a deferred value fails.
///
/// The underlying error is boxed so that this crate stays independent of the
/// converter crates that produce the thunks.
#[derive(Debug, Error)]
#[error("failed to resolve deferred value: {source}")]
pub struct ValueError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl ValueError {
    /// Wrap an arbitrary error as a resolution failure.
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }
}

/// The dynamically-typed value produced and consumed by the template engine.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    /// Absent value
    Null,

    /// Boolean value
    Bool(bool),

    /// Integer value (at least 64-bit signed)
    Int(i64),

    /// Floating point value
    Float(f64),

    /// String value
    Str(String),

    /// Ordered list of (possibly deferred) values
    List(Vec<ValueProvider>),

    /// Map with concrete keys
    Map(TemplateMap),

    /// Legacy string-keyed record
    Dict(TemplateDict),

    /// Sanitized content tagged with a trust kind
    Sanitized(SanitizedContent),

    /// Opaque proto message wrapper; nested fields are not eagerly converted
    Proto(DynamicMessage),
}

impl TemplateValue {
    /// Create a string value.
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// Create a list of already-resolved values.
    pub fn list(values: impl IntoIterator<Item = TemplateValue>) -> Self {
        Self::List(values.into_iter().map(ValueProvider::Ready).collect())
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a list.
    pub fn as_list(&self) -> Option<&[ValueProvider]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get this value as a map.
    pub fn as_map(&self) -> Option<&TemplateMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Try to get this value as a legacy dict.
    pub fn as_dict(&self) -> Option<&TemplateDict> {
        match self {
            Self::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Try to get this value as sanitized content.
    pub fn as_sanitized(&self) -> Option<&SanitizedContent> {
        match self {
            Self::Sanitized(content) => Some(content),
            _ => None,
        }
    }

    /// Try to get this value as a wrapped proto message.
    pub fn as_proto(&self) -> Option<&DynamicMessage> {
        match self {
            Self::Proto(message) => Some(message),
            _ => None,
        }
    }

    /// Short name for the value's runtime shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Dict(_) => "dict",
            Self::Sanitized(_) => "sanitized content",
            Self::Proto(_) => "proto message",
        }
    }
}

/// A concrete map key.
///
/// Map keys must be resolved and hashable, so only the scalar shapes that
/// proto map keys can take are representable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    /// Boolean key
    Bool(bool),

    /// Integer key
    Int(i64),

    /// String key
    Str(String),
}

impl TemplateKey {
    /// Convert a resolved value into a key, if it has a key-able shape.
    pub fn from_value(value: TemplateValue) -> Option<Self> {
        match value {
            TemplateValue::Bool(b) => Some(Self::Bool(b)),
            TemplateValue::Int(i) => Some(Self::Int(i)),
            TemplateValue::Str(s) => Some(Self::Str(s)),
            _ => None,
        }
    }

    /// View this key as a plain value.
    pub fn to_value(&self) -> TemplateValue {
        match self {
            Self::Bool(b) => TemplateValue::Bool(*b),
            Self::Int(i) => TemplateValue::Int(*i),
            Self::Str(s) => TemplateValue::Str(s.clone()),
        }
    }
}

/// A value that may not have been computed yet.
///
/// Deferred providers hold a pure thunk; forcing one is synchronous,
/// idempotent and side-effect-free.
#[derive(Clone)]
pub enum ValueProvider {
    /// An already-resolved value.
    Ready(TemplateValue),

    /// A value computed on demand.
    Deferred(Arc<dyn Fn() -> Result<TemplateValue, ValueError> + Send + Sync>),
}

impl ValueProvider {
    /// Wrap an already-resolved value.
    pub fn ready(value: TemplateValue) -> Self {
        Self::Ready(value)
    }

    /// Wrap a thunk to be forced on first use.
    pub fn deferred<F>(thunk: F) -> Self
    where
        F: Fn() -> Result<TemplateValue, ValueError> + Send + Sync + 'static,
    {
        Self::Deferred(Arc::new(thunk))
    }

    /// Force the provider, yielding the underlying value.
    pub fn resolve(&self) -> Result<TemplateValue, ValueError> {
        match self {
            Self::Ready(value) => Ok(value.clone()),
            Self::Deferred(thunk) => thunk(),
        }
    }
}

impl From<TemplateValue> for ValueProvider {
    fn from(value: TemplateValue) -> Self {
        Self::Ready(value)
    }
}

impl fmt::Debug for ValueProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Providers compare by resolved value; a provider whose resolution fails
/// compares unequal to everything.
impl PartialEq for ValueProvider {
    fn eq(&self, other: &Self) -> bool {
        match (self.resolve(), other.resolve()) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }
}
