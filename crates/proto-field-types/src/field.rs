//! Field codecs: type-directed conversion between proto field values and
//! template values.
//!
//! [`FieldCodec::for_field`] maps a field descriptor to exactly one codec by
//! a two-level dispatch: cardinality first (map / legacy map / repeated /
//! singular), then the singular kind. Codecs compose recursively — a list
//! codec wraps its element codec, a map codec wraps a key and a value codec —
//! mirroring the schema. Every codec is immutable, stateless and freely
//! shareable; construction happens once per schema field.

use crate::error::{ConvertError, Result, SchemaError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use prost_reflect::{
    DynamicMessage, EnumDescriptor, FieldDescriptor, Kind, MapKey, MessageDescriptor, Syntax,
    Value,
};
use std::sync::Arc;
use template_core::{
    sanitized, ContentKind, TemplateDict, TemplateKey, TemplateMap, TemplateValue, ValueError,
    ValueProvider,
};

/// `jstype` field option value requesting decimal-string exposure.
const JSTYPE_JS_STRING: i32 = 1;

/// The decode/encode pair for one schema field.
#[derive(Debug, Clone)]
pub enum FieldCodec {
    /// bool fields
    Bool,

    /// bytes fields, exposed as standard-base64 strings
    Bytes,

    /// int32 / sint32 / sfixed32 fields
    Int,

    /// uint32 / fixed32 fields, widened through the unsigned interpretation
    UnsignedInt,

    /// 64-bit signed fields exposed as template ints
    LongAsInt,

    /// 64-bit signed fields exposed as decimal strings
    LongAsString,

    /// 64-bit unsigned fields, always exposed as unsigned decimal strings
    UnsignedLongAsString,

    /// float fields, widened to the template float type
    Float,

    /// double fields; decode is inherently lossy since the template float
    /// models the same width, encode is exact
    DoubleAsFloat,

    /// string fields
    String,

    /// enum fields, exposed as their numeric tag
    Enum {
        descriptor: EnumDescriptor,
        /// Whether unknown tags are preserved (proto3) or rejected (proto2).
        open: bool,
    },

    /// message fields, boxed opaquely without eager field conversion
    Message,

    /// safe-content wrapper fields
    Sanitized {
        kind: ContentKind,
        message: MessageDescriptor,
    },

    /// repeated fields (other than maps)
    List { element: Arc<FieldCodec> },

    /// map fields in the map-entry convention
    Map {
        entry: MessageDescriptor,
        key: Arc<FieldCodec>,
        value: Arc<FieldCodec>,
    },

    /// deprecated repeated-message fields keyed by a designated string field
    LegacyMap {
        key_field: FieldDescriptor,
        value: Arc<FieldCodec>,
    },
}

impl FieldCodec {
    /// Build the codec for a schema field.
    ///
    /// Dispatch is total: every kind a validated descriptor pool can produce
    /// has exactly one codec.
    pub fn for_field(field: &FieldDescriptor) -> FieldCodec {
        tracing::trace!(field = field.full_name(), "building field codec");
        if field.is_map() {
            let entry = field
                .kind()
                .as_message()
                .expect("map fields always have an entry message")
                .clone();
            let key = Self::for_field(&entry.map_entry_key_field());
            let value = Self::for_field(&entry.map_entry_value_field());
            FieldCodec::Map {
                entry,
                key: Arc::new(key),
                value: Arc::new(value),
            }
        } else if field.is_list() {
            FieldCodec::List {
                element: Arc::new(Self::for_singular(field)),
            }
        } else {
            Self::for_singular(field)
        }
    }

    /// Build the codec for a deprecated legacy map-key field.
    ///
    /// The field must be a repeated message field and `key_field` must name a
    /// string sub-field of the entry message; anything else is a malformed
    /// schema. The `map_key` annotation itself is a descriptor extension that
    /// standard pools do not carry, which is why the key field is supplied by
    /// the caller.
    pub fn for_legacy_map_field(
        field: &FieldDescriptor,
        key_field: &str,
    ) -> std::result::Result<FieldCodec, SchemaError> {
        tracing::trace!(
            field = field.full_name(),
            key_field,
            "building legacy map codec"
        );
        if field.is_map() || !field.is_list() {
            return Err(SchemaError::LegacyMapNotRepeatedMessage {
                field: field.full_name().to_string(),
            });
        }
        let entry = match field.kind() {
            Kind::Message(entry) => entry,
            _ => {
                return Err(SchemaError::LegacyMapNotRepeatedMessage {
                    field: field.full_name().to_string(),
                })
            }
        };
        let key = entry.get_field_by_name(key_field).ok_or_else(|| {
            SchemaError::LegacyMapKeyNotFound {
                message: entry.full_name().to_string(),
                key: key_field.to_string(),
            }
        })?;
        if !matches!(key.kind(), Kind::String) {
            return Err(SchemaError::LegacyMapKeyNotString {
                message: entry.full_name().to_string(),
                key: key_field.to_string(),
            });
        }
        Ok(FieldCodec::LegacyMap {
            key_field: key,
            value: Arc::new(FieldCodec::Message),
        })
    }

    fn for_singular(field: &FieldDescriptor) -> FieldCodec {
        match field.kind() {
            Kind::Bool => FieldCodec::Bool,
            Kind::Bytes => FieldCodec::Bytes,
            Kind::String => FieldCodec::String,
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => FieldCodec::Int,
            Kind::Uint32 | Kind::Fixed32 => FieldCodec::UnsignedInt,
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => {
                if int64_exposed_as_string(field) {
                    FieldCodec::LongAsString
                } else {
                    FieldCodec::LongAsInt
                }
            }
            // The template int cannot represent the full unsigned 64-bit
            // range, so these are always strings.
            Kind::Uint64 | Kind::Fixed64 => FieldCodec::UnsignedLongAsString,
            Kind::Float => FieldCodec::Float,
            Kind::Double => FieldCodec::DoubleAsFloat,
            Kind::Enum(descriptor) => {
                let open = descriptor.parent_file().syntax() == Syntax::Proto3;
                FieldCodec::Enum { descriptor, open }
            }
            Kind::Message(message) => {
                match ContentKind::from_wrapper_proto_name(message.full_name()) {
                    Some(kind) => FieldCodec::Sanitized { kind, message },
                    None => FieldCodec::Message,
                }
            }
        }
    }

    /// Convert a wire field value into a template value.
    pub fn decode(&self, wire: &Value) -> Result<TemplateValue> {
        match self {
            Self::Bool => match wire {
                Value::Bool(b) => Ok(TemplateValue::Bool(*b)),
                other => Err(mismatch("a bool", other)),
            },
            Self::Bytes => match wire {
                Value::Bytes(bytes) => Ok(TemplateValue::Str(BASE64.encode(bytes))),
                other => Err(mismatch("bytes", other)),
            },
            Self::Int => match wire {
                Value::I32(i) => Ok(TemplateValue::Int(i64::from(*i))),
                other => Err(mismatch("an i32", other)),
            },
            Self::UnsignedInt => match wire {
                // The 32 bits are unsigned; widening is value-preserving,
                // never sign-extending.
                Value::U32(u) => Ok(TemplateValue::Int(i64::from(*u))),
                other => Err(mismatch("a u32", other)),
            },
            Self::LongAsInt => match wire {
                Value::I64(i) => Ok(TemplateValue::Int(*i)),
                other => Err(mismatch("an i64", other)),
            },
            Self::LongAsString => match wire {
                Value::I64(i) => Ok(TemplateValue::Str(i.to_string())),
                other => Err(mismatch("an i64", other)),
            },
            Self::UnsignedLongAsString => match wire {
                Value::U64(u) => Ok(TemplateValue::Str(u.to_string())),
                other => Err(mismatch("a u64", other)),
            },
            Self::Float => match wire {
                Value::F32(f) => Ok(TemplateValue::Float(f64::from(*f))),
                other => Err(mismatch("an f32", other)),
            },
            Self::DoubleAsFloat => match wire {
                Value::F64(f) => Ok(TemplateValue::Float(*f)),
                other => Err(mismatch("an f64", other)),
            },
            Self::String => match wire {
                Value::String(s) => Ok(TemplateValue::Str(s.clone())),
                other => Err(mismatch("a string", other)),
            },
            Self::Enum { .. } => match wire {
                // Reflection may hand back either the enum number or a plain
                // i32, depending on how the message was read.
                Value::EnumNumber(n) | Value::I32(n) => Ok(TemplateValue::Int(i64::from(*n))),
                other => Err(mismatch("an enum number", other)),
            },
            Self::Message => match wire {
                Value::Message(message) => Ok(TemplateValue::Proto(message.clone())),
                other => Err(mismatch("a message", other)),
            },
            Self::Sanitized { kind, .. } => match wire {
                Value::Message(message) => Ok(TemplateValue::Sanitized(
                    sanitized::from_wrapper_proto(*kind, message)?,
                )),
                other => Err(mismatch("a wrapper message", other)),
            },
            Self::List { element } => match wire {
                Value::List(items) => {
                    let providers = items
                        .iter()
                        .map(|item| defer(element, item.clone()))
                        .collect();
                    Ok(TemplateValue::List(providers))
                }
                other => Err(mismatch("a list", other)),
            },
            Self::Map { entry, key, value } => {
                let key_field = entry.map_entry_key_field();
                let value_field = entry.map_entry_value_field();
                let mut map = TemplateMap::new();
                match wire {
                    Value::List(entries) => {
                        for item in entries {
                            let message = match item {
                                Value::Message(message) => message,
                                other => return Err(mismatch("a map entry message", other)),
                            };
                            // Keys must be concrete, so the key conversion is
                            // forced here; values stay deferred.
                            let decoded = key.decode(&message.get_field(&key_field))?;
                            let map_key = force_key(decoded)?;
                            let provider =
                                defer(value, message.get_field(&value_field).into_owned());
                            map.insert(map_key, provider);
                        }
                    }
                    Value::Map(entries) => {
                        for (map_key, map_value) in entries {
                            let decoded = key.decode(&map_key_wire_value(map_key))?;
                            let map_key = force_key(decoded)?;
                            let provider = defer(value, map_value.clone());
                            map.insert(map_key, provider);
                        }
                    }
                    other => return Err(mismatch("map entries", other)),
                }
                Ok(TemplateValue::Map(map))
            }
            Self::LegacyMap { key_field, value } => match wire {
                Value::List(entries) => {
                    let mut dict = TemplateDict::new();
                    for item in entries {
                        let message = match item {
                            Value::Message(message) => message,
                            other => return Err(mismatch("a legacy map entry message", other)),
                        };
                        let key = message
                            .get_field(key_field)
                            .as_str()
                            .unwrap_or_default()
                            .to_string();
                        if key.is_empty() {
                            // Historical convention: no key assigned.
                            continue;
                        }
                        let provider = defer(value, Value::Message(message.clone()));
                        dict.insert(key, provider);
                    }
                    Ok(TemplateValue::Dict(dict))
                }
                other => Err(mismatch("legacy map entries", other)),
            },
        }
    }

    /// Convert a template value back into a wire field value.
    ///
    /// The input is assumed to have been produced by [`decode`] or a
    /// compatible literal; an ill-shaped value fails with
    /// [`ConvertError::TypeMismatch`], never silently.
    ///
    /// [`decode`]: FieldCodec::decode
    pub fn encode(&self, value: &TemplateValue) -> Result<Value> {
        match self {
            Self::Bool => value
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| shape_mismatch("a bool", value)),
            Self::Bytes => {
                let text = value
                    .as_str()
                    .ok_or_else(|| shape_mismatch("a base64 string", value))?;
                let bytes = BASE64.decode(text)?;
                Ok(Value::Bytes(Bytes::from(bytes)))
            }
            Self::Int => {
                let i = value
                    .as_int()
                    .ok_or_else(|| shape_mismatch("an int", value))?;
                // Saturating narrow: clamp, never wrap or reject.
                Ok(Value::I32(
                    i.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
                ))
            }
            Self::UnsignedInt => {
                let i = value
                    .as_int()
                    .ok_or_else(|| shape_mismatch("an int", value))?;
                Ok(Value::U32(i.clamp(0, i64::from(u32::MAX)) as u32))
            }
            Self::LongAsInt => value
                .as_int()
                .map(Value::I64)
                .ok_or_else(|| shape_mismatch("an int", value)),
            Self::LongAsString => {
                let text = value
                    .as_str()
                    .ok_or_else(|| shape_mismatch("a decimal string", value))?;
                let parsed = text
                    .parse::<i64>()
                    .map_err(|source| ConvertError::InvalidInteger {
                        text: text.to_string(),
                        source,
                    })?;
                Ok(Value::I64(parsed))
            }
            Self::UnsignedLongAsString => {
                let text = value
                    .as_str()
                    .ok_or_else(|| shape_mismatch("a decimal string", value))?;
                let parsed = text
                    .parse::<u64>()
                    .map_err(|source| ConvertError::InvalidInteger {
                        text: text.to_string(),
                        source,
                    })?;
                Ok(Value::U64(parsed))
            }
            Self::Float => value
                .as_float()
                .map(|f| Value::F32(f as f32))
                .ok_or_else(|| shape_mismatch("a float", value)),
            Self::DoubleAsFloat => value
                .as_float()
                .map(Value::F64)
                .ok_or_else(|| shape_mismatch("a float", value)),
            Self::String => value
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(|| shape_mismatch("a string", value)),
            Self::Enum { descriptor, open } => {
                let tag = value
                    .as_int()
                    .ok_or_else(|| shape_mismatch("an enum tag", value))?;
                let number =
                    i32::try_from(tag).map_err(|_| ConvertError::EnumValueNotFound {
                        enum_name: descriptor.full_name().to_string(),
                        number: tag,
                    })?;
                if *open || descriptor.get_value(number).is_some() {
                    Ok(Value::EnumNumber(number))
                } else {
                    Err(ConvertError::EnumValueNotFound {
                        enum_name: descriptor.full_name().to_string(),
                        number: tag,
                    })
                }
            }
            Self::Message => value
                .as_proto()
                .map(|message| Value::Message(message.clone()))
                .ok_or_else(|| shape_mismatch("a proto message", value)),
            Self::Sanitized { message, .. } => {
                let content = value
                    .as_sanitized()
                    .ok_or_else(|| shape_mismatch("sanitized content", value))?;
                let wrapper = sanitized::to_wrapper_proto(content, message.clone())?;
                Ok(Value::Message(wrapper))
            }
            Self::List { element } => {
                let items = value
                    .as_list()
                    .ok_or_else(|| shape_mismatch("a list", value))?;
                let mut out = Vec::with_capacity(items.len());
                for provider in items {
                    let resolved = provider.resolve()?;
                    out.push(element.encode(&resolved)?);
                }
                Ok(Value::List(out))
            }
            Self::Map {
                entry,
                key,
                value: value_codec,
            } => {
                let map = value
                    .as_map()
                    .ok_or_else(|| shape_mismatch("a map", value))?;
                let key_field = entry.map_entry_key_field();
                let value_field = entry.map_entry_value_field();
                let mut entries = Vec::with_capacity(map.len());
                for (map_key, provider) in map.iter() {
                    let resolved = provider.resolve()?;
                    let mut message = DynamicMessage::new(entry.clone());
                    message.set_field(&key_field, key.encode(&map_key.to_value())?);
                    message.set_field(&value_field, value_codec.encode(&resolved)?);
                    entries.push(Value::Message(message));
                }
                Ok(Value::List(entries))
            }
            Self::LegacyMap { .. } => Err(ConvertError::LegacyMapWrite),
        }
    }
}

/// Whether an int64-family field carries `[jstype = JS_STRING]`.
fn int64_exposed_as_string(field: &FieldDescriptor) -> bool {
    field
        .options()
        .get_field_by_name("jstype")
        .and_then(|value| value.as_enum_number())
        == Some(JSTYPE_JS_STRING)
}

/// Wrap a wire value in a provider that converts it when forced.
fn defer(codec: &Arc<FieldCodec>, wire: Value) -> ValueProvider {
    let codec = Arc::clone(codec);
    ValueProvider::deferred(move || codec.decode(&wire).map_err(ValueError::new))
}

fn force_key(decoded: TemplateValue) -> Result<TemplateKey> {
    let shape = decoded.type_name();
    TemplateKey::from_value(decoded).ok_or(ConvertError::TypeMismatch {
        expected: "a scalar map key",
        actual: shape,
    })
}

fn map_key_wire_value(key: &MapKey) -> Value {
    match key {
        MapKey::Bool(b) => Value::Bool(*b),
        MapKey::I32(i) => Value::I32(*i),
        MapKey::I64(i) => Value::I64(*i),
        MapKey::U32(u) => Value::U32(*u),
        MapKey::U64(u) => Value::U64(*u),
        MapKey::String(s) => Value::String(s.clone()),
    }
}

fn mismatch(expected: &'static str, actual: &Value) -> ConvertError {
    ConvertError::TypeMismatch {
        expected,
        actual: wire_type_name(actual),
    }
}

fn shape_mismatch(expected: &'static str, actual: &TemplateValue) -> ConvertError {
    ConvertError::TypeMismatch {
        expected,
        actual: actual.type_name(),
    }
}

fn wire_type_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "bool",
        Value::I32(_) => "i32",
        Value::I64(_) => "i64",
        Value::U32(_) => "u32",
        Value::U64(_) => "u64",
        Value::F32(_) => "f32",
        Value::F64(_) => "f64",
        Value::String(_) => "string",
        Value::Bytes(_) => "bytes",
        Value::EnumNumber(_) => "enum number",
        Value::Message(_) => "message",
        Value::List(_) => "list",
        Value::Map(_) => "map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use template_core::SanitizedContent;

    fn codec(field_name: &str) -> FieldCodec {
        FieldCodec::for_field(&testing::everything_field(field_name))
    }

    #[test]
    fn test_bool_round_trip() {
        let codec = codec("flag");
        let decoded = codec.decode(&Value::Bool(true)).unwrap();
        assert_eq!(decoded, TemplateValue::Bool(true));
        assert_eq!(codec.encode(&decoded).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_bytes_base64() {
        let codec = codec("data");
        let decoded = codec
            .decode(&Value::Bytes(Bytes::from_static(&[0xDE, 0xAD, 0xBE, 0xEF])))
            .unwrap();
        assert_eq!(decoded, TemplateValue::str("3q2+7w=="));

        let encoded = codec.encode(&decoded).unwrap();
        assert_eq!(
            encoded,
            Value::Bytes(Bytes::from_static(&[0xDE, 0xAD, 0xBE, 0xEF]))
        );
    }

    #[test]
    fn test_bytes_invalid_base64_fails() {
        let codec = codec("data");
        let err = codec
            .encode(&TemplateValue::str("not base64!!"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidBase64(_)));
    }

    #[test]
    fn test_int32_widens_and_round_trips() {
        let codec = codec("count");
        for v in [i32::MIN, -1, 0, 1, i32::MAX] {
            let decoded = codec.decode(&Value::I32(v)).unwrap();
            assert_eq!(decoded, TemplateValue::Int(i64::from(v)));
            assert_eq!(codec.encode(&decoded).unwrap(), Value::I32(v));
        }
    }

    #[test]
    fn test_int32_encode_saturates() {
        let codec = codec("count");
        assert_eq!(
            codec.encode(&TemplateValue::Int(i64::MAX)).unwrap(),
            Value::I32(i32::MAX)
        );
        assert_eq!(
            codec.encode(&TemplateValue::Int(i64::MIN)).unwrap(),
            Value::I32(i32::MIN)
        );
        assert_eq!(
            codec
                .encode(&TemplateValue::Int(i64::from(i32::MAX) + 1))
                .unwrap(),
            Value::I32(i32::MAX)
        );
    }

    #[test]
    fn test_uint32_unsigned_widening() {
        let codec = codec("size");
        let decoded = codec.decode(&Value::U32(u32::MAX)).unwrap();
        // Value-preserving, not sign-extending
        assert_eq!(decoded, TemplateValue::Int(4_294_967_295));
    }

    #[test]
    fn test_uint32_encode_saturates() {
        let codec = codec("size");
        assert_eq!(
            codec.encode(&TemplateValue::Int(-5)).unwrap(),
            Value::U32(0)
        );
        assert_eq!(
            codec.encode(&TemplateValue::Int(i64::MAX)).unwrap(),
            Value::U32(u32::MAX)
        );
    }

    #[test]
    fn test_int64_as_number() {
        let codec = codec("id_num");
        assert!(matches!(codec, FieldCodec::LongAsInt));
        let decoded = codec.decode(&Value::I64(i64::MIN)).unwrap();
        assert_eq!(decoded, TemplateValue::Int(i64::MIN));
        assert_eq!(codec.encode(&decoded).unwrap(), Value::I64(i64::MIN));
    }

    #[test]
    fn test_int64_jstype_string() {
        let codec = codec("id_str");
        assert!(matches!(codec, FieldCodec::LongAsString));
        let decoded = codec.decode(&Value::I64(-42)).unwrap();
        assert_eq!(decoded, TemplateValue::str("-42"));
        assert_eq!(codec.encode(&decoded).unwrap(), Value::I64(-42));
    }

    #[test]
    fn test_int64_as_string_rejects_bad_text() {
        let codec = codec("id_str");
        let err = codec.encode(&TemplateValue::str("twelve")).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInteger { .. }));
    }

    #[test]
    fn test_width_aliases_route_like_base_kinds() {
        assert!(matches!(codec("delta"), FieldCodec::Int));
        assert!(matches!(codec("offset"), FieldCodec::Int));
        assert!(matches!(codec("mask"), FieldCodec::UnsignedInt));
        assert!(matches!(codec("delta64"), FieldCodec::LongAsInt));
        assert!(matches!(codec("offset64"), FieldCodec::LongAsInt));
        assert!(matches!(codec("mask64"), FieldCodec::UnsignedLongAsString));
        // jstype applies to the 64-bit aliases just like to plain int64
        assert!(matches!(codec("delta64_str"), FieldCodec::LongAsString));
    }

    #[test]
    fn test_uint64_unsigned_decimal_string() {
        let codec = codec("big");
        // Bit pattern of 2^64 - 1; must not print as "-1".
        let decoded = codec.decode(&Value::U64(u64::MAX)).unwrap();
        assert_eq!(decoded, TemplateValue::str("18446744073709551615"));
        assert_eq!(codec.encode(&decoded).unwrap(), Value::U64(u64::MAX));
    }

    #[test]
    fn test_uint64_string_rejects_out_of_range() {
        let codec = codec("big");
        let err = codec
            .encode(&TemplateValue::str("18446744073709551616"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInteger { .. }));
    }

    #[test]
    fn test_float_widens() {
        let codec = codec("ratio");
        let decoded = codec.decode(&Value::F32(1.5)).unwrap();
        assert_eq!(decoded, TemplateValue::Float(1.5));
        assert_eq!(codec.encode(&decoded).unwrap(), Value::F32(1.5));
    }

    #[test]
    fn test_double_as_float() {
        let codec = codec("precise");
        let decoded = codec.decode(&Value::F64(2.25)).unwrap();
        assert_eq!(decoded, TemplateValue::Float(2.25));
        assert_eq!(codec.encode(&decoded).unwrap(), Value::F64(2.25));
    }

    #[test]
    fn test_string_field() {
        let codec = codec("label");
        let decoded = codec.decode(&Value::String("hi".to_string())).unwrap();
        assert_eq!(decoded, TemplateValue::str("hi"));
        assert_eq!(
            codec.encode(&decoded).unwrap(),
            Value::String("hi".to_string())
        );
    }

    #[test]
    fn test_open_enum_preserves_unknown_tags() {
        let codec = codec("palette");
        assert!(matches!(codec, FieldCodec::Enum { open: true, .. }));

        let decoded = codec.decode(&Value::EnumNumber(2)).unwrap();
        assert_eq!(decoded, TemplateValue::Int(2));

        // Unknown tag synthesizes an enum number instead of failing
        assert_eq!(
            codec.encode(&TemplateValue::Int(99)).unwrap(),
            Value::EnumNumber(99)
        );
    }

    #[test]
    fn test_enum_decode_accepts_plain_i32() {
        // Some producers hand enum fields over as raw i32 wire values.
        let codec = codec("palette");
        let decoded = codec.decode(&Value::I32(2)).unwrap();
        assert_eq!(decoded, TemplateValue::Int(2));
    }

    #[test]
    fn test_closed_enum_rejects_unknown_tags() {
        let codec = FieldCodec::for_field(&testing::legacy_mood_field());
        assert!(matches!(codec, FieldCodec::Enum { open: false, .. }));

        assert_eq!(
            codec.encode(&TemplateValue::Int(1)).unwrap(),
            Value::EnumNumber(1)
        );
        let err = codec.encode(&TemplateValue::Int(77)).unwrap_err();
        assert!(matches!(err, ConvertError::EnumValueNotFound { .. }));
    }

    #[test]
    fn test_message_boxes_opaquely() {
        let codec = codec("child");
        let mut child = DynamicMessage::new(testing::message("bridge.test.Child"));
        child.set_field_by_name("name", Value::String("kid".to_string()));

        let decoded = codec.decode(&Value::Message(child.clone())).unwrap();
        assert_eq!(decoded, TemplateValue::Proto(child.clone()));
        assert_eq!(codec.encode(&decoded).unwrap(), Value::Message(child));
    }

    #[test]
    fn test_message_encode_rejects_non_proto() {
        let codec = codec("child");
        let err = codec.encode(&TemplateValue::Int(1)).unwrap_err();
        assert!(matches!(err, ConvertError::TypeMismatch { .. }));
    }

    #[test]
    fn test_list_preserves_order_and_defers() {
        let codec = codec("numbers");
        let wire = Value::List(vec![Value::I32(3), Value::I32(1), Value::I32(2)]);
        let decoded = codec.decode(&wire).unwrap();

        let items = decoded.as_list().unwrap();
        assert!(items
            .iter()
            .all(|p| matches!(p, ValueProvider::Deferred(_))));
        let resolved: Vec<_> = items.iter().map(|p| p.resolve().unwrap()).collect();
        assert_eq!(
            resolved,
            vec![
                TemplateValue::Int(3),
                TemplateValue::Int(1),
                TemplateValue::Int(2)
            ]
        );

        assert_eq!(codec.encode(&decoded).unwrap(), wire);
    }

    #[test]
    fn test_list_encode_rejects_non_list() {
        let codec = codec("numbers");
        let err = codec.encode(&TemplateValue::Int(3)).unwrap_err();
        assert!(matches!(err, ConvertError::TypeMismatch { .. }));
    }

    #[test]
    fn test_map_duplicate_keys_last_wins() {
        let codec = codec("counts");
        let wire = Value::List(vec![
            testing::counts_entry("k", 1),
            testing::counts_entry("k", 2),
        ]);
        let decoded = codec.decode(&wire).unwrap();

        let map = decoded.as_map().unwrap();
        assert_eq!(map.len(), 1);
        let value = map
            .get(&TemplateKey::Str("k".to_string()))
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(value, TemplateValue::Int(2));
    }

    #[test]
    fn test_map_round_trip() {
        let codec = codec("counts");
        let wire = Value::List(vec![
            testing::counts_entry("x", 1),
            testing::counts_entry("y", 2),
        ]);
        let decoded = codec.decode(&wire).unwrap();
        let encoded = codec.encode(&decoded).unwrap();
        let again = codec.decode(&encoded).unwrap();
        assert_eq!(decoded, again);
    }

    #[test]
    fn test_map_decode_accepts_reflect_map() {
        let codec = codec("counts");
        let mut entries = std::collections::HashMap::new();
        entries.insert(MapKey::String("a".to_string()), Value::I32(7));
        let decoded = codec.decode(&Value::Map(entries)).unwrap();

        let map = decoded.as_map().unwrap();
        assert_eq!(
            map.get(&TemplateKey::Str("a".to_string()))
                .unwrap()
                .resolve()
                .unwrap(),
            TemplateValue::Int(7)
        );
    }

    #[test]
    fn test_map_int64_keys_are_forced() {
        let codec = codec("names");
        let wire = Value::List(vec![testing::names_entry(12, "twelve")]);
        let decoded = codec.decode(&wire).unwrap();

        let map = decoded.as_map().unwrap();
        assert!(map.contains_key(&TemplateKey::Int(12)));
    }

    #[test]
    fn test_legacy_map_drops_empty_keys() {
        let codec =
            FieldCodec::for_legacy_map_field(&testing::everything_field("pairs"), "key").unwrap();
        let wire = Value::List(vec![
            testing::pair_entry("", "dropped"),
            testing::pair_entry("a", "1"),
            testing::pair_entry("b", "2"),
        ]);
        let decoded = codec.decode(&wire).unwrap();

        let dict = decoded.as_dict().unwrap();
        assert_eq!(dict.len(), 2);
        let keys: Vec<_> = dict.keys().cloned().collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

        // Values are the entry messages themselves, boxed opaquely
        let value = dict.get(&"a".to_string()).unwrap().resolve().unwrap();
        assert!(value.as_proto().is_some());
    }

    #[test]
    fn test_legacy_map_encode_unsupported() {
        let codec =
            FieldCodec::for_legacy_map_field(&testing::everything_field("pairs"), "key").unwrap();
        let err = codec
            .encode(&TemplateValue::Dict(TemplateDict::new()))
            .unwrap_err();
        assert!(matches!(err, ConvertError::LegacyMapWrite));
    }

    #[test]
    fn test_legacy_map_schema_errors() {
        let err = FieldCodec::for_legacy_map_field(&testing::everything_field("pairs"), "nope")
            .unwrap_err();
        assert!(matches!(err, SchemaError::LegacyMapKeyNotFound { .. }));

        let err = FieldCodec::for_legacy_map_field(&testing::everything_field("numbers"), "key")
            .unwrap_err();
        assert!(matches!(err, SchemaError::LegacyMapNotRepeatedMessage { .. }));

        let err = FieldCodec::for_legacy_map_field(&testing::everything_field("pairs"), "rank")
            .unwrap_err();
        assert!(matches!(err, SchemaError::LegacyMapKeyNotString { .. }));
    }

    #[test]
    fn test_sanitized_html_round_trip() {
        let codec = codec("html");
        assert!(matches!(
            codec,
            FieldCodec::Sanitized {
                kind: ContentKind::Html,
                ..
            }
        ));

        let wrapper = testing::wrapper_message(ContentKind::Html, "<b>hi</b>");
        let decoded = codec.decode(&Value::Message(wrapper.clone())).unwrap();
        assert_eq!(
            decoded,
            TemplateValue::Sanitized(SanitizedContent::new(ContentKind::Html, "<b>hi</b>"))
        );
        assert_eq!(codec.encode(&decoded).unwrap(), Value::Message(wrapper));
    }

    #[test]
    fn test_sanitized_kind_mismatch_is_caller_error() {
        let codec = codec("script");
        let err = codec
            .encode(&TemplateValue::Sanitized(SanitizedContent::new(
                ContentKind::Html,
                "<b>hi</b>",
            )))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Sanitized(_)));
    }

    #[test]
    fn test_all_wrapper_kinds_dispatch() {
        for (field_name, kind) in [
            ("html", ContentKind::Html),
            ("script", ContentKind::Script),
            ("style", ContentKind::Style),
            ("stylesheet", ContentKind::StyleSheet),
            ("url", ContentKind::Url),
            ("resource_url", ContentKind::TrustedResourceUrl),
        ] {
            let codec = codec(field_name);
            match codec {
                FieldCodec::Sanitized { kind: k, .. } => assert_eq!(k, kind),
                other => panic!("expected sanitized codec for {field_name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_repeated_message_builds_list_of_message() {
        let codec = codec("children");
        match &codec {
            FieldCodec::List { element } => assert!(matches!(**element, FieldCodec::Message)),
            other => panic!("expected list codec, got {other:?}"),
        }
    }
}
