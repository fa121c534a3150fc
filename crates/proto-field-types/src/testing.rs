//! Test support: an in-process descriptor pool covering every field shape
//! the codecs dispatch on.
//!
//! The pool is built from a hand-assembled `FileDescriptorSet` so tests do
//! not need protoc or checked-in descriptor binaries. It contains a proto3
//! test message exercising all scalar kinds, `jstype` options, maps, a
//! legacy map-key message and the six safe-content wrapper protos, plus a
//! proto2 file for closed-enum semantics.

use prost_reflect::{DescriptorPool, DynamicMessage, FieldDescriptor, MessageDescriptor, Value};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FieldOptions, FileDescriptorProto, FileDescriptorSet, MessageOptions,
};
use std::sync::OnceLock;
use template_core::ContentKind;

static POOL: OnceLock<DescriptorPool> = OnceLock::new();

/// The shared test descriptor pool.
pub fn descriptor_pool() -> &'static DescriptorPool {
    POOL.get_or_init(|| {
        DescriptorPool::from_file_descriptor_set(file_set()).expect("test descriptors are valid")
    })
}

/// Look up a message descriptor by full name.
pub fn message(full_name: &str) -> MessageDescriptor {
    descriptor_pool()
        .get_message_by_name(full_name)
        .unwrap_or_else(|| panic!("test pool has no message {full_name}"))
}

/// Look up a field of `bridge.test.Everything` by name.
pub fn everything_field(name: &str) -> FieldDescriptor {
    message("bridge.test.Everything")
        .get_field_by_name(name)
        .unwrap_or_else(|| panic!("Everything has no field {name}"))
}

/// The proto2 enum field `bridge.legacy.LegacyHolder.mood`.
pub fn legacy_mood_field() -> FieldDescriptor {
    message("bridge.legacy.LegacyHolder")
        .get_field_by_name("mood")
        .expect("LegacyHolder has a mood field")
}

/// Build a `counts` map entry message as a wire value.
pub fn counts_entry(key: &str, value: i32) -> Value {
    let mut entry = DynamicMessage::new(message("bridge.test.Everything.CountsEntry"));
    entry.set_field_by_name("key", Value::String(key.to_string()));
    entry.set_field_by_name("value", Value::I32(value));
    Value::Message(entry)
}

/// Build a `names` map entry message (int64 keys) as a wire value.
pub fn names_entry(key: i64, value: &str) -> Value {
    let mut entry = DynamicMessage::new(message("bridge.test.Everything.NamesEntry"));
    entry.set_field_by_name("key", Value::I64(key));
    entry.set_field_by_name("value", Value::String(value.to_string()));
    Value::Message(entry)
}

/// Build a legacy map row (`bridge.test.Pair`) as a wire value.
pub fn pair_entry(key: &str, value: &str) -> Value {
    let mut pair = DynamicMessage::new(message("bridge.test.Pair"));
    pair.set_field_by_name("key", Value::String(key.to_string()));
    pair.set_field_by_name("value", Value::String(value.to_string()));
    Value::Message(pair)
}

/// Build a safe-content wrapper message carrying `content`.
pub fn wrapper_message(kind: ContentKind, content: &str) -> DynamicMessage {
    let descriptor = message(kind.wrapper_proto_name());
    let payload = descriptor.get_field(1).expect("wrapper payload field");
    let mut wrapper = DynamicMessage::new(descriptor);
    wrapper.set_field(&payload, Value::String(content.to_string()));
    wrapper
}

fn file_set() -> FileDescriptorSet {
    FileDescriptorSet {
        file: vec![safe_types_file(), test_file(), legacy_file()],
    }
}

fn scalar(name: &str, number: i32, kind: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(kind as i32),
        ..Default::default()
    }
}

fn repeated(mut field: FieldDescriptorProto) -> FieldDescriptorProto {
    field.label = Some(Label::Repeated as i32);
    field
}

fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..scalar(name, number, Type::Message)
    }
}

fn enum_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..scalar(name, number, Type::Enum)
    }
}

fn map_entry(name: &str, key_type: Type, value_type: Type) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: vec![scalar("key", 1, key_type), scalar("value", 2, value_type)],
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn wrapper_proto(name: &str, payload_field: &str) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: vec![scalar(payload_field, 1, Type::String)],
        ..Default::default()
    }
}

fn safe_types_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("google/common/html/types/safe_types.proto".to_string()),
        package: Some("google.common.html.types".to_string()),
        syntax: Some("proto3".to_string()),
        message_type: vec![
            wrapper_proto(
                "SafeHtmlProto",
                "private_do_not_access_or_else_safe_html_wrapped_value",
            ),
            wrapper_proto(
                "SafeScriptProto",
                "private_do_not_access_or_else_safe_script_wrapped_value",
            ),
            wrapper_proto(
                "SafeStyleProto",
                "private_do_not_access_or_else_safe_style_wrapped_value",
            ),
            wrapper_proto(
                "SafeStyleSheetProto",
                "private_do_not_access_or_else_safe_style_sheet_wrapped_value",
            ),
            wrapper_proto(
                "SafeUrlProto",
                "private_do_not_access_or_else_safe_url_wrapped_value",
            ),
            wrapper_proto(
                "TrustedResourceUrlProto",
                "private_do_not_access_or_else_trusted_resource_url_wrapped_value",
            ),
        ],
        ..Default::default()
    }
}

fn jstype_string(mut field: FieldDescriptorProto) -> FieldDescriptorProto {
    field.options = Some(FieldOptions {
        jstype: Some(prost_types::field_options::JsType::JsString as i32),
        ..Default::default()
    });
    field
}

fn test_file() -> FileDescriptorProto {
    let everything = DescriptorProto {
        name: Some("Everything".to_string()),
        field: vec![
            scalar("flag", 1, Type::Bool),
            scalar("data", 2, Type::Bytes),
            scalar("label", 3, Type::String),
            scalar("count", 4, Type::Int32),
            scalar("size", 5, Type::Uint32),
            scalar("id_num", 6, Type::Int64),
            jstype_string(scalar("id_str", 7, Type::Int64)),
            scalar("big", 8, Type::Uint64),
            scalar("ratio", 9, Type::Float),
            scalar("precise", 10, Type::Double),
            enum_field("palette", 11, ".bridge.test.Palette"),
            message_field("child", 12, ".bridge.test.Child"),
            repeated(scalar("numbers", 13, Type::Int32)),
            repeated(message_field(
                "counts",
                14,
                ".bridge.test.Everything.CountsEntry",
            )),
            repeated(message_field("pairs", 15, ".bridge.test.Pair")),
            message_field("html", 16, ".google.common.html.types.SafeHtmlProto"),
            message_field("script", 17, ".google.common.html.types.SafeScriptProto"),
            message_field("style", 18, ".google.common.html.types.SafeStyleProto"),
            message_field(
                "stylesheet",
                19,
                ".google.common.html.types.SafeStyleSheetProto",
            ),
            message_field("url", 20, ".google.common.html.types.SafeUrlProto"),
            message_field(
                "resource_url",
                21,
                ".google.common.html.types.TrustedResourceUrlProto",
            ),
            repeated(message_field(
                "names",
                22,
                ".bridge.test.Everything.NamesEntry",
            )),
            repeated(message_field("children", 23, ".bridge.test.Child")),
            scalar("delta", 24, Type::Sint32),
            scalar("offset", 25, Type::Sfixed32),
            scalar("mask", 26, Type::Fixed32),
            scalar("delta64", 27, Type::Sint64),
            scalar("offset64", 28, Type::Sfixed64),
            scalar("mask64", 29, Type::Fixed64),
            jstype_string(scalar("delta64_str", 30, Type::Sint64)),
        ],
        nested_type: vec![
            map_entry("CountsEntry", Type::String, Type::Int32),
            map_entry("NamesEntry", Type::Int64, Type::String),
        ],
        ..Default::default()
    };

    let child = DescriptorProto {
        name: Some("Child".to_string()),
        field: vec![scalar("name", 1, Type::String)],
        ..Default::default()
    };

    let pair = DescriptorProto {
        name: Some("Pair".to_string()),
        field: vec![
            scalar("key", 1, Type::String),
            scalar("value", 2, Type::String),
            scalar("rank", 3, Type::Int32),
        ],
        ..Default::default()
    };

    let palette = EnumDescriptorProto {
        name: Some("Palette".to_string()),
        value: vec![
            enum_value("PALETTE_UNSPECIFIED", 0),
            enum_value("RED", 1),
            enum_value("GREEN", 2),
        ],
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some("bridge_test.proto".to_string()),
        package: Some("bridge.test".to_string()),
        syntax: Some("proto3".to_string()),
        dependency: vec!["google/common/html/types/safe_types.proto".to_string()],
        message_type: vec![everything, child, pair],
        enum_type: vec![palette],
        ..Default::default()
    }
}

fn legacy_file() -> FileDescriptorProto {
    let mood = EnumDescriptorProto {
        name: Some("Mood".to_string()),
        value: vec![enum_value("HAPPY", 1), enum_value("SAD", 2)],
        ..Default::default()
    };

    let holder = DescriptorProto {
        name: Some("LegacyHolder".to_string()),
        field: vec![enum_field("mood", 1, ".bridge.legacy.Mood")],
        ..Default::default()
    };

    // No syntax set: proto2, so Mood is a closed enum.
    FileDescriptorProto {
        name: Some("bridge_legacy.proto".to_string()),
        package: Some("bridge.legacy".to_string()),
        message_type: vec![holder],
        enum_type: vec![mood],
        ..Default::default()
    }
}

fn enum_value(name: &str, number: i32) -> EnumValueDescriptorProto {
    EnumValueDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        ..Default::default()
    }
}
