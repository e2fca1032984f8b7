//! Single-value conversion between native field values and JSON nodes.
//!
//! This is the leaf of the marshaling engine: one field value at a time,
//! dispatched by an exhaustive match over the field's declared
//! [`Kind`]. The conversions are pure and stateless; nested messages
//! recurse back into the message codec.
//!
//! ## Type mapping
//!
//! - integers (all widths and signednesses): JSON number. Decoding
//!   casts to the declared width without range validation, so
//!   out-of-range values wrap per native conversion semantics.
//! - float / double: JSON number
//! - bool: JSON boolean
//! - enum: JSON string holding the symbolic member name
//! - string: JSON string, verbatim
//! - bytes: JSON string holding the base64 (standard alphabet) text of
//!   the buffer, preserving arbitrary binary payloads exactly
//! - message: JSON object, via the message codec

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use prost_reflect::{EnumDescriptor, FieldDescriptor, Kind, Value};
use serde_json::{Number, Value as Json};
use tracing::trace;

/// Returns the JSON kind name for error reporting
pub(crate) fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Converts one raw field value into a JSON node.
///
/// For repeated fields the caller passes each element in turn; `value`
/// is always a single element here, never a list.
pub fn encode_value(field: &FieldDescriptor, value: &Value) -> Result<Json> {
    trace!("Encoding field {}", field.name());

    let json = match field.kind() {
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => {
            Json::from(expect_raw(field, value.as_i32())?)
        }
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => {
            Json::from(expect_raw(field, value.as_i64())?)
        }
        Kind::Uint32 | Kind::Fixed32 => Json::from(expect_raw(field, value.as_u32())?),
        Kind::Uint64 | Kind::Fixed64 => Json::from(expect_raw(field, value.as_u64())?),
        Kind::Float => encode_float(field, f64::from(expect_raw(field, value.as_f32())?))?,
        Kind::Double => encode_float(field, expect_raw(field, value.as_f64())?)?,
        Kind::Bool => Json::Bool(expect_raw(field, value.as_bool())?),
        Kind::String => Json::String(expect_raw(field, value.as_str())?.to_owned()),
        Kind::Bytes => Json::String(BASE64.encode(expect_raw(field, value.as_bytes())?)),
        Kind::Enum(enum_desc) => {
            let number = expect_raw(field, value.as_enum_number())?;
            encode_enum(field, &enum_desc, number)?
        }
        Kind::Message(_) => {
            let nested = expect_raw(field, value.as_message())?;
            Json::Object(super::marshal(nested)?)
        }
    };

    Ok(json)
}

/// Converts one JSON node into a raw field value.
///
/// Fails with [`Error::TypeMismatch`] when the JSON node's kind does not
/// agree with the field's declared type.
pub fn decode_value(field: &FieldDescriptor, json: &Json) -> Result<Value> {
    trace!("Decoding field {}", field.name());

    let value = match field.kind() {
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => {
            Value::I32(decode_signed(field, json)? as i32)
        }
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Value::I64(decode_signed(field, json)?),
        Kind::Uint32 | Kind::Fixed32 => Value::U32(decode_unsigned(field, json)? as u32),
        Kind::Uint64 | Kind::Fixed64 => Value::U64(decode_unsigned(field, json)?),
        Kind::Float => Value::F32(decode_float(field, json)? as f32),
        Kind::Double => Value::F64(decode_float(field, json)?),
        Kind::Bool => Value::Bool(
            json.as_bool()
                .ok_or_else(|| Error::type_mismatch(field.name(), "boolean", json_kind(json)))?,
        ),
        Kind::String => Value::String(decode_string(field, json)?.to_owned()),
        Kind::Bytes => {
            let text = decode_string(field, json)?;
            let raw = BASE64.decode(text).map_err(|source| Error::InvalidBytes {
                field: field.name().to_owned(),
                source,
            })?;
            Value::Bytes(Bytes::from(raw))
        }
        Kind::Enum(enum_desc) => {
            let name = decode_string(field, json)?;
            let member = enum_desc.get_value_by_name(name).ok_or_else(|| {
                Error::UnknownEnumName {
                    field: field.name().to_owned(),
                    enum_name: enum_desc.full_name().to_owned(),
                    name: name.to_owned(),
                }
            })?;
            Value::EnumNumber(member.number())
        }
        Kind::Message(message_desc) => {
            let object = json
                .as_object()
                .ok_or_else(|| Error::type_mismatch(field.name(), "object", json_kind(json)))?;
            Value::Message(super::unmarshal(&message_desc, object)?)
        }
    };

    Ok(value)
}

/// Converts a stored value accessor miss into an internal error.
///
/// A `DynamicMessage` only ever stores values matching its descriptor,
/// so a miss here indicates a bug rather than bad input.
fn expect_raw<T>(field: &FieldDescriptor, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| {
        Error::internal(format!(
            "stored value for field '{}' does not match its declared type",
            field.name()
        ))
    })
}

fn encode_float(field: &FieldDescriptor, value: f64) -> Result<Json> {
    let number = Number::from_f64(value).ok_or_else(|| Error::NonFiniteNumber {
        field: field.name().to_owned(),
    })?;
    Ok(Json::Number(number))
}

fn encode_enum(field: &FieldDescriptor, enum_desc: &EnumDescriptor, number: i32) -> Result<Json> {
    let member = enum_desc
        .get_value(number)
        .ok_or_else(|| Error::UnknownEnumValue {
            field: field.name().to_owned(),
            enum_name: enum_desc.full_name().to_owned(),
            number,
        })?;
    Ok(Json::String(member.name().to_owned()))
}

fn decode_signed(field: &FieldDescriptor, json: &Json) -> Result<i64> {
    json.as_i64()
        .or_else(|| json.as_u64().map(|v| v as i64))
        .ok_or_else(|| Error::type_mismatch(field.name(), "integer", json_kind(json)))
}

fn decode_unsigned(field: &FieldDescriptor, json: &Json) -> Result<u64> {
    json.as_u64()
        .or_else(|| json.as_i64().map(|v| v as u64))
        .ok_or_else(|| Error::type_mismatch(field.name(), "integer", json_kind(json)))
}

fn decode_float(field: &FieldDescriptor, json: &Json) -> Result<f64> {
    json.as_f64()
        .ok_or_else(|| Error::type_mismatch(field.name(), "number", json_kind(json)))
}

fn decode_string<'a>(field: &FieldDescriptor, json: &'a Json) -> Result<&'a str> {
    json.as_str()
        .ok_or_else(|| Error::type_mismatch(field.name(), "string", json_kind(json)))
}
