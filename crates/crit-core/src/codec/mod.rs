//! Reflection-driven message marshaling.
//!
//! This module converts whole message instances between their in-memory
//! representation ([`DynamicMessage`]) and JSON objects, driven entirely
//! by runtime descriptors — there is no per-schema code anywhere in the
//! engine.
//!
//! ## Cardinality policy
//!
//! - **required**: always emitted when marshaling; the schema contract
//!   makes absence impossible.
//! - **optional**: emitted only when the field carries a value; absent
//!   fields are omitted from the JSON object entirely, never written as
//!   `null`.
//! - **repeated**: emitted as a JSON array in source order; a field
//!   with zero elements is omitted.
//!
//! Unmarshaling treats JSON keys that match no schema field as a hard
//! error ([`crate::Error::UnknownField`]) — silently dropping them
//! would corrupt a round trip. Schema fields missing from the input are
//! left unset; required-field presence is deliberately not enforced on
//! this path, matching the checkpoint tool's permissiveness.

mod value;

use crate::error::{Error, Result};
use prost_reflect::{Cardinality, DynamicMessage, MessageDescriptor, ReflectMessage, Value};
use serde_json::{Map, Value as Json};
use tracing::trace;

pub use value::{decode_value, encode_value};

/// An ordered JSON object, as produced and consumed by the codec
pub type JsonObject = Map<String, Json>;

/// Converts a message instance into a JSON object.
///
/// Fields are visited in schema declaration order, which fixes the key
/// order of the emitted object. The instance is borrowed and never
/// mutated. Any per-field failure aborts the whole conversion; no
/// partial object escapes.
pub fn marshal(message: &DynamicMessage) -> Result<JsonObject> {
    let descriptor = message.descriptor();
    trace!("Marshaling message {}", descriptor.full_name());

    let mut object = JsonObject::new();

    for field in descriptor.fields() {
        match field.cardinality() {
            Cardinality::Required => {
                let raw = message.get_field(&field);
                object.insert(field.name().to_owned(), encode_value(&field, raw.as_ref())?);
            }
            Cardinality::Optional => {
                if !message.has_field(&field) {
                    continue;
                }
                let raw = message.get_field(&field);
                object.insert(field.name().to_owned(), encode_value(&field, raw.as_ref())?);
            }
            Cardinality::Repeated => {
                let raw = message.get_field(&field);
                let elements = raw.as_list().ok_or_else(|| {
                    Error::internal(format!(
                        "repeated field '{}' does not hold a list",
                        field.name()
                    ))
                })?;
                if elements.is_empty() {
                    continue;
                }

                let mut array = Vec::with_capacity(elements.len());
                for element in elements {
                    array.push(encode_value(&field, element)?);
                }
                object.insert(field.name().to_owned(), Json::Array(array));
            }
        }
    }

    Ok(object)
}

/// Converts a JSON object into a fresh message instance of the given
/// schema.
///
/// Every key in the object must name a schema field. Repeated fields
/// require a JSON array. On any failure the partially built instance is
/// dropped and the first error propagates.
pub fn unmarshal(descriptor: &MessageDescriptor, object: &JsonObject) -> Result<DynamicMessage> {
    trace!("Unmarshaling message {}", descriptor.full_name());

    let mut message = DynamicMessage::new(descriptor.clone());

    for (key, json) in object {
        let field = descriptor
            .get_field_by_name(key)
            .ok_or_else(|| Error::unknown_field(descriptor.full_name(), key))?;

        if field.cardinality() == Cardinality::Repeated {
            let elements = json
                .as_array()
                .ok_or_else(|| Error::type_mismatch(field.name(), "array", value::json_kind(json)))?;

            let mut list = Vec::with_capacity(elements.len());
            for element in elements {
                list.push(decode_value(&field, element)?);
            }
            message.set_field(&field, Value::List(list));
        } else {
            let raw = decode_value(&field, json)?;
            message.set_field(&field, raw);
        }
    }

    Ok(message)
}
