//! Shared descriptor fixtures for unit tests.

use crate::registry::{enumeration, field as field_proto, file, message, pool_from, typed_field};
use prost_reflect::{DescriptorPool, FieldDescriptor, MessageDescriptor};
use prost_types::field_descriptor_proto::{Label, Type};

/// A pool with one message per concern: `test.Scalars` covering every
/// scalar kind, and `test.Outer`/`test.Inner` for nesting.
pub(crate) fn pool() -> DescriptorPool {
    use Label::{Optional, Repeated, Required};

    let color = enumeration("Color", &[("RED", 0), ("GREEN", 1), ("BLUE", 2)]);

    let scalars = message(
        "Scalars",
        vec![
            field_proto("i32v", 1, Required, Type::Int32),
            field_proto("i64v", 2, Optional, Type::Int64),
            field_proto("u32v", 3, Optional, Type::Uint32),
            field_proto("u64v", 4, Optional, Type::Uint64),
            field_proto("f32v", 5, Optional, Type::Float),
            field_proto("f64v", 6, Optional, Type::Double),
            field_proto("flag", 7, Optional, Type::Bool),
            field_proto("name", 8, Optional, Type::String),
            field_proto("blob", 9, Optional, Type::Bytes),
            typed_field("color", 10, Optional, Type::Enum, ".test.Color"),
            field_proto("nums", 11, Repeated, Type::Uint32),
        ],
    );

    let inner = message("Inner", vec![field_proto("id", 1, Required, Type::Uint32)]);

    let outer = message(
        "Outer",
        vec![
            field_proto("a", 1, Required, Type::Int32),
            field_proto("b", 2, Optional, Type::String),
            typed_field("inner", 3, Optional, Type::Message, ".test.Inner"),
            typed_field("items", 4, Repeated, Type::Message, ".test.Inner"),
        ],
    );

    let file = file(
        "test/fixtures.proto",
        "test",
        vec![scalars, inner, outer],
        vec![color],
    );
    pool_from(file).expect("test fixtures must resolve")
}

pub(crate) fn scalars() -> MessageDescriptor {
    pool()
        .get_message_by_name("test.Scalars")
        .expect("test.Scalars")
}

pub(crate) fn outer() -> MessageDescriptor {
    pool().get_message_by_name("test.Outer").expect("test.Outer")
}

pub(crate) fn field(descriptor: &MessageDescriptor, name: &str) -> FieldDescriptor {
    descriptor
        .get_field_by_name(name)
        .unwrap_or_else(|| panic!("no field '{name}' on {}", descriptor.full_name()))
}
