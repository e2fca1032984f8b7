//! Image format registry.
//!
//! Every container file starts with a 32-bit magic that selects an
//! [`ImageFormat`]: which message schema(s) the file holds and whether it
//! is a single message or a header followed by a repeating array of
//! entries. The registry is a pure data table — adding a format touches
//! only the catalogue, never the codecs.
//!
//! Schemas are runtime descriptors ([`prost_reflect::MessageDescriptor`])
//! resolved from a [`prost_reflect::DescriptorPool`], so the codecs stay
//! free of any schema-specific code.

mod catalogue;

pub mod magic;

use crate::error::Result;
use prost_reflect::MessageDescriptor;

pub(crate) use catalogue::{enumeration, field, file, message, pool_from, typed_field};

/// One container file kind: its magic, arity, and schema(s).
///
/// Most repeating formats use the same schema for the header and every
/// subsequent entry; a format may also pair a distinct header schema
/// with a different element schema (the pagemap layout).
#[derive(Debug, Clone)]
pub struct ImageFormat {
    magic: u32,
    repeating: bool,
    header: MessageDescriptor,
    element: MessageDescriptor,
}

impl ImageFormat {
    /// Creates a format holding exactly one message after the magic
    pub fn single(magic: u32, schema: MessageDescriptor) -> Self {
        Self {
            magic,
            repeating: false,
            header: schema.clone(),
            element: schema,
        }
    }

    /// Creates a repeating format where header and entries share one schema
    pub fn array(magic: u32, schema: MessageDescriptor) -> Self {
        Self {
            magic,
            repeating: true,
            header: schema.clone(),
            element: schema,
        }
    }

    /// Creates a repeating format with a distinct header schema
    pub fn array_with_header(
        magic: u32,
        header: MessageDescriptor,
        element: MessageDescriptor,
    ) -> Self {
        Self {
            magic,
            repeating: true,
            header,
            element,
        }
    }

    /// Returns the format's magic value
    pub fn magic(&self) -> u32 {
        self.magic
    }

    /// Returns true if the format holds a repeating sequence of entries
    pub fn is_repeating(&self) -> bool {
        self.repeating
    }

    /// Returns the schema for the first message in the file
    pub fn header(&self) -> &MessageDescriptor {
        &self.header
    }

    /// Returns the schema for entries after the header
    pub fn element(&self) -> &MessageDescriptor {
        &self.element
    }

    /// Returns the schema governing the message at the given position,
    /// or `None` once the format holds no further messages.
    ///
    /// Position 0 is always the header; later positions exist only for
    /// repeating formats.
    pub fn schema_for(&self, index: usize) -> Option<&MessageDescriptor> {
        if index == 0 {
            Some(&self.header)
        } else if self.repeating {
            Some(&self.element)
        } else {
            None
        }
    }
}

/// Lookup table mapping magic values to image formats
#[derive(Debug, Clone)]
pub struct Registry {
    formats: Vec<ImageFormat>,
}

impl Registry {
    /// Creates a registry from an explicit format list
    pub fn new(formats: Vec<ImageFormat>) -> Self {
        Self { formats }
    }

    /// Creates the builtin registry with the CRIU-flavored catalogue
    pub fn builtin() -> Result<Self> {
        catalogue::builtin()
    }

    /// Looks up the format for a magic value
    pub fn format(&self, magic: u32) -> Option<&ImageFormat> {
        self.formats.iter().find(|f| f.magic == magic)
    }

    /// Returns the number of registered formats
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Returns true if the registry holds no formats
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}
