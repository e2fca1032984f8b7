//! Error types for the crit-core library.
//!
//! This module provides comprehensive error handling using the `thiserror` crate,
//! with detailed error variants for different failure modes.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for crit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all crit operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O failure on an input or output stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A length-prefixed record was cut short
    #[error("truncated record at offset {offset}: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Byte offset where the short read started
        offset: u64,
        /// Number of bytes the record declared
        expected: usize,
        /// Number of bytes actually available
        actual: usize,
    },

    /// Image format tag not present in the registry
    #[error("unknown image format magic {magic:#010x}")]
    UnknownFormat {
        /// The unrecognized format tag
        magic: u32,
    },

    /// JSON key does not name any field of the target schema
    #[error("unknown field '{field}' for message '{message}'")]
    UnknownField {
        /// Full name of the message schema
        message: String,
        /// The offending JSON key
        field: String,
    },

    /// JSON node kind disagrees with the field's declared type
    #[error("type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Name of the field being decoded
        field: String,
        /// JSON kind the field's type requires
        expected: &'static str,
        /// JSON kind actually found
        actual: &'static str,
    },

    /// Stored enum integer has no symbolic name in the enum definition
    #[error("field '{field}': enum '{enum_name}' has no value {number}")]
    UnknownEnumValue {
        /// Name of the field being encoded
        field: String,
        /// Full name of the enum definition
        enum_name: String,
        /// The unmapped integer value
        number: i32,
    },

    /// Symbolic name does not match any declared enum member
    #[error("field '{field}': enum '{enum_name}' has no member named '{name}'")]
    UnknownEnumName {
        /// Name of the field being decoded
        field: String,
        /// Full name of the enum definition
        enum_name: String,
        /// The unmapped symbolic name
        name: String,
    },

    /// Floating-point value cannot be represented as a JSON number
    #[error("field '{field}': non-finite floating-point value cannot be encoded as JSON")]
    NonFiniteNumber {
        /// Name of the field being encoded
        field: String,
    },

    /// Bytes field holds text that is not valid base64
    #[error("field '{field}': invalid base64 payload: {source}")]
    InvalidBytes {
        /// Name of the field being decoded
        field: String,
        /// Underlying base64 error
        #[source]
        source: base64::DecodeError,
    },

    /// Failed to unpack a message from its packed bytes
    #[error("failed to decode packed message: {0}")]
    MessageDecode(#[from] prost::DecodeError),

    /// Failed to parse or print a JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON document does not have the expected container structure
    #[error("malformed document: {details}")]
    MalformedDocument {
        /// Description of the structural problem
        details: String,
    },

    /// Failed to build the schema registry's descriptor pool
    #[error("failed to build schema descriptors: {0}")]
    DescriptorBuild(#[from] prost_reflect::DescriptorError),

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new truncated record error
    pub fn truncated(offset: u64, expected: usize, actual: usize) -> Self {
        Self::Truncated {
            offset,
            expected,
            actual,
        }
    }

    /// Creates a new unknown field error
    pub fn unknown_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            message: message.into(),
            field: field.into(),
        }
    }

    /// Creates a new type mismatch error
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Creates a new malformed document error
    pub fn malformed_document(details: impl Into<String>) -> Self {
        Self::MalformedDocument {
            details: details.into(),
        }
    }

    /// Creates a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownFormat { magic: 0x1234 };
        assert!(err.to_string().contains("0x00001234"));

        let err = Error::unknown_field("criu.PstreeEntry", "pids");
        assert!(err.to_string().contains("pids"));
        assert!(err.to_string().contains("criu.PstreeEntry"));
    }

    #[test]
    fn test_truncated_display() {
        let err = Error::truncated(8, 16, 3);
        let text = err.to_string();
        assert!(text.contains("offset 8"));
        assert!(text.contains("16 bytes"));
        assert!(text.contains("got 3"));
    }
}
