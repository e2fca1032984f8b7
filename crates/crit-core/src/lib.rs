//! # crit-core
//!
//! A library for converting checkpoint image files into human-editable
//! JSON documents and back, losslessly, driven entirely by runtime
//! message descriptors.
//!
//! This crate provides the core functionality for:
//! - Marshaling message instances to JSON and back without any
//!   per-schema generated code
//! - Framing message sequences inside magic-tagged container files
//! - A registry of image formats and their schemas
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`codec`]: Reflection-driven value and message marshaling
//! - [`container`]: Container file framing and file conversion
//! - [`registry`]: Image format and schema registry
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use crit_core::{container, Registry};
//!
//! let registry = Registry::builtin()?;
//!
//! // Image file -> editable JSON
//! container::image_file_to_json_file(&registry, "pstree.img", "pstree.json")?;
//!
//! // ...edit pstree.json...
//!
//! // JSON -> byte-identical image file
//! container::json_file_to_image_file(&registry, "pstree.json", "pstree.img")?;
//! # Ok::<(), crit_core::Error>(())
//! ```
//!
//! ## Extensibility
//!
//! Formats and schemas live entirely in the [`registry`]; the codecs
//! dispatch on runtime descriptors, so registering a new schema never
//! touches the conversion engines.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod codec;
pub mod container;
pub mod error;
pub mod registry;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export primary types for convenience
pub use codec::{marshal, unmarshal};
pub use container::{
    image_file_to_json_file, image_to_json, json_file_to_image_file, json_to_image, MAGIC_KEY,
};
pub use error::{Error, Result};
pub use registry::{ImageFormat, Registry};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
