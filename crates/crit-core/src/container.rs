//! Container file framing.
//!
//! An image file is a 4-byte little-endian magic followed by zero or
//! more length-prefixed records:
//!
//! ```text
//! magic(4) [ size(4) packed-message(size) ]*
//! ```
//!
//! The record count is implicit — the sequence ends at end-of-file. A
//! clean EOF exactly at a length-prefix boundary is the normal end of
//! the sequence; a short length prefix or short record body is a
//! truncation error.
//!
//! The JSON rendition is a single object: the magic under the reserved
//! [`MAGIC_KEY`], then each message under its position — `"0"` for the
//! header, `"1"`.. for subsequent entries of repeating formats.
//!
//! Both directions assemble their entire result in memory before
//! anything touches the output path, so a failed conversion never
//! commits a partial file.

use crate::codec;
use crate::error::{Error, Result};
use crate::registry::Registry;
use prost::Message as _;
use prost_reflect::DynamicMessage;
use serde_json::{Map, Value as Json};
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::debug;

/// Reserved JSON key holding the container's magic value
pub const MAGIC_KEY: &str = "magic";

/// Converts an image read from `input` into its JSON document.
///
/// Fails with [`Error::UnknownFormat`] when the leading magic is not in
/// the registry, and with [`Error::Truncated`] when a length-prefixed
/// record is cut short.
pub fn image_to_json<R: Read>(registry: &Registry, mut input: R) -> Result<Json> {
    let mut offset: u64 = 0;

    let mut magic_buf = [0u8; 4];
    let got = fill(&mut input, &mut magic_buf)?;
    if got < magic_buf.len() {
        return Err(Error::truncated(offset, magic_buf.len(), got));
    }
    offset += 4;

    let magic = u32::from_le_bytes(magic_buf);
    let format = registry
        .format(magic)
        .ok_or(Error::UnknownFormat { magic })?;
    debug!(
        "Decoding image with magic {:#010x} (repeating: {})",
        magic,
        format.is_repeating()
    );

    let mut document = Map::new();
    document.insert(MAGIC_KEY.to_owned(), Json::from(magic));

    let mut index = 0usize;
    while let Some(schema) = format.schema_for(index) {
        let Some(packed) = read_record(&mut input, &mut offset)? else {
            break;
        };

        let message = DynamicMessage::decode(schema.clone(), packed.as_slice())?;
        let entry = codec::marshal(&message)?;
        document.insert(index.to_string(), Json::Object(entry));
        index += 1;
    }

    debug!("Image decoded: {} message(s)", index);
    Ok(Json::Object(document))
}

/// Converts a JSON document back into image bytes.
///
/// The header is taken from key `"0"`, and for repeating formats each
/// subsequent positional key is consumed until the next expected index
/// is absent.
pub fn json_to_image(registry: &Registry, document: &Json) -> Result<Vec<u8>> {
    let object = document
        .as_object()
        .ok_or_else(|| Error::malformed_document("top-level JSON value is not an object"))?;

    let magic = object
        .get(MAGIC_KEY)
        .ok_or_else(|| Error::malformed_document(format!("missing '{MAGIC_KEY}' key")))?
        .as_u64()
        .filter(|m| *m <= u64::from(u32::MAX))
        .ok_or_else(|| {
            Error::malformed_document(format!("'{MAGIC_KEY}' is not a 32-bit unsigned integer"))
        })? as u32;

    let format = registry
        .format(magic)
        .ok_or(Error::UnknownFormat { magic })?;
    debug!(
        "Encoding image with magic {:#010x} (repeating: {})",
        magic,
        format.is_repeating()
    );

    let mut image = Vec::new();
    image.extend_from_slice(&magic.to_le_bytes());

    let mut index = 0usize;
    while let Some(schema) = format.schema_for(index) {
        let key = index.to_string();
        let Some(entry) = object.get(&key) else {
            break;
        };
        let entry = entry.as_object().ok_or_else(|| {
            Error::malformed_document(format!("entry '{key}' is not a JSON object"))
        })?;

        let message = codec::unmarshal(schema, entry)?;
        let packed = message.encode_to_vec();
        image.extend_from_slice(&(packed.len() as u32).to_le_bytes());
        image.extend_from_slice(&packed);
        index += 1;
    }

    debug!("Image encoded: {} message(s), {} bytes", index, image.len());
    Ok(image)
}

/// Converts an image file into a pretty-printed JSON file.
///
/// The output file is written only after the whole conversion has
/// succeeded.
pub fn image_file_to_json_file(
    registry: &Registry,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<()> {
    let input = input.as_ref();
    let data = fs::read(input).map_err(|e| Error::file_read(input, e))?;

    let document = image_to_json(registry, data.as_slice())?;
    let mut text = serde_json::to_string_pretty(&document)?;
    text.push('\n');

    let output = output.as_ref();
    fs::write(output, text).map_err(|e| Error::file_write(output, e))
}

/// Converts a JSON file back into an image file.
///
/// The output file is written only after the whole conversion has
/// succeeded.
pub fn json_file_to_image_file(
    registry: &Registry,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<()> {
    let input = input.as_ref();
    let text = fs::read_to_string(input).map_err(|e| Error::file_read(input, e))?;

    let document: Json = serde_json::from_str(&text)?;
    let image = json_to_image(registry, &document)?;

    let output = output.as_ref();
    fs::write(output, image).map_err(|e| Error::file_write(output, e))
}

/// Reads one length-prefixed record.
///
/// Returns `Ok(None)` on a clean EOF at the length-prefix boundary.
fn read_record<R: Read>(input: &mut R, offset: &mut u64) -> Result<Option<Vec<u8>>> {
    let mut size_buf = [0u8; 4];
    let got = fill(input, &mut size_buf)?;
    if got == 0 {
        return Ok(None);
    }
    if got < size_buf.len() {
        return Err(Error::truncated(*offset, size_buf.len(), got));
    }
    *offset += 4;

    let size = u32::from_le_bytes(size_buf) as usize;
    let mut packed = vec![0u8; size];
    let got = fill(input, &mut packed)?;
    if got < size {
        return Err(Error::truncated(*offset, size, got));
    }
    *offset += size as u64;

    Ok(Some(packed))
}

/// Reads until the buffer is full or EOF; returns the bytes read
fn fill<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{magic, ImageFormat};
    use crate::testutil;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// The registry from the documented scenario: tag 0x1234, header
    /// with a required int32 `a` and an optional string `b`.
    fn scenario_registry() -> Registry {
        Registry::new(vec![ImageFormat::single(0x1234, testutil::outer())])
    }

    fn repeating_registry() -> Registry {
        Registry::new(vec![ImageFormat::array(0x1234, testutil::outer())])
    }

    #[test]
    fn test_single_format_to_json() {
        // magic, then one record: field 1 varint 5 -> [0x08, 0x05]
        let image = [
            0x34, 0x12, 0x00, 0x00, // magic 0x1234
            0x02, 0x00, 0x00, 0x00, // size 2
            0x08, 0x05, // a = 5
        ];

        let document = image_to_json(&scenario_registry(), &image[..]).unwrap();
        assert_eq!(document, json!({"magic": 4660, "0": {"a": 5}}));
    }

    #[test]
    fn test_json_to_single_format_bytes() {
        let document = json!({"magic": 4660, "0": {"a": 5}});
        let image = json_to_image(&scenario_registry(), &document).unwrap();
        assert_eq!(
            image,
            [0x34, 0x12, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x08, 0x05]
        );
    }

    #[test]
    fn test_round_trip_repeating() {
        let registry = repeating_registry();
        let document = json!({
            "magic": 4660,
            "0": {"a": 1, "b": "header"},
            "1": {"a": 2, "items": [{"id": 10}, {"id": 11}]},
            "2": {"a": 3},
        });

        let image = json_to_image(&registry, &document).unwrap();
        let reloaded = image_to_json(&registry, image.as_slice()).unwrap();
        assert_eq!(reloaded, document);
    }

    #[test]
    fn test_non_repeating_ignores_extra_keys() {
        // The single-message format stops after the header even when the
        // document carries more positional entries.
        let document = json!({"magic": 4660, "0": {"a": 1}, "1": {"a": 2}});
        let image = json_to_image(&scenario_registry(), &document).unwrap();

        let reloaded = image_to_json(&scenario_registry(), image.as_slice()).unwrap();
        assert_eq!(reloaded, json!({"magic": 4660, "0": {"a": 1}}));
    }

    #[test]
    fn test_unknown_magic() {
        let image = [0xEF, 0xBE, 0xAD, 0xDE];
        let err = image_to_json(&scenario_registry(), &image[..]).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownFormat {
                magic: 0xdead_beef
            }
        ));

        let document = json!({"magic": 0xdead_beef_u32, "0": {}});
        let err = json_to_image(&scenario_registry(), &document).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat { .. }));
    }

    #[test]
    fn test_missing_magic_key() {
        let err = json_to_image(&scenario_registry(), &json!({"0": {"a": 1}})).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));

        let err = json_to_image(&scenario_registry(), &json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn test_clean_eof_at_length_prefix() {
        // A repeating image may end exactly where a new prefix would start
        let registry = repeating_registry();
        let mut image = vec![0x34, 0x12, 0x00, 0x00];
        image.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x08, 0x01]);

        let document = image_to_json(&registry, image.as_slice()).unwrap();
        assert_eq!(document, json!({"magic": 4660, "0": {"a": 1}}));

        // A header-less repeating image is just the magic
        let document = image_to_json(&registry, &[0x34u8, 0x12, 0x00, 0x00][..]).unwrap();
        assert_eq!(document, json!({"magic": 4660}));
    }

    #[test]
    fn test_truncated_length_prefix() {
        let image = [0x34, 0x12, 0x00, 0x00, 0x02, 0x00];
        let err = image_to_json(&scenario_registry(), &image[..]).unwrap_err();
        assert!(matches!(
            err,
            Error::Truncated {
                offset: 4,
                expected: 4,
                actual: 2,
            }
        ));
    }

    #[test]
    fn test_truncated_record_body() {
        let image = [0x34, 0x12, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x08];
        let err = image_to_json(&scenario_registry(), &image[..]).unwrap_err();
        assert!(matches!(
            err,
            Error::Truncated {
                offset: 8,
                expected: 16,
                actual: 1,
            }
        ));
    }

    #[test]
    fn test_dual_schema_round_trip() {
        let registry = Registry::builtin().unwrap();
        let document = json!({
            "magic": magic::PAGEMAP,
            "0": {"pages_id": 1},
            "1": {"vaddr": 0x7f00_0000_u64, "nr_pages": 16, "flags": 4},
            "2": {"vaddr": 0x7f10_0000_u64, "nr_pages": 1},
        });

        let image = json_to_image(&registry, &document).unwrap();
        let reloaded = image_to_json(&registry, image.as_slice()).unwrap();
        assert_eq!(reloaded, document);
    }

    #[test]
    fn test_builtin_round_trip_with_enum_and_nested() {
        let registry = Registry::builtin().unwrap();
        let document = json!({
            "magic": magic::FDINFO,
            "0": {"id": 1, "flags": 0, "type": "PIPE", "fd": 3},
            "1": {"id": 2, "flags": 2, "type": "REG", "fd": 4},
        });

        let image = json_to_image(&registry, &document).unwrap();
        let reloaded = image_to_json(&registry, image.as_slice()).unwrap();
        assert_eq!(reloaded, document);

        let document = json!({
            "magic": magic::INVENTORY,
            "0": {
                "img_version": 1,
                "fdinfo_per_id": true,
                "root_ids": {"vm_id": 1, "files_id": 2, "fs_id": 3, "sighand_id": 4},
            },
        });

        let image = json_to_image(&registry, &document).unwrap();
        let reloaded = image_to_json(&registry, image.as_slice()).unwrap();
        assert_eq!(reloaded, document);
    }

    #[test]
    fn test_failed_conversion_produces_no_bytes() {
        // An unknown field in the second entry fails the whole document
        let registry = repeating_registry();
        let document = json!({
            "magic": 4660,
            "0": {"a": 1},
            "1": {"nonsense": true},
        });

        let err = json_to_image(&registry, &document).unwrap_err();
        assert!(matches!(err, Error::UnknownField { .. }));
    }
}
