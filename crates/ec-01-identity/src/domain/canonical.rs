//! # Legacy Canonical JSON
//!
//! Peers running the original client hash a JSON object rendered with
//! `", "` / `": "` separators, keys sorted, and every character outside
//! printable ASCII escaped as lowercase `\uXXXX` (UTF-16 code units). This
//! formatter reproduces that rendering byte-for-byte on top of `serde_json`.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io::{self, Write};

#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyJsonFormatter;

impl Formatter for LegacyJsonFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let bytes = fragment.as_bytes();
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(&bytes[start..index])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(&bytes[start..])
    }
}

/// Serialize `value` in the legacy rendering.
///
/// Field order is the struct's declaration order, so callers declare fields
/// alphabetically by their serialized name.
pub fn to_legacy_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::with_capacity(128);
    let mut serializer = Serializer::with_formatter(&mut out, LegacyJsonFormatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn render<T: Serialize>(value: &T) -> String {
        String::from_utf8(to_legacy_json(value).unwrap()).unwrap()
    }

    #[test]
    fn test_separators() {
        let mut map = BTreeMap::new();
        map.insert("b", vec![1, 2]);
        map.insert("a", vec![3]);
        assert_eq!(render(&map), r#"{"a": [3], "b": [1, 2]}"#);
    }

    #[test]
    fn test_non_ascii_escaped_as_utf16_units() {
        assert_eq!(render(&"Caf\u{e9} \u{2713}"), r#""Caf\u00e9 \u2713""#);
        assert_eq!(render(&"\u{1d11e}"), r#""\ud834\udd1e""#);
    }

    #[test]
    fn test_control_and_delete_escaped() {
        assert_eq!(render(&"a\nb"), r#""a\nb""#);
        assert_eq!(render(&"x\u{7f}y"), r#""x\u007fy""#);
        assert_eq!(render(&"say \"hi\""), r#""say \"hi\"""#);
    }
}
