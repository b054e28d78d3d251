//! Canonical JSON encoding and the digests computed over it.
//!
//! Both ends of a sync must derive the same checksum for the same data map,
//! so the encoding is fixed:
//! - Object keys sorted by code point at every nesting level
//! - `", "` between items, `": "` between a key and its value
//! - Only printable ASCII emitted raw; everything else as `\uXXXX`
//!   (lowercase hex, surrogate pairs above the BMP)
//!
//! **This encoding is part of the wire format.** Changing it breaks
//! checksum agreement with every existing peer.
//!
//! [`to_wire_json`] uses the same separators and escaping but keeps field
//! declaration order, for records such as the pairing payload.

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt::Write;
use std::io;

/// The key-value map carried by packets, pairing sessions and sync requests.
pub type SyncData = Map<String, Value>;

/// Number of hex digits kept from the SHA-256 digest for a data checksum.
const CHECKSUM_HEX_LEN: usize = 16;

/// Serialize a JSON value canonically.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Short checksum of a data map: the first 16 hex digits of SHA-256 over
/// its canonical serialization.
pub fn checksum(data: &SyncData) -> String {
    let mut digest = content_hash(data);
    digest.truncate(CHECKSUM_HEX_LEN);
    digest
}

/// Full SHA-256 (64 lowercase hex digits) over the canonical serialization
/// of a data map.
pub fn content_hash(data: &SyncData) -> String {
    let mut out = String::new();
    write_object(&mut out, data);
    hex::encode(Sha256::digest(out.as_bytes()))
}

/// Serialize a record with canonical separators and escaping, in field
/// declaration order.
pub fn to_wire_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, WireFormatter);
    value.serialize(&mut ser)?;
    // The formatter only ever writes ASCII.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

struct WireFormatter;

impl Formatter for WireFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut escaped = String::with_capacity(fragment.len());
        for c in fragment.chars() {
            push_char(&mut escaped, c);
        }
        writer.write_all(escaped.as_bytes())
    }
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(out, map),
    }
}

fn write_object(out: &mut String, map: &Map<String, Value>) {
    // Map iteration order depends on serde_json's `preserve_order` feature,
    // which another crate in the graph may switch on.
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.push('{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_string(out, key);
        out.push_str(": ");
        write_value(out, value);
    }
    out.push('}');
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            _ => push_char(out, c),
        }
    }
    out.push('"');
}

/// Push a character that needs no short escape: raw if printable ASCII,
/// otherwise as `\uXXXX` UTF-16 units.
fn push_char(out: &mut String, c: char) {
    if (' '..='~').contains(&c) {
        out.push(c);
    } else {
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
            // Writing into a String cannot fail.
            let _ = write!(out, "\\u{:04x}", unit);
        }
    }
}
