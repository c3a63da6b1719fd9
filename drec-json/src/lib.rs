#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

use alloc::vec::Vec;

mod span;
pub use span::*;

mod tokenizer;
pub use tokenizer::{Token, TokenError, TokenErrorKind};

mod value;
pub use value::*;

mod error;
pub use error::*;

mod parse;
pub use parse::*;

mod serialize;
pub use serialize::*;

/// `no_std` compatible Write trait used by the json writer.
pub trait JsonWrite {
    /// Write all these bytes to the writer.
    fn write(&mut self, buf: &[u8]);

    /// If the writer supports it, reserve space for `len` additional bytes.
    fn reserve(&mut self, additional: usize);
}

impl JsonWrite for &mut Vec<u8> {
    fn write(&mut self, buf: &[u8]) {
        self.extend_from_slice(buf);
    }

    fn reserve(&mut self, additional: usize) {
        Vec::reserve(self, additional)
    }
}

impl JsonWrite for Vec<u8> {
    fn write(&mut self, buf: &[u8]) {
        self.extend_from_slice(buf);
    }

    fn reserve(&mut self, additional: usize) {
        Vec::reserve(self, additional)
    }
}

/// Writes `s` as a quoted, escaped JSON string.
fn write_json_string<W: JsonWrite>(writer: &mut W, s: &str) {
    writer.write(b"\"");

    // Runs of bytes that need no escaping are written in one go.
    let bytes = s.as_bytes();
    let mut run_start = 0;
    for (i, c) in s.char_indices() {
        if needs_escape(c) {
            if run_start < i {
                writer.write(&bytes[run_start..i]);
            }
            write_json_escaped_char(writer, c);
            run_start = i + c.len_utf8();
        }
    }
    if run_start < bytes.len() {
        writer.write(&bytes[run_start..]);
    }

    writer.write(b"\"")
}

#[inline]
fn needs_escape(c: char) -> bool {
    c == '"' || c == '\\' || c.is_ascii_control()
}

/// Writes a single JSON escaped character
fn write_json_escaped_char<W: JsonWrite>(writer: &mut W, c: char) {
    match c {
        '"' => writer.write(b"\\\""),
        '\\' => writer.write(b"\\\\"),
        '\n' => writer.write(b"\\n"),
        '\r' => writer.write(b"\\r"),
        '\t' => writer.write(b"\\t"),
        '\u{08}' => writer.write(b"\\b"),
        '\u{0C}' => writer.write(b"\\f"),
        c if c.is_ascii_control() => {
            const HEX: &[u8; 16] = b"0123456789abcdef";
            let code = c as u32;
            let buf = [
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX[((code >> 4) & 0xf) as usize],
                HEX[(code & 0xf) as usize],
            ];
            writer.write(&buf);
        }
        c => {
            let mut buf = [0; 4];
            writer.write(c.encode_utf8(&mut buf).as_bytes())
        }
    }
}
