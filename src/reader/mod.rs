//! A big-endian byte reader over a classfile buffer.
//!
//! The reader supports both positional reads (at an arbitrary offset, leaving the cursor
//! untouched) and sequential reads (advancing an internal cursor), since the constant pool
//! needs the former for on-demand string resolution while the rest of the parser only ever
//! reads forward.

use std::io::{self, Read};

use crate::parsing::errors::Error;

pub(crate) trait ValueReaderExt: Read {
    fn read_value<T: FromReader>(&mut self) -> io::Result<T>;
}

pub(crate) trait FromReader {
    fn from_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self>
    where
        Self: Sized;
}

impl<R: Read + ?Sized> ValueReaderExt for R {
    fn read_value<T: FromReader>(&mut self) -> io::Result<T> {
        T::from_reader(self)
    }
}

impl<const N: usize> FromReader for [u8; N] {
    fn from_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; N];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

#[trait_gen::trait_gen(T -> u8, u16, u32, u64, i8, i16, i32, i64, f32, f64)]
impl FromReader for T {
    fn from_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let buf = reader.read_value()?;
        Ok(Self::from_be_bytes(buf))
    }
}

/// Reads `len` bytes and advances the reader.
pub(crate) fn read_byte_chunk<R>(reader: &mut R, len: usize) -> io::Result<Vec<u8>>
where
    R: Read + ?Sized,
{
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// A positional, big-endian reader over an in-memory classfile buffer.
///
/// Unlike a plain `Read` adapter, [`BufferedReader`] keeps the entire classfile in memory so
/// that [`Self::read_string`] can resolve a modified-UTF8 `CONSTANT_Utf8` entry from an
/// arbitrary byte offset without disturbing the reader's own sequential cursor. This mirrors
/// how the constant pool is parsed in two passes: once to record offsets, and later, lazily,
/// to decode the strings those offsets point to.
#[derive(Debug, Clone)]
pub struct BufferedReader<'a> {
    buf: &'a [u8],
    curr: usize,
}

impl<'a> BufferedReader<'a> {
    /// Wraps a byte slice for reading. The cursor starts at offset 0.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, curr: 0 }
    }

    /// The current sequential-read cursor position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.curr
    }

    /// The total length of the underlying buffer.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the underlying buffer is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Advances the cursor by `n` bytes without reading them.
    pub fn skip(&mut self, n: usize) -> Result<(), Error> {
        if self.curr + n > self.buf.len() {
            return Err(Error::UnexpectedEof);
        }
        self.curr += n;
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let end = self.curr.checked_add(n).ok_or(Error::UnexpectedEof)?;
        let slice = self.buf.get(self.curr..end).ok_or(Error::UnexpectedEof)?;
        self.curr = end;
        Ok(slice)
    }

    /// Reads a single unsigned byte, advancing the cursor.
    pub fn read_u1(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    /// Reads a big-endian `u16`, advancing the cursor.
    pub fn read_u2(&mut self) -> Result<u16, Error> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Reads a big-endian `u32`, advancing the cursor.
    pub fn read_u4(&mut self) -> Result<u32, Error> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a big-endian `u64`, advancing the cursor.
    pub fn read_u8(&mut self) -> Result<u64, Error> {
        let bytes = self.take(8)?;
        Ok(u64::from_be_bytes(bytes.try_into().expect("exactly 8 bytes")))
    }

    /// Reads `n` raw bytes as a borrowed slice, advancing the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], Error> {
        self.take(n)
    }

    /// Borrows `len` raw bytes at an arbitrary `offset`, without touching the cursor.
    pub(crate) fn raw_slice(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        self.buf.get(offset..offset + len)
    }

    /// Creates a fresh, independently-positioned reader over `len` bytes starting at `offset`
    /// of the same underlying buffer. Used to parse an attribute's payload in isolation once
    /// its `attribute_length`-delimited span has been located.
    pub(crate) fn window(&self, offset: usize, len: usize) -> Result<Self, Error> {
        let buf = self.buf.get(offset..offset + len).ok_or(Error::UnexpectedEof)?;
        Ok(Self { buf, curr: 0 })
    }

    /// Reads a positional, length-prefixed modified-UTF8 (CESU-8) string at `offset`, without
    /// moving the sequential cursor. `length` is the declared byte length of the `CONSTANT_Utf8`
    /// entry's payload.
    ///
    /// `replace_slash_with_dot` rewrites the JVM's internal `/`-separated binary names into
    /// Rust-facing dotted names; `strip_type_descriptor` strips a leading `L` and trailing `;`
    /// for a class entry stored as a full field descriptor rather than a bare binary name.
    pub fn read_string(
        &self,
        offset: usize,
        length: usize,
        replace_slash_with_dot: bool,
        strip_type_descriptor: bool,
    ) -> Result<String, Error> {
        let raw = self
            .buf
            .get(offset..offset + length)
            .ok_or(Error::UnexpectedEof)?;
        let decoded = decode_modified_utf8(raw)?;
        let trimmed = if strip_type_descriptor {
            decoded
                .strip_prefix('L')
                .and_then(|s| s.strip_suffix(';'))
                .unwrap_or(&decoded)
        } else {
            &decoded
        };
        Ok(if replace_slash_with_dot {
            trimmed.replace('/', ".")
        } else {
            trimmed.to_owned()
        })
    }

    /// Peeks the first decoded `char` of a modified-UTF8 string at `offset`, without allocating
    /// the full string. Used by the constant pool to distinguish, e.g., a single-character
    /// primitive descriptor from a multi-character one.
    pub fn peek_first_char(&self, offset: usize, length: usize) -> Result<Option<char>, Error> {
        let raw = self
            .buf
            .get(offset..offset + length)
            .ok_or(Error::UnexpectedEof)?;
        if raw.is_empty() {
            return Ok(None);
        }
        let decoded = decode_modified_utf8(raw)?;
        Ok(decoded.chars().next())
    }

    /// Compares a modified-UTF8 string at `offset` against a literal, without allocating unless
    /// the encoding contains a supplementary-plane surrogate pair.
    pub fn string_equals(&self, offset: usize, length: usize, literal: &str) -> Result<bool, Error> {
        let raw = self
            .buf
            .get(offset..offset + length)
            .ok_or(Error::UnexpectedEof)?;
        if raw.len() == literal.len() && raw.iter().copied().eq(literal.bytes()) {
            return Ok(true);
        }
        Ok(decode_modified_utf8(raw)? == literal)
    }
}

/// Decodes a JVM "modified UTF-8" (CESU-8 plus an embedded-nul encoding) byte string.
fn decode_modified_utf8(raw: &[u8]) -> Result<String, Error> {
    cesu8::from_java_cesu8(raw)
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| Error::BrokenModifiedUtf8)
}

#[cfg(test)]
mod test {
    use super::BufferedReader;

    #[test]
    fn sequential_reads_advance_cursor() {
        let buf = [0x00, 0x01, 0xCA, 0xFE, 0xBA, 0xBE];
        let mut reader = BufferedReader::new(&buf);
        assert_eq!(reader.read_u2().unwrap(), 0x0001);
        assert_eq!(reader.read_u4().unwrap(), 0xCAFE_BABE);
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn positional_read_does_not_move_cursor() {
        let buf = *b"\x00\x03foo";
        let reader = BufferedReader::new(&buf);
        let s = reader.read_string(2, 3, false, false).unwrap();
        assert_eq!(s, "foo");
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn read_string_replaces_slashes() {
        let buf = *b"java/lang/Object";
        let reader = BufferedReader::new(&buf);
        let s = reader.read_string(0, buf.len(), true, false).unwrap();
        assert_eq!(s, "java.lang.Object");
    }

    #[test]
    fn read_string_strips_descriptor() {
        let buf = *b"Ljava/lang/String;";
        let reader = BufferedReader::new(&buf);
        let s = reader.read_string(0, buf.len(), true, true).unwrap();
        assert_eq!(s, "java.lang.String");
    }

    #[test]
    fn read_past_end_is_unexpected_eof() {
        let buf = [0x00];
        let mut reader = BufferedReader::new(&buf);
        assert!(reader.read_u2().is_err());
    }
}
