//! The constant pool: a buffer-backed table of interned classfile constants.
//!
//! Rather than eagerly decoding every entry into an owned Rust value (as a classic
//! enum-per-entry representation would), the pool stores three parallel arrays indexed by
//! constant-pool slot: the entry's tag, the byte offset of its payload in the classfile buffer,
//! and, for entries that merely indirect to another slot (`CONSTANT_Class`, `CONSTANT_String`,
//! `CONSTANT_Module`, `CONSTANT_Package`, `CONSTANT_NameAndType`), the indirection value(s)
//! packed into a `u32`. This keeps parsing a single linear pass over the buffer and makes the
//! pool itself reusable across classfiles: [`ConstantPool::reset`] just truncates the arrays in
//! place instead of freeing and reallocating them.

use crate::parsing::errors::Error;
use crate::reader::BufferedReader;

/// The recognized constant-pool tags. This format recognizes exactly the tags JVMS table 4.4-A
/// lists, *excluding* `CONSTANT_Dynamic` (17) and `CONSTANT_InvokeDynamic` (18)'s indirect
/// payload beyond its raw bytes, since no instruction-level decoding happens in this crate
/// (`CONSTANT_InvokeDynamic`'s tag value is nonetheless retained so its slot can be skipped
/// correctly rather than misread as a different entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    /// `CONSTANT_Utf8`
    Utf8 = 1,
    /// `CONSTANT_Integer`
    Integer = 3,
    /// `CONSTANT_Float`
    Float = 4,
    /// `CONSTANT_Long`
    Long = 5,
    /// `CONSTANT_Double`
    Double = 6,
    /// `CONSTANT_Class`
    Class = 7,
    /// `CONSTANT_String`
    String = 8,
    /// `CONSTANT_Fieldref`
    FieldRef = 9,
    /// `CONSTANT_Methodref`
    MethodRef = 10,
    /// `CONSTANT_InterfaceMethodref`
    InterfaceMethodRef = 11,
    /// `CONSTANT_NameAndType`
    NameAndType = 12,
    /// `CONSTANT_MethodHandle`
    MethodHandle = 15,
    /// `CONSTANT_MethodType`
    MethodType = 16,
    /// `CONSTANT_InvokeDynamic`
    InvokeDynamic = 18,
    /// `CONSTANT_Module`
    Module = 19,
    /// `CONSTANT_Package`
    Package = 20,
}

impl Tag {
    fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            1 => Self::Utf8,
            3 => Self::Integer,
            4 => Self::Float,
            5 => Self::Long,
            6 => Self::Double,
            7 => Self::Class,
            8 => Self::String,
            9 => Self::FieldRef,
            10 => Self::MethodRef,
            11 => Self::InterfaceMethodRef,
            12 => Self::NameAndType,
            15 => Self::MethodHandle,
            16 => Self::MethodType,
            18 => Self::InvokeDynamic,
            19 => Self::Module,
            20 => Self::Package,
            _ => return None,
        })
    }

    /// Whether this tag occupies two consecutive constant-pool slots (`Long`/`Double`).
    #[must_use]
    pub const fn is_wide(self) -> bool {
        matches!(self, Self::Long | Self::Double)
    }
}

/// A reusable, buffer-backed constant pool.
///
/// `tag[0]`/`offset[0]`/`indirect[0]` are always unused filler (slot 0 is reserved, and slots
/// following a wide entry are also filler, carrying the previous entry's tag so a lookup never
/// indexes out of bounds but any attempt to *use* it as a real entry fails the tag check).
#[derive(Debug, Default)]
pub struct ConstantPool {
    tag: Vec<u8>,
    offset: Vec<u32>,
    indirect: Vec<u32>,
}

const UNUSED_TAG: u8 = 0;

impl ConstantPool {
    /// Creates an empty pool with no pre-allocated capacity.
    #[must_use]
    pub const fn new() -> Self {
        Self { tag: Vec::new(), offset: Vec::new(), indirect: Vec::new() }
    }

    /// Clears the pool's contents while retaining its backing allocation, so the same
    /// `ConstantPool` can be reused for the next classfile in a scan.
    pub fn reset(&mut self) {
        self.tag.clear();
        self.offset.clear();
        self.indirect.clear();
    }

    /// The number of slots, including slot 0 and filler slots after wide entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tag.len()
    }

    /// Whether the pool (beyond the reserved slot 0) has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tag.len() <= 1
    }

    fn tag_at(&self, index: u16) -> Result<Tag, Error> {
        let byte = *self.tag.get(index as usize).ok_or(Error::BadConstantPoolIndex {
            index,
            reason: "index out of range",
        })?;
        Tag::from_u8(byte).ok_or(Error::BadConstantPoolIndex { index, reason: "filler or reserved slot" })
    }

    /// Parses `count - 1` entries (the count as declared in the classfile header, which is one
    /// greater than the number of real entries) from `reader`, starting at slot 1.
    ///
    /// This drives the single linear pass: for each tag, it records the tag and payload offset,
    /// decodes any indirection indices inline (packing two `u16`s into a `u32` for
    /// `NameAndType`), and advances the reader past the payload. It never decodes a `Utf8`
    /// string eagerly — that happens lazily through [`Self::resolve_utf8`].
    pub fn parse_into(&mut self, reader: &mut BufferedReader<'_>, count: u16) -> Result<(), Error> {
        self.reset();
        // Slot 0 filler.
        self.tag.push(UNUSED_TAG);
        self.offset.push(0);
        self.indirect.push(0);

        let mut slot = 1u16;
        while slot < count {
            let tag_byte = reader.read_u1()?;
            let tag = Tag::from_u8(tag_byte).ok_or(Error::UnknownConstantPoolTag(tag_byte))?;
            let offset = u32::try_from(reader.position()).unwrap_or(u32::MAX);
            let indirect = match tag {
                Tag::Utf8 => {
                    let len = reader.read_u2()?;
                    reader.skip(usize::from(len))?;
                    0
                }
                Tag::Integer | Tag::Float => {
                    reader.skip(4)?;
                    0
                }
                Tag::Long | Tag::Double => {
                    reader.skip(8)?;
                    0
                }
                Tag::Class | Tag::String | Tag::Module | Tag::Package => {
                    u32::from(reader.read_u2()?)
                }
                Tag::FieldRef | Tag::MethodRef | Tag::InterfaceMethodRef => {
                    reader.skip(4)?;
                    0
                }
                Tag::NameAndType => {
                    let name_index = reader.read_u2()?;
                    let descriptor_index = reader.read_u2()?;
                    (u32::from(name_index) << 16) | u32::from(descriptor_index)
                }
                Tag::MethodHandle => {
                    reader.skip(3)?;
                    0
                }
                Tag::MethodType => {
                    reader.skip(2)?;
                    0
                }
                Tag::InvokeDynamic => {
                    reader.skip(4)?;
                    0
                }
            };
            self.tag.push(tag as u8);
            self.offset.push(offset);
            self.indirect.push(indirect);
            slot += 1;
            if tag.is_wide() {
                // The following slot is unusable per JVMS 4.4.5; push filler so indices keep
                // lining up, but mark it so a lookup against it fails cleanly.
                self.tag.push(UNUSED_TAG);
                self.offset.push(0);
                self.indirect.push(0);
                slot += 1;
            }
        }
        Ok(())
    }

    fn utf8_span(&self, index: u16, reader: &BufferedReader<'_>) -> Result<(usize, usize), Error> {
        if self.tag_at(index)? != Tag::Utf8 {
            return Err(Error::BadConstantPoolIndex { index, reason: "expected CONSTANT_Utf8" });
        }
        let len_offset = self.offset[index as usize] as usize;
        let len_bytes = reader
            .raw_slice(len_offset, 2)
            .ok_or(Error::UnexpectedEof)?;
        let len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
        Ok((len_offset + 2, len))
    }

    /// Resolves a `CONSTANT_Utf8` entry to an owned `String`.
    ///
    /// `replace_slash_with_dot` converts JVM internal names (`java/lang/Object`) to their
    /// dotted form; `strip_type_descriptor` additionally strips a leading `L`/trailing `;`.
    pub fn resolve_utf8(
        &self,
        index: u16,
        reader: &BufferedReader<'_>,
        replace_slash_with_dot: bool,
        strip_type_descriptor: bool,
    ) -> Result<String, Error> {
        let (offset, len) = self.utf8_span(index, reader)?;
        reader.read_string(offset, len, replace_slash_with_dot, strip_type_descriptor)
    }

    /// Compares a `CONSTANT_Utf8` entry against a literal string, without allocating in the
    /// common case where the byte lengths already differ.
    pub fn utf8_equals(&self, index: u16, reader: &BufferedReader<'_>, literal: &str) -> Result<bool, Error> {
        let (offset, len) = self.utf8_span(index, reader)?;
        reader.string_equals(offset, len, literal)
    }

    /// Resolves a `CONSTANT_Integer` entry's raw 4-byte value.
    pub fn resolve_integer(&self, index: u16, reader: &BufferedReader<'_>) -> Result<i32, Error> {
        if self.tag_at(index)? != Tag::Integer {
            return Err(Error::BadConstantPoolIndex { index, reason: "expected CONSTANT_Integer" });
        }
        let bytes = reader.raw_slice(self.offset[index as usize] as usize, 4).ok_or(Error::UnexpectedEof)?;
        Ok(i32::from_be_bytes(bytes.try_into().expect("4 bytes")))
    }

    /// Resolves a `CONSTANT_Float` entry's raw 4-byte value.
    pub fn resolve_float(&self, index: u16, reader: &BufferedReader<'_>) -> Result<f32, Error> {
        if self.tag_at(index)? != Tag::Float {
            return Err(Error::BadConstantPoolIndex { index, reason: "expected CONSTANT_Float" });
        }
        let bytes = reader.raw_slice(self.offset[index as usize] as usize, 4).ok_or(Error::UnexpectedEof)?;
        Ok(f32::from_be_bytes(bytes.try_into().expect("4 bytes")))
    }

    /// Resolves a `CONSTANT_Long` entry's raw 8-byte value.
    pub fn resolve_long(&self, index: u16, reader: &BufferedReader<'_>) -> Result<i64, Error> {
        if self.tag_at(index)? != Tag::Long {
            return Err(Error::BadConstantPoolIndex { index, reason: "expected CONSTANT_Long" });
        }
        let bytes = reader.raw_slice(self.offset[index as usize] as usize, 8).ok_or(Error::UnexpectedEof)?;
        Ok(i64::from_be_bytes(bytes.try_into().expect("8 bytes")))
    }

    /// Resolves a `CONSTANT_Double` entry's raw 8-byte value.
    pub fn resolve_double(&self, index: u16, reader: &BufferedReader<'_>) -> Result<f64, Error> {
        if self.tag_at(index)? != Tag::Double {
            return Err(Error::BadConstantPoolIndex { index, reason: "expected CONSTANT_Double" });
        }
        let bytes = reader.raw_slice(self.offset[index as usize] as usize, 8).ok_or(Error::UnexpectedEof)?;
        Ok(f64::from_be_bytes(bytes.try_into().expect("8 bytes")))
    }

    /// Resolves a `CONSTANT_Class` entry's name, dot-separated.
    pub fn resolve_class_name(&self, index: u16, reader: &BufferedReader<'_>) -> Result<String, Error> {
        if self.tag_at(index)? != Tag::Class {
            return Err(Error::BadConstantPoolIndex { index, reason: "expected CONSTANT_Class" });
        }
        let name_index = self.indirect[index as usize] as u16;
        self.resolve_utf8(name_index, reader, true, false)
    }

    /// Resolves a `CONSTANT_Class` entry's name exactly as encoded: slash-separated, and (for an
    /// array type) still carrying its full field-descriptor form (e.g. `[Ljava/lang/String;`)
    /// rather than a bare binary name. Used by the reference collector, which must distinguish
    /// the two shapes before any slash-to-dot rewriting happens.
    pub(crate) fn resolve_class_name_raw(&self, index: u16, reader: &BufferedReader<'_>) -> Result<String, Error> {
        if self.tag_at(index)? != Tag::Class {
            return Err(Error::BadConstantPoolIndex { index, reason: "expected CONSTANT_Class" });
        }
        let name_index = self.indirect[index as usize] as u16;
        self.resolve_utf8(name_index, reader, false, false)
    }

    /// Resolves a `CONSTANT_String` entry's value.
    pub fn resolve_string(&self, index: u16, reader: &BufferedReader<'_>) -> Result<String, Error> {
        if self.tag_at(index)? != Tag::String {
            return Err(Error::BadConstantPoolIndex { index, reason: "expected CONSTANT_String" });
        }
        let utf8_index = self.indirect[index as usize] as u16;
        self.resolve_utf8(utf8_index, reader, false, false)
    }

    /// Resolves a `CONSTANT_Module` or `CONSTANT_Package` entry's name.
    pub fn resolve_module_or_package_name(
        &self,
        index: u16,
        reader: &BufferedReader<'_>,
    ) -> Result<String, Error> {
        let tag = self.tag_at(index)?;
        if tag != Tag::Module && tag != Tag::Package {
            return Err(Error::BadConstantPoolIndex {
                index,
                reason: "expected CONSTANT_Module or CONSTANT_Package",
            });
        }
        let name_index = self.indirect[index as usize] as u16;
        self.resolve_utf8(name_index, reader, true, false)
    }

    /// Resolves a `CONSTANT_NameAndType` entry into its name and descriptor strings.
    pub fn resolve_name_and_type(
        &self,
        index: u16,
        reader: &BufferedReader<'_>,
    ) -> Result<(String, String), Error> {
        if self.tag_at(index)? != Tag::NameAndType {
            return Err(Error::BadConstantPoolIndex { index, reason: "expected CONSTANT_NameAndType" });
        }
        let packed = self.indirect[index as usize];
        let name_index = (packed >> 16) as u16;
        let descriptor_index = packed as u16;
        let name = self.resolve_utf8(name_index, reader, false, false)?;
        let descriptor = self.resolve_utf8(descriptor_index, reader, false, false)?;
        Ok((name, descriptor))
    }

    /// Returns the tag of every live slot (skipping slot 0 and filler slots), paired with its
    /// index, for the reference collector's dependency walk.
    pub fn entries(&self) -> impl Iterator<Item = (u16, Tag)> + '_ {
        self.tag.iter().enumerate().skip(1).filter_map(|(i, &byte)| {
            Tag::from_u8(byte).map(|tag| (u16::try_from(i).expect("pool index fits u16"), tag))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_utf8_and_class_entry() {
        // count = 3: slot1 = Utf8 "Foo", slot2 = Class -> slot1
        let mut buf = Vec::new();
        buf.push(1u8); // tag Utf8
        buf.extend_from_slice(&3u16.to_be_bytes());
        buf.extend_from_slice(b"Foo");
        buf.push(7u8); // tag Class
        buf.extend_from_slice(&1u16.to_be_bytes());

        let mut reader = BufferedReader::new(&buf);
        let mut pool = ConstantPool::new();
        pool.parse_into(&mut reader, 3).unwrap();

        assert_eq!(pool.resolve_utf8(1, &reader, false, false).unwrap(), "Foo");
        assert_eq!(pool.resolve_class_name(2, &reader).unwrap(), "Foo");
    }

    #[test]
    fn long_entry_occupies_two_slots() {
        let mut buf = Vec::new();
        buf.push(5u8); // Long
        buf.extend_from_slice(&0u64.to_be_bytes());
        buf.push(1u8); // Utf8
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(b"x");

        let mut reader = BufferedReader::new(&buf);
        let mut pool = ConstantPool::new();
        // count = 4: slot1 = Long (+slot2 filler), slot3 = Utf8
        pool.parse_into(&mut reader, 4).unwrap();

        assert!(pool.resolve_utf8(2, &reader, false, false).is_err());
        assert_eq!(pool.resolve_utf8(3, &reader, false, false).unwrap(), "x");
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let buf = [17u8]; // CONSTANT_Dynamic, deliberately unsupported
        let mut reader = BufferedReader::new(&buf);
        let mut pool = ConstantPool::new();
        let err = pool.parse_into(&mut reader, 2).unwrap_err();
        assert!(matches!(err, Error::UnknownConstantPoolTag(17)));
    }

    #[test]
    fn reset_allows_reuse_across_classfiles() {
        let buf = [1u8, 0, 1, b'a'];
        let mut reader = BufferedReader::new(&buf);
        let mut pool = ConstantPool::new();
        pool.parse_into(&mut reader, 2).unwrap();
        assert_eq!(pool.len(), 2);
        pool.reset();
        assert!(pool.is_empty());
    }
}
