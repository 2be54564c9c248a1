//! Reading an `attribute_info` table (JVMS §4.7): the one part of the format that genuinely
//! needs unknown-entry tolerance, since the set of attribute names a JVM implementation
//! recognizes is allowed to grow without invalidating older readers.
//!
//! An attribute whose name this parser doesn't recognize is skipped by its declared
//! `attribute_length`, not treated as an error. A classfile attribute list is explicitly
//! extensible by the JVM format; failing the whole classfile over an attribute this crate
//! doesn't know about would be over-strict.

use crate::annotation::{self, Annotation, ElementValue};
use crate::parsing::errors::Error;
use crate::pool::ConstantPool;
use crate::reader::BufferedReader;

/// One raw, not-yet-decoded attribute table entry: its name and the byte span of its payload.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawAttribute {
    name_index: u16,
    offset: usize,
    length: u32,
}

/// Reads an `attributes_count`-prefixed attribute table, recording each entry's name and
/// payload span without decoding any of them yet.
pub(crate) fn read_attribute_table(reader: &mut BufferedReader<'_>) -> Result<Vec<RawAttribute>, Error> {
    let count = reader.read_u2()?;
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()?;
        let offset = reader.position();
        reader.skip(length as usize)?;
        attributes.push(RawAttribute { name_index, offset, length });
    }
    Ok(attributes)
}

impl RawAttribute {
    fn window<'a>(&self, reader: &BufferedReader<'a>) -> Result<BufferedReader<'a>, Error> {
        reader.window(self.offset, self.length as usize)
    }
}

/// Finds the single attribute named `name` in `attrs`, if any, erroring if it appears more than
/// once (per-attribute-table uniqueness is required by JVMS §4.7 for every attribute this
/// parser decodes).
pub(crate) fn find_unique<'r, 'a>(
    attrs: &'r [RawAttribute],
    pool: &ConstantPool,
    reader: &BufferedReader<'a>,
    name: &str,
) -> Result<Option<&'r RawAttribute>, Error> {
    let mut found = None;
    for attr in attrs {
        if pool.utf8_equals(attr.name_index, reader, name)? {
            if found.replace(attr).is_some() {
                return Err(Error::BadConstantPoolIndex {
                    index: attr.name_index,
                    reason: "duplicate attribute in table",
                });
            }
        }
    }
    Ok(found)
}

/// Whether an attribute named `name` is present at all (used for marker attributes like
/// `Synthetic`/`Deprecated` that carry no payload).
pub(crate) fn contains(
    attrs: &[RawAttribute],
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
    name: &str,
) -> Result<bool, Error> {
    for attr in attrs {
        if pool.utf8_equals(attr.name_index, reader, name)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Decodes a `Signature` attribute's referenced UTF8 into a raw descriptor/signature string,
/// leaving grammar parsing to [`crate::signature`].
pub(crate) fn read_signature_attribute(
    attr: &RawAttribute,
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
) -> Result<String, Error> {
    let mut window = attr.window(reader)?;
    let index = window.read_u2()?;
    pool.resolve_utf8(index, reader, false, false)
}

/// Decodes a `ConstantValue` attribute's raw constant-pool index, leaving tag-based
/// interpretation (int/float/long/double/String) to the caller, which knows the field's
/// descriptor.
pub(crate) fn read_constant_value_index(
    attr: &RawAttribute,
    reader: &BufferedReader<'_>,
) -> Result<u16, Error> {
    let mut window = attr.window(reader)?;
    window.read_u2()
}

/// Decodes a `RuntimeVisibleAnnotations`/`RuntimeInvisibleAnnotations` attribute.
pub(crate) fn read_annotations_attribute(
    attr: &RawAttribute,
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
) -> Result<Vec<Annotation>, Error> {
    let mut window = attr.window(reader)?;
    annotation::read_annotations(&mut window, pool)
}

/// Decodes a `RuntimeVisibleParameterAnnotations`/`RuntimeInvisibleParameterAnnotations`
/// attribute.
pub(crate) fn read_parameter_annotations_attribute(
    attr: &RawAttribute,
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
) -> Result<Vec<Vec<Annotation>>, Error> {
    let mut window = attr.window(reader)?;
    annotation::read_parameter_annotations(&mut window, pool)
}

/// Decodes an `AnnotationDefault` attribute: a single bare `element_value`.
pub(crate) fn read_annotation_default_attribute(
    attr: &RawAttribute,
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
) -> Result<ElementValue, Error> {
    let mut window = attr.window(reader)?;
    annotation::read_element_value_public(&mut window, pool)
}

/// Decodes a `MethodParameters` attribute into per-parameter `(name, modifiers)` pairs (§3:
/// "optional parameter names" and "optional parameter modifiers"). A zero `name_index` yields
/// `None` rather than an empty string, per §8's "`MethodParameters` with a zero cp-index yields
/// a null parameter name".
pub(crate) fn read_method_parameters_attribute(
    attr: &RawAttribute,
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
) -> Result<Vec<(Option<String>, u16)>, Error> {
    let mut window = attr.window(reader)?;
    let count = window.read_u1()?;
    let mut params = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_index = window.read_u2()?;
        let access_flags = window.read_u2()?;
        let name = if name_index == 0 {
            None
        } else {
            Some(pool.resolve_utf8(name_index, reader, false, false)?)
        };
        params.push((name, access_flags));
    }
    Ok(params)
}

/// Decodes an `InnerClasses` attribute into `(inner, outer, inner_name, flags)` tuples.
pub(crate) fn read_inner_classes_attribute(
    attr: &RawAttribute,
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
) -> Result<Vec<(String, Option<String>, Option<String>, u16)>, Error> {
    let mut window = attr.window(reader)?;
    let count = window.read_u2()?;
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let inner_class_info_index = window.read_u2()?;
        let outer_class_info_index = window.read_u2()?;
        let inner_name_index = window.read_u2()?;
        let access_flags = window.read_u2()?;
        let inner_class = pool.resolve_class_name(inner_class_info_index, reader)?;
        let outer_class = if outer_class_info_index == 0 {
            None
        } else {
            Some(pool.resolve_class_name(outer_class_info_index, reader)?)
        };
        let inner_name = if inner_name_index == 0 {
            None
        } else {
            Some(pool.resolve_utf8(inner_name_index, reader, false, false)?)
        };
        entries.push((inner_class, outer_class, inner_name, access_flags));
    }
    Ok(entries)
}

/// Decodes a `Module` attribute's `module_name` index, discarding everything else in its payload
/// (requires, exports, opens, uses, provides) — §1 scopes full module-descriptor parsing out.
pub(crate) fn read_module_name_attribute(
    attr: &RawAttribute,
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
) -> Result<String, Error> {
    let mut window = attr.window(reader)?;
    let module_name_index = window.read_u2()?;
    pool.resolve_module_or_package_name(module_name_index, reader)
}

/// Decodes an `EnclosingMethod` attribute.
pub(crate) fn read_enclosing_method_attribute(
    attr: &RawAttribute,
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
) -> Result<(String, Option<(String, String)>), Error> {
    let mut window = attr.window(reader)?;
    let class_index = window.read_u2()?;
    let method_index = window.read_u2()?;
    let class_name = pool.resolve_class_name(class_index, reader)?;
    let method = if method_index == 0 {
        None
    } else {
        Some(pool.resolve_name_and_type(method_index, reader)?)
    };
    Ok((class_name, method))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8_entry(buf: &mut Vec<u8>, s: &str) {
        buf.push(1u8);
        buf.extend_from_slice(&(s.len() as u16).to_be_bytes());
        buf.extend_from_slice(s.as_bytes());
    }

    #[test]
    fn unknown_attribute_is_skipped_not_errored() {
        let mut buf = Vec::new();
        utf8_entry(&mut buf, "SomeFutureAttribute");
        buf.extend_from_slice(&1u16.to_be_bytes()); // attributes_count
        buf.extend_from_slice(&1u16.to_be_bytes()); // name_index
        buf.extend_from_slice(&3u32.to_be_bytes()); // length
        buf.extend_from_slice(&[0xAA, 0xBB, 0xCC]); // payload, uninterpreted

        let mut reader = BufferedReader::new(&buf);
        let mut pool = ConstantPool::new();
        pool.parse_into(&mut reader, 2).unwrap();

        let attrs = read_attribute_table(&mut reader).unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(reader.position(), buf.len());
        assert!(find_unique(&attrs, &pool, &reader, "Deprecated").unwrap().is_none());
    }

    #[test]
    fn duplicate_unique_attribute_is_an_error() {
        let mut buf = Vec::new();
        utf8_entry(&mut buf, "Deprecated");
        buf.extend_from_slice(&2u16.to_be_bytes()); // attributes_count
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());

        let mut reader = BufferedReader::new(&buf);
        let mut pool = ConstantPool::new();
        pool.parse_into(&mut reader, 2).unwrap();

        let attrs = read_attribute_table(&mut reader).unwrap();
        assert!(find_unique(&attrs, &pool, &reader, "Deprecated").is_err());
    }

    proptest::proptest! {
        /// Skipping any sequence of unrecognized attributes must always land the reader exactly
        /// at the end of the table, regardless of how many entries or how large their payloads
        /// are: the skip is computed from `attribute_length` alone, never from interpreting the
        /// payload bytes.
        #[test]
        fn skipping_unknown_attributes_always_lands_on_the_table_end(
            payload_lengths in proptest::collection::vec(0u32..64, 0..8),
        ) {
            let mut buf = Vec::new();
            utf8_entry(&mut buf, "SomeFutureAttribute");
            buf.extend_from_slice(&(payload_lengths.len() as u16).to_be_bytes());
            for len in &payload_lengths {
                buf.extend_from_slice(&1u16.to_be_bytes());
                buf.extend_from_slice(&len.to_be_bytes());
                buf.extend(std::iter::repeat(0xAAu8).take(*len as usize));
            }

            let mut reader = BufferedReader::new(&buf);
            let mut pool = ConstantPool::new();
            pool.parse_into(&mut reader, 2).unwrap();

            let attrs = read_attribute_table(&mut reader).unwrap();
            prop_assert_eq!(attrs.len(), payload_lengths.len());
            prop_assert_eq!(reader.position(), buf.len());
        }
    }
}
