//! Parsing a single `field_info` structure (JVMS §4.5).

use crate::class::{ConstantValue, FieldAccessFlags, FieldInfo};
use crate::parsing::attribute::{self, RawAttribute};
use crate::parsing::config::ScanConfig;
use crate::parsing::errors::Error;
use crate::pool::ConstantPool;
use crate::reader::BufferedReader;
use crate::signature::TypeSignature;

/// Parses one `field_info` entry, starting right after the previous member (or the
/// `fields_count` itself) and ending after this field's attribute table.
pub(crate) fn parse_field(
    reader: &mut BufferedReader<'_>,
    pool: &ConstantPool,
    config: &ScanConfig,
) -> Result<FieldInfo, Error> {
    let access_bits = reader.read_u2()?;
    let access_flags = FieldAccessFlags::from_bits(access_bits)
        .ok_or(Error::UnknownAccessFlags { bits: access_bits, context: "field_info" })?;
    let name_index = reader.read_u2()?;
    let name = pool.resolve_utf8(name_index, reader, false, false)?;
    let descriptor_index = reader.read_u2()?;
    let descriptor_str = pool.resolve_utf8(descriptor_index, reader, false, false)?;
    let descriptor = TypeSignature::parse(&descriptor_str)?;

    let attrs = attribute::read_attribute_table(reader)?;

    // `Signature` carries no retention flag of its own (§4.4.6): it is decoded whenever present,
    // and simply travels with the rest of the `FieldInfo` if one ends up retained.
    let generic_signature = match attribute::find_unique(&attrs, pool, reader, "Signature")? {
        Some(attr) => {
            let raw = attribute::read_signature_attribute(attr, pool, reader)?;
            Some(TypeSignature::parse(&raw)?)
        }
        None => None,
    };

    let constant_value = if config.enable_static_final_field_constant_initializer_values
        && access_flags.contains(FieldAccessFlags::STATIC | FieldAccessFlags::FINAL)
    {
        match attribute::find_unique(&attrs, pool, reader, "ConstantValue")? {
            Some(attr) => {
                let index = attribute::read_constant_value_index(attr, reader)?;
                Some(resolve_constant_value(pool, reader, &descriptor, index)?)
            }
            None => None,
        }
    } else {
        None
    };

    let annotations = if config.enable_annotation_info {
        read_combined_annotations(&attrs, pool, reader, config.disable_runtime_invisible_annotations)?
    } else {
        Vec::new()
    };

    Ok(FieldInfo { name, access_flags, descriptor, generic_signature, constant_value, annotations })
}

fn resolve_constant_value(
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
    descriptor: &TypeSignature,
    index: u16,
) -> Result<ConstantValue, Error> {
    use crate::signature::PrimitiveType;
    Ok(match descriptor {
        TypeSignature::Primitive(PrimitiveType::Long) => ConstantValue::Long(pool.resolve_long(index, reader)?),
        TypeSignature::Primitive(PrimitiveType::Double) => {
            ConstantValue::Double(pool.resolve_double(index, reader)?)
        }
        TypeSignature::Primitive(PrimitiveType::Float) => {
            ConstantValue::Float(pool.resolve_float(index, reader)?)
        }
        TypeSignature::Primitive(_) => ConstantValue::Integer(pool.resolve_integer(index, reader)?),
        _ => ConstantValue::String(pool.resolve_string(index, reader)?),
    })
}

/// Merges `RuntimeVisibleAnnotations` and (unless `disable_invisible` is set)
/// `RuntimeInvisibleAnnotations`, since this crate does not surface the visible/invisible
/// distinction (§3 treats annotations as a flat list).
pub(crate) fn read_combined_annotations(
    attrs: &[RawAttribute],
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
    disable_invisible: bool,
) -> Result<Vec<crate::annotation::Annotation>, Error> {
    let mut annotations = Vec::new();
    if let Some(attr) = attribute::find_unique(attrs, pool, reader, "RuntimeVisibleAnnotations")? {
        annotations.extend(attribute::read_annotations_attribute(attr, pool, reader)?);
    }
    if !disable_invisible {
        if let Some(attr) = attribute::find_unique(attrs, pool, reader, "RuntimeInvisibleAnnotations")? {
            annotations.extend(attribute::read_annotations_attribute(attr, pool, reader)?);
        }
    }
    Ok(annotations)
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
    fn parses_simple_public_static_final_int_field() {
        let mut buf = Vec::new();
        utf8_entry(&mut buf, "MAX"); // 1
        utf8_entry(&mut buf, "I"); // 2
        buf.extend_from_slice(&3u16.to_be_bytes()); // Integer const
        buf.extend_from_slice(&42i32.to_be_bytes());
        utf8_entry(&mut buf, "ConstantValue"); // 4

        let pool_end = buf.len();
        let mut field_bytes = Vec::new();
        field_bytes.extend_from_slice(&0x0019u16.to_be_bytes()); // public static final
        field_bytes.extend_from_slice(&1u16.to_be_bytes()); // name -> "MAX"
        field_bytes.extend_from_slice(&2u16.to_be_bytes()); // descriptor -> "I"
        field_bytes.extend_from_slice(&1u16.to_be_bytes()); // attributes_count
        field_bytes.extend_from_slice(&4u16.to_be_bytes()); // name_index -> "ConstantValue"
        field_bytes.extend_from_slice(&2u32.to_be_bytes()); // length
        field_bytes.extend_from_slice(&3u16.to_be_bytes()); // const_value_index -> slot 3
        buf.extend_from_slice(&field_bytes);

        // The constant pool's entries index into absolute buffer offsets, so the field table
        // must be parsed against a reader over the *whole* buffer, positioned at the field.
        let mut reader = BufferedReader::new(&buf);
        let mut pool = ConstantPool::new();
        pool.parse_into(&mut reader, 5).unwrap();
        assert_eq!(reader.position(), pool_end);

        let config = ScanConfig::everything();
        let field = parse_field(&mut reader, &pool, &config).unwrap();
        assert_eq!(field.name, "MAX");
        assert_eq!(field.constant_value, Some(ConstantValue::Integer(42)));
    }
}
