//! Decoding of `annotation` and `element_value` structures (JVMS §4.7.16).
//!
//! Annotations appear in several classfile locations with the same inner grammar: class-level
//! `RuntimeVisibleAnnotations`, per-field, per-method, and per-parameter. This module owns only
//! the grammar itself; callers in [`crate::parsing`] are responsible for locating the
//! `num_annotations` count and handing this module a reader positioned right after it.

use crate::parsing::errors::Error;
use crate::pool::ConstantPool;
use crate::reader::BufferedReader;

/// A single parsed annotation: `@Name(key = value, ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// The annotation interface's type descriptor, e.g. `Ljava/lang/Deprecated;`.
    pub type_descriptor: String,
    /// The annotation's element-value pairs, in declaration order.
    pub elements: Vec<(String, ElementValue)>,
}

/// A decoded annotation `element_value`.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// A `byte` constant.
    Byte(i32),
    /// A `char` constant.
    Char(u16),
    /// A `double` constant.
    Double(f64),
    /// A `float` constant.
    Float(f32),
    /// An `int` constant.
    Int(i32),
    /// A `long` constant.
    Long(i64),
    /// A `short` constant.
    Short(i32),
    /// A `boolean` constant.
    Boolean(bool),
    /// A `String` constant.
    String(String),
    /// An enum constant: the enum's type descriptor and the constant's name.
    Enum {
        /// The enum type's descriptor.
        type_descriptor: String,
        /// The constant's name.
        const_name: String,
    },
    /// A `Class` literal, stored as the referenced type's descriptor.
    Class(String),
    /// A nested annotation.
    Annotation(Box<Annotation>),
    /// An array of element values.
    Array(Vec<ElementValue>),
}

fn read_element_value(
    reader: &mut BufferedReader<'_>,
    pool: &ConstantPool,
) -> Result<ElementValue, Error> {
    let tag = reader.read_u1()? as char;
    Ok(match tag {
        'B' => ElementValue::Byte(pool.resolve_integer(reader.read_u2()?, reader)?),
        'C' => ElementValue::Char(pool.resolve_integer(reader.read_u2()?, reader)? as u16),
        'D' => ElementValue::Double(pool.resolve_double(reader.read_u2()?, reader)?),
        'F' => ElementValue::Float(pool.resolve_float(reader.read_u2()?, reader)?),
        'I' => ElementValue::Int(pool.resolve_integer(reader.read_u2()?, reader)?),
        'J' => ElementValue::Long(pool.resolve_long(reader.read_u2()?, reader)?),
        'S' => ElementValue::Short(pool.resolve_integer(reader.read_u2()?, reader)?),
        'Z' => ElementValue::Boolean(pool.resolve_integer(reader.read_u2()?, reader)? != 0),
        's' => {
            let index = reader.read_u2()?;
            ElementValue::String(pool.resolve_utf8(index, reader, false, false)?)
        }
        'e' => {
            let type_index = reader.read_u2()?;
            let const_name_index = reader.read_u2()?;
            ElementValue::Enum {
                type_descriptor: pool.resolve_utf8(type_index, reader, false, false)?,
                const_name: pool.resolve_utf8(const_name_index, reader, false, false)?,
            }
        }
        'c' => {
            let class_info_index = reader.read_u2()?;
            ElementValue::Class(pool.resolve_utf8(class_info_index, reader, false, false)?)
        }
        '@' => ElementValue::Annotation(Box::new(read_annotation(reader, pool)?)),
        '[' => {
            let count = reader.read_u2()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(read_element_value(reader, pool)?);
            }
            ElementValue::Array(values)
        }
        other => return Err(Error::InvalidElementValueTag(other)),
    })
}

/// Reads a single bare `element_value`, as used by an `AnnotationDefault` attribute (which
/// stores one value with no enclosing annotation or element name).
pub(crate) fn read_element_value_public(
    reader: &mut BufferedReader<'_>,
    pool: &ConstantPool,
) -> Result<ElementValue, Error> {
    read_element_value(reader, pool)
}

/// Reads one `annotation` structure (a type-descriptor index followed by `num_element_value_pairs`
/// name/value pairs).
pub fn read_annotation(reader: &mut BufferedReader<'_>, pool: &ConstantPool) -> Result<Annotation, Error> {
    let type_index = reader.read_u2()?;
    let type_descriptor = pool.resolve_utf8(type_index, reader, false, false)?;
    let pair_count = reader.read_u2()?;
    let mut elements = Vec::with_capacity(pair_count as usize);
    for _ in 0..pair_count {
        let name_index = reader.read_u2()?;
        let name = pool.resolve_utf8(name_index, reader, false, false)?;
        let value = read_element_value(reader, pool)?;
        elements.push((name, value));
    }
    Ok(Annotation { type_descriptor, elements })
}

/// Reads a `num_annotations`-prefixed list of [`Annotation`]s, as used for
/// `RuntimeVisibleAnnotations`/`RuntimeInvisibleAnnotations` attributes.
pub fn read_annotations(reader: &mut BufferedReader<'_>, pool: &ConstantPool) -> Result<Vec<Annotation>, Error> {
    let count = reader.read_u2()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(read_annotation(reader, pool)?);
    }
    Ok(annotations)
}

/// Reads a per-parameter annotation matrix, as used for
/// `RuntimeVisibleParameterAnnotations`/`RuntimeInvisibleParameterAnnotations`: a
/// `num_parameters`-prefixed list, each itself a `num_annotations`-prefixed list.
pub fn read_parameter_annotations(
    reader: &mut BufferedReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<Vec<Annotation>>, Error> {
    let num_parameters = reader.read_u1()?;
    let mut matrix = Vec::with_capacity(num_parameters as usize);
    for _ in 0..num_parameters {
        matrix.push(read_annotations(reader, pool)?);
    }
    Ok(matrix)
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
    fn decodes_marker_annotation() {
        let mut buf = Vec::new();
        utf8_entry(&mut buf, "Ljava/lang/Deprecated;");
        let pool_end = buf.len();
        buf.extend_from_slice(&1u16.to_be_bytes()); // type_index
        buf.extend_from_slice(&0u16.to_be_bytes()); // num_pairs

        let mut reader = BufferedReader::new(&buf);
        let mut pool = ConstantPool::new();
        pool.parse_into(&mut reader, 2).unwrap();
        assert_eq!(reader.position(), pool_end);

        let annotation = read_annotation(&mut reader, &pool).unwrap();
        assert_eq!(annotation.type_descriptor, "Ljava/lang/Deprecated;");
        assert!(annotation.elements.is_empty());
    }

    #[test]
    fn decodes_string_element_value() {
        let mut buf = Vec::new();
        utf8_entry(&mut buf, "Lcom/example/Named;");
        utf8_entry(&mut buf, "value");
        utf8_entry(&mut buf, "hello");
        buf.extend_from_slice(&1u16.to_be_bytes()); // type_index
        buf.extend_from_slice(&1u16.to_be_bytes()); // num_pairs
        buf.extend_from_slice(&2u16.to_be_bytes()); // name_index -> "value"
        buf.push(b's');
        buf.extend_from_slice(&3u16.to_be_bytes()); // const_value_index -> "hello"

        let mut reader = BufferedReader::new(&buf);
        let mut pool = ConstantPool::new();
        pool.parse_into(&mut reader, 4).unwrap();

        let annotation = read_annotation(&mut reader, &pool).unwrap();
        assert_eq!(annotation.elements.len(), 1);
        assert_eq!(annotation.elements[0].0, "value");
        assert_eq!(annotation.elements[0].1, ElementValue::String("hello".to_owned()));
    }

    #[test]
    fn decodes_nested_array_of_enums() {
        let mut buf = Vec::new();
        utf8_entry(&mut buf, "Lcom/example/Named;"); // 1
        utf8_entry(&mut buf, "values"); // 2
        utf8_entry(&mut buf, "Lcom/example/Color;"); // 3
        utf8_entry(&mut buf, "RED"); // 4
        utf8_entry(&mut buf, "BLUE"); // 5
        buf.extend_from_slice(&1u16.to_be_bytes()); // type_index
        buf.extend_from_slice(&1u16.to_be_bytes()); // num_pairs
        buf.extend_from_slice(&2u16.to_be_bytes()); // name_index -> "values"
        buf.push(b'[');
        buf.extend_from_slice(&2u16.to_be_bytes()); // array length
        buf.push(b'e');
        buf.extend_from_slice(&3u16.to_be_bytes());
        buf.extend_from_slice(&4u16.to_be_bytes());
        buf.push(b'e');
        buf.extend_from_slice(&3u16.to_be_bytes());
        buf.extend_from_slice(&5u16.to_be_bytes());

        let mut reader = BufferedReader::new(&buf);
        let mut pool = ConstantPool::new();
        pool.parse_into(&mut reader, 6).unwrap();

        let annotation = read_annotation(&mut reader, &pool).unwrap();
        let ElementValue::Array(values) = &annotation.elements[0].1 else {
            panic!("expected array element value");
        };
        assert_eq!(values.len(), 2);
        assert!(matches!(&values[0], ElementValue::Enum { const_name, .. } if const_name == "RED"));
    }
}
