//! Extracting referenced class names from a classfile's constant pool and annotations (§4.5).
//!
//! Three distinct sources feed the set of classes a classfile "refers to" for dependency
//! tracking: every `CONSTANT_Class` slot, the descriptor half of every `CONSTANT_NameAndType`
//! slot (which backs `Fieldref`/`Methodref`/`InterfaceMethodref`/`InvokeDynamic` entries, none of
//! which this crate otherwise retains), and every annotation the class, its fields, or its
//! methods carry. The first two get delegated to [`crate::signature`] once non-trivial (array or
//! method) structure is involved, since this module owns only the constant-pool walk, not
//! descriptor grammar; the third is shared with [`crate::discovery::ExternalClassDiscoverer`],
//! which needs the same annotation traversal for its own, separate purpose (scheduling external
//! classes rather than recording dependencies).
//!
//! Per the open-question resolution recorded in `DESIGN.md`, `CONSTANT_Module` (tag 19) does
//! *not* contribute to this set even though it shares `CONSTANT_Class`'s indirection shape:
//! modules and classes are different namespaces.

use itertools::Itertools;

use crate::annotation::{Annotation, ElementValue};
use crate::class::{FieldInfo, MethodInfo};
use crate::parsing::errors::Error;
use crate::pool::{ConstantPool, Tag};
use crate::reader::BufferedReader;
use crate::signature::{FindReferencedClassNames, MethodTypeSignature, TypeSignature};

/// Walks every live constant-pool slot, plus every class/field/method/parameter annotation, and
/// returns the set of binary class names this classfile structurally depends on, in first-seen
/// order with duplicates removed.
///
/// This is the only entry point [`crate::parsing::class_parser`] needs; it is skipped entirely
/// when [`crate::parsing::ScanConfig::enable_inter_class_dependencies`] is unset, since walking
/// every constant-pool entry and re-parsing every descriptor is the most expensive optional pass
/// in the parser.
pub(crate) fn collect_referenced_class_names(
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
    class_annotations: &[Annotation],
    fields: &[FieldInfo],
    methods: &[MethodInfo],
) -> Result<Vec<String>, Error> {
    let mut names = Vec::new();
    for (index, tag) in pool.entries() {
        match tag {
            Tag::Class => collect_class_ref(pool, reader, index, &mut names)?,
            Tag::NameAndType => collect_name_and_type_ref(pool, reader, index, &mut names)?,
            _ => {}
        }
    }
    for annotation in class_annotations {
        push_annotation_class_names(annotation, &mut names)?;
    }
    for field in fields {
        for annotation in &field.annotations {
            push_annotation_class_names(annotation, &mut names)?;
        }
    }
    for method in methods {
        for annotation in &method.annotations {
            push_annotation_class_names(annotation, &mut names)?;
        }
        for parameter in &method.parameter_annotations {
            for annotation in parameter {
                push_annotation_class_names(annotation, &mut names)?;
            }
        }
    }
    let names = names.into_iter().unique().collect::<Vec<_>>();
    Ok(names)
}

/// Every class name `annotation` itself refers to, walked recursively: its own type descriptor,
/// each `Enum`/`Class` element-value payload, and the contents of any nested `Annotation` or
/// `Array`. Shared by [`collect_referenced_class_names`] above and `discovery`'s own
/// annotation-name walk, the two call sites that both need this same traversal.
pub(crate) fn push_annotation_class_names(annotation: &Annotation, out: &mut Vec<String>) -> Result<(), Error> {
    push_type_descriptor(&annotation.type_descriptor, out)?;
    for (_, value) in &annotation.elements {
        push_element_value_class_names(value, out)?;
    }
    Ok(())
}

fn push_element_value_class_names(value: &ElementValue, out: &mut Vec<String>) -> Result<(), Error> {
    match value {
        ElementValue::Enum { type_descriptor, .. } => push_type_descriptor(type_descriptor, out),
        ElementValue::Class(descriptor) => push_type_descriptor(descriptor, out),
        ElementValue::Annotation(nested) => push_annotation_class_names(nested, out),
        ElementValue::Array(values) => {
            for value in values {
                push_element_value_class_names(value, out)?;
            }
            Ok(())
        }
        ElementValue::Byte(_)
        | ElementValue::Char(_)
        | ElementValue::Double(_)
        | ElementValue::Float(_)
        | ElementValue::Int(_)
        | ElementValue::Long(_)
        | ElementValue::Short(_)
        | ElementValue::Boolean(_)
        | ElementValue::String(_) => Ok(()),
    }
}

/// An element-value type descriptor (unlike a `CONSTANT_Class` entry's raw text) may also name a
/// primitive or void type, which contributes nothing.
fn push_type_descriptor(descriptor: &str, out: &mut Vec<String>) -> Result<(), Error> {
    if let Some(name) = descriptor.strip_prefix('L').and_then(|rest| rest.strip_suffix(';')) {
        out.push(name.replace('/', "."));
    } else if descriptor.starts_with('[') {
        let sig = TypeSignature::parse(descriptor)?;
        sig.find_referenced_class_names(out);
    }
    Ok(())
}

/// A `CONSTANT_Class` entry's raw (slash-separated, undecorated) text is usually a bare binary
/// name, but for an array type (e.g. `[Ljava/lang/String;`) it is a full field descriptor. Only
/// the latter needs the signature parser; a bare name is resolved directly to avoid the
/// round-trip through `TypeSignature` for the overwhelmingly common case.
fn collect_class_ref(
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
    index: u16,
    out: &mut Vec<String>,
) -> Result<(), Error> {
    let raw = pool.resolve_class_name_raw(index, reader)?;
    if raw.starts_with('[') {
        let sig = TypeSignature::parse(&raw)?;
        sig.find_referenced_class_names(out);
    } else {
        out.push(raw.replace('/', "."));
    }
    Ok(())
}

/// Only the descriptor (type) half of a `NameAndType` entry carries structural references; the
/// name half is a bare identifier.
fn collect_name_and_type_ref(
    pool: &ConstantPool,
    reader: &BufferedReader<'_>,
    index: u16,
    out: &mut Vec<String>,
) -> Result<(), Error> {
    let (name, descriptor) = pool.resolve_name_and_type(index, reader)?;
    if descriptor.contains('(') || name == "<init>" {
        let sig = MethodTypeSignature::parse(&descriptor)?;
        sig.find_referenced_class_names(out);
    } else {
        let sig = TypeSignature::parse(&descriptor)?;
        sig.find_referenced_class_names(out);
    }
    Ok(())
}
