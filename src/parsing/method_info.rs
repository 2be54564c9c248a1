//! Parsing a single `method_info` structure (JVMS §4.6).

use crate::class::{MethodAccessFlags, MethodInfo};
use crate::parsing::attribute;
use crate::parsing::config::ScanConfig;
use crate::parsing::errors::Error;
use crate::parsing::field_info::read_combined_annotations;
use crate::pool::ConstantPool;
use crate::reader::BufferedReader;
use crate::signature::MethodTypeSignature;

/// Parses one `method_info` entry.
///
/// A method "has a body" (§3) when it carries a `Code` attribute; `native` and `abstract`
/// methods never do, and this parser does not decode the `Code` attribute's contents at all
/// (bytecode decoding is out of scope) — only its presence is recorded.
pub(crate) fn parse_method(
    reader: &mut BufferedReader<'_>,
    pool: &ConstantPool,
    config: &ScanConfig,
) -> Result<MethodInfo, Error> {
    let access_bits = reader.read_u2()?;
    let access_flags = MethodAccessFlags::from_bits(access_bits)
        .ok_or(Error::UnknownAccessFlags { bits: access_bits, context: "method_info" })?;
    let name_index = reader.read_u2()?;
    let name = pool.resolve_utf8(name_index, reader, false, false)?;
    let descriptor_index = reader.read_u2()?;
    let descriptor_str = pool.resolve_utf8(descriptor_index, reader, false, false)?;
    let descriptor = MethodTypeSignature::parse(&descriptor_str)?;

    let attrs = attribute::read_attribute_table(reader)?;

    let has_body = attribute::find_unique(&attrs, pool, reader, "Code")?.is_some();

    // `Signature`, `MethodParameters`, and `AnnotationDefault` carry no retention flag of their
    // own (§4.4.7): decoded whenever present, travelling with the `MethodInfo` if it is retained.
    let generic_signature = match attribute::find_unique(&attrs, pool, reader, "Signature")? {
        Some(attr) => {
            let raw = attribute::read_signature_attribute(attr, pool, reader)?;
            Some(MethodTypeSignature::parse(&raw)?)
        }
        None => None,
    };

    let (parameter_names, parameter_modifiers) =
        match attribute::find_unique(&attrs, pool, reader, "MethodParameters")? {
            Some(attr) => {
                let params = attribute::read_method_parameters_attribute(attr, pool, reader)?;
                let (names, modifiers): (Vec<_>, Vec<_>) = params.into_iter().unzip();
                (Some(names), Some(modifiers))
            }
            None => (None, None),
        };

    let parameter_annotations = if config.enable_annotation_info {
        let mut matrix = Vec::new();
        if let Some(attr) =
            attribute::find_unique(&attrs, pool, reader, "RuntimeVisibleParameterAnnotations")?
        {
            matrix = attribute::read_parameter_annotations_attribute(attr, pool, reader)?;
        }
        if !config.disable_runtime_invisible_annotations {
            if let Some(attr) =
                attribute::find_unique(&attrs, pool, reader, "RuntimeInvisibleParameterAnnotations")?
            {
                let invisible = attribute::read_parameter_annotations_attribute(attr, pool, reader)?;
                if matrix.is_empty() {
                    matrix = invisible;
                } else {
                    for (slot, more) in matrix.iter_mut().zip(invisible) {
                        slot.extend(more);
                    }
                }
            }
        }
        matrix
    } else {
        Vec::new()
    };

    let annotations = if config.enable_annotation_info {
        read_combined_annotations(&attrs, pool, reader, config.disable_runtime_invisible_annotations)?
    } else {
        Vec::new()
    };

    let annotation_default = match attribute::find_unique(&attrs, pool, reader, "AnnotationDefault")? {
        Some(attr) => Some(attribute::read_annotation_default_attribute(attr, pool, reader)?),
        None => None,
    };

    Ok(MethodInfo {
        name,
        access_flags,
        descriptor,
        generic_signature,
        parameter_names,
        parameter_modifiers,
        parameter_annotations,
        annotations,
        annotation_default,
        has_body,
    })
}
