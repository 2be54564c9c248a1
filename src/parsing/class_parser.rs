//! The classfile parser orchestrator (§4.4): magic → version → constant pool → basic info →
//! interfaces → fields → methods → class attributes, in that fixed order.

use crate::class::{
    ClassAccessFlags, EnclosingMethod, FieldAccessFlags, InnerClassInfo, MethodAccessFlags, ParsedClass,
};
use crate::parsing::config::ScanConfig;
use crate::parsing::errors::{Error, ParseOutcome, SkipReason};
use crate::parsing::{attribute, field_info, method_info, report};
use crate::pool::ConstantPool;
use crate::reader::BufferedReader;
use crate::references;
use crate::signature::TypeSignature;

const MAGIC: u32 = 0xCAFE_BABE;

/// Parses classfiles one at a time, reusing its own [`ConstantPool`]'s backing arrays across
/// calls (§5: "buffer storage is reused across successive classfiles on that worker").
///
/// A single instance is not meant to be shared across threads; each parallel worker in a scan
/// owns one.
#[derive(Debug, Default)]
pub struct ClassfileParser {
    pool: ConstantPool,
}

/// What a successfully-read classfile resolved to, before any I/O-level error is possible.
enum Outcome {
    Done(ParsedClass),
    Skip(SkipReason),
}

impl ClassfileParser {
    /// Creates a parser with an empty, unallocated constant pool.
    #[must_use]
    pub fn new() -> Self {
        Self { pool: ConstantPool::new() }
    }

    /// Parses one classfile's bytes.
    ///
    /// `relative_path` is the path this classfile's bytes were found at on some classpath
    /// element (e.g. `com/example/Foo.class`), used both for the path/name consistency check
    /// (§4.4 step 4) and for diagnostics. `is_external` is recorded on the resulting
    /// [`ParsedClass`] verbatim — it does not affect parsing, only how the linker treats the
    /// result.
    pub fn parse(
        &mut self,
        buf: &[u8],
        relative_path: &str,
        is_external: bool,
        config: &ScanConfig,
    ) -> ParseOutcome<ParsedClass> {
        let outcome = match self.try_parse(buf, relative_path, is_external, config) {
            Ok(Outcome::Done(class)) => ParseOutcome::Done(class),
            Ok(Outcome::Skip(reason)) => ParseOutcome::Skip(reason),
            Err(err) => ParseOutcome::Error(err),
        };
        report::log_outcome(relative_path, outcome)
    }

    fn try_parse(
        &mut self,
        buf: &[u8],
        relative_path: &str,
        is_external: bool,
        config: &ScanConfig,
    ) -> Result<Outcome, Error> {
        let mut reader = BufferedReader::new(buf);

        let magic = reader.read_u4()?;
        if magic != MAGIC {
            return Err(Error::BadMagic);
        }
        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;

        let cp_count = reader.read_u2()?;
        self.pool.parse_into(&mut reader, cp_count)?;
        let pool = &self.pool;

        let access_bits = reader.read_u2()?;
        let access_flags = ClassAccessFlags::from_bits(access_bits)
            .ok_or(Error::UnknownAccessFlags { bits: access_bits, context: "ClassFile" })?;

        let class_name_index = reader.read_u2()?;
        let name = pool.resolve_class_name(class_name_index, &reader)?;
        if name.is_empty() {
            return Err(Error::EmptyClassName);
        }

        if name == "java.lang.Object" {
            return Ok(Outcome::Skip(SkipReason::ObjectClass));
        }

        let is_module = access_flags.contains(ClassAccessFlags::MODULE);
        let is_package_info = is_package_info_path(relative_path);
        if !config.ignore_class_visibility
            && !access_flags.contains(ClassAccessFlags::PUBLIC)
            && !is_module
            && !is_package_info
        {
            return Ok(Outcome::Skip(SkipReason::NotVisible));
        }

        let expected_path = binary_name_to_path(&name);
        if expected_path != relative_path {
            return Ok(Outcome::Skip(SkipReason::PathNameMismatch {
                path: relative_path.to_owned(),
                class_name: name,
            }));
        }

        let super_class_index = reader.read_u2()?;
        let super_class = if super_class_index == 0 {
            None
        } else {
            Some(pool.resolve_class_name(super_class_index, &reader)?)
        };

        let interfaces_count = reader.read_u2()?;
        let mut interfaces = Vec::with_capacity(interfaces_count as usize);
        for _ in 0..interfaces_count {
            let index = reader.read_u2()?;
            interfaces.push(pool.resolve_class_name(index, &reader)?);
        }

        let is_annotation = access_flags.contains(ClassAccessFlags::ANNOTATION);

        let fields_count = reader.read_u2()?;
        let mut fields = Vec::new();
        for _ in 0..fields_count {
            let field = field_info::parse_field(&mut reader, pool, config)?;
            let visible = config.ignore_field_visibility || field.access_flags.contains(FieldAccessFlags::PUBLIC);
            let is_static_final = field.access_flags.contains(FieldAccessFlags::STATIC | FieldAccessFlags::FINAL);
            let keep = visible
                && (config.enable_field_info
                    || (config.enable_static_final_field_constant_initializer_values && is_static_final));
            if keep {
                fields.push(field);
            }
        }

        let methods_count = reader.read_u2()?;
        let mut methods = Vec::new();
        for _ in 0..methods_count {
            let method = method_info::parse_method(&mut reader, pool, config)?;
            let visible =
                config.ignore_method_visibility || method.access_flags.contains(MethodAccessFlags::PUBLIC);
            // §4.4 step 7: an annotation interface's elements are always retained, to capture
            // their `AnnotationDefault` values, regardless of `enable_method_info`.
            let keep = visible && (config.enable_method_info || is_annotation);
            if keep {
                methods.push(method);
            }
        }

        let class_attrs = attribute::read_attribute_table(&mut reader)?;

        let annotations = if config.enable_annotation_info {
            field_info::read_combined_annotations(
                &class_attrs,
                pool,
                &reader,
                config.disable_runtime_invisible_annotations,
            )?
        } else {
            Vec::new()
        };

        let generic_signature = match attribute::find_unique(&class_attrs, pool, &reader, "Signature")? {
            Some(attr) => {
                let raw = attribute::read_signature_attribute(attr, pool, &reader)?;
                Some(TypeSignature::parse(&raw)?)
            }
            None => None,
        };

        let mut inner_classes = Vec::new();
        if let Some(attr) = attribute::find_unique(&class_attrs, pool, &reader, "InnerClasses")? {
            for (inner, outer, inner_name, raw_flags) in
                attribute::read_inner_classes_attribute(attr, pool, &reader)?
            {
                // §4.4 step 8: "pair recorded when both inner and outer are nonzero".
                let Some(outer) = outer else { continue };
                let flags = ClassAccessFlags::from_bits_truncate(raw_flags);
                inner_classes.push(InnerClassInfo {
                    inner_class: inner,
                    outer_class: Some(outer),
                    inner_name,
                    access_flags: flags,
                });
            }
        }

        let enclosing_method = match attribute::find_unique(&class_attrs, pool, &reader, "EnclosingMethod")? {
            Some(attr) => {
                let (class_name, method) = attribute::read_enclosing_method_attribute(attr, pool, &reader)?;
                let method_name = method.map_or_else(|| "<clinit>".to_owned(), |(method_name, _)| method_name);
                let enclosing = EnclosingMethod { class_name: class_name.clone(), method_name };
                inner_classes.push(InnerClassInfo {
                    inner_class: name.clone(),
                    outer_class: Some(class_name),
                    inner_name: None,
                    access_flags: ClassAccessFlags::empty(),
                });
                Some(enclosing)
            }
            None => None,
        };

        let module_name = if is_module {
            match attribute::find_unique(&class_attrs, pool, &reader, "Module")? {
                Some(attr) => Some(attribute::read_module_name_attribute(attr, pool, &reader)?),
                None => None,
            }
        } else {
            None
        };

        let referenced_class_names = if config.enable_inter_class_dependencies {
            references::collect_referenced_class_names(pool, &reader, &annotations, &fields, &methods)?
        } else {
            Vec::new()
        };

        Ok(Outcome::Done(ParsedClass {
            minor_version,
            major_version,
            name,
            access_flags,
            super_class,
            interfaces,
            fields,
            methods,
            annotations,
            generic_signature,
            inner_classes,
            enclosing_method,
            module_name,
            referenced_class_names,
            is_external,
        }))
    }
}

fn binary_name_to_path(name: &str) -> String {
    format!("{}.class", name.replace('.', "/"))
}

fn is_package_info_path(path: &str) -> bool {
    path == "package-info.class" || path.ends_with("/package-info.class")
}
