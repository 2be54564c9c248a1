//! The parsed, in-memory representation of a single classfile.
//!
//! These types are the output of [`crate::parsing::class_parser::ClassfileParser`]: plain data,
//! independent of the buffer and constant pool they were decoded from.

use bitflags::bitflags;

use crate::annotation::Annotation;
use crate::signature::{MethodTypeSignature, TypeSignature};

bitflags! {
    /// `access_flags` for a `ClassFile` structure (JVMS table 4.1-A).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClassAccessFlags: u16 {
        /// `ACC_PUBLIC`
        const PUBLIC = 0x0001;
        /// `ACC_FINAL`
        const FINAL = 0x0010;
        /// `ACC_SUPER`
        const SUPER = 0x0020;
        /// `ACC_INTERFACE`
        const INTERFACE = 0x0200;
        /// `ACC_ABSTRACT`
        const ABSTRACT = 0x0400;
        /// `ACC_SYNTHETIC`
        const SYNTHETIC = 0x1000;
        /// `ACC_ANNOTATION`
        const ANNOTATION = 0x2000;
        /// `ACC_ENUM`
        const ENUM = 0x4000;
        /// `ACC_MODULE`
        const MODULE = 0x8000;
    }
}

bitflags! {
    /// `access_flags` for a `field_info` structure (JVMS table 4.5-A).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldAccessFlags: u16 {
        /// `ACC_PUBLIC`
        const PUBLIC = 0x0001;
        /// `ACC_PRIVATE`
        const PRIVATE = 0x0002;
        /// `ACC_PROTECTED`
        const PROTECTED = 0x0004;
        /// `ACC_STATIC`
        const STATIC = 0x0008;
        /// `ACC_FINAL`
        const FINAL = 0x0010;
        /// `ACC_VOLATILE`
        const VOLATILE = 0x0040;
        /// `ACC_TRANSIENT`
        const TRANSIENT = 0x0080;
        /// `ACC_SYNTHETIC`
        const SYNTHETIC = 0x1000;
        /// `ACC_ENUM`
        const ENUM = 0x4000;
    }
}

bitflags! {
    /// `access_flags` for a `method_info` structure (JVMS table 4.6-A).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodAccessFlags: u16 {
        /// `ACC_PUBLIC`
        const PUBLIC = 0x0001;
        /// `ACC_PRIVATE`
        const PRIVATE = 0x0002;
        /// `ACC_PROTECTED`
        const PROTECTED = 0x0004;
        /// `ACC_STATIC`
        const STATIC = 0x0008;
        /// `ACC_FINAL`
        const FINAL = 0x0010;
        /// `ACC_SYNCHRONIZED`
        const SYNCHRONIZED = 0x0020;
        /// `ACC_BRIDGE`
        const BRIDGE = 0x0040;
        /// `ACC_VARARGS`
        const VARARGS = 0x0080;
        /// `ACC_NATIVE`
        const NATIVE = 0x0100;
        /// `ACC_ABSTRACT`
        const ABSTRACT = 0x0400;
        /// `ACC_STRICT`
        const STRICT = 0x0800;
        /// `ACC_SYNTHETIC`
        const SYNTHETIC = 0x1000;
    }
}

/// A compile-time-constant field value, as recorded by a `ConstantValue` attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    /// An `int`, `short`, `char`, `byte`, or `boolean` constant.
    Integer(i32),
    /// A `float` constant.
    Float(f32),
    /// A `long` constant.
    Long(i64),
    /// A `double` constant.
    Double(f64),
    /// A `String` constant.
    String(String),
}

/// A parsed field member.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// The field's simple name.
    pub name: String,
    /// The field's access flags.
    pub access_flags: FieldAccessFlags,
    /// The field's type descriptor.
    pub descriptor: TypeSignature,
    /// The field's generic `Signature` attribute, if present and distinct from `descriptor`.
    pub generic_signature: Option<TypeSignature>,
    /// The field's `ConstantValue`, if it has one (only meaningful for `static final` fields).
    pub constant_value: Option<ConstantValue>,
    /// Annotations attached to this field.
    pub annotations: Vec<Annotation>,
}

/// A parsed method member.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    /// The method's simple name (`<init>`/`<clinit>` for constructors/initializers).
    pub name: String,
    /// The method's access flags.
    pub access_flags: MethodAccessFlags,
    /// The method's descriptor.
    pub descriptor: MethodTypeSignature,
    /// The method's generic `Signature` attribute, if present and distinct from `descriptor`.
    pub generic_signature: Option<MethodTypeSignature>,
    /// Declared parameter names, from a `MethodParameters` attribute, if present. A `None`
    /// element is an unnamed parameter (`name_index == 0`), distinct from one named `""`.
    pub parameter_names: Option<Vec<Option<String>>>,
    /// Declared parameter access-flag modifiers, from a `MethodParameters` attribute, if present.
    pub parameter_modifiers: Option<Vec<u16>>,
    /// Per-parameter annotations, from `RuntimeVisible/InvisibleParameterAnnotations`.
    pub parameter_annotations: Vec<Vec<Annotation>>,
    /// Annotations attached to the method itself.
    pub annotations: Vec<Annotation>,
    /// The default value of an annotation interface element, from an `AnnotationDefault`
    /// attribute.
    pub annotation_default: Option<crate::annotation::ElementValue>,
    /// Whether the method has a `Code` attribute (i.e. is not abstract or native).
    pub has_body: bool,
}

/// A nested-class relationship recorded by an `InnerClasses` attribute entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassInfo {
    /// The binary name of the inner class.
    pub inner_class: String,
    /// The binary name of the enclosing class, if the inner class is a member (not local/anonymous).
    pub outer_class: Option<String>,
    /// The inner class's simple name as used in source, if not anonymous.
    pub inner_name: Option<String>,
    /// The inner class's own access flags as seen from this context.
    pub access_flags: ClassAccessFlags,
}

/// The enclosing method of a local or anonymous class, from an `EnclosingMethod` attribute.
///
/// Per §4.4.8, a `method_index` of 0 names `<clinit>` rather than indicating "no enclosing
/// method" (a class enclosed directly by a class body still names a defining method under this
/// format's simplified reading), so `method_name` is never absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosingMethod {
    /// The binary name of the enclosing class.
    pub class_name: String,
    /// The enclosing method's simple name (`<clinit>` when the attribute's `method_index` was 0).
    pub method_name: String,
}

impl EnclosingMethod {
    /// The dotted `Enclosing.method` name this attribute contributes to the class graph.
    #[must_use]
    pub fn defining_name(&self) -> String {
        format!("{}.{}", self.class_name, self.method_name)
    }
}

/// A fully parsed classfile.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedClass {
    /// The classfile format's minor version.
    pub minor_version: u16,
    /// The classfile format's major version.
    pub major_version: u16,
    /// The class's own binary name, dot-separated.
    pub name: String,
    /// The class's access flags.
    pub access_flags: ClassAccessFlags,
    /// The binary name of the superclass, or `None` for `java.lang.Object` and for modules.
    pub super_class: Option<String>,
    /// Binary names of directly implemented/extended interfaces.
    pub interfaces: Vec<String>,
    /// Parsed field members.
    pub fields: Vec<FieldInfo>,
    /// Parsed method members.
    pub methods: Vec<MethodInfo>,
    /// Class-level annotations.
    pub annotations: Vec<Annotation>,
    /// The class's own generic `Signature` attribute, if present.
    pub generic_signature: Option<TypeSignature>,
    /// This class's entry in its own `InnerClasses` attribute, plus any member/local classes it
    /// declares.
    pub inner_classes: Vec<InnerClassInfo>,
    /// This class's `EnclosingMethod` attribute, if it is a local or anonymous class.
    pub enclosing_method: Option<EnclosingMethod>,
    /// The module name from this classfile's `Module` attribute, if it is a `module-info.class`
    /// that declares one. §1 scopes full module-descriptor parsing out; only the name survives.
    pub module_name: Option<String>,
    /// Every class name this class's own structure refers to (superclass, interfaces,
    /// descriptors, signatures, annotations) — the output of [`crate::references`].
    pub referenced_class_names: Vec<String>,
    /// Whether this class was scheduled as an externally-discovered dependency rather than
    /// found directly on the configured classpath roots.
    pub is_external: bool,
}

impl ParsedClass {
    /// Whether this class's `ACC_INTERFACE` flag is set.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::INTERFACE)
    }

    /// Whether this class's `ACC_ANNOTATION` flag is set.
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::ANNOTATION)
    }

    /// Whether this class's `ACC_MODULE` flag is set (i.e. this classfile is `module-info.class`).
    #[must_use]
    pub fn is_module(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::MODULE)
    }

    /// The package name implied by this class's own binary name (everything before the last
    /// `.`), or the empty string for the unnamed package.
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.name.rfind('.').map_or("", |idx| &self.name[..idx])
    }
}
