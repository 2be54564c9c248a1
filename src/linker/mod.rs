//! Linking parsed classfiles into a shared class/package/module graph (§4.7).
//!
//! Parsing is parallel; linking is not (§5: "single-writer, no readers"). [`ClassGraph`] owns
//! the three maps a scan accumulates into and exposes exactly one mutator, [`ClassGraph::link`],
//! which a single thread calls once per successfully-parsed [`ParsedClass`] after every parser
//! has finished producing it. Everything else on this type is a read-only query.
//!
//! A referenced class name that has not yet been scanned still needs a graph node — a
//! superclass, an implemented interface, or an annotation type can be named by many classfiles
//! before (or without) ever being scanned itself. [`ClassGraph::link`] creates a placeholder
//! [`ClassInfo`] for such names, carrying `is_external = true` until a real scan of that class
//! arrives and demotes it; that demotion is monotonic (§9: "once a class is seen as
//! non-external it stays non-external").

use std::collections::{HashMap, HashSet};

use crate::annotation::Annotation;
use crate::class::{ClassAccessFlags, FieldInfo, MethodInfo, ParsedClass};
use crate::discovery::ClasspathElement;
use crate::signature::TypeSignature;

#[cfg(feature = "petgraph")]
pub mod petgraph_export;

/// A linked class: the union of everything every classfile scanned under this name contributed.
///
/// Unlike [`ParsedClass`], a `ClassInfo` is never replaced wholesale — [`ClassGraph::link`]
/// overwrites its fields from the latest scan of the same name, since JVMS guarantees a binary
/// name is unique within one classpath, but preserves the accumulated `is_external` and
/// containment information across calls.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
#[display("{name}")]
pub struct ClassInfo {
    /// This class's own binary name.
    pub name: String,
    /// Whether this class has only ever been referenced, never itself scanned (or scanned only
    /// via external discovery, never as a scan root). `None` of the other fields below are
    /// meaningful for a placeholder still at `is_external = true` and otherwise default.
    pub is_external: bool,
    /// This class's access flags, once scanned. `None` for a placeholder never itself scanned.
    pub access_flags: Option<ClassAccessFlags>,
    /// The binary name of the superclass, if any (placeholders and `java.lang.Object` have
    /// none).
    pub super_class: Option<String>,
    /// Binary names of directly implemented/extended interfaces.
    pub interfaces: Vec<String>,
    /// Class-level annotations.
    pub annotations: Vec<Annotation>,
    /// The class's own generic `Signature`, if present.
    pub generic_signature: Option<TypeSignature>,
    /// The dotted `Enclosing.method` name, if this is a local or anonymous class.
    pub enclosing_method: Option<String>,
    /// Parsed field members, if [`crate::parsing::ScanConfig::enable_field_info`] retained any.
    pub fields: Vec<FieldInfo>,
    /// Parsed method members, if [`crate::parsing::ScanConfig::enable_method_info`] retained any
    /// (always retained for an annotation interface's elements, to carry default values).
    pub methods: Vec<MethodInfo>,
    /// Every class name this class's own structure refers to, if
    /// [`crate::parsing::ScanConfig::enable_inter_class_dependencies`] was set.
    pub referenced_class_names: Vec<String>,
    /// The fully-qualified name of the package this class belongs to (the unnamed package is
    /// `""`), once scanned.
    pub package: Option<String>,
    /// The name of the module this class was scanned from, if its classpath element declared
    /// one.
    pub module: Option<String>,
}

impl ClassInfo {
    fn placeholder(name: String) -> Self {
        Self {
            name,
            is_external: true,
            access_flags: None,
            super_class: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            generic_signature: None,
            enclosing_method: None,
            fields: Vec::new(),
            methods: Vec::new(),
            referenced_class_names: Vec::new(),
            package: None,
            module: None,
        }
    }

    /// Whether this class's `ACC_INTERFACE` flag is set. `false` for an unscanned placeholder.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access_flags.is_some_and(|flags| flags.contains(ClassAccessFlags::INTERFACE))
    }

    /// Whether this class's `ACC_ANNOTATION` flag is set. `false` for an unscanned placeholder.
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.access_flags.is_some_and(|flags| flags.contains(ClassAccessFlags::ANNOTATION))
    }
}

/// A linked package: the set of classes registered under it, and any `package-info.class`
/// annotations attached to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_more::Display)]
#[display("{name}")]
pub struct PackageInfo {
    /// This package's fully-qualified name (`""` for the unnamed package).
    pub name: String,
    /// Binary names of classes registered in this package.
    pub classes: HashSet<String>,
    /// Annotations from this package's `package-info.class`, if one was scanned.
    pub annotations: Vec<Annotation>,
}

impl PackageInfo {
    fn new(name: String) -> Self {
        Self { name, classes: HashSet::new(), annotations: Vec::new() }
    }
}

/// A linked module: the classes and packages registered under it, and any `module-info.class`
/// annotations attached to it. §1 scopes full module-descriptor parsing out — only membership
/// and the module's own annotations are tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_more::Display)]
#[display("{name}")]
pub struct ModuleInfo {
    /// This module's name.
    pub name: String,
    /// Binary names of classes registered in this module.
    pub classes: HashSet<String>,
    /// Fully-qualified names of packages registered in this module.
    pub packages: HashSet<String>,
    /// Annotations from this module's `module-info.class`.
    pub annotations: Vec<Annotation>,
}

impl ModuleInfo {
    fn new(name: String) -> Self {
        Self { name, classes: HashSet::new(), packages: HashSet::new(), annotations: Vec::new() }
    }
}

/// The shared class/package/module graph a scan links parsed classfiles into.
///
/// Mutated only by [`Self::link`], which the design assumes is called under exclusive access
/// (§5: "implementations may... hold the maps behind a single lock acquired once at the start of
/// linking"); this type itself does no locking, leaving that choice to the caller.
#[derive(Debug, Default)]
pub struct ClassGraph {
    classes: HashMap<String, ClassInfo>,
    packages: HashMap<String, PackageInfo>,
    modules: HashMap<String, ModuleInfo>,
    inner_to_outer: HashMap<String, String>,
    outer_to_inners: HashMap<String, Vec<String>>,
}

impl ClassGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Links one parsed classfile into the graph (§4.7).
    ///
    /// `classpath_element` is the element the classfile was found on, used to resolve and record
    /// module membership (§4.1, §4.7); pass `None` when the caller has no classpath-element
    /// context (module registration is then skipped, matching "if any").
    pub fn link(&mut self, class: ParsedClass, classpath_element: Option<&dyn ClasspathElement>) {
        if class.is_module() {
            self.link_module_info(class, classpath_element);
        } else if is_package_info_name(&class.name) {
            self.link_package_info(class);
        } else {
            self.link_regular_class(class, classpath_element);
        }
    }

    fn link_module_info(&mut self, class: ParsedClass, classpath_element: Option<&dyn ClasspathElement>) {
        if let (Some(element), Some(name)) = (classpath_element, &class.module_name) {
            element.set_module_name(name.clone());
        }
        let Some(module_name) = classpath_element.and_then(resolve_module_name) else { return };
        if module_name.is_empty() {
            return;
        }
        let module = self.modules.entry(module_name.clone()).or_insert_with(|| ModuleInfo::new(module_name));
        module.annotations.extend(class.annotations);
    }

    fn link_package_info(&mut self, class: ParsedClass) {
        let parent = class.name.rfind('.').map_or_else(String::new, |idx| class.name[..idx].to_owned());
        let package = self.packages.entry(parent.clone()).or_insert_with(|| PackageInfo::new(parent));
        package.annotations.extend(class.annotations);
    }

    fn link_regular_class(&mut self, class: ParsedClass, classpath_element: Option<&dyn ClasspathElement>) {
        let package_name = class.package_name().to_owned();

        for pair in &class.inner_classes {
            if let Some(outer) = &pair.outer_class {
                self.inner_to_outer.insert(pair.inner_class.clone(), outer.clone());
                self.outer_to_inners.entry(outer.clone()).or_default().push(pair.inner_class.clone());
                self.get_or_create_class(&pair.inner_class);
                self.get_or_create_class(outer);
            }
        }

        if let Some(super_class) = &class.super_class {
            self.get_or_create_class(super_class);
        }
        for interface in &class.interfaces {
            self.get_or_create_class(interface);
        }
        for annotation in &class.annotations {
            if let Some(name) = annotation_class_name(annotation) {
                self.get_or_create_class(&name);
            }
        }

        let module_name = classpath_element.and_then(resolve_module_name);

        let info = self.get_or_create_class(&class.name);
        info.is_external = info.is_external && class.is_external;
        info.access_flags = Some(class.access_flags);
        info.super_class = class.super_class;
        info.interfaces = class.interfaces;
        info.annotations = class.annotations;
        info.generic_signature = class.generic_signature;
        info.enclosing_method = class.enclosing_method.map(|enclosing| enclosing.defining_name());
        info.fields = class.fields;
        info.methods = class.methods;
        info.referenced_class_names = class.referenced_class_names;
        info.package = Some(package_name.clone());
        info.module = module_name.clone();

        let package = self.get_or_create_package(&package_name);
        package.classes.insert(class.name.clone());

        if let Some(module_name) = module_name {
            let module = self.get_or_create_module(&module_name);
            module.classes.insert(class.name.clone());
            module.packages.insert(package_name);
        }
    }

    fn get_or_create_class(&mut self, name: &str) -> &mut ClassInfo {
        self.classes.entry(name.to_owned()).or_insert_with(|| ClassInfo::placeholder(name.to_owned()))
    }

    fn get_or_create_package(&mut self, name: &str) -> &mut PackageInfo {
        self.packages.entry(name.to_owned()).or_insert_with(|| PackageInfo::new(name.to_owned()))
    }

    fn get_or_create_module(&mut self, name: &str) -> &mut ModuleInfo {
        self.modules.entry(name.to_owned()).or_insert_with(|| ModuleInfo::new(name.to_owned()))
    }

    /// Looks up a linked (or placeholder) class by binary name.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    /// Looks up a linked package by fully-qualified name (`""` for the unnamed package).
    #[must_use]
    pub fn package(&self, name: &str) -> Option<&PackageInfo> {
        self.packages.get(name)
    }

    /// Looks up a linked module by name.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&ModuleInfo> {
        self.modules.get(name)
    }

    /// All classes in the graph, scanned or placeholder.
    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    /// The binary name of `inner`'s immediately enclosing class, if an `InnerClasses` or
    /// `EnclosingMethod` attribute recorded the containment edge (§9: "these attributes produce
    /// graph edges rather than tree parents").
    #[must_use]
    pub fn outer_of(&self, inner: &str) -> Option<&str> {
        self.inner_to_outer.get(inner).map(String::as_str)
    }

    /// The binary names of classes recorded as directly contained by `outer`.
    #[must_use]
    pub fn inners_of(&self, outer: &str) -> &[String] {
        self.outer_to_inners.get(outer).map_or(&[], Vec::as_slice)
    }

    /// The number of classes (including placeholders) in the graph.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Binary names still at `is_external = true`: referenced somewhere in the graph but never
    /// themselves the subject of a successful scan.
    ///
    /// A consumer linking incrementally (interleaving [`ClassGraph::link`] calls with an
    /// in-flight scan, rather than waiting for it to drain) can use this to decide which
    /// placeholders are still worth scheduling.
    #[cfg(feature = "unstable-incremental-linking")]
    #[instability::unstable(feature = "unstable-incremental-linking")]
    pub fn pending_placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.classes.values().filter(|info| info.is_external).map(|info| info.name.as_str())
    }
}

fn resolve_module_name(element: &dyn ClasspathElement) -> Option<String> {
    element.module_ref().map(|module_ref| module_ref.name().to_owned()).or_else(|| element.module_name())
}

fn annotation_class_name(annotation: &Annotation) -> Option<String> {
    annotation
        .type_descriptor
        .strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(';'))
        .map(|name| name.replace('/', "."))
}

fn is_package_info_name(name: &str) -> bool {
    name == "package-info" || name.ends_with(".package-info")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{EnclosingMethod, InnerClassInfo};

    fn minimal_class(name: &str, super_class: Option<&str>) -> ParsedClass {
        ParsedClass {
            minor_version: 0,
            major_version: 61,
            name: name.to_owned(),
            access_flags: ClassAccessFlags::PUBLIC,
            super_class: super_class.map(str::to_owned),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            generic_signature: None,
            inner_classes: Vec::new(),
            enclosing_method: None,
            module_name: None,
            referenced_class_names: Vec::new(),
            is_external: false,
        }
    }

    #[test]
    fn minimal_class_links_a_class_and_a_placeholder_superclass() {
        let mut graph = ClassGraph::new();
        graph.link(minimal_class("Foo", Some("java.lang.Object")), None);

        let foo = graph.class("Foo").expect("Foo should be linked");
        assert!(!foo.is_external);
        assert_eq!(foo.super_class.as_deref(), Some("java.lang.Object"));

        let object = graph.class("java.lang.Object").expect("placeholder for java.lang.Object");
        assert!(object.is_external);
    }

    #[test]
    fn is_external_demotion_is_monotonic() {
        let mut graph = ClassGraph::new();
        // First seen only as a reference (placeholder).
        graph.link(minimal_class("Foo", Some("pkg.Dep")), None);
        assert!(graph.class("pkg.Dep").unwrap().is_external);

        // Now actually scanned, as an external discovery.
        let mut dep = minimal_class("pkg.Dep", Some("java.lang.Object"));
        dep.is_external = true;
        graph.link(dep, None);
        assert!(graph.class("pkg.Dep").unwrap().is_external);

        // Now scanned again, this time as a direct scan root.
        let mut dep_root = minimal_class("pkg.Dep", Some("java.lang.Object"));
        dep_root.is_external = false;
        graph.link(dep_root, None);
        assert!(!graph.class("pkg.Dep").unwrap().is_external);

        // A subsequent external re-discovery must not promote it back.
        let mut dep_again = minimal_class("pkg.Dep", Some("java.lang.Object"));
        dep_again.is_external = true;
        graph.link(dep_again, None);
        assert!(!graph.class("pkg.Dep").unwrap().is_external);
    }

    #[test]
    fn inner_classes_attribute_produces_a_containment_edge() {
        let mut outer = minimal_class("Outer", Some("java.lang.Object"));
        outer.inner_classes.push(InnerClassInfo {
            inner_class: "Outer$Inner".to_owned(),
            outer_class: Some("Outer".to_owned()),
            inner_name: Some("Inner".to_owned()),
            access_flags: ClassAccessFlags::PUBLIC,
        });

        let mut graph = ClassGraph::new();
        graph.link(outer, None);

        assert_eq!(graph.outer_of("Outer$Inner"), Some("Outer"));
        assert_eq!(graph.inners_of("Outer"), &["Outer$Inner".to_owned()]);
    }

    #[test]
    fn enclosing_method_name_is_recorded_on_the_class_info() {
        let mut local = minimal_class("Outer$1", Some("java.lang.Object"));
        local.enclosing_method = Some(EnclosingMethod { class_name: "Outer".to_owned(), method_name: "<clinit>".to_owned() });

        let mut graph = ClassGraph::new();
        graph.link(local, None);

        assert_eq!(graph.class("Outer$1").unwrap().enclosing_method.as_deref(), Some("Outer.<clinit>"));
    }

    #[test]
    fn package_info_attaches_annotations_to_the_parent_package() {
        let mut pkg_info = minimal_class("com.example.package-info", None);
        pkg_info.annotations.push(Annotation { type_descriptor: "Ldeprecated/Marker;".to_owned(), elements: Vec::new() });

        let mut graph = ClassGraph::new();
        graph.link(pkg_info, None);

        let package = graph.package("com.example").expect("package should be linked");
        assert_eq!(package.annotations.len(), 1);
    }

    #[test]
    fn relinking_the_same_class_is_idempotent() {
        let mut graph = ClassGraph::new();
        graph.link(minimal_class("Foo", Some("java.lang.Object")), None);
        let before = graph.class("Foo").cloned();
        graph.link(minimal_class("Foo", Some("java.lang.Object")), None);
        let after = graph.class("Foo").cloned();
        assert_eq!(before, after);
    }

    #[test]
    fn class_annotations_create_placeholder_class_infos() {
        let mut class = minimal_class("Foo", Some("java.lang.Object"));
        class.annotations.push(Annotation { type_descriptor: "Ljava/lang/Deprecated;".to_owned(), elements: Vec::new() });

        let mut graph = ClassGraph::new();
        graph.link(class, None);

        assert!(graph.class("java.lang.Deprecated").is_some());
    }

    #[cfg(feature = "unstable-incremental-linking")]
    #[test]
    fn pending_placeholder_names_lists_unscanned_referenced_classes() {
        let mut graph = ClassGraph::new();
        graph.link(minimal_class("Foo", Some("java.lang.Object")), None);

        let pending: Vec<_> = graph.pending_placeholder_names().collect();
        assert_eq!(pending, vec!["java.lang.Object"]);

        graph.link(minimal_class("java.lang.Object", None), None);
        assert!(graph.pending_placeholder_names().next().is_none());
    }
}
