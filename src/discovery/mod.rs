//! External-class discovery and work scheduling (§4.6).
//!
//! Once a classfile is parsed, its superclass, interfaces, and every annotation it carries
//! (class-, method-, parameter-, and field-level) name other classes that may not yet be on the
//! scan's work queue. [`ExternalClassDiscoverer`] walks those names, skips ones already
//! scheduled (via the concurrent [`ScheduledSet`]), searches the classpath for a matching
//! resource — the classpath element the discovering class itself came from first, then the rest
//! in classpath order — and returns a [`WorkUnit`] per hit for the caller to hand to its work
//! queue.
//!
//! Classpath enumeration itself is an external collaborator (§1): this module only consumes the
//! [`ClasspathElement`]/[`Resource`] traits. [`DirectoryClasspathElement`] and
//! [`JarClasspathElement`] are the one filesystem-backed and one jar-backed implementation this
//! crate ships, purely so the discovery contract above is exercisable in tests without a second
//! crate (§10.4) — not a supported classpath-enumeration feature.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::annotation::Annotation;
use crate::class::ParsedClass;
use crate::parsing::report;

/// A classpath element's own module reference, if it has one independent of any scanned
/// `module-info.class` (e.g. a JPMS module descriptor recorded outside this crate's scope).
/// Consulted by the linker ahead of a classfile-recorded module name (§4.7).
pub trait ModuleRef: fmt::Debug {
    /// The module's name.
    fn name(&self) -> &str;
}

/// A source of classfile resources, reachable by a `.class`-relative path.
///
/// This is an external collaborator (§1: "classpath discovery and enumeration... assumed"); the
/// core only needs to look resources up by path and to record the module name a scanned
/// `module-info.class` declared for this element (§6).
pub trait ClasspathElement: fmt::Debug + Send + Sync {
    /// Looks up the classfile resource at `relative_path` within this element, if any.
    ///
    /// # Errors
    /// Propagates I/O failures distinct from a plain "not found" (e.g. a corrupt archive).
    fn get_resource(&self, relative_path: &str) -> std::io::Result<Option<Box<dyn Resource>>>;

    /// Records the module name a `Module` attribute on this element's `module-info.class`
    /// declared. Written once, by the host, after that classfile is parsed.
    fn set_module_name(&self, name: String);

    /// The module name previously recorded by [`Self::set_module_name`], if any.
    fn module_name(&self) -> Option<String>;

    /// This element's own module reference, independent of any scanned `module-info.class`.
    /// `None` for classpath elements without one (the common case).
    fn module_ref(&self) -> Option<&dyn ModuleRef> {
        None
    }
}

/// A single classfile resource found on a [`ClasspathElement`].
pub trait Resource: Send {
    /// Reads this resource's entire contents, ready to hand to
    /// [`crate::parsing::ClassfileParser::parse`].
    ///
    /// # Errors
    /// Any I/O failure opening or reading the underlying byte source.
    fn open_or_read(&self) -> std::io::Result<Vec<u8>>;

    /// This resource's own module reference, if its classpath element has one scoped more
    /// narrowly than the element itself (rare; `None` in both reference implementations here).
    fn module_ref(&self) -> Option<&dyn ModuleRef> {
        None
    }
}

/// One unit of work for the (externally-owned) work queue: a resource found on a classpath
/// element, and whether it was reached via discovery rather than the original scan roots.
pub struct WorkUnit {
    /// The classpath element the resource was found on.
    pub classpath_element: Arc<dyn ClasspathElement>,
    /// The resource itself.
    pub resource: Box<dyn Resource>,
    /// Whether this class was discovered by reference from another class, rather than requested
    /// directly (§4.6, §4.7: recorded verbatim onto the resulting [`ParsedClass::is_external`]).
    pub is_external: bool,
}

impl fmt::Debug for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkUnit")
            .field("classpath_element", &self.classpath_element)
            .field("is_external", &self.is_external)
            .finish_non_exhaustive()
    }
}

/// A many-producer/many-consumer sink for newly discovered work, owned by the host (§1: "the
/// thread-pool implementation of the work queue" is an external collaborator).
pub trait WorkQueue: Send + Sync {
    /// Adds newly discovered work units to the queue, in no particular order.
    fn add_work_units(&self, units: Vec<WorkUnit>);
}

/// A concurrent, insert-only set of class names already scheduled for scanning.
///
/// [`Self::insert_if_absent`] is the only mutator: nothing is ever removed, so once a name is in
/// the set, at most one work unit is ever enqueued for it (§4.6, §9).
#[derive(Debug, Default)]
pub struct ScheduledSet {
    names: Mutex<std::collections::HashSet<String>>,
}

impl ScheduledSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self { names: Mutex::new(std::collections::HashSet::new()) }
    }

    /// Atomically inserts `name` if it is not already present.
    ///
    /// Returns `true` if this call performed the insert (i.e. the caller "won" and should
    /// proceed to search the classpath); `false` if some call — this one or a concurrent one —
    /// already scheduled `name`.
    pub fn insert_if_absent(&self, name: &str) -> bool {
        let mut guard = self.names.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(name.to_owned())
    }

    /// The number of names currently scheduled.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    /// Whether no names have been scheduled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Walks a parsed classfile's structural references and schedules the external classes they
/// name (§4.6).
///
/// Only runs when [`crate::parsing::ScanConfig::extend_scanning_upwards_to_external_classes`] is
/// set; the caller is responsible for checking that flag, since this type has no dependency on
/// `ScanConfig` itself.
#[derive(Debug)]
pub struct ExternalClassDiscoverer<'a> {
    classpath: &'a [Arc<dyn ClasspathElement>],
    scheduled: &'a ScheduledSet,
}

impl<'a> ExternalClassDiscoverer<'a> {
    /// Creates a discoverer over `classpath`, sharing `scheduled` with every other worker in the
    /// scan.
    #[must_use]
    pub fn new(classpath: &'a [Arc<dyn ClasspathElement>], scheduled: &'a ScheduledSet) -> Self {
        Self { classpath, scheduled }
    }

    /// Discovers the external classes referenced by `class`, searching `classpath[current]`
    /// first (§4.6: "local first, then in order"), and returns the work units to enqueue.
    ///
    /// Misses (a referenced name not found on any classpath element) are logged, not returned as
    /// an error — per §4.6, "Misses are logged... but are not errors".
    #[must_use]
    pub fn discover(&self, class: &ParsedClass, current: usize) -> Vec<WorkUnit> {
        let mut units = Vec::new();
        for name in referenced_names(class) {
            if name.is_empty() || !self.scheduled.insert_if_absent(&name) {
                continue;
            }
            match self.find_resource(&name, current) {
                Some(unit) => units.push(unit),
                None => report::log_discovery_miss(&name),
            }
        }
        units
    }

    fn find_resource(&self, name: &str, current: usize) -> Option<WorkUnit> {
        if self.classpath.is_empty() {
            return None;
        }
        let relative_path = format!("{}.class", name.replace('.', "/"));
        let current = current.min(self.classpath.len() - 1);
        let search_order = std::iter::once(current).chain((0..self.classpath.len()).filter(|&i| i != current));
        for index in search_order {
            let element = &self.classpath[index];
            if let Ok(Some(resource)) = element.get_resource(&relative_path) {
                report::log_discovery_scheduled(name, &relative_path);
                return Some(WorkUnit { classpath_element: element.clone(), resource, is_external: true });
            }
        }
        None
    }
}

/// Every class name `class`'s structure refers to that §4.6 asks the discoverer to follow:
/// superclass, interfaces, and every class-, method-, parameter-, and field-annotation name. In
/// first-seen order; callers dedupe via [`ScheduledSet`] rather than here.
fn referenced_names(class: &ParsedClass) -> Vec<String> {
    let mut names = Vec::new();
    names.extend(class.super_class.iter().cloned());
    names.extend(class.interfaces.iter().cloned());
    push_annotation_names(&class.annotations, &mut names);
    for method in &class.methods {
        push_annotation_names(&method.annotations, &mut names);
        for parameter in &method.parameter_annotations {
            push_annotation_names(parameter, &mut names);
        }
    }
    for field in &class.fields {
        push_annotation_names(&field.annotations, &mut names);
    }
    names
}

/// Delegates to [`crate::references::push_annotation_class_names`] for the full recursive
/// walk (type descriptor, nested `Enum`/`Class`/`Annotation`/`Array` element values). A malformed
/// array-type element value is dropped rather than failing discovery, which the design already
/// treats as best-effort (misses are logged, never errors).
fn push_annotation_names(annotations: &[Annotation], out: &mut Vec<String>) {
    for annotation in annotations {
        let _ = crate::references::push_annotation_class_names(annotation, out);
    }
}

/// A [`ClasspathElement`] backed by an exploded directory of `.class` files.
#[derive(Debug)]
pub struct DirectoryClasspathElement {
    root: PathBuf,
    module_name: Mutex<Option<String>>,
}

impl DirectoryClasspathElement {
    /// Creates a classpath element rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), module_name: Mutex::new(None) }
    }
}

impl ClasspathElement for DirectoryClasspathElement {
    fn get_resource(&self, relative_path: &str) -> std::io::Result<Option<Box<dyn Resource>>> {
        let path = self.root.join(relative_path);
        if path.is_file() {
            Ok(Some(Box::new(FileResource { path })))
        } else {
            Ok(None)
        }
    }

    fn set_module_name(&self, name: String) {
        *self.module_name.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(name);
    }

    fn module_name(&self) -> Option<String> {
        self.module_name.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }
}

#[derive(Debug)]
struct FileResource {
    path: PathBuf,
}

impl Resource for FileResource {
    fn open_or_read(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// A [`ClasspathElement`] backed by a single jar archive, gated behind the `jar` feature.
#[cfg(feature = "jar")]
#[derive(Debug)]
pub struct JarClasspathElement {
    jar_path: PathBuf,
    module_name: Mutex<Option<String>>,
}

#[cfg(feature = "jar")]
impl JarClasspathElement {
    /// Creates a classpath element over the jar at `jar_path`.
    pub fn new(jar_path: impl Into<PathBuf>) -> Self {
        Self { jar_path: jar_path.into(), module_name: Mutex::new(None) }
    }

    fn open_archive(&self) -> std::io::Result<zip::ZipArchive<std::io::BufReader<std::fs::File>>> {
        let file = std::fs::File::open(&self.jar_path)?;
        zip::ZipArchive::new(std::io::BufReader::new(file))
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }
}

#[cfg(feature = "jar")]
impl ClasspathElement for JarClasspathElement {
    fn get_resource(&self, relative_path: &str) -> std::io::Result<Option<Box<dyn Resource>>> {
        let mut archive = self.open_archive()?;
        match archive.by_name(relative_path) {
            Ok(_) => Ok(Some(Box::new(JarResource {
                jar_path: self.jar_path.clone(),
                entry_name: relative_path.to_owned(),
            }))),
            Err(zip::result::ZipError::FileNotFound) => Ok(None),
            Err(err) => Err(std::io::Error::new(std::io::ErrorKind::InvalidData, err)),
        }
    }

    fn set_module_name(&self, name: String) {
        *self.module_name.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(name);
    }

    fn module_name(&self) -> Option<String> {
        self.module_name.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }
}

#[cfg(feature = "jar")]
#[derive(Debug)]
struct JarResource {
    jar_path: PathBuf,
    entry_name: String,
}

#[cfg(feature = "jar")]
impl Resource for JarResource {
    fn open_or_read(&self) -> std::io::Result<Vec<u8>> {
        use std::io::Read;
        let file = std::fs::File::open(&self.jar_path)?;
        let mut archive = zip::ZipArchive::new(std::io::BufReader::new(file))
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        let mut entry = archive
            .by_name(&self.entry_name)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf)?;
        Ok(buf)
    }
}
