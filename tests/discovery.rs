//! Discovering and scheduling external classes from a real directory (and, with the `jar`
//! feature, a real jar archive) classpath element (§4.6).

mod support;

use std::sync::Arc;

use classgraph::discovery::{ClasspathElement, DirectoryClasspathElement, ExternalClassDiscoverer, ScheduledSet};
use classgraph::parsing::{ClassfileParser, ParseOutcome, ScanConfig};

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(label: &str) -> Self {
        static COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);
        let id = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("classgraph-it-{label}-{}-{id}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.path).ok();
    }
}

#[test]
fn discoverer_finds_a_superclass_on_a_directory_classpath_and_it_is_parseable() {
    let dir = TempDir::new("directory");
    let animal = support::class_bytes("Animal", None, &[]);
    let animal_path = dir.path.join(support::relative_path("Animal"));
    std::fs::create_dir_all(animal_path.parent().unwrap()).unwrap();
    std::fs::write(&animal_path, &animal).unwrap();

    let element: Arc<dyn ClasspathElement> = Arc::new(DirectoryClasspathElement::new(&dir.path));
    let classpath = vec![element];
    let scheduled = ScheduledSet::new();
    let discoverer = ExternalClassDiscoverer::new(&classpath, &scheduled);

    let mut parser = ClassfileParser::new();
    let config = ScanConfig::default();
    let dog = support::class_bytes("Dog", Some("Animal"), &[]);
    let ParseOutcome::Done(dog_class) = parser.parse(&dog, "Dog.class", false, &config) else {
        panic!("expected Dog to parse")
    };

    let units = discoverer.discover(&dog_class, 0);
    assert_eq!(units.len(), 1);
    assert!(units[0].is_external);

    let bytes = units[0].resource.open_or_read().unwrap();
    let outcome = parser.parse(&bytes, "Animal.class", true, &config);
    let ParseOutcome::Done(animal_class) = outcome else { panic!("expected Animal to parse") };
    assert_eq!(animal_class.name, "Animal");
    assert!(animal_class.is_external);
}

#[test]
fn a_name_already_scheduled_is_not_rediscovered() {
    let dir = TempDir::new("dedup");
    let animal = support::class_bytes("Animal", None, &[]);
    std::fs::write(dir.path.join(support::relative_path("Animal")), &animal).unwrap();

    let element: Arc<dyn ClasspathElement> = Arc::new(DirectoryClasspathElement::new(&dir.path));
    let classpath = vec![element];
    let scheduled = ScheduledSet::new();
    let discoverer = ExternalClassDiscoverer::new(&classpath, &scheduled);

    let mut parser = ClassfileParser::new();
    let config = ScanConfig::default();
    let dog = support::class_bytes("Dog", Some("Animal"), &[]);
    let ParseOutcome::Done(dog_class) = parser.parse(&dog, "Dog.class", false, &config) else {
        panic!("expected Dog to parse")
    };

    assert_eq!(discoverer.discover(&dog_class, 0).len(), 1);
    // A second classfile referencing the same external name must not re-schedule it.
    let cat = support::class_bytes("Cat", Some("Animal"), &[]);
    let ParseOutcome::Done(cat_class) = parser.parse(&cat, "Cat.class", false, &config) else {
        panic!("expected Cat to parse")
    };
    assert_eq!(discoverer.discover(&cat_class, 0).len(), 0);
}

#[cfg(feature = "jar")]
#[test]
fn jar_classpath_element_finds_a_class_inside_the_archive() {
    use std::io::Write;

    use classgraph::discovery::JarClasspathElement;

    let dir = TempDir::new("jar");
    let jar_path = dir.path.join("classes.jar");
    {
        let file = std::fs::File::create(&jar_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer.start_file("Animal.class", zip::write::SimpleFileOptions::default()).unwrap();
        writer.write_all(&support::class_bytes("Animal", None, &[])).unwrap();
        writer.finish().unwrap();
    }

    let element = JarClasspathElement::new(&jar_path);
    let resource = element.get_resource("Animal.class").unwrap().expect("Animal.class should be in the jar");
    let bytes = resource.open_or_read().unwrap();

    let mut parser = ClassfileParser::new();
    let config = ScanConfig::default();
    let ParseOutcome::Done(class) = parser.parse(&bytes, "Animal.class", true, &config) else {
        panic!("expected Animal to parse")
    };
    assert_eq!(class.name, "Animal");

    assert!(element.get_resource("Missing.class").unwrap().is_none());
}
