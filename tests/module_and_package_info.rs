//! Linking `module-info.class` and `package-info.class` classfiles (§4.7, §6).

mod support;

use classgraph::linker::ClassGraph;
use classgraph::parsing::{ClassfileParser, ParseOutcome, ScanConfig};

#[test]
fn module_info_class_is_routed_to_module_linking_and_creates_no_stray_class_or_package() {
    let mut parser = ClassfileParser::new();
    let config = ScanConfig::default();
    let mut graph = ClassGraph::new();

    let bytes = support::class_bytes_with_access("module-info", None, &[], 0x8000);
    let ParseOutcome::Done(class) = parser.parse(&bytes, "module-info.class", false, &config) else {
        panic!("expected module-info to parse")
    };
    assert!(class.is_module());
    // No classpath element means no module name can be resolved (§4.7): without one, linking a
    // module-info is a no-op, not a class or package registration under the literal name
    // "module-info".
    graph.link(class, None);

    assert!(graph.class("module-info").is_none());
    assert_eq!(graph.class_count(), 0);
}

#[test]
fn package_info_class_attaches_its_annotations_to_the_package() {
    let mut parser = ClassfileParser::new();
    let config = ScanConfig::default();
    let mut graph = ClassGraph::new();

    let bytes = support::class_bytes("com/example/package-info", None, &[]);
    let ParseOutcome::Done(class) = parser.parse(&bytes, "com/example/package-info.class", false, &config) else {
        panic!("expected package-info to parse")
    };
    assert_eq!(class.name, "com.example.package-info");
    graph.link(class, None);

    assert!(graph.package("com.example").is_some());
}

#[test]
fn a_regular_class_registers_itself_under_its_package() {
    let mut parser = ClassfileParser::new();
    let config = ScanConfig::default();
    let mut graph = ClassGraph::new();

    let bytes = support::class_bytes("com/example/Foo", Some("java/lang/Object"), &[]);
    let ParseOutcome::Done(class) = parser.parse(&bytes, "com/example/Foo.class", false, &config) else {
        panic!("expected Foo to parse")
    };
    graph.link(class, None);

    let package = graph.package("com.example").expect("package should have been created");
    assert!(package.classes.contains("com.example.Foo"));
}
