//! Exporting a linked [`ClassGraph`] as a `petgraph` graph for traversal.
//!
//! Superclass, interface, and containment edges recorded during linking are graph-shaped by
//! nature; this module turns them into an actual `petgraph::graphmap::DiGraphMap` so a caller can
//! run graph algorithms (reachability, topological order, cycle detection) over the linked
//! result without reimplementing a traversal on top of the raw maps. Class-graph queries only —
//! no bytecode or control-flow analysis.

use petgraph::graphmap::DiGraphMap;

use super::ClassGraph;

/// The kind of relationship a [`to_graph`] edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassEdge {
    /// `from` extends `to` directly.
    Superclass,
    /// `from` implements `to` directly.
    Interface,
    /// `from` is recorded as contained by `to` (an `InnerClasses` or `EnclosingMethod` edge).
    Containment,
}

/// Builds a directed graph over `graph`'s classes: an edge `(class, superclass)` for every
/// direct `extends`, `(class, interface)` for every direct `implements`, and
/// `(inner, outer)` for every recorded containment pair.
///
/// Node weights are borrowed binary names; the returned graph borrows from `graph` and cannot
/// outlive it.
#[must_use]
pub fn to_graph(graph: &ClassGraph) -> DiGraphMap<&str, ClassEdge> {
    let mut dig = DiGraphMap::new();
    for name in graph.classes.keys() {
        dig.add_node(name.as_str());
    }
    for info in graph.classes.values() {
        if let Some(super_class) = &info.super_class {
            dig.add_edge(info.name.as_str(), super_class.as_str(), ClassEdge::Superclass);
        }
        for interface in &info.interfaces {
            dig.add_edge(info.name.as_str(), interface.as_str(), ClassEdge::Interface);
        }
    }
    for (inner, outer) in &graph.inner_to_outer {
        dig.add_edge(inner.as_str(), outer.as_str(), ClassEdge::Containment);
    }
    dig
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{ClassAccessFlags, InnerClassInfo, ParsedClass};

    fn minimal_class(name: &str, super_class: Option<&str>, interfaces: Vec<&str>) -> ParsedClass {
        ParsedClass {
            minor_version: 0,
            major_version: 61,
            name: name.to_owned(),
            access_flags: ClassAccessFlags::PUBLIC,
            super_class: super_class.map(str::to_owned),
            interfaces: interfaces.into_iter().map(str::to_owned).collect(),
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
    fn exports_superclass_interface_and_containment_edges() {
        let mut graph = ClassGraph::new();
        graph.link(minimal_class("Foo", Some("java.lang.Object"), vec!["java.io.Serializable"]), None);
        let mut outer = minimal_class("Outer", Some("java.lang.Object"), vec![]);
        outer.inner_classes.push(InnerClassInfo {
            inner_class: "Outer$Inner".to_owned(),
            outer_class: Some("Outer".to_owned()),
            inner_name: None,
            access_flags: ClassAccessFlags::PUBLIC,
        });
        graph.link(outer, None);

        let dig = to_graph(&graph);
        assert!(dig.contains_edge("Foo", "java.lang.Object"));
        assert!(dig.contains_edge("Foo", "java.io.Serializable"));
        assert!(dig.contains_edge("Outer$Inner", "Outer"));
    }
}
