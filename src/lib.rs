#![warn(
    clippy::pedantic,
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    rust_2021_compatibility
)]
// #![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

//! A JVM classfile parser and class-graph linker.
//!
//! This crate reads `.class` bytes (JVMS §4) into plain data (no bytecode interpretation), and
//! links the results of a classpath scan into a [`linker::ClassGraph`] describing the
//! superclass/interface/containment relationships between classes, packages, and modules.
//!
//! ## Features
#![doc = document_features::document_features!()]

pub mod annotation;
pub mod class;
pub mod discovery;
pub mod linker;
pub mod parsing;
pub mod pool;
pub mod reader;
pub(crate) mod references;
pub mod signature;

#[cfg(test)]
mod tests;
