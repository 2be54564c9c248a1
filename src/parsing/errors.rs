//! The error taxonomy for classfile parsing.
//!
//! Per the design note on exceptions-as-control-flow, a malformed classfile is not always a
//! bug in the input: some conditions (an unsupported class-file version with strict checks
//! disabled, a filtered-out attribute) are expected and should simply cause this one classfile
//! to be skipped rather than aborting a whole scan. [`ParseOutcome`] makes that distinction a
//! first-class return type instead of threading a second out-of-band flag through every layer.

use thiserror::Error;

use crate::signature;

/// A failure while decoding the binary layout of a classfile. Always a format problem: the
/// bytes do not describe a valid classfile, independent of any [`crate::parsing::ScanConfig`]
/// policy.
#[derive(Debug, Error)]
pub enum Error {
    /// Ran out of bytes before a structure was fully read.
    #[error("unexpected end of classfile buffer")]
    UnexpectedEof,
    /// The leading 4 bytes were not `0xCAFEBABE`.
    #[error("not a class file: bad magic")]
    BadMagic,
    /// A modified-UTF8 / CESU-8 byte sequence could not be decoded.
    #[error("invalid modified UTF-8 string")]
    BrokenModifiedUtf8,
    /// A constant-pool tag byte did not match any of the tags this format recognizes.
    #[error("unrecognized constant pool tag {0}")]
    UnknownConstantPoolTag(u8),
    /// A constant-pool index was 0, out of range, or pointed at the wrong kind of entry.
    #[error("bad constant pool index {index}: {reason}")]
    BadConstantPoolIndex {
        /// The offending index.
        index: u16,
        /// Why the index was rejected.
        reason: &'static str,
    },
    /// An `element_value`'s tag byte was not one of the recognized value-type tags.
    #[error("invalid annotation element_value tag {0:?}")]
    InvalidElementValueTag(char),
    /// A field or method descriptor, or a generic signature, failed to parse.
    #[error("invalid type descriptor or signature: {0}")]
    InvalidSignature(#[from] signature::ParseError),
    /// The class's own name, as recorded in the constant pool, was the empty string.
    #[error("class name must not be empty")]
    EmptyClassName,
    /// An access-flags bitfield contained bits this format does not recognize.
    #[error("unknown access flags {bits:#x} for {context}")]
    UnknownAccessFlags {
        /// The raw flags value.
        bits: u16,
        /// What kind of item the flags were attached to (class, field, method, ...).
        context: &'static str,
    },
    /// Underlying I/O failure from the byte source.
    #[error("I/O error reading class file: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a classfile was skipped rather than fully parsed. Not an error: the bytes were valid, but
/// a [`crate::parsing::ScanConfig`] policy excluded this class from the scan, or the class is
/// `java.lang.Object` (whose null superclass breaks linking assumptions, even though it remains
/// reachable as an external class elsewhere).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The class was `java.lang.Object`.
    ObjectClass,
    /// The class's visibility did not match the configured filter (non-public, and visibility
    /// enforcement was not disabled).
    NotVisible,
    /// The resource's relative path did not equal `name.replace('.', '/') + ".class"`.
    PathNameMismatch {
        /// The path the resource was discovered at.
        path: String,
        /// The name recorded inside the classfile.
        class_name: String,
    },
}

/// The result of attempting to parse one classfile.
///
/// This replaces throwing an exception for the "this classfile should be skipped" case: `Skip`
/// and `Error` are sibling outcomes, not one nested inside the other, so callers can match on
/// intent (skip and move on vs. abort and report) without inspecting error contents.
#[derive(Debug)]
pub enum ParseOutcome<T> {
    /// The classfile was fully parsed.
    Done(T),
    /// The classfile was valid but excluded by policy.
    Skip(SkipReason),
    /// The classfile's bytes were malformed.
    Error(Error),
}

impl<T> ParseOutcome<T> {
    /// Returns the parsed value, if any.
    #[must_use]
    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            Self::Skip(_) | Self::Error(_) => None,
        }
    }

    /// Whether this outcome is a `Skip`.
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::Skip(_))
    }
}
