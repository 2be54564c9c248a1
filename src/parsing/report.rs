//! Thin logging wrapper around a classfile's [`ParseOutcome`] (§10.2).
//!
//! This crate never configures a logging subscriber itself — that choice stays with the host
//! binary. `Skip` outcomes and format errors are still worth a diagnostic trail even though
//! neither aborts the scan. `log::debug!`/`log::warn!` calls here are no-ops until a host
//! installs a subscriber.

use crate::parsing::errors::{Error, ParseOutcome, SkipReason};

/// Logs `outcome` at a severity appropriate to its kind, then returns it unchanged so callers can
/// chain this into the same expression that produced it.
pub fn log_outcome<T>(relative_path: &str, outcome: ParseOutcome<T>) -> ParseOutcome<T> {
    match &outcome {
        ParseOutcome::Done(_) => {
            log::trace!("parsed {relative_path}");
        }
        ParseOutcome::Skip(reason) => {
            log::debug!("skipped {relative_path}: {}", describe_skip(reason));
        }
        ParseOutcome::Error(err) => {
            log::warn!("failed to parse {relative_path}: {err}");
        }
    }
    outcome
}

fn describe_skip(reason: &SkipReason) -> String {
    match reason {
        SkipReason::ObjectClass => "java.lang.Object".to_owned(),
        SkipReason::NotVisible => "not visible under the current scan policy".to_owned(),
        SkipReason::PathNameMismatch { path, class_name } => {
            format!("path {path:?} does not match class name {class_name:?}")
        }
    }
}

/// Logs a discovery miss for `class_name` at `debug`, except for `java.lang.Object` (an expected,
/// frequent miss per §4.6: its superclass reference never resolves to a classpath resource).
pub fn log_discovery_miss(class_name: &str) {
    if class_name != "java.lang.Object" {
        log::debug!("could not find a classfile resource for external class {class_name}");
    }
}

/// Logs a successful discovery-driven schedule at `trace`.
pub fn log_discovery_scheduled(class_name: &str, relative_path: &str) {
    log::trace!("scheduled external class {class_name} found at {relative_path}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_outcome_passes_value_through() {
        let outcome: ParseOutcome<i32> = ParseOutcome::Done(42);
        let outcome = log_outcome("Foo.class", outcome);
        assert_eq!(outcome.done(), Some(42));
    }

    #[test]
    fn log_outcome_skip_passes_through() {
        let outcome: ParseOutcome<i32> = ParseOutcome::Skip(SkipReason::ObjectClass);
        let outcome = log_outcome("java/lang/Object.class", outcome);
        assert!(outcome.is_skip());
    }

    #[test]
    fn error_describe_contains_message() {
        let err = Error::BadMagic;
        assert!(err.to_string().contains("bad magic"));
    }
}
