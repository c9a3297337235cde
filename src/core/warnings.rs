//! Per-run warning collector.
//!
//! Warnings never fail a run on their own. They are logged as they happen and
//! counted so that `--strict` can turn a non-zero count into an error at the
//! very end of the run.

use std::sync::Mutex;

use crate::core::VndrError;

/// Accumulates the warnings emitted during one vendoring run.
///
/// A `Warnings` value is created by the command driver and passed by reference
/// to every step that can warn. Interior mutability keeps the call sites free
/// of `&mut` plumbing.
#[derive(Debug, Default)]
pub struct Warnings {
    messages: Mutex<Vec<String>>,
}

impl Warnings {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a warning and record it.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("WARNING: {}", message);
        self.messages.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(message);
    }

    /// Number of warnings recorded so far.
    pub fn count(&self) -> usize {
        self.messages.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    /// Snapshot of the recorded warnings, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Fail with [`VndrError::StrictWarnings`] when `strict` is set and any
    /// warning was recorded.
    pub fn check_strict(&self, strict: bool) -> Result<(), VndrError> {
        let count = self.count();
        if strict && count > 0 {
            return Err(VndrError::StrictWarnings {
                count,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_are_recorded_in_order() {
        let warnings = Warnings::new();
        warnings.warn("first");
        warnings.warn(String::from("second"));
        assert_eq!(warnings.count(), 2);
        assert_eq!(warnings.messages(), vec!["first", "second"]);
    }

    #[test]
    fn test_strict_only_fails_with_warnings() {
        let warnings = Warnings::new();
        assert!(warnings.check_strict(true).is_ok());

        warnings.warn("package x is unused");
        assert!(warnings.check_strict(false).is_ok());
        assert!(matches!(
            warnings.check_strict(true),
            Err(VndrError::StrictWarnings { count: 1 })
        ));
    }
}
