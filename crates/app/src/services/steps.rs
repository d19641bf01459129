//! Ordered best-effort step sequences.
//!
//! Some operations touch two systems without a shared transaction (object
//! storage then database, identity then profile). Each step runs on its own
//! and its error is captured; the operation succeeds when its primary step
//! succeeds. Secondary failures are logged as warnings.

use std::fmt::Display;

/// Whether a step decides the outcome of the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Primary,
    BestEffort,
}

/// Outcome of a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub name: &'static str,
    pub kind: StepKind,
    pub error: Option<String>,
}

impl StepRecord {
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Step log for one multi-step operation.
#[derive(Debug, Clone)]
pub struct StepLog {
    operation: &'static str,
    steps: Vec<StepRecord>,
}

impl StepLog {
    #[must_use]
    pub const fn new(operation: &'static str) -> Self {
        Self {
            operation,
            steps: Vec::new(),
        }
    }

    /// Record the result of a step and pass its value through.
    pub fn record<T, E: Display>(
        &mut self,
        name: &'static str,
        kind: StepKind,
        result: Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => {
                self.steps.push(StepRecord {
                    name,
                    kind,
                    error: None,
                });
                Some(value)
            }
            Err(e) => {
                match kind {
                    StepKind::Primary => tracing::error!(
                        operation = self.operation,
                        step = name,
                        error = %e,
                        "Primary step failed"
                    ),
                    StepKind::BestEffort => tracing::warn!(
                        operation = self.operation,
                        step = name,
                        error = %e,
                        "Best-effort step failed, continuing"
                    ),
                }
                self.steps.push(StepRecord {
                    name,
                    kind,
                    error: Some(e.to_string()),
                });
                None
            }
        }
    }

    /// True if at least one primary step ran and none failed.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        let mut primaries = self
            .steps
            .iter()
            .filter(|s| s.kind == StepKind::Primary)
            .peekable();
        primaries.peek().is_some() && primaries.all(StepRecord::succeeded)
    }

    /// Error of the first failed primary step.
    #[must_use]
    pub fn primary_error(&self) -> Option<&str> {
        self.steps
            .iter()
            .find(|s| s.kind == StepKind::Primary && !s.succeeded())
            .and_then(|s| s.error.as_deref())
    }

    /// Names of best-effort steps that failed.
    #[must_use]
    pub fn warnings(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .filter(|s| s.kind == StepKind::BestEffort && !s.succeeded())
            .map(|s| s.name)
            .collect()
    }

    #[must_use]
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_effort_failure_does_not_fail_operation() {
        let mut log = StepLog::new("delete_content");
        log.record::<(), _>("delete_object", StepKind::BestEffort, Err("storage down"));
        log.record::<(), &str>("delete_record", StepKind::Primary, Ok(()));

        assert!(log.succeeded());
        assert_eq!(log.warnings(), vec!["delete_object"]);
        assert_eq!(log.steps().len(), 2);
    }

    #[test]
    fn test_primary_failure_fails_operation() {
        let mut log = StepLog::new("switch_role");
        log.record::<(), _>("update_claim", StepKind::Primary, Err("no such identity"));
        assert!(!log.succeeded());
        assert_eq!(log.primary_error(), Some("no such identity"));
    }

    #[test]
    fn test_empty_log_is_not_success() {
        let log = StepLog::new("noop");
        assert!(!log.succeeded());
    }

    #[test]
    fn test_record_passes_value_through() {
        let mut log = StepLog::new("op");
        let value = log.record::<_, &str>("step", StepKind::Primary, Ok(42));
        assert_eq!(value, Some(42));
    }
}
