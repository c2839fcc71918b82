// Step and failure cause structures

use crate::model::{TestResult, now_millis};
use serde::Serialize;
use std::path::PathBuf;

/// Classification of what made a step fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CauseKind {
    /// An assertion about expected behavior did not hold.
    Assertion,
    /// Any other defect: a panic, a lost browser session, an IO failure.
    Defect,
}

/// Why a step (or a whole run) did not pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureCause {
    pub kind: CauseKind,
    pub message: String,
    pub backtrace: Option<String>,
}

impl CauseKind {
    /// Lowercase label used in report output.
    pub fn label(&self) -> &'static str {
        match self {
            CauseKind::Assertion => "assertion",
            CauseKind::Defect => "defect",
        }
    }
}

impl FailureCause {
    pub fn assertion(message: impl Into<String>) -> Self {
        Self {
            kind: CauseKind::Assertion,
            message: message.into(),
            backtrace: None,
        }
    }

    pub fn defect(message: impl Into<String>) -> Self {
        Self {
            kind: CauseKind::Defect,
            message: message.into(),
            backtrace: None,
        }
    }

    pub fn with_backtrace(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }

    /// Terminal result for a step that failed with this cause.
    /// Assertions are failures; everything else is an error.
    pub fn step_result(&self) -> TestResult {
        match self.kind {
            CauseKind::Assertion => TestResult::Failure,
            CauseKind::Defect => TestResult::Error,
        }
    }
}

/// One named unit of behavior within a run. Steps may nest; a step owns its
/// children exclusively.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub description: String,
    pub result: TestResult,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub depth: usize,
    pub screenshot: Option<PathBuf>,
    pub cause: Option<FailureCause>,
    pub children: Vec<Step>,
}

impl Step {
    /// Start a step at the given nesting depth. The step stays pending until
    /// it is completed.
    pub(crate) fn begin(description: impl Into<String>, depth: usize) -> Self {
        Self {
            description: description.into(),
            result: TestResult::Pending,
            started_at: now_millis(),
            ended_at: None,
            depth,
            screenshot: None,
            cause: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn complete(&mut self, result: TestResult) {
        self.result = result;
        self.ended_at = Some(now_millis());
    }

    pub(crate) fn fail(&mut self, cause: FailureCause) {
        self.result = cause.step_result();
        self.cause = Some(cause);
        self.ended_at = Some(now_millis());
    }

    pub fn duration_ms(&self) -> u64 {
        self.ended_at
            .map(|end| end.saturating_sub(self.started_at).max(0) as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_cause_yields_failure() {
        let cause = FailureCause::assertion("expected title to contain 'Home'");
        assert_eq!(cause.step_result(), TestResult::Failure);
        assert_eq!(cause.kind, CauseKind::Assertion);
    }

    #[test]
    fn test_defect_cause_yields_error() {
        let cause = FailureCause::defect("browser session lost");
        assert_eq!(cause.step_result(), TestResult::Error);
    }

    #[test]
    fn test_fail_records_cause_and_result() {
        let mut step = Step::begin("click login", 0);
        step.fail(FailureCause::assertion("login button not shown"));
        assert_eq!(step.result, TestResult::Failure);
        assert_eq!(
            step.cause.as_ref().map(|c| c.message.as_str()),
            Some("login button not shown")
        );
        assert!(step.ended_at.is_some());
    }

    #[test]
    fn test_backtrace_is_preserved() {
        let cause = FailureCause::defect("panic in step body").with_backtrace("at stepledger::...");
        assert_eq!(cause.backtrace.as_deref(), Some("at stepledger::..."));
    }

    #[test]
    fn test_new_step_is_pending() {
        let step = Step::begin("enter username", 1);
        assert_eq!(step.result, TestResult::Pending);
        assert_eq!(step.depth, 1);
        assert!(step.ended_at.is_none());
    }
}
