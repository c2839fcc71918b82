// Outcome model - test runs, steps, and result derivation
// The overall result of a run is always derived from its step tree on read,
// never cached.

pub mod step;

pub use step::{CauseKind, FailureCause, Step};

use serde::Serialize;

/// Outcome of a test run or of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    Success,
    Failure,
    Error,
    Skipped,
    Pending,
}

impl TestResult {
    /// Lowercase label used in report output.
    pub fn label(&self) -> &'static str {
        match self {
            TestResult::Success => "success",
            TestResult::Failure => "failure",
            TestResult::Error => "error",
            TestResult::Skipped => "skipped",
            TestResult::Pending => "pending",
        }
    }

    /// Whether the result counts as passed.
    pub fn is_passed(&self) -> bool {
        matches!(self, TestResult::Success)
    }
}

/// One execution of a test scenario and its recorded steps.
#[derive(Debug, Clone, Serialize)]
pub struct TestRun {
    pub title: String,
    /// Disambiguates data-driven variants of the same scenario.
    pub qualifier: Option<String>,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub steps: Vec<Step>,
    pub cause: Option<FailureCause>,
    forced_result: Option<TestResult>,
}

impl TestRun {
    /// Create a run in progress, stamped with the current time.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            qualifier: None,
            started_at: now_millis(),
            ended_at: None,
            steps: Vec::new(),
            cause: None,
            forced_result: None,
        }
    }

    /// Create a run for a data-driven variant.
    pub fn with_qualifier(title: impl Into<String>, qualifier: impl Into<String>) -> Self {
        let mut run = Self::new(title);
        run.qualifier = Some(qualifier.into());
        run
    }

    /// Overall result, derived from the step tree on every call.
    ///
    /// An error anywhere in the tree dominates; otherwise any failure makes
    /// the run a failure; a tree of only skipped/pending steps is pending if
    /// any step is pending, skipped otherwise; anything else is a success.
    /// A run with no recorded steps is pending. A forced result (ignored
    /// runs, protocol errors) overrides the derivation.
    pub fn result(&self) -> TestResult {
        self.forced_result
            .unwrap_or_else(|| derive_result(&self.steps))
    }

    /// Whether the run has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.ended_at.is_some() || self.forced_result.is_some()
    }

    /// Failure cause of the run, falling back to the first failed step in
    /// execution order when the run itself carries none.
    pub fn cause(&self) -> Option<&FailureCause> {
        self.cause
            .as_ref()
            .or_else(|| first_cause_in(&self.steps))
    }

    /// Number of steps in the tree, nested steps included.
    pub fn step_count(&self) -> usize {
        count_steps(&self.steps)
    }

    pub fn duration_ms(&self) -> u64 {
        self.ended_at
            .map(|end| end.saturating_sub(self.started_at).max(0) as u64)
            .unwrap_or(0)
    }

    pub(crate) fn record_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub(crate) fn force_result(&mut self, result: TestResult) {
        self.forced_result = Some(result);
    }

    pub(crate) fn finalize(&mut self) {
        if self.ended_at.is_none() {
            self.ended_at = Some(now_millis());
        }
    }
}

fn derive_result(steps: &[Step]) -> TestResult {
    if steps.is_empty() {
        return TestResult::Pending;
    }

    let mut any_failure = false;
    let mut any_pending = false;
    let mut all_dormant = true;

    let mut remaining: Vec<&Step> = steps.iter().collect();
    while let Some(step) = remaining.pop() {
        match step.result {
            TestResult::Error => return TestResult::Error,
            TestResult::Failure => {
                any_failure = true;
                all_dormant = false;
            }
            TestResult::Pending => any_pending = true,
            TestResult::Skipped => {}
            TestResult::Success => all_dormant = false,
        }
        remaining.extend(step.children.iter());
    }

    if any_failure {
        TestResult::Failure
    } else if all_dormant {
        if any_pending {
            TestResult::Pending
        } else {
            TestResult::Skipped
        }
    } else {
        TestResult::Success
    }
}

fn first_cause_in(steps: &[Step]) -> Option<&FailureCause> {
    for step in steps {
        if let Some(cause) = &step.cause {
            return Some(cause);
        }
        if let Some(cause) = first_cause_in(&step.children) {
            return Some(cause);
        }
    }
    None
}

fn count_steps(steps: &[Step]) -> usize {
    steps
        .iter()
        .map(|step| 1 + count_steps(&step.children))
        .sum()
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_step(description: &str, result: TestResult) -> Step {
        let mut step = Step::begin(description, 0);
        step.complete(result);
        step
    }

    fn run_with(results: &[TestResult]) -> TestRun {
        let mut run = TestRun::new("scenario");
        for (i, result) in results.iter().enumerate() {
            run.record_step(finished_step(&format!("step {i}"), *result));
        }
        run.finalize();
        run
    }

    #[test]
    fn test_empty_run_is_pending() {
        let run = run_with(&[]);
        assert_eq!(run.result(), TestResult::Pending);
    }

    #[test]
    fn test_all_success_is_success() {
        let run = run_with(&[TestResult::Success, TestResult::Success]);
        assert_eq!(run.result(), TestResult::Success);
    }

    #[test]
    fn test_error_dominates_failure() {
        let run = run_with(&[TestResult::Failure, TestResult::Error, TestResult::Success]);
        assert_eq!(run.result(), TestResult::Error);
    }

    #[test]
    fn test_failure_dominates_success() {
        let run = run_with(&[TestResult::Success, TestResult::Failure]);
        assert_eq!(run.result(), TestResult::Failure);
    }

    #[test]
    fn test_all_skipped_is_skipped() {
        let run = run_with(&[TestResult::Skipped, TestResult::Skipped]);
        assert_eq!(run.result(), TestResult::Skipped);
    }

    #[test]
    fn test_skipped_and_pending_is_pending() {
        let run = run_with(&[TestResult::Skipped, TestResult::Pending]);
        assert_eq!(run.result(), TestResult::Pending);
    }

    #[test]
    fn test_success_with_pending_is_success() {
        let run = run_with(&[TestResult::Success, TestResult::Pending]);
        assert_eq!(run.result(), TestResult::Success);
    }

    #[test]
    fn test_nested_error_dominates() {
        let mut run = TestRun::new("scenario");
        let mut parent = Step::begin("parent", 0);
        parent.children.push(finished_step("child", TestResult::Error));
        parent.complete(TestResult::Success);
        run.record_step(parent);
        run.finalize();
        assert_eq!(run.result(), TestResult::Error);
    }

    #[test]
    fn test_result_recomputed_after_step_change() {
        let mut run = run_with(&[TestResult::Success]);
        assert_eq!(run.result(), TestResult::Success);
        run.steps[0].result = TestResult::Failure;
        assert_eq!(run.result(), TestResult::Failure);
    }

    #[test]
    fn test_cause_falls_back_to_first_failed_step() {
        let mut run = TestRun::new("scenario");
        let mut step = Step::begin("broken", 0);
        step.fail(FailureCause::assertion("expected a welcome banner"));
        run.record_step(step);
        run.finalize();

        let cause = run.cause().expect("run should expose the step cause");
        assert_eq!(cause.message, "expected a welcome banner");
        assert_eq!(cause.kind, CauseKind::Assertion);
    }

    #[test]
    fn test_step_count_includes_nested() {
        let mut run = TestRun::new("scenario");
        let mut parent = Step::begin("parent", 0);
        parent.children.push(finished_step("child", TestResult::Success));
        parent.complete(TestResult::Success);
        run.record_step(parent);
        run.record_step(finished_step("sibling", TestResult::Success));
        assert_eq!(run.step_count(), 3);
    }

    #[test]
    fn test_in_progress_run_is_not_terminal() {
        let run = TestRun::new("scenario");
        assert!(!run.is_terminal());
    }
}
