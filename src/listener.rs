// Step listener - turns host-runner lifecycle events into TestRun outcomes
// One listener instance observes one run at a time; run several instances
// for parallel test execution.

use crate::error::ListenerProtocolError;
use crate::model::{FailureCause, Step, TestResult, TestRun};
use std::path::PathBuf;
use tracing::{debug, warn};

const UNFINISHED_STEP: &str = "step did not complete";

/// Builds the outcome model incrementally from an ordered event stream.
///
/// Steps in progress live on an explicit stack; a step started while another
/// is open nests under it. Completed steps are appended to their parent in
/// call order, which is the canonical execution order.
#[derive(Debug, Default)]
pub struct StepListener {
    current: Option<TestRun>,
    stack: Vec<Step>,
    finished: Vec<TestRun>,
    protocol_errors: usize,
}

impl StepListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin observing a new test run.
    ///
    /// Starting a run while another is in progress is a protocol error: the
    /// interrupted run is force-completed with an error result before the
    /// new one begins.
    pub fn test_started(&mut self, title: &str) {
        self.test_started_with_qualifier(title, None);
    }

    /// Begin observing a data-driven variant of a scenario.
    pub fn test_started_with_qualifier(&mut self, title: &str, qualifier: Option<&str>) {
        if self.current.is_some() {
            self.protocol_error(ListenerProtocolError::TestAlreadyInProgress {
                title: title.to_string(),
            });
            self.abort_current_run(title);
        }

        debug!(title, "test started");
        let run = match qualifier {
            Some(qualifier) => TestRun::with_qualifier(title, qualifier),
            None => TestRun::new(title),
        };
        self.current = Some(run);
    }

    /// Open a new step. Nests under the currently open step, if any.
    pub fn step_started(&mut self, description: &str) {
        if self.current.is_none() {
            self.protocol_error(ListenerProtocolError::NoTestInProgress {
                event: "step_started",
            });
            return;
        }

        debug!(description, depth = self.stack.len(), "step started");
        let depth = self.stack.len();
        self.stack.push(Step::begin(description, depth));
    }

    /// Close the currently open step with the given terminal result.
    pub fn step_finished(&mut self, result: TestResult) {
        let Some(mut step) = self.stack.pop() else {
            self.protocol_error(ListenerProtocolError::NoStepInProgress {
                event: "step_finished",
            });
            return;
        };

        step.complete(result);
        self.record(step);
    }

    /// Close the currently open step as failed. Assertion causes become
    /// failures, defect causes become errors.
    pub fn step_failed(&mut self, cause: FailureCause) {
        let Some(mut step) = self.stack.pop() else {
            self.protocol_error(ListenerProtocolError::NoStepInProgress {
                event: "step_failed",
            });
            return;
        };

        step.fail(cause);
        self.record(step);
    }

    /// Record an opaque screenshot reference on the currently open step.
    pub fn attach_screenshot(&mut self, path: impl Into<PathBuf>) {
        match self.stack.last_mut() {
            Some(step) => step.screenshot = Some(path.into()),
            None => self.protocol_error(ListenerProtocolError::NoStepInProgress {
                event: "attach_screenshot",
            }),
        }
    }

    /// Finalize the current run. Any step still open is forced to an error
    /// result before the overall outcome is derived.
    pub fn test_finished(&mut self) {
        if self.current.is_none() {
            self.protocol_error(ListenerProtocolError::NoTestInProgress {
                event: "test_finished",
            });
            return;
        }

        while let Some(mut step) = self.stack.pop() {
            warn!(description = %step.description, "forcing unfinished step to error");
            step.fail(FailureCause::defect(UNFINISHED_STEP));
            self.record(step);
        }

        if let Some(mut run) = self.current.take() {
            run.finalize();
            debug!(title = %run.title, result = ?run.result(), "test finished");
            self.finished.push(run);
        }
    }

    /// Mark the current run (or its open step) as skipped. No further steps
    /// are expected for the run.
    pub fn test_ignored(&mut self) {
        if self.current.is_none() {
            self.protocol_error(ListenerProtocolError::NoTestInProgress {
                event: "test_ignored",
            });
            return;
        }

        while let Some(mut step) = self.stack.pop() {
            step.complete(TestResult::Skipped);
            self.record(step);
        }

        if let Some(mut run) = self.current.take() {
            if run.steps.is_empty() {
                run.force_result(TestResult::Skipped);
            }
            run.finalize();
            debug!(title = %run.title, "test ignored");
            self.finished.push(run);
        }
    }

    /// Whether a run is currently being observed.
    pub fn test_in_progress(&self) -> bool {
        self.current.is_some()
    }

    /// Completed runs, in the order they finished.
    pub fn results(&self) -> &[TestRun] {
        &self.finished
    }

    /// Consume the listener, force-completing any run still in progress.
    pub fn into_results(mut self) -> Vec<TestRun> {
        if self.current.is_some() {
            self.test_finished();
        }
        self.finished
    }

    /// Number of out-of-order lifecycle calls absorbed so far.
    pub fn protocol_error_count(&self) -> usize {
        self.protocol_errors
    }

    // Force-complete the interrupted run as an error when a new test starts
    // over it.
    fn abort_current_run(&mut self, next_title: &str) {
        while let Some(mut step) = self.stack.pop() {
            step.fail(FailureCause::defect(UNFINISHED_STEP));
            self.record(step);
        }

        if let Some(mut run) = self.current.take() {
            run.cause = Some(FailureCause::defect(format!(
                "test \"{next_title}\" started while \"{}\" was still in progress",
                run.title
            )));
            run.force_result(TestResult::Error);
            run.finalize();
            self.finished.push(run);
        }
    }

    fn record(&mut self, step: Step) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(step);
        } else if let Some(run) = self.current.as_mut() {
            run.record_step(step);
        }
    }

    fn protocol_error(&mut self, error: ListenerProtocolError) {
        warn!(%error, "listener protocol error ignored");
        self.protocol_errors += 1;
    }
}
