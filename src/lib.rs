pub mod config;
pub mod driver;
pub mod error;
pub mod listener;
pub mod logging;
pub mod model;
pub mod report;

pub use config::Config;
pub use listener::StepListener;
pub use model::{FailureCause, Step, TestResult, TestRun};
pub use report::{ReportGenerator, ReportService};
