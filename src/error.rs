// Error kinds for the listener, report service, and driver boundary
// Nothing raised inside the listener or report service escapes to the
// caller; these types are logged and reflected into the outcome model.

use std::path::PathBuf;
use thiserror::Error;

/// An out-of-order lifecycle call from the host runner. Logged and ignored
/// so a defective caller cannot abort the reporting pipeline.
#[derive(Debug, Error)]
pub enum ListenerProtocolError {
    #[error("test \"{title}\" started while another test was in progress")]
    TestAlreadyInProgress { title: String },

    #[error("{event} received with no test in progress")]
    NoTestInProgress { event: &'static str },

    #[error("{event} received with no step in progress")]
    NoStepInProgress { event: &'static str },
}

/// A report generator failed for one (generator, run) pair.
#[derive(Debug, Error)]
pub enum ReportGenerationError {
    #[error("failed to write report file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize test run \"{title}\"")]
    Serialize {
        title: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The configured driver identifier names no known automation backend.
/// Fatal to the one test run that needed the driver, not to the process.
#[derive(Debug, Error)]
#[error("unsupported driver type \"{0}\"")]
pub struct UnsupportedDriverError(pub String);
