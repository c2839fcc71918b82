// Report service - fans out finished test runs to subscribed generators
// Report generation is best-effort: one generator failing never blocks the
// others and never fails the test run itself.

pub mod json;
pub mod xml;

pub use json::JsonReportGenerator;
pub use xml::XmlReportGenerator;

use crate::config::Config;
use crate::error::ReportGenerationError;
use crate::model::TestRun;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything a generator needs for one render call.
pub struct ReportContext {
    output_directory: PathBuf,
    qualifier: Option<String>,
}

impl ReportContext {
    /// Target path for a run's report file. The run's own qualifier wins
    /// over the session qualifier when both are set.
    pub fn output_path(&self, run: &TestRun, extension: &str) -> PathBuf {
        let qualifier = run.qualifier.as_deref().or(self.qualifier.as_deref());
        self.output_directory
            .join(report_filename(&run.title, qualifier, extension))
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }
}

/// Report generator contract. Generators are identified by `name` so the
/// same type cannot be subscribed twice across repeated test setup.
pub trait ReportGenerator: Send + Sync {
    /// Stable identifier for this generator type.
    fn name(&self) -> &'static str;

    /// Render one run into the context's output directory and return the
    /// path of the produced file.
    fn render(&self, run: &TestRun, ctx: &ReportContext)
    -> Result<PathBuf, ReportGenerationError>;
}

/// One failed (generator, run) combination from a reporting pass.
#[derive(Debug)]
pub struct ReportFailure {
    pub generator: &'static str,
    pub run_title: String,
    pub error: ReportGenerationError,
}

/// Owns the report subscriptions for one reporting session.
pub struct ReportService {
    output_directory: PathBuf,
    qualifier: Option<String>,
    generators: Vec<Box<dyn ReportGenerator>>,
}

impl ReportService {
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            output_directory: output_directory.into(),
            qualifier: None,
            generators: Vec::new(),
        }
    }

    /// Service writing to the configured output directory, with the default
    /// XML and JSON generators subscribed.
    pub fn from_config(config: &Config) -> Self {
        let mut service = Self::new(config.report.output_directory.clone());
        service.subscribe(Box::new(XmlReportGenerator));
        service.subscribe(Box::new(JsonReportGenerator));
        service
    }

    /// Register a generator. A generator whose type is already subscribed is
    /// ignored.
    pub fn subscribe(&mut self, generator: Box<dyn ReportGenerator>) {
        if self.generators.iter().any(|g| g.name() == generator.name()) {
            debug!(generator = generator.name(), "generator already subscribed");
            return;
        }
        self.generators.push(generator);
    }

    /// Suffix applied to subsequently generated report file names, for
    /// data-driven reruns of the same scenario.
    pub fn use_qualifier(&mut self, qualifier: impl Into<String>) {
        self.qualifier = Some(qualifier.into());
    }

    pub fn subscriber_count(&self) -> usize {
        self.generators.len()
    }

    /// Render every run with every subscribed generator.
    ///
    /// Failures are logged and collected per (generator, run) pair; the
    /// remaining combinations still run. A run that is not yet terminal is a
    /// usage error, logged and rendered as its current snapshot.
    pub fn generate_reports_for(&self, runs: &[TestRun]) -> Vec<ReportFailure> {
        if let Err(error) = fs::create_dir_all(&self.output_directory) {
            // Each render will fail on its own and be collected below.
            warn!(
                path = %self.output_directory.display(),
                %error,
                "could not create report output directory"
            );
        }

        let ctx = ReportContext {
            output_directory: self.output_directory.clone(),
            qualifier: self.qualifier.clone(),
        };

        let mut failures = Vec::new();
        for generator in &self.generators {
            for run in runs {
                if !run.is_terminal() {
                    warn!(title = %run.title, "rendering a test run that is still in progress");
                }
                match generator.render(run, &ctx) {
                    Ok(path) => {
                        debug!(generator = generator.name(), path = %path.display(), "report written");
                    }
                    Err(error) => {
                        warn!(
                            generator = generator.name(),
                            title = %run.title,
                            %error,
                            "report generation failed"
                        );
                        failures.push(ReportFailure {
                            generator: generator.name(),
                            run_title: run.title.clone(),
                            error,
                        });
                    }
                }
            }
        }
        failures
    }
}

/// Collision-free, filesystem-safe report file name derived from the run
/// title and qualifier.
pub fn report_filename(title: &str, qualifier: Option<&str>, extension: &str) -> String {
    let mut stem = sanitize(title);
    if let Some(qualifier) = qualifier {
        stem.push('_');
        stem.push_str(&sanitize(qualifier));
    }
    format!("{stem}.{extension}")
}

fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_filename_is_sanitized() {
        assert_eq!(
            report_filename("Login succeeds!", None, "xml"),
            "login_succeeds_.xml"
        );
    }

    #[test]
    fn test_report_filename_includes_qualifier() {
        assert_eq!(
            report_filename("Login succeeds", Some("admin user"), "json"),
            "login_succeeds_admin_user.json"
        );
    }
}
