// JSON report generator - one JSON document per test run

use super::{ReportContext, ReportGenerator};
use crate::error::ReportGenerationError;
use crate::model::TestRun;
use std::fs::File;
use std::path::PathBuf;

/// Renders a run as pretty-printed JSON, derived result included.
pub struct JsonReportGenerator;

impl ReportGenerator for JsonReportGenerator {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(
        &self,
        run: &TestRun,
        ctx: &ReportContext,
    ) -> Result<PathBuf, ReportGenerationError> {
        // The overall result is derived, not stored, so it is added here
        // alongside the serialized run.
        let document = serde_json::json!({
            "title": run.title,
            "qualifier": run.qualifier,
            "result": run.result(),
            "started_at": run.started_at,
            "ended_at": run.ended_at,
            "duration_ms": run.duration_ms(),
            "cause": run.cause(),
            "steps": run.steps,
        });

        let path = ctx.output_path(run, "json");
        let file = File::create(&path).map_err(|source| ReportGenerationError::Io {
            path: path.clone(),
            source,
        })?;

        serde_json::to_writer_pretty(file, &document).map_err(|source| {
            ReportGenerationError::Serialize {
                title: run.title.clone(),
                source,
            }
        })?;

        Ok(path)
    }
}
