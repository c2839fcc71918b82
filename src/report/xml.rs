// XML report generator - one JUnit-flavoured XML file per test run

use super::{ReportContext, ReportGenerator};
use crate::error::ReportGenerationError;
use crate::model::{Step, TestRun};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Renders a run and its step tree as an XML document. The format is simple
/// enough that string construction suffices; no XML dependency needed.
pub struct XmlReportGenerator;

impl ReportGenerator for XmlReportGenerator {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn render(
        &self,
        run: &TestRun,
        ctx: &ReportContext,
    ) -> Result<PathBuf, ReportGenerationError> {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<test-run title=\"{}\" result=\"{}\" steps=\"{}\" time=\"{:.3}\"",
            escape(&run.title),
            run.result().label(),
            run.step_count(),
            run.duration_ms() as f64 / 1000.0
        ));
        if let Some(qualifier) = &run.qualifier {
            xml.push_str(&format!(" qualifier=\"{}\"", escape(qualifier)));
        }
        xml.push_str(">\n");

        if let Some(cause) = run.cause() {
            xml.push_str(&format!(
                "  <cause kind=\"{}\" message=\"{}\"/>\n",
                cause.kind.label(),
                escape(&cause.message)
            ));
        }

        for step in &run.steps {
            write_step(&mut xml, step, 1);
        }

        xml.push_str("</test-run>\n");

        let path = ctx.output_path(run, "xml");
        let mut file = File::create(&path).map_err(|source| ReportGenerationError::Io {
            path: path.clone(),
            source,
        })?;
        file.write_all(xml.as_bytes())
            .map_err(|source| ReportGenerationError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

fn write_step(xml: &mut String, step: &Step, indent: usize) {
    let pad = "  ".repeat(indent);
    xml.push_str(&format!(
        "{pad}<step description=\"{}\" result=\"{}\" time=\"{:.3}\"",
        escape(&step.description),
        step.result.label(),
        step.duration_ms() as f64 / 1000.0
    ));
    if let Some(screenshot) = &step.screenshot {
        xml.push_str(&format!(
            " screenshot=\"{}\"",
            escape(&screenshot.to_string_lossy())
        ));
    }

    if step.cause.is_none() && step.children.is_empty() {
        xml.push_str("/>\n");
        return;
    }
    xml.push_str(">\n");

    if let Some(cause) = &step.cause {
        xml.push_str(&format!(
            "{pad}  <cause kind=\"{}\" message=\"{}\"/>\n",
            cause.kind.label(),
            escape(&cause.message)
        ));
    }
    for child in &step.children {
        write_step(xml, child, indent + 1);
    }
    xml.push_str(&format!("{pad}</step>\n"));
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(
            escape("Error with <special> & \"chars\""),
            "Error with &lt;special&gt; &amp; &quot;chars&quot;"
        );
    }
}
