use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use prodintel_scoring::ScoredProduct;

use crate::report::{ReportError, ReportSummary, ReportWriter};

/// Writes the report as a pretty-printed JSON array (2-space indent).
#[derive(Debug, Clone)]
pub struct JsonFileReportWriter {
    path: PathBuf,
}

impl JsonFileReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ReportError {
        ReportError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Render the report body exactly as it is written to disk.
pub fn render_report(products: &[ScoredProduct]) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(products)?)
}

impl ReportWriter for JsonFileReportWriter {
    fn write(&self, products: &[ScoredProduct]) -> Result<ReportSummary, ReportError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
                info!(dir = %parent.display(), "created output directory");
            }
        }

        let body = render_report(products)?;
        fs::write(&self.path, body).map_err(|e| self.io_error(e))?;

        let summary = ReportSummary::from_products(products);
        info!(
            path = %self.path.display(),
            high = summary.high,
            medium = summary.medium,
            low = summary.low,
            "report saved"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_empty_report_and_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs/nested/analysis_report.json");
        let writer = JsonFileReportWriter::new(&path);

        let summary = writer.write(&[]).unwrap();

        assert_eq!(summary, ReportSummary::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
