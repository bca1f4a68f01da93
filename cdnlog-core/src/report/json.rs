use crate::analysis::AnalysisResults;
use crate::conf::AppConfig;
use crate::report::Reporter;
use anyhow::Context;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const REPORT_FILE_NAME: &str = "analysis.json";

/// Writes `analyzer → table → {columns, rows}` to `<report_path>/analysis.json`.
pub struct JsonReporter {
    report_dir: PathBuf,
}

impl JsonReporter {
    pub fn new(report_dir: &Path) -> Self {
        Self {
            report_dir: report_dir.to_path_buf(),
        }
    }

    pub fn report_file(&self) -> PathBuf {
        self.report_dir.join(REPORT_FILE_NAME)
    }
}

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn generate(&self, results: &AnalysisResults, _cfg: &AppConfig) -> anyhow::Result<()> {
        fs::create_dir_all(&self.report_dir).with_context(|| {
            format!("failed to create report directory {}", self.report_dir.display())
        })?;

        let path = self.report_file();
        let file =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, results)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!(file = %path.display(), "JSON report written");
        Ok(())
    }
}
