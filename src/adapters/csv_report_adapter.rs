//! CSV report adapter: tabular YearlyReport export for downstream charting.

use crate::domain::error::PermafolioError;
use crate::domain::simulation::YearlyReport;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        CsvReportAdapter
    }

    /// Path for the companion failure file: `report.csv` →
    /// `report.failures.csv`.
    fn failures_path(output_path: &str) -> String {
        match output_path.rsplit_once('.') {
            Some((stem, ext)) => format!("{stem}.failures.{ext}"),
            None => format!("{output_path}.failures"),
        }
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    /// Write the yearly rows to `output_path`. Failed years, if any, go to
    /// a companion `.failures` file so a degraded run leaves a visible
    /// trace next to the report.
    fn write(&self, report: &YearlyReport, output_path: &str) -> Result<(), PermafolioError> {
        let mut writer = csv::Writer::from_path(output_path).map_err(|e| PermafolioError::Data {
            reason: format!("failed to open {}: {}", output_path, e),
        })?;
        for row in &report.rows {
            writer.serialize(row).map_err(|e| PermafolioError::Data {
                reason: format!("failed to write report row: {e}"),
            })?;
        }
        writer.flush()?;

        if !report.failures.is_empty() {
            let path = Self::failures_path(output_path);
            let mut writer = csv::Writer::from_path(&path).map_err(|e| PermafolioError::Data {
                reason: format!("failed to open {}: {}", path, e),
            })?;
            for failure in &report.failures {
                writer.serialize(failure).map_err(|e| PermafolioError::Data {
                    reason: format!("failed to write failure row: {e}"),
                })?;
            }
            writer.flush()?;
        }
        Ok(())
    }
}
