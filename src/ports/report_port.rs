//! Report output port trait.

use crate::domain::error::PermafolioError;
use crate::domain::simulation::YearlyReport;

/// Port for persisting a simulation report; rendering and charting live on
/// the other side of this boundary.
pub trait ReportPort {
    fn write(&self, report: &YearlyReport, output_path: &str) -> Result<(), PermafolioError>;
}
