//! Domain error types.

use chrono::NaiveDate;

use super::instrument::Instrument;
use super::regime::Quadrant;

/// Top-level error type for permafolio.
#[derive(Debug, thiserror::Error)]
pub enum PermafolioError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error("no data for {instrument} in the fetched window")]
    MissingInstrument { instrument: Instrument },

    #[error(
        "insufficient data for {instrument}: have {observations} observations, need {minimum}"
    )]
    InsufficientData {
        instrument: Instrument,
        observations: usize,
        minimum: usize,
    },

    #[error("undefined {figure} growth over [{start}, {end}]: no valid observations")]
    UndefinedRatio {
        figure: &'static str,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("all candidate assets have non-positive Sharpe scores for {quadrant}")]
    NoPositiveSharpe { quadrant: Quadrant },

    #[error("rebalancing cadence must be at least 1 day, got {cadence_days}")]
    InvalidCadence { cadence_days: i64 },

    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("no return rule defined for {quadrant}")]
    UnknownQuadrant { quadrant: Quadrant },

    #[error("year {year} failed during {stage}: {source}")]
    YearFailed {
        year: i32,
        stage: &'static str,
        source: Box<PermafolioError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PermafolioError {
    /// Wrap an error with the year and pipeline stage it occurred in.
    pub fn in_year(self, year: i32, stage: &'static str) -> Self {
        PermafolioError::YearFailed {
            year,
            stage,
            source: Box::new(self),
        }
    }
}

impl From<&PermafolioError> for std::process::ExitCode {
    fn from(err: &PermafolioError) -> Self {
        let code: u8 = match err {
            PermafolioError::Io(_) => 1,
            PermafolioError::ConfigParse { .. }
            | PermafolioError::ConfigMissing { .. }
            | PermafolioError::ConfigInvalid { .. } => 2,
            PermafolioError::Data { .. } => 3,
            PermafolioError::InvalidCadence { .. }
            | PermafolioError::InvalidDateRange { .. }
            | PermafolioError::UnknownQuadrant { .. } => 4,
            PermafolioError::MissingInstrument { .. }
            | PermafolioError::InsufficientData { .. }
            | PermafolioError::UndefinedRatio { .. }
            | PermafolioError::NoPositiveSharpe { .. } => 5,
            PermafolioError::YearFailed { source, .. } => return Self::from(source.as_ref()),
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_failed_reports_year_and_stage() {
        let inner = PermafolioError::InvalidCadence { cadence_days: 0 };
        let wrapped = inner.in_year(2015, "backtest");
        let msg = wrapped.to_string();
        assert!(msg.contains("2015"));
        assert!(msg.contains("backtest"));
        assert!(msg.contains("cadence"));
    }

    #[test]
    fn exit_code_unwraps_year_context() {
        let err = PermafolioError::InvalidCadence { cadence_days: 0 }.in_year(2020, "backtest");
        let code = std::process::ExitCode::from(&err);
        let direct =
            std::process::ExitCode::from(&PermafolioError::InvalidCadence { cadence_days: 0 });
        assert_eq!(format!("{code:?}"), format!("{direct:?}"));
    }
}
