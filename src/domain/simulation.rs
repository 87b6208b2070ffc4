//! Multi-year simulation driver: an explicit fold over years with a
//! path-dependent capital accumulator.

use chrono::NaiveDate;

use super::allocator::sample_std;
use super::backtest::BacktestEngine;
use super::error::PermafolioError;
use super::instrument::Instrument;
use super::regime::{classify, Quadrant, RegimeClassifier};
use super::window::WindowProvider;

/// Parameters for one simulation run. All knobs are explicit; nothing is
/// read from ambient state.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Years to simulate, processed strictly in the given order (capital
    /// compounds from one year into the next).
    pub years: Vec<i32>,
    /// Trailing window length, in years, for regime classification.
    pub lookback_years: i32,
    /// Days between rebalances inside each simulated year.
    pub cadence_days: i64,
    pub initial_capital: f64,
    /// When true, a failed year is recorded and skipped with capital
    /// unchanged; when false the run aborts on the first failure.
    pub continue_on_error: bool,
}

/// One simulated year.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct YearlyRow {
    pub year: i32,
    pub gold_bond_ratio: f64,
    pub gold_equity_ratio: f64,
    pub quadrant: Quadrant,
    pub final_capital: f64,
    pub performance_percent: f64,
    pub gold_volatility: f64,
    pub equity_volatility: f64,
}

/// A year that could not be simulated, kept alongside the successful rows
/// so a degraded run never silently truncates the report.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct YearFailure {
    pub year: i32,
    pub stage: &'static str,
    pub message: String,
}

/// Ordered-by-year simulation output.
#[derive(Debug, Clone, Default)]
pub struct YearlyReport {
    pub rows: Vec<YearlyRow>,
    pub failures: Vec<YearFailure>,
}

/// Drives the classifier and backtest engine across a sequence of years.
pub struct SimulationDriver<'a> {
    provider: &'a WindowProvider<'a>,
}

impl<'a> SimulationDriver<'a> {
    pub fn new(provider: &'a WindowProvider<'a>) -> Self {
        SimulationDriver { provider }
    }

    /// Simulate each configured year in order.
    ///
    /// Per year: classify the regime over the trailing lookback window,
    /// then either run the backtest over `[Jan 1 y, Jan 1 y+1]` with the
    /// running capital, or — on a transition classification — carry the
    /// capital forward unchanged at 0%. Gold and equity volatility are
    /// computed per year from raw (unfilled) observations.
    pub fn simulate(&self, config: &SimulationConfig) -> Result<YearlyReport, PermafolioError> {
        let classifier = RegimeClassifier::new(self.provider);
        let engine = BacktestEngine::new(self.provider);

        let mut report = YearlyReport::default();
        let mut capital = config.initial_capital;

        for &year in &config.years {
            match self.simulate_year(&classifier, &engine, config, capital, year) {
                Ok(row) => {
                    capital = row.final_capital;
                    report.rows.push(row);
                }
                Err(err) if config.continue_on_error => {
                    report.failures.push(failure_record(year, err));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(report)
    }

    fn simulate_year(
        &self,
        classifier: &RegimeClassifier<'_>,
        engine: &BacktestEngine<'_>,
        config: &SimulationConfig,
        capital: f64,
        year: i32,
    ) -> Result<YearlyRow, PermafolioError> {
        let ratio_start = january_first(year - config.lookback_years)?;
        let ratio_end = january_first(year)?;
        let year_start = ratio_end;
        let year_end = january_first(year + 1)?;

        let snapshot = classifier
            .compute_ratios(ratio_start, ratio_end)
            .map_err(|e| e.in_year(year, "classification"))?;
        let quadrant = classify(snapshot.gold_bond_ratio, snapshot.gold_equity_ratio);

        let (final_capital, performance_percent) = match quadrant {
            // The engine has no rule for the transition state; capital sits
            // out the year.
            Quadrant::TransitionQuadrant => (capital, 0.0),
            _ => {
                let result = engine
                    .run(capital, config.cadence_days, quadrant, year_start, year_end)
                    .map_err(|e| e.in_year(year, "backtest"))?;
                (result.final_capital, result.performance_percent)
            }
        };

        let (gold_volatility, equity_volatility) = self
            .annual_volatility(year_start, year_end)
            .map_err(|e| e.in_year(year, "volatility"))?;

        Ok(YearlyRow {
            year,
            gold_bond_ratio: snapshot.gold_bond_ratio,
            gold_equity_ratio: snapshot.gold_equity_ratio,
            quadrant,
            final_capital,
            performance_percent,
            gold_volatility,
            equity_volatility,
        })
    }

    fn annual_volatility(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(f64, f64), PermafolioError> {
        let raw = self
            .provider
            .get_observations(&[Instrument::Gold, Instrument::Equity], start, end)?;
        let gold = annualized_volatility(&raw[&Instrument::Gold]);
        let equity = annualized_volatility(&raw[&Instrument::Equity]);
        Ok((gold, equity))
    }
}

/// Sample standard deviation of day-over-day percentage returns, scaled by
/// the square root of the observation count. The observation count, not the
/// calendar span, is the annualization proxy.
fn annualized_volatility(observations: &[(NaiveDate, f64)]) -> f64 {
    let returns: Vec<f64> = observations
        .windows(2)
        .filter(|w| w[0].1 != 0.0)
        .map(|w| w[1].1 / w[0].1 - 1.0)
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }
    sample_std(&returns) * (observations.len() as f64).sqrt()
}

fn january_first(year: i32) -> Result<NaiveDate, PermafolioError> {
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or(PermafolioError::Data {
        reason: format!("year {year} is outside the supported calendar range"),
    })
}

fn failure_record(year: i32, err: PermafolioError) -> YearFailure {
    match err {
        PermafolioError::YearFailed {
            year: y,
            stage,
            source,
        } => YearFailure {
            year: y,
            stage,
            message: source.to_string(),
        },
        other => YearFailure {
            year,
            stage: "simulation",
            message: other.to_string(),
        },
    }
}
