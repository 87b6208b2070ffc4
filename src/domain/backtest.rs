//! Rebalancing backtest engine: per-sub-period quadrant return formulas
//! compounded into a performance factor.

use chrono::{Duration, NaiveDate};

use super::error::PermafolioError;
use super::instrument::Instrument;
use super::rates;
use super::regime::Quadrant;
use super::window::WindowProvider;

/// Ordered rebalance dates partitioning `[start, end]` into sub-periods.
///
/// Dates run `start, start + cadence, start + 2·cadence, …`; `end` is always
/// the final element even when the cadence does not land on it exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct RebalancingSchedule {
    dates: Vec<NaiveDate>,
}

impl RebalancingSchedule {
    pub fn build(
        start: NaiveDate,
        end: NaiveDate,
        cadence_days: i64,
    ) -> Result<Self, PermafolioError> {
        if cadence_days < 1 {
            return Err(PermafolioError::InvalidCadence { cadence_days });
        }
        if end < start {
            return Err(PermafolioError::InvalidDateRange { start, end });
        }
        let mut dates = Vec::new();
        let mut date = start;
        while date <= end {
            dates.push(date);
            date += Duration::days(cadence_days);
        }
        if dates.last() != Some(&end) {
            dates.push(end);
        }
        Ok(RebalancingSchedule { dates })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Consecutive (sub_period_start, sub_period_end) pairs. Empty when the
    /// range collapses to a single date.
    pub fn sub_periods(&self) -> impl Iterator<Item = (NaiveDate, NaiveDate)> + '_ {
        self.dates.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Outcome of one backtest call.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub final_capital: f64,
    pub performance_percent: f64,
    pub quadrant: Quadrant,
}

/// Runs a single-quadrant, periodically-rebalanced backtest.
pub struct BacktestEngine<'a> {
    provider: &'a WindowProvider<'a>,
}

impl<'a> BacktestEngine<'a> {
    pub fn new(provider: &'a WindowProvider<'a>) -> Self {
        BacktestEngine { provider }
    }

    /// Compound the quadrant's return rule over each rebalancing sub-period
    /// of `[start, end]`.
    ///
    /// Bond growth is scoped to each sub-period (sub-period mean yield,
    /// compounded over the sub-period's day count). Gold and equity growth
    /// are taken over the *entire* range once and reused in every
    /// sub-period. The asymmetry is part of the strategy's defined
    /// behavior and is kept as-is.
    pub fn run(
        &self,
        capital: f64,
        cadence_days: i64,
        quadrant: Quadrant,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BacktestResult, PermafolioError> {
        let instruments = quadrant
            .backtest_instruments()
            .ok_or(PermafolioError::UnknownQuadrant { quadrant })?;
        let schedule = RebalancingSchedule::build(start, end, cadence_days)?;
        let window = self.provider.get_window(instruments, start, end)?;

        let needs_gold = matches!(
            quadrant,
            Quadrant::InflationaryBust | Quadrant::InflationaryBoom
        );
        let needs_equity = matches!(
            quadrant,
            Quadrant::InflationaryBoom | Quadrant::DeflationaryBoom
        );

        let gold_growth = if needs_gold {
            Some(window.series(Instrument::Gold)?.growth(start, end).ok_or(
                PermafolioError::UndefinedRatio {
                    figure: "gold",
                    start,
                    end,
                },
            )?)
        } else {
            None
        };
        let equity_growth = if needs_equity {
            Some(window.series(Instrument::Equity)?.growth(start, end).ok_or(
                PermafolioError::UndefinedRatio {
                    figure: "equity",
                    start,
                    end,
                },
            )?)
        } else {
            None
        };

        let mut performance_factor = 1.0;
        for (sub_start, sub_end) in schedule.sub_periods() {
            let multiplier = match quadrant {
                Quadrant::InflationaryBust => 1.0 + gold_growth.unwrap_or(0.0),
                Quadrant::InflationaryBoom => {
                    1.0 + 0.5 * gold_growth.unwrap_or(0.0) + 0.5 * equity_growth.unwrap_or(0.0)
                }
                Quadrant::DeflationaryBust => {
                    1.0 + self.sub_period_bond_growth(&window, sub_start, sub_end)?
                }
                Quadrant::DeflationaryBoom => {
                    1.0 + 0.5 * self.sub_period_bond_growth(&window, sub_start, sub_end)?
                        + 0.5 * equity_growth.unwrap_or(0.0)
                }
                Quadrant::TransitionQuadrant => {
                    return Err(PermafolioError::UnknownQuadrant { quadrant });
                }
            };
            performance_factor *= multiplier;
        }

        Ok(BacktestResult {
            final_capital: capital * performance_factor,
            performance_percent: (performance_factor - 1.0) * 100.0,
            quadrant,
        })
    }

    fn sub_period_bond_growth(
        &self,
        window: &super::series::PriceWindow,
        sub_start: NaiveDate,
        sub_end: NaiveDate,
    ) -> Result<f64, PermafolioError> {
        rates::bond_growth(window, sub_start, sub_end).ok_or(PermafolioError::UndefinedRatio {
            figure: "bond",
            start: sub_start,
            end: sub_end,
        })
    }
}
