//! Risk-free rate approximation from the two treasury-yield series.
//!
//! The strategy never holds the yield instruments; it averages them into a
//! single annual rate and projects that rate over a window by daily
//! compounding.

use chrono::{Duration, NaiveDate};

use super::instrument::Instrument;
use super::series::PriceWindow;

/// Per-day average of the short and long treasury yields over `[from, to]`,
/// converted from percent to decimal, then averaged across the window.
/// `None` when no day in the window has both yields filled, or either
/// series is absent from the window.
pub fn mean_bond_yield(window: &PriceWindow, from: NaiveDate, to: NaiveDate) -> Option<f64> {
    let short = window.series(Instrument::BondYieldShort).ok()?;
    let long = window.series(Instrument::BondYieldLong).ok()?;

    let mut sum = 0.0;
    let mut count = 0usize;
    let mut date = from;
    while date <= to {
        if let (Some(s), Some(l)) = (short.get(date), long.get(date)) {
            sum += ((s + l) / 2.0) / 100.0;
            count += 1;
        }
        date += Duration::days(1);
    }
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

/// Project an annual rate over `num_days` calendar days with daily
/// compounding: `(1 + daily)^num_days − 1` where
/// `daily = (1 + annual)^(1/365) − 1`.
pub fn compounded_growth(annual_rate: f64, num_days: i64) -> f64 {
    let daily = (1.0 + annual_rate).powf(1.0 / 365.0) - 1.0;
    (1.0 + daily).powf(num_days as f64) - 1.0
}

/// Window-mean yield projected over the window's own calendar-day count.
pub fn bond_growth(window: &PriceWindow, from: NaiveDate, to: NaiveDate) -> Option<f64> {
    let mean = mean_bond_yield(window, from, to)?;
    Some(compounded_growth(mean, (to - from).num_days()))
}
