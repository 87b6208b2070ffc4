//! Calendar-aligned daily price series and windows.
//!
//! A [`PriceSeries`] covers every calendar day of its range. Days without an
//! upstream observation are forward-filled from the last known value, so the
//! only missing entries are a leading prefix before the first observation.

use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use super::error::PermafolioError;
use super::instrument::Instrument;

/// One instrument's daily closing prices over a contiguous calendar range.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    instrument: Instrument,
    start: NaiveDate,
    prices: Vec<Option<f64>>,
}

impl PriceSeries {
    /// Build a series over `[start, end]` from raw dated observations,
    /// reindexing onto the full calendar and forward-filling gaps.
    /// Observations outside the range are ignored; on duplicate dates the
    /// last one wins.
    pub fn from_observations(
        instrument: Instrument,
        start: NaiveDate,
        end: NaiveDate,
        observations: &[(NaiveDate, f64)],
    ) -> Result<Self, PermafolioError> {
        if end < start {
            return Err(PermafolioError::InvalidDateRange { start, end });
        }
        let len = (end - start).num_days() as usize + 1;
        let mut prices = vec![None; len];
        for &(date, price) in observations {
            if date < start || date > end {
                continue;
            }
            let idx = (date - start).num_days() as usize;
            prices[idx] = Some(price);
        }
        forward_fill(&mut prices);
        Ok(PriceSeries {
            instrument,
            start,
            prices,
        })
    }

    /// Reindex onto `[start, end]` and forward-fill again. Reindexing onto
    /// the series' own calendar is a no-op.
    pub fn reindex(&self, start: NaiveDate, end: NaiveDate) -> Result<Self, PermafolioError> {
        let observations: Vec<(NaiveDate, f64)> = self.iter_observed().collect();
        Self::from_observations(self.instrument, start, end, &observations)
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(self.prices.len() as i64 - 1)
    }

    /// Value on `date`, if the date is in range and after the first
    /// observation.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        if date < self.start || date > self.end() {
            return None;
        }
        self.prices[(date - self.start).num_days() as usize]
    }

    /// Number of filled days within `[from, to]` (clamped to the series).
    pub fn observed_count(&self, from: NaiveDate, to: NaiveDate) -> usize {
        self.range_indices(from, to)
            .map(|(lo, hi)| self.prices[lo..=hi].iter().flatten().count())
            .unwrap_or(0)
    }

    /// First filled (date, value) within `[from, to]`.
    pub fn first_observed(&self, from: NaiveDate, to: NaiveDate) -> Option<(NaiveDate, f64)> {
        let (lo, hi) = self.range_indices(from, to)?;
        (lo..=hi).find_map(|i| self.prices[i].map(|p| (self.date_at(i), p)))
    }

    /// Last filled (date, value) within `[from, to]`.
    pub fn last_observed(&self, from: NaiveDate, to: NaiveDate) -> Option<(NaiveDate, f64)> {
        let (lo, hi) = self.range_indices(from, to)?;
        (lo..=hi)
            .rev()
            .find_map(|i| self.prices[i].map(|p| (self.date_at(i), p)))
    }

    /// Simple growth (last/first − 1) between the first and last filled
    /// values in `[from, to]`. `None` when the window holds fewer than one
    /// filled value or the first value is zero.
    pub fn growth(&self, from: NaiveDate, to: NaiveDate) -> Option<f64> {
        let (_, first) = self.first_observed(from, to)?;
        let (_, last) = self.last_observed(from, to)?;
        if first == 0.0 {
            return None;
        }
        Some((last - first) / first)
    }

    /// Mean of the filled values in `[from, to]`.
    pub fn mean(&self, from: NaiveDate, to: NaiveDate) -> Option<f64> {
        let (lo, hi) = self.range_indices(from, to)?;
        let values: Vec<f64> = self.prices[lo..=hi].iter().flatten().copied().collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// All filled (date, value) pairs in order.
    pub fn iter_observed(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.prices
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|v| (self.date_at(i), v)))
    }

    fn date_at(&self, idx: usize) -> NaiveDate {
        self.start + Duration::days(idx as i64)
    }

    /// Clamp `[from, to]` to the series range; `None` if disjoint or empty.
    fn range_indices(&self, from: NaiveDate, to: NaiveDate) -> Option<(usize, usize)> {
        let from = from.max(self.start);
        let to = to.min(self.end());
        if from > to {
            return None;
        }
        let lo = (from - self.start).num_days() as usize;
        let hi = (to - self.start).num_days() as usize;
        Some((lo, hi))
    }
}

fn forward_fill(prices: &mut [Option<f64>]) {
    let mut last = None;
    for slot in prices.iter_mut() {
        match slot {
            Some(p) => last = Some(*p),
            None => *slot = last,
        }
    }
}

/// A set of price series aligned to one shared calendar range.
#[derive(Debug, Clone)]
pub struct PriceWindow {
    start: NaiveDate,
    end: NaiveDate,
    series: BTreeMap<Instrument, PriceSeries>,
}

impl PriceWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        PriceWindow {
            start,
            end,
            series: BTreeMap::new(),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.instrument(), series);
    }

    pub fn contains(&self, instrument: Instrument) -> bool {
        self.series.contains_key(&instrument)
    }

    /// Series for `instrument`, or [`PermafolioError::MissingInstrument`].
    pub fn series(&self, instrument: Instrument) -> Result<&PriceSeries, PermafolioError> {
        self.series
            .get(&instrument)
            .ok_or(PermafolioError::MissingInstrument { instrument })
    }

    pub fn instruments(&self) -> impl Iterator<Item = Instrument> + '_ {
        self.series.keys().copied()
    }
}
