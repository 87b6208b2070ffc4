//! Price window provider: padded, gap-filled views over the data port.

use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use super::error::PermafolioError;
use super::instrument::Instrument;
use super::series::{PriceSeries, PriceWindow};
use crate::ports::data_port::{DataPort, PriceBar};

/// Calendar-day pad added on both ends of every fetched window, absorbing
/// weekend/holiday gaps at the exact window edges.
pub const EDGE_PAD_DAYS: i64 = 15;

/// Growth needs two endpoints.
pub const MIN_OBSERVATIONS: usize = 2;

/// Wraps a [`DataPort`] and serves calendar-aligned, forward-filled price
/// windows to the classifier, allocator and backtest engine.
pub struct WindowProvider<'a> {
    data: &'a dyn DataPort,
}

impl<'a> WindowProvider<'a> {
    pub fn new(data: &'a dyn DataPort) -> Self {
        WindowProvider { data }
    }

    /// Fetch `[start − 15d, end + 15d]` for `instruments` in one call,
    /// reindex each series onto the full padded calendar and forward-fill.
    ///
    /// Fails with `MissingInstrument` when an instrument is entirely absent
    /// from the source, and `InsufficientData` when fewer than two filled
    /// observations remain after the fill.
    pub fn get_window(
        &self,
        instruments: &[Instrument],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceWindow, PermafolioError> {
        if end < start {
            return Err(PermafolioError::InvalidDateRange { start, end });
        }
        let padded_start = start - Duration::days(EDGE_PAD_DAYS);
        let padded_end = end + Duration::days(EDGE_PAD_DAYS);

        let grouped = self.fetch_grouped(instruments, padded_start, padded_end)?;

        let mut window = PriceWindow::new(padded_start, padded_end);
        for &instrument in instruments {
            let observations = grouped
                .get(&instrument)
                .ok_or(PermafolioError::MissingInstrument { instrument })?;
            let series = PriceSeries::from_observations(
                instrument,
                padded_start,
                padded_end,
                observations,
            )?;
            let filled = series.observed_count(padded_start, padded_end);
            if filled < MIN_OBSERVATIONS {
                return Err(PermafolioError::InsufficientData {
                    instrument,
                    observations: filled,
                    minimum: MIN_OBSERVATIONS,
                });
            }
            window.insert(series);
        }
        Ok(window)
    }

    /// Raw dated observations per instrument over `[start, end]`, without
    /// calendar reindexing or fill. Used for volatility, which works on
    /// trading-day returns rather than calendar-day ones.
    pub fn get_observations(
        &self,
        instruments: &[Instrument],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<Instrument, Vec<(NaiveDate, f64)>>, PermafolioError> {
        if end < start {
            return Err(PermafolioError::InvalidDateRange { start, end });
        }
        let grouped = self.fetch_grouped(instruments, start, end)?;
        for &instrument in instruments {
            if !grouped.contains_key(&instrument) {
                return Err(PermafolioError::MissingInstrument { instrument });
            }
        }
        Ok(grouped)
    }

    fn fetch_grouped(
        &self,
        instruments: &[Instrument],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<Instrument, Vec<(NaiveDate, f64)>>, PermafolioError> {
        let bars = self.data.fetch_daily(instruments, start, end)?;
        let mut grouped: BTreeMap<Instrument, Vec<(NaiveDate, f64)>> = BTreeMap::new();
        for PriceBar {
            instrument,
            date,
            close,
        } in bars
        {
            grouped.entry(instrument).or_default().push((date, close));
        }
        for observations in grouped.values_mut() {
            observations.sort_by_key(|&(date, _)| date);
        }
        Ok(grouped)
    }
}
