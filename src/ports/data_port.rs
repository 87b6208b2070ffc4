//! Data access port trait.

use crate::domain::error::PermafolioError;
use crate::domain::instrument::Instrument;
use chrono::NaiveDate;

/// One daily closing observation for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub instrument: Instrument,
    pub date: NaiveDate,
    pub close: f64,
}

/// Source of daily closing prices.
///
/// A single call covers every requested instrument so that one window fetch
/// costs one round-trip to the backing store. Instruments with no data in
/// the range simply contribute no bars; the caller decides whether that is
/// an error. Repeated calls for the same range must return identical data.
pub trait DataPort {
    fn fetch_daily(
        &self,
        instruments: &[Instrument],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, PermafolioError>;

    /// Full available date range and observation count for one instrument,
    /// if any data exists.
    fn data_range(
        &self,
        instrument: Instrument,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PermafolioError>;
}
