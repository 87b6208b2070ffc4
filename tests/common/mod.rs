#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use permafolio::domain::error::PermafolioError;
use permafolio::domain::instrument::Instrument;
use permafolio::ports::data_port::{DataPort, PriceBar};
use std::collections::HashMap;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// In-memory data port for driver-level tests.
pub struct MockDataPort {
    pub data: HashMap<Instrument, Vec<(NaiveDate, f64)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn with_series(mut self, instrument: Instrument, points: Vec<(NaiveDate, f64)>) -> Self {
        self.data.insert(instrument, points);
        self
    }

    /// Daily piecewise-linear series through the given anchor points.
    /// Anchor values land exactly on their dates.
    pub fn with_line(mut self, instrument: Instrument, anchors: &[(NaiveDate, f64)]) -> Self {
        let mut points = Vec::new();
        for pair in anchors.windows(2) {
            let (a_date, a) = pair[0];
            let (b_date, b) = pair[1];
            let days = (b_date - a_date).num_days();
            for i in 0..days {
                let frac = i as f64 / days as f64;
                points.push((a_date + Duration::days(i), a + (b - a) * frac));
            }
        }
        if let Some(&last) = anchors.last() {
            points.push(last);
        }
        self.data.insert(instrument, points);
        self
    }

    /// Flat series between two dates.
    pub fn with_flat(self, instrument: Instrument, from: NaiveDate, to: NaiveDate, level: f64) -> Self {
        self.with_line(instrument, &[(from, level), (to, level)])
    }
}

impl DataPort for MockDataPort {
    fn fetch_daily(
        &self,
        instruments: &[Instrument],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, PermafolioError> {
        let mut bars = Vec::new();
        for &instrument in instruments {
            if let Some(points) = self.data.get(&instrument) {
                bars.extend(
                    points
                        .iter()
                        .filter(|(d, _)| *d >= start_date && *d <= end_date)
                        .map(|&(date, close)| PriceBar {
                            instrument,
                            date,
                            close,
                        }),
                );
            }
        }
        Ok(bars)
    }

    fn data_range(
        &self,
        instrument: Instrument,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PermafolioError> {
        Ok(self.data.get(&instrument).and_then(|points| {
            match (points.first(), points.last()) {
                (Some(&(first, _)), Some(&(last, _))) => Some((first, last, points.len())),
                _ => None,
            }
        }))
    }
}
