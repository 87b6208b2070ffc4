//! CSV file data adapter.
//!
//! One file per instrument at `<base>/<stem>.csv` with a `date,close`
//! header, standing in for the upstream download cache. Dates are
//! `YYYY-MM-DD`; rows may arrive unsorted.

use crate::domain::error::PermafolioError;
use crate::domain::instrument::Instrument;
use crate::ports::data_port::{DataPort, PriceBar};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: Instrument) -> PathBuf {
        self.base_path.join(format!("{}.csv", instrument.file_stem()))
    }

    /// Parse every row of one instrument's file. A missing file reads as an
    /// instrument absent from the source (no bars), which the window
    /// provider reports as `MissingInstrument` with proper context.
    fn read_bars(&self, instrument: Instrument) -> Result<Vec<PriceBar>, PermafolioError> {
        let path = self.csv_path(instrument);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PermafolioError::Data {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| PermafolioError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = record.get(0).ok_or_else(|| PermafolioError::Data {
                reason: format!("missing date column in {}", path.display()),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                PermafolioError::Data {
                    reason: format!("invalid date {:?} in {}: {}", date_str, path.display(), e),
                }
            })?;

            let close: f64 = record
                .get(1)
                .ok_or_else(|| PermafolioError::Data {
                    reason: format!("missing close column in {}", path.display()),
                })?
                .parse()
                .map_err(|e| PermafolioError::Data {
                    reason: format!("invalid close value in {}: {}", path.display(), e),
                })?;

            bars.push(PriceBar {
                instrument,
                date,
                close,
            });
        }
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_daily(
        &self,
        instruments: &[Instrument],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, PermafolioError> {
        let mut bars = Vec::new();
        for &instrument in instruments {
            bars.extend(
                self.read_bars(instrument)?
                    .into_iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date),
            );
        }
        Ok(bars)
    }

    fn data_range(
        &self,
        instrument: Instrument,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PermafolioError> {
        let bars = self.read_bars(instrument)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
