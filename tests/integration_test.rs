//! Driver-level integration tests.
//!
//! Cover the full pipeline with a mock data port (classification →
//! backtest → report), the transition carry-forward, per-year failure
//! recording, and the CSV adapters end to end.

mod common;

use approx::assert_relative_eq;
use common::*;
use permafolio::adapters::csv_adapter::CsvAdapter;
use permafolio::adapters::csv_report_adapter::CsvReportAdapter;
use permafolio::domain::error::PermafolioError;
use permafolio::domain::instrument::Instrument;
use permafolio::domain::regime::{classify, Quadrant};
use permafolio::domain::simulation::{SimulationConfig, SimulationDriver};
use permafolio::domain::window::WindowProvider;
use permafolio::ports::report_port::ReportPort;
use std::io::Write;

/// Gold and equity move so that 2021 classifies as an inflationary boom
/// (+5% year) and 2022 lands exactly on the transition boundary.
fn boom_then_transition_port() -> MockDataPort {
    MockDataPort::new()
        .with_line(
            Instrument::Gold,
            &[
                (date(2019, 1, 1), 100.0),
                (date(2020, 1, 1), 100.0),
                (date(2021, 1, 1), 120.0), // +20% over the 2021 lookback
                (date(2022, 1, 1), 126.0), // +5% exactly → transition for 2022
                (date(2023, 1, 2), 126.0),
            ],
        )
        .with_line(
            Instrument::Equity,
            &[
                (date(2019, 1, 1), 100.0),
                (date(2020, 1, 1), 100.0),
                (date(2021, 1, 1), 110.0),  // +10%
                (date(2022, 1, 1), 115.5),  // +5%
                (date(2023, 1, 2), 115.5),
            ],
        )
        .with_flat(
            Instrument::BondYieldShort,
            date(2019, 1, 1),
            date(2023, 1, 2),
            4.0,
        )
        .with_flat(
            Instrument::BondYieldLong,
            date(2019, 1, 1),
            date(2023, 1, 2),
            6.0,
        )
}

fn config(years: Vec<i32>) -> SimulationConfig {
    SimulationConfig {
        years,
        lookback_years: 1,
        cadence_days: 1000, // one sub-period per simulated year
        initial_capital: 100_000.0,
        continue_on_error: false,
    }
}

#[test]
fn capital_compounds_and_transition_carries_forward() {
    let port = boom_then_transition_port();
    let provider = WindowProvider::new(&port);
    let driver = SimulationDriver::new(&provider);

    let report = driver.simulate(&config(vec![2021, 2022])).unwrap();
    assert_eq!(report.rows.len(), 2);
    assert!(report.failures.is_empty());

    let boom = &report.rows[0];
    assert_eq!(boom.year, 2021);
    assert_eq!(boom.quadrant, Quadrant::InflationaryBoom);
    assert_relative_eq!(boom.gold_bond_ratio, 0.15, epsilon = 1e-12);
    assert_relative_eq!(boom.gold_equity_ratio, 0.10, epsilon = 1e-12);
    // 0.5·(+5% gold) + 0.5·(+5% equity) over a single sub-period.
    assert_relative_eq!(boom.performance_percent, 5.0, epsilon = 1e-9);
    assert_relative_eq!(boom.final_capital, 105_000.0, epsilon = 1e-6);

    let transition = &report.rows[1];
    assert_eq!(transition.year, 2022);
    assert_eq!(transition.quadrant, Quadrant::TransitionQuadrant);
    assert_eq!(transition.gold_bond_ratio, 0.0);
    assert_relative_eq!(transition.performance_percent, 0.0, epsilon = 1e-12);
    // Capital carried forward unchanged from 2021.
    assert_relative_eq!(transition.final_capital, 105_000.0, epsilon = 1e-6);
}

#[test]
fn year_order_matters_for_capital() {
    let port = boom_then_transition_port();
    let provider = WindowProvider::new(&port);
    let driver = SimulationDriver::new(&provider);

    let forward = driver.simulate(&config(vec![2021, 2022])).unwrap();
    let reversed = driver.simulate(&config(vec![2022, 2021])).unwrap();

    // Reversing the years changes the path: the transition year now starts
    // from the initial capital.
    assert_relative_eq!(
        reversed.rows[0].final_capital,
        100_000.0,
        epsilon = 1e-6
    );
    assert_relative_eq!(
        reversed.rows[1].final_capital,
        forward.rows[1].final_capital,
        epsilon = 1e-6
    );
}

#[test]
fn volatility_is_positive_for_moving_series_only() {
    let port = boom_then_transition_port();
    let provider = WindowProvider::new(&port);
    let driver = SimulationDriver::new(&provider);

    let report = driver.simulate(&config(vec![2021])).unwrap();
    let row = &report.rows[0];
    // A linear price drift has slowly shrinking daily percentage returns,
    // so the sample deviation is small but positive.
    assert!(row.gold_volatility.is_finite() && row.gold_volatility > 0.0);
    assert!(row.equity_volatility.is_finite() && row.equity_volatility > 0.0);
}

#[test]
fn missing_instrument_aborts_with_year_and_stage() {
    let port = MockDataPort::new()
        .with_flat(Instrument::Gold, date(2019, 1, 1), date(2023, 1, 2), 100.0)
        .with_flat(
            Instrument::BondYieldShort,
            date(2019, 1, 1),
            date(2023, 1, 2),
            4.0,
        )
        .with_flat(
            Instrument::BondYieldLong,
            date(2019, 1, 1),
            date(2023, 1, 2),
            6.0,
        );
    let provider = WindowProvider::new(&port);
    let driver = SimulationDriver::new(&provider);

    let err = driver.simulate(&config(vec![2021])).unwrap_err();
    match err {
        PermafolioError::YearFailed {
            year,
            stage,
            source,
        } => {
            assert_eq!(year, 2021);
            assert_eq!(stage, "classification");
            assert!(matches!(
                *source,
                PermafolioError::MissingInstrument {
                    instrument: Instrument::Equity
                }
            ));
        }
        other => panic!("expected YearFailed, got {other}"),
    }
}

#[test]
fn failed_years_are_recorded_when_continuing() {
    // Equity data only exists from mid-2020, so the 2020 lookback window
    // (all of 2019) cannot classify, while 2022 can.
    let port = MockDataPort::new()
        .with_line(
            Instrument::Gold,
            &[
                (date(2019, 1, 1), 100.0),
                (date(2023, 1, 2), 180.0),
            ],
        )
        .with_line(
            Instrument::Equity,
            &[(date(2020, 7, 1), 100.0), (date(2023, 1, 2), 130.0)],
        )
        .with_flat(
            Instrument::BondYieldShort,
            date(2019, 1, 1),
            date(2023, 1, 2),
            4.0,
        )
        .with_flat(
            Instrument::BondYieldLong,
            date(2019, 1, 1),
            date(2023, 1, 2),
            6.0,
        );
    let provider = WindowProvider::new(&port);
    let driver = SimulationDriver::new(&provider);

    let mut cfg = config(vec![2020, 2022]);
    cfg.continue_on_error = true;
    let report = driver.simulate(&cfg).unwrap();

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].year, 2022);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].year, 2020);
    assert_eq!(report.failures[0].stage, "classification");
}

#[test]
fn decision_table_scenario() {
    // gb = 0.02, ge = 6.0 → first table row.
    assert_eq!(classify(0.02, 6.0), Quadrant::InflationaryBust);
}

#[test]
fn csv_pipeline_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();

    // Render the mock data to per-instrument CSV files.
    let port = boom_then_transition_port();
    for (instrument, points) in &port.data {
        let path = dir.path().join(format!("{}.csv", instrument.file_stem()));
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "date,close").unwrap();
        for (date, close) in points {
            writeln!(file, "{},{}", date.format("%Y-%m-%d"), close).unwrap();
        }
    }

    let adapter = CsvAdapter::new(dir.path().to_path_buf());
    let provider = WindowProvider::new(&adapter);
    let driver = SimulationDriver::new(&provider);
    let report = driver.simulate(&config(vec![2021, 2022])).unwrap();

    assert_eq!(report.rows.len(), 2);
    assert_relative_eq!(report.rows[0].final_capital, 105_000.0, epsilon = 1e-6);

    let out = dir.path().join("report.csv");
    CsvReportAdapter::new()
        .write(&report, out.to_str().unwrap())
        .unwrap();
    let content = std::fs::read_to_string(&out).unwrap();
    assert_eq!(content.lines().count(), 3); // header + two rows
    assert!(content.contains("TransitionQuadrant"));
    assert!(content.contains("InflationaryBoom"));
}
