//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::allocator::PortfolioAllocator;
use crate::domain::error::PermafolioError;
use crate::domain::instrument::Instrument;
use crate::domain::regime::{classify, Quadrant, RegimeClassifier};
use crate::domain::simulation::{SimulationConfig, SimulationDriver};
use crate::domain::window::WindowProvider;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "permafolio", about = "Regime-conditional permanent-portfolio backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the multi-year simulation
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        /// Write the yearly report as CSV to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Classify the regime over a date window
    Classify {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Compute Sharpe-score portfolio weights over a date window
    Allocate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Quadrant to allocate for; classified from the window when omitted
        #[arg(long)]
        quadrant: Option<String>,
    },
    /// Show the available data range per instrument
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a simulation configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate { config, output } => run_simulate(&config, output.as_deref()),
        Command::Classify { config, start, end } => run_classify(&config, &start, &end),
        Command::Allocate {
            config,
            start,
            end,
            quadrant,
        } => run_allocate(&config, &start, &end, quadrant.as_deref()),
        Command::Info { config } => run_info(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

fn load_config(path: &std::path::Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PermafolioError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn load_data_adapter(adapter: &dyn ConfigPort) -> Result<CsvAdapter, PermafolioError> {
    let csv_dir = adapter
        .get_string("data", "csv_dir")
        .ok_or_else(|| PermafolioError::ConfigMissing {
            section: "data".into(),
            key: "csv_dir".into(),
        })?;
    Ok(CsvAdapter::new(PathBuf::from(csv_dir)))
}

/// Build a [`SimulationConfig`] from the `[simulation]` section.
pub fn build_simulation_config(
    adapter: &dyn ConfigPort,
) -> Result<SimulationConfig, PermafolioError> {
    let years_str = adapter.get_string("simulation", "years").ok_or_else(|| {
        PermafolioError::ConfigMissing {
            section: "simulation".into(),
            key: "years".into(),
        }
    })?;
    let years = parse_years(&years_str).map_err(|reason| PermafolioError::ConfigInvalid {
        section: "simulation".into(),
        key: "years".into(),
        reason,
    })?;

    let lookback_years = adapter.get_int("simulation", "lookback_years", 3);
    if lookback_years < 1 {
        return Err(PermafolioError::ConfigInvalid {
            section: "simulation".into(),
            key: "lookback_years".into(),
            reason: "must be at least 1".into(),
        });
    }

    let cadence_days = adapter.get_int("simulation", "rebalance_days", 100);
    if cadence_days < 1 {
        return Err(PermafolioError::InvalidCadence { cadence_days });
    }

    let initial_capital = adapter.get_double("simulation", "initial_capital", 100_000.0);
    if !(initial_capital > 0.0) {
        return Err(PermafolioError::ConfigInvalid {
            section: "simulation".into(),
            key: "initial_capital".into(),
            reason: "must be positive".into(),
        });
    }

    Ok(SimulationConfig {
        years,
        lookback_years: lookback_years as i32,
        cadence_days,
        initial_capital,
        continue_on_error: adapter.get_bool("simulation", "continue_on_error", false),
    })
}

/// Parse a year list: either an inclusive range `2015-2024` or a
/// comma-separated list `2015,2017,2019`.
pub fn parse_years(input: &str) -> Result<Vec<i32>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("empty year list".into());
    }

    if let Some((from, to)) = trimmed.split_once('-') {
        let from: i32 = from
            .trim()
            .parse()
            .map_err(|_| format!("invalid year {:?}", from.trim()))?;
        let to: i32 = to
            .trim()
            .parse()
            .map_err(|_| format!("invalid year {:?}", to.trim()))?;
        if to < from {
            return Err(format!("year range {from}-{to} is inverted"));
        }
        return Ok((from..=to).collect());
    }

    let mut years = Vec::new();
    for token in trimmed.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err("empty token in year list".into());
        }
        let year: i32 = token
            .parse()
            .map_err(|_| format!("invalid year {token:?}"))?;
        years.push(year);
    }
    Ok(years)
}

fn parse_date(input: &str, flag: &str) -> Result<NaiveDate, PermafolioError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| PermafolioError::ConfigInvalid {
        section: "cli".into(),
        key: flag.into(),
        reason: "invalid date format (expected YYYY-MM-DD)".into(),
    })
}

fn parse_quadrant(input: &str) -> Result<Quadrant, PermafolioError> {
    let quadrant = match input.to_lowercase().replace(['-', '_', ' '], "").as_str() {
        "inflationarybust" => Quadrant::InflationaryBust,
        "inflationaryboom" => Quadrant::InflationaryBoom,
        "deflationarybust" => Quadrant::DeflationaryBust,
        "deflationaryboom" => Quadrant::DeflationaryBoom,
        "transition" | "transitionquadrant" => Quadrant::TransitionQuadrant,
        _ => {
            return Err(PermafolioError::ConfigInvalid {
                section: "cli".into(),
                key: "quadrant".into(),
                reason: format!("unknown quadrant {input:?}"),
            });
        }
    };
    Ok(quadrant)
}

fn run_simulate(config_path: &std::path::Path, output_path: Option<&std::path::Path>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = (|| -> Result<(), PermafolioError> {
        let sim_config = build_simulation_config(&adapter)?;
        let data = load_data_adapter(&adapter)?;
        let provider = WindowProvider::new(&data);
        let driver = SimulationDriver::new(&provider);

        eprintln!(
            "Simulating {} years (lookback {}y, rebalance every {}d)...",
            sim_config.years.len(),
            sim_config.lookback_years,
            sim_config.cadence_days,
        );
        let report = driver.simulate(&sim_config)?;

        println!(
            "{:<6} {:>12} {:>12} {:<20} {:>14} {:>8} {:>9} {:>9}",
            "year", "gb_ratio", "ge_ratio", "quadrant", "capital", "perf%", "vol_gold", "vol_eq"
        );
        for row in &report.rows {
            println!(
                "{:<6} {:>12.4} {:>12.4} {:<20} {:>14.2} {:>8.2} {:>9.4} {:>9.4}",
                row.year,
                row.gold_bond_ratio,
                row.gold_equity_ratio,
                row.quadrant.to_string(),
                row.final_capital,
                row.performance_percent,
                row.gold_volatility,
                row.equity_volatility,
            );
        }
        for failure in &report.failures {
            eprintln!(
                "warning: year {} skipped ({}): {}",
                failure.year, failure.stage, failure.message
            );
        }

        if let Some(path) = output_path {
            let path = path.display().to_string();
            CsvReportAdapter::new().write(&report, &path)?;
            eprintln!("Report written to {path}");
        }
        Ok(())
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_classify(config_path: &std::path::Path, start: &str, end: &str) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = (|| -> Result<(), PermafolioError> {
        let start = parse_date(start, "start")?;
        let end = parse_date(end, "end")?;
        let data = load_data_adapter(&adapter)?;
        let provider = WindowProvider::new(&data);
        let classifier = RegimeClassifier::new(&provider);

        let snapshot = classifier.compute_ratios(start, end)?;
        let quadrant = classify(snapshot.gold_bond_ratio, snapshot.gold_equity_ratio);
        println!("gold/bond score:   {:.6}", snapshot.gold_bond_ratio);
        println!("gold/equity score: {:.6}", snapshot.gold_equity_ratio);
        println!("quadrant:          {quadrant}");
        Ok(())
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_allocate(
    config_path: &std::path::Path,
    start: &str,
    end: &str,
    quadrant: Option<&str>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = (|| -> Result<(), PermafolioError> {
        let start = parse_date(start, "start")?;
        let end = parse_date(end, "end")?;
        let data = load_data_adapter(&adapter)?;
        let provider = WindowProvider::new(&data);

        let quadrant = match quadrant {
            Some(name) => parse_quadrant(name)?,
            None => {
                let classifier = RegimeClassifier::new(&provider);
                let snapshot = classifier.compute_ratios(start, end)?;
                classify(snapshot.gold_bond_ratio, snapshot.gold_equity_ratio)
            }
        };
        eprintln!("Allocating for {quadrant}");

        let weights = PortfolioAllocator::new(&provider).allocate(quadrant, start, end)?;
        for (instrument, weight) in weights.iter() {
            println!("{:<6} {:>8.4}", instrument.symbol(), weight);
        }
        Ok(())
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_info(config_path: &std::path::Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = (|| -> Result<(), PermafolioError> {
        let data = load_data_adapter(&adapter)?;
        for instrument in [
            Instrument::Gold,
            Instrument::Equity,
            Instrument::BondYieldShort,
            Instrument::BondYieldLong,
            Instrument::TreasuryNoteFuture,
        ] {
            match data.data_range(instrument)? {
                Some((first, last, count)) => {
                    println!("{:<6} {first} .. {last} ({count} observations)", instrument.symbol())
                }
                None => println!("{:<6} no data", instrument.symbol()),
            }
        }
        Ok(())
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_validate(config_path: &std::path::Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match build_simulation_config(&adapter).and_then(|_| load_data_adapter(&adapter).map(|_| ())) {
        Ok(()) => {
            println!("Configuration OK");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}
