//! Regime classification: growth ratios over a lookback window mapped onto
//! five economic quadrants.

use chrono::NaiveDate;
use std::fmt;

use super::error::PermafolioError;
use super::instrument::Instrument;
use super::rates;
use super::window::WindowProvider;

/// Fixed offset subtracted from gold growth to form the gold/bond score.
pub const GOLD_BOND_OFFSET: f64 = 0.05;

/// Gold/equity score above this threshold reads as a bust.
pub const GOLD_EQUITY_THRESHOLD: f64 = 5.0;

/// One of five discrete macro states inferred from relative asset momentum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Quadrant {
    InflationaryBust,
    InflationaryBoom,
    DeflationaryBust,
    DeflationaryBoom,
    /// Indeterminate regime; the backtest engine has no return rule for it
    /// and callers carry capital forward unchanged instead.
    TransitionQuadrant,
}

impl Quadrant {
    /// Instruments the backtest engine prices for this quadrant's return
    /// formula. `None` for the transition state.
    pub fn backtest_instruments(&self) -> Option<&'static [Instrument]> {
        match self {
            Quadrant::InflationaryBust | Quadrant::InflationaryBoom => {
                Some(&[Instrument::Gold, Instrument::Equity])
            }
            Quadrant::DeflationaryBust | Quadrant::DeflationaryBoom => Some(&[
                Instrument::BondYieldShort,
                Instrument::BondYieldLong,
                Instrument::Equity,
            ]),
            Quadrant::TransitionQuadrant => None,
        }
    }

    /// Candidate holdings the allocator weighs for this quadrant. The yield
    /// instruments in the inflationary set only feed the risk-free rate and
    /// are dropped before weighting. `None` for the transition state.
    pub fn allocation_instruments(&self) -> Option<&'static [Instrument]> {
        match self {
            Quadrant::InflationaryBust | Quadrant::InflationaryBoom => Some(&[
                Instrument::Gold,
                Instrument::Equity,
                Instrument::BondYieldShort,
                Instrument::BondYieldLong,
            ]),
            Quadrant::DeflationaryBust | Quadrant::DeflationaryBoom => {
                Some(&[Instrument::TreasuryNoteFuture, Instrument::Equity])
            }
            Quadrant::TransitionQuadrant => None,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quadrant::InflationaryBust => "Inflationary Bust",
            Quadrant::InflationaryBoom => "Inflationary Boom",
            Quadrant::DeflationaryBust => "Deflationary Bust",
            Quadrant::DeflationaryBoom => "Deflationary Boom",
            Quadrant::TransitionQuadrant => "Transition Quadrant",
        };
        f.write_str(name)
    }
}

/// The two classification scores computed over one lookback window.
///
/// Despite the names these are growth differentials, not quotients: the
/// gold/bond score is gold growth minus a fixed offset, the gold/equity
/// score is gold growth minus equity growth. The names follow the strategy's
/// own vocabulary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioSnapshot {
    pub gold_bond_ratio: f64,
    pub gold_equity_ratio: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Map the two scores onto a quadrant. Pure and total; an exact-zero
/// gold/bond score (or one that compares as neither positive nor negative)
/// lands in the transition state.
pub fn classify(gold_bond_ratio: f64, gold_equity_ratio: f64) -> Quadrant {
    if gold_bond_ratio > 0.0 {
        if gold_equity_ratio > GOLD_EQUITY_THRESHOLD {
            Quadrant::InflationaryBust
        } else {
            Quadrant::InflationaryBoom
        }
    } else if gold_bond_ratio < 0.0 {
        if gold_equity_ratio > GOLD_EQUITY_THRESHOLD {
            Quadrant::DeflationaryBust
        } else {
            Quadrant::DeflationaryBoom
        }
    } else {
        Quadrant::TransitionQuadrant
    }
}

/// Computes classification ratios from price windows.
pub struct RegimeClassifier<'a> {
    provider: &'a WindowProvider<'a>,
}

impl<'a> RegimeClassifier<'a> {
    pub fn new(provider: &'a WindowProvider<'a>) -> Self {
        RegimeClassifier { provider }
    }

    /// Compute the two classification scores over `[start, end]`.
    ///
    /// Gold and equity growth take the first and last filled price inside
    /// the window. The bond figure is the window-mean yield projected over
    /// the window's day count; it only participates as a validity check
    /// here, since the gold/bond score is offset-based.
    pub fn compute_ratios(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RatioSnapshot, PermafolioError> {
        let window = self
            .provider
            .get_window(&Instrument::ratio_set(), start, end)?;

        let gold_growth = window
            .series(Instrument::Gold)?
            .growth(start, end)
            .ok_or(PermafolioError::UndefinedRatio {
                figure: "gold",
                start,
                end,
            })?;
        let equity_growth = window
            .series(Instrument::Equity)?
            .growth(start, end)
            .ok_or(PermafolioError::UndefinedRatio {
                figure: "equity",
                start,
                end,
            })?;
        let bonds_growth =
            rates::bond_growth(&window, start, end).ok_or(PermafolioError::UndefinedRatio {
                figure: "bond",
                start,
                end,
            })?;
        if !bonds_growth.is_finite() {
            return Err(PermafolioError::UndefinedRatio {
                figure: "bond",
                start,
                end,
            });
        }

        Ok(RatioSnapshot {
            gold_bond_ratio: gold_growth - GOLD_BOND_OFFSET,
            gold_equity_ratio: gold_growth - equity_growth,
            start,
            end,
        })
    }
}
