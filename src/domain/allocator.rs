//! Sharpe-score portfolio weighting for a quadrant's candidate assets.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::error::PermafolioError;
use super::instrument::Instrument;
use super::rates;
use super::regime::Quadrant;
use super::window::WindowProvider;

/// Non-negative weights summing to one over a quadrant's holdings.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioWeights {
    weights: BTreeMap<Instrument, f64>,
}

impl PortfolioWeights {
    pub fn get(&self, instrument: Instrument) -> Option<f64> {
        self.weights.get(&instrument).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Instrument, f64)> + '_ {
        self.weights.iter().map(|(&i, &w)| (i, w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// Derives portfolio weights from windowed returns and a bond-based
/// risk-free approximation.
pub struct PortfolioAllocator<'a> {
    provider: &'a WindowProvider<'a>,
}

impl<'a> PortfolioAllocator<'a> {
    pub fn new(provider: &'a WindowProvider<'a>) -> Self {
        PortfolioAllocator { provider }
    }

    /// Weight the quadrant's candidate assets by one-shot Sharpe score.
    ///
    /// Each asset gets a single aggregate return over `[start, end]`
    /// (last/first − 1). The score divides its excess return over the
    /// risk-free figure by the standard deviation taken *across* the
    /// assets' aggregate returns, not across a daily return series.
    /// Negative scores are clipped to zero (no shorts) and the rest are
    /// normalized to sum to one.
    pub fn allocate(
        &self,
        quadrant: Quadrant,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PortfolioWeights, PermafolioError> {
        let candidates = quadrant
            .allocation_instruments()
            .ok_or(PermafolioError::UnknownQuadrant { quadrant })?;
        let window = self.provider.get_window(candidates, start, end)?;

        let has_yields = candidates.iter().any(Instrument::is_yield);
        let risk_free = if has_yields {
            rates::bond_growth(&window, start, end).ok_or(PermafolioError::UndefinedRatio {
                figure: "bond",
                start,
                end,
            })?
        } else {
            0.0
        };

        // The yield series only feed the risk-free figure; they are not
        // weighted as holdings.
        let holdings: Vec<Instrument> = candidates
            .iter()
            .copied()
            .filter(|i| !i.is_yield())
            .collect();

        let mut returns = Vec::with_capacity(holdings.len());
        for &instrument in &holdings {
            let growth = window.series(instrument)?.growth(start, end).ok_or(
                PermafolioError::UndefinedRatio {
                    figure: instrument.symbol(),
                    start,
                    end,
                },
            )?;
            returns.push(growth);
        }

        let dispersion = sample_std(&returns);
        if !(dispersion > 0.0) {
            // Zero cross-sectional dispersion leaves the scores undefined;
            // treat them as non-positive.
            return Err(PermafolioError::NoPositiveSharpe { quadrant });
        }

        let scores: Vec<f64> = returns
            .iter()
            .map(|r| ((r - risk_free) / dispersion).max(0.0))
            .collect();
        let total: f64 = scores.iter().sum();
        if total <= 0.0 {
            return Err(PermafolioError::NoPositiveSharpe { quadrant });
        }

        let weights = holdings
            .into_iter()
            .zip(scores)
            .map(|(instrument, score)| (instrument, score / total))
            .collect();
        Ok(PortfolioWeights { weights })
    }
}

/// Sample standard deviation (n − 1 denominator) across a slice.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
