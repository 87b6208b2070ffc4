//! The fixed instrument universe the strategy trades and observes.

use std::fmt;

/// Closed set of instruments used by the regime classifier, the allocator
/// and the backtest engine. The two treasury yields are observed (to derive
/// a risk-free rate), never held directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum Instrument {
    /// Gold futures (GC=F).
    Gold,
    /// S&P 500 index (^GSPC).
    Equity,
    /// 5-year treasury yield (^FVX), quoted in percent.
    BondYieldShort,
    /// 30-year treasury yield (^TYX), quoted in percent.
    BondYieldLong,
    /// 10-year treasury note futures (ZN=F).
    TreasuryNoteFuture,
}

impl Instrument {
    /// Upstream ticker symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Instrument::Gold => "GC=F",
            Instrument::Equity => "^GSPC",
            Instrument::BondYieldShort => "^FVX",
            Instrument::BondYieldLong => "^TYX",
            Instrument::TreasuryNoteFuture => "ZN=F",
        }
    }

    /// Filesystem-safe short name, used by file-backed data adapters.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Instrument::Gold => "gold",
            Instrument::Equity => "gspc",
            Instrument::BondYieldShort => "fvx",
            Instrument::BondYieldLong => "tyx",
            Instrument::TreasuryNoteFuture => "zn",
        }
    }

    /// True for the two yield series, which are rates rather than prices.
    pub fn is_yield(&self) -> bool {
        matches!(
            self,
            Instrument::BondYieldShort | Instrument::BondYieldLong
        )
    }

    /// Instruments needed to compute the classification ratios.
    pub fn ratio_set() -> [Instrument; 4] {
        [
            Instrument::Gold,
            Instrument::Equity,
            Instrument::BondYieldShort,
            Instrument::BondYieldLong,
        ]
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
