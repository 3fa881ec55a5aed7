//! Intraday High-High / Low-Low screen.
//!
//! Flags instruments trading within 0.5% of the day's extreme after
//! having moved away from the open in that direction.

use serde::{Deserialize, Serialize};

use super::instrument::Symbol;

/// Proximity to the day's extreme that still counts as "at" it.
pub const EXTREME_TOLERANCE: f64 = 0.005;

/// One intraday bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntradayBar {
    /// Unix seconds of the bar start.
    pub timestamp: i64,
    /// Opening price.
    pub open: f64,
    /// Bar high.
    pub high: f64,
    /// Bar low.
    pub low: f64,
    /// Closing price.
    pub close: f64,
}

/// Screen classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtremeStatus {
    /// Last price at the day's high, above the open.
    HighHigh,
    /// Last price at the day's low, below the open.
    LowLow,
    /// Neither.
    None,
}

impl std::fmt::Display for ExtremeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighHigh => write!(f, "High-High"),
            Self::LowLow => write!(f, "Low-Low"),
            Self::None => Ok(()),
        }
    }
}

/// Day summary for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntradaySummary {
    pub symbol: Symbol,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub last: f64,
    /// `(last - open) / open * 100`.
    pub change_pct: f64,
    pub status: ExtremeStatus,
}

/// Summarize a day's bars. Returns `None` for an empty series or a
/// non-positive open.
pub fn summarize(symbol: &str, bars: &[IntradayBar]) -> Option<IntradaySummary> {
    let first = bars.first()?;
    let last = bars.last()?.close;
    let open = first.open;
    if open <= 0.0 {
        return None;
    }

    let high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let low = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);

    let status = if high > open && last >= high * (1.0 - EXTREME_TOLERANCE) {
        ExtremeStatus::HighHigh
    } else if low < open && last <= low * (1.0 + EXTREME_TOLERANCE) {
        ExtremeStatus::LowLow
    } else {
        ExtremeStatus::None
    };

    Some(IntradaySummary {
        symbol: symbol.to_string(),
        open,
        high,
        low,
        last,
        change_pct: (last - open) / open * 100.0,
        status,
    })
}
