//! Opening-gap detection against the prior session's range.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::instrument::{Symbol, display_symbol};

/// One daily OHLC bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Trading date of the bar.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Session high.
    pub high: f64,
    /// Session low.
    pub low: f64,
    /// Closing price.
    pub close: f64,
}

/// Direction of an opening gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GapKind {
    /// Opened above yesterday's high.
    GapUpBreakout,
    /// Opened below yesterday's low.
    GapDownBreakdown,
}

impl std::fmt::Display for GapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GapUpBreakout => write!(f, "Gap Up Breakout"),
            Self::GapDownBreakdown => write!(f, "Gap Down Breakdown"),
        }
    }
}

impl std::str::FromStr for GapKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Gap Up Breakout" => Ok(Self::GapUpBreakout),
            "Gap Down Breakdown" => Ok(Self::GapDownBreakdown),
            other => Err(format!("unknown gap status: {other}")),
        }
    }
}

/// A detected gap for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapSignal {
    /// Instrument identifier as quoted.
    pub symbol: Symbol,
    /// Prior session high.
    pub yesterday_high: f64,
    /// Prior session low.
    pub yesterday_low: f64,
    /// Today's opening price.
    pub today_open: f64,
    /// Gap size in percent of the breached bound.
    pub gap_pct: f64,
    /// Direction.
    pub kind: GapKind,
}

/// Compare the last bar's open with the previous bar's range.
///
/// Needs at least two bars; only the last two are used. An open inside
/// `[low, high]` is not a gap.
pub fn detect_gap(symbol: &str, bars: &[DailyBar]) -> Option<GapSignal> {
    let [.., yesterday, today] = bars else {
        return None;
    };

    let (kind, gap_pct) = if today.open > yesterday.high {
        (
            GapKind::GapUpBreakout,
            (today.open - yesterday.high) / yesterday.high * 100.0,
        )
    } else if today.open < yesterday.low {
        (
            GapKind::GapDownBreakdown,
            (yesterday.low - today.open) / yesterday.low * 100.0,
        )
    } else {
        return None;
    };

    Some(GapSignal {
        symbol: symbol.to_string(),
        yesterday_high: yesterday.high,
        yesterday_low: yesterday.low,
        today_open: today.open,
        gap_pct,
        kind,
    })
}

/// Result of one gap scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    /// Market-local date of the scan.
    pub date: NaiveDate,
    /// Gaps in universe order.
    pub signals: Vec<GapSignal>,
}

impl GapReport {
    /// Gap-up breakouts.
    pub fn gap_ups(&self) -> impl Iterator<Item = &GapSignal> {
        self.signals.iter().filter(|s| s.kind == GapKind::GapUpBreakout)
    }

    /// Gap-down breakdowns.
    pub fn gap_downs(&self) -> impl Iterator<Item = &GapSignal> {
        self.signals.iter().filter(|s| s.kind == GapKind::GapDownBreakdown)
    }

    /// Whether nothing gapped.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Subject line for notifications.
    pub fn subject(&self) -> String {
        format!("📊 Nifty 50 Gap Report – {}", self.date)
    }

    /// Human-readable message body.
    pub fn render_text(&self) -> String {
        format!(
            "{}\n\n📈 Gap Ups:\n{}\n\n📉 Gap Downs:\n{}\n",
            self.subject(),
            format_lines(self.gap_ups()),
            format_lines(self.gap_downs()),
        )
    }
}

fn format_lines<'a>(signals: impl Iterator<Item = &'a GapSignal>) -> String {
    let lines: Vec<String> = signals
        .map(|s| format!("{}: {:.2}% ({})", display_symbol(&s.symbol), s.gap_pct, s.kind))
        .collect();
    if lines.is_empty() {
        "None".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, open: f64, high: f64, low: f64) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            open,
            high,
            low,
            close: open,
        }
    }

    #[test]
    fn test_gap_up_breakout() {
        let bars = [bar(2, 97.0, 100.0, 95.0), bar(3, 102.0, 103.0, 101.0)];
        let signal = detect_gap("X.NS", &bars).unwrap();
        assert_eq!(signal.kind, GapKind::GapUpBreakout);
        assert!((signal.gap_pct - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_gap_down_breakdown() {
        let bars = [bar(2, 97.0, 100.0, 95.0), bar(3, 90.25, 92.0, 89.0)];
        let signal = detect_gap("X.NS", &bars).unwrap();
        assert_eq!(signal.kind, GapKind::GapDownBreakdown);
        assert!((signal.gap_pct - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_open_inside_range_is_not_a_gap() {
        let bars = [bar(2, 97.0, 100.0, 95.0), bar(3, 100.0, 101.0, 99.0)];
        assert!(detect_gap("X.NS", &bars).is_none());
    }

    #[test]
    fn test_needs_two_bars() {
        assert!(detect_gap("X.NS", &[]).is_none());
        assert!(detect_gap("X.NS", &[bar(3, 102.0, 103.0, 101.0)]).is_none());
    }

    #[test]
    fn test_uses_last_two_bars_only() {
        let bars = [
            bar(1, 50.0, 500.0, 10.0),
            bar(2, 97.0, 100.0, 95.0),
            bar(3, 102.0, 103.0, 101.0),
        ];
        assert_eq!(detect_gap("X.NS", &bars).unwrap().yesterday_high, 100.0);
    }

    #[test]
    fn test_render_text_lists_both_sections() {
        let report = GapReport {
            date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            signals: vec![detect_gap("TCS.NS", &[bar(2, 97.0, 100.0, 95.0), bar(3, 102.0, 103.0, 101.0)]).unwrap()],
        };
        let text = report.render_text();
        assert!(text.contains("TCS: 2.00% (Gap Up Breakout)"));
        assert!(text.contains("📉 Gap Downs:\nNone"));
    }
}
