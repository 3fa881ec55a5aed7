//! Tracker output types: the live board and the finalized result.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::instrument::{Symbol, display_symbol};
use super::trend::TrendState;

/// One directional instrument with its move relative to baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendEntry {
    /// Instrument identifier as quoted.
    pub symbol: Symbol,
    /// Baseline captured at session start.
    pub baseline: f64,
    /// Latest observed price.
    pub price: f64,
    /// Favorable move size in percent (see `trend::favorable_change_pct`).
    pub change_pct: f64,
    /// `Rising` or `Falling`.
    pub state: TrendState,
}

/// Best-effort status of the most recent poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStatus {
    /// When the tick's snapshot was applied.
    pub at: DateTime<Utc>,
    /// Instruments that received a price this tick.
    pub updated: usize,
}

/// Transient "currently valid" view for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendBoard {
    /// Rising instruments, largest move first.
    pub rising: Vec<TrendEntry>,
    /// Falling instruments, largest move first.
    pub falling: Vec<TrendEntry>,
    /// Status of the last applied tick.
    pub last_tick: Option<TickStatus>,
    /// Whether the session has been finalized.
    pub finalized: bool,
}

/// Finalized outcome of one tracking session. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Session identifier, regenerated on every start.
    pub session_id: Uuid,
    /// Market-local calendar date of the session.
    pub session_date: NaiveDate,
    /// When the result was built.
    pub finalized_at: DateTime<Utc>,
    /// Directional instruments only, Rising block first.
    pub entries: Vec<TrendEntry>,
}

impl SessionResult {
    /// Rising entries in stored order.
    pub fn rising(&self) -> impl Iterator<Item = &TrendEntry> {
        self.entries.iter().filter(|e| e.state == TrendState::Rising)
    }

    /// Falling entries in stored order.
    pub fn falling(&self) -> impl Iterator<Item = &TrendEntry> {
        self.entries.iter().filter(|e| e.state == TrendState::Falling)
    }

    /// Subject line for notifications.
    pub fn subject(&self) -> String {
        trend_subject(self.session_date)
    }

    /// Human-readable message body.
    pub fn render_text(&self) -> String {
        render_trend_report(self.session_date, &self.entries)
    }
}

/// Subject line of the trend report for `date`.
pub fn trend_subject(date: NaiveDate) -> String {
    format!("📊 Nifty 50 Trend Report – {date}")
}

/// Render stored or freshly built entries as the trend report body.
pub fn render_trend_report(date: NaiveDate, entries: &[TrendEntry]) -> String {
    let rising: Vec<&TrendEntry> = entries.iter().filter(|e| e.state == TrendState::Rising).collect();
    let falling: Vec<&TrendEntry> = entries.iter().filter(|e| e.state == TrendState::Falling).collect();
    format!(
        "{}\n\n📈 Rising:\n{}\n\n📉 Falling:\n{}\n",
        trend_subject(date),
        format_lines(&rising),
        format_lines(&falling),
    )
}

fn format_lines(entries: &[&TrendEntry]) -> String {
    if entries.is_empty() {
        return "None".to_string();
    }
    entries
        .iter()
        .map(|e| format!("{}: {:.2}% ({})", display_symbol(&e.symbol), e.change_pct, e.state))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sort entries by descending move size. NaN never appears here because
/// baselines are validated positive.
pub fn sort_by_change_desc(entries: &mut [TrendEntry]) {
    entries.sort_by(|a, b| b.change_pct.total_cmp(&a.change_pct));
}
