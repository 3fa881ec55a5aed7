//! Tabular Report Encoding
//!
//! Trend and gap reports are plain comma-separated files with a
//! fixed header row. Symbols are stored in display form (exchange
//! suffix stripped), prices and percentages with two decimals.

use std::path::Path;

use crate::domain::instrument::display_symbol;
use crate::domain::{GapKind, GapReport, GapSignal, SessionResult, TrendEntry, TrendState};
use crate::ports::repository::StoreError;

pub const TREND_HEADER: &str = "Symbol,Baseline,Final Price,% Change,State";
pub const GAP_HEADER: &str = "Symbol,Yesterday High,Yesterday Low,Today Open,Gap %,Status";

/// Quote a field only if it would break the row.
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Encode a finalized trend session, Rising block first.
pub fn encode_trend(result: &SessionResult) -> String {
    let mut out = String::with_capacity(64 * (result.entries.len() + 1));
    out.push_str(TREND_HEADER);
    out.push('\n');
    for e in &result.entries {
        out.push_str(&format!(
            "{},{:.2},{:.2},{:.2},{}\n",
            field(display_symbol(&e.symbol)),
            e.baseline,
            e.price,
            e.change_pct,
            e.state
        ));
    }
    out
}

/// Encode a gap report in scan order.
pub fn encode_gaps(report: &GapReport) -> String {
    let mut out = String::with_capacity(64 * (report.signals.len() + 1));
    out.push_str(GAP_HEADER);
    out.push('\n');
    for s in &report.signals {
        out.push_str(&format!(
            "{},{:.2},{:.2},{:.2},{:.2},{}\n",
            field(display_symbol(&s.symbol)),
            s.yesterday_high,
            s.yesterday_low,
            s.today_open,
            s.gap_pct,
            s.kind
        ));
    }
    out
}

/// Split one row, honoring double-quoted fields.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> StoreError {
    StoreError::Malformed {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

/// Check the header and yield `(line number, fields)` for each data row.
fn rows<'a>(
    path: &Path,
    content: &'a str,
    header: &str,
) -> Result<impl Iterator<Item = (usize, Vec<String>)> + 'a, StoreError> {
    let mut lines = content.lines().enumerate();
    match lines.next() {
        Some((_, first)) if first.trim() == header => {}
        Some((_, first)) => return Err(malformed(path, 1, format!("unexpected header: {first}"))),
        None => return Err(malformed(path, 1, "empty file")),
    }
    Ok(lines
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, split_row(line))))
}

fn number(path: &Path, line: usize, raw: &str, name: &str) -> Result<f64, StoreError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| malformed(path, line, format!("{name}: {e}")))
}

/// Decode a trend file written by `encode_trend`.
pub fn decode_trend(path: &Path, content: &str) -> Result<Vec<TrendEntry>, StoreError> {
    let mut entries = Vec::new();
    for (line, cols) in rows(path, content, TREND_HEADER)? {
        let [symbol, baseline, price, change, state] = cols.as_slice() else {
            return Err(malformed(path, line, format!("expected 5 columns, got {}", cols.len())));
        };
        let state: TrendState = state.trim().parse().map_err(|e: String| malformed(path, line, e))?;

        entries.push(TrendEntry {
            symbol: symbol.clone(),
            baseline: number(path, line, baseline, "baseline")?,
            price: number(path, line, price, "final price")?,
            change_pct: number(path, line, change, "% change")?,
            state,
        });
    }
    Ok(entries)
}

/// Decode a gap file written by `encode_gaps`.
pub fn decode_gaps(path: &Path, content: &str) -> Result<Vec<GapSignal>, StoreError> {
    let mut signals = Vec::new();
    for (line, cols) in rows(path, content, GAP_HEADER)? {
        let [symbol, high, low, open, gap, status] = cols.as_slice() else {
            return Err(malformed(path, line, format!("expected 6 columns, got {}", cols.len())));
        };
        let kind: GapKind = status.trim().parse().map_err(|e: String| malformed(path, line, e))?;

        signals.push(GapSignal {
            symbol: symbol.clone(),
            yesterday_high: number(path, line, high, "yesterday high")?,
            yesterday_low: number(path, line, low, "yesterday low")?,
            today_open: number(path, line, open, "today open")?,
            gap_pct: number(path, line, gap, "gap %")?,
            kind,
        });
    }
    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn result() -> SessionResult {
        SessionResult {
            session_id: Uuid::nil(),
            session_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            finalized_at: Utc::now(),
            entries: vec![
                TrendEntry {
                    symbol: "TCS.NS".to_string(),
                    baseline: 3500.0,
                    price: 3543.756,
                    change_pct: 1.2501714,
                    state: TrendState::Rising,
                },
                TrendEntry {
                    symbol: "M&M.NS".to_string(),
                    baseline: 50.0,
                    price: 49.0,
                    change_pct: 2.0,
                    state: TrendState::Falling,
                },
            ],
        }
    }

    #[test]
    fn test_encode_trend_rounds_and_strips_suffix() {
        let csv = encode_trend(&result());
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(TREND_HEADER));
        assert_eq!(lines.next(), Some("TCS,3500.00,3543.76,1.25,Rising"));
        assert_eq!(lines.next(), Some("M&M,50.00,49.00,2.00,Falling"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_decode_reads_back_written_rows() {
        let path = Path::new("trend_2026-03-02.csv");
        let entries = decode_trend(path, &encode_trend(&result())).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].symbol, "TCS");
        assert_eq!(entries[0].price, 3543.76);
        assert_eq!(entries[1].state, TrendState::Falling);
    }

    #[test]
    fn test_decode_reports_bad_line() {
        let path = Path::new("t.csv");
        let content = format!("{TREND_HEADER}\nTCS,1.00,2.00,100.00,Rising\nINFY,abc,1.00,0.00,Rising\n");
        let err = decode_trend(path, &content).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_decode_rejects_foreign_header() {
        let err = decode_trend(Path::new("t.csv"), "a,b\n").unwrap_err();
        assert!(matches!(err, StoreError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_quoted_fields_round_trip() {
        assert_eq!(field("A,B"), "\"A,B\"");
        assert_eq!(split_row("\"A,B\",1.00"), vec!["A,B".to_string(), "1.00".to_string()]);
    }

    #[test]
    fn test_decode_gaps_reads_status_column() {
        let content = format!(
            "{GAP_HEADER}\nINFY,100.00,95.00,102.00,2.00,Gap Up Breakout\nTCS,50.00,48.00,47.04,2.00,Gap Down Breakdown\n"
        );
        let signals = decode_gaps(Path::new("breakouts_2026-03-03.csv"), &content).unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].symbol, "INFY");
        assert_eq!(signals[0].kind, GapKind::GapUpBreakout);
        assert_eq!(signals[1].today_open, 47.04);
        assert_eq!(signals[1].kind, GapKind::GapDownBreakdown);
    }

    #[test]
    fn test_decode_gaps_rejects_unknown_status() {
        let content = format!("{GAP_HEADER}\nINFY,100.00,95.00,102.00,2.00,Sideways\n");
        let err = decode_gaps(Path::new("b.csv"), &content).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_encode_gaps() {
        let report = GapReport {
            date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            signals: vec![GapSignal {
                symbol: "INFY.NS".to_string(),
                yesterday_high: 100.0,
                yesterday_low: 95.0,
                today_open: 102.0,
                gap_pct: 2.0,
                kind: GapKind::GapUpBreakout,
            }],
        };
        let csv = encode_gaps(&report);
        assert_eq!(csv, format!("{GAP_HEADER}\nINFY,100.00,95.00,102.00,2.00,Gap Up Breakout\n"));
    }
}
