//! HTML gap report: one table, one row per gap.

use crate::domain::GapReport;
use crate::domain::instrument::display_symbol;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the gap report page.
pub fn render_gap_report(report: &GapReport) -> String {
    let mut rows = String::new();
    for s in &report.signals {
        rows.push_str(&format!(
            "      <tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td></tr>\n",
            escape(display_symbol(&s.symbol)),
            s.yesterday_high,
            s.yesterday_low,
            s.today_open,
            s.gap_pct,
            s.kind
        ));
    }

    format!(
        "<!DOCTYPE html>
<html>
  <head>
    <meta charset=\"utf-8\">
    <title>Nifty 50 Gap Report {date}</title>
  </head>
  <body>
    <h2>Nifty 50 Gap Report &ndash; {date}</h2>
    <table border=\"1\">
      <tr><th>Symbol</th><th>Yesterday High</th><th>Yesterday Low</th><th>Today Open</th><th>Gap %</th><th>Status</th></tr>
{rows}    </table>
  </body>
</html>
",
        date = report.date,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GapKind, GapSignal};
    use chrono::NaiveDate;

    #[test]
    fn test_render_escapes_symbol() {
        let report = GapReport {
            date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            signals: vec![GapSignal {
                symbol: "M&M.NS".to_string(),
                yesterday_high: 100.0,
                yesterday_low: 95.0,
                today_open: 90.0,
                gap_pct: 5.26,
                kind: GapKind::GapDownBreakdown,
            }],
        };
        let html = render_gap_report(&report);
        assert!(html.contains("<td>M&amp;M</td>"));
        assert!(html.contains("<td>5.26</td><td>Gap Down Breakdown</td>"));
        assert!(html.contains("2026-03-03"));
    }
}
