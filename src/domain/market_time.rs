//! Market clock constants for the post-open observation window.
//!
//! The cadence and the cutoff are fixed. Both the session date and the
//! cutoff are evaluated in India Standard Time, a constant UTC+05:30
//! offset with no daylight saving.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

/// Interval between poll ticks.
pub const POLL_CADENCE: Duration = Duration::from_secs(30);

/// IST offset east of UTC, in seconds.
pub const MARKET_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Market-local time of day at which tracking ends.
pub const TRACKING_CUTOFF: NaiveTime = match NaiveTime::from_hms_opt(9, 30, 0) {
    Some(t) => t,
    None => panic!("invalid cutoff"),
};

/// The market timezone as a chrono offset.
pub fn market_offset() -> FixedOffset {
    FixedOffset::east_opt(MARKET_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Convert an instant to market-local time.
pub fn to_market(now: DateTime<Utc>) -> DateTime<FixedOffset> {
    now.with_timezone(&market_offset())
}

/// Calendar date of the trading session containing `now`.
pub fn session_date(now: DateTime<Utc>) -> NaiveDate {
    to_market(now).date_naive()
}

/// Whether the market-local time of day has reached the cutoff.
pub fn cutoff_reached(now: DateTime<Utc>) -> bool {
    to_market(now).time() >= TRACKING_CUTOFF
}
