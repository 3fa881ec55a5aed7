//! Domain layer - Core tracking logic and models.
//!
//! Pure logic for the post-open trend tracker and the gap scanner.
//! No I/O here (hexagonal architecture inner ring). All types are
//! serializable and testable in isolation.

pub mod events;
pub mod extremes;
pub mod gap;
pub mod instrument;
pub mod market_time;
pub mod report;
pub mod session;
pub mod trend;

// Re-export core types for convenience
pub use events::TrackerEvent;
pub use extremes::{ExtremeStatus, IntradayBar, IntradaySummary};
pub use gap::{DailyBar, GapKind, GapReport, GapSignal};
pub use instrument::Symbol;
pub use report::{SessionResult, TickStatus, TrendBoard, TrendEntry, render_trend_report};
pub use session::{Session, TickOutcome, Transition};
pub use trend::TrendState;
