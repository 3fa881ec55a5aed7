//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the tracker's workflows. Each use case is a self-contained
//! operation.
//!
//! Use cases:
//! - `TrendTracker`: Baseline capture + fixed-cadence polling loop
//! - `ReportEmitter`: One-shot finalize, persistence, notification
//! - `GapScanner`: Opening gaps against yesterday's range
//! - `ExtremesScreener`: Intraday High-High / Low-Low screen
//! - `ReportViewer`: Stored reports by date, manual re-send

pub mod baseline;
pub mod error;
pub mod gap_scanner;
pub mod report_emitter;
pub mod report_viewer;
pub mod screener;
pub mod tracker;

pub use error::TrackerError;
pub use gap_scanner::GapScanner;
pub use report_emitter::{DeliveryStatus, FinalizeOutcome, ReportEmitter};
pub use report_viewer::{ReportViewer, StoredDay};
pub use screener::ExtremesScreener;
pub use tracker::{RunOutcome, TrendTracker};
