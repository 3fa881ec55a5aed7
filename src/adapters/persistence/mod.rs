//! Persistence Adapters - Per-day CSV/HTML File Storage
//!
//! Implements the ReportStore port with one CSV file per report kind
//! per day, written atomically (tmp then rename). No database
//! dependency.

pub mod atomic;
pub mod csv;
pub mod html;
pub mod report_store;

pub use report_store::FileReportStore;
