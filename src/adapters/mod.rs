//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, file I/O, HTTP server). Each
//! sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `quotes`: Chart API client for prices and bars
//! - `notify`: Log and WhatsApp report delivery
//! - `metrics`: Prometheus metrics export and health checks
//! - `persistence`: Per-day CSV/HTML report files

pub mod metrics;
pub mod notify;
pub mod persistence;
pub mod quotes;
