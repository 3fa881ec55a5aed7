//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `QuoteSource` / `BarSource`: Latest prices and historical bars
//! - `ReportStore`: Per-day report persistence
//! - `Notifier`: Outbound report delivery
//! - `Clock`: Wall-clock time for the cutoff check

pub mod clock;
pub mod notifier;
pub mod quote_source;
pub mod repository;
