//! Tracker lifecycle events.
//!
//! Published by the tracker on a broadcast channel so observers
//! (metrics, logs, UIs) follow the session without owning the loop.

use super::report::TickStatus;
use super::trend::TrendState;

/// Something observable happened in the tracking session.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// `start` captured baselines.
    Armed {
        /// Arming generation.
        generation: u64,
        /// Universe size.
        universe: usize,
        /// Instruments with a baseline.
        baselines: usize,
    },
    /// A snapshot was applied.
    Tick {
        /// Tick status (time, instruments updated).
        status: TickStatus,
        /// State changes caused by this tick.
        transitions: usize,
        /// Instruments per state after the tick.
        counts: [(TrendState, usize); 4],
        /// Quote fetch latency.
        latency_ms: u64,
    },
    /// The fetch produced nothing; no state changed.
    FetchSkipped {
        /// Failure reason or "empty response".
        reason: String,
        /// Quote fetch latency.
        latency_ms: u64,
    },
    /// The loop exited on a stop request.
    Stopped,
    /// The session result was built and persisted.
    Finalized {
        /// Directional instruments in the result.
        entries: usize,
        /// Whether the notification was delivered.
        notified: bool,
    },
}
