//! Prometheus Metrics Registry - Tracker Observability
//!
//! Registers the tracker's metrics and keeps them current by
//! following the tracker's event feed. Covers tick outcomes, quote
//! latency, per-state instrument counts, and report delivery.

use std::sync::Arc;

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::domain::TrackerEvent;

/// Centralized Prometheus metrics for the tracker.
///
/// All metrics follow the naming convention `nifty_tracker_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Poll ticks by outcome (`applied`, `skipped`).
    pub ticks: IntCounterVec,
    /// Quote fetch latency histogram (milliseconds).
    pub fetch_latency_ms: Histogram,
    /// Instruments priced in the last applied tick.
    pub instruments_updated: IntGauge,
    /// Instruments per trend state.
    pub instruments: IntGaugeVec,
    /// Trend state transitions.
    pub transitions: IntCounter,
    /// Baselines captured by the last start.
    pub baselines: IntGauge,
    /// Sessions finalized, by notification outcome.
    pub finalized: IntCounterVec,
    /// Loops ended by a stop request.
    pub stops: IntCounter,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let ticks = IntCounterVec::new(
            Opts::new("nifty_tracker_ticks_total", "Poll ticks by outcome"),
            &["outcome"],
        )?;

        let fetch_latency_ms = Histogram::with_opts(
            HistogramOpts::new(
                "nifty_tracker_fetch_latency_ms",
                "Batched quote fetch latency in milliseconds",
            )
            .buckets(vec![50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]),
        )?;

        let instruments_updated = IntGauge::new(
            "nifty_tracker_instruments_updated",
            "Instruments priced in the last applied tick",
        )?;

        let instruments = IntGaugeVec::new(
            Opts::new("nifty_tracker_instruments", "Instruments per trend state"),
            &["state"],
        )?;

        let transitions = IntCounter::new(
            "nifty_tracker_transitions_total",
            "Trend state transitions",
        )?;

        let baselines = IntGauge::new(
            "nifty_tracker_baselines",
            "Baselines captured at session start",
        )?;

        let finalized = IntCounterVec::new(
            Opts::new("nifty_tracker_finalized_total", "Sessions finalized"),
            &["notified"],
        )?;

        let stops = IntCounter::new(
            "nifty_tracker_stops_total",
            "Tracking loops ended by a stop request",
        )?;

        registry.register(Box::new(ticks.clone()))?;
        registry.register(Box::new(fetch_latency_ms.clone()))?;
        registry.register(Box::new(instruments_updated.clone()))?;
        registry.register(Box::new(instruments.clone()))?;
        registry.register(Box::new(transitions.clone()))?;
        registry.register(Box::new(baselines.clone()))?;
        registry.register(Box::new(finalized.clone()))?;
        registry.register(Box::new(stops.clone()))?;

        Ok(Self {
            registry,
            ticks,
            fetch_latency_ms,
            instruments_updated,
            instruments,
            transitions,
            baselines,
            finalized,
            stops,
        })
    }

    /// Fold one tracker event into the metrics.
    pub fn observe(&self, event: &TrackerEvent) {
        match event {
            TrackerEvent::Armed { baselines, .. } => {
                self.baselines.set(i64::try_from(*baselines).unwrap_or(i64::MAX));
                self.instruments.reset();
            }
            TrackerEvent::Tick {
                status,
                transitions,
                counts,
                latency_ms,
            } => {
                self.ticks.with_label_values(&["applied"]).inc();
                self.fetch_latency_ms.observe(*latency_ms as f64);
                self.instruments_updated
                    .set(i64::try_from(status.updated).unwrap_or(i64::MAX));
                self.transitions.inc_by(*transitions as u64);
                for (state, count) in counts {
                    self.instruments
                        .with_label_values(&[state.to_string().as_str()])
                        .set(i64::try_from(*count).unwrap_or(i64::MAX));
                }
            }
            TrackerEvent::FetchSkipped { latency_ms, .. } => {
                self.ticks.with_label_values(&["skipped"]).inc();
                self.fetch_latency_ms.observe(*latency_ms as f64);
            }
            TrackerEvent::Stopped => self.stops.inc(),
            TrackerEvent::Finalized { notified, .. } => {
                let label = if *notified { "true" } else { "false" };
                self.finalized.with_label_values(&[label]).inc();
            }
        }
    }

    /// Follow the tracker's event feed until it closes.
    pub async fn follow(self: Arc<Self>, mut events: broadcast::Receiver<TrackerEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.observe(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Metrics observer lagged behind tracker events");
                }
                Err(RecvError::Closed) => {
                    debug!("Tracker event feed closed");
                    return;
                }
            }
        }
    }

    /// Render all metrics in the Prometheus text format.
    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
