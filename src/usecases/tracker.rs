//! Trend Tracker - Fixed-cadence Polling Loop
//!
//! Owns the session and drives it:
//! 1. `start` re-arms the session and captures baselines (first tick)
//! 2. `run` waits one cadence, fetches the universe, classifies
//! 3. The board is republished after every applied tick
//! 4. At the cutoff the session is finalized and the loop ends
//!
//! `stop` ends the loop before its next wait without finalizing.
//! Observers subscribe to the board (`watch`) and lifecycle events
//! (`broadcast`) instead of polling the loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{RwLock, broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::domain::market_time::{POLL_CADENCE, cutoff_reached, session_date};
use crate::domain::{Session, SessionResult, Symbol, TrackerEvent, TrendBoard, TrendState};
use crate::ports::clock::Clock;
use crate::ports::quote_source::QuoteSource;

use super::baseline::capture_baseline;
use super::error::TrackerError;
use super::report_emitter::{FinalizeOutcome, ReportEmitter};

/// How `run` ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
  /// `stop` was requested; nothing was finalized.
  Stopped,
  /// The cutoff was reached and the session finalized.
  Finalized(FinalizeOutcome),
}

/// Live trend tracker for one session at a time.
pub struct TrendTracker {
  /// Batched latest-price provider.
  quotes: Arc<dyn QuoteSource>,
  /// Wall clock for the cutoff and tick timestamps.
  clock: Arc<dyn Clock>,
  /// Finalize/persist/notify.
  emitter: Arc<ReportEmitter>,
  /// Session state; only this tracker writes it.
  session: Arc<RwLock<Session>>,
  /// Stop flag. `true` means the loop must exit.
  stop_tx: watch::Sender<bool>,
  /// Latest display board.
  board_tx: watch::Sender<TrendBoard>,
  /// Lifecycle events.
  events_tx: broadcast::Sender<TrackerEvent>,
  /// Wait between ticks.
  cadence: Duration,
}

impl TrendTracker {
  /// Create an idle tracker.
  pub fn new(
    quotes: Arc<dyn QuoteSource>,
    clock: Arc<dyn Clock>,
    emitter: Arc<ReportEmitter>,
  ) -> Self {
    let (stop_tx, _) = watch::channel(false);
    let (board_tx, _) = watch::channel(TrendBoard::default());
    let (events_tx, _) = broadcast::channel(256);

    Self {
      quotes,
      clock,
      emitter,
      session: Arc::new(RwLock::new(Session::new())),
      stop_tx,
      board_tx,
      events_tx,
      cadence: POLL_CADENCE,
    }
  }

  /// Shared session handle for read-only consumers.
  pub fn session(&self) -> Arc<RwLock<Session>> {
    Arc::clone(&self.session)
  }

  /// Display feed: the latest Rising/Falling board.
  pub fn board(&self) -> watch::Receiver<TrendBoard> {
    self.board_tx.subscribe()
  }

  /// Lifecycle event feed.
  pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
    self.events_tx.subscribe()
  }

  /// Re-arm and capture baselines for `universe`.
  ///
  /// Resets baselines, states, the finalized flag and the stop flag.
  /// Returns the number of instruments with a baseline.
  ///
  /// # Errors
  /// `EmptyUniverse`, `Store(AlreadyExists)` when today's report is
  /// already on disk and overwrite is off, `SessionStart` when no
  /// instrument could be priced, `Superseded` when another `start`
  /// raced this one.
  #[instrument(skip(self, universe), fields(universe = universe.len()))]
  pub async fn start(&self, universe: &[Symbol]) -> Result<usize, TrackerError> {
    if universe.is_empty() {
      return Err(TrackerError::EmptyUniverse);
    }

    let now = self.clock.now();
    let date = session_date(now);
    self.emitter.ensure_session_slot(date).await?;

    self.stop_tx.send_replace(false);
    let generation = {
      let mut session = self.session.write().await;
      let generation = session.rearm(universe, date);
      self.board_tx.send_replace(session.board());
      generation
    };

    let prices = capture_baseline(self.quotes.as_ref(), universe).await?;

    let mut session = self.session.write().await;
    if session.generation() != generation {
      warn!(generation, "Baseline capture superseded by a newer start");
      return Err(TrackerError::Superseded);
    }
    let captured = session.capture_baselines(&prices, self.clock.now());
    self.board_tx.send_replace(session.board());
    let universe_len = session.universe().len();
    drop(session);

    if cutoff_reached(now) {
      warn!("Started after the cutoff; the session will finalize at the first check");
    }

    info!(generation, captured, "Tracking session armed");
    let _ = self.events_tx.send(TrackerEvent::Armed {
      generation,
      universe: universe_len,
      baselines: captured,
    });
    Ok(captured)
  }

  /// Request the loop to exit before its next wait. Does not finalize.
  pub fn stop(&self) {
    info!("Stop requested");
    self.stop_tx.send_replace(true);
  }

  /// Drive the session until stopped or the cutoff is reached.
  ///
  /// Fetch failures are absorbed per tick; the loop has no retry cap
  /// and relies on the cutoff alone to end.
  ///
  /// # Errors
  /// `NotStarted` without an armed session; any finalize error.
  #[instrument(skip(self), name = "tracking_loop")]
  pub async fn run(&self) -> Result<RunOutcome, TrackerError> {
    if !self.session.read().await.is_armed() {
      return Err(TrackerError::NotStarted);
    }

    let mut stop_rx = self.stop_tx.subscribe();
    info!(cadence_secs = self.cadence.as_secs(), "Tracking loop started");

    loop {
      if *stop_rx.borrow_and_update() {
        return Ok(self.stopped());
      }

      if cutoff_reached(self.clock.now()) {
        info!("Cutoff reached");
        let outcome = self.finalize().await?;
        return Ok(RunOutcome::Finalized(outcome));
      }

      tokio::select! {
        biased;
        changed = stop_rx.changed() => {
          if changed.is_err() || *stop_rx.borrow() {
            return Ok(self.stopped());
          }
          continue;
        }
        () = tokio::time::sleep(self.cadence) => {}
      }

      self.tick().await;
    }
  }

  /// Finalize the current session now. A second call is a no-op.
  ///
  /// # Errors
  /// `NotStarted` without baselines, `Store` on persistence failure.
  pub async fn finalize(&self) -> Result<FinalizeOutcome, TrackerError> {
    let outcome = self
      .emitter
      .finalize(&self.session, self.clock.now())
      .await?;

    if let FinalizeOutcome::Finalized { result, delivery, .. } = &outcome {
      self.board_tx.send_replace(self.session.read().await.board());
      let _ = self.events_tx.send(TrackerEvent::Finalized {
        entries: result.entries.len(),
        notified: delivery.is_delivered(),
      });
    }
    Ok(outcome)
  }

  /// The result the session would report right now, if it is armed
  /// but not finalized. Used to surface a result that failed to save.
  pub async fn pending_result(&self) -> Option<SessionResult> {
    let session = self.session.read().await;
    (session.is_armed() && !session.is_finalized()).then(|| session.build_result(self.clock.now()))
  }

  /// One poll: fetch, classify, republish.
  ///
  /// Returns the number of instruments updated, or `None` when the
  /// tick was skipped.
  async fn tick(&self) -> Option<usize> {
    let (generation, universe) = {
      let session = self.session.read().await;
      (session.generation(), session.universe().to_vec())
    };

    let started = Instant::now();
    let fetch = self.quotes.fetch(&universe).await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let reason = fetch.describe();

    let Some(prices) = fetch.non_empty() else {
      warn!(reason = %reason, "No quotes this tick; state unchanged");
      let mut session = self.session.write().await;
      if session.generation() == generation {
        session.record_skipped_tick(self.clock.now());
        self.board_tx.send_replace(session.board());
      }
      drop(session);
      let _ = self.events_tx.send(TrackerEvent::FetchSkipped { reason, latency_ms });
      return None;
    };

    let mut session = self.session.write().await;
    if session.generation() != generation {
      debug!(generation, "Discarding snapshot fetched for a previous session");
      return None;
    }

    let outcome = session.apply_snapshot(&prices, self.clock.now());
    for t in &outcome.transitions {
      if t.to == TrendState::Disqualified {
        info!(symbol = %t.symbol, from = %t.from, "Whipsaw through baseline, disqualified");
      } else {
        debug!(symbol = %t.symbol, from = %t.from, to = %t.to, "Trend classified");
      }
    }

    let board = session.board();
    let counts = session.state_counts();
    let status = session.last_tick();
    drop(session);

    debug!(
      updated = outcome.updated,
      rising = board.rising.len(),
      falling = board.falling.len(),
      latency_ms,
      "Tick applied"
    );
    self.board_tx.send_replace(board);

    if let Some(status) = status {
      let _ = self.events_tx.send(TrackerEvent::Tick {
        status,
        transitions: outcome.transitions.len(),
        counts,
        latency_ms,
      });
    }
    Some(outcome.updated)
  }

  fn stopped(&self) -> RunOutcome {
    info!("Tracking loop stopped without finalizing");
    let _ = self.events_tx.send(TrackerEvent::Stopped);
    RunOutcome::Stopped
  }
}
