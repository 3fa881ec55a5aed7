//! Tracking session state.
//!
//! A `Session` holds everything one tracking run mutates: baselines,
//! trend states, latest prices, the last tick status and, once
//! finalized, the immutable result. The polling loop is its only
//! writer; readers go through the shared lock in the tracker.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::instrument::{Symbol, is_valid_price};
use super::report::{SessionResult, TickStatus, TrendBoard, TrendEntry, sort_by_change_desc};
use super::trend::{TrendState, favorable_change_pct};

/// A state change caused by one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Instrument that changed.
    pub symbol: Symbol,
    /// State before the tick.
    pub from: TrendState,
    /// State after the tick.
    pub to: TrendState,
}

/// Effect of applying one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Instruments that received a usable price.
    pub updated: usize,
    /// State changes, in universe order.
    pub transitions: Vec<Transition>,
}

/// Mutable state of one tracking session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Identifier of the current arming.
    id: Uuid,
    /// Incremented on every re-arm; stale snapshots carry an old value.
    generation: u64,
    /// Market-local date the session was armed on.
    date: Option<NaiveDate>,
    /// Ordered, de-duplicated universe.
    universe: Vec<Symbol>,
    /// Reference price per instrument. Written once per instrument.
    baselines: HashMap<Symbol, f64>,
    /// Trend state per instrument with a baseline.
    states: HashMap<Symbol, TrendState>,
    /// Latest observed price per instrument with a baseline.
    latest: HashMap<Symbol, f64>,
    /// Last applied tick.
    last_tick: Option<TickStatus>,
    /// Present once finalized.
    result: Option<SessionResult>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// An idle, unarmed session.
    pub fn new() -> Self {
        Self {
            id: Uuid::nil(),
            generation: 0,
            date: None,
            universe: Vec::new(),
            baselines: HashMap::new(),
            states: HashMap::new(),
            latest: HashMap::new(),
            last_tick: None,
            result: None,
        }
    }

    /// Reset all per-session state for a new run and return its generation.
    pub fn rearm(&mut self, universe: &[Symbol], date: NaiveDate) -> u64 {
        let mut seen = HashSet::new();
        self.universe = universe
            .iter()
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect();
        self.id = Uuid::new_v4();
        self.generation += 1;
        self.date = Some(date);
        self.baselines.clear();
        self.states.clear();
        self.latest.clear();
        self.last_tick = None;
        self.result = None;
        self.generation
    }

    /// Record baselines from the first successful fetch.
    ///
    /// Only universe members with a valid price get a baseline; an
    /// existing baseline is never replaced. Returns how many were set.
    pub fn capture_baselines(&mut self, prices: &HashMap<Symbol, f64>, at: DateTime<Utc>) -> usize {
        let mut captured = 0;
        for symbol in &self.universe {
            let Some(&price) = prices.get(symbol) else {
                continue;
            };
            if !is_valid_price(price) || self.baselines.contains_key(symbol) {
                continue;
            }
            self.baselines.insert(symbol.clone(), price);
            self.states.insert(symbol.clone(), TrendState::Unclassified);
            self.latest.insert(symbol.clone(), price);
            captured += 1;
        }
        self.last_tick = Some(TickStatus { at, updated: captured });
        captured
    }

    /// Feed one snapshot through the classifier.
    ///
    /// Instruments without a baseline and invalid prices are ignored.
    /// A finalized session accepts no further updates.
    pub fn apply_snapshot(&mut self, prices: &HashMap<Symbol, f64>, at: DateTime<Utc>) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.result.is_some() {
            return outcome;
        }

        for symbol in &self.universe {
            let (Some(&price), Some(&baseline)) = (prices.get(symbol), self.baselines.get(symbol)) else {
                continue;
            };
            if !is_valid_price(price) {
                continue;
            }
            let Some(state) = self.states.get_mut(symbol) else {
                continue;
            };
            outcome.updated += 1;
            if state.is_terminal() {
                continue;
            }
            self.latest.insert(symbol.clone(), price);
            let next = state.advance(baseline, price);
            if next != *state {
                outcome.transitions.push(Transition {
                    symbol: symbol.clone(),
                    from: *state,
                    to: next,
                });
                *state = next;
            }
        }

        self.last_tick = Some(TickStatus { at, updated: outcome.updated });
        outcome
    }

    /// Record a tick whose fetch produced nothing usable.
    ///
    /// Only the status indicator moves; trend states are untouched.
    pub fn record_skipped_tick(&mut self, at: DateTime<Utc>) {
        if self.result.is_none() {
            self.last_tick = Some(TickStatus { at, updated: 0 });
        }
    }

    /// Directional entries in universe order.
    fn directional_entries(&self) -> (Vec<TrendEntry>, Vec<TrendEntry>) {
        let mut rising = Vec::new();
        let mut falling = Vec::new();
        for symbol in &self.universe {
            let (Some(&state), Some(&baseline), Some(&price)) = (
                self.states.get(symbol),
                self.baselines.get(symbol),
                self.latest.get(symbol),
            ) else {
                continue;
            };
            let Some(change_pct) = favorable_change_pct(state, baseline, price) else {
                continue;
            };
            let entry = TrendEntry {
                symbol: symbol.clone(),
                baseline,
                price,
                change_pct,
                state,
            };
            match state {
                TrendState::Rising => rising.push(entry),
                _ => falling.push(entry),
            }
        }
        sort_by_change_desc(&mut rising);
        sort_by_change_desc(&mut falling);
        (rising, falling)
    }

    /// Current Rising/Falling partitions for display.
    pub fn board(&self) -> TrendBoard {
        let (rising, falling) = self.directional_entries();
        TrendBoard {
            rising,
            falling,
            last_tick: self.last_tick,
            finalized: self.result.is_some(),
        }
    }

    /// Compact the current state into a result. Does not mark finalized.
    pub fn build_result(&self, at: DateTime<Utc>) -> SessionResult {
        let (mut entries, falling) = self.directional_entries();
        entries.extend(falling);
        SessionResult {
            session_id: self.id,
            session_date: self.date.unwrap_or_else(|| at.date_naive()),
            finalized_at: at,
            entries,
        }
    }

    /// Store the result; the session is finalized from now on.
    pub fn mark_finalized(&mut self, result: SessionResult) {
        self.result = Some(result);
    }

    /// The stored result, if finalized.
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// Whether a result has been stored.
    pub fn is_finalized(&self) -> bool {
        self.result.is_some()
    }

    /// Whether `rearm` has been called and at least one baseline exists.
    pub fn is_armed(&self) -> bool {
        !self.baselines.is_empty()
    }

    /// Current arming generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Identifier of the current arming.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Market-local session date, once armed.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Universe in tracking order.
    pub fn universe(&self) -> &[Symbol] {
        &self.universe
    }

    /// Baseline for an instrument.
    pub fn baseline(&self, symbol: &str) -> Option<f64> {
        self.baselines.get(symbol).copied()
    }

    /// Trend state for an instrument with a baseline.
    pub fn state(&self, symbol: &str) -> Option<TrendState> {
        self.states.get(symbol).copied()
    }

    /// Latest observed price for an instrument with a baseline.
    pub fn latest_price(&self, symbol: &str) -> Option<f64> {
        self.latest.get(symbol).copied()
    }

    /// Number of instruments in each state.
    pub fn state_counts(&self) -> [(TrendState, usize); 4] {
        let mut counts = [
            (TrendState::Unclassified, 0),
            (TrendState::Rising, 0),
            (TrendState::Falling, 0),
            (TrendState::Disqualified, 0),
        ];
        for state in self.states.values() {
            if let Some(slot) = counts.iter_mut().find(|(s, _)| s == state) {
                slot.1 += 1;
            }
        }
        counts
    }

    /// Last applied tick.
    pub fn last_tick(&self) -> Option<TickStatus> {
        self.last_tick
    }
}
