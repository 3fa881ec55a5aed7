//! Trend classification state machine.
//!
//! Each instrument starts `Unclassified`, takes a direction on the
//! first tick that diverges from its baseline, and is permanently
//! `Disqualified` if the price later crosses back through the
//! baseline. Equality is exact: there is no tolerance band.

use serde::{Deserialize, Serialize};

/// Per-instrument trend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrendState {
    /// Baseline captured, price has not diverged yet.
    #[default]
    Unclassified,
    /// Moved above baseline and has not crossed back below it.
    Rising,
    /// Moved below baseline and has not crossed back above it.
    Falling,
    /// Whipsawed through the baseline. Absorbing.
    Disqualified,
}

impl TrendState {
    /// Apply one observed price against the instrument's baseline.
    ///
    /// Returns the next state. `Disqualified` never transitions.
    pub fn advance(self, baseline: f64, current: f64) -> Self {
        match self {
            Self::Disqualified => Self::Disqualified,
            Self::Unclassified if current > baseline => Self::Rising,
            Self::Unclassified if current < baseline => Self::Falling,
            Self::Unclassified => Self::Unclassified,
            Self::Rising if current < baseline => Self::Disqualified,
            Self::Falling if current > baseline => Self::Disqualified,
            state => state,
        }
    }

    /// Directional states are the only ones reported.
    pub fn is_directional(self) -> bool {
        matches!(self, Self::Rising | Self::Falling)
    }

    /// Whether no further transition can happen.
    pub fn is_terminal(self) -> bool {
        self == Self::Disqualified
    }
}

impl std::fmt::Display for TrendState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unclassified => write!(f, "Unclassified"),
            Self::Rising => write!(f, "Rising"),
            Self::Falling => write!(f, "Falling"),
            Self::Disqualified => write!(f, "Disqualified"),
        }
    }
}

impl std::str::FromStr for TrendState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unclassified" => Ok(Self::Unclassified),
            "Rising" => Ok(Self::Rising),
            "Falling" => Ok(Self::Falling),
            "Disqualified" => Ok(Self::Disqualified),
            other => Err(format!("unknown trend state: {other}")),
        }
    }
}

/// Favorable move size in percent for a directional state.
///
/// `Rising` measures `(current - baseline) / baseline`, `Falling`
/// measures `(baseline - current) / baseline`. Non-directional states
/// have no meaningful change and return `None`.
pub fn favorable_change_pct(state: TrendState, baseline: f64, current: f64) -> Option<f64> {
    match state {
        TrendState::Rising => Some((current - baseline) / baseline * 100.0),
        TrendState::Falling => Some((baseline - current) / baseline * 100.0),
        TrendState::Unclassified | TrendState::Disqualified => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unclassified_takes_direction() {
        assert_eq!(TrendState::Unclassified.advance(100.0, 101.0), TrendState::Rising);
        assert_eq!(TrendState::Unclassified.advance(100.0, 99.0), TrendState::Falling);
        assert_eq!(TrendState::Unclassified.advance(100.0, 100.0), TrendState::Unclassified);
    }

    #[test]
    fn test_whipsaw_disqualifies() {
        assert_eq!(TrendState::Rising.advance(100.0, 99.99), TrendState::Disqualified);
        assert_eq!(TrendState::Falling.advance(100.0, 100.01), TrendState::Disqualified);
    }

    #[test]
    fn test_touching_baseline_keeps_direction() {
        assert_eq!(TrendState::Rising.advance(100.0, 100.0), TrendState::Rising);
        assert_eq!(TrendState::Falling.advance(100.0, 100.0), TrendState::Falling);
    }

    #[test]
    fn test_disqualified_is_absorbing() {
        for price in [50.0, 100.0, 150.0] {
            assert_eq!(TrendState::Disqualified.advance(100.0, price), TrendState::Disqualified);
        }
    }

    #[test]
    fn test_favorable_change_sign_convention() {
        let rising = favorable_change_pct(TrendState::Rising, 50.0, 60.0).unwrap();
        let falling = favorable_change_pct(TrendState::Falling, 200.0, 190.0).unwrap();
        assert!((rising - 20.0).abs() < 1e-9);
        assert!((falling - 5.0).abs() < 1e-9);
        assert!(favorable_change_pct(TrendState::Disqualified, 1.0, 2.0).is_none());
    }

    #[test]
    fn test_state_string_round_trip() {
        for state in [TrendState::Rising, TrendState::Falling] {
            assert_eq!(state.to_string().parse::<TrendState>().unwrap(), state);
        }
        assert!("Sideways".parse::<TrendState>().is_err());
    }
}
