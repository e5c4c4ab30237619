//! Aggregation of match records into per-player statistics.

/// Whole-sample totals.
pub mod aggregate;
/// Per-agent and per-map totals.
pub mod breakdown;

use std::fmt;

use serde::Serialize;

pub use aggregate::{MatchSummary, aggregate};
pub use breakdown::{
    Breakdown, EntityKind, EntityStats, UnknownEntity, breakdown_by_agent, breakdown_by_map,
};

use crate::riot::models::{MatchPlayer, MatchRecord};

/// Kill/death ratio, with deathless records reported as infinite instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KdRatio {
    /// Kills per death.
    Finite(f64),
    /// Kills without a single death.
    Infinite,
}

impl KdRatio {
    /// Ratio rounded to two decimal places, or [`KdRatio::Infinite`] when `deaths` is zero.
    pub fn new(kills: u32, deaths: u32) -> Self {
        if deaths == 0 {
            KdRatio::Infinite
        } else {
            KdRatio::Finite((f64::from(kills) / f64::from(deaths) * 100.0).round() / 100.0)
        }
    }
}

impl fmt::Display for KdRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KdRatio::Finite(value) => write!(f, "{value:.2}"),
            KdRatio::Infinite => f.write_str("∞"),
        }
    }
}

/// Result of a single match from the tracked player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The player's team won.
    Win,
    /// The player's team lost.
    Loss,
    /// The record does not say which team the player was on or whether it won.
    Unknown,
}

impl Outcome {
    /// Outcome of `record` for `player`.
    pub fn of(record: &MatchRecord, player: &MatchPlayer) -> Self {
        match record.player_won(player) {
            Some(true) => Outcome::Win,
            Some(false) => Outcome::Loss,
            None => Outcome::Unknown,
        }
    }
}

/// Whether a record passes an optional mode filter. Comparison ignores ASCII case.
pub(crate) fn mode_matches(record: &MatchRecord, mode: Option<&str>) -> bool {
    mode.is_none_or(|mode| record.match_info.queue_id.eq_ignore_ascii_case(mode))
}

/// Win percentage over games with a known result.
pub(crate) fn win_rate(wins: u32, decided: u32) -> Option<f64> {
    (decided > 0).then(|| f64::from(wins) / f64::from(decided) * 100.0)
}
