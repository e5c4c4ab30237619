use std::{borrow::Borrow, fmt};

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::{
    assets::{AgentRoster, MapRoster},
    riot::models::{MatchPlayer, MatchRecord, map_url_key},
};

use super::{KdRatio, Outcome, mode_matches, win_rate};

/// What a breakdown is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Grouped by agent played.
    Agent,
    /// Grouped by map.
    Map,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Agent => f.write_str("agent"),
            EntityKind::Map => f.write_str("map"),
        }
    }
}

/// A filter name that does not resolve against the roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no {kind} named `{name}`")]
pub struct UnknownEntity {
    /// Roster that was searched.
    pub kind: EntityKind,
    /// Name as given.
    pub name: String,
}

/// Per-agent or per-map totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityStats {
    /// Games counted.
    pub games: u32,
    /// Games won.
    pub wins: u32,
    /// Games with a known result.
    pub decided: u32,
    /// Total kills.
    pub kills: u32,
    /// Total deaths.
    pub deaths: u32,
    /// Total assists.
    pub assists: u32,
}

impl EntityStats {
    /// Kill/death ratio of the group.
    pub fn kd(&self) -> KdRatio {
        KdRatio::new(self.kills, self.deaths)
    }

    /// Win percentage over decided games, `None` when there are none.
    pub fn win_rate(&self) -> Option<f64> {
        win_rate(self.wins, self.decided)
    }
}

/// Stats grouped by agent id or map key, most played first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    /// Whether keys are agent ids or map keys.
    pub kind: EntityKind,
    /// Key to totals, most played first.
    pub entries: IndexMap<String, EntityStats>,
}

impl Breakdown {
    /// No game passed the filters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Group the player's games by agent, optionally keeping a single agent looked up by
/// display name.
pub fn breakdown_by_agent<I>(
    puuid: &str,
    matches: I,
    mode: Option<&str>,
    roster: &AgentRoster,
    only: Option<&str>,
) -> Result<Breakdown, UnknownEntity>
where
    I: IntoIterator,
    I::Item: Borrow<MatchRecord>,
{
    let only = only
        .map(|name| {
            roster
                .by_name(name)
                .map(|agent| agent.uuid.to_lowercase())
                .ok_or_else(|| UnknownEntity {
                    kind: EntityKind::Agent,
                    name: name.trim().to_string(),
                })
        })
        .transpose()?;

    Ok(group(EntityKind::Agent, puuid, matches, mode, only, |_, player| {
        player.character_id.as_deref().map(str::to_lowercase)
    }))
}

/// Group the player's games by map, optionally keeping a single map looked up by
/// display name.
pub fn breakdown_by_map<I>(
    puuid: &str,
    matches: I,
    mode: Option<&str>,
    roster: &MapRoster,
    only: Option<&str>,
) -> Result<Breakdown, UnknownEntity>
where
    I: IntoIterator,
    I::Item: Borrow<MatchRecord>,
{
    let only = only
        .map(|name| {
            roster
                .by_name(name)
                .map(|map| map_url_key(&map.map_url))
                .ok_or_else(|| UnknownEntity {
                    kind: EntityKind::Map,
                    name: name.trim().to_string(),
                })
        })
        .transpose()?;

    Ok(group(EntityKind::Map, puuid, matches, mode, only, |record, _| {
        Some(record.map_key()).filter(|key| !key.is_empty())
    }))
}

fn group<I, F>(
    kind: EntityKind,
    puuid: &str,
    matches: I,
    mode: Option<&str>,
    only: Option<String>,
    key_of: F,
) -> Breakdown
where
    I: IntoIterator,
    I::Item: Borrow<MatchRecord>,
    F: Fn(&MatchRecord, &MatchPlayer) -> Option<String>,
{
    let mut entries: IndexMap<String, EntityStats> = IndexMap::new();

    for record in matches {
        let record = record.borrow();
        if !mode_matches(record, mode) {
            continue;
        }
        let Some(player) = record.player(puuid) else {
            continue;
        };
        let Some(stats) = player.stats else {
            continue;
        };
        let Some(key) = key_of(record, player) else {
            continue;
        };
        if only.as_ref().is_some_and(|only| *only != key) {
            continue;
        }

        let entry = entries.entry(key).or_default();
        entry.games += 1;
        match Outcome::of(record, player) {
            Outcome::Win => {
                entry.wins += 1;
                entry.decided += 1;
            }
            Outcome::Loss => entry.decided += 1,
            Outcome::Unknown => {}
        }
        entry.kills += stats.kills;
        entry.deaths += stats.deaths;
        entry.assists += stats.assists;
    }

    entries.sort_by(|ka, a, kb, b| b.games.cmp(&a.games).then_with(|| ka.cmp(kb)));
    Breakdown { kind, entries }
}
