use std::{borrow::Borrow, collections::HashMap};

use serde::Serialize;

use crate::riot::models::MatchRecord;

use super::{KdRatio, Outcome, mode_matches, win_rate};

/// Totals over a set of matches for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    /// Total kills.
    pub kills: u32,
    /// Total deaths.
    pub deaths: u32,
    /// Total assists.
    pub assists: u32,
    /// Games won.
    pub wins: u32,
    /// Games that passed the mode filter and had a stat line for the player.
    pub games: u32,
    /// Subset of `games` whose result could be resolved. Win rate is computed over these.
    pub decided: u32,
    /// Kill/death ratio over all counted games.
    pub kd: KdRatio,
    /// Games played per lower-cased character id.
    pub agents: HashMap<String, u32>,
    /// Games played per map key (see [`crate::riot::models::map_url_key`]).
    pub maps: HashMap<String, u32>,
}

impl MatchSummary {
    /// Win percentage over games with a known result.
    pub fn win_rate(&self) -> Option<f64> {
        win_rate(self.wins, self.decided)
    }

    /// Most played agents, highest count first, ties broken by key.
    pub fn top_agents(&self, limit: usize) -> Vec<(&str, u32)> {
        top(&self.agents, limit)
    }

    /// Most played maps, highest count first, ties broken by key.
    pub fn top_maps(&self, limit: usize) -> Vec<(&str, u32)> {
        top(&self.maps, limit)
    }
}

fn top(tally: &HashMap<String, u32>, limit: usize) -> Vec<(&str, u32)> {
    let mut entries: Vec<(&str, u32)> = tally.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(limit);
    entries
}

/// Fold `matches` into a [`MatchSummary`] for `puuid`.
///
/// Records outside `mode` and records without a stat line for the player are skipped.
/// A record whose team result cannot be resolved still counts as a game but is left
/// out of the win-rate denominator.
pub fn aggregate<I>(puuid: &str, matches: I, mode: Option<&str>) -> MatchSummary
where
    I: IntoIterator,
    I::Item: Borrow<MatchRecord>,
{
    let mut kills = 0;
    let mut deaths = 0;
    let mut assists = 0;
    let mut wins = 0;
    let mut games = 0;
    let mut decided = 0;
    let mut agents: HashMap<String, u32> = HashMap::new();
    let mut maps: HashMap<String, u32> = HashMap::new();

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

        games += 1;
        match Outcome::of(record, player) {
            Outcome::Win => {
                wins += 1;
                decided += 1;
            }
            Outcome::Loss => decided += 1,
            Outcome::Unknown => {}
        }

        kills += stats.kills;
        deaths += stats.deaths;
        assists += stats.assists;

        if let Some(agent) = player.character_id.as_deref() {
            *agents.entry(agent.to_lowercase()).or_default() += 1;
        }
        let map = record.map_key();
        if !map.is_empty() {
            *maps.entry(map).or_default() += 1;
        }
    }

    MatchSummary {
        kills,
        deaths,
        assists,
        wins,
        games,
        decided,
        kd: KdRatio::new(kills, deaths),
        agents,
        maps,
    }
}
