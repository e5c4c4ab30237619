//! Response shapes of the account and match endpoints, limited to the fields this crate reads.

use serde::{Deserialize, Serialize};

/// Account returned by the Riot ID lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Player id that is stable across name changes.
    pub puuid: String,
    /// Current display name.
    pub game_name: String,
    /// Current tag, without the `#`.
    pub tag_line: String,
}

/// Match history of one player, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchList {
    /// Player the history belongs to.
    pub puuid: String,
    /// Entries, most recent first.
    #[serde(default)]
    pub history: Vec<MatchListEntry>,
}

/// One entry of a match history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListEntry {
    /// Id accepted by the match endpoint.
    pub match_id: String,
    /// Start time in unix milliseconds.
    #[serde(default)]
    pub game_start_time_millis: i64,
    /// Game mode.
    #[serde(default)]
    pub queue_id: String,
}

impl MatchList {
    /// Match identifiers starting at `offset`, at most `count` of them.
    pub fn ids(&self, offset: usize, count: usize) -> Vec<String> {
        self.history
            .iter()
            .skip(offset)
            .take(count)
            .map(|entry| entry.match_id.clone())
            .collect()
    }
}

/// Full record of one played game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Game metadata.
    pub match_info: MatchInfo,
    /// Every participant.
    #[serde(default)]
    pub players: Vec<MatchPlayer>,
    /// Team results. Empty for some modes.
    #[serde(default)]
    pub teams: Vec<MatchTeam>,
}

/// Metadata of a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    /// Match id.
    pub match_id: String,
    /// Map asset path, e.g. `/Game/Maps/Ascent/Ascent`.
    #[serde(default)]
    pub map_id: String,
    /// Game mode, e.g. `competitive` or `unrated`. Empty for custom games.
    #[serde(default)]
    pub queue_id: String,
    /// Start time in unix milliseconds.
    #[serde(default)]
    pub game_start_millis: i64,
    /// Game length, absent while it is in progress.
    #[serde(default)]
    pub game_length_millis: Option<i64>,
}

/// Participant of a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPlayer {
    /// Player id.
    pub puuid: String,
    /// Display name at the time of the game.
    #[serde(default)]
    pub game_name: Option<String>,
    /// Tag at the time of the game.
    #[serde(default)]
    pub tag_line: Option<String>,
    /// Team, matching [`MatchTeam::team_id`].
    #[serde(default)]
    pub team_id: Option<String>,
    /// Agent played.
    #[serde(default)]
    pub character_id: Option<String>,
    /// Scoreboard line. Absent for players who never loaded in.
    #[serde(default)]
    pub stats: Option<PlayerStats>,
}

/// Scoreboard line of a participant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    /// Kills.
    pub kills: u32,
    /// Deaths.
    pub deaths: u32,
    /// Assists.
    pub assists: u32,
    /// Combat score.
    #[serde(default)]
    pub score: Option<u32>,
    /// Rounds the player took part in.
    #[serde(default)]
    pub rounds_played: Option<u32>,
}

/// Result of one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTeam {
    /// Team id, e.g. `Red` or `Blue`.
    pub team_id: String,
    /// Whether the team won the game.
    pub won: bool,
    /// Rounds won.
    #[serde(default)]
    pub rounds_won: Option<u32>,
    /// Rounds played.
    #[serde(default)]
    pub rounds_played: Option<u32>,
}

impl MatchRecord {
    /// Entry of the given player, if they took part in the game.
    pub fn player(&self, puuid: &str) -> Option<&MatchPlayer> {
        self.players.iter().find(|player| player.puuid == puuid)
    }

    /// Win flag of the player's team, when both the team and its result are present.
    pub fn player_won(&self, player: &MatchPlayer) -> Option<bool> {
        let team_id = player.team_id.as_deref()?;
        self.teams
            .iter()
            .find(|team| team.team_id == team_id)
            .map(|team| team.won)
    }

    /// Lower-cased last path segment of the map asset path, e.g. `ascent` for
    /// `/Game/Maps/Ascent/Ascent`.
    pub fn map_key(&self) -> String {
        map_url_key(&self.match_info.map_id)
    }
}

/// Normalise a map asset path to the key used by the map roster.
pub fn map_url_key(map_url: &str) -> String {
    map_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_key_uses_url_tail() {
        assert_eq!(map_url_key("/Game/Maps/Ascent/Ascent"), "ascent");
        assert_eq!(map_url_key("/Game/Maps/Duality/Duality/"), "duality");
        assert_eq!(map_url_key("Bonsai"), "bonsai");
        assert_eq!(map_url_key(""), "");
    }

    #[test]
    fn decodes_match_with_missing_optional_fields() {
        let record: MatchRecord = serde_json::from_str(
            r#"{
                "matchInfo": { "matchId": "m1", "mapId": "/Game/Maps/Port/Port", "queueId": "unrated" },
                "players": [ { "puuid": "p1", "teamId": "Red" } ],
                "teams": [ { "teamId": "Red", "won": true } ]
            }"#,
        )
        .unwrap();

        let player = record.player("p1").unwrap();
        assert!(player.stats.is_none());
        assert_eq!(record.player_won(player), Some(true));
        assert_eq!(record.map_key(), "port");
    }

    #[test]
    fn match_list_slices_by_offset_and_count() {
        let list = MatchList {
            puuid: "p".into(),
            history: ["a", "b", "c"]
                .into_iter()
                .map(|id| MatchListEntry {
                    match_id: id.into(),
                    game_start_time_millis: 0,
                    queue_id: String::new(),
                })
                .collect(),
        };
        assert_eq!(list.ids(1, 5), vec!["b".to_string(), "c".to_string()]);
        assert!(list.ids(3, 1).is_empty());
    }
}
