use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::riot::routing::{Region, Shard};

/// Riot account linked to a chat user, keyed by the caller id in the link registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkEntity {
    /// Display name half of the Riot ID.
    pub game_name: String,
    /// Discriminator half of the Riot ID.
    pub tag_line: String,
    /// Match shard chosen by the user, overriding the process default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<Shard>,
    /// Account region chosen by the user, overriding the process default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    /// Last time the account was (re)linked.
    pub linked_at: SystemTime,
}

impl LinkEntity {
    /// Fresh link with default routing, stamped now.
    pub fn new(game_name: impl Into<String>, tag_line: impl Into<String>) -> Self {
        Self {
            game_name: game_name.into(),
            tag_line: tag_line.into(),
            shard: None,
            region: None,
            linked_at: SystemTime::now(),
        }
    }

    /// `Name#TAG` form of the linked account.
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }
}
