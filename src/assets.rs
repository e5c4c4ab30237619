//! Static game assets (agent and map rosters) fetched from the public asset service.
//!
//! Rosters are rebuilt wholesale on every refresh and cached process-wide. The asset
//! service is separate from the account/match API, so requests here bypass the rate gate.

use std::{collections::HashMap, sync::Arc, time::Duration};

use indexmap::IndexMap;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    cache::TtlCache,
    riot::{
        error::{ApiError, ApiResult, body_excerpt},
        models::map_url_key,
    },
};

/// Playable character as described by the asset service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Agent id, matching `characterId` in match records.
    pub uuid: String,
    /// Name shown to players.
    pub display_name: String,
    /// Portrait URL.
    #[serde(default)]
    pub display_icon: Option<String>,
    /// Duelist, Sentinel and so on. Absent for some non-playable entries.
    #[serde(default)]
    pub role: Option<AgentRole>,
}

/// Agent class.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRole {
    /// Class name, e.g. `Duelist`.
    pub display_name: String,
}

/// Map as described by the asset service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapAsset {
    /// Asset id.
    pub uuid: String,
    /// Name shown to players.
    pub display_name: String,
    /// Asset path matched against `mapId` in match records.
    #[serde(default)]
    pub map_url: String,
    /// Loading-screen image URL.
    #[serde(default)]
    pub splash: Option<String>,
    /// Wide banner image URL.
    #[serde(default)]
    pub list_view_icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssetEnvelope<T> {
    data: Vec<T>,
}

/// Agents keyed by lower-cased display name, with a secondary index on the agent id.
#[derive(Debug, Default)]
pub struct AgentRoster {
    by_name: IndexMap<String, Agent>,
    name_by_id: HashMap<String, String>,
}

impl AgentRoster {
    /// Index agents by name and id. Later duplicates replace earlier ones.
    pub fn new(agents: Vec<Agent>) -> Self {
        let mut roster = Self::default();
        for agent in agents {
            let key = agent.display_name.to_lowercase();
            roster
                .name_by_id
                .insert(agent.uuid.to_lowercase(), key.clone());
            roster.by_name.insert(key, agent);
        }
        roster
    }

    /// Case-insensitive lookup by display name.
    pub fn by_name(&self, name: &str) -> Option<&Agent> {
        self.by_name.get(&name.trim().to_lowercase())
    }

    /// Lookup by the character id carried in match records.
    pub fn by_id(&self, id: &str) -> Option<&Agent> {
        self.name_by_id
            .get(&id.to_lowercase())
            .and_then(|key| self.by_name.get(key))
    }

    /// Display name for a character id, falling back to the raw id.
    pub fn display_name(&self, id: &str) -> String {
        self.by_id(id)
            .map(|agent| agent.display_name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True when the roster could not be populated.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Maps keyed by the lower-cased last segment of their asset path.
#[derive(Debug, Default)]
pub struct MapRoster {
    by_key: IndexMap<String, MapAsset>,
}

impl MapRoster {
    /// Index maps by their asset path key. Maps without a path are skipped.
    pub fn new(maps: Vec<MapAsset>) -> Self {
        let by_key = maps
            .into_iter()
            .filter(|map| !map.map_url.is_empty())
            .map(|map| (map_url_key(&map.map_url), map))
            .collect();
        Self { by_key }
    }

    /// Lookup by normalised map key (see [`map_url_key`]).
    pub fn by_key(&self, key: &str) -> Option<&MapAsset> {
        self.by_key.get(&key.to_lowercase())
    }

    /// Case-insensitive lookup by display name.
    pub fn by_name(&self, name: &str) -> Option<&MapAsset> {
        let needle = name.trim().to_lowercase();
        self.by_key
            .values()
            .find(|map| map.display_name.to_lowercase() == needle)
    }

    /// Display name for a map key, falling back to the key itself.
    pub fn display_name(&self, key: &str) -> String {
        self.by_key(key)
            .map(|map| map.display_name.clone())
            .unwrap_or_else(|| key.to_string())
    }

    /// Number of maps.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// True when the roster could not be populated.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Client for the static asset service.
pub struct AssetClient {
    http: Client,
    base_url: String,
    ttl: Duration,
    agents: TtlCache<(), Arc<AgentRoster>>,
    maps: TtlCache<(), Arc<MapRoster>>,
}

impl AssetClient {
    /// Client for `base_url` whose rosters are cached for `ttl`.
    pub fn new(http: Client, base_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ttl,
            agents: TtlCache::new(),
            maps: TtlCache::new(),
        }
    }

    /// Every playable agent.
    pub async fn agents(&self) -> ApiResult<Arc<AgentRoster>> {
        if let Some(roster) = self.agents.get(&()) {
            return Ok(roster);
        }

        let url = format!("{}/agents?isPlayableCharacter=true", self.base_url);
        let agents: Vec<Agent> = self.fetch(&url).await?;
        let roster = Arc::new(AgentRoster::new(agents));
        debug!(count = roster.len(), "refreshed agent roster");
        self.agents.set((), roster.clone(), self.ttl);
        Ok(roster)
    }

    /// Every map known to the asset service.
    pub async fn maps(&self) -> ApiResult<Arc<MapRoster>> {
        if let Some(roster) = self.maps.get(&()) {
            return Ok(roster);
        }

        let url = format!("{}/maps", self.base_url);
        let maps: Vec<MapAsset> = self.fetch(&url).await?;
        let roster = Arc::new(MapRoster::new(maps));
        debug!(count = roster.len(), "refreshed map roster");
        self.maps.set((), roster.clone(), self.ttl);
        Ok(roster)
    }

    async fn fetch<T>(&self, url: &str) -> ApiResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map(|body| body_excerpt(&body))
                .unwrap_or_default();
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        response
            .json::<AssetEnvelope<T>>()
            .await
            .map(|envelope| envelope.data)
            .map_err(|source| ApiError::Decode {
                url: url.to_string(),
                source,
            })
    }
}
