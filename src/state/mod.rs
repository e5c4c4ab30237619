//! Shared application state handed to every handler.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use reqwest::Client;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    assets::AssetClient,
    config::AppConfig,
    dao::{
        link_store::{LinkMap, LinkStore},
        models::LinkEntity,
        storage::StorageResult,
    },
    riot::{ApiError, RateGate, RiotClient, Routing},
};

/// Handle to [`AppState`] shared by every route and background task.
pub type SharedState = Arc<AppState>;

/// Upper bound for any single upstream HTTP request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Application context owning the upstream clients, their shared rate gate and caches,
/// and the registry of linked accounts.
pub struct AppState {
    config: AppConfig,
    http: Client,
    gate: Arc<RateGate>,
    riot: RiotClient,
    assets: AssetClient,
    links: Arc<DashMap<String, LinkEntity>>,
    link_store: Arc<dyn LinkStore>,
    persist_gate: Arc<Mutex<()>>,
}

impl AppState {
    /// Build the state with the given link store and already-loaded links.
    pub fn new(
        config: AppConfig,
        link_store: Arc<dyn LinkStore>,
        links: LinkMap,
    ) -> Result<SharedState, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("spike-stats/", env!("CARGO_PKG_VERSION")))
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|source| ApiError::ClientBuilder { source })?;

        let gate = Arc::new(RateGate::from_config(config.rate_limit));
        let riot = RiotClient::new(http.clone(), &config, gate.clone());
        let assets = AssetClient::new(
            http.clone(),
            config.api.assets_base_url.clone(),
            config.cache.asset_ttl,
        );

        Ok(Arc::new(Self {
            config,
            http,
            gate,
            riot,
            assets,
            links: Arc::new(links.into_iter().collect()),
            link_store,
            persist_gate: Arc::new(Mutex::new(())),
        }))
    }

    /// Configuration the state was built from.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// HTTP client shared with the upstream clients, used for deferred replies.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Account and match client.
    pub fn riot(&self) -> &RiotClient {
        &self.riot
    }

    /// Agent and map roster client.
    pub fn assets(&self) -> &AssetClient {
        &self.assets
    }

    /// Gate shared by every upstream call.
    pub fn rate_gate(&self) -> &RateGate {
        &self.gate
    }

    /// Process-wide routing used when neither the command nor the link names one.
    pub fn default_routing(&self) -> Routing {
        Routing {
            region: self.config.default_region,
            shard: self.config.default_shard,
        }
    }

    /// Stored link for a chat user.
    pub fn link(&self, user_id: &str) -> Option<LinkEntity> {
        self.links.get(user_id).map(|entry| entry.value().clone())
    }

    /// Number of linked users.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Create or overwrite the link for `user_id` and persist the registry.
    pub fn put_link(&self, user_id: &str, link: LinkEntity) -> JoinHandle<()> {
        self.links.insert(user_id.to_string(), link);
        self.persist_links()
    }

    /// Apply `update` to an existing link. Returns the updated link, or `None` when the
    /// user has no link.
    pub fn update_link<F>(
        &self,
        user_id: &str,
        update: F,
    ) -> Option<(LinkEntity, JoinHandle<()>)>
    where
        F: FnOnce(&mut LinkEntity),
    {
        let updated = {
            let mut entry = self.links.get_mut(user_id)?;
            update(entry.value_mut());
            entry.value().clone()
        };
        Some((updated, self.persist_links()))
    }

    /// Remove the link for `user_id`. Returns the removed link, if any.
    pub fn remove_link(&self, user_id: &str) -> Option<(LinkEntity, JoinHandle<()>)> {
        let (_, removed) = self.links.remove(user_id)?;
        Some((removed, self.persist_links()))
    }

    /// Save the registry in the background. Failures are logged and otherwise ignored;
    /// the in-memory registry stays authoritative.
    ///
    /// Saves run one at a time and snapshot the registry only once they hold the gate,
    /// so the last save always carries the latest state.
    fn persist_links(&self) -> JoinHandle<()> {
        let gate = self.persist_gate.clone();
        let store = self.link_store.clone();
        let links = self.links.clone();

        tokio::spawn(async move {
            let _guard = gate.lock().await;
            match save_snapshot(store.as_ref(), &links).await {
                Ok(count) => debug!(count, "persisted linked accounts"),
                Err(err) => warn!(error = %err, "failed to persist linked accounts"),
            }
        })
    }

    /// Wait for the save in progress, if any, then write the registry once more.
    ///
    /// Called on shutdown: background saves that have not started yet are dropped with the
    /// runtime, and this final write already covers their state.
    pub async fn flush_links(&self) -> StorageResult<usize> {
        let _guard = self.persist_gate.lock().await;
        save_snapshot(self.link_store.as_ref(), &self.links).await
    }
}

async fn save_snapshot(
    store: &dyn LinkStore,
    links: &DashMap<String, LinkEntity>,
) -> StorageResult<usize> {
    let snapshot = snapshot(links);
    let count = snapshot.len();
    store.save_links(snapshot).await?;
    Ok(count)
}

fn snapshot(links: &DashMap<String, LinkEntity>) -> LinkMap {
    links
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect()
}
