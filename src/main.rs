//! Spike Stats binary entrypoint wiring configuration, link persistence and the
//! interaction endpoint.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spike_stats::{
    config::AppConfig,
    dao::link_store::{FileLinkStore, LinkMap, LinkStore},
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let link_store = select_link_store(&config).await?;
    let links = load_links(link_store.as_ref()).await;

    let app_state =
        AppState::new(config, link_store, links).context("building application state")?;
    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    match app_state.flush_links().await {
        Ok(count) => info!(count, "saved linked accounts before exit"),
        Err(err) => warn!(error = %err, "failed to save linked accounts before exit"),
    }

    Ok(())
}

/// Pick the link store backend. CouchDB is used when `LINK_STORE=couch`, the JSON file
/// otherwise.
async fn select_link_store(config: &AppConfig) -> anyhow::Result<Arc<dyn LinkStore>> {
    let backend = env::var("LINK_STORE").unwrap_or_default();

    #[cfg(feature = "couch-store")]
    {
        use spike_stats::dao::link_store::couchdb::{CouchConfig, CouchLinkStore};

        if backend.eq_ignore_ascii_case("couch") {
            let couch_config =
                CouchConfig::from_env().context("reading CouchDB configuration")?;
            info!(
                base_url = %couch_config.base_url,
                database = %couch_config.database,
                "using CouchDB link store"
            );
            let store = CouchLinkStore::connect(couch_config)
                .await
                .context("connecting to CouchDB")?;
            return Ok(Arc::new(store));
        }
    }

    if !backend.is_empty() && !backend.eq_ignore_ascii_case("file") {
        warn!(backend, "unknown LINK_STORE; using the JSON file store");
    }
    info!(path = %config.links_path.display(), "using JSON file link store");
    Ok(Arc::new(FileLinkStore::new(config.links_path.clone())))
}

/// Load persisted links. A failed load starts with an empty registry.
async fn load_links(store: &dyn LinkStore) -> LinkMap {
    match store.load_links().await {
        Ok(links) => {
            info!(count = links.len(), "loaded linked accounts");
            links
        }
        Err(err) => {
            warn!(error = %err, "failed to load linked accounts; starting empty");
            LinkMap::new()
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
