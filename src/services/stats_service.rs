//! Handlers reporting match statistics for a resolved account.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    assets::{AgentRoster, MapRoster},
    config::MatchCountConfig,
    dto::interaction::{CommandOptions, InteractionResponse},
    error::ServiceError,
    identity::{self, Lookup, ResolvedAccount, RoutingOverrides},
    riot::models::MatchRecord,
    services::render,
    state::SharedState,
    stats::{aggregate, breakdown_by_agent, breakdown_by_map},
};

fn lookup<'a>(
    caller_id: &'a str,
    options: &'a CommandOptions,
) -> Result<Lookup<'a>, ServiceError> {
    let overrides = RoutingOverrides::parse(options.shard.as_deref(), options.region.as_deref())?;
    Ok(Lookup {
        caller_id,
        target_user: options.user.as_deref(),
        riot_id: options.riot_id.as_deref(),
        overrides,
    })
}

/// Requested match count, defaulted and capped by configuration.
pub fn match_count(limits: MatchCountConfig, requested: Option<u8>) -> usize {
    usize::from(requested.unwrap_or(limits.default).clamp(1, limits.max.max(1)))
}

fn mode(options: &CommandOptions) -> Option<&str> {
    options
        .mode
        .as_deref()
        .map(str::trim)
        .filter(|mode| !mode.is_empty())
}

/// Resolve the target and fetch its most recent `count` match records.
async fn recent(
    state: &SharedState,
    caller_id: &str,
    options: &CommandOptions,
    count: usize,
) -> Result<(ResolvedAccount, Vec<Arc<MatchRecord>>), ServiceError> {
    let resolved = identity::resolve(state, &lookup(caller_id, options)?).await?;
    let matches = state
        .riot()
        .recent_matches(resolved.routing.shard, &resolved.account.puuid, 0, count)
        .await?;
    debug!(
        puuid = %resolved.account.puuid,
        shard = %resolved.routing.shard,
        fetched = matches.len(),
        "fetched recent matches"
    );

    if matches.is_empty() {
        return Err(ServiceError::NoMatches);
    }
    Ok((resolved, matches))
}

/// Rosters used only for display names; a failed fetch falls back to raw ids.
async fn display_rosters(state: &SharedState) -> (Arc<AgentRoster>, Arc<MapRoster>) {
    let (agents, maps) = tokio::join!(state.assets().agents(), state.assets().maps());
    let agents = agents.unwrap_or_else(|err| {
        warn!(error = %err, "agent roster unavailable; showing raw ids");
        Arc::default()
    });
    let maps = maps.unwrap_or_else(|err| {
        warn!(error = %err, "map roster unavailable; showing raw ids");
        Arc::default()
    });
    (agents, maps)
}

/// Summary of recent matches.
pub async fn profile(
    state: &SharedState,
    caller_id: &str,
    options: &CommandOptions,
) -> Result<InteractionResponse, ServiceError> {
    let count = match_count(state.config().match_count, options.count);
    let (resolved, matches) = recent(state, caller_id, options, count).await?;
    let mode = mode(options);

    let summary = aggregate(
        &resolved.account.puuid,
        matches.iter().map(Arc::as_ref),
        mode,
    );
    let (agents, maps) = display_rosters(state).await;

    Ok(render::profile(
        &resolved.account,
        resolved.routing,
        &summary,
        matches.len(),
        mode,
        &agents,
        &maps,
    ))
}

/// Details of the most recent match.
pub async fn last_match(
    state: &SharedState,
    caller_id: &str,
    options: &CommandOptions,
) -> Result<InteractionResponse, ServiceError> {
    let (resolved, matches) = recent(state, caller_id, options, 1).await?;
    let record = matches.first().ok_or(ServiceError::NoMatches)?;
    let player = record
        .player(&resolved.account.puuid)
        .ok_or(ServiceError::NoMatches)?;
    let (agents, maps) = display_rosters(state).await;

    Ok(render::last_match(
        &resolved.account,
        record,
        player,
        &agents,
        &maps,
    ))
}

/// Per-agent breakdown. The roster is required here to resolve the optional name filter.
pub async fn agents(
    state: &SharedState,
    caller_id: &str,
    options: &CommandOptions,
) -> Result<InteractionResponse, ServiceError> {
    let count = match_count(state.config().match_count, options.count);
    let (resolved, matches) = recent(state, caller_id, options, count).await?;
    let agents = state.assets().agents().await?;
    let mode = mode(options);

    let breakdown = breakdown_by_agent(
        &resolved.account.puuid,
        matches.iter().map(Arc::as_ref),
        mode,
        &agents,
        options.agent.as_deref(),
    )?;

    Ok(render::breakdown(
        &resolved.account,
        &breakdown,
        matches.len(),
        mode,
        &agents,
        &MapRoster::default(),
    ))
}

/// Per-map breakdown. The roster is required here to resolve the optional name filter.
pub async fn maps(
    state: &SharedState,
    caller_id: &str,
    options: &CommandOptions,
) -> Result<InteractionResponse, ServiceError> {
    let count = match_count(state.config().match_count, options.count);
    let (resolved, matches) = recent(state, caller_id, options, count).await?;
    let maps = state.assets().maps().await?;
    let mode = mode(options);

    let breakdown = breakdown_by_map(
        &resolved.account.puuid,
        matches.iter().map(Arc::as_ref),
        mode,
        &maps,
        options.map.as_deref(),
    )?;

    Ok(render::breakdown(
        &resolved.account,
        &breakdown,
        matches.len(),
        mode,
        &AgentRoster::default(),
        &maps,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: MatchCountConfig = MatchCountConfig { default: 5, max: 20 };

    #[test]
    fn match_count_defaults_and_caps() {
        assert_eq!(match_count(LIMITS, None), 5);
        assert_eq!(match_count(LIMITS, Some(12)), 12);
        assert_eq!(match_count(LIMITS, Some(200)), 20);
        assert_eq!(match_count(LIMITS, Some(0)), 1);
    }

    #[test]
    fn blank_mode_is_no_filter() {
        let options = CommandOptions {
            mode: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(mode(&options), None);
    }
}
