//! Handlers managing the caller's linked Riot account.

use tracing::info;

use crate::{
    dao::models::LinkEntity,
    dto::interaction::{CommandOptions, InteractionResponse},
    error::{NotLinkedTarget, ServiceError},
    identity::{RiotId, RoutingOverrides, resolve_routing},
    riot::routing::{Region, Shard},
    services::render,
    state::SharedState,
};

fn required<'a>(value: Option<&'a str>, usage: &str) -> Result<&'a str, ServiceError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ServiceError::InvalidInput(format!("Usage: `{usage}`")))
}

/// Verify the account upstream and store it as the caller's link, replacing any previous one.
pub async fn link(
    state: &SharedState,
    caller_id: &str,
    options: &CommandOptions,
) -> Result<InteractionResponse, ServiceError> {
    let riot_id = RiotId::parse(required(
        options.riot_id.as_deref(),
        "/link Name#TAG [shard] [region]",
    )?)?;
    let overrides = RoutingOverrides::parse(options.shard.as_deref(), options.region.as_deref())?;
    let routing = resolve_routing(overrides, None, state.default_routing());

    let account = state
        .riot()
        .account_by_riot_id(routing.region, &riot_id.game_name, &riot_id.tag_line)
        .await?;

    let mut link = LinkEntity::new(account.game_name, account.tag_line);
    link.shard = overrides.shard;
    link.region = overrides.region;
    let linked_as = link.riot_id();
    state.put_link(caller_id, link);

    info!(
        caller_id,
        riot_id = %linked_as,
        shard = %routing.shard,
        region = %routing.region,
        "linked account"
    );
    Ok(InteractionResponse::ephemeral(format!(
        "Linked to **{linked_as}** (shard {}, region {}).",
        routing.shard, routing.region
    )))
}

/// Forget the caller's link. Unlinking without a link is not an error.
pub async fn unlink(
    state: &SharedState,
    caller_id: &str,
) -> Result<InteractionResponse, ServiceError> {
    match state.remove_link(caller_id) {
        Some((removed, _)) => {
            info!(caller_id, riot_id = %removed.riot_id(), "unlinked account");
            Ok(InteractionResponse::ephemeral(format!(
                "Unlinked **{}**.",
                removed.riot_id()
            )))
        }
        None => Ok(InteractionResponse::ephemeral(
            "You had no linked account. Nothing to remove.",
        )),
    }
}

/// Store a shard override on the caller's link.
pub async fn set_shard(
    state: &SharedState,
    caller_id: &str,
    options: &CommandOptions,
) -> Result<InteractionResponse, ServiceError> {
    let shard: Shard = required(options.shard.as_deref(), "/setshard <shard>")?.parse()?;

    let (link, _) = state
        .update_link(caller_id, |link| link.shard = Some(shard))
        .ok_or(ServiceError::NotLinked(NotLinkedTarget::Caller))?;

    info!(caller_id, %shard, "updated link shard");
    Ok(InteractionResponse::ephemeral(format!(
        "Shard for **{}** set to `{shard}`.",
        link.riot_id()
    )))
}

/// Store a region override on the caller's link.
pub async fn set_region(
    state: &SharedState,
    caller_id: &str,
    options: &CommandOptions,
) -> Result<InteractionResponse, ServiceError> {
    let region: Region = required(options.region.as_deref(), "/setregion <region>")?.parse()?;

    let (link, _) = state
        .update_link(caller_id, |link| link.region = Some(region))
        .ok_or(ServiceError::NotLinked(NotLinkedTarget::Caller))?;

    info!(caller_id, %region, "updated link region");
    Ok(InteractionResponse::ephemeral(format!(
        "Region for **{}** set to `{region}`.",
        link.riot_id()
    )))
}

/// Show the stored link of the caller or of another user.
pub async fn whoami(
    state: &SharedState,
    caller_id: &str,
    options: &CommandOptions,
) -> Result<InteractionResponse, ServiceError> {
    let (user_id, target) = match options.user.as_deref() {
        Some(user) if user != caller_id => (user, NotLinkedTarget::Other),
        _ => (caller_id, NotLinkedTarget::Caller),
    };
    let link = state.link(user_id).ok_or(ServiceError::NotLinked(target))?;
    let routing = resolve_routing(
        RoutingOverrides::default(),
        Some(&link),
        state.default_routing(),
    );

    Ok(render::link_card(&link, routing))
}
