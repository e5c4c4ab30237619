//! Resolution of "whose stats, on which cluster" for a command invocation.

use std::{fmt, str::FromStr};

use crate::{
    dao::models::LinkEntity,
    error::{NotLinkedTarget, ServiceError},
    riot::{
        models::Account,
        routing::{Region, Routing, Shard},
    },
    state::AppState,
};

/// Separator between the display name and the tag of a Riot ID.
const RIOT_ID_SEPARATOR: char = '#';

/// Display name plus discriminator tag, e.g. `Nick#TAG`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiotId {
    /// Part before the `#`.
    pub game_name: String,
    /// Part after the `#`.
    pub tag_line: String,
}

impl RiotId {
    /// Split at the last `#`. Both halves are trimmed and must be non-empty.
    pub fn parse(input: &str) -> Result<Self, ServiceError> {
        let invalid = || ServiceError::InvalidRiotId(input.trim().to_string());
        let (name, tag) = input.rsplit_once(RIOT_ID_SEPARATOR).ok_or_else(invalid)?;
        let (name, tag) = (name.trim(), tag.trim());
        if name.is_empty() || tag.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            game_name: name.to_string(),
            tag_line: tag.to_string(),
        })
    }
}

impl FromStr for RiotId {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RiotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.game_name, RIOT_ID_SEPARATOR, self.tag_line)
    }
}

impl From<&LinkEntity> for RiotId {
    fn from(link: &LinkEntity) -> Self {
        Self {
            game_name: link.game_name.clone(),
            tag_line: link.tag_line.clone(),
        }
    }
}

/// Per-command routing overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutingOverrides {
    /// Account region for this command only.
    pub region: Option<Region>,
    /// Match shard for this command only.
    pub shard: Option<Shard>,
}

impl RoutingOverrides {
    /// Parse optional raw shard/region option values.
    pub fn parse(shard: Option<&str>, region: Option<&str>) -> Result<Self, ServiceError> {
        Ok(Self {
            shard: shard.map(str::parse).transpose()?,
            region: region.map(str::parse).transpose()?,
        })
    }
}

/// Pick each routing selector by precedence: override, then stored link, then default.
pub fn resolve_routing(
    overrides: RoutingOverrides,
    link: Option<&LinkEntity>,
    defaults: Routing,
) -> Routing {
    Routing {
        region: overrides
            .region
            .or_else(|| link.and_then(|link| link.region))
            .unwrap_or(defaults.region),
        shard: overrides
            .shard
            .or_else(|| link.and_then(|link| link.shard))
            .unwrap_or(defaults.shard),
    }
}

/// Who a command is about.
#[derive(Debug, Clone, Default)]
pub struct Lookup<'a> {
    /// User who ran the command.
    pub caller_id: &'a str,
    /// Another user the command targets, if any.
    pub target_user: Option<&'a str>,
    /// One-off Riot ID that bypasses stored links.
    pub riot_id: Option<&'a str>,
    /// Routing given with the command.
    pub overrides: RoutingOverrides,
}

impl Lookup<'_> {
    fn target(&self) -> (&str, NotLinkedTarget) {
        match self.target_user {
            Some(user) if user != self.caller_id => (user, NotLinkedTarget::Other),
            _ => (self.caller_id, NotLinkedTarget::Caller),
        }
    }
}

/// Riot ID and routing decided for a lookup, before any upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Account to look up.
    pub riot_id: RiotId,
    /// Where to look it up.
    pub routing: Routing,
}

/// Decide which account and routing a lookup refers to.
pub fn plan(
    lookup: &Lookup<'_>,
    link: Option<&LinkEntity>,
    defaults: Routing,
) -> Result<ResolvedTarget, ServiceError> {
    let riot_id = match lookup.riot_id.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => RiotId::parse(raw)?,
        None => {
            let link = link.ok_or(ServiceError::NotLinked(lookup.target().1))?;
            RiotId::from(link)
        }
    };

    Ok(ResolvedTarget {
        riot_id,
        routing: resolve_routing(lookup.overrides, link, defaults),
    })
}

/// Account and routing used by a stats command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccount {
    /// Account as returned upstream.
    pub account: Account,
    /// Routing the account was resolved with.
    pub routing: Routing,
}

/// Resolve the lookup against stored links and fetch the account from the account API.
pub async fn resolve(
    state: &AppState,
    lookup: &Lookup<'_>,
) -> Result<ResolvedAccount, ServiceError> {
    let (target_id, _) = lookup.target();
    let link = state.link(target_id);
    let target = plan(lookup, link.as_ref(), state.default_routing())?;

    let account = state
        .riot()
        .account_by_riot_id(
            target.routing.region,
            &target.riot_id.game_name,
            &target.riot_id.tag_line,
        )
        .await?;

    Ok(ResolvedAccount {
        account,
        routing: target.routing,
    })
}
