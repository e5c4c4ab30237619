//! Routing selectors used to pick the upstream endpoint cluster for a request.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Match-data cluster a player's games are stored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Shard {
    Na,
    Eu,
    Ap,
    Kr,
    Latam,
    Br,
    Pbe,
}

impl Shard {
    /// Every shard accepted by the match API.
    pub const ALL: [Shard; 7] = [
        Shard::Na,
        Shard::Eu,
        Shard::Ap,
        Shard::Kr,
        Shard::Latam,
        Shard::Br,
        Shard::Pbe,
    ];

    /// Host prefix used when building match API URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            Shard::Na => "na",
            Shard::Eu => "eu",
            Shard::Ap => "ap",
            Shard::Kr => "kr",
            Shard::Latam => "latam",
            Shard::Br => "br",
            Shard::Pbe => "pbe",
        }
    }
}

/// Account-identity cluster used for Riot ID lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Americas,
    Europe,
    Asia,
    Esports,
}

impl Region {
    /// Every region accepted by the account API.
    pub const ALL: [Region; 4] = [
        Region::Americas,
        Region::Europe,
        Region::Asia,
        Region::Esports,
    ];

    /// Host prefix used when building account API URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Americas => "americas",
            Region::Europe => "europe",
            Region::Asia => "asia",
            Region::Esports => "esports",
        }
    }
}

/// Raised when a shard or region name is not part of the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct UnknownRouting {
    /// `shard` or `region`.
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
    /// Comma-separated accepted names.
    pub expected: String,
}

fn parse_from<T: Copy>(
    kind: &'static str,
    input: &str,
    all: &[T],
    name: impl Fn(T) -> &'static str,
) -> Result<T, UnknownRouting> {
    let needle = input.trim().to_lowercase();
    all.iter()
        .copied()
        .find(|candidate| name(*candidate) == needle)
        .ok_or_else(|| UnknownRouting {
            kind,
            value: input.trim().to_string(),
            expected: all.iter().map(|c| name(*c)).collect::<Vec<_>>().join(", "),
        })
}

impl FromStr for Shard {
    type Err = UnknownRouting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_from("shard", s, &Shard::ALL, Shard::as_str)
    }
}

impl FromStr for Region {
    type Err = UnknownRouting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_from("region", s, &Region::ALL, Region::as_str)
    }
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved (region, shard) pair for one command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Routing {
    /// Routes account lookups.
    pub region: Region,
    /// Routes match lookups.
    pub shard: Shard,
}
