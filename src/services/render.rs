//! Formatting of summaries, records and links into chat replies.

use reqwest::Url;

use crate::{
    assets::{AgentRoster, MapRoster},
    dao::models::LinkEntity,
    dto::{
        embed::{Embed, LinkButton},
        format_system_time, format_unix_millis,
        interaction::InteractionResponse,
    },
    riot::{
        models::{Account, MatchPlayer, MatchRecord},
        routing::Routing,
    },
    stats::{Breakdown, EntityKind, KdRatio, MatchSummary, Outcome},
};

/// Entries listed in the top agents/maps fields of a profile.
const TOP_ENTRIES: usize = 3;
/// Rows shown in a breakdown before the remainder is summarised.
const BREAKDOWN_ROWS: usize = 10;

const TRACKER_BASE_URL: &str = "https://tracker.gg/valorant/profile/riot";

/// Public profile page for an account.
pub fn tracker_url(account: &Account) -> Option<String> {
    let mut url = Url::parse(TRACKER_BASE_URL).ok()?;
    url.path_segments_mut()
        .ok()?
        .push(&riot_id(account))
        .push("overview");
    Some(url.into())
}

fn tracker_button(account: &Account) -> Option<LinkButton> {
    tracker_url(account).map(|url| LinkButton {
        label: "View on tracker.gg".into(),
        url,
    })
}

fn riot_id(account: &Account) -> String {
    format!("{}#{}", account.game_name, account.tag_line)
}

fn percent(rate: Option<f64>) -> String {
    rate.map(|rate| format!("{rate:.0}%"))
        .unwrap_or_else(|| "n/a".into())
}

fn mode_label(mode: Option<&str>) -> String {
    mode.map(|mode| format!(" {}", mode.to_lowercase()))
        .unwrap_or_default()
}

fn ranked_list(entries: &[(String, u32)]) -> String {
    if entries.is_empty() {
        return "none".into();
    }
    entries
        .iter()
        .map(|(name, games)| format!("{name} ({games})"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary card of the last `sampled` matches.
pub fn profile(
    account: &Account,
    routing: Routing,
    summary: &MatchSummary,
    sampled: usize,
    mode: Option<&str>,
    agents: &AgentRoster,
    maps: &MapRoster,
) -> InteractionResponse {
    let title = format!("{} profile", riot_id(account));
    if summary.games == 0 {
        let embed = Embed::new(title).description(format!(
            "No{} games in the last {sampled} matches.",
            mode_label(mode)
        ));
        return InteractionResponse::embed(embed).with_buttons(tracker_button(account));
    }

    let top_agents: Vec<(String, u32)> = summary
        .top_agents(TOP_ENTRIES)
        .into_iter()
        .map(|(id, games)| (agents.display_name(id), games))
        .collect();
    let top_maps: Vec<(String, u32)> = summary
        .top_maps(TOP_ENTRIES)
        .into_iter()
        .map(|(key, games)| (maps.display_name(key), games))
        .collect();

    let thumbnail = summary
        .top_agents(1)
        .first()
        .and_then(|(id, _)| agents.by_id(id))
        .and_then(|agent| agent.display_icon.clone());

    let embed = Embed::new(title)
        .description(format!(
            "Last {}{} games",
            summary.games,
            mode_label(mode)
        ))
        .field(
            "K/D/A",
            format!("{}/{}/{}", summary.kills, summary.deaths, summary.assists),
            true,
        )
        .field("K/D", summary.kd.to_string(), true)
        .field(
            "Win rate",
            format!(
                "{} ({}W / {}L)",
                percent(summary.win_rate()),
                summary.wins,
                summary.decided - summary.wins
            ),
            true,
        )
        .field("Top agents", ranked_list(&top_agents), true)
        .field("Top maps", ranked_list(&top_maps), true)
        .thumbnail(thumbnail)
        .footer(format!("{} · {}", routing.shard, routing.region));

    InteractionResponse::embed(embed).with_buttons(tracker_button(account))
}

fn duration(millis: i64) -> String {
    let secs = millis.max(0) / 1000;
    format!("{}m {:02}s", secs / 60, secs % 60)
}

/// Detail card of a single match from the player's side.
pub fn last_match(
    account: &Account,
    record: &MatchRecord,
    player: &MatchPlayer,
    agents: &AgentRoster,
    maps: &MapRoster,
) -> InteractionResponse {
    let info = &record.match_info;
    let map_key = record.map_key();
    let map = maps.by_key(&map_key);
    let agent = player.character_id.as_deref();

    let result = match Outcome::of(record, player) {
        Outcome::Win => "Victory",
        Outcome::Loss => "Defeat",
        Outcome::Unknown => "Unknown",
    };

    let mut embed = Embed::new(format!("{} last match", riot_id(account)))
        .description(format!(
            "{} on {}",
            info.queue_id,
            maps.display_name(&map_key)
        ))
        .field(
            "Agent",
            agent
                .map(|id| agents.display_name(id))
                .unwrap_or_else(|| "unknown".into()),
            true,
        )
        .field("Result", result, true);

    if let Some(stats) = player.stats {
        embed = embed
            .field(
                "K/D/A",
                format!("{}/{}/{}", stats.kills, stats.deaths, stats.assists),
                true,
            )
            .field(
                "K/D",
                KdRatio::new(stats.kills, stats.deaths).to_string(),
                true,
            );
    }
    if let Some(length) = info.game_length_millis {
        embed = embed.field("Duration", duration(length), true);
    }

    let embed = embed
        .field("Started", format_unix_millis(info.game_start_millis), true)
        .thumbnail(
            agent
                .and_then(|id| agents.by_id(id))
                .and_then(|agent| agent.display_icon.clone()),
        )
        .image(map.and_then(|map| map.list_view_icon.clone().or_else(|| map.splash.clone())))
        .footer(format!("Match {}", info.match_id));

    InteractionResponse::embed(embed).with_buttons(tracker_button(account))
}

/// Per-agent or per-map table.
pub fn breakdown(
    account: &Account,
    breakdown: &Breakdown,
    sampled: usize,
    mode: Option<&str>,
    agents: &AgentRoster,
    maps: &MapRoster,
) -> InteractionResponse {
    let heading = match breakdown.kind {
        EntityKind::Agent => "agents",
        EntityKind::Map => "maps",
    };
    let mut embed = Embed::new(format!("{} {heading}", riot_id(account)));

    if breakdown.is_empty() {
        embed = embed.description(format!(
            "No{} games in the last {sampled} matches.",
            mode_label(mode)
        ));
        return InteractionResponse::embed(embed);
    }

    embed = embed.description(format!(
        "Across the last {sampled}{} matches",
        mode_label(mode)
    ));
    for (key, stats) in breakdown.entries.iter().take(BREAKDOWN_ROWS) {
        let name = match breakdown.kind {
            EntityKind::Agent => agents.display_name(key),
            EntityKind::Map => maps.display_name(key),
        };
        embed = embed.field(
            name,
            format!(
                "{} games · {} win rate · {} K/D",
                stats.games,
                percent(stats.win_rate()),
                stats.kd()
            ),
            false,
        );
    }
    let hidden = breakdown.entries.len().saturating_sub(BREAKDOWN_ROWS);
    if hidden > 0 {
        embed = embed.footer(format!("and {hidden} more"));
    }

    InteractionResponse::embed(embed).with_buttons(tracker_button(account))
}

/// Stored link for a user with the routing it resolves to.
pub fn link_card(link: &LinkEntity, effective: Routing) -> InteractionResponse {
    let marker = |stored: bool| if stored { "" } else { " (default)" };
    let embed = Embed::new(link.riot_id())
        .field(
            "Shard",
            format!("{}{}", effective.shard, marker(link.shard.is_some())),
            true,
        )
        .field(
            "Region",
            format!("{}{}", effective.region, marker(link.region.is_some())),
            true,
        )
        .field("Linked at", format_system_time(link.linked_at), false);
    InteractionResponse::embed(embed)
}

/// Command list.
pub fn help() -> InteractionResponse {
    InteractionResponse::ephemeral(
        [
            "**Commands**",
            "`/link Name#TAG [shard] [region]` link your Riot account",
            "`/unlink` forget your linked account",
            "`/setshard <shard>` match shard for your link (na, eu, ap, kr, latam, br, pbe)",
            "`/setregion <region>` account region for your link (americas, europe, asia, esports)",
            "`/whoami [user]` show a linked account",
            "`/profile [user|riot_id] [mode] [count]` summary of recent matches",
            "`/lastmatch [user|riot_id]` details of the most recent match",
            "`/agents [agent] [mode]` per-agent breakdown",
            "`/maps [map] [mode]` per-map breakdown",
        ]
        .join("\n"),
    )
}
