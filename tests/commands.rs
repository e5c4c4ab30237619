//! Command handlers driven end-to-end against a mocked upstream and an in-memory link store.

use std::{sync::Arc, time::Duration};

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;

use spike_stats::{
    config::AppConfig,
    dao::{
        link_store::{LinkMap, MemoryLinkStore},
        models::LinkEntity,
    },
    dto::{
        embed::Embed,
        interaction::{Command, CommandOptions, InteractionRequest, InteractionResponse},
    },
    riot::routing::Shard,
    services::command_service,
    state::{AppState, SharedState},
};

const PUUID: &str = "puuid-nick";
const JETT: &str = "ADD6443A-41BD-E414-F6AD-E58D267F4E95";
const BREACH: &str = "5f8d3a7f-467b-97f3-062c-13acf203c006";

const AGENTS: &str = r#"{"status":200,"data":[
    {"uuid":"ADD6443A-41BD-E414-F6AD-E58D267F4E95","displayName":"Jett"},
    {"uuid":"5f8d3a7f-467b-97f3-062c-13acf203c006","displayName":"Breach"}
]}"#;

const MAPS: &str = r#"{"status":200,"data":[
    {"uuid":"7eaecc1b","displayName":"Ascent","mapUrl":"/Game/Maps/Ascent/Ascent"},
    {"uuid":"2c9d57ec","displayName":"Bind","mapUrl":"/Game/Maps/Duality/Duality"}
]}"#;

struct Harness {
    server: ServerGuard,
    state: SharedState,
    store: MemoryLinkStore,
}

async fn harness(links: LinkMap) -> Harness {
    let server = Server::new_async().await;

    let mut config = AppConfig::default();
    config.api_key = "test-key".into();
    config.api.account_base_url = server.url();
    config.api.match_base_url = server.url();
    config.api.assets_base_url = server.url();
    config.retry.default_retry_after = Duration::ZERO;

    let store = MemoryLinkStore::with_links(links.clone());
    let state = AppState::new(config, Arc::new(store.clone()), links).unwrap();

    Harness {
        server,
        state,
        store,
    }
}

fn linked(user: &str) -> LinkMap {
    LinkMap::from([(user.to_string(), LinkEntity::new("Nick", "TAG"))])
}

fn request(caller: &str, command: Command, options: CommandOptions) -> InteractionRequest {
    InteractionRequest {
        caller_id: caller.into(),
        command,
        options,
        callback_url: None,
    }
}

async fn run(state: &SharedState, request: InteractionRequest) -> InteractionResponse {
    command_service::dispatch(state, &request).await
}

fn content(reply: &InteractionResponse) -> &str {
    match reply {
        InteractionResponse::Message { content, .. } => content,
        other => panic!("expected message, got {other:?}"),
    }
}

fn embed(reply: &InteractionResponse) -> &Embed {
    match reply {
        InteractionResponse::Embed { embeds, .. } => &embeds[0],
        other => panic!("expected embed, got {other:?}"),
    }
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

fn match_body(
    id: &str,
    mode: &str,
    map: &str,
    agent: &str,
    (kills, deaths, assists): (u32, u32, u32),
    won: bool,
) -> String {
    json!({
        "matchInfo": {
            "matchId": id,
            "mapId": map,
            "queueId": mode,
            "gameStartMillis": 1_700_000_000_000_i64,
            "gameLengthMillis": 1_845_000
        },
        "players": [
            {
                "puuid": PUUID,
                "teamId": "Blue",
                "characterId": agent,
                "stats": { "kills": kills, "deaths": deaths, "assists": assists }
            }
        ],
        "teams": [
            { "teamId": "Blue", "won": won },
            { "teamId": "Red", "won": !won }
        ]
    })
    .to_string()
}

async fn mock_account(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/riot/account/v1/accounts/by-riot-id/Nick/TAG")
        .match_header("x-riot-token", "test-key")
        .with_status(200)
        .with_body(json!({"puuid": PUUID, "gameName": "Nick", "tagLine": "TAG"}).to_string())
        .create_async()
        .await
}

async fn mock_history(server: &mut ServerGuard, ids: &[&str]) -> Mock {
    let history: Vec<_> = ids.iter().map(|id| json!({"matchId": id})).collect();
    server
        .mock("GET", format!("/val/match/v1/matchlists/by-puuid/{PUUID}").as_str())
        .with_status(200)
        .with_body(json!({"puuid": PUUID, "history": history}).to_string())
        .create_async()
        .await
}

async fn mock_match(server: &mut ServerGuard, id: &str, body: String) -> Mock {
    server
        .mock("GET", format!("/val/match/v1/matches/{id}").as_str())
        .with_status(200)
        .with_body(body)
        .expect(1)
        .create_async()
        .await
}

async fn mock_assets(server: &mut ServerGuard) {
    server
        .mock("GET", "/agents")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(AGENTS)
        .create_async()
        .await;
    server
        .mock("GET", "/maps")
        .with_status(200)
        .with_body(MAPS)
        .create_async()
        .await;
}

/// Two games: a won competitive Jett game on Ascent and a lost unrated Breach game on Bind.
async fn mock_two_games(server: &mut ServerGuard) {
    mock_account(server).await;
    mock_history(server, &["m1", "m2"]).await;
    mock_match(
        server,
        "m1",
        match_body("m1", "competitive", "/Game/Maps/Ascent/Ascent", JETT, (20, 10, 5), true),
    )
    .await;
    mock_match(
        server,
        "m2",
        match_body("m2", "unrated", "/Game/Maps/Duality/Duality", BREACH, (5, 15, 10), false),
    )
    .await;
    mock_assets(server).await;
}

#[tokio::test]
async fn help_lists_commands() {
    let h = harness(LinkMap::new()).await;

    let reply = run(&h.state, request("u1", Command::Help, CommandOptions::default())).await;

    assert!(content(&reply).contains("/profile"));
}

#[tokio::test]
async fn unlinked_caller_is_told_to_link_without_upstream_calls() {
    let mut h = harness(LinkMap::new()).await;
    let upstream = h
        .server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let reply = run(&h.state, request("u1", Command::Profile, CommandOptions::default())).await;

    assert!(matches!(
        reply,
        InteractionResponse::Message { ephemeral: true, .. }
    ));
    assert!(content(&reply).contains("/link"));
    upstream.assert_async().await;
}

#[tokio::test]
async fn unlinked_other_user_gets_a_different_message() {
    let h = harness(linked("u1")).await;
    let options = CommandOptions {
        user: Some("u2".into()),
        ..Default::default()
    };

    let profile = run(&h.state, request("u1", Command::Profile, options.clone())).await;
    let whoami = run(&h.state, request("u1", Command::Whoami, options)).await;

    assert_eq!(content(&profile), "That user has not linked a Riot account.");
    assert_eq!(content(&whoami), content(&profile));
}

#[tokio::test]
async fn link_then_last_match_with_empty_history() {
    let mut h = harness(LinkMap::new()).await;
    mock_account(&mut h.server).await;
    mock_history(&mut h.server, &[]).await;

    let options = CommandOptions {
        riot_id: Some("Nick#TAG".into()),
        ..Default::default()
    };
    let reply = run(&h.state, request("u1", Command::Link, options)).await;
    assert!(content(&reply).starts_with("Linked to **Nick#TAG**"));

    let store = h.store.clone();
    eventually(|| store.snapshot().contains_key("u1")).await;

    let reply = run(
        &h.state,
        request("u1", Command::LastMatch, CommandOptions::default()),
    )
    .await;
    assert_eq!(content(&reply), "No matches found for this account.");
}

#[tokio::test]
async fn link_rejects_unknown_account() {
    let mut h = harness(LinkMap::new()).await;
    h.server
        .mock("GET", "/riot/account/v1/accounts/by-riot-id/Ghost/NONE")
        .with_status(404)
        .with_body(r#"{"status":{"message":"Data not found"}}"#)
        .expect(1)
        .create_async()
        .await;

    let options = CommandOptions {
        riot_id: Some("Ghost#NONE".into()),
        ..Default::default()
    };
    let reply = run(&h.state, request("u1", Command::Link, options)).await;

    assert!(content(&reply).starts_with("Riot could not find"));
    assert!(h.state.link("u1").is_none());
}

#[tokio::test]
async fn link_rejects_malformed_riot_id() {
    let h = harness(LinkMap::new()).await;
    let options = CommandOptions {
        riot_id: Some("NoTag".into()),
        ..Default::default()
    };

    let reply = run(&h.state, request("u1", Command::Link, options)).await;

    assert!(content(&reply).contains("is not a valid Riot ID"));
}

#[tokio::test]
async fn failed_persistence_keeps_the_link_in_memory() {
    let mut h = harness(LinkMap::new()).await;
    mock_account(&mut h.server).await;
    h.store.fail_saves(true);

    let options = CommandOptions {
        riot_id: Some("Nick#TAG".into()),
        ..Default::default()
    };
    let reply = run(&h.state, request("u1", Command::Link, options)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(content(&reply).starts_with("Linked to"));
    assert_eq!(h.state.link("u1").unwrap().riot_id(), "Nick#TAG");
    assert!(h.store.snapshot().is_empty());
}

#[tokio::test]
async fn shard_and_region_updates_require_a_link() {
    let h = harness(LinkMap::new()).await;
    let options = CommandOptions {
        shard: Some("eu".into()),
        ..Default::default()
    };

    let reply = run(&h.state, request("u1", Command::SetShard, options)).await;

    assert!(content(&reply).starts_with("You have not linked"));
}

#[tokio::test]
async fn set_shard_updates_the_link_and_rejects_unknown_values() {
    let h = harness(linked("u1")).await;

    let reply = run(
        &h.state,
        request(
            "u1",
            Command::SetShard,
            CommandOptions {
                shard: Some("EU".into()),
                ..Default::default()
            },
        ),
    )
    .await;
    assert_eq!(content(&reply), "Shard for **Nick#TAG** set to `eu`.");
    assert_eq!(h.state.link("u1").unwrap().shard, Some(Shard::Eu));

    let reply = run(
        &h.state,
        request(
            "u1",
            Command::SetShard,
            CommandOptions {
                shard: Some("mars".into()),
                ..Default::default()
            },
        ),
    )
    .await;
    assert!(content(&reply).contains("mars"));
    assert_eq!(h.state.link("u1").unwrap().shard, Some(Shard::Eu));

    let whoami = run(&h.state, request("u1", Command::Whoami, CommandOptions::default())).await;
    assert_eq!(embed(&whoami).field_value("Shard"), Some("eu"));
}

#[tokio::test]
async fn unlink_reports_whether_something_was_removed() {
    let h = harness(linked("u1")).await;

    let first = run(&h.state, request("u1", Command::Unlink, CommandOptions::default())).await;
    let second = run(&h.state, request("u1", Command::Unlink, CommandOptions::default())).await;

    assert_eq!(content(&first), "Unlinked **Nick#TAG**.");
    assert!(content(&second).starts_with("You had no linked account"));

    let store = h.store.clone();
    eventually(|| store.snapshot().is_empty()).await;
}

#[tokio::test]
async fn profile_filters_by_mode() {
    let mut h = harness(linked("u1")).await;
    mock_two_games(&mut h.server).await;

    let options = CommandOptions {
        mode: Some("competitive".into()),
        ..Default::default()
    };
    let reply = run(&h.state, request("u1", Command::Profile, options)).await;
    let card = embed(&reply);

    assert_eq!(card.title, "Nick#TAG profile");
    assert_eq!(card.field_value("K/D/A"), Some("20/10/5"));
    assert_eq!(card.field_value("K/D"), Some("2.00"));
    assert_eq!(card.field_value("Win rate"), Some("100% (1W / 0L)"));
    assert_eq!(card.field_value("Top agents"), Some("Jett (1)"));
    assert_eq!(card.field_value("Top maps"), Some("Ascent (1)"));
}

#[tokio::test]
async fn repeated_profile_is_served_from_cache() {
    let mut h = harness(linked("u1")).await;
    mock_two_games(&mut h.server).await;

    let first = run(&h.state, request("u1", Command::Profile, CommandOptions::default())).await;
    let second = run(&h.state, request("u1", Command::Profile, CommandOptions::default())).await;

    let card = embed(&first);
    assert_eq!(card.field_value("K/D/A"), Some("25/25/15"));
    assert_eq!(card.field_value("K/D"), Some("1.00"));
    assert_eq!(card, embed(&second));
}

#[tokio::test]
async fn agent_breakdown_and_unknown_filter() {
    let mut h = harness(linked("u1")).await;
    mock_two_games(&mut h.server).await;

    let reply = run(&h.state, request("u1", Command::Agents, CommandOptions::default())).await;
    let card = embed(&reply);
    assert_eq!(card.fields.len(), 2);
    assert!(card.field_value("Jett").unwrap().starts_with("1 games · 100% win rate"));

    let options = CommandOptions {
        agent: Some("Bob".into()),
        ..Default::default()
    };
    let reply = run(&h.state, request("u1", Command::Agents, options)).await;
    assert_eq!(content(&reply), "There is no agent named `Bob`.");
}

#[tokio::test]
async fn map_breakdown_filters_to_one_map() {
    let mut h = harness(linked("u1")).await;
    mock_two_games(&mut h.server).await;

    let options = CommandOptions {
        map: Some("bind".into()),
        ..Default::default()
    };
    let reply = run(&h.state, request("u1", Command::Maps, options)).await;
    let card = embed(&reply);

    assert_eq!(card.fields.len(), 1);
    assert_eq!(
        card.field_value("Bind"),
        Some("1 games · 0% win rate · 0.33 K/D")
    );
}

#[tokio::test]
async fn deferred_reply_is_patched_to_the_callback() {
    let mut h = harness(LinkMap::new()).await;
    let callback = h
        .server
        .mock("PATCH", "/callback")
        .match_body(Matcher::PartialJsonString(
            r#"{"type":"message","ephemeral":true}"#.into(),
        ))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let mut deferred = request("u1", Command::Profile, CommandOptions::default());
    deferred.callback_url = Some(format!("{}/callback", h.server.url()));
    let ack = command_service::handle(h.state.clone(), deferred).await;

    assert_eq!(ack, InteractionResponse::Deferred);
    for _ in 0..100 {
        if callback.matched_async().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    callback.assert_async().await;
}

#[tokio::test]
async fn fast_commands_ignore_the_callback() {
    let h = harness(LinkMap::new()).await;

    let mut help = request("u1", Command::Help, CommandOptions::default());
    help.callback_url = Some("http://127.0.0.1:9/callback".into());
    let reply = command_service::handle(h.state.clone(), help).await;

    assert!(content(&reply).contains("/link"));
}
