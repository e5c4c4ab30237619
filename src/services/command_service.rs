//! Entry point for interactions: routes a command to its handler and turns failures into
//! replies for the caller.

use tracing::{debug, info, warn};

use crate::{
    dto::interaction::{Command, InteractionRequest, InteractionResponse},
    error::ServiceError,
    services::{link_service, render, stats_service},
    state::SharedState,
};

/// Handle an interaction.
///
/// Slow commands carrying a callback URL are acknowledged with
/// [`InteractionResponse::Deferred`]; the final reply is sent to the callback with `PATCH`
/// once ready.
pub async fn handle(state: SharedState, request: InteractionRequest) -> InteractionResponse {
    match request.callback_url.clone() {
        Some(callback_url) if request.command.is_slow() => {
            tokio::spawn(async move {
                let reply = dispatch(&state, &request).await;
                deliver(&state, &callback_url, &reply).await;
            });
            InteractionResponse::Deferred
        }
        _ => dispatch(&state, &request).await,
    }
}

/// Run the command and always produce a reply. Handler errors become an ephemeral message.
pub async fn dispatch(state: &SharedState, request: &InteractionRequest) -> InteractionResponse {
    let caller_id = request.caller_id.as_str();
    let options = &request.options;

    let result = match request.command {
        Command::Link => link_service::link(state, caller_id, options).await,
        Command::Unlink => link_service::unlink(state, caller_id).await,
        Command::SetShard => link_service::set_shard(state, caller_id, options).await,
        Command::SetRegion => link_service::set_region(state, caller_id, options).await,
        Command::Whoami => link_service::whoami(state, caller_id, options).await,
        Command::Profile => stats_service::profile(state, caller_id, options).await,
        Command::LastMatch => stats_service::last_match(state, caller_id, options).await,
        Command::Agents => stats_service::agents(state, caller_id, options).await,
        Command::Maps => stats_service::maps(state, caller_id, options).await,
        Command::Help => Ok(render::help()),
    };

    result.unwrap_or_else(|err| failure_reply(request, &err))
}

fn failure_reply(request: &InteractionRequest, err: &ServiceError) -> InteractionResponse {
    if err.is_user_error() {
        info!(
            command = ?request.command,
            caller_id = %request.caller_id,
            error = %err,
            "command rejected"
        );
    } else {
        warn!(
            command = ?request.command,
            caller_id = %request.caller_id,
            error = ?err,
            "command failed"
        );
    }
    InteractionResponse::ephemeral(err.user_message())
}

async fn deliver(state: &SharedState, callback_url: &str, reply: &InteractionResponse) {
    let result = state
        .http()
        .patch(callback_url)
        .json(reply)
        .send()
        .await
        .and_then(|response| response.error_for_status());

    match result {
        Ok(_) => debug!(callback_url, "delivered deferred reply"),
        Err(err) => warn!(callback_url, error = %err, "failed to deliver deferred reply"),
    }
}
