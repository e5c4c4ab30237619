use axum::{Json, Router, extract::State, routing::post};
use validator::Validate;

use crate::{
    dto::interaction::{InteractionRequest, InteractionResponse},
    error::AppError,
    services::command_service,
    state::SharedState,
};

/// Run a bot command on behalf of a chat user.
///
/// Command failures are replied to the caller as ephemeral messages; only malformed
/// interactions are rejected at the HTTP level.
/// Validate and dispatch one interaction.
#[utoipa::path(
    post,
    path = "/interactions",
    tag = "interactions",
    request_body = InteractionRequest,
    responses(
        (status = 200, description = "Command reply, or acknowledgement when deferred", body = InteractionResponse),
        (status = 400, description = "Malformed interaction")
    )
)]
pub async fn interaction(
    State(state): State<SharedState>,
    Json(payload): Json<InteractionRequest>,
) -> Result<Json<InteractionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(command_service::handle(state, payload).await))
}

/// Configure the interaction routes subtree.
pub fn router() -> Router<SharedState> {
    Router::new().route("/interactions", post(interaction))
}
