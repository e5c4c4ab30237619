use axum::Router;

use crate::state::SharedState;

/// Swagger UI.
pub mod docs;
/// Health check.
pub mod health;
/// Command entry point.
pub mod interactions;

/// Compose all route trees and attach the shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(interactions::router())
        .merge(docs::router())
        .with_state(state)
}
