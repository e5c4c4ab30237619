use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report rate budget and registry size. The service is degraded while the upstream
/// budget is exhausted.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let tokens = state.rate_gate().available().await;
    let linked = state.link_count();

    if tokens == 0 {
        warn!("upstream rate budget exhausted (degraded mode)");
        HealthResponse::degraded(tokens, linked)
    } else {
        HealthResponse::ok(tokens, linked)
    }
}
