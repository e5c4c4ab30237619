use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Request tokens left in the current rate window.
    pub rate_tokens: u32,
    /// Number of chat users with a linked account.
    pub linked_users: usize,
}

impl HealthResponse {
    /// Operational service.
    pub fn ok(rate_tokens: u32, linked_users: usize) -> Self {
        Self {
            status: "ok".to_string(),
            rate_tokens,
            linked_users,
        }
    }

    /// Service up but out of upstream request budget until the next refill.
    pub fn degraded(rate_tokens: u32, linked_users: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            rate_tokens,
            linked_users,
        }
    }
}
