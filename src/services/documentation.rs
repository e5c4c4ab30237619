use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Spike Stats.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::interactions::interaction,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::interaction::InteractionRequest,
            crate::dto::interaction::InteractionResponse,
            crate::dto::interaction::Command,
            crate::dto::interaction::CommandOptions,
            crate::dto::embed::Embed,
            crate::dto::embed::EmbedField,
            crate::dto::embed::LinkButton,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "interactions", description = "Bot command interactions"),
    )
)]
pub struct ApiDoc;
