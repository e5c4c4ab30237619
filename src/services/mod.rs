/// Interaction dispatch and failure replies.
pub mod command_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Link management commands.
pub mod link_service;
/// Embed formatting.
pub mod render;
/// Statistics commands.
pub mod stats_service;
