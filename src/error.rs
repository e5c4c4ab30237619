//! Service-level errors and their HTTP and chat projections.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    riot::{ApiError, routing::UnknownRouting},
    stats::UnknownEntity,
};

/// Whose link was missing when a command needed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotLinkedTarget {
    /// The user who ran the command.
    Caller,
    /// Another user the command was pointed at.
    Other,
}

/// Errors that can occur while handling a bot command.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The Riot ID could not be split into name and tag.
    #[error("invalid Riot ID `{0}`")]
    InvalidRiotId(String),
    /// No stored link for the target user and no inline Riot ID.
    #[error("no linked account ({0:?})")]
    NotLinked(NotLinkedTarget),
    /// Agent or map filter not present in the roster.
    #[error(transparent)]
    UnknownEntity(#[from] UnknownEntity),
    /// The player has no match history to report on.
    #[error("no matches found")]
    NoMatches,
    /// Invalid input provided by the user.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// An upstream API call failed.
    #[error("upstream request failed")]
    Upstream(#[from] ApiError),
    /// The link store could not be read.
    #[error("storage unavailable")]
    Storage(#[from] StorageError),
}

impl From<UnknownRouting> for ServiceError {
    fn from(err: UnknownRouting) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl ServiceError {
    /// Whether the failure was caused by the user's input rather than by a collaborator.
    pub fn is_user_error(&self) -> bool {
        match self {
            ServiceError::InvalidRiotId(_)
            | ServiceError::NotLinked(_)
            | ServiceError::UnknownEntity(_)
            | ServiceError::NoMatches
            | ServiceError::InvalidInput(_) => true,
            ServiceError::Upstream(err) => err.status() == Some(reqwest::StatusCode::NOT_FOUND),
            ServiceError::Storage(_) => false,
        }
    }

    /// Text shown to the chat user in place of the command's normal reply.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::InvalidRiotId(input) => format!(
                "`{input}` is not a valid Riot ID. Use the `Name#TAG` format, e.g. `Nick#EUW`."
            ),
            ServiceError::NotLinked(NotLinkedTarget::Caller) => {
                "You have not linked a Riot account yet. Use `/link Name#TAG` first, or pass a Riot ID to this command.".into()
            }
            ServiceError::NotLinked(NotLinkedTarget::Other) => {
                "That user has not linked a Riot account.".into()
            }
            ServiceError::UnknownEntity(err) => format!("There is no {} named `{}`.", err.kind, err.name),
            ServiceError::NoMatches => "No matches found for this account.".into(),
            ServiceError::InvalidInput(message) => message.clone(),
            ServiceError::Upstream(ApiError::RateLimited { .. }) => {
                "The Riot API is rate limiting requests right now. Try again in a minute.".into()
            }
            ServiceError::Upstream(err) if err.status() == Some(reqwest::StatusCode::NOT_FOUND) => {
                "Riot could not find that account or its match data. Check the Riot ID, shard and region.".into()
            }
            ServiceError::Upstream(ApiError::Status { status, .. }) => {
                format!("The Riot API returned an error ({status}). Try again later.")
            }
            ServiceError::Upstream(_) => {
                "Could not reach the Riot API. Try again later.".into()
            }
            ServiceError::Storage(_) => {
                "Linked accounts are unavailable right now. Try again later.".into()
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Errors on the HTTP interaction surface, converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
