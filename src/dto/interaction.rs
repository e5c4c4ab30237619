//! Payloads exchanged with the chat front-end on the interaction endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::embed::{Embed, LinkButton};

/// Slash command invoked by a chat user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Link,
    Unlink,
    #[serde(alias = "setshard")]
    SetShard,
    #[serde(alias = "setregion")]
    SetRegion,
    Whoami,
    Profile,
    #[serde(alias = "lastmatch")]
    LastMatch,
    Agents,
    Maps,
    Help,
}

impl Command {
    /// Commands whose reply needs upstream calls and may be answered through the callback.
    pub fn is_slow(self) -> bool {
        matches!(
            self,
            Command::Link
                | Command::Profile
                | Command::LastMatch
                | Command::Agents
                | Command::Maps
        )
    }
}

/// Option values attached to a command. Each command reads the subset it understands.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct CommandOptions {
    /// Riot ID in `Name#TAG` form.
    #[validate(length(min = 1, max = 64))]
    pub riot_id: Option<String>,
    /// Chat user the command is about, when not the caller.
    #[validate(length(min = 1))]
    pub user: Option<String>,
    /// Shard override for this command.
    pub shard: Option<String>,
    /// Region override for this command.
    pub region: Option<String>,
    /// Queue/mode filter, e.g. `competitive`.
    pub mode: Option<String>,
    /// Number of recent matches to aggregate.
    #[validate(range(min = 1))]
    pub count: Option<u8>,
    /// Agent display name filter.
    pub agent: Option<String>,
    /// Map display name filter.
    pub map: Option<String>,
}

/// Interaction delivered by the chat front-end.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct InteractionRequest {
    /// Chat user who ran the command.
    #[validate(length(min = 1))]
    pub caller_id: String,
    /// Command name.
    pub command: Command,
    /// Command options; missing means none.
    #[serde(default)]
    #[validate(nested)]
    pub options: CommandOptions,
    /// When present, the reply is deferred and later sent to this URL with `PATCH`.
    #[validate(url)]
    pub callback_url: Option<String>,
}

/// Reply to an interaction.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionResponse {
    /// Plain text reply.
    Message {
        /// Markdown text.
        content: String,
        /// Only shown to the caller.
        ephemeral: bool,
    },
    /// Rich reply with optional link buttons.
    Embed {
        /// Cards, in display order.
        embeds: Vec<Embed>,
        /// Buttons rendered under the cards.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        buttons: Vec<LinkButton>,
    },
    /// Acknowledgement; the final reply follows on the callback URL.
    Deferred,
}

impl InteractionResponse {
    /// Reply visible to the whole channel.
    pub fn message(content: impl Into<String>) -> Self {
        InteractionResponse::Message {
            content: content.into(),
            ephemeral: false,
        }
    }

    /// Reply shown only to the caller.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        InteractionResponse::Message {
            content: content.into(),
            ephemeral: true,
        }
    }

    /// Single-embed reply without buttons.
    pub fn embed(embed: Embed) -> Self {
        InteractionResponse::Embed {
            embeds: vec![embed],
            buttons: Vec::new(),
        }
    }

    /// Attach link buttons. Text replies carry no components and are left untouched.
    pub fn with_buttons(self, extra: impl IntoIterator<Item = LinkButton>) -> Self {
        match self {
            InteractionResponse::Embed {
                embeds,
                mut buttons,
            } => {
                buttons.extend(extra);
                InteractionResponse::Embed { embeds, buttons }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_both_command_spellings() {
        let a: Command = serde_json::from_value(json!("last_match")).unwrap();
        let b: Command = serde_json::from_value(json!("lastmatch")).unwrap();
        assert_eq!(a, Command::LastMatch);
        assert_eq!(b, Command::LastMatch);
    }

    #[test]
    fn options_default_when_missing() {
        let request: InteractionRequest =
            serde_json::from_value(json!({"caller_id": "u1", "command": "help"})).unwrap();
        assert!(request.options.riot_id.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn rejects_zero_count_and_bad_callback() {
        let request: InteractionRequest = serde_json::from_value(json!({
            "caller_id": "u1",
            "command": "profile",
            "options": {"count": 0},
            "callback_url": "not a url"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.errors();
        assert!(fields.contains_key("options"));
        assert!(fields.contains_key("callback_url"));
    }

    #[test]
    fn rejects_empty_caller() {
        let request: InteractionRequest =
            serde_json::from_value(json!({"caller_id": "", "command": "help"})).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn message_serializes_with_type_tag() {
        let value = serde_json::to_value(InteractionResponse::ephemeral("hi")).unwrap();
        assert_eq!(value, json!({"type": "message", "content": "hi", "ephemeral": true}));
    }
}
