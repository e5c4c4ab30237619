//! Rich reply payloads understood by the chat front-end.

use serde::Serialize;
use utoipa::ToSchema;

/// Accent colour used on every embed.
pub const EMBED_COLOR: u32 = 0xFF4655;

/// Rich card reply.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct Embed {
    /// Card heading.
    pub title: String,
    /// Text under the heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Link on the heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Side bar colour as `0xRRGGBB`.
    pub color: u32,
    /// Rows, in display order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    /// Small image shown beside the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Large image shown below the fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Small text at the bottom.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Embed {
    /// Empty card with the accent colour.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            url: None,
            color: EMBED_COLOR,
            fields: Vec::new(),
            thumbnail: None,
            image: None,
            footer: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn thumbnail(mut self, url: Option<String>) -> Self {
        self.thumbnail = url;
        self
    }

    pub fn image(mut self, url: Option<String>) -> Self {
        self.image = url;
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Value of the first field called `name`.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }
}

/// Name/value row inside an [`Embed`].
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct EmbedField {
    /// Row label.
    pub name: String,
    /// Row content.
    pub value: String,
    /// Lay out beside neighbouring inline rows.
    pub inline: bool,
}

/// Button opening an external page.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct LinkButton {
    /// Button text.
    pub label: String,
    /// Page opened on click.
    pub url: String,
}
