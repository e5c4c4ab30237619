use serde::{Deserialize, Serialize};

use crate::dao::link_store::LinkMap;

/// Identifier of the single document holding every link.
pub const LINKS_DOC_ID: &str = "links";

/// CouchDB document wrapping the whole link map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchLinksDocument {
    /// Always [`LINKS_DOC_ID`].
    #[serde(rename = "_id")]
    pub id: String,
    /// Revision required to overwrite an existing document.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Caller id to link.
    #[serde(default)]
    pub links: LinkMap,
}

impl CouchLinksDocument {
    /// Document for `links`, updating revision `rev` when present.
    pub fn new(links: LinkMap, rev: Option<String>) -> Self {
        Self {
            id: LINKS_DOC_ID.to_string(),
            rev,
            links,
        }
    }
}
