//! Connection settings for [`CouchLinkStore`](super::CouchLinkStore), read from `COUCH_*`
//! environment variables when `LINK_STORE=couch`.

use tracing::warn;

use super::error::{CouchDaoError, CouchResult};

const BASE_URL_VAR: &str = "COUCH_BASE_URL";
const DATABASE_VAR: &str = "COUCH_DB";
const USERNAME_VAR: &str = "COUCH_USERNAME";
const PASSWORD_VAR: &str = "COUCH_PASSWORD";

/// Database holding the links document when `COUCH_DB` is unset.
pub const DEFAULT_DATABASE: &str = "spike_stats_links";

/// Where the link document lives and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouchConfig {
    /// Server root, e.g. `http://localhost:5984`.
    pub base_url: String,
    /// Database created on connect if missing.
    pub database: String,
    /// Basic-auth user and password.
    pub credentials: Option<(String, String)>,
}

impl CouchConfig {
    /// Read `COUCH_BASE_URL` (required), `COUCH_DB` and the optional credential pair.
    pub fn from_env() -> CouchResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CouchResult<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let base_url = var(BASE_URL_VAR)
            .ok_or(CouchDaoError::MissingEnvVar { var: BASE_URL_VAR })?;
        let database = var(DATABASE_VAR).unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let credentials = match (var(USERNAME_VAR), var(PASSWORD_VAR)) {
            (Some(username), Some(password)) => Some((username, password)),
            (None, None) => None,
            _ => {
                warn!(
                    "only one of {USERNAME_VAR} and {PASSWORD_VAR} is set; connecting anonymously"
                );
                None
            }
        };

        Ok(Self {
            base_url: base_url.trim().to_string(),
            database: database.trim().to_string(),
            credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> CouchResult<CouchConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        CouchConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn database_defaults_to_link_store_name() {
        let config = from_vars(&[(BASE_URL_VAR, "http://couch:5984")]).unwrap();
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert_eq!(config.credentials, None);

        let blank = from_vars(&[(BASE_URL_VAR, "http://couch:5984"), (DATABASE_VAR, " ")]).unwrap();
        assert_eq!(blank.database, DEFAULT_DATABASE);
    }

    #[test]
    fn base_url_is_required() {
        assert!(matches!(
            from_vars(&[(DATABASE_VAR, "links")]),
            Err(CouchDaoError::MissingEnvVar { var: BASE_URL_VAR })
        ));
    }

    #[test]
    fn credentials_need_both_halves() {
        let full = from_vars(&[
            (BASE_URL_VAR, "http://couch:5984"),
            (DATABASE_VAR, "links"),
            (USERNAME_VAR, "admin"),
            (PASSWORD_VAR, "secret"),
        ])
        .unwrap();
        assert_eq!(full.database, "links");
        assert_eq!(
            full.credentials,
            Some(("admin".to_string(), "secret".to_string()))
        );

        let half = from_vars(&[(BASE_URL_VAR, "http://couch:5984"), (USERNAME_VAR, "admin")])
            .unwrap();
        assert_eq!(half.credentials, None);
    }
}
