use crate::config::Environment;
use crate::session::TokenSet;

/// Everything needed to call the accounting API on behalf of one company.
///
/// Built from a `TokenSet` by [`build_connection`] and replaced wholesale
/// whenever the tokens change; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    access_token: String,
    realm_id: String,
    base_url: String,
    minor_version: Option<String>,
}

/// Derive a connection handle from the current token set.
pub fn build_connection(
    tokens: &TokenSet,
    environment: Environment,
    minor_version: Option<&str>,
) -> Connection {
    Connection {
        access_token: tokens.access_token.clone(),
        realm_id: tokens.realm_id.clone(),
        base_url: environment.api_base_url().to_string(),
        minor_version: minor_version.map(str::to_string),
    }
}

impl Connection {
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn realm_id(&self) -> &str {
        &self.realm_id
    }

    /// URL of a single entity read, e.g. `companyinfo/{realm}`.
    pub fn entity_url(&self, entity: &str, id: &str) -> String {
        let mut url = format!(
            "{}/v3/company/{}/{}/{}",
            self.base_url,
            urlencoding(&self.realm_id),
            entity,
            urlencoding(id),
        );
        if let Some(minor) = &self.minor_version {
            url.push_str(&format!("?minorversion={}", urlencoding(minor)));
        }
        url
    }

    pub fn company_info_url(&self) -> String {
        self.entity_url("companyinfo", &self.realm_id)
    }
}

fn urlencoding(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
