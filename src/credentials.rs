use std::collections::HashMap;

/// Cookie name carrying the API key, forwarded as `x-auth-token`.
pub const API_KEY_COOKIE: &str = "API_KEY";

/// Cookie name carrying the portfolio token, forwarded as `x-portfolio-token`.
pub const PORTFOLIO_COOKIE: &str = "PORTFOLIO_ID";

/// Source of named secrets for authenticating requests.
///
/// The fetch pipeline only ever talks to this trait, never to the process
/// environment directly, so tests and alternative hosts can supply their own
/// credential storage.
pub trait CredentialProvider: Send + Sync {
    /// Look up a named secret. Absence is not an error: the request simply
    /// goes out without the corresponding header.
    fn credential(&self, name: &str) -> Option<String>;

    /// Full raw cookie string for the `cookie` request header, if any.
    fn cookie_header(&self) -> Option<String>;
}

/// Credential provider backed by a raw browser cookie string
/// (`name=value; name2=value2`), the shape a browser session exposes.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    raw: String,
    values: HashMap<String, String>,
}

impl CookieJar {
    pub fn from_raw(raw: &str) -> Self {
        let values = raw
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                Some((name.to_string(), value.to_string()))
            })
            .collect();

        Self {
            raw: raw.trim().to_string(),
            values,
        }
    }
}

impl CredentialProvider for CookieJar {
    fn credential(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }

    fn cookie_header(&self) -> Option<String> {
        if self.raw.is_empty() {
            None
        } else {
            Some(self.raw.clone())
        }
    }
}
