use crate::config::Config;
use crate::credentials::{CredentialProvider, API_KEY_COOKIE, PORTFOLIO_COOKIE};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE, ORIGIN, REFERER};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Page size the transactions endpoint is queried with. Fixed by the remote
/// contract, not configurable.
pub const PER_PAGE: u32 = 25;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("API base URL cannot hold path segments")]
    OpaqueBaseUrl,

    #[error("fetch failed for page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: reqwest::Error,
    },
}

/// Network-facing surface of the Koinly API.
///
/// The export pipeline depends on this trait rather than on a concrete HTTP
/// client, so tests can feed it canned page bodies. Responses travel as raw
/// JSON values; typed extraction happens downstream where a malformed body
/// must degrade instead of erroring.
#[async_trait]
pub trait KoinlyApi: Send + Sync {
    async fn fetch_session(&self) -> Result<Value, ClientError>;
    async fn fetch_wallet(&self, wallet_id: &str) -> Result<Value, ClientError>;
    async fn fetch_page(&self, wallet_id: &str, page: u32) -> Result<Value, ClientError>;
}

pub struct KoinlyClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl KoinlyClient {
    pub fn new(config: &Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.api_base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::OpaqueBaseUrl);
        }

        debug!("Initializing Koinly client against {}", base_url);

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            credentials,
        })
    }

    /// Build an endpoint URL; each segment is percent-encoded on push.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::OpaqueBaseUrl)?;
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Request headers the Koinly API expects from a browser session: the
    /// raw cookie string plus auth tokens pulled out of it by cookie name.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ORIGIN, HeaderValue::from_static("https://app.koinly.io"));
        headers.insert(REFERER, HeaderValue::from_static("https://app.koinly.io/"));

        if let Some(token) = self.credentials.credential(API_KEY_COOKIE) {
            match HeaderValue::from_str(&token) {
                Ok(value) => {
                    headers.insert("x-auth-token", value);
                }
                Err(_) => warn!("API key is not a valid header value; sending without it"),
            }
        }

        if let Some(token) = self.credentials.credential(PORTFOLIO_COOKIE) {
            match HeaderValue::from_str(&token) {
                Ok(value) => {
                    headers.insert("x-portfolio-token", value);
                }
                Err(_) => warn!("Portfolio token is not a valid header value; sending without it"),
            }
        }

        if let Some(cookie) = self.credentials.cookie_header() {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    headers.insert(COOKIE, value);
                }
                Err(_) => warn!("Cookie string is not a valid header value; sending without it"),
            }
        }

        headers
    }

    async fn get_json(&self, url: Url) -> Result<Value, reqwest::Error> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .headers(self.headers())
            .send()
            .await?
            .error_for_status()?;
        response.json().await
    }
}

#[async_trait]
impl KoinlyApi for KoinlyClient {
    async fn fetch_session(&self) -> Result<Value, ClientError> {
        let url = self.endpoint(&["sessions"])?;
        Ok(self.get_json(url).await?)
    }

    async fn fetch_wallet(&self, wallet_id: &str) -> Result<Value, ClientError> {
        let url = self.endpoint(&["wallets", wallet_id])?;
        Ok(self.get_json(url).await?)
    }

    async fn fetch_page(&self, wallet_id: &str, page: u32) -> Result<Value, ClientError> {
        let mut url = self.endpoint(&["transactions"])?;
        url.query_pairs_mut()
            .append_pair("order", "date")
            .append_pair("q[m]", "and")
            .append_pair("q[g][0][from_wallet_id_or_to_wallet_id_eq]", wallet_id)
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &PER_PAGE.to_string());

        self.get_json(url)
            .await
            .map_err(|source| ClientError::Page { page, source })
    }
}
