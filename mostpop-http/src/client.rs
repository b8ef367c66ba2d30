//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use mostpop_core::constants::API_KEY_QUERY_PARAM;
use mostpop_core::error::{FeedError, Result};
use mostpop_core::traits::Transport;
use mostpop_core::types::{ArticleApiResponse, RequestDescriptor};

use crate::config::HttpConfig;

/// Transport that talks to the Most Popular API over HTTPS.
pub struct HttpTransport {
    config: HttpConfig,
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the given config.
    pub fn with_config(config: HttpConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FeedError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Creates a transport configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::with_config(HttpConfig::from_env()?)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Performs a GET for `request` and decodes the JSON body as `T`.
    #[instrument(skip(self, request), fields(path = %request.path))]
    pub async fn get_json<T: DeserializeOwned>(&self, request: &RequestDescriptor) -> Result<T> {
        let api_key = self.config.api_key().ok_or(FeedError::MissingApiKey)?;
        let url = self.build_url(request, api_key)?;

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "API returned an error status");
            return Err(status_error(status));
        }

        let body = response.bytes().await.map_err(classify_send_error)?;
        debug!(bytes = body.len(), "Received response");

        serde_json::from_slice(&body).map_err(|e| FeedError::Decode(e.to_string()))
    }

    fn build_url(&self, request: &RequestDescriptor, api_key: &str) -> Result<Url> {
        let env = &self.config.environment;
        let base = format!("{}://{}", env.scheme, env.host);

        let mut url = Url::parse(&base).map_err(|e| FeedError::InvalidUrl(format!("{}: {}", base, e)))?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(FeedError::InvalidUrl(base));
        }

        url.set_path(&request.path);
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in &request.query {
                query.append_pair(name, value);
            }
            query.append_pair(API_KEY_QUERY_PARAM, api_key);
        }

        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<ArticleApiResponse> {
        self.get_json(request).await
    }
}

fn classify_send_error(e: reqwest::Error) -> FeedError {
    // Strip the URL so the api-key never ends up in messages.
    let e = e.without_url();
    if e.is_timeout() {
        FeedError::Timeout(e.to_string())
    } else if e.is_decode() {
        FeedError::Decode(e.to_string())
    } else {
        FeedError::Network(e.to_string())
    }
}

fn status_error(status: StatusCode) -> FeedError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            FeedError::Unauthorized(format!("Status Code {}", status.as_u16()))
        }
        _ => FeedError::HttpStatus {
            code: status.as_u16(),
        },
    }
}
