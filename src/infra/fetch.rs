use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::{
    application::theme::{FetchError, ThemeFetcher},
    config::FetchSettings,
};

use super::error::InfraError;

/// Fetches remote themes over HTTP(S) with a bounded timeout.
#[derive(Debug, Clone)]
pub struct ReqwestThemeFetcher {
    client: reqwest::Client,
}

impl ReqwestThemeFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, InfraError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| InfraError::configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ThemeFetcher for ReqwestThemeFetcher {
    async fn fetch_theme(&self, raw_url: &str) -> Result<String, FetchError> {
        let url = Url::parse(raw_url).map_err(|err| FetchError::InvalidUrl {
            url: raw_url.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: raw_url.to_string(),
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(FetchError::request)?;

        let body = response.text().await.map_err(FetchError::request)?;
        debug!(bytes = body.len(), "fetched remote theme");
        Ok(body)
    }
}
