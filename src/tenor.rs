// tenor.rs - Tenor Adapter
// Sends the search to Tenor and answers with a fixed placeholder GIF. The response
// body is read and logged but not turned into a result yet.

use crate::config::BotConfig;
use crate::error::GifError;

pub const TENOR_FALLBACK_URL: &str =
    "https://tenor.com/view/kstr-kochstrasse-work-progress-concept-gif-16243141";

pub struct TenorClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TenorClient {
    pub fn new(config: &BotConfig) -> Result<Self, GifError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.tenor_api_url.trim_end_matches('/').to_string(),
            api_key: config.tenor_token.clone(),
        })
    }

    /// Query Tenor for `query`; always yields the placeholder URL
    pub async fn search(&self, query: &str) -> String {
        log::info!("Getting gif with tag: '{}' from tenor", query);

        match self.fetch(query).await {
            Ok(body) => {
                log::debug!("[TENOR] Received {} bytes for '{}'", body.len(), query);
            }
            Err(GifError::Status(status)) => {
                log::error!("[TENOR] Request for '{}' answered with status {}", query, status);
            }
            Err(GifError::Http(e)) if e.is_body() || e.is_decode() => {
                log::error!("[TENOR] Error occurred when reading response: {}", e);
            }
            Err(e) => {
                log::error!("[TENOR] Error occurred on http request: {}", e);
            }
        }

        TENOR_FALLBACK_URL.to_string()
    }

    async fn fetch(&self, query: &str) -> Result<String, GifError> {
        let response = self
            .http
            .get(format!("{}/v1/search", self.base_url))
            .query(&[("q", query), ("key", self.api_key.as_str()), ("limit", "1")])
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(GifError::Status(response.status()));
        }

        Ok(response.text().await?)
    }
}
