// giphy.rs - Giphy Adapter
// Looks up a single GIF URL on Giphy, either at random or for a search query.
//
// Used by: dispatch.rs (GifClients)

use serde::Deserialize;

use crate::config::BotConfig;
use crate::error::GifError;

/// A GIF object as returned by Giphy; only the page URL is used
#[derive(Debug, Deserialize)]
struct GifObject {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<GifObject>,
}

/// Random answers with an object, or with an empty array when nothing is available
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RandomData {
    One(GifObject),
    None(Vec<GifObject>),
}

#[derive(Debug, Deserialize)]
struct RandomResponse {
    data: RandomData,
}

pub struct GiphyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GiphyClient {
    pub fn new(config: &BotConfig) -> Result<Self, GifError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.giphy_api_url.trim_end_matches('/').to_string(),
            api_key: config.giphy_token.clone(),
        })
    }

    /// Fetch a random GIF with no tag filter
    pub async fn random(&self) -> Result<String, GifError> {
        log::info!("Getting random gif from giphy");
        let body = self
            .get("/v1/gifs/random", &[("api_key", self.api_key.as_str())])
            .await
            .map_err(|e| log_failure("random", e))?;

        let response: RandomResponse =
            serde_json::from_str(&body).map_err(|e| log_failure("random", e.into()))?;
        match response.data {
            RandomData::One(gif) if !gif.url.is_empty() => Ok(gif.url),
            _ => Err(log_failure("random", GifError::NoResults("random".to_string()))),
        }
    }

    /// Fetch the first GIF matching `query`
    ///
    /// Rating, language and offset are left unset so Giphy applies its defaults.
    pub async fn search(&self, query: &str) -> Result<String, GifError> {
        log::info!("Getting gif with tag: '{}' from giphy", query);
        let body = self
            .get(
                "/v1/gifs/search",
                &[("api_key", self.api_key.as_str()), ("q", query), ("limit", "1")],
            )
            .await
            .map_err(|e| log_failure(query, e))?;

        let response: SearchResponse =
            serde_json::from_str(&body).map_err(|e| log_failure(query, e.into()))?;
        response
            .data
            .into_iter()
            .map(|gif| gif.url)
            .find(|url| !url.is_empty())
            .ok_or_else(|| log_failure(query, GifError::NoResults(query.to_string())))
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<String, GifError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GifError::Status(response.status()));
        }

        Ok(response.text().await?)
    }
}

fn log_failure(what: &str, error: GifError) -> GifError {
    match &error {
        GifError::NoResults(_) => log::warn!("[GIPHY] {}", error),
        _ => log::error!("[GIPHY] Lookup '{}' failed: {}", what, error),
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> GiphyClient {
        let mut config = BotConfig::for_prefix("?");
        config.giphy_token = "giphy-key".to_string();
        config.giphy_api_url = server.url();
        GiphyClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_search_returns_first_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/gifs/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".into(), "giphy-key".into()),
                Matcher::UrlEncoded("q".into(), "happy cats".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"id":"a1","url":"https://giphy.com/gifs/a1"}],"meta":{"status":200}}"#)
            .create_async()
            .await;

        let url = client_for(&server).search("happy cats").await.unwrap();
        assert_eq!(url, "https://giphy.com/gifs/a1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_with_no_results_is_recoverable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/gifs/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"data":[],"pagination":{"total_count":0},"meta":{"status":200}}"#)
            .create_async()
            .await;

        let err = client_for(&server).search("xyzzy123notfound").await.unwrap_err();
        assert!(matches!(err, GifError::NoResults(q) if q == "xyzzy123notfound"));
    }

    #[tokio::test]
    async fn test_random_returns_url() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/gifs/random")
            .match_query(Matcher::UrlEncoded("api_key".into(), "giphy-key".into()))
            .with_status(200)
            .with_body(r#"{"data":{"id":"r9","url":"https://giphy.com/gifs/r9"}}"#)
            .create_async()
            .await;

        let url = client_for(&server).random().await.unwrap();
        assert_eq!(url, "https://giphy.com/gifs/r9");
    }

    #[tokio::test]
    async fn test_random_with_empty_data_is_no_results() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/gifs/random")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"data":[],"meta":{"status":200}}"#)
            .create_async()
            .await;

        let err = client_for(&server).random().await.unwrap_err();
        assert!(matches!(err, GifError::NoResults(_)));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/gifs/search")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"message":"Invalid authentication credentials"}"#)
            .create_async()
            .await;

        let err = client_for(&server).search("cats").await.unwrap_err();
        assert!(matches!(err, GifError::Status(s) if s.as_u16() == 403));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/gifs/random")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = client_for(&server).random().await.unwrap_err();
        assert!(matches!(err, GifError::Decode(_)));
    }
}
