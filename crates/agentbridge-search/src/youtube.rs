//! YouTube Data API v3 search client.

use std::time::Duration;

use agentbridge_core::BridgeError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

#[derive(Deserialize)]
struct SearchListResponse {
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    video_id: String,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
    description: String,
    thumbnails: Thumbnails,
}

#[derive(Deserialize)]
struct Thumbnails {
    default: Thumbnail,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResult {
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub video_id: String,
    pub url: String,
}

impl VideoResult {
    pub fn new(
        video_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        let video_id = video_id.into();
        Self {
            url: format!("{}{}", WATCH_URL, video_id),
            title: title.into(),
            description: description.into(),
            thumbnail_url: thumbnail_url.into(),
            video_id,
        }
    }
}

impl From<SearchItem> for VideoResult {
    fn from(item: SearchItem) -> Self {
        VideoResult::new(
            item.id.video_id,
            item.snippet.title,
            item.snippet.description,
            item.snippet.thumbnails.default.url,
        )
    }
}

#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Returns videos in the order the service ranked them.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<VideoResult>, BridgeError>;
}

/// Client for `GET {base}/search`.
pub struct YouTubeClient {
    client: Client,
    search_url: Url,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(search_url: Url, api_key: impl Into<String>, timeout: Duration) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BridgeError::collaborator)?;
        Ok(Self {
            client,
            search_url,
            api_key: api_key.into(),
        })
    }
}

/// The request URL carries the API key in its query, so it never reaches
/// the error text.
fn request_failed(err: reqwest::Error) -> BridgeError {
    BridgeError::Collaborator(format!("YouTube search request failed: {}", err.without_url()))
}

#[async_trait]
impl VideoSearch for YouTubeClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<VideoResult>, BridgeError> {
        let max_results = max_results.to_string();
        let params = [
            ("part", "snippet"),
            ("q", query),
            ("type", "video"),
            ("maxResults", max_results.as_str()),
            ("key", self.api_key.as_str()),
        ];

        debug!(url = %self.search_url, query, max_results = %max_results, "Searching videos");
        let http_response = self
            .client
            .get(self.search_url.clone())
            .query(&params)
            .send()
            .await
            .map_err(request_failed)?;

        if !http_response.status().is_success() {
            let status = http_response.status();
            let text = match http_response.text().await {
                Ok(text) => text,
                Err(e) => format!("<unreadable body: {}>", e.without_url()),
            };
            let detail = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            return Err(BridgeError::Collaborator(format!(
                "YouTube search error {}: {}",
                status, detail
            )));
        }

        let body = http_response.text().await.map_err(request_failed)?;
        let response: SearchListResponse = serde_json::from_str(&body)?;

        Ok(response.items.into_iter().map(VideoResult::from).collect())
    }
}
