//! Read-only client for the YouTube data API (or a compatible mirror such as
//! `yt.lemnoslife.com`, which does not require a key).

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::config::YoutubeConfig;

#[derive(Debug, thiserror::Error)]
pub enum YoutubeError {
    #[error("Channel not found")]
    ChannelNotFound,

    #[error("{0}")]
    Upstream(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItem {
    pub content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemsResponse {
    #[serde(default)]
    pub items: Vec<UploadItem>,
}

/// One entry of an uploads playlist, kept as loose as upstream sends it.
/// Missing fields are left for the insert validation to reject.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadItem {
    #[serde(default)]
    pub snippet: UploadSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSnippet {
    pub published_at: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: Option<String>,
}

impl UploadItem {
    pub fn video_id(&self) -> Option<&str> {
        self.snippet
            .resource_id
            .as_ref()
            .and_then(|r| r.video_id.as_deref())
    }
}

/// The two upstream reads a sync run needs.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Resolves a channel handle (e.g. `@name`) to its uploads playlist id.
    async fn uploads_playlist(&self, handle: &str) -> Result<String, YoutubeError>;

    /// Most recent `limit` uploads, in the order upstream returns them.
    async fn recent_uploads(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<UploadItem>, YoutubeError>;
}

pub struct YoutubeClient {
    http_client: Client,
    api_base: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl YoutubeClient {
    pub fn new(config: &YoutubeConfig) -> Self {
        Self {
            http_client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/{}", self.api_base, resource)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<T, YoutubeError> {
        let mut request = self.http_client.get(self.endpoint(resource)).query(query);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let call = async move {
            let response = request.send().await.map_err(|e| {
                log::error!("HTTP error fetching {}: {:?}", resource, e);
                YoutubeError::Upstream(e.to_string())
            })?;

            let status = response.status();
            if !status.is_success() {
                log::error!("YouTube API error on {}: {}", resource, status);
                return Err(YoutubeError::Upstream(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                )));
            }

            response.json::<T>().await.map_err(|e| {
                log::error!("Failed to parse {} response: {:?}", resource, e);
                YoutubeError::Upstream(e.to_string())
            })
        };

        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                YoutubeError::Upstream(format!(
                    "request to {} timed out after {}s",
                    resource,
                    self.timeout.as_secs()
                ))
            })?
    }
}

#[async_trait]
impl VideoPlatform for YoutubeClient {
    async fn uploads_playlist(&self, handle: &str) -> Result<String, YoutubeError> {
        let response: ChannelListResponse = self
            .get_json(
                "channels",
                &[
                    ("handle", handle.to_string()),
                    ("part", "contentDetails".to_string()),
                ],
            )
            .await?;

        uploads_playlist_of(response)
    }

    async fn recent_uploads(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<UploadItem>, YoutubeError> {
        let response: PlaylistItemsResponse = self
            .get_json(
                "playlistItems",
                &[
                    ("playlistId", playlist_id.to_string()),
                    ("part", "snippet".to_string()),
                    ("maxResults", limit.to_string()),
                ],
            )
            .await?;

        Ok(response.items)
    }
}

fn uploads_playlist_of(response: ChannelListResponse) -> Result<String, YoutubeError> {
    response
        .items
        .into_iter()
        .next()
        .map(|c| c.content_details.related_playlists.uploads)
        .ok_or(YoutubeError::ChannelNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_channel_yields_uploads_playlist() {
        let body = r#"{
            "kind": "youtube#channelListResponse",
            "items": [
                {"id": "UC1", "contentDetails": {"relatedPlaylists": {"likes": "", "uploads": "UU1"}}},
                {"id": "UC2", "contentDetails": {"relatedPlaylists": {"uploads": "UU2"}}}
            ]
        }"#;
        let response: ChannelListResponse = serde_json::from_str(body).unwrap();

        assert_eq!(uploads_playlist_of(response).unwrap(), "UU1");
    }

    #[test]
    fn missing_items_means_channel_not_found() {
        let response: ChannelListResponse =
            serde_json::from_str(r#"{"kind": "youtube#channelListResponse"}"#).unwrap();

        assert!(matches!(
            uploads_playlist_of(response),
            Err(YoutubeError::ChannelNotFound)
        ));
    }

    #[test]
    fn playlist_items_keep_upstream_order_and_tolerate_gaps() {
        let body = r#"{
            "items": [
                {"snippet": {
                    "publishedAt": "2024-06-02T10:00:00Z",
                    "title": "Newest",
                    "description": "",
                    "resourceId": {"kind": "youtube#video", "videoId": "b"}
                }},
                {"snippet": {"publishedAt": "2024-06-01T10:00:00Z", "title": "Older"}}
            ]
        }"#;
        let response: PlaylistItemsResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].video_id(), Some("b"));
        assert_eq!(response.items[0].snippet.title.as_deref(), Some("Newest"));
        assert_eq!(response.items[1].video_id(), None);
    }

    #[test]
    fn client_normalizes_base_and_drops_blank_key() {
        let client = YoutubeClient::new(&YoutubeConfig {
            api_base: "https://example.test/".to_string(),
            api_key: Some(String::new()),
            ..YoutubeConfig::default()
        });

        assert_eq!(client.endpoint("channels"), "https://example.test/channels");
        assert!(client.api_key.is_none());
    }

    #[actix_web::test]
    async fn silent_upstream_times_out_as_upstream_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept the connection and hold it open without ever answering.
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let client = YoutubeClient::new(&YoutubeConfig {
            api_base: format!("http://{addr}"),
            request_timeout_secs: 1,
            ..YoutubeConfig::default()
        });

        let started = std::time::Instant::now();
        let err = client.recent_uploads("UUfake", 5).await.unwrap_err();

        assert!(matches!(err, YoutubeError::Upstream(ref m) if m.contains("timed out")));
        assert!(started.elapsed() < Duration::from_secs(10));
        server.abort();
    }

    #[actix_web::test]
    async fn unreachable_upstream_is_an_upstream_error() {
        let client = YoutubeClient::new(&YoutubeConfig {
            api_base: "http://127.0.0.1:1".to_string(),
            request_timeout_secs: 2,
            ..YoutubeConfig::default()
        });

        let err = client.uploads_playlist("@nobody").await.unwrap_err();
        assert!(matches!(err, YoutubeError::Upstream(_)));
    }
}
