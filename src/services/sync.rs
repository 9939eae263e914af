//! One sync run: resolve the channel, list its latest uploads and push each
//! through the insert path, collecting a per-item outcome.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

use crate::db::VideoStore;
use crate::services::ingest::{self, InsertError, VideoSubmission};
use crate::services::youtube::{UploadItem, VideoPlatform, YoutubeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Success,
    /// The insert path answered with a business error.
    Failed,
    /// The insert call itself broke.
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome {
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub success: bool,
    pub message: String,
    pub synced: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ItemOutcome>>,
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Channel not found")]
    ChannelNotFound,

    #[error("{0}")]
    Upstream(String),
}

impl From<YoutubeError> for SyncError {
    fn from(e: YoutubeError) -> Self {
        match e {
            YoutubeError::ChannelNotFound => SyncError::ChannelNotFound,
            YoutubeError::Upstream(msg) => SyncError::Upstream(msg),
        }
    }
}

impl ResponseError for SyncError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.to_string(),
            "timestamp": report_timestamp(),
        }))
    }
}

/// UTC with millisecond precision and a `Z` suffix, e.g. `2024-06-01T09:00:00.000Z`.
pub fn report_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub struct SyncSettings<'a> {
    pub channel_handle: &'a str,
    pub page_size: u32,
}

pub async fn run_sync(
    platform: &dyn VideoPlatform,
    store: &dyn VideoStore,
    settings: &SyncSettings<'_>,
) -> Result<SyncReport, SyncError> {
    log::info!("Starting YouTube sync for {}", settings.channel_handle);

    let playlist_id = platform.uploads_playlist(settings.channel_handle).await?;
    log::info!("Uploads playlist ID: {}", playlist_id);

    let items = platform
        .recent_uploads(&playlist_id, settings.page_size)
        .await?;

    if items.is_empty() {
        log::info!("No videos found in playlist {}", playlist_id);
        return Ok(SyncReport {
            success: true,
            message: "No videos found in playlist".to_string(),
            synced: 0,
            failed: None,
            results: None,
            timestamp: report_timestamp(),
        });
    }

    log::info!("Found {} videos to sync", items.len());

    let mut results = Vec::with_capacity(items.len());
    for item in items {
        results.push(sync_item(store, item).await);
    }

    let synced = results
        .iter()
        .filter(|r| r.status == ItemStatus::Success)
        .count();
    let failed = results.len() - synced;

    log::info!("Sync completed: {} successful, {} failed", synced, failed);

    Ok(SyncReport {
        success: true,
        message: format!(
            "Sync completed: {}/{} videos synced successfully",
            synced,
            results.len()
        ),
        synced,
        failed: Some(failed),
        results: Some(results),
        timestamp: report_timestamp(),
    })
}

async fn sync_item(store: &dyn VideoStore, item: UploadItem) -> ItemOutcome {
    let video_id = item.video_id().map(str::to_owned);
    let snippet = item.snippet;
    let title = snippet.title.clone();

    let submission = VideoSubmission {
        video_id: video_id.clone(),
        title: snippet.title,
        published_at: snippet.published_at,
        caption: snippet.description,
        url: None,
    };

    let (status, error) = match ingest::insert_video(store, submission).await {
        Ok(_) => {
            log::info!("Synced video: {:?} ({:?})", title, video_id);
            (ItemStatus::Success, None)
        }
        Err(e @ (InsertError::Validation(_) | InsertError::Store(_))) => {
            log::warn!("Sync failed for {:?}: {}", title, e);
            (ItemStatus::Failed, Some(e.to_string()))
        }
        Err(e @ InsertError::Unexpected(_)) => {
            log::error!("Error syncing {:?}: {}", title, e);
            (ItemStatus::Error, Some(e.to_string()))
        }
    };

    ItemOutcome {
        video_id,
        title,
        status,
        error,
    }
}
