use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::models::{NewVideoRecord, VideoRecord};
use crate::db::{StoreError, VideoStore};

const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// Body accepted by the insert endpoint. Everything is optional at the
/// deserialization layer so that missing fields surface as a validation
/// error rather than a 400 from the JSON extractor.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VideoSubmission {
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub published_at: Option<String>,
    pub caption: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Store(String),

    #[error("{0}")]
    Unexpected(String),
}

impl From<StoreError> for InsertError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Rejected(e) => InsertError::Store(e.to_string()),
            StoreError::Unavailable(msg) => InsertError::Unexpected(msg),
        }
    }
}

impl ResponseError for InsertError {
    fn status_code(&self) -> StatusCode {
        match self {
            InsertError::Validation(_) => StatusCode::BAD_REQUEST,
            InsertError::Store(_) | InsertError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_BASE}{video_id}")
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl VideoSubmission {
    /// Checks required fields and fills in the derived ones.
    pub fn into_record(self) -> Result<NewVideoRecord, InsertError> {
        let (Some(video_id), Some(title), Some(published_at)) = (
            present(self.video_id),
            present(self.title),
            present(self.published_at),
        ) else {
            return Err(InsertError::Validation("Missing required fields".into()));
        };

        let published_at = DateTime::parse_from_rfc3339(&published_at)
            .map_err(|e| {
                InsertError::Validation(format!("Invalid published_at '{published_at}': {e}"))
            })?
            .with_timezone(&Utc);

        Ok(NewVideoRecord {
            url: present(self.url).unwrap_or_else(|| watch_url(&video_id)),
            caption: present(self.caption).unwrap_or_else(|| title.clone()),
            video_id,
            title,
            published_at,
        })
    }
}

/// Validates and stores one video. Shared by the HTTP endpoint and the sync job.
pub async fn insert_video(
    store: &dyn VideoStore,
    submission: VideoSubmission,
) -> Result<Vec<VideoRecord>, InsertError> {
    let record = submission.into_record()?;
    let video_id = record.video_id.clone();

    store.insert_video(record).await.map_err(|e| {
        log::error!("Error inserting video {}: {}", video_id, e);
        InsertError::from(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryVideoStore;

    fn submission(video_id: &str, title: &str) -> VideoSubmission {
        VideoSubmission {
            video_id: Some(video_id.to_string()),
            title: Some(title.to_string()),
            published_at: Some("2024-05-01T12:00:00Z".to_string()),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn derives_url_and_caption_when_absent() {
        let store = MemoryVideoStore::default();

        let rows = insert_video(&store, submission("abc123", "A title"))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(rows[0].caption, "A title");
        assert_eq!(store.rows().len(), 1);
    }

    #[actix_web::test]
    async fn keeps_supplied_caption_and_url() {
        let store = MemoryVideoStore::default();
        let mut input = submission("abc123", "A title");
        input.caption = Some("Longer words".into());
        input.url = Some("https://youtu.be/abc123".into());

        let rows = insert_video(&store, input).await.unwrap();

        assert_eq!(rows[0].caption, "Longer words");
        assert_eq!(rows[0].url, "https://youtu.be/abc123");
    }

    #[actix_web::test]
    async fn blank_caption_falls_back_to_title() {
        let store = MemoryVideoStore::default();
        let mut input = submission("abc123", "A title");
        input.caption = Some(String::new());

        let rows = insert_video(&store, input).await.unwrap();

        assert_eq!(rows[0].caption, "A title");
    }

    #[actix_web::test]
    async fn each_missing_required_field_is_rejected_without_a_write() {
        let store = MemoryVideoStore::default();
        let strip: [fn(&mut VideoSubmission); 3] = [
            |s| s.video_id = None,
            |s| s.title = Some(String::new()),
            |s| s.published_at = None,
        ];

        for f in strip {
            let mut input = submission("abc123", "A title");
            f(&mut input);

            let err = insert_video(&store, input).await.unwrap_err();
            assert!(matches!(err, InsertError::Validation(ref m) if m == "Missing required fields"));
        }

        assert!(store.rows().is_empty());
    }

    #[actix_web::test]
    async fn whitespace_title_counts_as_present() {
        let store = MemoryVideoStore::default();

        let rows = insert_video(&store, submission("abc123", " ")).await.unwrap();

        assert_eq!(rows[0].title, " ");
        assert_eq!(rows[0].caption, " ");
    }

    #[actix_web::test]
    async fn unparsable_timestamp_is_a_validation_error() {
        let store = MemoryVideoStore::default();
        let mut input = submission("abc123", "A title");
        input.published_at = Some("yesterday".into());

        let err = insert_video(&store, input).await.unwrap_err();

        assert!(matches!(err, InsertError::Validation(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(store.rows().is_empty());
    }

    #[actix_web::test]
    async fn store_failures_keep_their_category() {
        let rejected = MemoryVideoStore::failing(|| {
            StoreError::Rejected(diesel::result::Error::NotFound)
        });
        let err = insert_video(&rejected, submission("a", "b")).await.unwrap_err();
        assert!(matches!(err, InsertError::Store(_)));

        let down = MemoryVideoStore::failing(|| StoreError::Unavailable("pool timed out".into()));
        let err = insert_video(&down, submission("a", "b")).await.unwrap_err();
        assert!(matches!(err, InsertError::Unexpected(ref m) if m == "pool timed out"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
