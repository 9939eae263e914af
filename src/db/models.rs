use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Queryable, Selectable, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::vdm_videos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VideoRecord {
    pub id: i64,
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub caption: String,
    pub created_at: DateTime<Utc>,
}

/// Row as written by the insert path; `id` and `created_at` come from the store.
#[derive(Debug, Serialize, Deserialize, Insertable, Clone, PartialEq)]
#[diesel(table_name = crate::db::schema::vdm_videos)]
pub struct NewVideoRecord {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub caption: String,
}

#[derive(Debug, Serialize)]
pub struct VideoPage {
    pub videos: Vec<VideoRecord>,
    pub total: i64,
}
