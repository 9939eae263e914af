use crate::db::VideoStore;
use crate::services::ingest::{self, InsertError, VideoSubmission};
use crate::services::sync::report_timestamp;
use actix_web::{web, Error, HttpResponse};
use serde::Deserialize;
use serde_json::json;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/sync-youtube")
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                InsertError::Validation(err.to_string()).into()
            }))
            .route(web::post().to(add_video))
            .route(web::get().to(usage)),
    )
    .service(web::resource("/videos").route(web::get().to(list_videos)));
}

/// Manual single-video insert; same contract the sync job uses.
pub async fn add_video(
    body: web::Json<VideoSubmission>,
    store: web::Data<dyn VideoStore>,
) -> Result<HttpResponse, InsertError> {
    let submission = body.into_inner();
    let title = submission.title.clone().unwrap_or_default();

    let data = ingest::insert_video(store.get_ref(), submission).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": data,
        "message": format!("Successfully added video: {}", title),
    })))
}

async fn usage() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "online",
        "message": "YouTube sync API is ready. Send POST requests with video_id, title, and published_at.",
        "example": {
            "video_id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "published_at": report_timestamp(),
            "caption": "Optional caption text",
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListQueryParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

pub async fn list_videos(
    query: web::Query<ListQueryParams>,
    store: web::Data<dyn VideoStore>,
) -> Result<HttpResponse, Error> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100); // Maximum 100 items per page
    let offset = (page - 1).saturating_mul(per_page);

    let feed = store.list_videos(offset, per_page).await.map_err(|e| {
        log::error!("Error loading videos: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "videos": feed.videos,
        "meta": {
            "total": feed.total,
            "page": page,
            "per_page": per_page,
            "total_pages": (feed.total as f64 / per_page as f64).ceil() as i64,
        }
    })))
}
