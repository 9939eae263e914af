use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::db::VideoStore;
use crate::services::sync::{run_sync, SyncError, SyncSettings};
use crate::services::youtube::VideoPlatform;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/cron-sync")
            .route(web::get().to(trigger_sync))
            .route(web::post().to(trigger_sync)),
    );
}

/// Runs a full sync and answers with the aggregated report.
pub async fn trigger_sync(
    config: web::Data<AppConfig>,
    platform: web::Data<dyn VideoPlatform>,
    store: web::Data<dyn VideoStore>,
) -> Result<HttpResponse, SyncError> {
    let settings = SyncSettings {
        channel_handle: &config.youtube.channel_handle,
        page_size: config.youtube.page_size,
    };

    let report = run_sync(platform.get_ref(), store.get_ref(), &settings)
        .await
        .inspect_err(|e| log::error!("Sync aborted: {}", e))?;

    Ok(HttpResponse::Ok().json(report))
}
