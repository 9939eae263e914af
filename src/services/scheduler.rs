use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::AppConfig;
use crate::db::VideoStore;
use crate::services::sync::{run_sync, SyncSettings};
use crate::services::youtube::VideoPlatform;

/// Registers the periodic sync job. Returns `None` when no schedule is configured.
pub async fn start_sync_schedule(
    config: Arc<AppConfig>,
    platform: Arc<dyn VideoPlatform>,
    store: Arc<dyn VideoStore>,
) -> anyhow::Result<Option<JobScheduler>> {
    let schedule = config.sync.schedule.trim().to_string();
    if schedule.is_empty() {
        log::info!("Scheduled sync disabled");
        return Ok(None);
    }

    let sched = JobScheduler::new().await?;

    let job = Job::new_async(schedule.as_str(), move |_uuid, _l| {
        let config = config.clone();
        let platform = platform.clone();
        let store = store.clone();
        Box::pin(async move {
            let settings = SyncSettings {
                channel_handle: &config.youtube.channel_handle,
                page_size: config.youtube.page_size,
            };
            match run_sync(platform.as_ref(), store.as_ref(), &settings).await {
                Ok(report) => log::info!("Scheduled sync: {}", report.message),
                Err(e) => log::error!("Scheduled sync failed: {}", e),
            }
        })
    })?;

    sched.add(job).await?;
    sched.start().await?;
    log::info!("Sync scheduler started ({})", schedule);

    Ok(Some(sched))
}
