pub mod models;
pub mod schema;

use async_trait::async_trait;
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use models::{NewVideoRecord, VideoPage, VideoRecord};
use schema::vdm_videos;

pub type DbPool = deadpool::managed::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub fn create_pool(database_url: &str, max_connections: usize) -> anyhow::Result<DbPool> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Ok(Pool::builder(config).max_size(max_connections).build()?)
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No connection could be checked out of the pool.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The database refused the statement (constraint violation, bad value, ...).
    #[error("{0}")]
    Rejected(#[from] diesel::result::Error),
}

/// Persistence boundary for video records.
///
/// Handlers and the sync job receive this as an injected handle so tests can
/// swap in an in-memory implementation.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Writes a single row and returns what the store persisted.
    async fn insert_video(&self, video: NewVideoRecord) -> Result<Vec<VideoRecord>, StoreError>;

    /// Newest-first page of the feed, with the total row count.
    async fn list_videos(&self, offset: i64, limit: i64) -> Result<VideoPage, StoreError>;
}

pub struct PgVideoStore {
    pool: DbPool,
}

impl PgVideoStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> Result<
        deadpool::managed::Object<AsyncDieselConnectionManager<AsyncPgConnection>>,
        StoreError,
    > {
        self.pool.get().await.map_err(|e| {
            log::error!("Failed to get DB connection: {}", e);
            StoreError::Unavailable(e.to_string())
        })
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn insert_video(&self, video: NewVideoRecord) -> Result<Vec<VideoRecord>, StoreError> {
        let mut conn = self.conn().await?;

        let rows = diesel::insert_into(vdm_videos::table)
            .values(&video)
            .returning(VideoRecord::as_returning())
            .get_results(&mut conn)
            .await?;

        Ok(rows)
    }

    async fn list_videos(&self, offset: i64, limit: i64) -> Result<VideoPage, StoreError> {
        let mut conn = self.conn().await?;

        let videos = vdm_videos::table
            .order_by(vdm_videos::published_at.desc())
            .offset(offset)
            .limit(limit)
            .select(VideoRecord::as_select())
            .load(&mut conn)
            .await?;

        let total: i64 = vdm_videos::table.count().get_result(&mut conn).await?;

        Ok(VideoPage { videos, total })
    }
}
