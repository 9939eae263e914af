use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;

mod api;
mod config;
mod db;
mod services;

use db::{PgVideoStore, VideoStore};
use services::youtube::{VideoPlatform, YoutubeClient};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv().ok();

    env_logger::init();

    let config = config::AppConfig::new().context("Failed to load configuration")?;
    let config = Arc::new(config);

    log::info!(
        "Starting server on {}:{}",
        config.server.host,
        config.server.port
    );

    let pool = db::create_pool(&config.database.url, config.database.max_connections)
        .context("Failed to create database pool")?;
    let store: Arc<dyn VideoStore> = Arc::new(PgVideoStore::new(pool));
    let platform: Arc<dyn VideoPlatform> = Arc::new(YoutubeClient::new(&config.youtube));

    let _scheduler =
        services::scheduler::start_sync_schedule(config.clone(), platform.clone(), store.clone())
            .await
            .context("Failed to start sync scheduler")?;

    let c = config.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(c.clone()))
            .app_data(web::Data::from(store.clone()))
            .app_data(web::Data::from(platform.clone()))
            .wrap(actix_cors::Cors::permissive()) // Configure properly in production
            .wrap(Logger::default())
            .configure(api::configure)
    })
    .bind((config.server.host.clone(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
