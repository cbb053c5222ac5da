mod application;
mod config;
mod domain;
mod infrastructure;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::application::pipeline_service::TransformPipeline;
use crate::config::{Config, SeparatorKind, StorageKind};
use crate::domain::image_store::ImageStore;
use crate::domain::separator::Separator;
use crate::infrastructure::axum_handler::{
    edit_background_handler, get_image_handler, index_handler, remove_background_handler,
    resize_image_handler, upload_image_handler, AppState,
};
use crate::infrastructure::file_storage::LocalFileStorage;
use crate::infrastructure::image_processor::DefaultImageProcessor;
use crate::infrastructure::memory_storage::InMemoryImageStore;
use crate::infrastructure::passthrough_separator::PassthroughSeparator;
use crate::infrastructure::remove_bg_separator::RemoveBgSeparator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    config.validate()?;

    let state = build_state(&config).await?;
    let app = build_router(&config, state)?;

    let addr = config.socket_addr();
    log::info!("API server listening on http://{}", addr);
    // サーバーの開始
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .context("server terminated")?;
    Ok(())
}

async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let separator: Arc<dyn Separator + Send + Sync> = match config.separator {
        SeparatorKind::RemoveBg => Arc::new(RemoveBgSeparator::new(
            config.remove_bg_api_url.clone(),
            config.remove_bg_api_key.clone(),
        )),
        SeparatorKind::Passthrough => {
            log::warn!("Using passthrough separator: backgrounds will not be removed");
            Arc::new(PassthroughSeparator::new())
        }
    };

    let image_store: Arc<dyn ImageStore + Send + Sync> = match config.storage {
        StorageKind::Memory => Arc::new(InMemoryImageStore::new(config.memory_store_capacity)),
        StorageKind::File => Arc::new(
            LocalFileStorage::new(config.storage_dir.clone())
                .await
                .with_context(|| format!("cannot prepare {}", config.storage_dir.display()))?,
        ),
    };

    let pipeline = TransformPipeline::new(
        Arc::new(DefaultImageProcessor::new(config.max_dimension)),
        separator,
        config.pipeline_options(),
    );

    Ok(Arc::new(AppState {
        pipeline: Arc::new(pipeline),
        image_store,
        retry_policy: config.retry_policy(),
    }))
}

fn build_router(config: &Config, state: Arc<AppState>) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    let cors = match config.cors_origin_header()? {
        Some(origin) => cors.allow_origin(origin),
        None => cors.allow_origin(Any),
    };

    let mut router = Router::new()
        .route("/", get(index_handler))
        .route("/api/upload", post(upload_image_handler))
        .route("/api/remove-background", post(remove_background_handler))
        .route("/api/edit-background", post(edit_background_handler))
        .route("/api/resize-image", post(resize_image_handler))
        .route("/api/images/:id", get(get_image_handler));

    if let Some(dir) = &config.static_dir {
        log::info!("Serving frontend from {}", dir.display());
        router = router.fallback_service(ServeDir::new(dir));
    }

    Ok(router
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .with_state(state))
}
