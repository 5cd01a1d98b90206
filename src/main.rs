use std::sync::Arc;

use creator_insight::api::{self, AppState};
use creator_insight::config::AppConfig;
use creator_insight::db::{self, PgCommentStore};
use creator_insight::pipeline::CommentAnalyzer;
use creator_insight::worker::BatchProcessor;
use creator_insight::youtube::YouTubeClient;
use creator_insight::{build_backend, init_tracing};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    let api_key = config.require_youtube_key()?.to_string();

    let pool = db::connect(&config.database_url, config.db_max_connections).await?;
    db::init_db(&pool).await?;

    let store = Arc::new(PgCommentStore::new(pool));
    let backend = build_backend(&config)?;
    info!(backend = ?config.backend, translate = ?config.translate_languages, "NLP backend ready");

    let analyzer = Arc::new(CommentAnalyzer::new(backend, config.pipeline()));
    let state = Arc::new(AppState {
        store: store.clone(),
        processor: BatchProcessor::new(store, analyzer),
        source: Arc::new(YouTubeClient::new(api_key, config.youtube_api_base.clone())),
    });

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
