//! Analyzes any unprocessed comments of the most recently ingested video.

use std::sync::Arc;

use creator_insight::config::AppConfig;
use creator_insight::db::{self, PgCommentStore};
use creator_insight::pipeline::CommentAnalyzer;
use creator_insight::store::CommentStore;
use creator_insight::worker::BatchProcessor;
use creator_insight::{build_backend, init_tracing};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = AppConfig::from_env()?;

    let pool = db::connect(&config.database_url, 1).await?;
    db::init_db(&pool).await?;
    let store = Arc::new(PgCommentStore::new(pool));

    let Some(video_id) = store.latest_scope().await? else {
        info!("No comments stored yet. Nothing to process.");
        return Ok(());
    };
    info!(video_id = %video_id, "latest video detected");

    let analyzer = Arc::new(CommentAnalyzer::new(build_backend(&config)?, config.pipeline()));
    let summary = BatchProcessor::new(store, analyzer)
        .process_scope(&video_id)
        .await?;

    println!("Sentiment summary for video {}:", summary.scope_id);
    for (sentiment, count) in &summary.sentiment_summary {
        println!("   {:<10} -> {} comments", sentiment, count);
    }
    println!(
        "Processed {} new comments ({} failed).",
        summary.processed_count, summary.failed_count
    );

    Ok(())
}
