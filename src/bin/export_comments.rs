//! Dumps stored comments to a JSON file: `export_comments [output.json]`.

use anyhow::Context;
use creator_insight::config::AppConfig;
use creator_insight::db::{self, PgCommentStore};
use creator_insight::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = AppConfig::from_env()?;
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "comments_sample1.json".to_string());

    let pool = db::connect(&config.database_url, 1).await?;
    let store = PgCommentStore::new(pool);
    let (total, records) = store.export_rows().await?;
    let exported = records.len();

    let output = serde_json::json!({
        "total_comments": total,
        "sample_comments": records,
    });
    let body = serde_json::to_string_pretty(&output)?;
    std::fs::write(&output_path, body).with_context(|| format!("writing {output_path}"))?;

    info!(exported, total, path = %output_path, "export complete");
    Ok(())
}
