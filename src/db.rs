use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::Row;
use tracing::info;

use crate::models::{AnalysisResult, Comment, CommentView, PendingComment, SentimentSummary};
use crate::store::CommentStore;

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("connecting to PostgreSQL")
}

pub async fn init_db(pool: &PgPool) -> Result<()> {
    // 1. Base schema: one row per platform comment
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id SERIAL PRIMARY KEY,
            video_id VARCHAR NOT NULL,
            comment_id VARCHAR NOT NULL UNIQUE,
            author TEXT,
            text TEXT NOT NULL,
            like_count BIGINT NOT NULL DEFAULT 0,
            published_at TIMESTAMPTZ,
            parent_id VARCHAR
        );
        "#,
    )
    .execute(pool)
    .await?;

    // 2. Analysis columns, added separately so older tables pick them up
    let columns = [
        "processed BOOLEAN DEFAULT FALSE",
        "language VARCHAR(16)",
        "translated_text TEXT",
        "sentiment TEXT",
        "sentiment_score DOUBLE PRECISION",
        "emotion TEXT",
        "emotion_score DOUBLE PRECISION",
        "keywords JSONB",
        "comment_type TEXT",
    ];
    for column in columns {
        sqlx::query(&format!("ALTER TABLE comments ADD COLUMN IF NOT EXISTS {column};"))
            .execute(pool)
            .await
            .with_context(|| format!("adding column `{column}`"))?;
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS comments_video_id_idx ON comments (video_id);")
        .execute(pool)
        .await?;

    info!("comments schema ready");
    Ok(())
}

/// [`CommentStore`] backed by the `comments` table.
#[derive(Debug, Clone)]
pub struct PgCommentStore {
    pool: PgPool,
}

impl PgCommentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Total row count and every comment's export fields, oldest first.
    pub async fn export_rows(&self) -> Result<(i64, Vec<serde_json::Value>)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments;")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            "SELECT author, text, like_count, published_at FROM comments ORDER BY id;",
        )
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(|row| {
                let published_at: Option<chrono::DateTime<chrono::Utc>> = row.get("published_at");
                serde_json::json!({
                    "author": row.get::<Option<String>, _>("author"),
                    "text": row.get::<String, _>("text"),
                    "like_count": row.get::<i64, _>("like_count"),
                    "published_at": published_at.map(|t| t.to_rfc3339()),
                })
            })
            .collect();

        Ok((total, records))
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn insert_comments(&self, comments: &[Comment]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for c in comments {
            let result = sqlx::query(
                r#"
                INSERT INTO comments
                    (video_id, comment_id, author, text, like_count, published_at, parent_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (comment_id) DO NOTHING;
                "#,
            )
            .bind(&c.scope_id)
            .bind(&c.comment_id)
            .bind(&c.author)
            .bind(&c.raw_text)
            .bind(c.like_count)
            .bind(c.published_at)
            .bind(&c.parent_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("inserting comment {}", c.comment_id))?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;
        Ok(inserted)
    }

    async fn select_unprocessed(&self, scope_id: &str) -> Result<Vec<PendingComment>> {
        let rows = sqlx::query(
            "SELECT comment_id, text FROM comments WHERE video_id = $1 AND (processed IS NULL OR processed = FALSE) ORDER BY id;",
        )
        .bind(scope_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("selecting unprocessed comments for {scope_id}"))?;

        Ok(rows
            .iter()
            .map(|row| PendingComment {
                comment_id: row.get("comment_id"),
                raw_text: row.get("text"),
            })
            .collect())
    }

    async fn update_analysis(&self, comment_id: &str, result: &AnalysisResult) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE comments
            SET processed = TRUE,
                language = $2,
                translated_text = $3,
                sentiment = $4,
                sentiment_score = $5,
                emotion = $6,
                emotion_score = $7,
                keywords = $8,
                comment_type = $9
            WHERE comment_id = $1;
            "#,
        )
        .bind(comment_id)
        .bind(&result.language)
        .bind(&result.translated_text)
        .bind(&result.sentiment_label)
        .bind(result.sentiment_score)
        .bind(&result.emotion_label)
        .bind(result.emotion_score)
        .bind(Json(&result.keywords))
        .bind(result.comment_type.as_str())
        .execute(&self.pool)
        .await
        .with_context(|| format!("saving analysis for comment {comment_id}"))?;
        Ok(())
    }

    async fn count_by_sentiment(&self, scope_id: &str) -> Result<SentimentSummary> {
        let rows = sqlx::query(
            "SELECT sentiment, COUNT(*) AS count FROM comments WHERE video_id = $1 AND sentiment IS NOT NULL GROUP BY sentiment;",
        )
        .bind(scope_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| (row.get::<String, _>("sentiment"), row.get::<i64, _>("count")))
            .collect())
    }

    async fn list_comments(&self, scope_id: &str, limit: i64) -> Result<Vec<CommentView>> {
        let rows = sqlx::query(
            r#"
            SELECT id, comment_id, author, text, like_count, sentiment, emotion, keywords, comment_type
            FROM comments WHERE video_id = $1 ORDER BY id DESC LIMIT $2;
            "#,
        )
        .bind(scope_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let keywords: Option<Json<Vec<String>>> = row.get("keywords");
                CommentView {
                    id: i64::from(row.get::<i32, _>("id")),
                    comment_id: row.get("comment_id"),
                    author: row.get("author"),
                    text: row.get("text"),
                    like_count: row.get("like_count"),
                    sentiment: row.get("sentiment"),
                    emotion: row.get("emotion"),
                    keywords: keywords.map(|k| k.0),
                    comment_type: row.get("comment_type"),
                }
            })
            .collect())
    }

    async fn latest_scope(&self) -> Result<Option<String>> {
        let scope: Option<String> =
            sqlx::query_scalar("SELECT video_id FROM comments ORDER BY id DESC LIMIT 1;")
                .fetch_optional(&self.pool)
                .await?;
        Ok(scope)
    }
}
