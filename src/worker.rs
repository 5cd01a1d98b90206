use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{BatchSummary, Comment, PendingComment};
use crate::pipeline::CommentAnalyzer;
use crate::store::CommentStore;

/// State of one in-flight batch. Dropped once the summary is built.
#[derive(Debug)]
pub struct BatchRun {
    pub run_id: Uuid,
    pub scope_id: String,
    pub selected: Vec<PendingComment>,
    pub inserted: u64,
    pub processed: u64,
    pub failed: u64,
}

impl BatchRun {
    fn new(scope_id: &str, inserted: u64, selected: Vec<PendingComment>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            scope_id: scope_id.to_string(),
            selected,
            inserted,
            processed: 0,
            failed: 0,
        }
    }
}

/// Incremental processor: analyzes only comments not yet marked processed, one at a time,
/// committing each result before moving on.
pub struct BatchProcessor {
    store: Arc<dyn CommentStore>,
    analyzer: Arc<CommentAnalyzer>,
}

impl BatchProcessor {
    pub fn new(store: Arc<dyn CommentStore>, analyzer: Arc<CommentAnalyzer>) -> Self {
        Self { store, analyzer }
    }

    /// Stores newly fetched comments (duplicates are skipped), then processes the scope.
    pub async fn ingest_and_process(&self, scope_id: &str, comments: &[Comment]) -> Result<BatchSummary> {
        let inserted = self
            .store
            .insert_comments(comments)
            .await
            .with_context(|| format!("saving comments for {scope_id}"))?;
        info!(scope_id, fetched = comments.len(), inserted, "comments stored");
        self.run(scope_id, inserted).await
    }

    pub async fn process_scope(&self, scope_id: &str) -> Result<BatchSummary> {
        self.run(scope_id, 0).await
    }

    async fn run(&self, scope_id: &str, inserted: u64) -> Result<BatchSummary> {
        let selected = self.store.select_unprocessed(scope_id).await?;
        let mut run = BatchRun::new(scope_id, inserted, selected);
        info!(run_id = %run.run_id, scope_id, pending = run.selected.len(), "batch started");

        for pending in &run.selected {
            match self.analyzer.analyze(&pending.raw_text).await {
                Ok(result) => {
                    self.store
                        .update_analysis(&pending.comment_id, &result)
                        .await?;
                    run.processed += 1;
                    info!(
                        run_id = %run.run_id,
                        comment_id = %pending.comment_id,
                        sentiment = %result.sentiment_label,
                        comment_type = %result.comment_type,
                        "processed comment"
                    );
                }
                Err(failure) => {
                    run.failed += 1;
                    warn!(
                        run_id = %run.run_id,
                        comment_id = %pending.comment_id,
                        stage = %failure.stage,
                        error = %failure,
                        "skipping comment, it stays unprocessed"
                    );
                }
            }
        }

        let sentiment_summary = self.store.count_by_sentiment(scope_id).await?;
        info!(
            run_id = %run.run_id,
            scope_id,
            processed = run.processed,
            failed = run.failed,
            ?sentiment_summary,
            "batch finished"
        );

        Ok(BatchSummary {
            scope_id: run.scope_id,
            inserted_count: run.inserted,
            processed_count: run.processed,
            failed_count: run.failed,
            sentiment_summary,
        })
    }
}
