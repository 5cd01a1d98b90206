//! Persistence boundary for comments and their analysis.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::{AnalysisResult, Comment, CommentView, PendingComment, SentimentSummary};

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Inserts new comments. Duplicate `comment_id`s are ignored. Returns how many rows were new.
    async fn insert_comments(&self, comments: &[Comment]) -> Result<u64>;

    /// Comments in `scope_id` whose processed flag is false or unset.
    async fn select_unprocessed(&self, scope_id: &str) -> Result<Vec<PendingComment>>;

    /// Writes every analysis field and sets the processed flag in one step.
    async fn update_analysis(&self, comment_id: &str, result: &AnalysisResult) -> Result<()>;

    /// Sentiment label counts over the analyzed comments of a scope.
    async fn count_by_sentiment(&self, scope_id: &str) -> Result<SentimentSummary>;

    /// Newest comments first.
    async fn list_comments(&self, scope_id: &str, limit: i64) -> Result<Vec<CommentView>>;

    /// Scope of the most recently ingested comment.
    async fn latest_scope(&self) -> Result<Option<String>>;
}

#[derive(Debug, Clone)]
struct StoredComment {
    id: i64,
    comment: Comment,
    analysis: Option<AnalysisResult>,
}

/// In-process store with the same semantics as the Postgres one. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<StoredComment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredComment>>> {
        self.rows.lock().map_err(|_| anyhow!("memory store lock poisoned"))
    }

    pub fn is_processed(&self, comment_id: &str) -> bool {
        self.rows()
            .map(|rows| {
                rows.iter()
                    .any(|r| r.comment.comment_id == comment_id && r.analysis.is_some())
            })
            .unwrap_or(false)
    }

    pub fn analysis(&self, comment_id: &str) -> Option<AnalysisResult> {
        self.rows().ok()?.iter().find_map(|r| {
            if r.comment.comment_id == comment_id {
                r.analysis.clone()
            } else {
                None
            }
        })
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert_comments(&self, comments: &[Comment]) -> Result<u64> {
        let mut rows = self.rows()?;
        let mut inserted = 0;
        for comment in comments {
            if rows.iter().any(|r| r.comment.comment_id == comment.comment_id) {
                continue;
            }
            let id = rows.len() as i64 + 1;
            rows.push(StoredComment {
                id,
                comment: comment.clone(),
                analysis: None,
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn select_unprocessed(&self, scope_id: &str) -> Result<Vec<PendingComment>> {
        Ok(self
            .rows()?
            .iter()
            .filter(|r| r.comment.scope_id == scope_id && r.analysis.is_none())
            .map(|r| PendingComment {
                comment_id: r.comment.comment_id.clone(),
                raw_text: r.comment.raw_text.clone(),
            })
            .collect())
    }

    async fn update_analysis(&self, comment_id: &str, result: &AnalysisResult) -> Result<()> {
        let mut rows = self.rows()?;
        let row = rows
            .iter_mut()
            .find(|r| r.comment.comment_id == comment_id)
            .ok_or_else(|| anyhow!("comment {comment_id} not found"))?;
        row.analysis = Some(result.clone());
        Ok(())
    }

    async fn count_by_sentiment(&self, scope_id: &str) -> Result<SentimentSummary> {
        let mut summary = SentimentSummary::new();
        for row in self.rows()?.iter().filter(|r| r.comment.scope_id == scope_id) {
            if let Some(analysis) = &row.analysis {
                *summary.entry(analysis.sentiment_label.clone()).or_insert(0) += 1;
            }
        }
        Ok(summary)
    }

    async fn list_comments(&self, scope_id: &str, limit: i64) -> Result<Vec<CommentView>> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(0);
        Ok(self
            .rows()?
            .iter()
            .rev()
            .filter(|r| r.comment.scope_id == scope_id)
            .take(limit)
            .map(|r| CommentView {
                id: r.id,
                comment_id: r.comment.comment_id.clone(),
                author: r.comment.author.clone(),
                text: r.comment.raw_text.clone(),
                like_count: r.comment.like_count,
                sentiment: r.analysis.as_ref().map(|a| a.sentiment_label.clone()),
                emotion: r.analysis.as_ref().map(|a| a.emotion_label.clone()),
                keywords: r.analysis.as_ref().map(|a| a.keywords.clone()),
                comment_type: r.analysis.as_ref().map(|a| a.comment_type.to_string()),
            })
            .collect())
    }

    async fn latest_scope(&self) -> Result<Option<String>> {
        Ok(self.rows()?.last().map(|r| r.comment.scope_id.clone()))
    }
}
