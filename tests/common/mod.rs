#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use creator_insight::ml::NlpBackend;
use creator_insight::models::{
    AnalysisResult, Comment, CommentView, PendingComment, Scored, SentimentSummary,
};
use creator_insight::store::{CommentStore, MemoryStore};

/// Deterministic backend: sentiment follows a few marker words, and any text containing
/// "explode" makes the emotion stage fail.
#[derive(Default)]
pub struct ScriptedBackend {
    pub sentiment_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn calls(&self) -> usize {
        self.sentiment_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NlpBackend for ScriptedBackend {
    async fn detect_language(&self, _text: &str) -> Result<Option<String>> {
        Ok(Some("en".to_string()))
    }

    async fn translate(&self, text: &str, _source_lang: &str) -> Result<String> {
        Ok(text.to_string())
    }

    async fn sentiment(&self, text: &str) -> Result<Scored> {
        self.sentiment_calls.fetch_add(1, Ordering::SeqCst);
        let label = if text.contains("love") || text.contains("great") {
            "positive"
        } else if text.contains("hate") || text.contains("boring") {
            "negative"
        } else {
            "neutral"
        };
        Ok(Scored {
            label: label.to_string(),
            score: 0.876543,
        })
    }

    async fn emotion(&self, text: &str) -> Result<Scored> {
        if text.contains("explode") {
            return Err(anyhow!("emotion model rejected input"));
        }
        Ok(Scored {
            label: "joy".to_string(),
            score: 0.4444,
        })
    }

    async fn keywords(&self, text: &str, top_n: usize) -> Result<Vec<String>> {
        Ok(text.split_whitespace().take(top_n).map(str::to_string).collect())
    }
}

pub fn comment(scope: &str, id: &str, text: &str) -> Comment {
    Comment {
        comment_id: id.to_string(),
        scope_id: scope.to_string(),
        author: Some("viewer".to_string()),
        raw_text: text.to_string(),
        like_count: 0,
        published_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        parent_id: None,
    }
}

/// Wraps a [`MemoryStore`] and fails on command: every selection when `fail_select` is set,
/// and the n-th (1-based) `update_analysis` call when `fail_update_at` is set.
pub struct FlakyStore {
    pub inner: Arc<MemoryStore>,
    pub fail_select: bool,
    pub fail_update_at: Option<usize>,
    updates: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_select: false,
            fail_update_at: None,
            updates: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CommentStore for FlakyStore {
    async fn insert_comments(&self, comments: &[Comment]) -> Result<u64> {
        self.inner.insert_comments(comments).await
    }

    async fn select_unprocessed(&self, scope_id: &str) -> Result<Vec<PendingComment>> {
        if self.fail_select {
            return Err(anyhow!("db down"));
        }
        self.inner.select_unprocessed(scope_id).await
    }

    async fn update_analysis(&self, comment_id: &str, result: &AnalysisResult) -> Result<()> {
        let call = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_update_at == Some(call) {
            return Err(anyhow!("connection lost"));
        }
        self.inner.update_analysis(comment_id, result).await
    }

    async fn count_by_sentiment(&self, scope_id: &str) -> Result<SentimentSummary> {
        self.inner.count_by_sentiment(scope_id).await
    }

    async fn list_comments(&self, scope_id: &str, limit: i64) -> Result<Vec<CommentView>> {
        self.inner.list_comments(scope_id, limit).await
    }

    async fn latest_scope(&self) -> Result<Option<String>> {
        self.inner.latest_scope().await
    }
}
