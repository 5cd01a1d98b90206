//! Domain records shared by the pipeline, the store and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

/// A single ingested comment, keyed by the platform's comment id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Comment {
    pub comment_id: String,
    /// The video the comment belongs to.
    pub scope_id: String,
    pub author: Option<String>,
    pub raw_text: String,
    pub like_count: i64,
    pub published_at: Option<DateTime<Utc>>,
    /// Reply threading; ingestion only stores top-level comments.
    pub parent_id: Option<String>,
}

/// A comment selected for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingComment {
    pub comment_id: String,
    pub raw_text: String,
}

/// Rule-based comment category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CommentType {
    Question,
    Suggestion,
    Praise,
    Criticism,
    #[serde(rename = "Spam/Promotion")]
    SpamPromotion,
    General,
}

impl CommentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentType::Question => "Question",
            CommentType::Suggestion => "Suggestion",
            CommentType::Praise => "Praise",
            CommentType::Criticism => "Criticism",
            CommentType::SpamPromotion => "Spam/Promotion",
            CommentType::General => "General",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Question" => Some(CommentType::Question),
            "Suggestion" => Some(CommentType::Suggestion),
            "Praise" => Some(CommentType::Praise),
            "Criticism" => Some(CommentType::Criticism),
            "Spam/Promotion" => Some(CommentType::SpamPromotion),
            "General" => Some(CommentType::General),
            _ => None,
        }
    }
}

impl fmt::Display for CommentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label with its model confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scored {
    pub label: String,
    pub score: f64,
}

/// Fully populated analysis of one comment. There is no partial form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub language: String,
    pub cleaned_text: String,
    /// Working text: the translation when one happened, otherwise the cleaned text.
    pub translated_text: String,
    #[serde(rename = "sentiment")]
    pub sentiment_label: String,
    pub sentiment_score: f64,
    #[serde(rename = "emotion")]
    pub emotion_label: String,
    pub emotion_score: f64,
    pub keywords: Vec<String>,
    pub comment_type: CommentType,
}

/// Sentiment label → comment count for one scope.
pub type SentimentSummary = BTreeMap<String, i64>;

/// Outcome of one batch run over a scope.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BatchSummary {
    #[serde(rename = "video_id")]
    pub scope_id: String,
    #[serde(rename = "inserted_comments")]
    pub inserted_count: u64,
    #[serde(rename = "processed_comments")]
    pub processed_count: u64,
    #[serde(rename = "failed_comments")]
    pub failed_count: u64,
    #[serde(rename = "sentiment_counts")]
    #[schema(value_type = BTreeMap<String, i64>)]
    pub sentiment_summary: SentimentSummary,
}

/// Row shape returned by the comment listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentView {
    pub id: i64,
    pub comment_id: String,
    pub author: Option<String>,
    pub text: String,
    pub like_count: i64,
    pub sentiment: Option<String>,
    pub emotion: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub comment_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_type_round_trips_through_persisted_name() {
        for ty in [
            CommentType::Question,
            CommentType::Suggestion,
            CommentType::Praise,
            CommentType::Criticism,
            CommentType::SpamPromotion,
            CommentType::General,
        ] {
            assert_eq!(CommentType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(
            serde_json::to_string(&CommentType::SpamPromotion).unwrap(),
            "\"Spam/Promotion\""
        );
    }

    #[test]
    fn analysis_result_uses_persisted_field_names() {
        let result = AnalysisResult {
            language: "en".to_string(),
            cleaned_text: "nice video".to_string(),
            translated_text: "nice video".to_string(),
            sentiment_label: "positive".to_string(),
            sentiment_score: 0.912,
            emotion_label: "joy".to_string(),
            emotion_score: 0.8,
            keywords: vec!["video".to_string()],
            comment_type: CommentType::Praise,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["sentiment"], "positive");
        assert_eq!(json["emotion"], "joy");
        assert_eq!(json["comment_type"], "Praise");
    }
}
