//! YouTube Data API v3 comment ingestion.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::models::Comment;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const PAGE_SIZE: u32 = 100;

/// Supplies raw comments for a scope. Pagination and auth stay inside the implementation.
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch_comments(&self, scope_id: &str) -> Result<Vec<Comment>>;
}

/// Extracts a video id from a bare id, a `watch?v=` URL or a `youtu.be/` short link.
pub fn parse_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let id = if let Some((_, rest)) = input.rsplit_once("v=") {
        rest.split('&').next().unwrap_or_default()
    } else if let Some((_, rest)) = input.split_once("youtu.be/") {
        rest.split(['?', '&', '/']).next().unwrap_or_default()
    } else if input.contains('/') || input.contains('?') {
        return None;
    } else {
        input
    };

    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadListResponse {
    #[serde(default)]
    items: Vec<ThreadItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThreadItem {
    id: String,
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    author_display_name: Option<String>,
    #[serde(default)]
    text_display: String,
    #[serde(default)]
    like_count: i64,
    published_at: Option<DateTime<Utc>>,
}

impl ThreadItem {
    fn into_comment(self, video_id: &str) -> Comment {
        let snippet = self.snippet.top_level_comment.snippet;
        Comment {
            comment_id: self.id,
            scope_id: video_id.to_string(),
            author: snippet.author_display_name,
            raw_text: snippet.text_display,
            like_count: snippet.like_count,
            published_at: snippet.published_at,
            parent_id: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_page(&self, video_id: &str, page_token: Option<&str>) -> Result<ThreadListResponse> {
        let url = format!("{}/commentThreads", self.base_url);
        let page_size = PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", page_size.as_str()),
            ("textFormat", "plainText"),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .context("YouTube API request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("YouTube API returned {status}: {body}"));
        }

        response
            .json::<ThreadListResponse>()
            .await
            .context("parsing YouTube commentThreads response")
    }
}

#[async_trait]
impl CommentSource for YouTubeClient {
    async fn fetch_comments(&self, video_id: &str) -> Result<Vec<Comment>> {
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(video_id, page_token.as_deref()).await?;
            debug!(video_id, items = page.items.len(), "fetched comment page");
            comments.extend(page.items.into_iter().map(|item| item.into_comment(video_id)));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!(video_id, count = comments.len(), "fetched comments");
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_video_id_variants() {
        assert_eq!(parse_video_id("dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            parse_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(parse_video_id("https://example.com/video/1"), None);
        assert_eq!(parse_video_id("  "), None);
    }

    fn thread(id: &str, text: &str) -> serde_json::Value {
        json!({
            "id": id,
            "snippet": {
                "topLevelComment": {
                    "snippet": {
                        "authorDisplayName": "viewer",
                        "textDisplay": text,
                        "likeCount": 3,
                        "publishedAt": "2024-05-01T10:00:00Z"
                    }
                }
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_follows_page_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [thread("c3", "third")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [thread("c1", "first"), thread("c2", "second")],
                "nextPageToken": "p2"
            })))
            .mount(&server)
            .await;

        let client = YouTubeClient::new("key", server.uri());
        let comments = client.fetch_comments("vid1").await.unwrap();

        let ids: Vec<_> = comments.iter().map(|c| c.comment_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert!(comments.iter().all(|c| c.scope_id == "vid1" && c.parent_id.is_none()));
        assert_eq!(comments[0].like_count, 3);
        assert!(comments[0].published_at.is_some());
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quotaExceeded"))
            .mount(&server)
            .await;

        let client = YouTubeClient::new("key", server.uri());
        let err = client.fetch_comments("vid1").await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }
}
