//! HTTP handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::models::{BatchSummary, CommentType, CommentView, SentimentSummary};
use crate::store::CommentStore;
use crate::worker::BatchProcessor;
use crate::youtube::{parse_video_id, CommentSource};

pub struct AppState {
    pub store: Arc<dyn CommentStore>,
    pub processor: BatchProcessor,
    pub source: Arc<dyn CommentSource>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessRequest {
    pub youtube_url: Option<String>,
    pub video_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InsightsResponse {
    pub video_id: String,
    #[schema(value_type = std::collections::BTreeMap<String, i64>)]
    pub sentiment_counts: SentimentSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentsResponse {
    pub video_id: String,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommentsQuery {
    /// Maximum number of comments, newest first (default 50, capped at 1000).
    pub limit: Option<i64>,
}

const MAX_COMMENT_LIMIT: i64 = 1000;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

fn internal(context: &str, err: anyhow::Error) -> ApiError {
    error!(error = ?err, "{context}");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{context}: {err:#}"))
}

#[derive(OpenApi)]
#[openapi(
    paths(root, process_video, analyze_video, video_insights, video_comments),
    components(schemas(
        ProcessRequest,
        StatusResponse,
        ErrorResponse,
        InsightsResponse,
        CommentsResponse,
        BatchSummary,
        CommentView,
        CommentType
    )),
    tags((name = "videos", description = "Comment ingestion and insights"))
)]
pub struct ApiDoc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(root))
        .route("/videos/process", post(process_video))
        .route("/videos/:video_id/analyze", post(analyze_video))
        .route("/videos/:video_id/insights", get(video_insights))
        .route("/videos/:video_id/comments", get(video_comments))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(get, path = "/", responses((status = 200, body = StatusResponse)))]
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "CreatorInsight API is running. Use /swagger-ui for the API docs.".to_string(),
    })
}

/// Fetch a video's comments, store them, analyze the new ones and return the summary.
#[utoipa::path(
    post,
    path = "/videos/process",
    tag = "videos",
    request_body = ProcessRequest,
    responses(
        (status = 200, body = BatchSummary),
        (status = 400, body = ErrorResponse),
        (status = 500, body = ErrorResponse)
    )
)]
pub async fn process_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<BatchSummary>, ApiError> {
    let video_id = match (req.video_id.filter(|v| !v.trim().is_empty()), req.youtube_url) {
        (Some(id), _) => id.trim().to_string(),
        (None, Some(url)) => parse_video_id(&url).ok_or_else(|| {
            api_error(StatusCode::BAD_REQUEST, "Could not parse video_id from URL")
        })?,
        (None, None) => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Provide either video_id or youtube_url",
            ))
        }
    };

    let comments = state
        .source
        .fetch_comments(&video_id)
        .await
        .map_err(|e| internal("Failed to fetch comments", e))?;

    let summary = state
        .processor
        .ingest_and_process(&video_id, &comments)
        .await
        .map_err(|e| internal("Failed during NLP processing", e))?;

    Ok(Json(summary))
}

/// Analyze comments already stored for a video without fetching new ones.
#[utoipa::path(
    post,
    path = "/videos/{video_id}/analyze",
    tag = "videos",
    params(("video_id" = String, Path, description = "YouTube video id")),
    responses((status = 200, body = BatchSummary), (status = 500, body = ErrorResponse))
)]
pub async fn analyze_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<BatchSummary>, ApiError> {
    state
        .processor
        .process_scope(&video_id)
        .await
        .map(Json)
        .map_err(|e| internal("Failed during NLP processing", e))
}

#[utoipa::path(
    get,
    path = "/videos/{video_id}/insights",
    tag = "videos",
    params(("video_id" = String, Path, description = "YouTube video id")),
    responses((status = 200, body = InsightsResponse), (status = 500, body = ErrorResponse))
)]
pub async fn video_insights(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<InsightsResponse>, ApiError> {
    let sentiment_counts = state
        .store
        .count_by_sentiment(&video_id)
        .await
        .map_err(|e| internal("Failed to load insights", e))?;
    Ok(Json(InsightsResponse {
        video_id,
        sentiment_counts,
    }))
}

#[utoipa::path(
    get,
    path = "/videos/{video_id}/comments",
    tag = "videos",
    params(("video_id" = String, Path, description = "YouTube video id"), CommentsQuery),
    responses((status = 200, body = CommentsResponse), (status = 500, body = ErrorResponse))
)]
pub async fn video_comments(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    Query(query): Query<CommentsQuery>,
) -> Result<Json<CommentsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(50).clamp(0, MAX_COMMENT_LIMIT);
    let comments = state
        .store
        .list_comments(&video_id, limit)
        .await
        .map_err(|e| internal("Failed to load comments", e))?;
    Ok(Json(CommentsResponse { video_id, comments }))
}
