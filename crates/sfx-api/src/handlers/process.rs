//! Video processing handler.

use axum::extract::State;
use axum::Json;
use sfx_models::{ProcessingResult, VideoRequest};
use tracing::{info, warn};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::security::{sanitize_prompt, validate_video_url};
use crate::state::AppState;

/// Generate ambient audio variations for a video.
///
/// Fails only when the download, the plan generation or the configuration
/// fails. Events whose synthesis attempts all failed are simply absent from
/// the response.
pub async fn process_video(
    State(state): State<AppState>,
    Json(request): Json<VideoRequest>,
) -> ApiResult<Json<ProcessingResult>> {
    let video_url = validate_video_url(&request.video_url).map_err(ApiError::bad_request)?;
    let request = VideoRequest::new(video_url, sanitize_prompt(&request.user_prompt));
    request
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    info!("Processing video: {}", request.video_url);

    let result = state.pipeline.process(&request).await.map_err(|e| {
        warn!(category = e.category(), "Processing failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(result))
}
