//! Inbound processing request.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A request to score a video with generated ambient audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct VideoRequest {
    /// Absolute URL of the source video
    #[validate(url, length(min = 1, max = 2048))]
    pub video_url: String,

    /// Free-text direction from the user (e.g. "make it stormy")
    pub user_prompt: String,
}

impl VideoRequest {
    pub fn new(video_url: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            video_url: video_url.into(),
            user_prompt: user_prompt.into(),
        }
    }
}
