//! Mirelo request/response types.

use serde::Deserialize;

/// Successful response body from `video-to-sfx`.
///
/// The service has returned both shapes over time: a list of output paths
/// and a single `audio_url`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SfxResponse {
    #[serde(default)]
    pub output_paths: Option<Vec<String>>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl SfxResponse {
    /// URL of the generated audio.
    ///
    /// A non-empty `output_paths` wins (first element); otherwise
    /// `audio_url`. Empty strings count as absent.
    pub fn audio_url(&self) -> Option<&str> {
        let url = match self.output_paths.as_deref() {
            Some([first, ..]) => Some(first.as_str()),
            _ => self.audio_url.as_deref(),
        };
        url.filter(|u| !u.is_empty())
    }
}
