//! Pipeline configuration.

use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};

/// Default generative model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-latest";

/// Default Gemini REST base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model version tag sent with every synthesis request.
pub const DEFAULT_MIRELO_MODEL_VERSION: &str = "latest";

/// Settings for one pipeline instance.
///
/// Credentials are optional here so the service can start and report what is
/// missing; [`PipelineSettings::credentials`] enforces them per request.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Gemini API key
    pub gemini_api_key: Option<String>,
    /// Mirelo API key
    pub mirelo_api_key: Option<String>,
    /// Gemini model used for planning
    pub gemini_model: String,
    /// Gemini REST base URL
    pub gemini_base_url: String,
    /// Mirelo `video-to-sfx` endpoint
    pub mirelo_endpoint: String,
    /// Model version tag for synthesis requests
    pub mirelo_model_version: String,
    /// Video download timeout
    pub fetch_timeout: Duration,
    /// Plan generation timeout
    pub generation_timeout: Duration,
    /// Timeout for each synthesis attempt
    pub synthesis_timeout: Duration,
}

/// Both credentials, borrowed from the settings.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub gemini_api_key: &'a str,
    pub mirelo_api_key: &'a str,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            mirelo_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            mirelo_endpoint: sfx_mirelo::client::DEFAULT_ENDPOINT.to_string(),
            mirelo_model_version: DEFAULT_MIRELO_MODEL_VERSION.to_string(),
            fetch_timeout: Duration::from_secs(60),
            generation_timeout: Duration::from_secs(120),
            synthesis_timeout: Duration::from_secs(60),
        }
    }
}

impl PipelineSettings {
    /// Create settings from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };
        let credential = |primary: &str, legacy: &str| {
            lookup(primary)
                .or_else(|| lookup(legacy))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            gemini_api_key: credential("GEMINI_API_KEY", "GEMINI"),
            mirelo_api_key: credential("MIRELO_API_KEY", "MIRELO"),
            gemini_model: lookup("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            mirelo_endpoint: lookup("MIRELO_API_URL").unwrap_or(defaults.mirelo_endpoint),
            mirelo_model_version: lookup("MIRELO_MODEL_VERSION")
                .unwrap_or(defaults.mirelo_model_version),
            fetch_timeout: secs("VIDEO_FETCH_TIMEOUT", defaults.fetch_timeout),
            generation_timeout: secs("GEMINI_TIMEOUT", defaults.generation_timeout),
            synthesis_timeout: secs("MIRELO_TIMEOUT", defaults.synthesis_timeout),
        }
    }

    pub fn with_credentials(mut self, gemini: impl Into<String>, mirelo: impl Into<String>) -> Self {
        self.gemini_api_key = Some(gemini.into());
        self.mirelo_api_key = Some(mirelo.into());
        self
    }

    pub fn gemini_key_set(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    pub fn mirelo_key_set(&self) -> bool {
        self.mirelo_api_key.is_some()
    }

    /// Both credentials, or a configuration error naming the first missing one.
    pub fn credentials(&self) -> PipelineResult<Credentials<'_>> {
        let gemini_api_key = self
            .gemini_api_key
            .as_deref()
            .ok_or_else(|| PipelineError::config("GEMINI_API_KEY not set"))?;
        let mirelo_api_key = self
            .mirelo_api_key
            .as_deref()
            .ok_or_else(|| PipelineError::config("MIRELO_API_KEY not set"))?;

        Ok(Credentials {
            gemini_api_key,
            mirelo_api_key,
        })
    }
}
