//! Application state.

use std::sync::Arc;

use sfx_pipeline::{PipelineResult, PipelineSettings, SfxPipeline};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<SfxPipeline>,
}

impl AppState {
    /// Create state with the production pipeline.
    pub fn new(config: ApiConfig, settings: PipelineSettings) -> PipelineResult<Self> {
        let pipeline = SfxPipeline::from_settings(settings)?;
        Ok(Self::with_pipeline(config, pipeline))
    }

    /// Create state around an already assembled pipeline.
    pub fn with_pipeline(config: ApiConfig, pipeline: SfxPipeline) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
        }
    }
}
