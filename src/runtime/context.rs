use std::sync::Arc;

use tracing::warn;

use crate::config::AppConfig;

use super::{
    AnalysisService, GeminiBackend, GeneService, NarrativeBackend, NarrativeService, SlideService,
};

/// Collaborators shared by the viewer, the CLI and background jobs.
#[derive(Debug, Clone)]
pub struct AppContext {
    analysis_service: AnalysisService,
    narrative_service: NarrativeService,
    gene_service: GeneService,
    slide_service: SlideService,
}

impl Default for AppContext {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl AppContext {
    pub fn from_config(config: &AppConfig) -> Self {
        let gemini = GeminiBackend::new(&config.narrative);
        if !gemini.has_api_key() {
            warn!(
                env = %config.narrative.api_key_env,
                "API key not set; narrative enrichment will return a degraded result"
            );
        }
        Self::with_narrative_backend(config, Arc::new(gemini))
    }

    pub fn with_narrative_backend(config: &AppConfig, backend: Arc<dyn NarrativeBackend>) -> Self {
        Self {
            analysis_service: AnalysisService::new(&config.analysis),
            narrative_service: NarrativeService::new(backend),
            gene_service: GeneService::new(&config.gene_search),
            slide_service: SlideService::new(config.slides.timeout()),
        }
    }

    pub fn analysis(&self) -> &AnalysisService {
        &self.analysis_service
    }

    pub fn narrative(&self) -> &NarrativeService {
        &self.narrative_service
    }

    pub fn genes(&self) -> &GeneService {
        &self.gene_service
    }

    pub fn slides(&self) -> &SlideService {
        &self.slide_service
    }
}
