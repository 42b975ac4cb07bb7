mod analysis_service;
mod context;
mod error;
mod gemini;
mod gene_service;
mod jobs;
mod narrative_service;
mod slide_service;

pub use analysis_service::AnalysisService;
pub use context::AppContext;
pub use error::{AppError, Result};
pub use gemini::{GeminiBackend, build_prompt, extract_text, request_body, response_schema};
pub use gene_service::{GeneDataError, GeneDataset, GeneService, normalize_symbol};
pub use jobs::{JobEvent, JobKind, JobOutcome, JobRequest, JobRunner, JobTicket, execute};
pub use narrative_service::{
    NarrativeBackend, NarrativeError, NarrativeOutcome, NarrativeService, parse_narrative,
};
pub use slide_service::{SlideError, SlideImage, SlideService};
