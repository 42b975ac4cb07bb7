use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::model::{CellTypeFinding, HpcSummary, NarrativeResult};

pub type NarrativeOutcome = std::result::Result<NarrativeResult, NarrativeError>;

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("no API key configured for the narrative service")]
    MissingApiKey,

    #[error("narrative transport failure: {0}")]
    Transport(String),

    #[error("narrative service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("narrative response contained no candidate text")]
    EmptyResponse,

    #[error("narrative response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("narrative response failed validation: {0}")]
    Invalid(String),
}

/// Remote completion that turns an HPC summary into a narrative.
pub trait NarrativeBackend: Send + Sync {
    fn name(&self) -> &str;
    fn generate(&self, summary: &HpcSummary) -> NarrativeOutcome;
}

/// Parses and validates the JSON text produced by a completion.
pub fn parse_narrative(text: &str) -> NarrativeOutcome {
    let mut result: NarrativeResult = serde_json::from_str(text.trim())?;
    result.confidence = checked_percent("confidence", result.confidence)?;
    for finding in &mut result.potential_cell_types {
        finding.prevalence =
            checked_percent(&format!("prevalence of {}", finding.name), finding.prevalence)?;
    }
    result
        .potential_cell_types
        .retain(|finding: &CellTypeFinding| !finding.name.trim().is_empty());
    Ok(result)
}

fn checked_percent(field: &str, value: f64) -> Result<f64, NarrativeError> {
    if !value.is_finite() {
        return Err(NarrativeError::Invalid(format!("{field} is not a finite number")));
    }
    Ok(value.clamp(0.0, 100.0))
}

/// Enrichment entry point; failures never escape, they degrade.
#[derive(Clone)]
pub struct NarrativeService {
    backend: Arc<dyn NarrativeBackend>,
}

impl fmt::Debug for NarrativeService {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("NarrativeService")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl NarrativeService {
    pub fn new(backend: Arc<dyn NarrativeBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn enrich(&self, summary: &HpcSummary) -> NarrativeResult {
        match self.backend.generate(summary) {
            Ok(result) => {
                info!(
                    backend = self.backend.name(),
                    confidence = result.confidence,
                    "narrative enrichment completed"
                );
                result
            }
            Err(error) => {
                warn!(backend = self.backend.name(), %error, "narrative enrichment failed");
                NarrativeResult::degraded()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{
        NarrativeBackend, NarrativeError, NarrativeOutcome, NarrativeService, parse_narrative,
    };
    use crate::model::{DEGRADED_SUMMARY, HpcSummary, Point, SelectionRect};

    struct FailingBackend;

    impl NarrativeBackend for FailingBackend {
        fn name(&self) -> &str {
            "failing"
        }

        fn generate(&self, _summary: &HpcSummary) -> NarrativeOutcome {
            Err(NarrativeError::Transport("connection refused".to_string()))
        }
    }

    struct CannedBackend(&'static str);

    impl NarrativeBackend for CannedBackend {
        fn name(&self) -> &str {
            "canned"
        }

        fn generate(&self, _summary: &HpcSummary) -> NarrativeOutcome {
            parse_narrative(self.0)
        }
    }

    fn summary() -> HpcSummary {
        HpcSummary {
            region: SelectionRect::at(Point::new(0.0, 0.0)),
            cell_count: 10,
            top_genes: Vec::new(),
            spatial_clusters: 3,
        }
    }

    #[test]
    fn failing_backend_degrades() {
        let service = NarrativeService::new(Arc::new(FailingBackend));
        let result = service.enrich(&summary());
        assert_eq!(result.confidence, 0.0);
        assert!(result.potential_cell_types.is_empty());
        assert_eq!(result.summary, DEGRADED_SUMMARY);
    }

    #[test]
    fn malformed_reply_degrades() {
        let service = NarrativeService::new(Arc::new(CannedBackend("{\"summary\": 3")));
        assert!(service.enrich(&summary()).is_degraded());
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let result = parse_narrative(
            r#"{"summary": "s", "confidence": 140,
                "potentialCellTypes": [{"name": "T cell", "prevalence": -4, "description": "d"}]}"#,
        )
        .expect("parse");
        assert_eq!(result.confidence, 100.0);
        assert_eq!(result.potential_cell_types[0].prevalence, 0.0);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let err = parse_narrative(r#"{"summary": "s", "confidence": 50}"#).expect_err("must fail");
        assert!(matches!(err, NarrativeError::Parse(_)));
    }

    #[test]
    fn valid_reply_passes_through() {
        let service = NarrativeService::new(Arc::new(CannedBackend(
            r#"{"summary": "Fibrotic stroma.", "confidence": 71,
                "potentialCellTypes": [{"name": "Fibroblast", "prevalence": 60, "description": "ECM."}]}"#,
        )));
        let result = service.enrich(&summary());
        assert_eq!(result.summary, "Fibrotic stroma.");
        assert_eq!(result.potential_cell_types.len(), 1);
        assert_eq!(service.backend_name(), "canned");
    }
}
