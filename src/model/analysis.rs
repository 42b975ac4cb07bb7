use serde::{Deserialize, Serialize};

use super::SelectionRect;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneExpression {
    pub name: String,
    pub expression: f64,
}

/// Output of the HPC collaborator for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HpcSummary {
    pub region: SelectionRect,
    pub cell_count: u64,
    pub top_genes: Vec<GeneExpression>,
    pub spatial_clusters: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellTypeFinding {
    pub name: String,
    pub prevalence: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeResult {
    pub summary: String,
    pub potential_cell_types: Vec<CellTypeFinding>,
    pub confidence: f64,
}

pub const DEGRADED_SUMMARY: &str = "Could not analyze data due to an API error. \
Please check your API key and network connection.";

impl NarrativeResult {
    /// Result reported when enrichment could not be completed.
    pub fn degraded() -> Self {
        Self {
            summary: DEGRADED_SUMMARY.to_string(),
            potential_cell_types: Vec::new(),
            confidence: 0.0,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.summary == DEGRADED_SUMMARY
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub hpc: HpcSummary,
    pub narrative: Option<NarrativeResult>,
}

impl AnalysisResult {
    pub fn new(hpc: HpcSummary) -> Self {
        Self {
            hpc,
            narrative: None,
        }
    }
}
