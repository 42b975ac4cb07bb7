use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::NarrativeConfig;
use crate::model::HpcSummary;

use super::narrative_service::{
    NarrativeBackend, NarrativeError, NarrativeOutcome, parse_narrative,
};

pub fn build_prompt(summary: &HpcSummary) -> String {
    let gene_list = summary
        .top_genes
        .iter()
        .map(|gene| format!("{} (expression: {:.2})", gene.name, gene.expression))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Analyze the following simulated spatial transcriptomics data from a selected region \
of a whole-slide pathology image.

Data Summary:
- Estimated Cell Count: {cell_count}
- Identified Spatial Clusters: {clusters}
- Top Expressed Genes: {gene_list}

Based on this data, provide a concise analysis. The top genes include common markers: \
COL1A1 (fibroblasts), KRT19 (epithelial cells), CD45 (immune cells), and FN1 (extracellular matrix).

Respond in JSON format according to the provided schema.
- The summary should be a brief, one-sentence interpretation.
- For potentialCellTypes, infer from the gene list. For each cell type, provide its name, \
an estimated prevalence score from 0-100, and a brief, one-sentence description of its role.
- The confidence score should reflect the certainty of the analysis based on the limited data provided.",
        cell_count = summary.cell_count,
        clusters = summary.spatial_clusters,
    )
}

pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "A single sentence summarizing the potential state of the tissue region."
            },
            "potentialCellTypes": {
                "type": "ARRAY",
                "description": "A list of potential cell types present in the region based on gene markers.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "The name of the cell type." },
                        "prevalence": {
                            "type": "NUMBER",
                            "description": "Estimated prevalence score from 0 to 100 for this cell type."
                        },
                        "description": {
                            "type": "STRING",
                            "description": "A brief, one-sentence description of the cell type's typical role."
                        }
                    },
                    "required": ["name", "prevalence", "description"]
                }
            },
            "confidence": {
                "type": "NUMBER",
                "description": "A confidence score from 0 to 100 for the analysis based on the provided data."
            }
        },
        "required": ["summary", "potentialCellTypes", "confidence"]
    })
}

pub fn request_body(summary: &HpcSummary) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": build_prompt(summary) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pulls the first candidate's text out of a `generateContent` reply.
pub fn extract_text(raw: &str) -> Result<String, NarrativeError> {
    let response: GenerateContentResponse = serde_json::from_str(raw)?;
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(NarrativeError::EmptyResponse);
    }
    Ok(text)
}

/// Gemini `generateContent` over HTTPS.
pub struct GeminiBackend {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiBackend {
    pub fn new(config: &NarrativeConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self {
            agent,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.resolve_api_key(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn post(&self, api_key: &str, body: &Value) -> Result<String, NarrativeError> {
        let response = self
            .agent
            .post(&self.request_url())
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", api_key)
            .send_string(&body.to_string());

        match response {
            Ok(response) => response
                .into_string()
                .map_err(|error| NarrativeError::Transport(error.to_string())),
            Err(ureq::Error::Status(status, response)) => Err(NarrativeError::Status {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(transport)) => {
                Err(NarrativeError::Transport(transport.to_string()))
            }
        }
    }
}

impl NarrativeBackend for GeminiBackend {
    fn name(&self) -> &str {
        &self.model
    }

    fn generate(&self, summary: &HpcSummary) -> NarrativeOutcome {
        let api_key = self.api_key.as_deref().ok_or(NarrativeError::MissingApiKey)?;
        debug!(url = %self.request_url(), "requesting narrative");
        let raw = self.post(api_key, &request_body(summary))?;
        let text = extract_text(&raw)?;
        parse_narrative(&text)
    }
}
