use super::{
    AnalysisResult, GeneExpression, HotspotId, HpcSummary, NarrativeResult, NaturalSize, Point,
    SelectionRect,
};

#[test]
fn natural_size_rejects_zero_and_non_finite() {
    assert!(NaturalSize::new(0.0, 768.0).is_err());
    assert!(NaturalSize::new(1024.0, -1.0).is_err());
    assert!(NaturalSize::new(f64::NAN, 10.0).is_err());
    assert!(NaturalSize::from_pixels(1024, 768).is_ok());
}

#[test]
fn spanning_rect_is_direction_independent() {
    let forward = SelectionRect::spanning(Point::new(100.0, 100.0), Point::new(300.0, 250.0));
    let backward = SelectionRect::spanning(Point::new(300.0, 250.0), Point::new(100.0, 100.0));
    assert_eq!(forward, backward);
    assert_eq!(
        forward,
        SelectionRect::new(100.0, 100.0, 200.0, 150.0).expect("rect")
    );
}

#[test]
fn selection_rect_rejects_negative_size() {
    let err = SelectionRect::new(0.0, 0.0, -1.0, 5.0).expect_err("must fail");
    assert!(err.to_string().contains("invalid selection region"));
}

#[test]
fn hpc_summary_serializes_with_camel_case_fields() {
    let summary = HpcSummary {
        region: SelectionRect::new(1.0, 2.0, 30.0, 40.0).expect("rect"),
        cell_count: 12,
        top_genes: vec![GeneExpression {
            name: "FN1".to_string(),
            expression: 4.5,
        }],
        spatial_clusters: 3,
    };
    let value = serde_json::to_value(&summary).expect("serialize");
    assert_eq!(value["cellCount"], 12);
    assert_eq!(value["spatialClusters"], 3);
    assert_eq!(value["topGenes"][0]["name"], "FN1");
}

#[test]
fn narrative_result_parses_structured_cell_types() {
    let raw = r#"{
        "summary": "Stromal region with immune infiltration.",
        "potentialCellTypes": [
            {"name": "Fibroblast", "prevalence": 55, "description": "Produces collagen."}
        ],
        "confidence": 62
    }"#;
    let result: NarrativeResult = serde_json::from_str(raw).expect("parse");
    assert_eq!(result.potential_cell_types.len(), 1);
    assert_eq!(result.potential_cell_types[0].name, "Fibroblast");
    assert!(!result.is_degraded());
}

#[test]
fn empty_confident_reply_is_not_degraded() {
    let raw = r#"{"summary": "No recognizable tissue.", "potentialCellTypes": [], "confidence": 0}"#;
    let result: NarrativeResult = serde_json::from_str(raw).expect("parse");
    assert!(!result.is_degraded());
    assert!(NarrativeResult::degraded().is_degraded());
}

#[test]
fn analysis_result_starts_without_narrative() {
    let hpc = HpcSummary {
        region: SelectionRect::at(Point::new(0.0, 0.0)),
        cell_count: 0,
        top_genes: Vec::new(),
        spatial_clusters: 2,
    };
    let result = AnalysisResult::new(hpc);
    assert!(result.narrative.is_none());
}

#[test]
fn hotspot_ids_are_unique() {
    let a = HotspotId::next();
    let b = HotspotId::next();
    assert_ne!(a, b);
}
