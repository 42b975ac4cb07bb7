use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::model::{GeneExpression, HpcSummary, SelectionRect};

/// Marker panel reported for every region, with the expression range each is drawn from.
const MARKER_PANEL: [(&str, f64, f64); 5] = [
    ("GENE_A", 0.0, 100.0),
    ("COL1A1", 20.0, 100.0),
    ("KRT19", 0.0, 70.0),
    ("CD45", 0.0, 60.0),
    ("FN1", 0.0, 50.0),
];

/// Stand-in for the HPC spatial-transcriptomics pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisService {
    latency: Duration,
}

impl Default for AnalysisService {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl AnalysisService {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            latency: Duration::from_millis(config.latency_ms),
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn summarize<R: Rng>(&self, region: SelectionRect, rng: &mut R) -> HpcSummary {
        let cell_count = (region.area() / 100.0).floor().max(0.0) as u64;
        let top_genes = MARKER_PANEL
            .iter()
            .map(|(name, low, high)| GeneExpression {
                name: (*name).to_string(),
                expression: rng.random_range(*low..*high),
            })
            .collect();
        HpcSummary {
            region,
            cell_count,
            top_genes,
            spatial_clusters: rng.random_range(2..=6),
        }
    }

    /// Blocks for the configured latency, then summarizes the region.
    pub fn run(&self, region: SelectionRect) -> HpcSummary {
        info!(
            width = region.width,
            height = region.height,
            latency_ms = self.latency.as_millis() as u64,
            "querying HPC for region"
        );
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        self.summarize(region, &mut rand::rng())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::AnalysisService;
    use crate::config::AnalysisConfig;
    use crate::model::SelectionRect;

    #[test]
    fn summary_follows_marker_panel_ranges() {
        let service = AnalysisService::default();
        let region = SelectionRect::new(100.0, 100.0, 200.0, 150.0).expect("rect");
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let summary = service.summarize(region, &mut rng);
            assert_eq!(summary.cell_count, 300);
            assert_eq!(summary.region, region);
            let names = summary
                .top_genes
                .iter()
                .map(|gene| gene.name.as_str())
                .collect::<Vec<_>>();
            assert_eq!(names, ["GENE_A", "COL1A1", "KRT19", "CD45", "FN1"]);
            assert!((20.0..100.0).contains(&summary.top_genes[1].expression));
            assert!((0.0..50.0).contains(&summary.top_genes[4].expression));
            assert!((2..=6).contains(&summary.spatial_clusters));
        }
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let service = AnalysisService::default();
        let region = SelectionRect::new(0.0, 0.0, 55.5, 20.0).expect("rect");
        let a = service.summarize(region, &mut StdRng::seed_from_u64(42));
        let b = service.summarize(region, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_eq!(a.cell_count, 11);
    }

    #[test]
    fn zero_latency_run_returns_immediately() {
        let service = AnalysisService::new(&AnalysisConfig { latency_ms: 0 });
        let region = SelectionRect::new(0.0, 0.0, 10.0, 10.0).expect("rect");
        assert_eq!(service.run(region).cell_count, 1);
    }
}
