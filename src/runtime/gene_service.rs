use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;
use tracing::info;

use crate::config::GeneSearchConfig;
use crate::model::{DataSource, GeneDataPoint, GeneSearchResult, Hotspot, NaturalSize};

#[derive(Debug, Error)]
pub enum GeneDataError {
    #[error("gene data I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("gene data JSON failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("gene data YAML failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("gene data point {index} is invalid: {reason}")]
    InvalidPoint { index: usize, reason: String },
}

struct GeneInfo {
    symbol: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
    cell_types: &'static [&'static str],
}

const GENE_TABLE: &[GeneInfo] = &[
    GeneInfo {
        symbol: "COL1A1",
        aliases: &[],
        description: "Type I collagen chain; the dominant structural protein of fibrotic stroma.",
        cell_types: &["Fibroblast", "Myofibroblast", "Osteoblast"],
    },
    GeneInfo {
        symbol: "KRT19",
        aliases: &["CK19"],
        description: "Cytokeratin 19; a marker of ductal and glandular epithelium and many carcinomas.",
        cell_types: &["Epithelial", "Cholangiocyte", "Tumor"],
    },
    GeneInfo {
        symbol: "CD45",
        aliases: &["PTPRC"],
        description: "Protein tyrosine phosphatase expressed on all nucleated hematopoietic cells.",
        cell_types: &["T cell", "B cell", "Macrophage"],
    },
    GeneInfo {
        symbol: "FN1",
        aliases: &[],
        description: "Fibronectin; an extracellular matrix glycoprotein involved in adhesion and wound healing.",
        cell_types: &["Fibroblast", "Endothelial", "Macrophage"],
    },
    GeneInfo {
        symbol: "EPCAM",
        aliases: &[],
        description: "Epithelial cell adhesion molecule, highly expressed in carcinomas.",
        cell_types: &["Epithelial", "Tumor"],
    },
    GeneInfo {
        symbol: "VIM",
        aliases: &[],
        description: "Vimentin; an intermediate filament of mesenchymal cells and a marker of EMT.",
        cell_types: &["Fibroblast", "Endothelial", "Macrophage"],
    },
    GeneInfo {
        symbol: "ACTA2",
        aliases: &["SMA"],
        description: "Smooth muscle actin; marks myofibroblasts and vascular smooth muscle.",
        cell_types: &["Myofibroblast", "Smooth muscle", "Pericyte"],
    },
    GeneInfo {
        symbol: "CD68",
        aliases: &[],
        description: "Lysosomal glycoprotein used as a pan-macrophage marker.",
        cell_types: &["Macrophage", "Monocyte"],
    },
    GeneInfo {
        symbol: "MKI67",
        aliases: &["KI67"],
        description: "Proliferation marker expressed during active phases of the cell cycle.",
        cell_types: &["Tumor", "Epithelial", "T cell"],
    },
    GeneInfo {
        symbol: "GENE_A",
        aliases: &[],
        description: "This gene is associated with cell proliferation and is often found in tumor microenvironments.",
        cell_types: &["Fibroblast", "Epithelial", "Macrophage"],
    },
];

fn lookup(symbol: &str) -> Option<&'static GeneInfo> {
    GENE_TABLE
        .iter()
        .find(|info| info.symbol == symbol || info.aliases.contains(&symbol))
}

pub fn normalize_symbol(query: &str) -> String {
    query.trim().to_ascii_uppercase()
}

/// Gene-expression points loaded from a JSON or YAML file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneDataset {
    points: Vec<GeneDataPoint>,
}

impl GeneDataset {
    pub fn new(points: Vec<GeneDataPoint>) -> Result<Self, GeneDataError> {
        for (index, point) in points.iter().enumerate() {
            if point.gene.trim().is_empty() {
                return Err(GeneDataError::InvalidPoint {
                    index,
                    reason: "gene symbol is empty".to_string(),
                });
            }
            if ![point.x, point.y, point.expression]
                .iter()
                .all(|value| value.is_finite())
            {
                return Err(GeneDataError::InvalidPoint {
                    index,
                    reason: "coordinates and expression must be finite".to_string(),
                });
            }
        }
        Ok(Self { points })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GeneDataError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let points = if matches!(extension.as_str(), "yaml" | "yml") {
            serde_yaml::from_str::<Vec<GeneDataPoint>>(&raw)?
        } else {
            serde_json::from_str::<Vec<GeneDataPoint>>(&raw)?
        };
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points_for<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a GeneDataPoint> {
        self.points
            .iter()
            .filter(move |point| normalize_symbol(&point.gene) == symbol)
    }
}

/// Mock gene lookup that scatters hotspots over the slide.
#[derive(Debug, Clone)]
pub struct GeneService {
    latency: Duration,
    hotspot_count: usize,
}

impl Default for GeneService {
    fn default() -> Self {
        Self::new(&GeneSearchConfig::default())
    }
}

impl GeneService {
    pub fn new(config: &GeneSearchConfig) -> Self {
        Self {
            latency: Duration::from_millis(config.latency_ms),
            hotspot_count: config.hotspot_count,
        }
    }

    pub fn search_with<R: Rng>(
        &self,
        query: &str,
        natural: NaturalSize,
        loaded: Option<&GeneDataset>,
        rng: &mut R,
    ) -> GeneSearchResult {
        let symbol = normalize_symbol(query);

        if let Some(result) = loaded.and_then(|dataset| search_loaded(dataset, &symbol)) {
            return result;
        }

        let Some(info) = lookup(&symbol) else {
            return GeneSearchResult {
                description: format!(
                    "No spatial expression data is available for {symbol}. \
                     Check the gene symbol or load a gene data file that contains it."
                ),
                gene_name: symbol,
                associated_cell_types: Vec::new(),
                hotspots: Vec::new(),
                data_source: DataSource::Mock,
            };
        };

        let hotspots = (0..self.hotspot_count)
            .map(|_| {
                let cell_type = info.cell_types.choose(rng).copied().unwrap_or("Unknown");
                Hotspot::new(
                    rng.random_range(0.0..natural.width),
                    rng.random_range(0.0..natural.height),
                    rng.random_range(0.0..100.0),
                    cell_type,
                )
            })
            .collect();

        GeneSearchResult {
            gene_name: info.symbol.to_string(),
            description: info.description.to_string(),
            associated_cell_types: info.cell_types.iter().map(|name| name.to_string()).collect(),
            hotspots,
            data_source: DataSource::Mock,
        }
    }

    /// Blocks for the configured latency, then searches.
    pub fn search(
        &self,
        query: &str,
        natural: NaturalSize,
        loaded: Option<&GeneDataset>,
    ) -> GeneSearchResult {
        info!(query, latency_ms = self.latency.as_millis() as u64, "searching gene");
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        self.search_with(query, natural, loaded, &mut rand::rng())
    }
}

fn search_loaded(dataset: &GeneDataset, symbol: &str) -> Option<GeneSearchResult> {
    let mut associated_cell_types: Vec<String> = Vec::new();
    let hotspots = dataset
        .points_for(symbol)
        .map(|point| {
            if !associated_cell_types.contains(&point.cell_type) {
                associated_cell_types.push(point.cell_type.clone());
            }
            Hotspot::new(point.x, point.y, point.expression, point.cell_type.clone())
        })
        .collect::<Vec<_>>();

    if hotspots.is_empty() {
        return None;
    }

    let description = lookup(symbol)
        .map(|info| info.description.to_string())
        .unwrap_or_else(|| format!("Expression of {symbol} from the loaded gene data."));
    Some(GeneSearchResult {
        gene_name: symbol.to_string(),
        description,
        associated_cell_types,
        hotspots,
        data_source: DataSource::Loaded,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::tempdir;

    use super::{GeneDataset, GeneService};
    use crate::model::{DataSource, GeneDataPoint, NaturalSize};

    fn slide() -> NaturalSize {
        NaturalSize::new(1024.0, 768.0).expect("natural size")
    }

    fn point(gene: &str, x: f64, y: f64, cell_type: &str) -> GeneDataPoint {
        GeneDataPoint {
            gene: gene.to_string(),
            x,
            y,
            expression: 12.5,
            cell_type: cell_type.to_string(),
        }
    }

    #[test]
    fn known_gene_places_hotspots_inside_slide() {
        let service = GeneService::default();
        let mut rng = StdRng::seed_from_u64(3);
        let result = service.search_with(" col1a1 ", slide(), None, &mut rng);
        assert_eq!(result.gene_name, "COL1A1");
        assert_eq!(result.hotspots.len(), 15);
        assert_eq!(result.data_source, DataSource::Mock);
        for hotspot in &result.hotspots {
            assert!(slide().contains(hotspot.position()));
            assert!((0.0..100.0).contains(&hotspot.expression));
            assert!(
                result
                    .associated_cell_types
                    .contains(&hotspot.dominant_cell_type)
            );
        }
        let ids = result.hotspots.iter().map(|h| h.id).collect::<HashSet<_>>();
        assert_eq!(ids.len(), result.hotspots.len());
    }

    #[test]
    fn aliases_resolve_to_canonical_symbol() {
        let service = GeneService::default();
        let result = service.search_with("ptprc", slide(), None, &mut StdRng::seed_from_u64(1));
        assert_eq!(result.gene_name, "CD45");
    }

    #[test]
    fn unknown_gene_has_no_hotspots() {
        let service = GeneService::default();
        let result = service.search_with("notagene", slide(), None, &mut StdRng::seed_from_u64(1));
        assert_eq!(result.gene_name, "NOTAGENE");
        assert!(result.hotspots.is_empty());
        assert!(!result.description.is_empty());
    }

    #[test]
    fn loaded_data_takes_precedence() {
        let dataset = GeneDataset::new(vec![
            point("myc", 10.0, 20.0, "Tumor"),
            point("MYC", 30.0, 40.0, "Epithelial"),
            point("MYC", 50.0, 60.0, "Tumor"),
            point("FN1", 1.0, 1.0, "Fibroblast"),
        ])
        .expect("dataset");
        let service = GeneService::default();
        let result = service.search_with("Myc", slide(), Some(&dataset), &mut StdRng::seed_from_u64(1));
        assert_eq!(result.data_source, DataSource::Loaded);
        assert_eq!(result.hotspots.len(), 3);
        assert_eq!(result.associated_cell_types, ["Tumor", "Epithelial"]);

        let fallback =
            service.search_with("KRT19", slide(), Some(&dataset), &mut StdRng::seed_from_u64(1));
        assert_eq!(fallback.data_source, DataSource::Mock);
    }

    #[test]
    fn dataset_loads_from_yaml_and_rejects_bad_points() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("genes.yaml");
        fs::write(
            &path,
            "- gene: FN1\n  x: 1.0\n  y: 2.0\n  expression: 3.0\n  cellType: Fibroblast\n",
        )
        .expect("write");
        let dataset = GeneDataset::load(&path).expect("load");
        assert_eq!(dataset.len(), 1);

        let err = GeneDataset::new(vec![point(" ", 0.0, 0.0, "Tumor")]).expect_err("must fail");
        assert!(err.to_string().contains("gene symbol is empty"));
    }
}
