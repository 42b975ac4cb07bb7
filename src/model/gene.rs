use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::Point;

/// Stable identity of a hotspot, assigned when the hotspot is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HotspotId(u64);

impl HotspotId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: HotspotId,
    pub x: f64,
    pub y: f64,
    pub expression: f64,
    pub dominant_cell_type: String,
}

impl Hotspot {
    pub fn new(x: f64, y: f64, expression: f64, dominant_cell_type: impl Into<String>) -> Self {
        Self {
            id: HotspotId::next(),
            x,
            y,
            expression,
            dominant_cell_type: dominant_cell_type.into(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Mock,
    Loaded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneSearchResult {
    pub gene_name: String,
    pub description: String,
    pub associated_cell_types: Vec<String>,
    pub hotspots: Vec<Hotspot>,
    #[serde(default)]
    pub data_source: DataSource,
}

impl GeneSearchResult {
    pub fn hotspot(&self, id: HotspotId) -> Option<&Hotspot> {
        self.hotspots.iter().find(|hotspot| hotspot.id == id)
    }
}

/// One row of a loaded gene-expression dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneDataPoint {
    pub gene: String,
    pub x: f64,
    pub y: f64,
    pub expression: f64,
    pub cell_type: String,
}
