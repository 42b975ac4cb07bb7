mod analysis;
mod error;
mod gene;
mod geometry;

#[cfg(test)]
mod tests;

pub use analysis::{
    AnalysisResult, CellTypeFinding, DEGRADED_SUMMARY, GeneExpression, HpcSummary,
    NarrativeResult,
};
pub use error::{CoreError, Result};
pub use gene::{DataSource, GeneDataPoint, GeneSearchResult, Hotspot, HotspotId};
pub use geometry::{DisplayRect, NaturalSize, Point, SelectionRect, ViewportSize};
