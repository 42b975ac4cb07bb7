use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::model::{DisplayRect, HpcSummary, NarrativeResult, Point, SelectionRect};

#[derive(Debug, Parser)]
#[command(
    name = "slide-explorer",
    version,
    about = "Whole-slide pathology image explorer"
)]
pub(super) struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(long, global = true)]
    pub(super) config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub(super) verbose: bool,

    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    /// Maps a display-space point into natural image coordinates.
    Map(MapArgs),
    /// Runs the mock HPC analysis over a region, optionally with narrative enrichment.
    Analyze(AnalyzeArgs),
    /// Searches spatial expression hotspots for a gene.
    Gene(GeneArgs),
    /// Writes the default configuration to a file, or prints it.
    InitConfig {
        output: Option<PathBuf>,
    },
    /// Launches the native explorer window, optionally opening a slide.
    View {
        source: Option<String>,
    },
}

#[derive(Debug, Args)]
pub(super) struct MapArgs {
    #[arg(long)]
    pub(super) natural_width: f64,
    #[arg(long)]
    pub(super) natural_height: f64,
    #[arg(long)]
    pub(super) viewport_width: f64,
    #[arg(long)]
    pub(super) viewport_height: f64,
    #[arg(long)]
    pub(super) x: f64,
    #[arg(long)]
    pub(super) y: f64,
}

#[derive(Debug, Args)]
pub(super) struct AnalyzeArgs {
    #[arg(long)]
    pub(super) x: f64,
    #[arg(long)]
    pub(super) y: f64,
    #[arg(long)]
    pub(super) width: f64,
    #[arg(long)]
    pub(super) height: f64,
    /// Request a narrative interpretation of the summary
    #[arg(long)]
    pub(super) narrate: bool,
    /// Seed the mock analysis instead of sleeping and sampling randomly
    #[arg(long)]
    pub(super) seed: Option<u64>,
}

#[derive(Debug, Args)]
pub(super) struct GeneArgs {
    pub(super) symbol: String,
    #[arg(long, default_value_t = 1024)]
    pub(super) width: u32,
    #[arg(long, default_value_t = 768)]
    pub(super) height: u32,
    /// Gene expression points (YAML or JSON) searched before the built-in table
    #[arg(long)]
    pub(super) data: Option<PathBuf>,
    #[arg(long)]
    pub(super) seed: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MapReport {
    pub(super) scale: f64,
    pub(super) offset: Point,
    pub(super) image_rect: Option<DisplayRect>,
    pub(super) natural: Option<Point>,
    pub(super) inside_image: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyzeReport {
    pub(super) region: SelectionRect,
    pub(super) hpc: HpcSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) narrative: Option<NarrativeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) narrative_backend: Option<String>,
}
