use std::path::Path;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::config::{self, AppConfig};
use crate::logging;
use crate::model::{GeneSearchResult, NaturalSize, Point, SelectionRect, ViewportSize};
use crate::runtime::{AppContext, GeneDataset, Result};
use crate::ui::interaction::ViewportMapping;

use super::types::{AnalyzeArgs, AnalyzeReport, Cli, Commands, GeneArgs, MapArgs, MapReport};

pub fn run_cli() -> std::result::Result<(), String> {
    let cli = Cli::parse();

    logging::init(if cli.verbose { "debug" } else { "warn" });

    let config = config::load_or_default(cli.config.as_deref()).map_err(|error| error.to_string())?;
    debug!(config = ?cli.config, "configuration loaded");

    match cli.command {
        Commands::Map(args) => print_json(&map_point(&args).map_err(|error| error.to_string())?),
        Commands::Analyze(args) => {
            let app = AppContext::from_config(&config);
            print_json(&analyze(&app, &args).map_err(|error| error.to_string())?)
        }
        Commands::Gene(args) => {
            let app = AppContext::from_config(&config);
            print_json(&search_gene(&app, &args).map_err(|error| error.to_string())?)
        }
        Commands::InitConfig { output } => init_config(output.as_deref()),
        Commands::View { source } => crate::ui::run_with_config(source, config),
    }
}

fn print_json<T: Serialize>(value: &T) -> std::result::Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(|error| error.to_string())?
    );
    Ok(())
}

fn map_point(args: &MapArgs) -> Result<MapReport> {
    let natural = NaturalSize::new(args.natural_width, args.natural_height)?;
    let mapping = ViewportMapping::new(
        natural,
        ViewportSize::new(args.viewport_width, args.viewport_height),
    );
    let point = mapping.to_natural(Point::new(args.x, args.y));
    Ok(MapReport {
        scale: mapping.scale,
        offset: mapping.offset,
        image_rect: mapping.image_rect(),
        natural: point,
        inside_image: point.is_some_and(|point| natural.contains(point)),
    })
}

fn analyze(app: &AppContext, args: &AnalyzeArgs) -> Result<AnalyzeReport> {
    let region = SelectionRect::new(args.x, args.y, args.width, args.height)?;
    let hpc = match args.seed {
        Some(seed) => app
            .analysis()
            .summarize(region, &mut StdRng::seed_from_u64(seed)),
        None => app.analysis().run(region),
    };
    let (narrative, narrative_backend) = if args.narrate {
        (
            Some(app.narrative().enrich(&hpc)),
            Some(app.narrative().backend_name().to_string()),
        )
    } else {
        (None, None)
    };
    Ok(AnalyzeReport {
        region,
        hpc,
        narrative,
        narrative_backend,
    })
}

fn search_gene(app: &AppContext, args: &GeneArgs) -> Result<GeneSearchResult> {
    let natural = NaturalSize::from_pixels(args.width, args.height)?;
    let dataset = args.data.as_deref().map(GeneDataset::load).transpose()?;
    let result = match args.seed {
        Some(seed) => app.genes().search_with(
            &args.symbol,
            natural,
            dataset.as_ref(),
            &mut StdRng::seed_from_u64(seed),
        ),
        None => app.genes().search(&args.symbol, natural, dataset.as_ref()),
    };
    Ok(result)
}

fn init_config(output: Option<&Path>) -> std::result::Result<(), String> {
    let defaults = AppConfig::default();
    match output {
        Some(path) => {
            config::save_config(path, &defaults).map_err(|error| error.to_string())?;
            println!("{}", json!({"status": "ok", "output": path}));
            Ok(())
        }
        None => print_json(&defaults),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{analyze, map_point, search_gene};
    use crate::cli::types::{AnalyzeArgs, GeneArgs, MapArgs};
    use crate::model::DataSource;
    use crate::runtime::AppContext;

    fn map_args(x: f64, y: f64) -> MapArgs {
        MapArgs {
            natural_width: 1024.0,
            natural_height: 768.0,
            viewport_width: 512.0,
            viewport_height: 768.0,
            x,
            y,
        }
    }

    #[test]
    fn map_reports_letterbox_and_natural_point() {
        let report = map_point(&map_args(50.0, 242.0)).expect("map");
        assert!((report.scale - 0.5).abs() < 1e-12);
        assert!((report.offset.y - 192.0).abs() < 1e-12);
        let natural = report.natural.expect("natural point");
        assert!((natural.x - 100.0).abs() < 1e-9);
        assert!((natural.y - 100.0).abs() < 1e-9);
        assert!(report.inside_image);
    }

    #[test]
    fn map_flags_points_in_the_letterbox() {
        let report = map_point(&map_args(10.0, 20.0)).expect("map");
        assert!(!report.inside_image);
    }

    #[test]
    fn seeded_analyze_skips_narrative_unless_requested() {
        let args = AnalyzeArgs {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
            narrate: false,
            seed: Some(3),
        };
        let report = analyze(&AppContext::default(), &args).expect("analyze");
        assert_eq!(report.hpc.cell_count, 50);
        assert!(report.narrative.is_none());
    }

    #[test]
    fn analyze_rejects_negative_region() {
        let args = AnalyzeArgs {
            x: 0.0,
            y: 0.0,
            width: -1.0,
            height: 50.0,
            narrate: false,
            seed: Some(3),
        };
        assert!(analyze(&AppContext::default(), &args).is_err());
    }

    #[test]
    fn gene_search_reads_data_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("genes.json");
        fs::write(
            &path,
            r#"[{"gene": "MYC", "x": 5, "y": 6, "expression": 40, "cellType": "Tumor"}]"#,
        )
        .expect("write");
        let args = GeneArgs {
            symbol: "myc".to_string(),
            width: 1024,
            height: 768,
            data: Some(path),
            seed: Some(1),
        };
        let result = search_gene(&AppContext::default(), &args).expect("search");
        assert_eq!(result.data_source, DataSource::Loaded);
        assert_eq!(result.hotspots.len(), 1);
    }

    #[test]
    fn gene_search_reports_missing_data_file() {
        let args = GeneArgs {
            symbol: "FN1".to_string(),
            width: 1024,
            height: 768,
            data: Some("does-not-exist.json".into()),
            seed: Some(1),
        };
        let err = search_gene(&AppContext::default(), &args).expect_err("must fail");
        assert!(err.to_string().contains("gene data"));
    }
}
