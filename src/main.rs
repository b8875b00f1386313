mod app;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use bundle_analisa::stats::{Hierarchy, SizeKind, load_stats};
use bundle_analisa::tooltip::build_cache;
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use crate::app::{ViewerOptions, content_config};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Stats JSON written by the bundle visualizer.
    stats_file: PathBuf,

    /// Size kinds to show, primary first (e.g. `renderedLength,gzipLength`).
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<SizeKind>>,

    /// Gap in pixels between the pointer and the tooltip.
    #[arg(long, default_value_t = 10.0)]
    margin: f32,

    /// Leave the module path out of tooltips.
    #[arg(long)]
    hide_path: bool,

    /// Print every tooltip as JSON and exit.
    #[arg(long)]
    dump: bool,
}

impl Args {
    fn viewer_options(&self) -> ViewerOptions {
        ViewerOptions {
            sizes: self.sizes.clone(),
            margin: self.margin,
            hide_path: self.hide_path,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    if args.dump {
        return dump_tooltips(&args);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };
    let stats_path = args.stats_file.clone();
    let viewer_options = args.viewer_options();

    eframe::run_native(
        "bundle-analisa",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::BundleAnalyzeApp::new(
                cc,
                stats_path.clone(),
                viewer_options.clone(),
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}

fn dump_tooltips(args: &Args) -> Result<()> {
    let stats = load_stats(&args.stats_file)?;
    let hierarchy = Hierarchy::from_stats(&stats);
    let sizes = args.viewer_options().resolve_sizes(&stats);
    let primary = sizes.first().copied().unwrap_or(SizeKind::RenderedLength);
    let total_size = hierarchy.root().value().get(primary);

    let config = content_config(&stats, &sizes, total_size, args.hide_path);
    let cache = build_cache(hierarchy.iter(), &config).context("failed to build tooltips")?;

    let entries = hierarchy
        .iter()
        .filter_map(|node| {
            cache.get(&node.index()).map(|content| {
                json!({
                    "path": node.path(),
                    "uid": node.uid(),
                    "html": content.html(),
                })
            })
        })
        .collect::<Vec<_>>();

    let rendered = serde_json::to_string_pretty(&entries).context("failed to encode tooltips")?;
    println!("{rendered}");
    Ok(())
}
