use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use bundle_analisa::stats::{
    BundleStats, Hierarchy, HierarchyNode, NodeIndex, SizeKind, load_stats,
};
use bundle_analisa::tooltip::{ContentConfig, Margin, PathLine, TooltipController};
use eframe::egui::{self, Context, Rect};
use tracing::{info, warn};

mod render_utils;
mod surface;
mod treemap;
mod ui;

use self::surface::EguiSurface;
use self::treemap::TreemapCell;

#[derive(Clone, Debug)]
pub struct ViewerOptions {
    pub sizes: Option<Vec<SizeKind>>,
    pub margin: f32,
    pub hide_path: bool,
}

impl ViewerOptions {
    pub fn resolve_sizes(&self, stats: &BundleStats) -> Vec<SizeKind> {
        let requested = self
            .sizes
            .clone()
            .filter(|sizes| !sizes.is_empty())
            .unwrap_or_else(|| stats.available_sizes());

        let mut seen = HashSet::new();
        requested
            .into_iter()
            .filter(|kind| seen.insert(*kind))
            .collect()
    }
}

pub fn content_config<'a, 'h>(
    stats: &'a BundleStats,
    sizes: &'a [SizeKind],
    total_size: u64,
    hide_path: bool,
) -> ContentConfig<'a, HierarchyNode<'h>> {
    let path_line = if hide_path {
        PathLine::Hidden
    } else {
        PathLine::Ancestors
    };

    ContentConfig::new(&stats.nodes, &stats.links, sizes)
        .with_total_size(Some(total_size))
        .with_node_path(path_line)
}

pub struct BundleAnalyzeApp {
    stats_path: PathBuf,
    options: ViewerOptions,
    state: AppState,
    reload_rx: Option<Receiver<Result<BundleStats, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<BundleStats, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    stats: BundleStats,
    hierarchy: Hierarchy,
    options: ViewerOptions,
    sizes: Vec<SizeKind>,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    layout_cache: Option<LayoutCache>,
    tooltip: TooltipController<NodeIndex>,
    surface: EguiSurface,
    hovered: Option<NodeIndex>,
    tooltips_dirty: bool,
    tooltip_revision: u64,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<NodeIndex>>,
}

struct LayoutCache {
    rect: Rect,
    primary: SizeKind,
    cells: Vec<TreemapCell>,
    min_leaf: u64,
    max_leaf: u64,
}

impl ViewModel {
    fn new(stats: BundleStats, options: ViewerOptions) -> Self {
        let hierarchy = Hierarchy::from_stats(&stats);
        let sizes = options.resolve_sizes(&stats);
        let margin = Margin {
            x: options.margin,
            y: options.margin,
        };

        Self {
            hierarchy,
            sizes,
            stats,
            options,
            search: String::new(),
            search_match_cache: None,
            layout_cache: None,
            tooltip: TooltipController::new(margin),
            surface: EguiSurface::default(),
            hovered: None,
            tooltips_dirty: true,
            tooltip_revision: 0,
        }
    }

    fn primary(&self) -> SizeKind {
        self.sizes
            .first()
            .copied()
            .unwrap_or(SizeKind::RenderedLength)
    }

    fn set_primary(&mut self, kind: SizeKind) {
        if self.primary() == kind {
            return;
        }

        if let Some(position) = self.sizes.iter().position(|size| *size == kind) {
            let kind = self.sizes.remove(position);
            self.sizes.insert(0, kind);
        } else {
            self.sizes.insert(0, kind);
        }
        self.tooltips_dirty = true;
        self.layout_cache = None;
    }

    fn rebuild_tooltips(&mut self) {
        let total_size = self.hierarchy.root().value().get(self.primary());
        let config = content_config(
            &self.stats,
            &self.sizes,
            total_size,
            self.options.hide_path,
        );

        match self.tooltip.build_cache(self.hierarchy.iter(), &config) {
            Ok(()) => {
                self.tooltip_revision += 1;
                info!(
                    nodes = self.tooltip.cache().len(),
                    primary = %self.primary(),
                    revision = self.tooltip_revision,
                    "rebuilt tooltip cache"
                );
            }
            Err(error) => warn!(%error, "tooltip cache rebuild failed"),
        }
        self.tooltips_dirty = false;
    }
}

impl BundleAnalyzeApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        stats_path: PathBuf,
        options: ViewerOptions,
    ) -> Self {
        let state = Self::start_load(stats_path.clone());
        Self {
            stats_path,
            options,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(stats_path: PathBuf) -> Receiver<Result<BundleStats, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_stats(&stats_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(stats_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(stats_path),
        }
    }

    fn ready_state(&self, result: Result<BundleStats, String>) -> AppState {
        match result {
            Ok(stats) => AppState::Ready(Box::new(ViewModel::new(stats, self.options.clone()))),
            Err(error) => {
                warn!(%error, "failed to load bundle stats");
                AppState::Error(error)
            }
        }
    }
}

impl eframe::App for BundleAnalyzeApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(result);
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading bundle stats...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load bundle stats");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.stats_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.stats_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry {
            self.state = Self::start_load(self.stats_path.clone());
        } else if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.ready_state(result);
        }
    }
}
