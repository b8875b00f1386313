use std::path::Path;

use bundle_analisa::stats::SizeKind;
use bundle_analisa::util::format_bytes;
use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        stats_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        if self.tooltips_dirty {
            self.rebuild_tooltips();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("bundle-analisa");
                    ui.separator();
                    let file_name = stats_path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| stats_path.display().to_string());
                    ui.label(file_name).on_hover_text(stats_path.display().to_string());
                    ui.label(format!("modules: {}", self.stats.nodes.len()));
                    ui.label(format!("links: {}", self.stats.links.len()));
                    ui.separator();

                    ui.label("size:");
                    let mut picked = None;
                    for kind in self.selectable_sizes() {
                        let response = ui
                            .selectable_label(self.primary() == kind, kind.code())
                            .on_hover_text(kind.label());
                        if response.clicked() {
                            picked = Some(kind);
                        }
                    }
                    if let Some(kind) = picked {
                        self.set_primary(kind);
                    }
                    ui.separator();

                    ui.add(
                        egui::TextEdit::singleline(&mut self.search)
                            .hint_text("Search modules")
                            .desired_width(220.0),
                    );

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload stats"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let total = self.hierarchy.root().value().get(self.primary());
                        ui.label(format!("total {}: {}", self.primary().code(), format_bytes(total)));
                    });
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_treemap(ui);
        });
    }

    fn selectable_sizes(&self) -> Vec<SizeKind> {
        let mut sizes = self.stats.available_sizes();
        for kind in &self.sizes {
            if !sizes.contains(kind) {
                sizes.push(*kind);
            }
        }
        SizeKind::ALL
            .into_iter()
            .filter(|kind| sizes.contains(kind))
            .collect()
    }
}
