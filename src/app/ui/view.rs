use std::collections::HashSet;
use std::sync::Arc;

use bundle_analisa::stats::NodeIndex;
use bundle_analisa::tooltip::Point;
use bundle_analisa::util::short_name;
use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, StrokeKind, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::warn;

use super::super::render_utils::{blend_color, dim_color, group_color, size_color};
use super::super::treemap::{cell_at, layout_treemap};
use super::super::{LayoutCache, SearchMatchCache, ViewModel};

const LABEL_MIN_WIDTH: f32 = 36.0;
const LABEL_MIN_HEIGHT: f32 = 14.0;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<NodeIndex>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .hierarchy
            .iter()
            .filter(|node| node.is_leaf())
            .filter(|node| {
                let text = node
                    .uid()
                    .and_then(|uid| self.stats.nodes.get(uid))
                    .map_or(node.name(), |record| record.id.as_str());
                fuzzy_match_score(&matcher, text, search_query).is_some()
            })
            .map(|node| node.index())
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    fn ensure_layout(&mut self, rect: Rect) {
        let primary = self.primary();
        if let Some(layout) = &self.layout_cache
            && layout.rect == rect
            && layout.primary == primary
        {
            return;
        }

        let cells = layout_treemap(&self.hierarchy, primary, rect);
        let leaf_values = cells
            .iter()
            .filter(|cell| self.hierarchy.node(cell.index).is_leaf())
            .map(|cell| cell.value);
        let min_leaf = leaf_values.clone().min().unwrap_or(0);
        let max_leaf = leaf_values.max().unwrap_or(0);

        self.layout_cache = Some(LayoutCache {
            rect,
            primary,
            cells,
            min_leaf,
            max_leaf,
        });
    }

    /// Feeds enter/move/leave to the tooltip for the deepest cell under the
    /// pointer.
    fn track_hover(&mut self, rect: Rect, response: &egui::Response) {
        let pointer = response.hover_pos();
        let hovered = pointer.and_then(|pointer| {
            self.layout_cache
                .as_ref()
                .and_then(|layout| cell_at(&layout.cells, pointer))
                .map(|cell| cell.index)
        });

        self.surface.set_viewport(rect);

        match (self.hovered, hovered) {
            (Some(previous), Some(current)) if previous != current => {
                self.tooltip.pointer_leave(&mut self.surface);
                self.tooltip.pointer_enter(&mut self.surface);
            }
            (None, Some(_)) => self.tooltip.pointer_enter(&mut self.surface),
            (Some(_), None) => self.tooltip.pointer_leave(&mut self.surface),
            _ => {}
        }
        self.hovered = hovered;

        if let (Some(index), Some(pointer)) = (hovered, pointer) {
            let local = pointer - rect.min;
            if let Err(error) =
                self.tooltip
                    .pointer_move(&index, Point::new(local.x, local.y), &mut self.surface)
            {
                warn!(%error, "no tooltip content for hovered node");
            }
        }
    }

    pub(in crate::app) fn draw_treemap(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

        self.ensure_layout(rect);
        self.track_hover(rect, &response);
        let search_matches = self.cached_search_matches();

        let Some(layout) = &self.layout_cache else {
            return;
        };
        if layout.cells.len() <= 1 {
            ui.label("The stats file has no modules with a non-zero size.");
            return;
        }

        let max_depth = self.hierarchy.max_depth();
        let search_active = search_matches.is_some();

        for cell in &layout.cells {
            let node = self.hierarchy.node(cell.index);
            let is_leaf = node.is_leaf();
            let is_hovered = self.hovered == Some(cell.index);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&cell.index));

            let base_color = if is_leaf {
                size_color(cell.value, layout.min_leaf, layout.max_leaf)
            } else {
                group_color(cell.depth, max_depth)
            };
            let color = if is_hovered && is_leaf {
                blend_color(base_color, Color32::from_rgb(255, 164, 101), 0.55)
            } else if is_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.68)
            } else if search_active && is_leaf {
                dim_color(base_color, 0.38)
            } else {
                base_color
            };

            painter.rect_filled(cell.rect, 0.0, color);
            painter.rect_stroke(
                cell.rect,
                0.0,
                Stroke::new(
                    if is_hovered { 1.6 } else { 0.6 },
                    Color32::from_rgba_unmultiplied(15, 15, 15, 190),
                ),
                StrokeKind::Inside,
            );

            let show_label = (is_leaf || cell.has_header)
                && cell.rect.width() >= LABEL_MIN_WIDTH
                && cell.rect.height() >= LABEL_MIN_HEIGHT;
            if show_label {
                painter.with_clip_rect(cell.rect.shrink(1.0)).text(
                    cell.rect.left_top() + vec2(4.0, 2.0),
                    Align2::LEFT_TOP,
                    short_name(node.name()),
                    FontId::proportional(11.0),
                    Color32::from_gray(238),
                );
            }
        }

        self.surface.show(ui.ctx(), rect);
    }
}
