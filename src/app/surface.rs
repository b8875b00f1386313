use bundle_analisa::tooltip::{
    BoxSize, Placement, SummaryLine, TRANSPARENT, TooltipContent, TooltipSurface,
};
use eframe::egui::{self, Context, Id, Order, Rect, RichText, Ui, vec2};

const TOOLTIP_MAX_WIDTH: f32 = 420.0;
const RESIZE_EPSILON: f32 = 0.5;

/// Tooltip panel state kept between frames. The panel box is the size the
/// area was last laid out with; a pass that lays it out at a different size
/// is discarded so placement reruns against the real box.
pub(super) struct EguiSurface {
    opacity: f32,
    content: Option<TooltipContent>,
    placement: Option<Placement>,
    panel: BoxSize,
    viewport: BoxSize,
}

impl Default for EguiSurface {
    fn default() -> Self {
        Self {
            opacity: TRANSPARENT,
            content: None,
            placement: None,
            panel: BoxSize::default(),
            viewport: BoxSize::default(),
        }
    }
}

impl TooltipSurface for EguiSurface {
    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    fn set_content(&mut self, content: &TooltipContent) {
        if self.content.as_ref() != Some(content) {
            self.content = Some(content.clone());
        }
    }

    fn panel_box(&self) -> BoxSize {
        self.panel
    }

    fn viewport_box(&self) -> BoxSize {
        self.viewport
    }

    fn apply_placement(&mut self, placement: &Placement) {
        self.placement = Some(*placement);
    }
}

impl EguiSurface {
    pub(super) fn set_viewport(&mut self, rect: Rect) {
        self.viewport = BoxSize::new(rect.width(), rect.height());
    }

    pub(super) fn show(&mut self, ctx: &Context, viewport_rect: Rect) {
        if self.opacity <= TRANSPARENT {
            return;
        }
        let (Some(content), Some(placement)) = (&self.content, self.placement) else {
            return;
        };

        let origin = placement.top_left(self.panel, self.viewport);
        let opacity = self.opacity;

        let area = egui::Area::new(Id::new("treemap_tooltip"))
            .order(Order::Tooltip)
            .interactable(false)
            .fixed_pos(viewport_rect.min + vec2(origin.x, origin.y))
            .show(ctx, |ui| {
                ui.set_opacity(opacity);
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(TOOLTIP_MAX_WIDTH);
                    for line in content.lines() {
                        draw_summary_line(ui, line);
                    }
                });
            });

        let measured = area.response.rect;
        if self.record_panel(BoxSize::new(measured.width(), measured.height())) {
            ctx.request_discard("tooltip panel resized");
        }
    }

    fn record_panel(&mut self, measured: BoxSize) -> bool {
        let resized = (measured.width - self.panel.width).abs() > RESIZE_EPSILON
            || (measured.height - self.panel.height).abs() > RESIZE_EPSILON;
        self.panel = measured;
        resized
    }
}

fn draw_summary_line(ui: &mut Ui, line: &SummaryLine) {
    match line {
        SummaryLine::Path(path) => {
            ui.label(path.as_str());
        }
        SummaryLine::Primary {
            kind,
            bytes,
            percentage,
        } => {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("{}: {bytes}", kind.code())).strong());
                if let Some(percentage) = percentage {
                    ui.label(format!("({percentage})"));
                }
            });
        }
        SummaryLine::Secondary { kind, bytes } => {
            ui.label(format!("{}: {bytes}", kind.code()));
        }
        SummaryLine::ImportedBy(importers) => {
            ui.label(RichText::new("Imported By:").strong());
            for importer in importers {
                ui.small(importer.as_str());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bundle_analisa::tooltip::{Margin, Point, position};

    use super::*;

    #[test]
    fn resized_panel_is_reported_once() {
        let mut surface = EguiSurface::default();

        assert!(surface.record_panel(BoxSize::new(200.0, 60.0)));
        assert!(!surface.record_panel(BoxSize::new(200.2, 60.0)));
        assert!(surface.record_panel(BoxSize::new(200.0, 180.0)));
        assert!(!surface.record_panel(BoxSize::new(200.0, 180.0)));
    }

    #[test]
    fn placement_after_resize_uses_new_panel_height() {
        let mut surface = EguiSurface::default();
        surface.set_viewport(Rect::from_min_size(egui::pos2(0.0, 0.0), vec2(800.0, 600.0)));
        let pointer = Point::new(100.0, 500.0);

        surface.record_panel(BoxSize::new(200.0, 60.0));
        let short = position(pointer, surface.panel_box(), surface.viewport_box(), Margin::default());
        assert_eq!(short.top(), Some(510.0));

        assert!(surface.record_panel(BoxSize::new(200.0, 180.0)));
        let tall = position(pointer, surface.panel_box(), surface.viewport_box(), Margin::default());
        assert_eq!(tall.top(), None);
        assert_eq!(tall.bottom(), Some(110.0));
    }
}
