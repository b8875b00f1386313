use eframe::egui::Color32;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

fn normalize_log(value: u64, min: u64, max: u64) -> f32 {
    let min = min.max(1) as f64;
    let max = max.max(min as u64) as f64;
    let value = value.max(1) as f64;

    let denominator = max.ln() - min.ln();
    if denominator.abs() < f64::EPSILON {
        return 0.5;
    }

    ((value.ln() - min.ln()) / denominator).clamp(0.0, 1.0) as f32
}

pub(super) fn size_color(value: u64, min: u64, max: u64) -> Color32 {
    let t = normalize_log(value, min, max);
    let r = (55.0 + (190.0 * t)) as u8;
    let g = (150.0 - (70.0 * t)) as u8;
    let b = (215.0 - (155.0 * t)) as u8;
    Color32::from_rgb(r, g, b)
}

pub(super) fn group_color(depth: usize, max_depth: usize) -> Color32 {
    let t = if max_depth == 0 {
        1.0
    } else {
        depth as f32 / max_depth as f32
    };
    let shade = (32.0 + 40.0 * t) as u8;
    Color32::from_rgb(shade, shade + 6, shade + 14)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_color_spans_the_gradient() {
        assert_eq!(size_color(1, 1, 1024), Color32::from_rgb(55, 150, 215));
        assert_eq!(size_color(1024, 1, 1024), Color32::from_rgb(245, 80, 60));
    }

    #[test]
    fn equal_bounds_use_the_midpoint() {
        assert_eq!(normalize_log(10, 10, 10), 0.5);
    }
}
