pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    let mut unit = 0usize;
    let mut scale = 1u64;
    while unit < UNITS.len() - 1 && bytes >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }

    let fixed = to_fixed(bytes as f64 / scale as f64, 2);
    format!("{}{}", trim_decimals(&fixed), UNITS[unit])
}

// Ties round away from zero, unlike `{:.2}`.
pub fn to_fixed(value: f64, digits: u8) -> String {
    let scale = 10f64.powi(i32::from(digits));
    let rounded = (value * scale).round() / scale;
    format!("{rounded:.prec$}", prec = usize::from(digits))
}

fn trim_decimals(value: &str) -> &str {
    if value.contains('.') {
        value.trim_end_matches('0').trim_end_matches('.')
    } else {
        value
    }
}

pub fn short_name(id: &str) -> &str {
    id.rsplit_once('/').map(|(_, rest)| rest).unwrap_or(id)
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
