//! Human-readable byte sizes.

const UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Human-readable byte size using powers of 1024.
///
/// The value is rounded to two decimals and printed with at least one
/// fractional digit: `0.0 B`, `1.0 KB`, `1.5 KB`, `1.23 MB`.
pub fn convert_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0.0 B".to_string();
    }

    let mut unit = 0;
    let mut scale = 1u128;
    while unit + 1 < UNITS.len() && u128::from(size_bytes) >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }

    let value = size_bytes as f64 / scale as f64;
    format!("{} {}", format_rounded(value), UNITS[unit])
}

fn format_rounded(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}
