//! Human-readable numbers and durations for terminal output.

const SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

/// Compact number with K/M/B/T suffixes.
///
/// Below 1000 the value keeps up to `digits` decimals; scaled values keep
/// two, one or zero decimals depending on magnitude. Trailing zeros are
/// dropped and non-finite input prints as `0`.
pub fn format_number(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let mut scaled = value.abs();
    let mut unit = 0;
    while scaled >= 1000.0 && unit < SUFFIXES.len() - 1 {
        scaled /= 1000.0;
        unit += 1;
    }
    let decimals = match unit {
        0 => digits,
        _ if scaled >= 100.0 => 0,
        _ if scaled >= 10.0 => 1,
        _ => 2,
    };
    let mut text = format!("{scaled:.decimals$}");
    if text.contains('.') {
        text.truncate(text.trim_end_matches('0').trim_end_matches('.').len());
    }
    let sign = if value < 0.0 && text != "0" { "-" } else { "" };
    format!("{sign}{text}{}", SUFFIXES[unit])
}

pub fn format_rate(per_sec: f64) -> String {
    format!("{}/s", format_number(per_sec, 2))
}

/// `Xh Ym`, `Xm Ys` or `Xs`; fractions are floored and negatives read as zero.
pub fn format_duration(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h {m}m")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}
