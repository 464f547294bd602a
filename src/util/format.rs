/// Format a Unix timestamp as YYYY-MM-DD HH:MM (UTC)
pub fn format_timestamp(timestamp: i64) -> String {
    use time::OffsetDateTime;
    use time::macros::format_description;

    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|dt| {
            let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
            dt.format(&format).ok()
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Format a duration in seconds using its largest sensible unit
pub fn format_duration(secs: i64) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    let abs = secs.unsigned_abs() as i64;
    let sign = if secs < 0 { "-" } else { "" };
    if abs >= DAY {
        format!("{}{:.1}d", sign, abs as f64 / DAY as f64)
    } else if abs >= HOUR {
        format!("{}{:.1}h", sign, abs as f64 / HOUR as f64)
    } else if abs >= MINUTE {
        format!("{}{}m", sign, abs / MINUTE)
    } else {
        format!("{}{}s", sign, abs)
    }
}

/// Format a ratio in [0, 1] as a percentage with one decimal
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}
