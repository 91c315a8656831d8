use chrono::{Local, TimeZone, Utc};

/// Current time as epoch seconds.
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// `YYYY-MM-DD HH:MM:SS` in local time, or the raw number if it is out of range.
pub fn format_timestamp(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}

/// Relative description of `timestamp` as seen from `now`, e.g. "in 12 minutes".
pub fn humanize(timestamp: i64, now: i64) -> String {
    let diff = timestamp - now;
    if diff.abs() < 45 {
        return "just now".to_string();
    }
    let (amount, unit) = match diff.abs() {
        d if d < 3600 => ((d + 30) / 60, "minute"),
        d if d < 86_400 => ((d + 1800) / 3600, "hour"),
        d => ((d + 43_200) / 86_400, "day"),
    };
    let plural = if amount == 1 { "" } else { "s" };
    if diff > 0 {
        format!("in {amount} {unit}{plural}")
    } else {
        format!("{amount} {unit}{plural} ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanize_future_and_past() {
        assert_eq!(humanize(1_000 + 12 * 60, 1_000), "in 12 minutes");
        assert_eq!(humanize(1_000 + 3600, 1_000), "in 1 hour");
        assert_eq!(humanize(1_000, 1_000 + 2 * 86_400), "2 days ago");
        assert_eq!(humanize(1_010, 1_000), "just now");
    }

    #[test]
    fn format_matches_local_time() {
        let expected = Local
            .timestamp_opt(1_700_000_000, 0)
            .unwrap()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        assert_eq!(format_timestamp(1_700_000_000), expected);
    }

    #[test]
    fn out_of_range_timestamp_is_printed_raw() {
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }
}
