//! Time formatting helpers.

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// "closes in 2h 5m" / "closed 3m 0s ago" relative to `now`.
pub fn format_remaining(deadline_secs: u64, now_secs: u64) -> String {
    if deadline_secs > now_secs {
        format!("closes in {}", format_duration(deadline_secs - now_secs))
    } else {
        format!("closed {} ago", format_duration(now_secs - deadline_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(7_500), "2h 5m");
        assert_eq!(format_duration(90_000), "1d 1h");
    }

    #[test]
    fn remaining() {
        assert_eq!(format_remaining(200, 80), "closes in 2m 0s");
        assert_eq!(format_remaining(100, 280), "closed 3m 0s ago");
    }
}
