use chrono::{Duration, NaiveDate};

/// This is the standard way of converting a date to a session file name in focuslog.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Formats a countdown as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_left_time(seconds: i64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

pub fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!(
            "{}h{}m{}s",
            v.num_hours(),
            v.num_minutes() % 60,
            v.num_seconds() % 60
        )
    } else if v.num_minutes() > 0 {
        format!("{}m{}s", v.num_minutes() % 60, v.num_seconds() % 60)
    } else {
        format!("{}s", v.num_seconds() % 60)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::{format_duration, format_left_time, hours_to_duration};

    #[test]
    fn left_time_is_zero_padded() {
        assert_eq!(format_left_time(1500), "25:00");
        assert_eq!(format_left_time(61), "01:01");
        assert_eq!(format_left_time(0), "00:00");
        assert_eq!(format_left_time(6000), "100:00");
    }

    #[test]
    fn durations_pick_largest_unit() {
        assert_eq!(format_duration(Duration::seconds(42)), "42s");
        assert_eq!(format_duration(Duration::seconds(125)), "2m5s");
        assert_eq!(format_duration(Duration::seconds(3725)), "1h2m5s");
    }

    #[test]
    fn hours_convert_to_milliseconds() {
        assert_eq!(hours_to_duration(0.5), Duration::minutes(30));
        assert_eq!(hours_to_duration(3.0 / 3600.0), Duration::seconds(3));
    }
}
