/// `m:ss`, minutes unbounded
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Seconds as a short label: whole numbers without a fraction
pub fn format_secs(secs: f64) -> String {
    if (secs - secs.round()).abs() < f64::EPSILON {
        format!("{}s", secs.round())
    } else {
        format!("{secs:.1}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(9), "0:09");
        assert_eq!(format_time(180), "3:00");
        assert_eq!(format_time(754), "12:34");
        assert_eq!(format_time(5999), "99:59");
    }

    #[test]
    fn test_format_secs() {
        assert_eq!(format_secs(2.0), "2s");
        assert_eq!(format_secs(1.5), "1.5s");
        assert_eq!(format_secs(0.0), "0s");
    }
}
