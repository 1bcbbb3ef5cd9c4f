//! Effective ("wall clock") time strings for a player running at some rate.

/// Current time, duration and rate label as shown next to the native time
/// display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveTimes {
    pub current: String,
    pub duration: String,
    /// `"(2x)"`, or empty at normal speed.
    pub rate_label: String,
}

/// Scale `current` and `duration` (seconds of media) by `rate` into seconds
/// of real time. Fractions are floored.
pub fn eff_time_strings(current: f64, duration: f64, rate: f64) -> EffectiveTimes {
    let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
    let rate_label = if (rate - 1.0).abs() < f64::EPSILON {
        String::new()
    } else {
        format!("({}x)", rate)
    };
    EffectiveTimes {
        current: format_clock(current / rate),
        duration: format_clock(duration / rate),
        rate_label,
    }
}

/// `mm:ss`, or `h:mm:ss` from one hour up.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}
