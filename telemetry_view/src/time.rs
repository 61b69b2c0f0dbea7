use chrono::{Local, TimeZone, Utc};
use std::fmt::Display;

pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Wall-clock now in unix milliseconds (browser clock on wasm).
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// `HH:MM:SS` in the local timezone.
pub fn format_clock(t_ms: i64) -> String {
    format_clock_in(&Local, t_ms, CLOCK_FORMAT)
}

pub fn format_clock_in<Tz>(tz: &Tz, t_ms: i64, fmt: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    tz.timestamp_millis_opt(t_ms)
        .single()
        .map(|dt| dt.format(fmt).to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}
