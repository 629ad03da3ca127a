use chrono::{DateTime, Utc};

/// Countdown below this many seconds is flagged as running low.
pub const LOW_TIME_SECS: u32 = 60;

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// `MM:SS`, with minutes growing past two digits for long exams.
#[must_use]
pub fn format_countdown(seconds: u32) -> String {
    let minutes = seconds / 60;
    let remainder = seconds % 60;
    format!("{minutes:02}:{remainder:02}")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountdownVm {
    pub label: String,
    pub low: bool,
}

#[must_use]
pub fn map_countdown(remaining: Option<u32>) -> Option<CountdownVm> {
    remaining.map(|seconds| CountdownVm {
        label: format_countdown(seconds),
        low: seconds < LOW_TIME_SECS,
    })
}
