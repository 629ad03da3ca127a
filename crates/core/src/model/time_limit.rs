use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimeLimitError {
    #[error("exam time limit is missing")]
    Missing,

    #[error("exam time limit {raw:?} is not a number of minutes")]
    NotANumber { raw: String },

    #[error("exam time limit must be positive, got {raw}")]
    NonPositive { raw: String },

    #[error("exam time limit of {raw} minutes is too long to count down")]
    TooLarge { raw: String },
}

/// Validated exam duration, held as whole seconds for the countdown.
///
/// Minutes may be fractional; they are rounded to the nearest second and
/// never below one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeLimit {
    seconds: u32,
}

impl TimeLimit {
    /// # Errors
    ///
    /// Returns `TimeLimitError::NonPositive` for zero or negative values and
    /// `TimeLimitError::TooLarge` when the seconds do not fit the countdown.
    pub fn from_minutes(minutes: i64) -> Result<Self, TimeLimitError> {
        #[allow(clippy::cast_precision_loss)]
        let value = minutes as f64;
        Self::from_fractional_minutes(value, &minutes.to_string())
    }

    /// Parse the optional route/query value. Empty strings count as missing.
    ///
    /// # Errors
    ///
    /// Returns `TimeLimitError::Missing` when no value was supplied,
    /// `TimeLimitError::NotANumber` for non-numeric text, otherwise the same
    /// errors as [`TimeLimit::from_minutes`].
    pub fn parse(raw: Option<&str>) -> Result<Self, TimeLimitError> {
        let raw = raw.map(str::trim).filter(|value| !value.is_empty());
        let Some(raw) = raw else {
            return Err(TimeLimitError::Missing);
        };
        let minutes = raw
            .parse::<f64>()
            .ok()
            .filter(|value| !value.is_nan())
            .ok_or_else(|| TimeLimitError::NotANumber {
                raw: raw.to_string(),
            })?;
        Self::from_fractional_minutes(minutes, raw)
    }

    fn from_fractional_minutes(minutes: f64, raw: &str) -> Result<Self, TimeLimitError> {
        if minutes <= 0.0 {
            return Err(TimeLimitError::NonPositive {
                raw: raw.to_string(),
            });
        }
        let seconds = (minutes * 60.0).round().max(1.0);
        if !seconds.is_finite() || seconds > f64::from(u32::MAX) {
            return Err(TimeLimitError::TooLarge {
                raw: raw.to_string(),
            });
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let seconds = seconds as u32;
        Ok(Self { seconds })
    }

    /// Length in minutes, fractional when the limit is not a whole minute.
    #[must_use]
    pub fn minutes(&self) -> f64 {
        f64::from(self.seconds) / 60.0
    }

    #[must_use]
    pub fn total_seconds(&self) -> u32 {
        self.seconds
    }
}

/// Thirty minutes, used when nothing else is configured.
impl Default for TimeLimit {
    fn default() -> Self {
        Self { seconds: 30 * 60 }
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.minutes())
    }
}
