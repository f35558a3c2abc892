use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample value type held by every time series
pub type Sample = f32;

/// Absolute time as seconds since 1970-01-01T00:00:00Z
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct EpochTime(f64);

impl EpochTime {
    pub const fn new(seconds: f64) -> Self {
        Self(seconds)
    }

    /// Seconds since the Unix epoch
    pub fn seconds(&self) -> f64 {
        self.0
    }

    /// Build a time from the SAC calendar fields (year, day of year, hour, minute, second, millisecond).
    ///
    /// Out-of-range day/hour/minute values roll over into the next unit rather than failing.
    pub fn from_julian(
        year: i32,
        jday: i32,
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
    ) -> SeisResult<Self> {
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| SeisError::InvalidArgument(format!("Invalid year: {}", year)))?;
        let midnight = jan1
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| SeisError::InvalidArgument(format!("Invalid year: {}", year)))?;
        let base = Utc.from_utc_datetime(&midnight);
        let day_offset = base + Duration::days(i64::from(jday) - 1);
        let seconds = day_offset.timestamp() as f64
            + f64::from(hour) * 3600.0
            + f64::from(minute) * 60.0
            + f64::from(second)
            + f64::from(millisecond) / 1000.0;
        Ok(Self(seconds))
    }

    /// Split into (year, day of year, hour, minute, second, millisecond), rounding to the nearest millisecond
    pub fn to_julian(&self) -> (i32, i32, i32, i32, i32, i32) {
        let total_ms = (self.0 * 1000.0).round() as i64;
        let whole = total_ms.div_euclid(1000);
        let millis = total_ms.rem_euclid(1000) as i32;
        use chrono::{Datelike, Timelike};
        match Utc.timestamp_opt(whole, 0).single() {
            Some(dt) => (
                dt.year(),
                dt.ordinal() as i32,
                dt.hour() as i32,
                dt.minute() as i32,
                dt.second() as i32,
                millis,
            ),
            None => (1970, 1, 0, 0, 0, 0),
        }
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let whole = self.0.floor();
        let nanos = ((self.0 - whole) * 1e9).round() as u32;
        Utc.timestamp_opt(whole as i64, nanos.min(999_999_999)).single()
    }

    pub fn plus(&self, seconds: f64) -> Self {
        Self(self.0 + seconds)
    }

    pub fn minus(&self, other: EpochTime) -> f64 {
        self.0 - other.0
    }
}

impl From<f64> for EpochTime {
    fn from(seconds: f64) -> Self {
        Self(seconds)
    }
}

impl From<DateTime<Utc>> for EpochTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9)
    }
}

impl fmt::Display for EpochTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{:.3}", self.0),
        }
    }
}

/// Closed time window [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Epoch {
    pub start: EpochTime,
    pub end: EpochTime,
}

impl Epoch {
    /// Create a window, swapping the bounds if they are given in reverse order
    pub fn new(start: EpochTime, end: EpochTime) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    pub fn duration(&self) -> f64 {
        self.end.minus(self.start)
    }

    pub fn contains(&self, time: EpochTime) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn contains_epoch(&self, other: &Epoch) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }

    pub fn intersects(&self, other: &Epoch) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Overlapping window, or None when the windows are disjoint
    pub fn intersection(&self, other: &Epoch) -> Option<Epoch> {
        if !self.intersects(other) {
            return None;
        }
        let start = if self.start > other.start { self.start } else { other.start };
        let end = if self.end < other.end { self.end } else { other.end };
        Some(Epoch { start, end })
    }

    /// Smallest window containing both
    pub fn union(&self, other: &Epoch) -> Epoch {
        let start = if self.start < other.start { self.start } else { other.start };
        let end = if self.end > other.end { self.end } else { other.end };
        Epoch { start, end }
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Error types for seismic data handling
#[derive(Debug, thiserror::Error)]
pub enum SeisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode failure: {0}")]
    Decode(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Incompatible sample rates: {first} Hz vs {second} Hz")]
    IncompatibleSampleRate { first: f64, second: f64 },

    #[error("Merge conflict: {0}")]
    MergeConflict(String),

    #[error("Index out of range: {0}")]
    OutOfRange(String),
}

/// Result type for seismic operations
pub type SeisResult<T> = Result<T, SeisError>;
