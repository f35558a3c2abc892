//! Processing configuration
//!
//! Tolerances and I/O options are carried as explicit parameter structs so that
//! callers can load them from any serde format instead of mutating shared state.

use crate::types::{SeisError, SeisResult};
use serde::{Deserialize, Serialize};

/// Parameters governing time-series comparison and gap detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Maximum relative sample-rate error for two series to be combined
    pub rate_tolerance: f64,
    /// Minimum run of exact-zero samples reported as a data gap
    pub min_gap_samples: usize,
    /// Tolerance used by approximate equality of rates, times and samples
    pub equality_epsilon: f64,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            rate_tolerance: 0.005,    // 0.5 %
            min_gap_samples: 5,
            equality_epsilon: 1e-7,
        }
    }
}

impl SeriesConfig {
    pub fn validate(&self) -> SeisResult<()> {
        if !(self.rate_tolerance.is_finite() && self.rate_tolerance >= 0.0) {
            return Err(SeisError::InvalidArgument(format!(
                "Rate tolerance must be a non-negative number, got {}",
                self.rate_tolerance
            )));
        }
        if self.min_gap_samples == 0 {
            return Err(SeisError::InvalidArgument(
                "Minimum gap length must be at least one sample".to_string(),
            ));
        }
        Ok(())
    }
}

/// Byte order of the numeric header words and float samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

/// Encoding of the sample payload following the SAC header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    /// IEEE 754 single precision
    Float32,
    /// Signed 32-bit integer
    Int32,
    /// Packed 3-byte signed big-endian integer
    Int24,
}

impl SampleFormat {
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::Float32 | SampleFormat::Int32 => 4,
            SampleFormat::Int24 => 3,
        }
    }

    /// Guess the payload encoding from its length; only packed 3-byte data is distinguishable
    pub fn detect(payload_len: usize, npts: usize) -> Self {
        if npts > 0 && payload_len == npts * 3 {
            SampleFormat::Int24
        } else {
            SampleFormat::Float32
        }
    }
}

/// SAC reader/writer options
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SacConfig {
    /// Byte order used when writing
    pub output_byte_order: ByteOrder,
    /// Sample encoding forced on read (instead of detecting it) and used on
    /// write (`Float32` when unset)
    pub sample_format: Option<SampleFormat>,
}
