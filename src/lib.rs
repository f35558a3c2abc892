//! seiscore: seismogram time-series core
//!
//! Reads and writes SAC waveform files, solves WGS84 geodetic problems
//! (distance, azimuth, azimuthal gap, local frames) and processes evenly
//! sampled series: arithmetic, Butterworth filtering, resampling, cutting,
//! gap detection and time-aligned combination.

pub mod types;
pub mod config;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{Epoch, EpochTime, Sample, SeisError, SeisResult};
pub use config::{ByteOrder, SacConfig, SampleFormat, SeriesConfig};

pub use io::{read_sac, read_time_series, write_sac, SacFile, SacHeader};
pub use crate::core::{
    GeodeticCoordinate, IirFilter, Norm, Passband, SampleStatistics, SeismicSignal, TimeSeries,
};
