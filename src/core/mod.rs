//! Core geodesy and signal processing modules

pub mod coordinates;
pub mod geodesic;
pub mod earth_model;
pub mod transform;
pub mod series_math;
pub mod statistics;
pub mod filter;
pub mod spectrum;
pub mod signal;
pub mod time_series;
pub mod combine;

// Re-export main types
pub use coordinates::{EcefCoordinate, EnuCoordinate, GeodeticCoordinate, NezCoordinate};
pub use geodesic::{Geodesic, GeodesicData, GeodesicLine};
pub use earth_model::GeodesicResult;
pub use statistics::SampleStatistics;
pub use filter::{Biquad, IirFilter, Passband};
pub use spectrum::{AmplitudeSpectrum, SpectralProcessor};
pub use signal::SeismicSignal;
pub use time_series::{Norm, TimeSeries};
