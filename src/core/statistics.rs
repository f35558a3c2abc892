use crate::core::series_math;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary statistics of a sample buffer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Root mean square of the raw samples
    pub rms: f64,
    /// Unbiased sample variance
    pub variance: f64,
    pub std_dev: f64,
    /// Bias-corrected sample skewness, zero when undefined
    pub skewness: f64,
    /// Bias-corrected excess kurtosis, zero when undefined
    pub kurtosis: f64,
}

impl SampleStatistics {
    /// Compute the statistics of `data`; an empty slice gives all zeros
    pub fn from_samples(data: &[f32]) -> Self {
        let count = data.len();
        if count == 0 {
            return Self::default();
        }
        let (min, max) = series_math::min_max(data).unwrap_or((0.0, 0.0));
        let mean = series_math::mean(data);
        let variance = series_math::variance(data);
        let std_dev = variance.sqrt();

        let n = count as f64;
        let (mut m3, mut m4) = (0.0, 0.0);
        if std_dev > 0.0 {
            for &v in data {
                let z = (v as f64 - mean) / std_dev;
                m3 += z * z * z;
                m4 += z * z * z * z;
            }
        }
        let skewness = if count > 2 && std_dev > 0.0 {
            n / ((n - 1.0) * (n - 2.0)) * m3
        } else {
            0.0
        };
        let kurtosis = if count > 3 && std_dev > 0.0 {
            n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0)) * m4
                - 3.0 * (n - 1.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
        } else {
            0.0
        };

        Self {
            count,
            mean,
            median: series_math::median(data),
            min: min as f64,
            max: max as f64,
            rms: series_math::rms(data),
            variance,
            std_dev,
            skewness,
            kurtosis,
        }
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// (mean - median) / range, a cheap asymmetry indicator; 10000 for a constant series
    pub fn extreme_stat(&self) -> f64 {
        let range = self.range();
        if range > 0.0 {
            (self.mean - self.median) / range
        } else {
            10000.0
        }
    }
}

impl fmt::Display for SampleStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n = {}, mean = {:.6}, median = {:.6}, min = {:.6}, max = {:.6}, rms = {:.6}, std = {:.6}",
            self.count, self.mean, self.median, self.min, self.max, self.rms, self.std_dev
        )
    }
}
