//! The `SeismicSignal` trait: the sample-level surface shared by evenly
//! sampled signals.
//!
//! Implementors provide the sample buffer, the timing, cached statistics and a
//! single mutation hook. Every unary operation and most queries are provided
//! on top of those.

use crate::core::series_math;
use crate::core::statistics::SampleStatistics;
use crate::types::{Epoch, EpochTime, Sample, SeisError, SeisResult};

/// Minimum samples required on each side of a pick for an SNR estimate
pub const MIN_SNR_WINDOW_SAMPLES: f64 = 10.0;

pub trait SeismicSignal {
    fn samples(&self) -> &[Sample];

    /// Samples per second
    fn sample_rate(&self) -> f64;

    fn start_time(&self) -> EpochTime;

    /// Statistics of the current samples
    fn statistics(&self) -> SampleStatistics;

    /// Apply an in-place edit to the sample buffer and invalidate any cached
    /// values derived from it
    fn modify_samples(&mut self, edit: &mut dyn FnMut(&mut [Sample]));

    fn len(&self) -> usize {
        self.samples().len()
    }

    fn is_empty(&self) -> bool {
        self.samples().is_empty()
    }

    /// Sample interval in seconds
    fn delta(&self) -> f64 {
        1.0 / self.sample_rate()
    }

    fn nyquist(&self) -> f64 {
        self.sample_rate() / 2.0
    }

    /// Seconds from the first to the last sample
    fn segment_length(&self) -> f64 {
        if self.len() > 1 {
            (self.len() - 1) as f64 / self.sample_rate()
        } else {
            0.0
        }
    }

    fn end_time(&self) -> EpochTime {
        self.start_time().plus(self.segment_length())
    }

    fn epoch(&self) -> Epoch {
        Epoch::new(self.start_time(), self.end_time())
    }

    fn length_seconds(&self) -> f64 {
        self.epoch().duration()
    }

    /// Nearest sample index for an absolute time (may be negative or past the end)
    fn index_for_time(&self, time: EpochTime) -> i64 {
        (time.minus(self.start_time()) * self.sample_rate()).round() as i64
    }

    fn time_at_index(&self, index: usize) -> EpochTime {
        self.start_time().plus(index as f64 / self.sample_rate())
    }

    /// Number of samples spanning `seconds`, counting both ends
    fn points_in(&self, seconds: f64) -> usize {
        ((seconds * self.sample_rate()).round().max(0.0) as usize) + 1
    }

    fn sum(&self) -> f64 {
        series_math::sum(self.samples())
    }

    /// Sum of squared samples
    fn power(&self) -> f64 {
        series_math::power(self.samples())
    }

    /// Largest absolute sample value
    fn extremum(&self) -> Sample {
        series_math::extremum(self.samples())
    }

    fn mean(&self) -> f64 {
        self.statistics().mean
    }

    fn median(&self) -> f64 {
        self.statistics().median
    }

    fn min(&self) -> f64 {
        self.statistics().min
    }

    fn max(&self) -> f64 {
        self.statistics().max
    }

    fn rms(&self) -> f64 {
        self.statistics().rms
    }

    fn variance(&self) -> f64 {
        self.statistics().variance
    }

    fn std_dev(&self) -> f64 {
        self.statistics().std_dev
    }

    fn range(&self) -> f64 {
        self.statistics().range()
    }

    /// Offset in seconds and value of the largest sample
    fn max_time(&self) -> Option<(f64, Sample)> {
        series_math::max_index(self.samples()).map(|(i, v)| (i as f64 / self.sample_rate(), v))
    }

    fn peak_to_peak_amplitude(&self, period: f64) -> SeisResult<f64> {
        series_math::peak_to_peak_amplitude(self.samples(), self.delta(), period)
    }

    /// Signal-to-noise ratio around a pick.
    ///
    /// The noise window spans up to `pre_seconds` before the pick and the signal
    /// window up to `post_seconds` after it, both clipped to the data. At least
    /// ten samples must be available on each side.
    fn snr(&self, pick: EpochTime, pre_seconds: f64, post_seconds: f64) -> SeisResult<f64> {
        let rate = self.sample_rate();
        let start = self.start_time();
        let end = self.end_time();
        if pick.minus(start) * rate < MIN_SNR_WINDOW_SAMPLES {
            return Err(SeisError::InvalidArgument(format!(
                "Pick at {} leaves fewer than {} samples before it",
                pick, MIN_SNR_WINDOW_SAMPLES
            )));
        }
        if end.minus(pick) * rate < MIN_SNR_WINDOW_SAMPLES {
            return Err(SeisError::InvalidArgument(format!(
                "Pick at {} leaves fewer than {} samples after it",
                pick, MIN_SNR_WINDOW_SAMPLES
            )));
        }
        let pre_start = if pick.plus(-pre_seconds) < start { start } else { pick.plus(-pre_seconds) };
        let post_end = if pick.plus(post_seconds) > end { end } else { pick.plus(post_seconds) };

        let last = self.len() as i64 - 1;
        let index = |t: EpochTime| self.index_for_time(t).clamp(0, last) as usize;
        series_math::snr(self.samples(), index(pick), index(pre_start), index(post_end))
    }

    fn add_scalar(&mut self, value: f64) {
        self.modify_samples(&mut |d| series_math::add_scalar(d, value));
    }

    fn multiply_scalar(&mut self, value: f64) {
        self.modify_samples(&mut |d| series_math::multiply_scalar(d, value));
    }

    fn remove_mean(&mut self) {
        self.modify_samples(&mut |d| series_math::remove_mean(d));
    }

    fn remove_median(&mut self) {
        self.modify_samples(&mut |d| series_math::remove_median(d));
    }

    fn remove_trend(&mut self) {
        self.modify_samples(&mut |d| series_math::remove_trend(d));
    }

    fn square(&mut self) {
        self.modify_samples(&mut |d| series_math::square(d));
    }

    /// Square root with non-positive samples set to zero
    fn sqrt(&mut self) {
        self.modify_samples(&mut |d| series_math::sqrt(d));
    }

    fn signed_square(&mut self) {
        self.modify_samples(&mut |d| series_math::signed_square(d));
    }

    fn signed_sqrt(&mut self) {
        self.modify_samples(&mut |d| series_math::signed_sqrt(d));
    }

    fn signum(&mut self) {
        self.modify_samples(&mut |d| series_math::signum(d));
    }

    fn log10(&mut self) {
        self.modify_samples(&mut |d| series_math::log10(d));
    }

    fn reverse(&mut self) {
        self.modify_samples(&mut |d| d.reverse());
    }

    fn taper(&mut self, percent: f64) {
        self.modify_samples(&mut |d| series_math::taper(d, percent));
    }

    fn triangle_taper(&mut self, percent: f64) {
        self.modify_samples(&mut |d| series_math::triangle_taper(d, percent));
    }

    fn differentiate(&mut self) {
        let rate = self.sample_rate();
        self.modify_samples(&mut |d| series_math::differentiate(d, rate));
    }

    fn remove_glitches(&mut self, threshold: f64) {
        self.modify_samples(&mut |d| series_math::remove_glitches(d, threshold));
    }

    /// Sliding-mean smoothing; fails when `half_width` exceeds the length
    fn smooth(&mut self, half_width: usize) -> SeisResult<()> {
        let smoothed = series_math::mean_smooth(self.samples(), half_width)?;
        self.modify_samples(&mut |d| d.copy_from_slice(&smoothed));
        Ok(())
    }

    /// Multiply so that the sample range equals `max - min`
    fn scale_to(&mut self, min: f64, max: f64) {
        let range = self.range();
        if range > 0.0 {
            self.multiply_scalar((max - min) / range);
        }
    }

    /// Scale down so the range does not exceed `max_range`
    fn set_maximum_range(&mut self, max_range: f64) -> SeisResult<()> {
        if max_range <= 0.0 {
            return Err(SeisError::InvalidArgument(format!(
                "Maximum range must be positive, got {}",
                max_range
            )));
        }
        let range = self.range();
        if range > max_range {
            self.multiply_scalar(max_range / range);
        }
        Ok(())
    }
}
