use crate::config::SeriesConfig;
use crate::core::filter::{IirFilter, Passband};
use crate::core::series_math;
use crate::core::signal::SeismicSignal;
use crate::core::spectrum::{self, AmplitudeSpectrum};
use crate::core::statistics::SampleStatistics;
use crate::types::{Epoch, EpochTime, Sample, SeisError, SeisResult};
use std::cell::OnceCell;
use std::fmt;
use std::str::FromStr;

/// Scale used by `TimeSeries::normalize` after the mean is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Norm {
    /// Largest absolute sample
    Extremum,
    /// Mean of the absolute samples
    Mean,
    /// Negated minimum
    Min,
    Max,
    /// Sample range
    Delta,
    Rms,
}

impl FromStr for Norm {
    type Err = SeisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EXTREMUM" => Ok(Norm::Extremum),
            "MEAN" => Ok(Norm::Mean),
            "MIN" => Ok(Norm::Min),
            "MAX" => Ok(Norm::Max),
            "DELTA" => Ok(Norm::Delta),
            "RMS" => Ok(Norm::Rms),
            _ => Err(SeisError::InvalidArgument(format!("Unknown normalization: {}", s))),
        }
    }
}

/// Evenly sampled series with an absolute start time.
///
/// Samples are mutated in place. Statistics are cached lazily and dropped on
/// every mutation. Data gaps (runs of exact zeros) are detected when the
/// series is built and only recomputed by `refresh_data_gaps`.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    data: Vec<Sample>,
    rate: f64,
    start: EpochTime,
    gaps: Vec<Epoch>,
    config: SeriesConfig,
    stats: OnceCell<SampleStatistics>,
}

fn check_rate(rate: f64) -> SeisResult<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(SeisError::InvalidArgument(format!(
            "Sample rate must be positive and finite, got {}",
            rate
        )))
    }
}

fn find_data_gaps(data: &[Sample], rate: f64, start: EpochTime, min_len: usize) -> Vec<Epoch> {
    series_math::zero_runs(data, min_len)
        .into_iter()
        .map(|(first, last)| {
            Epoch::new(
                start.plus(first as f64 / rate),
                start.plus(last as f64 / rate),
            )
        })
        .collect()
}

impl TimeSeries {
    pub fn new(samples: Vec<Sample>, rate: f64, start: EpochTime) -> SeisResult<Self> {
        Self::with_config(samples, rate, start, SeriesConfig::default())
    }

    pub fn with_config(
        samples: Vec<Sample>,
        rate: f64,
        start: EpochTime,
        config: SeriesConfig,
    ) -> SeisResult<Self> {
        check_rate(rate)?;
        config.validate()?;
        Ok(Self::from_parts(samples, rate, start, config))
    }

    /// Build without validation; callers guarantee a valid rate and config
    pub(crate) fn from_parts(data: Vec<Sample>, rate: f64, start: EpochTime, config: SeriesConfig) -> Self {
        let gaps = find_data_gaps(&data, rate, start, config.min_gap_samples);
        Self {
            data,
            rate,
            start,
            gaps,
            config,
            stats: OnceCell::new(),
        }
    }

    /// New series sharing this one's config
    pub(crate) fn derive(&self, data: Vec<Sample>, rate: f64, start: EpochTime) -> Self {
        Self::from_parts(data, rate, start, self.config)
    }

    fn invalidate(&mut self) {
        self.stats = OnceCell::new();
    }

    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    pub fn to_vec(&self) -> Vec<Sample> {
        self.data.clone()
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.data
    }

    /// Zero runs found when the series was built or last refreshed
    pub fn data_gaps(&self) -> &[Epoch] {
        &self.gaps
    }

    pub fn refresh_data_gaps(&mut self) {
        self.gaps = find_data_gaps(&self.data, self.rate, self.start, self.config.min_gap_samples);
    }

    pub fn set_samples(&mut self, samples: Vec<Sample>) {
        self.data = samples;
        self.invalidate();
    }

    pub fn set_sample(&mut self, index: usize, value: Sample) -> SeisResult<()> {
        let len = self.data.len();
        let slot = self.data.get_mut(index).ok_or_else(|| {
            SeisError::OutOfRange(format!("Sample index {} outside series of length {}", index, len))
        })?;
        *slot = value;
        self.invalidate();
        Ok(())
    }

    /// Overwrite samples from `start_index`, dropping values past the end
    pub fn set_samples_at(&mut self, values: &[Sample], start_index: usize) -> SeisResult<()> {
        if start_index >= self.data.len() {
            return Err(SeisError::OutOfRange(format!(
                "Start index {} outside series of length {}",
                start_index,
                self.data.len()
            )));
        }
        let count = values.len().min(self.data.len() - start_index);
        self.data[start_index..start_index + count].copy_from_slice(&values[..count]);
        self.invalidate();
        Ok(())
    }

    pub fn set_start_time(&mut self, start: EpochTime) {
        self.start = start;
    }

    pub fn set_sample_rate(&mut self, rate: f64) -> SeisResult<()> {
        check_rate(rate)?;
        self.rate = rate;
        Ok(())
    }

    pub fn value_at_index(&self, index: usize) -> Option<Sample> {
        self.data.get(index).copied()
    }

    /// Linearly interpolated value at an absolute time inside the series
    pub fn value_at(&self, time: EpochTime) -> SeisResult<Sample> {
        if self.data.is_empty() || time < self.start || time > self.end_time() {
            return Err(SeisError::OutOfRange(format!(
                "Requested time {} is outside {}",
                time,
                self.epoch()
            )));
        }
        let position = time.minus(self.start) * self.rate;
        let x1 = (position.floor() as usize).min(self.data.len() - 1);
        let fraction = position - x1 as f64;
        if fraction <= 0.0 || x1 + 1 >= self.data.len() {
            return Ok(self.data[x1]);
        }
        let (y1, y2) = (self.data[x1] as f64, self.data[x1 + 1] as f64);
        Ok((y1 + fraction * (y2 - y1)) as Sample)
    }

    /// True when `epoch` lies inside the series and, unless `allow_gaps`,
    /// touches none of its data gaps
    pub fn contains(&self, epoch: &Epoch, allow_gaps: bool) -> bool {
        if !self.epoch().contains_epoch(epoch) {
            return false;
        }
        allow_gaps || !self.gaps.iter().any(|gap| gap.intersects(epoch))
    }

    /// True when this series lies entirely within `other`
    pub fn is_subset(&self, other: &TimeSeries) -> bool {
        self.start >= other.start && self.end_time() <= other.end_time()
    }

    /// Relative rate difference below the configured tolerance
    pub fn rate_is_comparable(&self, other: &TimeSeries) -> bool {
        ((self.rate - other.rate) / self.rate).abs() < self.config.rate_tolerance
    }

    pub fn is_constant(&self) -> bool {
        self.data.windows(2).all(|w| w[0] == w[1])
    }

    /// Samples between two absolute times, clamped to the series.
    ///
    /// Both bounds round to the nearest sample. A window entirely outside the
    /// series yields an empty vector.
    pub fn sub_section(&self, start: EpochTime, end: EpochTime) -> Vec<Sample> {
        if self.data.is_empty() {
            return Vec::new();
        }
        let duration = end.minus(start).abs();
        let first = self.index_for_time(start).max(0);
        let last = self
            .index_for_time(start.plus(duration))
            .min(self.data.len() as i64 - 1);
        if last < first {
            return Vec::new();
        }
        self.data[first as usize..=last as usize].to_vec()
    }

    pub fn sub_section_by_index(&self, start_index: usize, count: usize) -> SeisResult<Vec<Sample>> {
        self.data
            .get(start_index..start_index + count)
            .map(<[Sample]>::to_vec)
            .ok_or_else(|| {
                SeisError::OutOfRange(format!(
                    "Requested {} samples from index {} of a series of length {}",
                    count,
                    start_index,
                    self.data.len()
                ))
            })
    }

    /// Time of the sample nearest to `time`
    pub fn sub_section_start_time(&self, time: EpochTime) -> EpochTime {
        self.start.plus(self.index_for_time(time) as f64 / self.rate)
    }

    /// Truncate to the samples nearest `start..end`.
    ///
    /// Bounds outside the series are clamped; the new start time is snapped to
    /// the first retained sample.
    pub fn cut(&mut self, start: EpochTime, end: EpochTime) -> SeisResult<()> {
        let current_end = self.end_time();
        if start >= end {
            return Err(SeisError::InvalidArgument(format!(
                "Cut start {} is not before cut end {}",
                start, end
            )));
        }
        if start >= current_end {
            return Err(SeisError::InvalidArgument(format!(
                "Cut start {} is not before series end {}",
                start, current_end
            )));
        }
        if end <= self.start {
            return Err(SeisError::InvalidArgument(format!(
                "Cut end {} is not after series start {}",
                end, self.start
            )));
        }
        let s = if start < self.start { self.start } else { start };
        let e = if end > current_end { current_end } else { end };

        let start_index = self.index_for_time(s);
        self.data = self.sub_section(s, e);
        self.start = self.start.plus(start_index as f64 / self.rate);
        self.invalidate();
        Ok(())
    }

    pub fn cut_before(&mut self, start: EpochTime) -> SeisResult<()> {
        let end = self.end_time();
        self.cut(start, end)
    }

    pub fn cut_after(&mut self, end: EpochTime) -> SeisResult<()> {
        let start = self.start;
        self.cut(start, end)
    }

    /// Keep samples `first..=last`
    pub fn cut_indices(&mut self, first: usize, last: usize) -> SeisResult<()> {
        if self.data.is_empty() || last >= self.data.len() || first > last {
            return Err(SeisError::OutOfRange(format!(
                "Invalid cut indices {}..={} for a series of length {}",
                first,
                last,
                self.data.len()
            )));
        }
        self.data = self.data[first..=last].to_vec();
        self.start = self.start.plus(first as f64 / self.rate);
        self.invalidate();
        Ok(())
    }

    /// Cut unless the series already spans exactly `epoch`
    pub fn trim_to(&mut self, epoch: &Epoch) -> SeisResult<()> {
        if self.start == epoch.start && self.end_time() == epoch.end {
            return Ok(());
        }
        self.cut(epoch.start, epoch.end)
    }

    /// Independent copy cut to `start..end`
    pub fn crop(&self, start: EpochTime, end: EpochTime) -> SeisResult<TimeSeries> {
        let mut copy = self.clone();
        copy.cut(start, end)?;
        copy.refresh_data_gaps();
        Ok(copy)
    }

    pub fn crop_epoch(&self, epoch: &Epoch) -> SeisResult<TimeSeries> {
        self.crop(epoch.start, epoch.end)
    }

    pub fn crop_indices(&self, first: usize, last: usize) -> SeisResult<TimeSeries> {
        let mut copy = self.clone();
        copy.cut_indices(first, last)?;
        copy.refresh_data_gaps();
        Ok(copy)
    }

    /// Copy without leading and trailing zeros
    pub fn trim(&self) -> SeisResult<TimeSeries> {
        let first = self.data.iter().position(|&v| v != 0.0);
        let last = self.data.iter().rposition(|&v| v != 0.0);
        match (first, last) {
            (Some(first), Some(last)) => self.crop_indices(first, last),
            _ => Err(SeisError::InvalidArgument(
                "Cannot trim a series with no non-zero samples".to_string(),
            )),
        }
    }

    /// Keep every `factor`-th sample and divide the rate; factors below 2 do nothing
    pub fn decimate(&mut self, factor: usize) {
        if factor < 2 {
            return;
        }
        self.data = series_math::decimate(&self.data, factor);
        self.rate /= factor as f64;
        self.invalidate();
    }

    /// Resample to `new_rate` with Wiggins interpolation
    pub fn interpolate(&mut self, new_rate: f64) -> SeisResult<()> {
        check_rate(new_rate)?;
        self.data = series_math::interpolate(&self.data, 1.0 / self.rate, 1.0 / new_rate);
        self.rate = new_rate;
        self.invalidate();
        Ok(())
    }

    pub fn resample(&mut self, new_rate: f64) -> SeisResult<()> {
        self.interpolate(new_rate)
    }

    /// Interpolate `factor` times more samples over the same span while
    /// keeping the nominal sample rate
    pub fn stretch(&mut self, factor: f64) -> SeisResult<()> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(SeisError::InvalidArgument(format!(
                "Stretch factor must be positive, got {}",
                factor
            )));
        }
        let new_dx = 1.0 / (factor * self.rate);
        self.data = series_math::interpolate(&self.data, 1.0 / self.rate, new_dx);
        self.invalidate();
        Ok(())
    }

    /// Copy whose window moves by `samples` while sample times stay put.
    ///
    /// A negative shift drops leading samples and starts later; a positive one
    /// starts earlier, padding with the first sample. With `keep_length` the
    /// length is preserved by padding the end with the last sample or dropping
    /// trailing samples.
    pub fn shift(&self, samples: i64, keep_length: bool) -> SeisResult<TimeSeries> {
        if samples == 0 {
            return Ok(self.clone());
        }
        let n = self.data.len();
        let count = samples.unsigned_abs() as usize;
        if count >= n {
            return Err(SeisError::InvalidArgument(format!(
                "Cannot shift by {} samples a series of length {}",
                samples, n
            )));
        }

        let (shifted, start) = if samples < 0 {
            let mut shifted = self.data[count..].to_vec();
            if keep_length {
                shifted.resize(n, self.data[n - 1]);
            }
            (shifted, self.start.plus(count as f64 / self.rate))
        } else {
            let kept = if keep_length { n - count } else { n };
            let mut shifted = vec![self.data[0]; count];
            shifted.extend_from_slice(&self.data[..kept]);
            (shifted, self.start.plus(-(count as f64) / self.rate))
        };
        Ok(self.derive(shifted, self.rate, start))
    }

    /// Time-reverse the samples about `mirror`
    pub fn reverse_at(&mut self, mirror: EpochTime) {
        let shift = self.end_time().minus(mirror);
        self.reverse();
        self.start = mirror.plus(-shift);
    }

    /// Remove the mean, then divide by the chosen scale when it is non-zero
    pub fn normalize(&mut self, norm: Norm) {
        let scale = match norm {
            Norm::Extremum => series_math::extremum(&self.data) as f64,
            Norm::Mean => {
                self.data.iter().map(|v| v.abs() as f64).sum::<f64>() / self.data.len().max(1) as f64
            }
            Norm::Min => -self.min(),
            Norm::Max => self.max(),
            Norm::Delta => self.range(),
            Norm::Rms => self.rms(),
        };
        self.normalize_by(scale);
    }

    /// Normalize so the largest absolute sample becomes `value`
    pub fn normalize_to(&mut self, value: f64) -> SeisResult<()> {
        if value == 0.0 || !value.is_finite() {
            return Err(SeisError::InvalidArgument(format!(
                "Normalization target must be finite and non-zero, got {}",
                value
            )));
        }
        let scale = series_math::extremum(&self.data) as f64 / value;
        self.normalize_by(scale);
        Ok(())
    }

    fn normalize_by(&mut self, scale: f64) {
        self.remove_mean();
        if scale != 0.0 {
            self.multiply_scalar(1.0 / scale);
        }
    }

    /// Root mean square difference over the common samples
    pub fn rmse(&self, other: &TimeSeries) -> SeisResult<f64> {
        if self.data.len() != other.data.len() {
            return Err(SeisError::InvalidArgument(format!(
                "RMSE needs equal lengths, got {} and {}",
                self.data.len(),
                other.data.len()
            )));
        }
        Ok(series_math::rmse(&self.data, &other.data))
    }

    /// RMSE divided by this series' range when the range is non-zero
    pub fn normalized_rmse(&self, other: &TimeSeries) -> SeisResult<f64> {
        let error = self.rmse(other)?;
        let norm = self.range().abs();
        Ok(if norm > 0.0 { error / norm } else { error })
    }

    /// Same start, comparable rate and sample-wise equality within the
    /// configured epsilon, with the same number of data gaps
    pub fn approx_eq(&self, other: &TimeSeries) -> bool {
        let eps = self.config.equality_epsilon;
        self.start.minus(other.start).abs() <= eps
            && self.rate_is_comparable(other)
            && self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| ((a - b) as f64).abs() <= eps)
            && self.gaps.len() == other.gaps.len()
    }

    /// Peak-to-peak SNR restricted to `window`
    pub fn snr_in_window(
        &self,
        pick: EpochTime,
        window: &Epoch,
        pre_seconds: f64,
        post_seconds: f64,
    ) -> SeisResult<f64> {
        let bounds = self.epoch().intersection(window).ok_or_else(|| {
            SeisError::OutOfRange(format!("Window {} does not overlap {}", window, self.epoch()))
        })?;
        self.crop(bounds.start, bounds.end)?.snr(pick, pre_seconds, post_seconds)
    }

    /// Copy holding the analytic-signal envelope
    pub fn envelope(&self) -> TimeSeries {
        self.derive(spectrum::envelope(&self.data), self.rate, self.start)
    }

    pub fn amplitude_spectrum(&self) -> AmplitudeSpectrum {
        spectrum::amplitude_spectrum(&self.data, self.delta())
    }

    /// Butterworth filter in place.
    ///
    /// Low-pass and high-pass designs use `low` as the corner frequency.
    pub fn filter(
        &mut self,
        order: usize,
        passband: Passband,
        low: f64,
        high: f64,
        two_pass: bool,
    ) -> SeisResult<()> {
        let mut design = IirFilter::butterworth(order, passband, low, high, self.delta())?;
        self.apply_filter(&mut design, two_pass);
        Ok(())
    }

    pub fn apply_filter(&mut self, filter: &mut IirFilter, two_pass: bool) {
        self.modify_samples(&mut |d| filter.apply(d, two_pass));
    }

    pub fn points_between(&self, start: EpochTime, end: EpochTime) -> usize {
        self.points_in(end.minus(start))
    }
}

impl SeismicSignal for TimeSeries {
    fn samples(&self) -> &[Sample] {
        &self.data
    }

    fn sample_rate(&self) -> f64 {
        self.rate
    }

    fn start_time(&self) -> EpochTime {
        self.start
    }

    fn statistics(&self) -> SampleStatistics {
        *self
            .stats
            .get_or_init(|| SampleStatistics::from_samples(&self.data))
    }

    fn modify_samples(&mut self, edit: &mut dyn FnMut(&mut [Sample])) {
        edit(&mut self.data);
        self.invalidate();
    }
}

impl fmt::Display for TimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rate = {} Hz, start = {}, npts = {}",
            self.rate,
            self.start,
            self.data.len()
        )
    }
}
