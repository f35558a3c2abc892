//! Slice-level numeric kernels used by the time-series core.
//!
//! Everything here works on plain slices so the kernels can be reused on
//! sub-sections without constructing a series. Accumulation is done in `f64`.

use crate::types::{SeisError, SeisResult};
use num_traits::{Float, ToPrimitive};

/// Default slope floor for Wiggins interpolation weights
const WIGGINS_EPSILON: f64 = 0.00001;

/// Minimum number of samples affected by a taper at each end
const MIN_TAPER_POINTS: usize = 5;

#[inline]
fn as_f64<T: ToPrimitive>(v: T) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

pub fn sum<T: Float>(data: &[T]) -> f64 {
    data.iter().map(|&v| as_f64(v)).sum()
}

/// Sum of squared samples
pub fn power<T: Float>(data: &[T]) -> f64 {
    data.iter()
        .map(|&v| {
            let x = as_f64(v);
            x * x
        })
        .sum()
}

/// Arithmetic mean, zero for an empty slice
pub fn mean<T: Float>(data: &[T]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    sum(data) / data.len() as f64
}

/// Median of a copy of the data, zero for an empty slice
pub fn median<T: Float>(data: &[T]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = data.iter().map(|&v| as_f64(v)).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let half = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        0.5 * (sorted[half - 1] + sorted[half])
    } else {
        sorted[half]
    }
}

/// Unbiased sample variance, zero for fewer than two samples
pub fn variance<T: Float>(data: &[T]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let ss: f64 = data
        .iter()
        .map(|&v| {
            let d = as_f64(v) - m;
            d * d
        })
        .sum();
    ss / (data.len() - 1) as f64
}

pub fn std_dev<T: Float>(data: &[T]) -> f64 {
    variance(data).sqrt()
}

/// Root mean square of the samples
pub fn rms<T: Float>(data: &[T]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    (power(data) / data.len() as f64).sqrt()
}

/// Largest absolute sample value
pub fn extremum(data: &[f32]) -> f32 {
    data.iter().fold(0.0_f32, |acc, v| acc.max(v.abs()))
}

/// Index and value of the largest sample
pub fn max_index(data: &[f32]) -> Option<(usize, f32)> {
    data.iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
}

pub fn min_max(data: &[f32]) -> Option<(f32, f32)> {
    let first = *data.first()?;
    Some(data.iter().fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))))
}

pub fn add_scalar(data: &mut [f32], value: f64) {
    for v in data.iter_mut() {
        *v = (*v as f64 + value) as f32;
    }
}

pub fn multiply_scalar(data: &mut [f32], value: f64) {
    for v in data.iter_mut() {
        *v = (*v as f64 * value) as f32;
    }
}

pub fn remove_mean(data: &mut [f32]) {
    if !data.is_empty() {
        let m = mean(data);
        add_scalar(data, -m);
    }
}

pub fn remove_median(data: &mut [f32]) {
    if !data.is_empty() {
        let m = median(data);
        add_scalar(data, -m);
    }
}

/// Least-squares slope and intercept of the samples against their index
fn linear_fit(data: &[f32]) -> (f64, f64) {
    let n = data.len() as f64;
    let tbar = (n - 1.0) / 2.0;
    let ybar = mean(data);
    let (mut ssx, mut ssxy) = (0.0, 0.0);
    for (j, &v) in data.iter().enumerate() {
        let dt = j as f64 - tbar;
        ssx += dt * dt;
        ssxy += dt * (v as f64 - ybar);
    }
    if ssx == 0.0 {
        ssx = 1.0;
    }
    let slope = ssxy / ssx;
    (slope, ybar - slope * tbar)
}

/// Slope of the best-fitting line through the samples (per sample)
pub fn slope(data: &[f32]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    linear_fit(data).0
}

/// Subtract the best-fitting straight line
pub fn remove_trend(data: &mut [f32]) {
    if data.len() < 2 {
        return;
    }
    let (b1, b0) = linear_fit(data);
    for (j, v) in data.iter_mut().enumerate() {
        *v = (*v as f64 - (b0 + b1 * j as f64)) as f32;
    }
}

/// Differentiate in place.
///
/// Central differences of order h⁴ in the interior, second-order forward and
/// backward differences for the first and last two samples. Series shorter than
/// four samples are left unchanged.
pub fn differentiate(data: &mut [f32], sample_rate: f64) {
    let n = data.len();
    if n < 4 {
        return;
    }
    let h = 1.0 / sample_rate;
    let h2 = 2.0 * h;
    let h12 = 12.0 * h;
    let d = |i: usize| data[i] as f64;

    let mut tmp = vec![0.0_f64; n];
    for (j, t) in tmp.iter_mut().enumerate().take(2) {
        *t = (4.0 * d(j + 1) - d(j + 2) - 3.0 * d(j)) / h2;
    }
    for (j, t) in tmp.iter_mut().enumerate().take(n - 2).skip(2) {
        *t = (8.0 * d(j + 1) + d(j - 2) - d(j + 2) - 8.0 * d(j - 1)) / h12;
    }
    for (j, t) in tmp.iter_mut().enumerate().skip(n - 2) {
        *t = (3.0 * d(j) + d(j - 2) - 4.0 * d(j - 1)) / h2;
    }
    for (v, t) in data.iter_mut().zip(tmp) {
        *v = t as f32;
    }
}

/// Sliding-window mean of width `2 * half_width + 1`; the first and last
/// `half_width` samples are copied through unchanged.
pub fn mean_smooth(data: &[f32], half_width: usize) -> SeisResult<Vec<f32>> {
    let n = data.len();
    if half_width > n {
        return Err(SeisError::InvalidArgument(format!(
            "Smoothing half-width {} exceeds series length {}",
            half_width, n
        )));
    }
    let mut result = data.to_vec();
    if n < 2 * half_width + 1 {
        return Ok(result);
    }
    let width = (2 * half_width + 1) as f64;
    let mut window: f64 = data[..2 * half_width + 1].iter().map(|&v| v as f64).sum();
    for j in half_width..n - half_width {
        if j > half_width {
            window += data[j + half_width] as f64 - data[j - half_width - 1] as f64;
        }
        result[j] = (window / width) as f32;
    }
    Ok(result)
}

/// Number of samples tapered at each end, or None when the series is too short
fn taper_points(n: usize, percent: f64) -> Option<usize> {
    if n < 2 * MIN_TAPER_POINTS {
        return None;
    }
    let points = ((percent / 100.0) * n as f64).max(0.0) as usize;
    Some(points.min(n / 2).max(MIN_TAPER_POINTS))
}

/// Symmetric cosine (Hann) taper applied to both ends
pub fn taper(data: &mut [f32], percent: f64) {
    let n = data.len();
    let Some(points) = taper_points(n, percent) else {
        return;
    };
    let factor = std::f64::consts::PI / points as f64;
    for j in 0..points {
        let w = (1.0 - (j as f64 * factor).cos()) / 2.0;
        data[j] = (data[j] as f64 * w) as f32;
        data[n - j - 1] = (data[n - j - 1] as f64 * w) as f32;
    }
}

/// Linear ramp taper applied to both ends
pub fn triangle_taper(data: &mut [f32], percent: f64) {
    let n = data.len();
    let Some(points) = taper_points(n, percent) else {
        return;
    };
    let factor = 1.0 / (points - 1) as f64;
    for j in 0..points {
        let w = j as f64 * factor;
        data[j] = (data[j] as f64 * w) as f32;
        data[n - j - 1] = (data[n - j - 1] as f64 * w) as f32;
    }
}

/// Keep every `factor`-th sample; the result holds `ceil(len / factor)` samples
pub fn decimate(data: &[f32], factor: usize) -> Vec<f32> {
    if factor < 2 {
        return data.to_vec();
    }
    data.iter().step_by(factor).copied().collect()
}

/// Wiggins' weighted cubic interpolation of evenly spaced data at `t`.
///
/// The slope at each node is a weighted average of the adjacent secant slopes,
/// which suppresses overshoot near sharp changes.
pub fn wiggins_value(x_start: f64, dx: f64, y: &[f32], t: f64) -> f64 {
    let npts = y.len();
    match npts {
        0 => return 0.0,
        1 => return y[0] as f64,
        _ => {}
    }
    let offset = ((t - x_start) / dx).max(0.0);
    let j = (offset as usize).min(npts - 2);
    let dxj = t - x_start - j as f64 * dx;
    if dxj == 0.0 {
        return y[j] as f64;
    }

    let yv = |i: usize| y[i] as f64;
    let h = dx;
    let dxj1 = dxj - h;
    let hs = h * h;
    let hc = hs * h;
    let dxjs = dxj * dxj;
    let dxj1s = dxj1 * dxj1;

    let am = (yv(j + 1) - yv(j)) / h;
    let amd = if j != 0 { (yv(j) - yv(j - 1)) / dx } else { am };
    let amu = if j + 1 != npts - 1 {
        (yv(j + 2) - yv(j + 1)) / dx
    } else {
        am
    };

    let wd = 1.0 / amd.abs().max(WIGGINS_EPSILON);
    let w = 1.0 / am.abs().max(WIGGINS_EPSILON);
    let wu = 1.0 / amu.abs().max(WIGGINS_EPSILON);
    let sp = (wd * amd + w * am) / (wd + w);
    let sp1 = (w * am + wu * amu) / (w + wu);

    let t1 = yv(j) * (dxj1s / hs + 2.0 * dxj * dxj1s / hc);
    let t2 = yv(j + 1) * (dxjs / hs - 2.0 * dxj1 * dxjs / hc);
    let t3 = sp * dxj * dxj1s / hs;
    let t4 = sp1 * dxjs * dxj1 / hs;
    t1 + t2 + t3 + t4
}

/// Resample evenly spaced data from `old_dx` to `new_dx` spacing.
///
/// The output holds `floor((len - 1) * old_dx / new_dx)` samples starting at the
/// first input sample.
pub fn interpolate(y: &[f32], old_dx: f64, new_dx: f64) -> Vec<f32> {
    if y.is_empty() {
        return Vec::new();
    }
    let span = (y.len() - 1) as f64 * old_dx;
    let count = (span / new_dx) as usize;
    (0..count)
        .map(|j| wiggins_value(0.0, old_dx, y, j as f64 * new_dx) as f32)
        .collect()
}

/// Peak-to-peak range of `len` samples starting at `start`
pub fn window_peak_to_peak(data: &[f32], start: usize, len: usize) -> f64 {
    match min_max(&data[start..start + len]) {
        Some((lo, hi)) => (hi - lo) as f64,
        None => 0.0,
    }
}

/// Largest peak-to-peak range over a window of `period` seconds slid one sample at a time
pub fn peak_to_peak_amplitude(data: &[f32], sample_interval: f64, period: f64) -> SeisResult<f64> {
    let n = data.len();
    if n == 0 {
        return Err(SeisError::InvalidArgument(
            "Cannot compute peak-to-peak amplitude of an empty series".to_string(),
        ));
    }
    let window = ((period / sample_interval).round().max(0.0) as usize) + 1;
    if window >= n {
        return Ok(window_peak_to_peak(data, 0, n));
    }
    Ok((0..=n - window)
        .map(|j| window_peak_to_peak(data, j, window))
        .fold(0.0, f64::max))
}

/// Ratio of post-pick to pre-pick peak-to-peak amplitude.
///
/// The pre-pick window spans `pre_start..=pick` and the post-pick window
/// `pick..=post_end`; each must hold at least two samples. A silent pre-pick
/// window yields 1 when the post-pick window has signal and 0 otherwise.
pub fn snr(data: &[f32], pick: usize, pre_start: usize, post_end: usize) -> SeisResult<f64> {
    if pick >= data.len() || post_end >= data.len() {
        return Err(SeisError::OutOfRange(format!(
            "SNR windows exceed series length {}",
            data.len()
        )));
    }
    if pre_start > pick || pick - pre_start + 1 < 2 {
        return Err(SeisError::InvalidArgument(
            "Not enough samples in pre-pick window".to_string(),
        ));
    }
    if post_end < pick || post_end - pick + 1 < 2 {
        return Err(SeisError::InvalidArgument(
            "Not enough samples in post-pick window".to_string(),
        ));
    }
    let post = window_peak_to_peak(data, pick, post_end - pick + 1);
    let pre = window_peak_to_peak(data, pre_start, pick - pre_start + 1);
    if pre > 0.0 {
        Ok(post / pre)
    } else if post > 0.0 {
        Ok(1.0)
    } else {
        Ok(0.0)
    }
}

/// Replace samples further than `threshold` standard deviations from the median with the median
pub fn remove_glitches(data: &mut [f32], threshold: f64) {
    let m = median(data);
    let reject = threshold * std_dev(data);
    for v in data.iter_mut() {
        if (*v as f64 - m).abs() > reject {
            *v = m as f32;
        }
    }
}

pub fn square(data: &mut [f32]) {
    for v in data.iter_mut() {
        *v *= *v;
    }
}

/// Square root; non-positive samples become zero
pub fn sqrt(data: &mut [f32]) {
    for v in data.iter_mut() {
        *v = if *v <= 0.0 { 0.0 } else { v.sqrt() };
    }
}

/// `v * |v|`
pub fn signed_square(data: &mut [f32]) {
    for v in data.iter_mut() {
        *v *= v.abs();
    }
}

/// `sign(v) * sqrt(|v|)`
pub fn signed_sqrt(data: &mut [f32]) {
    for v in data.iter_mut() {
        *v = if *v <= 0.0 { -v.abs().sqrt() } else { v.sqrt() };
    }
}

/// Replace every sample by -1, 0 or 1
pub fn signum(data: &mut [f32]) {
    for v in data.iter_mut() {
        *v = if *v > 0.0 {
            1.0
        } else if *v < 0.0 {
            -1.0
        } else {
            0.0
        };
    }
}

/// Base-10 logarithm; negative samples become zero
pub fn log10(data: &mut [f32]) {
    for v in data.iter_mut() {
        *v = if *v < 0.0 { 0.0 } else { v.log10() };
    }
}

/// Inclusive index ranges of exact-zero runs at least `min_len` samples long
pub fn zero_runs(data: &[f32], min_len: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (j, &v) in data.iter().enumerate() {
        match (v == 0.0, start) {
            (true, None) => start = Some(j),
            (false, Some(s)) => {
                if j - s >= min_len {
                    runs.push((s, j - 1));
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if data.len() - s >= min_len {
            runs.push((s, data.len() - 1));
        }
    }
    runs
}

/// Root mean square difference over the common length of two slices
pub fn rmse(a: &[f32], b: &[f32]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let ss: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    (ss / n as f64).sqrt()
}
