//! Time-aligned combination of two series: sample-wise arithmetic over the
//! overlap, in-place summation over the union, merging and appending.

use crate::core::signal::SeismicSignal;
use crate::core::time_series::TimeSeries;
use crate::types::{EpochTime, Sample, SeisError, SeisResult};

/// Offset corrections tried in order when merging overlapping series
const MERGE_SHIFTS: [i64; 3] = [0, -1, 1];

fn merge_samples(earlier: Sample, later: Sample, ignore_mismatch: bool) -> SeisResult<Sample> {
    if earlier == later || later == 0.0 {
        Ok(earlier)
    } else if earlier == 0.0 {
        Ok(later)
    } else if ignore_mismatch {
        Ok((earlier + later) / 2.0)
    } else {
        Err(SeisError::MergeConflict(format!(
            "Overlapped data have different values ({} vs {})",
            earlier, later
        )))
    }
}

/// Lay `earlier` at index 0 and `later` at `offset` in a buffer of `len` samples
fn merge(
    later: &[Sample],
    earlier: &[Sample],
    len: usize,
    offset: usize,
    ignore_mismatch: bool,
) -> SeisResult<Vec<Sample>> {
    if earlier.len() > len || offset + later.len() > len {
        return Err(SeisError::MergeConflict(format!(
            "Segments of {} and {} samples at offset {} do not fit in {} samples",
            earlier.len(),
            later.len(),
            offset,
            len
        )));
    }
    let mut merged = vec![0.0; len];
    merged[..earlier.len()].copy_from_slice(earlier);
    for (j, &value) in later.iter().enumerate() {
        let k = offset + j;
        merged[k] = if k < earlier.len() {
            merge_samples(earlier[k], value, ignore_mismatch)?
        } else {
            value
        };
    }
    Ok(merged)
}

fn incompatible(first: &TimeSeries, second: &TimeSeries) -> SeisError {
    SeisError::IncompatibleSampleRate {
        first: first.sample_rate(),
        second: second.sample_rate(),
    }
}

impl TimeSeries {
    /// Apply `f` sample by sample over the overlap of the two series.
    ///
    /// `other` is resampled to this rate first when the rates are not
    /// comparable. The result starts at the later start time and is empty when
    /// the series do not overlap by more than an instant.
    pub fn intersect<F>(&self, other: &TimeSeries, f: F) -> TimeSeries
    where
        F: Fn(f64, f64) -> f64,
    {
        let resampled;
        let other = if self.rate_is_comparable(other) {
            other
        } else {
            let mut copy = other.clone();
            match copy.interpolate(self.sample_rate()) {
                Ok(()) => {
                    resampled = copy;
                    &resampled
                }
                Err(_) => other,
            }
        };

        let start = if self.start_time() > other.start_time() {
            self.start_time()
        } else {
            other.start_time()
        };
        let end = if self.end_time() < other.end_time() {
            self.end_time()
        } else {
            other.end_time()
        };

        let overlap = if start < end {
            let section = self.sub_section(start, end);
            let other_section = other.sub_section(start, end);
            section
                .iter()
                .zip(&other_section)
                .map(|(&x, &y)| f(x as f64, y as f64) as Sample)
                .collect()
        } else {
            Vec::new()
        };
        self.derive(overlap, self.sample_rate(), start)
    }

    pub fn add(&self, other: &TimeSeries) -> TimeSeries {
        self.intersect(other, |x, y| x + y)
    }

    pub fn subtract(&self, other: &TimeSeries) -> TimeSeries {
        self.intersect(other, |x, y| x - y)
    }

    pub fn multiply(&self, other: &TimeSeries) -> TimeSeries {
        self.intersect(other, |x, y| x * y)
    }

    pub fn divide(&self, other: &TimeSeries) -> TimeSeries {
        self.intersect(other, |x, y| x / y)
    }

    /// Sum `other` into this series over the span covering both, zero-filling
    /// where only one of them has data
    pub fn add_in_place(&mut self, other: &TimeSeries) -> SeisResult<()> {
        if !self.rate_is_comparable(other) {
            return Err(incompatible(self, other));
        }
        let rate = self.sample_rate();
        let my_start = self.start_time();
        let other_start = other.start_time();
        let earliest = if my_start < other_start { my_start } else { other_start };
        let latest = if self.end_time() > other.end_time() {
            self.end_time()
        } else {
            other.end_time()
        };

        let my_offset = (my_start.minus(earliest) * rate).round() as usize;
        let other_offset = (other_start.minus(earliest) * rate).round() as usize;
        let npts = ((latest.minus(earliest) * rate).round() as usize + 1)
            .max(my_offset + self.len())
            .max(other_offset + other.len());

        let mut result = vec![0.0f32; npts];
        result[my_offset..my_offset + self.len()].copy_from_slice(self.samples());
        for (slot, &v) in result[other_offset..].iter_mut().zip(other.samples()) {
            *slot += v;
        }
        self.set_samples(result);
        self.set_start_time(earliest);
        Ok(())
    }

    /// Merge two overlapping or adjacent series into one spanning both.
    ///
    /// Where both have data, equal samples are kept, a zero yields to the other
    /// value, and conflicting values are averaged when `ignore_mismatch` is set
    /// or rejected with `MergeConflict` otherwise. Offsets one sample either
    /// side of the nominal alignment are tried before giving up.
    pub fn union(&self, other: &TimeSeries, ignore_mismatch: bool) -> SeisResult<TimeSeries> {
        if !self.rate_is_comparable(other) {
            return Err(incompatible(self, other));
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.is_empty() {
            return Ok(other.clone());
        }

        let self_first = self.start_time() <= other.start_time();
        let (earlier, later) = if self_first { (self, other) } else { (other, self) };
        let min_start = earlier.start_time();
        let max_end = if self.end_time() > other.end_time() {
            self.end_time()
        } else {
            other.end_time()
        };
        // Offset is measured at the later series' own rate
        let npts = self.points_in(max_end.minus(min_start)) as i64;
        let nominal = (later.start_time().minus(min_start) * later.sample_rate()).round() as i64;

        let mut last_error = None;
        for shift in MERGE_SHIFTS {
            let len = npts + shift;
            let offset = nominal + shift;
            if len < 1 || offset < 0 {
                continue;
            }
            match merge(
                later.samples(),
                earlier.samples(),
                len as usize,
                offset as usize,
                ignore_mismatch,
            ) {
                Ok(merged) => {
                    if shift != 0 {
                        log::warn!("Merged segments using an offset correction of {} samples", shift);
                    }
                    return Ok(self.derive(merged, self.sample_rate(), min_start));
                }
                Err(e) => {
                    log::debug!("Merge with shift {} failed: {}", shift, e);
                    last_error = Some(e);
                }
            }
        }
        Err(match last_error {
            Some(SeisError::MergeConflict(msg)) => SeisError::MergeConflict(format!(
                "Could not merge segments using shifts of (-1, 0, 1): {}",
                msg
            )),
            Some(e) => e,
            None => SeisError::MergeConflict(
                "Could not merge segments using shifts of (-1, 0, 1)".to_string(),
            ),
        })
    }

    /// Splice `other` onto the end of this series.
    ///
    /// The splice point is corrected by the start-time mismatch in samples:
    /// overlapping samples are taken from `other`, and a gap is padded with the
    /// last sample of this series. When the rates differ the result rate is
    /// recomputed from the combined span.
    pub fn append(&self, other: &TimeSeries) -> SeisResult<TimeSeries> {
        if !self.rate_is_comparable(other) {
            log::warn!("Appending series with different sample rates ({}) - ({})", self, other);
        }
        let rate = self.sample_rate();
        let n1 = self.len() as i64;
        let n2 = other.len() as i64;
        let expected_start = self.end_time().plus(self.delta());
        let error = (expected_start.minus(other.start_time()) * rate).round() as i64;

        let npts = n1 + n2 - error;
        let offset = n1 - error;
        if npts < 1 || offset < 0 {
            return Err(SeisError::InvalidArgument(format!(
                "After correcting for a start time mismatch of {} samples the appended series is empty",
                error
            )));
        }

        let mut merged = vec![0.0f32; npts as usize];
        merged[..self.len()].copy_from_slice(self.samples());
        if error < 0 {
            if let Some(&last) = self.samples().last() {
                for v in &mut merged[self.len()..offset as usize] {
                    *v = last;
                }
            }
        }
        merged[offset as usize..].copy_from_slice(other.samples());

        let mut new_rate = rate;
        if other.sample_rate() != rate && npts > 1 {
            let duration = other.end_time().minus(self.start_time());
            new_rate = (npts - 1) as f64 / duration;
            log::warn!("Append changed sample rate from {} to {}", rate, new_rate);
        }
        Ok(self.derive(merged, new_rate, self.start_time()))
    }

    /// Add an equal-length series sample by sample
    pub fn add_seismogram(&mut self, other: &TimeSeries) -> SeisResult<()> {
        if !self.rate_is_comparable(other) {
            return Err(incompatible(self, other));
        }
        if self.len() != other.len() {
            return Err(SeisError::InvalidArgument(format!(
                "Cannot add series of lengths {} and {}",
                self.len(),
                other.len()
            )));
        }
        let addend = other.samples();
        self.modify_samples(&mut |d| {
            for (v, &w) in d.iter_mut().zip(addend) {
                *v += w;
            }
        });
        Ok(())
    }

    /// Add the part of `other` spanning this series' window
    pub fn add_aligned_seismogram(&mut self, other: &TimeSeries) -> SeisResult<()> {
        if !self.rate_is_comparable(other) {
            return Err(incompatible(self, other));
        }
        let section = other.sub_section(self.start_time(), self.end_time());
        if section.len() < self.len() {
            return Err(SeisError::OutOfRange(format!(
                "Other series supplies {} of {} samples over {}",
                section.len(),
                self.len(),
                self.epoch()
            )));
        }
        self.modify_samples(&mut |d| {
            for (v, &w) in d.iter_mut().zip(&section) {
                *v += w;
            }
        });
        Ok(())
    }

    /// Order by start time
    pub fn starts_before(&self, other: &TimeSeries) -> bool {
        self.start_time() < other.start_time()
    }
}

/// Latest start and earliest end of a set of series, or None when they share no window
pub fn common_window(series: &[TimeSeries]) -> Option<(EpochTime, EpochTime)> {
    let first = series.first()?;
    let (start, end) = series.iter().skip(1).fold(
        (first.start_time(), first.end_time()),
        |(s, e), ts| {
            let s = if ts.start_time() > s { ts.start_time() } else { s };
            let e = if ts.end_time() < e { ts.end_time() } else { e };
            (s, e)
        },
    );
    if start <= end {
        Some((start, end))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(data: Vec<f32>, rate: f64, start: f64) -> TimeSeries {
        TimeSeries::new(data, rate, EpochTime::new(start)).unwrap()
    }

    #[test]
    fn test_intersect_overlap() {
        let a = series((0..10).map(|i| i as f32).collect(), 1.0, 0.0);
        let b = series(vec![100.0; 10], 1.0, 5.0);
        let sum = a.add(&b);
        assert_eq!(sum.len(), 5);
        assert_relative_eq!(sum.start_time().seconds(), 5.0);
        assert_relative_eq!(sum.end_time().seconds(), 9.0);
        assert_eq!(sum.samples(), &[105.0, 106.0, 107.0, 108.0, 109.0]);

        let diff = a.subtract(&b);
        assert_eq!(diff.samples()[0], -95.0);
        let prod = a.multiply(&b);
        assert_eq!(prod.samples()[1], 600.0);
        let quot = b.divide(&a);
        assert_relative_eq!(quot.samples()[0], 20.0);
    }

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let a = series(vec![1.0; 5], 1.0, 0.0);
        let b = series(vec![1.0; 5], 1.0, 10.0);
        let r = a.add(&b);
        assert!(r.is_empty());
        assert_relative_eq!(r.start_time().seconds(), 10.0);
    }

    #[test]
    fn test_intersect_resamples_other() {
        let a = series(vec![1.0; 11], 2.0, 0.0);
        let b = series(vec![2.0; 6], 1.0, 0.0);
        let r = a.add(&b);
        assert!(!r.is_empty());
        for v in r.samples() {
            assert_relative_eq!(*v, 3.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_add_in_place_spans_both() {
        let mut a = series(vec![1.0, 1.0, 1.0], 1.0, 10.0);
        let b = series(vec![2.0, 2.0, 2.0], 1.0, 12.0);
        a.add_in_place(&b).unwrap();
        assert_eq!(a.samples(), &[1.0, 1.0, 3.0, 2.0, 2.0]);
        assert_relative_eq!(a.start_time().seconds(), 10.0);

        let mut c = series(vec![5.0], 1.0, 8.0);
        c.add_in_place(&a).unwrap();
        assert_eq!(c.samples(), &[5.0, 0.0, 1.0, 1.0, 3.0, 2.0, 2.0]);

        let fast = series(vec![1.0; 3], 2.0, 0.0);
        assert!(matches!(
            c.add_in_place(&fast),
            Err(SeisError::IncompatibleSampleRate { .. })
        ));
    }

    #[test]
    fn test_union_fills_zeros_and_extends() {
        let a = series(vec![1.0, 2.0, 0.0, 4.0], 1.0, 0.0);
        let b = series(vec![3.0, 4.0, 5.0, 6.0], 1.0, 2.0);
        let u = a.union(&b, false).unwrap();
        assert_eq!(u.samples(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_relative_eq!(u.start_time().seconds(), 0.0);

        let v = b.union(&a, false).unwrap();
        assert_eq!(v.samples(), u.samples());
        assert_relative_eq!(v.start_time().seconds(), 0.0);
    }

    #[test]
    fn test_union_conflict() {
        let a = series(vec![1.0, 2.0, 3.0, 4.0], 1.0, 0.0);
        let b = series(vec![9.0, 9.0, 5.0], 1.0, 2.0);
        assert!(matches!(a.union(&b, false), Err(SeisError::MergeConflict(_))));

        let avg = a.union(&b, true).unwrap();
        assert_eq!(avg.samples(), &[1.0, 2.0, 6.0, 6.5, 5.0]);
    }

    #[test]
    fn test_union_rejects_rate_mismatch() {
        let a = series(vec![1.0; 4], 1.0, 0.0);
        let b = series(vec![1.0; 4], 2.0, 0.0);
        assert!(matches!(
            a.union(&b, true),
            Err(SeisError::IncompatibleSampleRate { .. })
        ));
    }

    #[test]
    fn test_append_contiguous() {
        let a = series(vec![1.0, 2.0, 3.0], 1.0, 0.0);
        let b = series(vec![4.0, 5.0], 1.0, 3.0);
        let r = a.append(&b).unwrap();
        assert_eq!(r.samples(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_relative_eq!(r.sample_rate(), 1.0);
    }

    #[test]
    fn test_append_pads_gap_with_last_sample() {
        let a = series(vec![1.0, 2.0, 3.0], 1.0, 0.0);
        let b = series(vec![4.0, 5.0], 1.0, 5.0);
        let r = a.append(&b).unwrap();
        assert_eq!(r.samples(), &[1.0, 2.0, 3.0, 3.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_append_overlap_prefers_other() {
        let a = series(vec![1.0, 2.0, 3.0], 1.0, 0.0);
        let b = series(vec![7.0, 8.0], 1.0, 2.0);
        let r = a.append(&b).unwrap();
        assert_eq!(r.samples(), &[1.0, 2.0, 7.0, 8.0]);

        let early = series(vec![7.0], 1.0, -10.0);
        assert!(a.append(&early).is_err());
    }

    #[test]
    fn test_add_seismogram_variants() {
        let mut a = series(vec![1.0, 1.0, 1.0], 1.0, 0.0);
        a.add_seismogram(&series(vec![1.0, 2.0, 3.0], 1.0, 50.0)).unwrap();
        assert_eq!(a.samples(), &[2.0, 3.0, 4.0]);
        assert!(a.add_seismogram(&series(vec![1.0], 1.0, 0.0)).is_err());

        let wide = series((0..10).map(|i| i as f32).collect(), 1.0, -2.0);
        a.add_aligned_seismogram(&wide).unwrap();
        assert_eq!(a.samples(), &[4.0, 6.0, 8.0]);

        let short = series(vec![1.0], 1.0, 1.0);
        assert!(a.add_aligned_seismogram(&short).is_err());
    }

    #[test]
    fn test_common_window() {
        let list = vec![
            series(vec![0.0; 10], 1.0, 0.0),
            series(vec![0.0; 10], 1.0, 4.0),
        ];
        let (s, e) = common_window(&list).unwrap();
        assert_relative_eq!(s.seconds(), 4.0);
        assert_relative_eq!(e.seconds(), 9.0);
        assert!(common_window(&[]).is_none());
    }
}
