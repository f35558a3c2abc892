//! FFT helpers: amplitude spectra and the analytic-signal envelope.

use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One-sided amplitude spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmplitudeSpectrum {
    /// Frequency spacing in Hz
    pub df: f64,
    /// Bin frequencies from 0 to Nyquist
    pub frequencies: Vec<f64>,
    /// `|X(f)| * delta` for each bin
    pub amplitudes: Vec<f64>,
}

/// Forward and inverse transforms for one padded size
pub struct SpectralProcessor {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl fmt::Debug for SpectralProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralProcessor").field("size", &self.size).finish()
    }
}

impl SpectralProcessor {
    /// Plan transforms for `len` samples padded up to a power of two
    pub fn for_length(len: usize) -> Self {
        let size = len.max(1).next_power_of_two();
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Self {
            size,
            forward,
            inverse,
            scratch: vec![Complex64::new(0.0, 0.0); scratch_len],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Zero-padded forward transform of real samples
    pub fn fft(&mut self, data: &[f32]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = data
            .iter()
            .take(self.size)
            .map(|&v| Complex64::new(v as f64, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::new(0.0, 0.0));
        self.forward.process_with_scratch(&mut buffer, &mut self.scratch);
        buffer
    }

    /// Normalised inverse transform in place
    pub fn ifft_inplace(&mut self, buffer: &mut [Complex64]) {
        self.inverse.process_with_scratch(buffer, &mut self.scratch);
        let scale = 1.0 / self.size as f64;
        for v in buffer.iter_mut() {
            *v *= scale;
        }
    }

    /// Discrete Hilbert transform of `data`, truncated back to its length
    pub fn hilbert(&mut self, data: &[f32]) -> Vec<f32> {
        let mut spectrum = self.fft(data);
        let half = self.size / 2;
        for v in spectrum.iter_mut().take(half).skip(1) {
            *v *= 2.0;
        }
        for v in spectrum.iter_mut().skip(half + 1) {
            *v = Complex64::new(0.0, 0.0);
        }
        self.ifft_inplace(&mut spectrum);
        spectrum.iter().take(data.len()).map(|c| c.im as f32).collect()
    }
}

/// One-sided amplitude spectrum of samples taken every `delta` seconds
pub fn amplitude_spectrum(data: &[f32], delta: f64) -> AmplitudeSpectrum {
    let mut processor = SpectralProcessor::for_length(data.len());
    let n = processor.size();
    let spectrum = processor.fft(data);
    let df = 1.0 / (n as f64 * delta);
    let bins = n / 2 + 1;
    AmplitudeSpectrum {
        df,
        frequencies: (0..bins).map(|k| k as f64 * df).collect(),
        amplitudes: spectrum.iter().take(bins).map(|c| c.norm() * delta).collect(),
    }
}

/// Magnitude of the analytic signal, `sqrt(x² + H(x)²)`
pub fn envelope(data: &[f32]) -> Vec<f32> {
    if data.is_empty() {
        return Vec::new();
    }
    let hilbert = SpectralProcessor::for_length(data.len()).hilbert(data);
    data.iter()
        .zip(hilbert)
        .map(|(&x, h)| ((x as f64).powi(2) + (h as f64).powi(2)).sqrt() as f32)
        .collect()
}
