//! Butterworth IIR filters built as cascades of second-order sections.
//!
//! The analog low-pass prototype (cutoff 1 rad/s) is mapped to the requested
//! passband in the s-domain, pre-warped, and then discretised section by section
//! with the bilinear transform.

use crate::types::{SeisError, SeisResult};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Highest supported prototype order
pub const MAX_ORDER: usize = 10;

/// Bilinear transform sample interval used after pre-warping
const BILINEAR_T: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Passband {
    LowPass,
    HighPass,
    BandPass,
    BandReject,
}

impl Passband {
    /// Two-letter code (LP, HP, BP, BR)
    pub fn code(&self) -> &'static str {
        match self {
            Passband::LowPass => "LP",
            Passband::HighPass => "HP",
            Passband::BandPass => "BP",
            Passband::BandReject => "BR",
        }
    }

    fn is_band(&self) -> bool {
        matches!(self, Passband::BandPass | Passband::BandReject)
    }
}

impl fmt::Display for Passband {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Passband {
    type Err = SeisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LP" => Ok(Passband::LowPass),
            "HP" => Ok(Passband::HighPass),
            "BP" => Ok(Passband::BandPass),
            "BR" => Ok(Passband::BandReject),
            other => Err(SeisError::InvalidArgument(format!("Unknown passband code: {}", other))),
        }
    }
}

/// Analog section `(b0 + b1 s + b2 s²) / (a0 + a1 s + a2 s²)`
#[derive(Debug, Clone, Copy, PartialEq)]
struct AnalogSection {
    b0: f64,
    b1: f64,
    b2: f64,
    a0: f64,
    a1: f64,
    a2: f64,
}

impl AnalogSection {
    fn new(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self { b0, b1, b2, a0, a1, a2 }
    }

    fn poles(&self) -> usize {
        if self.a2 != 0.0 {
            2
        } else if self.a1 != 0.0 {
            1
        } else {
            0
        }
    }

    fn zeros(&self) -> usize {
        if self.b2 != 0.0 {
            2
        } else if self.b1 != 0.0 {
            1
        } else {
            0
        }
    }

    /// Move the 1 rad/s corner to `f` Hz
    fn scale_frequency(mut self, f: f64) -> Self {
        let scale = 2.0 * PI * f;
        self.b1 /= scale;
        self.a1 /= scale;
        self.b2 /= scale * scale;
        self.a2 /= scale * scale;
        self
    }

    fn times(mut self, gain: f64) -> Self {
        self.b0 *= gain;
        self.b1 *= gain;
        self.b2 *= gain;
        self
    }

    fn lp_to_lp(self, fh: f64) -> Self {
        self.scale_frequency(fh)
    }

    /// Substitute 1/s for s, then scale to `fl`
    fn lp_to_hp(self, fl: f64) -> Self {
        let s = self;
        let flipped = if s.a2 != 0.0 || s.b2 != 0.0 {
            AnalogSection::new(s.b2, s.b1, s.b0, s.a2, s.a1, s.a0)
        } else if s.a1 != 0.0 || s.b1 != 0.0 {
            AnalogSection::new(s.b1, s.b0, 0.0, s.a1, s.a0, 0.0)
        } else {
            s
        };
        flipped.scale_frequency(fl)
    }

    /// The two band-pass images of a prototype root under s → (s² + a) / (b s)
    fn band_images(root: Complex64, a: f64, b: f64) -> (Complex64, Complex64) {
        let t1 = root / 2.0 * b;
        let t2 = (t1 * t1 - a).sqrt();
        (t1 + t2, t1 - t2)
    }

    /// Quadratic `s² - 2 Re(r) s + |r|²` with roots r and conj(r), as (c2, c1, c0)
    fn conjugate_quadratic(r: Complex64) -> (f64, f64, f64) {
        (1.0, -2.0 * r.re, r.norm_sqr())
    }

    /// Factor a numerator or denominator polynomial under s → (s² + a) / (b s).
    ///
    /// Returns the leading gain and the coefficients `(c2, c1, c0)` of the two
    /// resulting quadratics.
    fn map_band_polynomial(c0: f64, c1: f64, c2: f64, degree: usize, a: f64, b: f64) -> (f64, [(f64, f64, f64); 2]) {
        let unit = (0.0, 0.0, 1.0);
        match degree {
            2 => {
                let disc = Complex64::new(c1 * c1 - 4.0 * c2 * c0, 0.0).sqrt();
                let p = (disc - c1) / (2.0 * c2);
                let (r1, r2) = Self::band_images(p, a, b);
                (c2, [Self::conjugate_quadratic(r1), Self::conjugate_quadratic(r2)])
            }
            1 => {
                // roots sum to 2t and multiply to a, whether real or complex
                let t = -b * (c0 / c1) / 2.0;
                (c1, [(1.0, -2.0 * t, a), unit])
            }
            _ => (c0, [unit, unit]),
        }
    }

    /// Low-pass to band-pass via s → (s² + a) / (b s), a = (2π)² fl fh, b = 2π (fh - fl)
    fn lp_to_bp(self, fl: f64, fh: f64) -> Vec<AnalogSection> {
        let a = 4.0 * PI * PI * fl * fh;
        let b = 2.0 * PI * (fh - fl);
        let n_poles = self.poles();
        let n_zeros = self.zeros();
        let n_sections = n_poles.max(n_zeros).max(1);

        let (gz, mut num) = Self::map_band_polynomial(self.b0, self.b1, self.b2, n_zeros, a, b);
        let (gp, mut den) = Self::map_band_polynomial(self.a0, self.a1, self.a2, n_poles, a, b);
        let gain = gz / gp;

        // each surplus pole (zero) contributes a factor b·s to the numerator (denominator)
        let multiply_by_bs = |q: &mut (f64, f64, f64)| {
            *q = (b * q.1, b * q.2, 0.0);
        };
        let surplus = n_poles as i32 - n_zeros as i32;
        match (n_sections, surplus) {
            (2, 2) => {
                multiply_by_bs(&mut num[0]);
                multiply_by_bs(&mut num[1]);
            }
            (2, 1) => multiply_by_bs(&mut num[1]),
            (2, -1) => multiply_by_bs(&mut den[1]),
            (2, -2) => {
                multiply_by_bs(&mut den[0]);
                multiply_by_bs(&mut den[1]);
            }
            (1, 1) => multiply_by_bs(&mut num[0]),
            (1, -1) => multiply_by_bs(&mut den[0]),
            _ => {}
        }

        let section = |n: (f64, f64, f64), d: (f64, f64, f64)| AnalogSection::new(n.2, n.1, n.0, d.2, d.1, d.0);
        let mut result = vec![section(num[0], den[0]).times(gain)];
        if n_sections > 1 {
            result.push(section(num[1], den[1]));
        }
        result
    }

    fn lp_to_br(self, fl: f64, fh: f64) -> Vec<AnalogSection> {
        self.lp_to_hp(1.0 / (2.0 * PI)).lp_to_bp(fl, fh)
    }
}

/// Analog Butterworth low-pass prototype with a 1 rad/s corner
fn butterworth_prototype(order: usize) -> Vec<AnalogSection> {
    let n = order as f64;
    let mut sections: Vec<AnalogSection> = (1..=order / 2)
        .map(|k| {
            let damping = 2.0 * ((2 * k - 1) as f64 * PI / (2.0 * n)).sin();
            AnalogSection::new(1.0, 0.0, 0.0, 1.0, damping, 1.0)
        })
        .collect();
    if order % 2 == 1 {
        sections.push(AnalogSection::new(1.0, 0.0, 0.0, 1.0, 1.0, 0.0));
    }
    sections
}

/// Frequency pre-warping for the bilinear transform
fn warp(f: f64, ts: f64) -> f64 {
    (PI * f * ts).tan() / (PI * ts)
}

/// Digital second-order section in direct form II with its internal state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
    s1: f64,
    s2: f64,
}

impl Biquad {
    pub fn new(b0: f64, b1: f64, b2: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0,
            b1,
            b2,
            a1,
            a2,
            s1: 0.0,
            s2: 0.0,
        }
    }

    /// Discretise an analog section with s = (2/T)(1 - z⁻¹)/(1 + z⁻¹)
    fn from_analog(section: &AnalogSection, t: f64) -> Self {
        let k = 2.0 / t;
        match section.poles().max(section.zeros()) {
            0 => Biquad::new(section.b0 / section.a0, 0.0, 0.0, 0.0, 0.0),
            1 => {
                let a0 = section.a0 + section.a1 * k;
                Biquad::new(
                    (section.b0 + section.b1 * k) / a0,
                    (section.b0 - section.b1 * k) / a0,
                    0.0,
                    (section.a0 - section.a1 * k) / a0,
                    0.0,
                )
            }
            _ => {
                let (bt2, bt1) = (section.b2 * k * k, section.b1 * k);
                let (at2, at1) = (section.a2 * k * k, section.a1 * k);
                let a0 = at2 + at1 + section.a0;
                Biquad::new(
                    (bt2 + bt1 + section.b0) / a0,
                    2.0 * (section.b0 - bt2) / a0,
                    (bt2 - bt1 + section.b0) / a0,
                    2.0 * (section.a0 - at2) / a0,
                    (at2 - at1 + section.a0) / a0,
                )
            }
        }
    }

    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }

    /// Filter one sample
    pub fn step(&mut self, x: f32) -> f32 {
        let s0 = x as f64 - self.a1 * self.s1 - self.a2 * self.s2;
        let y = self.b0 * s0 + self.b1 * self.s1 + self.b2 * self.s2;
        self.s2 = self.s1;
        self.s1 = s0;
        y as f32
    }

    pub fn filter(&mut self, signal: &mut [f32]) {
        for v in signal.iter_mut() {
            *v = self.step(*v);
        }
    }

    /// Transfer function at normalised angular frequency `omega` (radians/sample)
    pub fn evaluate_at(&self, omega: f64) -> Complex64 {
        let z_inv = Complex64::new(0.0, -omega).exp();
        let num = (z_inv * self.b2 + self.b1) * z_inv + self.b0;
        let den = (z_inv * self.a2 + self.a1) * z_inv + 1.0;
        num / den
    }
}

/// Cascade of biquads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IirFilter {
    sections: Vec<Biquad>,
}

impl IirFilter {
    pub fn from_sections(sections: Vec<Biquad>) -> Self {
        Self { sections }
    }

    /// Design a Butterworth filter.
    ///
    /// Low-pass and high-pass designs use `cutoff1` as the corner; band designs
    /// span `cutoff1..cutoff2`. Frequencies are in Hz and `delta` is the sample
    /// interval in seconds.
    pub fn butterworth(
        order: usize,
        passband: Passband,
        cutoff1: f64,
        cutoff2: f64,
        delta: f64,
    ) -> SeisResult<Self> {
        if order == 0 || order > MAX_ORDER {
            return Err(SeisError::InvalidArgument(format!(
                "Filter order must be between 1 and {}, got {}",
                MAX_ORDER, order
            )));
        }
        if !(delta.is_finite() && delta > 0.0) {
            return Err(SeisError::InvalidArgument(format!("Invalid sample interval: {}", delta)));
        }
        let nyquist = 0.5 / delta;
        let check = |f: f64| -> SeisResult<()> {
            if f.is_finite() && f > 0.0 && f < nyquist {
                Ok(())
            } else {
                Err(SeisError::InvalidArgument(format!(
                    "Corner frequency {} Hz must lie in (0, {}) Hz",
                    f, nyquist
                )))
            }
        };
        check(cutoff1)?;
        if passband.is_band() {
            check(cutoff2)?;
            if cutoff2 <= cutoff1 {
                return Err(SeisError::InvalidArgument(format!(
                    "Band corners must increase: {} >= {}",
                    cutoff1, cutoff2
                )));
            }
        }

        log::debug!(
            "Designing order {} {} Butterworth filter ({} - {} Hz, dt = {})",
            order, passband, cutoff1, cutoff2, delta
        );

        let w1 = warp(cutoff1 * delta / 2.0, BILINEAR_T);
        let w2 = warp(cutoff2 * delta / 2.0, BILINEAR_T);
        let prototype = butterworth_prototype(order);
        let analog: Vec<AnalogSection> = match passband {
            Passband::LowPass => prototype.into_iter().map(|s| s.lp_to_lp(w1)).collect(),
            Passband::HighPass => prototype.into_iter().map(|s| s.lp_to_hp(w1)).collect(),
            Passband::BandPass => prototype.into_iter().flat_map(|s| s.lp_to_bp(w1, w2)).collect(),
            Passband::BandReject => prototype.into_iter().flat_map(|s| s.lp_to_br(w1, w2)).collect(),
        };

        Ok(Self {
            sections: analog.iter().map(|s| Biquad::from_analog(s, BILINEAR_T)).collect(),
        })
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    pub fn reset(&mut self) {
        self.sections.iter_mut().for_each(Biquad::reset);
    }

    pub fn step(&mut self, x: f32) -> f32 {
        self.sections.iter_mut().fold(x, |acc, s| s.step(acc))
    }

    /// Run the cascade over `signal` in place, continuing from the current state
    pub fn filter(&mut self, signal: &mut [f32]) {
        for section in self.sections.iter_mut() {
            section.filter(signal);
        }
    }

    /// Filter from a cleared state; `two_pass` runs the cascade again over the
    /// reversed output for a zero-phase result
    pub fn apply(&mut self, signal: &mut [f32], two_pass: bool) {
        self.reset();
        self.filter(signal);
        if two_pass {
            self.reset();
            signal.reverse();
            self.filter(signal);
            signal.reverse();
        }
    }

    /// Complex response at `frequency` Hz for sample interval `delta`
    pub fn frequency_response(&self, frequency: f64, delta: f64) -> Complex64 {
        let omega = 2.0 * PI * frequency * delta;
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.evaluate_at(omega))
    }
}
