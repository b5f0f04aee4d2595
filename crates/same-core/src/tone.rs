//! Phase-continuous tone generation and correlation templates.
//!
//! Two distinct consumers share the trigonometry here: the encoder generates
//! live samples at the mark/space frequency with its phase carried across bit
//! boundaries (tones are not windowed to silence between symbols), and the
//! decoder precomputes fixed-length sine/cosine lookup tables once at
//! construction that it then correlates incoming audio against forever.
//! Both need the same frequency constants and the same phase-accumulator
//! arithmetic, so they live in one module.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
use core::f64::consts::TAU;
use libm::{cos, sin};

use crate::constants::{BIT_RATE, MARK_FREQ_HZ, SPACE_FREQ_HZ};

/// Phase-continuous sinusoid generator.
///
/// Phase is accumulated in `f64` so that long encoder runs (header + voice
/// narration + EOM, potentially tens of seconds) do not drift measurably
/// from the ideal frequency. Output is emitted as `f32`, the pipeline's
/// sample format.
///
/// # Example
/// ```rust
/// use same_core::PhaseAccumulator;
///
/// let mut osc = PhaseAccumulator::new(22050.0, 2083.0 + 1.0 / 3.0);
/// let first = osc.advance();
/// assert!((-1.0..=1.0).contains(&first));
/// ```
#[derive(Debug, Clone)]
pub struct PhaseAccumulator {
    phase: f64,
    phase_inc: f64,
    sample_rate: f64,
}

impl PhaseAccumulator {
    /// Create a new accumulator at the given sample rate and frequency.
    pub fn new(sample_rate: f32, freq_hz: f64) -> Self {
        let sample_rate = sample_rate as f64;
        Self {
            phase: 0.0,
            phase_inc: TAU * freq_hz / sample_rate,
            sample_rate,
        }
    }

    /// Switch frequency without resetting phase: the defining property that
    /// makes multi-tone FSK bursts phase-continuous across bit boundaries.
    pub fn set_frequency(&mut self, freq_hz: f64) {
        self.phase_inc = TAU * freq_hz / self.sample_rate;
    }

    /// Advance one sample and return `sin(phase)`, wrapping phase into
    /// `[0, 2π)` to bound numeric growth over long runs.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let out = sin(self.phase) as f32;
        self.phase += self.phase_inc;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        out
    }

    /// Current phase in radians, `[0, 2π)`.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Reset phase to zero. Used between independent bursts when phase
    /// continuity is not required (e.g. the 1 s silence gaps between header
    /// repetitions reset the carrier, matching typical SAME encoder
    /// hardware behavior).
    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }
}

/// One symbol period's worth of precomputed mark/space correlation
/// templates, generated once at decoder construction.
///
/// `mark_i`/`mark_q` are `cos`/`sin` at the mark frequency; `space_i`/
/// `space_q` are the same at the space frequency. Template length is
/// `round(sample_rate / BIT_RATE)` samples — one symbol period — and is
/// immutable for the decoder's lifetime.
#[derive(Debug, Clone)]
pub struct ToneTemplates {
    mark_i: Vec<f32>,
    mark_q: Vec<f32>,
    space_i: Vec<f32>,
    space_q: Vec<f32>,
}

impl ToneTemplates {
    /// Build templates for the given sample rate.
    ///
    /// Panics if `sample_rate` is not positive; decoder construction is
    /// expected to validate the rate before reaching this point.
    pub fn new(sample_rate: f32) -> Self {
        assert!(sample_rate > 0.0, "sample rate must be positive");
        let len = symbol_len_samples(sample_rate);

        let build = |freq_hz: f64| -> (Vec<f32>, Vec<f32>) {
            let omega = TAU * freq_hz / sample_rate as f64;
            let mut i = Vec::with_capacity(len);
            let mut q = Vec::with_capacity(len);
            for n in 0..len {
                let theta = omega * n as f64;
                i.push(cos(theta) as f32);
                q.push(sin(theta) as f32);
            }
            (i, q)
        };

        let (mark_i, mark_q) = build(MARK_FREQ_HZ);
        let (space_i, space_q) = build(SPACE_FREQ_HZ);

        Self {
            mark_i,
            mark_q,
            space_i,
            space_q,
        }
    }

    /// Template length in samples (one symbol period).
    pub fn len(&self) -> usize {
        self.mark_i.len()
    }

    /// Whether the templates are empty (only possible at absurdly high
    /// sample rates relative to the baud rate; never true in practice).
    pub fn is_empty(&self) -> bool {
        self.mark_i.is_empty()
    }

    pub fn mark_i(&self) -> &[f32] {
        &self.mark_i
    }

    pub fn mark_q(&self) -> &[f32] {
        &self.mark_q
    }

    pub fn space_i(&self) -> &[f32] {
        &self.space_i
    }

    pub fn space_q(&self) -> &[f32] {
        &self.space_q
    }
}

/// Compute the symbol length in samples for a given sample rate, rounded to
/// the nearest integer.
pub fn symbol_len_samples(sample_rate: f32) -> usize {
    (sample_rate as f64 / BIT_RATE).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_len_matches_expected_ratio() {
        // 22050 / 520.8333... ~= 42.34 -> rounds to 42
        assert_eq!(symbol_len_samples(22050.0), 42);
    }

    #[test]
    fn templates_have_matching_lengths() {
        let t = ToneTemplates::new(22050.0);
        assert_eq!(t.mark_i().len(), t.mark_q().len());
        assert_eq!(t.mark_i().len(), t.space_i().len());
        assert_eq!(t.mark_i().len(), t.space_q().len());
        assert_eq!(t.len(), symbol_len_samples(22050.0));
    }

    #[test]
    fn templates_start_at_zero_phase() {
        let t = ToneTemplates::new(22050.0);
        assert!((t.mark_i()[0] - 1.0).abs() < 1e-6);
        assert!((t.mark_q()[0] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn phase_accumulator_stays_bounded() {
        let mut osc = PhaseAccumulator::new(22050.0, MARK_FREQ_HZ);
        for _ in 0..1_000_000 {
            let v = osc.advance();
            assert!((-1.0..=1.0).contains(&v));
        }
        assert!(osc.phase() >= 0.0 && osc.phase() < TAU);
    }

    #[test]
    fn phase_continuity_across_frequency_switch() {
        // Switching frequency mid-stream must not reset phase (required for
        // FSK symbol transitions to stay phase-continuous).
        let mut osc = PhaseAccumulator::new(22050.0, MARK_FREQ_HZ);
        osc.advance();
        osc.advance();
        let phase_before = osc.phase();
        osc.set_frequency(SPACE_FREQ_HZ);
        assert!((osc.phase() - phase_before).abs() < 1e-12);
    }
}
