//! Delay-locked-loop bit synchronizer.
//!
//! Tracks the symbol clock against a free-running 16-bit fractional phase
//! accumulator. Every sample advances `sphase` by a fixed step derived from
//! the ratio of baud rate to sample rate; when `sphase` wraps past zero the
//! sample at that instant is the center-of-symbol decision, latched as one
//! recovered bit. Polarity transitions in the incoming tone decision pull
//! `sphase` toward the ideal center by a fraction of the phase error, so the
//! sampler re-converges after clock drift or jitter without ever losing lock
//! outright.

use crate::tone::symbol_len_samples;

/// Fraction of phase error corrected on every polarity transition, expressed
/// as `1 / PULL_DIVISOR`.
const PULL_DIVISOR: i32 = 8;

/// One recovered bit, latched at the center of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveredBit(pub bool);

/// Delay-locked-loop symbol-clock tracker.
///
/// `sphase` is a 16-bit wrapping counter (`u16`); `step` is
/// `round(65536 * bit_rate / sample_rate)`. Each call to
/// [`BitSync::advance`] feeds one new tone decision and returns a recovered
/// bit exactly when `sphase` wraps, i.e. once per symbol period on average.
#[derive(Debug, Clone)]
pub struct BitSync {
    sphase: u16,
    step: u16,
    last_decision: Option<bool>,
}

impl BitSync {
    /// Build a bit synchronizer for the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let bit_rate = 1.0 / crate::constants::SYMBOL_PERIOD_SEC;
        let step = (65536.0 * bit_rate / sample_rate as f64).round() as u16;
        Self {
            sphase: 0,
            step: step.max(1),
            last_decision: None,
        }
    }

    /// Ideal symbol length in samples, for DCD/silence-timeout bookkeeping
    /// that operates in units of "bit times" rather than raw samples.
    pub fn symbol_len_samples(sample_rate: f32) -> usize {
        symbol_len_samples(sample_rate)
    }

    /// Feed one sample's tone decision (`true` = mark). Returns a recovered
    /// bit when the phase accumulator wraps past zero on this sample.
    pub fn advance(&mut self, mark: bool) -> Option<RecoveredBit> {
        // Pull phase toward center on every polarity transition before
        // advancing, so the correction lands ahead of the next wrap check.
        if let Some(prev) = self.last_decision {
            if prev != mark {
                self.pull_toward_center();
            }
        }
        self.last_decision = Some(mark);

        let (next, wrapped) = self.sphase.overflowing_add(self.step);
        self.sphase = next;
        if wrapped { Some(RecoveredBit(mark)) } else { None }
    }

    /// Nudge `sphase` toward the ideal center (`0x8000`) by `1/PULL_DIVISOR`
    /// of the current phase error. The error is signed: phase values in the
    /// upper half of the counter are "late" and pulled backward less than
    /// forward, matching a standard DLL proportional corrector.
    fn pull_toward_center(&mut self) {
        let center: i32 = 0x8000;
        let current = self.sphase as i32;
        let error = center - current;
        let correction = error / PULL_DIVISOR;
        self.sphase = (current + correction) as u16;
    }

    /// Reset to an unlocked state (used when the decoder returns to `IDLE`).
    pub fn reset(&mut self) {
        self.sphase = 0;
        self.last_decision = None;
    }
}
