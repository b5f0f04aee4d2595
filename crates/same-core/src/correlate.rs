//! Per-sample tone correlation and data-carrier-detect.
//!
//! For each incoming sample the decoder maintains a sliding correlation
//! against the mark and space templates from [`crate::tone::ToneTemplates`],
//! producing `|M|` and `|S|` magnitudes whose sign of difference is the
//! instantaneous mark/space decision. The same state also runs a DCD shift
//! register that flags whether a modulated carrier looks present, used by
//! the decoder's state machine to abandon a stale collection.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::tone::ToneTemplates;

/// Instantaneous mark/space decision for one sample, plus the correlation
/// magnitudes it was derived from (exposed for telemetry/debugging).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneDecision {
    /// `true` for mark (logical 1), `false` for space (logical 0).
    pub mark: bool,
    /// Mark-tone correlation magnitude.
    pub mark_power: f32,
    /// Space-tone correlation magnitude.
    pub space_power: f32,
}

/// Sliding-window correlator plus DCD integrator, one instance per decoder.
///
/// Maintains a circular buffer of the last `L` raw samples (`L` = one symbol
/// period) and recomputes the four dot products against the mark/space I/Q
/// templates each sample. This is a direct O(L) sum-of-products rather than
/// a recursive filter; at SAME's symbol rate, `L` is small enough (tens of
/// samples) that this is not a hot-path concern.
#[derive(Debug, Clone)]
pub struct CorrelationState {
    history: Vec<f32>,
    head: usize,
    filled: usize,
    dcd_ring: Vec<bool>,
    dcd_head: usize,
    dcd_integrator: i32,
    dcd_threshold: i32,
}

impl CorrelationState {
    /// Create correlator state sized to the given templates' symbol length.
    pub fn new(templates: &ToneTemplates) -> Self {
        let len = templates.len().max(1);
        Self {
            history: vec![0.0; len],
            head: 0,
            filled: 0,
            dcd_ring: vec![false; len],
            dcd_head: 0,
            dcd_integrator: 0,
            dcd_threshold: (len / 4).max(1) as i32,
        }
    }

    /// Override the DCD "signal present" threshold (default: `len / 4`).
    pub fn set_dcd_threshold(&mut self, threshold: i32) {
        self.dcd_threshold = threshold;
    }

    /// Push one sample and return its tone decision, once the correlation
    /// window has filled. Returns `None` while priming the first `L - 1`
    /// samples of the stream.
    pub fn process(&mut self, templates: &ToneTemplates, sample: f32) -> Option<ToneDecision> {
        let len = self.history.len();
        self.history[self.head] = sample;
        self.head = (self.head + 1) % len;
        if self.filled < len {
            self.filled += 1;
        }
        if self.filled < len {
            return None;
        }

        // history[head] is the oldest sample (about to be overwritten next);
        // walk the window oldest-to-newest to align with template index 0.
        let mark_i = templates.mark_i();
        let mark_q = templates.mark_q();
        let space_i = templates.space_i();
        let space_q = templates.space_q();

        let mut mi = 0.0f32;
        let mut mq = 0.0f32;
        let mut si = 0.0f32;
        let mut sq = 0.0f32;
        for k in 0..len {
            let idx = (self.head + k) % len;
            let s = self.history[idx];
            mi += s * mark_i[k];
            mq += s * mark_q[k];
            si += s * space_i[k];
            sq += s * space_q[k];
        }

        let mark_power = (mi * mi + mq * mq).sqrt();
        let space_power = (si * si + sq * sq).sqrt();
        let mark = mark_power >= space_power;

        self.update_dcd(mark);

        Some(ToneDecision {
            mark,
            mark_power,
            space_power,
        })
    }

    fn update_dcd(&mut self, mark: bool) {
        let len = self.dcd_ring.len();
        let oldest = self.dcd_ring[self.dcd_head];
        if oldest != mark {
            self.dcd_integrator += 1;
        } else {
            self.dcd_integrator -= 1;
        }
        self.dcd_integrator = self.dcd_integrator.clamp(0, len as i32);
        self.dcd_ring[self.dcd_head] = mark;
        self.dcd_head = (self.dcd_head + 1) % len;
    }

    /// Whether the DCD integrator currently reports a carrier present.
    pub fn signal_present(&self) -> bool {
        self.dcd_integrator >= self.dcd_threshold
    }

    /// Current raw DCD integrator value, used by the header triplet
    /// validator to break three-way byte disagreements in favor of the
    /// candidate with the strongest carrier lock at that position.
    pub fn dcd_integrator(&self) -> i32 {
        self.dcd_integrator
    }

    /// Reset correlator and DCD state (used when the decoder resets to
    /// `IDLE`, e.g. on source failover).
    pub fn reset(&mut self) {
        self.history.iter_mut().for_each(|s| *s = 0.0);
        self.head = 0;
        self.filled = 0;
        self.dcd_ring.iter_mut().for_each(|b| *b = false);
        self.dcd_head = 0;
        self.dcd_integrator = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MARK_FREQ_HZ, SPACE_FREQ_HZ};
    use core::f64::consts::TAU;

    fn tone_signal(freq_hz: f64, sample_rate: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (TAU * freq_hz * i as f64 / sample_rate as f64).sin() as f32)
            .collect()
    }

    #[test]
    fn mark_tone_decides_mark() {
        let sr = 22050.0;
        let templates = ToneTemplates::new(sr);
        let mut corr = CorrelationState::new(&templates);
        let signal = tone_signal(MARK_FREQ_HZ, sr, templates.len() * 4);

        let mut last = None;
        for s in signal {
            if let Some(decision) = corr.process(&templates, s) {
                last = Some(decision);
            }
        }
        assert!(last.unwrap().mark);
    }

    #[test]
    fn space_tone_decides_space() {
        let sr = 22050.0;
        let templates = ToneTemplates::new(sr);
        let mut corr = CorrelationState::new(&templates);
        let signal = tone_signal(SPACE_FREQ_HZ, sr, templates.len() * 4);

        let mut last = None;
        for s in signal {
            if let Some(decision) = corr.process(&templates, s) {
                last = Some(decision);
            }
        }
        assert!(!last.unwrap().mark);
    }

    #[test]
    fn dcd_locks_on_alternating_tone() {
        let sr = 22050.0;
        let templates = ToneTemplates::new(sr);
        let mut corr = CorrelationState::new(&templates);

        // Alternate mark/space every symbol to exercise the DCD toggle path.
        let mut signal = Vec::new();
        for i in 0..40 {
            let freq = if i % 2 == 0 { MARK_FREQ_HZ } else { SPACE_FREQ_HZ };
            signal.extend(tone_signal(freq, sr, templates.len()));
        }

        for s in signal {
            corr.process(&templates, s);
        }
        assert!(corr.signal_present());
    }

    #[test]
    fn reset_clears_state() {
        let sr = 22050.0;
        let templates = ToneTemplates::new(sr);
        let mut corr = CorrelationState::new(&templates);
        let signal = tone_signal(MARK_FREQ_HZ, sr, templates.len() * 3);
        for s in signal {
            corr.process(&templates, s);
        }
        corr.reset();
        assert_eq!(corr.dcd_integrator, 0);
        assert_eq!(corr.filled, 0);
    }
}
