//! Sound card adapter: exclusive cpal input stream, using `CpalBackend`-style
//! device lookup and stream construction.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::{
    AdapterError, AdapterMetrics, AdapterState, ReadOutcome, downmix_to_mono,
    resample_factor_within_budget, resample_to_target, to_dbfs,
};
use crate::pcm::PcmFrame;

const BACKOFF_INITIAL: Duration = Duration::from_secs(1);
const BACKOFF_MAX: Duration = Duration::from_secs(30);

struct Shared {
    pending: std::collections::VecDeque<f32>,
    error_count: u32,
}

/// Opens a named (or default) input device exclusively and reconnects with
/// exponential backoff when the device reports busy: 1s initial delay,
/// capped at 30s.
pub struct SoundCardAdapter {
    name: String,
    device_name: Option<String>,
    target_sample_rate: u32,
    state: AdapterState,
    sequence: u64,
    stream: Option<cpal::Stream>,
    shared: Arc<Mutex<Shared>>,
    backoff: Duration,
    next_attempt_at: Option<Instant>,
    native_sample_rate: u32,
}

impl SoundCardAdapter {
    /// Build an adapter for the named input device (fuzzy, case-insensitive
    /// substring match) or the platform default when `device_name` is `None`.
    pub fn new(name: impl Into<String>, device_name: Option<String>, target_sample_rate: u32) -> Self {
        Self {
            name: name.into(),
            device_name,
            target_sample_rate,
            state: AdapterState::Configured,
            sequence: 0,
            stream: None,
            shared: Arc::new(Mutex::new(Shared {
                pending: std::collections::VecDeque::new(),
                error_count: 0,
            })),
            backoff: BACKOFF_INITIAL,
            next_attempt_at: None,
            native_sample_rate: 0,
        }
    }

    fn find_device(&self, host: &cpal::Host) -> Result<cpal::Device, AdapterError> {
        match &self.device_name {
            Some(search) => {
                let search_lower = search.to_lowercase();
                let devices = host
                    .input_devices()
                    .map_err(|e| AdapterError::Unavailable(e.to_string()))?;
                for device in devices {
                    if let Ok(dev_name) = device.name()
                        && dev_name.to_lowercase().contains(&search_lower)
                    {
                        return Ok(device);
                    }
                }
                Err(AdapterError::Unavailable(format!(
                    "no input device matching '{search}'"
                )))
            }
            None => host
                .default_input_device()
                .ok_or_else(|| AdapterError::Unavailable("no default input device".into())),
        }
    }

    fn open_stream(&mut self) -> Result<(), AdapterError> {
        let host = cpal::default_host();
        let device = self.find_device(&host)?;
        let supported = device
            .default_input_config()
            .map_err(|e| AdapterError::Unavailable(e.to_string()))?;
        let channels = supported.channels() as usize;
        self.native_sample_rate = supported.sample_rate().0;

        if self.native_sample_rate != self.target_sample_rate {
            if !resample_factor_within_budget(self.native_sample_rate, self.target_sample_rate) {
                return Err(AdapterError::ResamplerUnavailable {
                    from_hz: self.native_sample_rate,
                    to_hz: self.target_sample_rate,
                });
            }
            tracing::warn!(
                native = self.native_sample_rate,
                target = self.target_sample_rate,
                "sound card native rate differs from pipeline rate; resampling inline"
            );
        }

        let stream_config: cpal::StreamConfig = supported.into();
        let shared = Arc::clone(&self.shared);
        let native_rate = self.native_sample_rate;
        let target_rate = self.target_sample_rate;

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mono = downmix_to_mono(data, channels);
                    let resampled = resample_to_target(&mono, native_rate, target_rate);
                    let mut shared = shared.lock().unwrap();
                    shared.pending.extend(resampled);
                },
                {
                    let shared = Arc::clone(&self.shared);
                    move |err| {
                        tracing::error!(error = %err, "sound card stream error");
                        shared.lock().unwrap().error_count += 1;
                    }
                },
                None,
            )
            .map_err(|e| AdapterError::Unavailable(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AdapterError::Unavailable(e.to_string()))?;
        self.stream = Some(stream);
        self.backoff = BACKOFF_INITIAL;
        Ok(())
    }
}

impl super::SourceAdapter for SoundCardAdapter {
    fn start(&mut self) -> Result<(), AdapterError> {
        match self.open_stream() {
            Ok(()) => {
                self.state = AdapterState::Running;
                Ok(())
            }
            Err(e) => {
                self.state = AdapterState::Degraded;
                self.next_attempt_at = Some(Instant::now() + self.backoff);
                self.backoff = (self.backoff * 2).min(BACKOFF_MAX);
                Err(e)
            }
        }
    }

    fn stop(&mut self) {
        self.stream = None;
        self.state = AdapterState::Stopped;
    }

    fn read(&mut self, max_samples: usize) -> ReadOutcome {
        if self.stream.is_none() {
            if let Some(next_attempt) = self.next_attempt_at
                && Instant::now() >= next_attempt
                && self.open_stream().is_ok()
            {
                self.state = AdapterState::Running;
            }
            if self.stream.is_none() {
                return ReadOutcome::Underrun;
            }
        }

        let mut shared = self.shared.lock().unwrap();
        if shared.pending.is_empty() {
            return ReadOutcome::Underrun;
        }
        let n = max_samples.min(shared.pending.len());
        let samples: Vec<f32> = shared.pending.drain(..n).collect();
        self.sequence += 1;

        ReadOutcome::Frame(PcmFrame {
            samples,
            sample_rate: self.target_sample_rate,
            captured_at_mono_ns: 0,
            sequence: self.sequence,
            source_name: self.name.clone(),
        })
    }

    fn metrics(&self) -> AdapterMetrics {
        let shared = self.shared.lock().unwrap();
        let window: Vec<f32> = shared.pending.iter().take(4096).copied().collect();
        let peak = window.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
        let rms = if window.is_empty() {
            0.0
        } else {
            (window.iter().map(|&s| s * s).sum::<f32>() / window.len() as f32).sqrt()
        };
        AdapterMetrics {
            peak_dbfs: to_dbfs(peak),
            rms_dbfs: to_dbfs(rms),
            sample_rate: self.target_sample_rate,
            error_count: shared.error_count,
        }
    }

    fn state(&self) -> AdapterState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_up_to_cap() {
        let mut adapter = SoundCardAdapter::new("mic0", Some("definitely-not-a-device".into()), 22050);
        let _ = adapter.start();
        assert_eq!(adapter.backoff, BACKOFF_INITIAL * 2);
        adapter.backoff = BACKOFF_MAX;
        let doubled = (adapter.backoff * 2).min(BACKOFF_MAX);
        assert_eq!(doubled, BACKOFF_MAX);
    }

    #[test]
    fn unknown_device_name_fails_to_start() {
        let mut adapter = SoundCardAdapter::new("mic0", Some("definitely-not-a-device".into()), 22050);
        assert!(adapter.start().is_err());
        assert_eq!(adapter.state(), AdapterState::Degraded);
    }
}
