//! File adapter: replays a WAV file as a PCM source.
//!
//! Paced playback (the default) releases one second of samples per wall
//! second, so a file source behaves like a live one for manager failover
//! testing. `--fast` mode (non-paced) is what the CLI's verification-upload
//! path uses to run a whole file through the streaming engine as quickly as
//! possible rather than building a separate batch decoder.

use std::time::{Duration, Instant};

use super::{AdapterError, AdapterMetrics, AdapterState, ReadOutcome, to_dbfs};
use crate::pcm::PcmFrame;
use crate::wav;

/// Replays a WAV file, either paced to real time or as fast as possible.
pub struct FileAdapter {
    name: String,
    path: std::path::PathBuf,
    paced: bool,
    samples: Vec<f32>,
    sample_rate: u32,
    cursor: usize,
    started_at: Option<Instant>,
    released_at_start: usize,
    sequence: u64,
    state: AdapterState,
}

impl FileAdapter {
    /// Build a file adapter over `path`. `paced` governs whether `read`
    /// throttles to real time or drains as fast as the caller pulls.
    pub fn new(name: impl Into<String>, path: impl Into<std::path::PathBuf>, paced: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            paced,
            samples: Vec::new(),
            sample_rate: 0,
            cursor: 0,
            started_at: None,
            released_at_start: 0,
            sequence: 0,
            state: AdapterState::Configured,
        }
    }

    fn allowed_to_release(&self) -> usize {
        if !self.paced {
            return self.samples.len() - self.cursor;
        }
        let elapsed = self
            .started_at
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO);
        let allowed_total =
            (elapsed.as_secs_f64() * self.sample_rate as f64) as usize + self.released_at_start;
        allowed_total.saturating_sub(self.cursor).min(self.samples.len() - self.cursor)
    }
}

impl super::SourceAdapter for FileAdapter {
    fn start(&mut self) -> Result<(), AdapterError> {
        let (samples, sample_rate) = wav::read_wav_mono(&self.path)
            .map_err(|e| AdapterError::Unavailable(e.to_string()))?;
        self.samples = samples;
        self.sample_rate = sample_rate;
        self.cursor = 0;
        self.released_at_start = 0;
        self.started_at = Some(Instant::now());
        self.state = AdapterState::Running;
        Ok(())
    }

    fn stop(&mut self) {
        self.state = AdapterState::Stopped;
    }

    fn read(&mut self, max_samples: usize) -> ReadOutcome {
        if self.cursor >= self.samples.len() {
            return ReadOutcome::Eof;
        }
        let available = self.allowed_to_release();
        if available == 0 {
            return ReadOutcome::Underrun;
        }
        let n = max_samples.min(available);
        let end = self.cursor + n;
        let samples = self.samples[self.cursor..end].to_vec();
        self.cursor = end;
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
        let tail = &self.samples[self.cursor.min(self.samples.len())..];
        let window: Vec<f32> = tail.iter().take(4096).copied().collect();
        let peak = window.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
        let rms = if window.is_empty() {
            0.0
        } else {
            (window.iter().map(|&s| s * s).sum::<f32>() / window.len() as f32).sqrt()
        };
        AdapterMetrics {
            peak_dbfs: to_dbfs(peak),
            rms_dbfs: to_dbfs(rms),
            sample_rate: self.sample_rate,
            error_count: 0,
        }
    }

    fn state(&self) -> AdapterState {
        if self.cursor >= self.samples.len() && self.state == AdapterState::Running {
            AdapterState::Stopped
        } else {
            self.state
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SourceAdapter;
    use tempfile::NamedTempFile;

    fn write_test_wav(seconds: f32, sample_rate: u32) -> NamedTempFile {
        let n = (seconds * sample_rate as f32) as usize;
        let samples: Vec<f32> = (0..n).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
        let file = NamedTempFile::new().unwrap();
        wav::write_wav_mono(file.path(), &samples, sample_rate).unwrap();
        file
    }

    #[test]
    fn fast_mode_drains_entire_file_immediately() {
        let file = write_test_wav(1.0, 8000);
        let mut adapter = FileAdapter::new("f0", file.path(), false);
        adapter.start().unwrap();

        let mut total = 0;
        loop {
            match adapter.read(100_000) {
                ReadOutcome::Frame(frame) => total += frame.samples.len(),
                ReadOutcome::Eof => break,
                ReadOutcome::Underrun => panic!("fast mode should never underrun"),
            }
        }
        assert_eq!(total, 8000);
    }

    #[test]
    fn paced_mode_limits_initial_read() {
        let file = write_test_wav(2.0, 8000);
        let mut adapter = FileAdapter::new("f0", file.path(), true);
        adapter.start().unwrap();

        // Immediately after start, far less than the full 16000 samples
        // should be releasable.
        if let ReadOutcome::Frame(frame) = adapter.read(100_000) {
            assert!(frame.samples.len() < 16000);
        } else {
            panic!("expected some samples immediately");
        }
    }

    #[test]
    fn eof_reported_after_fast_drain() {
        let file = write_test_wav(0.1, 8000);
        let mut adapter = FileAdapter::new("f0", file.path(), false);
        adapter.start().unwrap();
        adapter.read(100_000);
        assert!(matches!(adapter.read(100), ReadOutcome::Eof));
    }
}
