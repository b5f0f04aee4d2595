//! Mono PCM frame type exchanged between source adapters, the manager, and
//! the decoder.

/// One contiguous run of mono samples from a single source.
///
/// Frames from one source are contiguous in sample count; a gap is reported
/// as [`crate::adapter::ReadOutcome::Underrun`], never silently padded.
#[derive(Debug, Clone)]
pub struct PcmFrame {
    /// Normalized mono samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Monotonic capture timestamp in nanoseconds, from an arbitrary epoch
    /// fixed at adapter start.
    pub captured_at_mono_ns: u64,
    /// Monotonically increasing per-source sequence counter.
    pub sequence: u64,
    /// Name of the source that produced this frame.
    pub source_name: String,
}

impl PcmFrame {
    /// Peak absolute amplitude in this frame.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }

    /// RMS amplitude in this frame.
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = self.samples.iter().map(|&s| s * s).sum();
        (sum_sq / self.samples.len() as f32).sqrt()
    }
}
