//! Source adapter trait and the four concrete adapter kinds.

pub mod file;
pub mod sdr;
pub mod soundcard;
pub mod stream;

use crate::pcm::PcmFrame;
use same_core::math::mono_sum_n;

/// Lifecycle state of a source; only the manager mutates this, adapters only
/// report health via [`AdapterMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Registered but never started.
    Configured,
    /// `start()` called, not yet producing frames.
    Starting,
    /// Producing frames normally.
    Running,
    /// Producing frames, but health-impaired (squelch closed, device busy).
    Degraded,
    /// Stopped cooperatively.
    Stopped,
    /// Three consecutive errors within 30s; requires manual restart.
    Errored,
}

/// Health/level telemetry an adapter reports on demand.
#[derive(Debug, Clone, Copy)]
pub struct AdapterMetrics {
    /// Peak sample magnitude in dBFS over the last read.
    pub peak_dbfs: f32,
    /// RMS level in dBFS over the last read.
    pub rms_dbfs: f32,
    /// Adapter's native/output sample rate.
    pub sample_rate: u32,
    /// Consecutive and lifetime error count.
    pub error_count: u32,
}

/// Outcome of one [`SourceAdapter::read`] call.
pub enum ReadOutcome {
    /// A frame of samples was produced.
    Frame(PcmFrame),
    /// No data was available within the read window; not an error.
    Underrun,
    /// The source has no more data and will not produce further frames.
    Eof,
}

/// Errors an adapter can raise from `start`/`stop`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AdapterError {
    /// The requested device/URL/file could not be opened.
    #[error("source unavailable: {0}")]
    Unavailable(String),
    /// A high-quality resampler is required but unavailable: the adapter
    /// refuses to start rather than deliver corrupted samples.
    #[error("resampler unavailable for {from_hz} Hz -> {to_hz} Hz")]
    ResamplerUnavailable {
        /// Source's native sample rate.
        from_hz: u32,
        /// Pipeline's configured target sample rate.
        to_hz: u32,
    },
    /// I/O failure not covered by a more specific variant.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Uniform PCM producer contract implemented by all four adapter kinds.
///
/// `read` must never block indefinitely: every adapter enforces a 5-second
/// timeout internally.
pub trait SourceAdapter: Send {
    /// Begin producing frames. Idempotent if already running.
    fn start(&mut self) -> Result<(), AdapterError>;

    /// Stop cooperatively; the adapter must honor this within one read
    /// timeout period.
    fn stop(&mut self);

    /// Pull up to `max_samples` samples, downmixed to mono at the target
    /// sample rate.
    fn read(&mut self, max_samples: usize) -> ReadOutcome;

    /// Current health/level telemetry.
    fn metrics(&self) -> AdapterMetrics;

    /// Current lifecycle state.
    fn state(&self) -> AdapterState;
}

/// Downmix an interleaved multi-channel frame to mono by arithmetic mean.
pub fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(mono_sum_n)
        .collect()
}

/// Convert a linear peak/RMS value to dBFS, clamping silence to a floor
/// instead of producing `-inf`.
pub fn to_dbfs(linear: f32) -> f32 {
    same_core::math::linear_to_db(linear.max(1e-9))
}

/// Largest post-reduction upsample/downsample factor an adapter will
/// resample inline. Rate pairs needing more than this (e.g. 48000 -> 22050,
/// reduced factor 320) would need tens of thousands of FIR taps per block,
/// too expensive to run on a realtime audio callback.
const MAX_RESAMPLE_FACTOR: usize = 8;

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn reduced_rate_ratio(native_hz: u32, target_hz: u32) -> (usize, usize) {
    let g = gcd(native_hz as usize, target_hz as usize).max(1);
    (target_hz as usize / g, native_hz as usize / g)
}

/// Whether `native_hz -> target_hz` can be resampled inline within
/// [`MAX_RESAMPLE_FACTOR`].
pub(crate) fn resample_factor_within_budget(native_hz: u32, target_hz: u32) -> bool {
    if native_hz == target_hz {
        return true;
    }
    let (p, q) = reduced_rate_ratio(native_hz, target_hz);
    p.max(q) <= MAX_RESAMPLE_FACTOR
}

/// Resample `samples` from `native_hz` to `target_hz` via a polyphase FIR
/// filter. A no-op clone when the rates already match.
pub(crate) fn resample_to_target(samples: &[f32], native_hz: u32, target_hz: u32) -> Vec<f32> {
    if native_hz == target_hz {
        return samples.to_vec();
    }
    let (p, q) = reduced_rate_ratio(native_hz, target_hz);
    same_analysis::resample(samples, p, q, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_stereo_averages_channels() {
        let interleaved = vec![1.0, -1.0, 0.5, 0.5];
        let mono = downmix_to_mono(&interleaved, 2);
        assert_eq!(mono, vec![0.0, 0.5]);
    }

    #[test]
    fn downmix_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&samples, 1), samples);
    }

    #[test]
    fn matching_rates_need_no_resample_budget() {
        assert!(resample_factor_within_budget(22_050, 22_050));
    }

    #[test]
    fn common_44_1k_to_22_05k_halving_is_within_budget() {
        assert!(resample_factor_within_budget(44_100, 22_050));
    }

    #[test]
    fn extreme_rate_ratio_exceeds_budget() {
        assert!(!resample_factor_within_budget(48_000, 22_050));
    }

    #[test]
    fn resample_to_target_halves_sample_count() {
        let samples: Vec<f32> = (0..200).map(|i| (i as f32 * 0.05).sin()).collect();
        let out = resample_to_target(&samples, 44_100, 22_050);
        assert_eq!(out.len(), samples.len() / 2);
    }

    #[test]
    fn resample_to_target_matching_rates_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_to_target(&samples, 22_050, 22_050), samples);
    }
}
