//! Shared numeric helpers used across the decode/encode pipeline.
//!
//! A trimmed-down descendant of a general DSP math module: only the
//! conversions the EAS pipeline actually needs survive here (level
//! conversions for squelch/silence thresholds, downmixing, clamping,
//! sample/time conversions). Waveshaping and filter-coefficient helpers
//! belong to effects processing, not signal detection, and have no home in
//! this crate.

use libm::{expf, logf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use same_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain/amplitude to decibels (dBFS when `linear` is a peak
/// or RMS value normalized to full scale).
///
/// # Example
/// ```rust
/// use same_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Linear interpolation between `a` and `b` at fraction `t`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp a value to `[min, max]`.
#[inline]
pub fn clamp(x: f32, min: f32, max: f32) -> f32 {
    x.clamp(min, max)
}

/// Convert milliseconds to samples at the given sample rate.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Downmix a stereo frame pair to mono by arithmetic mean, matching the
/// "downmixed to mono by arithmetic mean before emission" requirement.
#[inline]
pub fn mono_sum(left: f32, right: f32) -> f32 {
    (left + right) * 0.5
}

/// Downmix an interleaved multi-channel frame to a single mono sample by
/// arithmetic mean across all channels.
#[inline]
pub fn mono_sum_n(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    frame.iter().sum::<f32>() / frame.len() as f32
}

/// Replace non-finite samples with 0.0, matching the sanitize policy:
/// NaN/Inf input is replaced with 0 and counted by the caller.
#[inline]
pub fn sanitize_sample(x: f32) -> (f32, bool) {
    if x.is_finite() { (x, false) } else { (0.0, true) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_linear_roundtrip() {
        let original = 0.5;
        let db = linear_to_db(original);
        let back = db_to_linear(db);
        assert!((original - back).abs() < 1e-5);
    }

    #[test]
    fn mono_sum_averages() {
        assert!((mono_sum(1.0, -1.0) - 0.0).abs() < 1e-6);
        assert!((mono_sum(1.0, 0.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn mono_sum_n_matches_stereo_case() {
        assert!((mono_sum_n(&[1.0, 0.5]) - mono_sum(1.0, 0.5)).abs() < 1e-6);
    }

    #[test]
    fn sanitize_replaces_non_finite() {
        assert_eq!(sanitize_sample(f32::NAN), (0.0, true));
        assert_eq!(sanitize_sample(f32::INFINITY), (0.0, true));
        assert_eq!(sanitize_sample(0.25), (0.25, false));
    }
}
