//! Rational resampling — decimate, interpolate, and arbitrary P/Q rate
//! conversion, for source adapters whose native sample rate is not the
//! decoder's working rate.
//!
//! Implements polyphase FIR resampling using windowed-sinc lowpass filters
//! with Blackman windowing. Supports integer decimation, integer
//! interpolation, and rational P/Q resampling (e.g. 44100 → 22050 Hz via
//! P=1, Q=2; or 8000 → 22050 Hz via P=441, Q=160).
//!
//! # Theory
//!
//! Resampling by rational factor P/Q is equivalent to upsampling by P,
//! applying a lowpass filter at `min(1/P, 1/Q)` (normalized frequency), then
//! downsampling by Q. The polyphase decomposition avoids explicit
//! zero-insertion by computing only the output samples actually needed.
//!
//! Reference: P. P. Vaidyanathan, *Multirate Systems and Filter Banks*,
//! Prentice Hall, 1993, Chapter 4.

use std::f32::consts::PI;

/// Compute windowed-sinc lowpass FIR coefficients.
///
/// Designs a Type I linear-phase FIR lowpass filter using the windowed-sinc
/// method with a Blackman window, normalized to unity DC gain.
pub fn design_lowpass(num_taps: usize, cutoff: f32) -> Vec<f32> {
    if num_taps == 0 {
        return Vec::new();
    }

    let m = num_taps - 1;
    let mut coeffs = Vec::with_capacity(num_taps);

    for n in 0..num_taps {
        let x = n as f32 - m as f32 / 2.0;

        let sinc = if x.abs() < 1e-7 {
            cutoff
        } else {
            (PI * cutoff * x).sin() / (PI * x)
        };

        let window = if m == 0 {
            1.0
        } else {
            let phase = 2.0 * PI * n as f32 / m as f32;
            0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
        };

        coeffs.push(sinc * window);
    }

    let sum: f32 = coeffs.iter().sum();
    if sum.abs() > 1e-10 {
        for c in coeffs.iter_mut() {
            *c /= sum;
        }
    }

    coeffs
}

/// Apply a FIR filter to a signal using direct convolution, padding for
/// linear-phase delay compensation so the output length matches the input.
fn apply_fir(signal: &[f32], coeffs: &[f32]) -> Vec<f32> {
    if coeffs.is_empty() || signal.is_empty() {
        return signal.to_vec();
    }

    let half_delay = (coeffs.len() - 1) / 2;
    let mut output = Vec::with_capacity(signal.len());

    for i in 0..signal.len() {
        let mut acc = 0.0f32;
        for (k, &c) in coeffs.iter().enumerate() {
            let j = i + k;
            if j >= half_delay && j - half_delay < signal.len() {
                acc += c * signal[j - half_delay];
            }
        }
        output.push(acc);
    }

    output
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Decimate a signal by an integer factor, applying a windowed-sinc
/// anti-aliasing lowpass first (cutoff `0.9 / factor`, a 10% guard band).
pub fn decimate(signal: &[f32], factor: usize, filter_order: usize) -> Vec<f32> {
    assert!(factor >= 1, "decimation factor must be >= 1");

    if factor == 1 {
        return signal.to_vec();
    }

    let num_taps = if filter_order == 0 {
        4 * factor * 10 + 1
    } else {
        filter_order
    };

    let cutoff = 0.9 / factor as f32;
    let coeffs = design_lowpass(num_taps, cutoff);
    let filtered = apply_fir(signal, &coeffs);

    filtered.into_iter().step_by(factor).collect()
}

/// Interpolate a signal by an integer factor: zero-insert, then lowpass
/// filter (cutoff `0.9 / factor`) and rescale to restore unity gain.
pub fn interpolate(signal: &[f32], factor: usize, filter_order: usize) -> Vec<f32> {
    assert!(factor >= 1, "interpolation factor must be >= 1");

    if factor == 1 {
        return signal.to_vec();
    }

    let num_taps = if filter_order == 0 {
        4 * factor * 10 + 1
    } else {
        filter_order
    };

    let cutoff = 0.9 / factor as f32;
    let coeffs = design_lowpass(num_taps, cutoff);

    let upsampled_len = signal.len() * factor;
    let mut upsampled = vec![0.0f32; upsampled_len];
    for (i, &s) in signal.iter().enumerate() {
        upsampled[i * factor] = s;
    }

    let filtered = apply_fir(&upsampled, &coeffs);
    filtered.into_iter().map(|x| x * factor as f32).collect()
}

/// Rational resampling by factor P/Q via polyphase decomposition, avoiding
/// explicit zero-insertion. Output length is `ceil(input.len() * P / Q)`.
pub fn resample(signal: &[f32], p: usize, q: usize, filter_order: usize) -> Vec<f32> {
    assert!(p >= 1, "upsample factor P must be >= 1");
    assert!(q >= 1, "downsample factor Q must be >= 1");

    let g = gcd(p, q);
    let p = p / g;
    let q = q / g;

    if p == 1 && q == 1 {
        return signal.to_vec();
    }

    let num_taps = if filter_order == 0 {
        4 * p.max(q) * 10 + 1
    } else {
        filter_order
    };

    let cutoff = 0.9 / p.max(q) as f32;
    let prototype = design_lowpass(num_taps, cutoff);

    let out_len = (signal.len() * p).div_ceil(q);
    let taps_per_phase = num_taps.div_ceil(p);

    let mut polyphase = vec![vec![0.0f32; taps_per_phase]; p];
    for (tap_idx, &coeff) in prototype.iter().enumerate() {
        let k = tap_idx % p;
        let i = tap_idx / p;
        polyphase[k][i] = coeff;
    }

    let mut output = Vec::with_capacity(out_len);

    for m in 0..out_len {
        let full_idx = m * q;
        let n = full_idx / p;
        let k = full_idx % p;

        let sub_filter = &polyphase[k];
        let mut acc = 0.0f32;
        for (i, &coeff) in sub_filter.iter().enumerate() {
            if n >= i && (n - i) < signal.len() {
                acc += coeff * signal[n - i];
            }
        }

        output.push(acc * p as f32);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_wave(frequency: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| (2.0 * PI * frequency * i as f32 / sample_rate).sin())
            .collect()
    }

    fn spectral_peak_at(signal: &[f32], freq_hz: f32, sample_rate: f32) -> f32 {
        let n = signal.len();
        let mut re = 0.0f32;
        let mut im = 0.0f32;
        for (i, &s) in signal.iter().enumerate() {
            let phase = 2.0 * PI * freq_hz * i as f32 / sample_rate;
            re += s * phase.cos();
            im += s * phase.sin();
        }
        (re * re + im * im).sqrt() / n as f32
    }

    #[test]
    fn design_lowpass_is_symmetric() {
        let coeffs = design_lowpass(65, 0.4);
        let n = coeffs.len();
        for i in 0..n / 2 {
            assert!((coeffs[i] - coeffs[n - 1 - i]).abs() < 1e-6);
        }
    }

    #[test]
    fn design_lowpass_has_unity_dc_gain() {
        for &num_taps in &[11usize, 31, 65, 127] {
            let coeffs = design_lowpass(num_taps, 0.5);
            let sum: f32 = coeffs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn decimate_by_2_preserves_tone_and_halves_length() {
        let sr = 48000.0;
        let signal = sine_wave(1000.0, sr, 4800);
        let decimated = decimate(&signal, 2, 0);

        assert_eq!(decimated.len(), signal.len() / 2);
        let peak = spectral_peak_at(&decimated[100..], 1000.0, sr / 2.0);
        assert!(peak > 0.3);
    }

    #[test]
    fn resample_identity_is_lossless() {
        let signal: Vec<f32> = (0..100).map(|i| i as f32 * 0.01).collect();
        let result = resample(&signal, 2, 2, 0);
        assert_eq!(result.len(), signal.len());
        for (a, b) in signal.iter().zip(result.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn resample_8000_to_22050_preserves_tone() {
        // A common SDR-adapter native rate converted to the decoder's
        // working rate: P=441, Q=160.
        let sr_in = 8000.0f32;
        let signal = sine_wave(1000.0, sr_in, 8000);
        let resampled = resample(&signal, 441, 160, 0);

        let expected_len = (8000usize * 441).div_ceil(160);
        assert_eq!(resampled.len(), expected_len);

        let peak = spectral_peak_at(&resampled[2000..], 1000.0, 22050.0);
        assert!(peak > 0.2);
    }

    #[test]
    fn resample_rational_length_matches_formula() {
        let signal = vec![0.0f32; 1000];
        let cases = [(3, 2), (2, 3), (7, 5), (5, 7), (441, 160)];
        for (p, q) in cases {
            let result = resample(&signal, p, q, 0);
            let g = gcd(p, q);
            let expected = (1000 * (p / g)).div_ceil(q / g);
            assert_eq!(result.len(), expected, "P={p}, Q={q}");
        }
    }
}
