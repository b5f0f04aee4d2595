//! Cross-correlation — time-domain (direct) and frequency-domain (FFT)
//! implementations with normalization and peak lag detection.
//!
//! Used by conformance tests to measure timing offsets between an encoded
//! burst and its decoded recovery, and available to the decoder's test
//! harness for aligning a reference waveform against a captured one.
//!
//! # Mathematical Definition
//!
//! The cross-correlation of signals x and y at lag τ is:
//!
//! ```text
//! R_xy(τ) = Σ_{n} x[n] · y[n + τ]
//! ```
//!
//! When τ > 0, R_xy peaks at lag τ₀ when y is a delayed version of x by τ₀
//! samples, i.e. y[n] = x[n - τ₀] → peak at τ = τ₀ (y leads x by τ₀).
//!
//! # FFT-based Computation
//!
//! For long signals the O(n · max_lag) direct sum is expensive. The FFT-based
//! method exploits the cross-correlation theorem:
//!
//! ```text
//! R_xy(τ) = IFFT( conj(X(f)) · Y(f) )
//! ```
//!
//! where X, Y are the DFTs of x and y zero-padded to avoid circular
//! wrap-around.
//!
//! # References
//!
//! - Oppenheim & Schafer, "Discrete-Time Signal Processing" (3rd ed.), §2.8.
//! - Proakis & Manolakis, "Digital Signal Processing" (4th ed.), §6.4.

use crate::fft::Fft;
use rustfft::num_complex::Complex;

/// Compute the direct time-domain cross-correlation.
///
/// Time complexity O(n · max_lag). For large signals or large max_lag, prefer
/// [`xcorr_fft`] which is O(n log n).
///
/// Returns a vector of length `2 * max_lag + 1` laid out as
/// `[R(-max_lag), …, R(0), …, R(max_lag)]`.
pub fn xcorr_direct(x: &[f32], y: &[f32], max_lag: usize) -> Vec<f32> {
    let n = x.len().max(y.len());
    let len = 2 * max_lag + 1;
    let mut result = vec![0.0f32; len];

    for (out_i, lag) in (-(max_lag as i32)..=(max_lag as i32)).enumerate() {
        let mut sum = 0.0f32;
        for n_idx in 0..n {
            let m = n_idx as i32 + lag;
            if m >= 0 && (m as usize) < y.len() && n_idx < x.len() {
                sum += x[n_idx] * y[m as usize];
            }
        }
        result[out_i] = sum;
    }

    result
}

/// Compute FFT-based cross-correlation via `R_xy = IFFT(conj(X) · Y)` with
/// zero-padding to avoid circular wrap-around.
///
/// Returns a vector of length `2 * max_lag + 1` laid out as
/// `[R(-max_lag), …, R(0), …, R(max_lag)]`.
pub fn xcorr_fft(x: &[f32], y: &[f32], max_lag: usize) -> Vec<f32> {
    let min_fft_size = x.len() + y.len().saturating_sub(1).max(1);
    let fft_size = min_fft_size.next_power_of_two().max(2);

    let fft = Fft::new(fft_size);

    let mut buf_x: Vec<Complex<f32>> = x.iter().map(|&v| Complex::new(v, 0.0)).collect();
    buf_x.resize(fft_size, Complex::new(0.0, 0.0));

    let mut buf_y: Vec<Complex<f32>> = y.iter().map(|&v| Complex::new(v, 0.0)).collect();
    buf_y.resize(fft_size, Complex::new(0.0, 0.0));

    fft.forward_complex(&mut buf_x);
    fft.forward_complex(&mut buf_y);

    for (cx, cy) in buf_x.iter_mut().zip(buf_y.iter()) {
        *cx = cx.conj() * cy;
    }

    fft.inverse_complex(&mut buf_x);

    let out_len = 2 * max_lag + 1;
    let mut result = vec![0.0f32; out_len];

    for (out_i, lag) in (-(max_lag as i32)..=(max_lag as i32)).enumerate() {
        let fft_idx = if lag >= 0 {
            lag as usize
        } else {
            (fft_size as i32 + lag) as usize
        };
        if fft_idx < fft_size {
            result[out_i] = buf_x[fft_idx].re;
        }
    }

    result
}

/// Normalized cross-correlation (Pearson-style), scaled to `[-1, 1]`.
pub fn xcorr_normalized(x: &[f32], y: &[f32], max_lag: usize) -> Vec<f32> {
    let raw = xcorr_direct(x, y, max_lag);

    let norm_x: f32 = x.iter().map(|&v| v * v).sum::<f32>().sqrt();
    let norm_y: f32 = y.iter().map(|&v| v * v).sum::<f32>().sqrt();
    let denom = norm_x * norm_y;

    if denom < 1e-12 {
        return raw;
    }

    raw.iter().map(|&r| r / denom).collect()
}

/// Find the lag of maximum absolute correlation and its value.
///
/// `correlation` is the output of [`xcorr_direct`], [`xcorr_fft`], or
/// [`xcorr_normalized`]; `max_lag` is the value used to produce it.
pub fn peak_lag(correlation: &[f32], max_lag: usize) -> (i32, f32) {
    if correlation.is_empty() {
        return (0, 0.0);
    }

    let (best_idx, &best_val) = correlation
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            a.abs()
                .partial_cmp(&b.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap();

    let lag = best_idx as i32 - max_lag as i32;
    (lag, best_val)
}
