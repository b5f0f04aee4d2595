//! SAME Analysis - FFT, cross-correlation, and resampling support.
//!
//! Three tools live here, each used by a different corner of the pipeline:
//!
//! - [`fft`] - windowed FFT wrapper backing [`xcorr::xcorr_fft`]
//! - [`xcorr`] - time- and frequency-domain cross-correlation, used by the
//!   decoder's conformance tests to measure burst alignment
//! - [`resample`] - polyphase rational resampling for source adapters whose
//!   native sample rate differs from the decoder's working rate

pub mod fft;
pub mod resample;
pub mod xcorr;

pub use fft::{Fft, Window};
pub use resample::{decimate, interpolate, resample};
pub use xcorr::{peak_lag, xcorr_direct, xcorr_fft, xcorr_normalized};
