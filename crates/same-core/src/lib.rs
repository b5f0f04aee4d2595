//! SAME/EAS Core - FSK primitives for the Specific Area Message Encoding protocol
//!
//! This crate provides the foundational building blocks shared by the SAME
//! decoder and encoder: the two-tone frequency constants mandated by
//! FCC §11.31, phase-continuous tone generation, correlation-based tone
//! discrimination, and the delay-locked-loop bit synchronizer that keeps a
//! receiver's sampler aligned to the transmitted symbol clock.
//!
//! # Core Abstractions
//!
//! - [`constants`] - Mark/space frequencies, baud rate, symbol period
//! - [`tone`] - Precomputed correlation templates and a phase-continuous oscillator
//! - [`correlate`] - Sliding correlation magnitudes and data-carrier-detect
//! - [`dll`] - Delay-locked-loop bit synchronizer
//! - [`header_fields`] - Shared header field types used by both the decoder and encoder
//! - [`math`] - Shared numeric helpers (dB conversions, downmixing, clamping)
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! same-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod constants;
pub mod correlate;
pub mod dll;
pub mod header_fields;
pub mod math;
pub mod tone;

pub use constants::{BIT_RATE, MARK_FREQ_HZ, SPACE_FREQ_HZ, SYMBOL_PERIOD_SEC};
pub use correlate::{CorrelationState, ToneDecision};
pub use dll::BitSync;
pub use header_fields::{
    EventCode, HeaderFieldError, Issuance, LocationCode, Originator, PurgeDuration, StationId,
};
pub use math::{clamp, db_to_linear, lerp, linear_to_db, mono_sum};
pub use tone::{PhaseAccumulator, ToneTemplates};
