//! SAME/EAS FSK encoder.
//!
//! [`SameEncoder::encode`] renders a complete activation — three header
//! bursts, the two-tone attention signal, an optional narration segment, and
//! three end-of-message bursts — into phase-continuous PCM, sharing the mark
//! and space tone generation with the decoder's correlation templates via
//! [`same_core::tone`].

mod encoder;

pub use encoder::{Activation, EncodedAudio, EncoderError, SameEncoder};
