//! Decoder-crate error types.
//!
//! Per the error taxonomy: configuration errors are the only ones that
//! propagate out of this crate as `Err`. Signal errors (loss of DCD, loss of
//! bit sync, malformed bytes) never escape [`crate::stream::StreamingDecoder::process_samples`] —
//! they surface only as metrics. Validation errors reduce confidence or
//! drop a candidate, they do not produce an `Err`. Sink errors are caught
//! and retried internally by [`crate::emit::AlertEmitter`].

pub use crate::stream::InvalidSampleRate;

/// Errors raised at decoder construction; fatal for that component and not
/// retryable, per the configuration-error taxonomy class.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    /// The requested sample rate is not usable.
    #[error(transparent)]
    InvalidSampleRate(#[from] InvalidSampleRate),
}
