//! Streaming SAME FSK decoder: demodulation, byte framing, header triplet
//! voting, deduplication, and alert emission.
//!
//! [`stream::StreamingDecoder`] turns PCM samples into [`stream::Candidate`]
//! detections. [`validate::HeaderTripletValidator`] groups and majority-votes
//! the three repeated copies of a header into a [`header::SameHeader`] with a
//! confidence score. [`dedup::DedupCache`] suppresses repeats of the same
//! activation. [`emit::AlertEmitter`] fans the resulting [`alert::AlertEvent`]
//! out to registered sinks.

pub mod alert;
pub mod archive;
pub mod dedup;
pub mod emit;
pub mod error;
mod framing;
pub mod header;
pub mod stream;
pub mod validate;

pub use alert::{AlertEvent, AudioHandle, ParsedFields};
pub use archive::{AudioArchive, PinId};
pub use dedup::{DedupCache, DedupKey};
pub use emit::{AlertEmitter, AlertSink, ChannelSink, LogSink, SinkError, SinkHealth, SinkStatus};
pub use error::DecoderError;
pub use header::{HeaderParseError, SameHeader};
pub use stream::{Candidate, DecoderStats, InvalidSampleRate, PhaseStat, StreamingDecoder};
pub use validate::{DiscardReason, HeaderTripletValidator, Outcome};
