//! Streaming SAME FSK decoder.
//!
//! [`StreamingDecoder`] is the hard core of the pipeline: it accepts PCM
//! samples in chunks of arbitrary size, keeps all demodulation state across
//! calls, and emits [`Candidate`] header/EOM detections as soon as they
//! complete. There is no buffer-then-scan step and no temporary file.

use std::sync::Mutex;
use std::time::Instant;

use same_core::correlate::CorrelationState;
use same_core::dll::BitSync;
use same_core::math::sanitize_sample;
use same_core::tone::{ToneTemplates, symbol_len_samples};

use crate::framing::{ByteFramer, FramingEvent};

/// A bit time expressed as a count of samples, used for the DCD-loss and
/// non-printable-prefix timeouts below.
const DCD_LOSS_BIT_TIMES: usize = 3;

/// A completed detection emitted from [`StreamingDecoder::process_samples`].
#[derive(Debug, Clone)]
pub enum Candidate {
    /// A candidate header string, not yet triplet-voted or field-validated.
    Header {
        /// Raw ASCII text, including the `ZCZC-` prefix and terminating `-`.
        text: String,
        /// DCD-integrator score recorded at the moment each byte completed,
        /// same length and order as `text`'s bytes; used by the triplet
        /// validator to break three-way disagreements.
        byte_scores: Vec<i32>,
        /// Count of bytes outside the printable ASCII range (0x20-0x7E).
        byte_errors: u32,
        /// Wall-clock time the terminating byte was recovered.
        arrived_at: Instant,
    },
    /// An end-of-message marker (`NNNN`).
    Eom {
        /// Wall-clock time the marker was recovered.
        arrived_at: Instant,
    },
}

/// Internal decoder phase, mirrored into [`DecoderStats::current_phase`] for
/// telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Collecting,
}

/// Phase value exposed through [`DecoderStats`] (a plain copy of [`Phase`]
/// so the internal enum doesn't need to be public).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseStat {
    /// Searching for preamble lock.
    #[default]
    Idle,
    /// Accumulating header/EOM bytes after preamble lock.
    Collecting,
}

/// Read-only decoder telemetry, copied out by [`StreamingDecoder::snapshot_state`].
#[derive(Debug, Clone, Default)]
pub struct DecoderStats {
    /// Total samples processed since construction (or since the last [`StreamingDecoder::reset`]).
    pub samples_processed: u64,
    /// Samples replaced with 0.0 because they were NaN/Inf.
    pub sanitize_count: u64,
    /// Number of times preamble lock was declared.
    pub preamble_locks: u64,
    /// Number of header candidates emitted.
    pub headers_emitted: u64,
    /// Number of EOM candidates emitted.
    pub eom_emitted: u64,
    /// Number of collections abandoned (non-printable prefix or DCD loss).
    pub aborted_collections: u64,
    /// Current state-machine phase.
    pub current_phase: PhaseStat,
}

enum CollectOutcome {
    Continue,
    Emit(Candidate),
    Abort,
}

struct Collection {
    buffer: Vec<u8>,
    byte_scores: Vec<i32>,
    non_printable: u32,
    dash_count: u32,
    samples_since_signal: usize,
}

/// Header fields are separated by exactly this many `-` characters;
/// the last one is the terminator (`ZCZC`, ORG, EEE, location+TTTT group,
/// JJJHHMM, LLLLLLLL).
const HEADER_TERMINATOR_DASH_COUNT: u32 = 6;

impl Collection {
    fn new() -> Self {
        Self {
            buffer: Vec::new(),
            byte_scores: Vec::new(),
            non_printable: 0,
            dash_count: 0,
            samples_since_signal: 0,
        }
    }

    fn push_byte(&mut self, byte: u8, score: i32, arrived_at: Instant) -> CollectOutcome {
        self.buffer.push(byte);
        self.byte_scores.push(score);
        if !(0x20..=0x7E).contains(&byte) {
            self.non_printable += 1;
        }

        if self.buffer.len() <= 8 && self.non_printable > 3 {
            return CollectOutcome::Abort;
        }

        if self.buffer.len() == 4 && &self.buffer[..4] == b"NNNN" {
            return CollectOutcome::Emit(Candidate::Eom { arrived_at });
        }

        if byte == b'-' {
            self.dash_count += 1;
            if self.dash_count == HEADER_TERMINATOR_DASH_COUNT {
                return CollectOutcome::Emit(self.finish(arrived_at));
            }
        }

        if self.buffer.len() >= same_core::constants::MAX_HEADER_LEN {
            return CollectOutcome::Emit(self.finish(arrived_at));
        }

        CollectOutcome::Continue
    }

    fn finish(&self, arrived_at: Instant) -> Candidate {
        Candidate::Header {
            text: String::from_utf8_lossy(&self.buffer).into_owned(),
            byte_scores: self.byte_scores.clone(),
            byte_errors: self.non_printable,
            arrived_at,
        }
    }
}

/// Construction-time error: the decoder requires a positive sample rate.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("invalid sample rate: {0} Hz (must be positive)")]
pub struct InvalidSampleRate(pub f32);

/// The streaming FSK demodulator. Single-threaded and cooperative:
/// callers must serialize calls to [`StreamingDecoder::process_samples`]
/// from one driving thread. [`StreamingDecoder::snapshot_state`] may be
/// called from any thread without mutating decoder state.
pub struct StreamingDecoder {
    sample_rate: f32,
    templates: ToneTemplates,
    corr: CorrelationState,
    bitsync: BitSync,
    framer: ByteFramer,
    phase: Phase,
    collect: Option<Collection>,
    symbol_len: usize,
    counters: DecoderStats,
    stats: Mutex<DecoderStats>,
}

impl StreamingDecoder {
    /// Build a decoder bound to `sample_rate`. Per the data model's first
    /// cross-cutting invariant, changing the rate requires building a new
    /// instance rather than mutating this one.
    pub fn new(sample_rate: f32) -> Result<Self, InvalidSampleRate> {
        if !(sample_rate > 0.0) {
            return Err(InvalidSampleRate(sample_rate));
        }
        let templates = ToneTemplates::new(sample_rate);
        Ok(Self {
            sample_rate,
            corr: CorrelationState::new(&templates),
            bitsync: BitSync::new(sample_rate),
            templates,
            framer: ByteFramer::new(),
            phase: Phase::Idle,
            collect: None,
            symbol_len: symbol_len_samples(sample_rate),
            counters: DecoderStats::default(),
            stats: Mutex::new(DecoderStats::default()),
        })
    }

    /// The sample rate this decoder was constructed for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Process one chunk of PCM samples (1 sample to 1+ seconds), returning
    /// every header/EOM candidate that completed during the call. Pure CPU
    /// work, O(n) in `samples.len()`; never suspends.
    pub fn process_samples(&mut self, samples: &[f32]) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for &raw in samples {
            self.counters.samples_processed += 1;
            let (sample, sanitized) = sanitize_sample(raw);
            if sanitized {
                self.counters.sanitize_count += 1;
            }

            let Some(decision) = self.corr.process(&self.templates, sample) else {
                continue;
            };
            let signal_present = self.corr.signal_present();

            if let Some(bit) = self.bitsync.advance(decision.mark) {
                if let Some(event) = self.framer.push_bit(bit.0) {
                    self.handle_framing_event(event, &mut candidates);
                }
            }

            self.track_dcd_loss(signal_present);
        }

        self.flush_stats();
        candidates
    }

    fn handle_framing_event(&mut self, event: FramingEvent, candidates: &mut Vec<Candidate>) {
        match event {
            FramingEvent::PreambleLock => {
                self.counters.preamble_locks += 1;
                self.phase = Phase::Collecting;
                self.collect = Some(Collection::new());
            }
            FramingEvent::Byte(byte) => {
                let Some(collection) = self.collect.as_mut() else {
                    return;
                };
                let score = self.corr.dcd_integrator();
                match collection.push_byte(byte, score, Instant::now()) {
                    CollectOutcome::Continue => {}
                    CollectOutcome::Emit(candidate) => {
                        match &candidate {
                            Candidate::Header { .. } => self.counters.headers_emitted += 1,
                            Candidate::Eom { .. } => self.counters.eom_emitted += 1,
                        }
                        candidates.push(candidate);
                        self.return_to_idle();
                    }
                    CollectOutcome::Abort => {
                        self.counters.aborted_collections += 1;
                        self.return_to_idle();
                    }
                }
            }
        }
    }

    fn track_dcd_loss(&mut self, signal_present: bool) {
        if self.phase != Phase::Collecting {
            return;
        }
        let Some(collection) = self.collect.as_mut() else {
            return;
        };
        if signal_present {
            collection.samples_since_signal = 0;
            return;
        }
        collection.samples_since_signal += 1;
        if collection.samples_since_signal > self.symbol_len * DCD_LOSS_BIT_TIMES {
            self.counters.aborted_collections += 1;
            self.return_to_idle();
        }
    }

    fn return_to_idle(&mut self) {
        self.phase = Phase::Idle;
        self.collect = None;
        self.framer.reset();
    }

    fn flush_stats(&self) {
        let mut stats = self.stats.lock().expect("decoder stats mutex poisoned");
        *stats = self.counters.clone();
        stats.current_phase = match self.phase {
            Phase::Idle => PhaseStat::Idle,
            Phase::Collecting => PhaseStat::Collecting,
        };
    }

    /// Copy out current telemetry counters. Safe to call from any thread;
    /// never mutates decoder state.
    pub fn snapshot_state(&self) -> DecoderStats {
        self.stats.lock().expect("decoder stats mutex poisoned").clone()
    }

    /// Reset bit-level demodulation state (used on source failover). Does
    /// not affect any externally-owned deduplication cache.
    pub fn reset(&mut self) {
        self.corr.reset();
        self.bitsync.reset();
        self.return_to_idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use same_core::constants::{BIT_RATE, MARK_FREQ_HZ, SPACE_FREQ_HZ};
    use std::f64::consts::TAU;

    fn fsk_samples_for_bytes(bytes: &[u8], sample_rate: f32) -> Vec<f32> {
        let symbol_len = symbol_len_samples(sample_rate);
        let mut out = Vec::new();
        let mut phase = 0.0f64;
        let mut push_symbol = |mark: bool, out: &mut Vec<f32>, phase: &mut f64| {
            let freq = if mark { MARK_FREQ_HZ } else { SPACE_FREQ_HZ };
            let inc = TAU * freq / sample_rate as f64;
            for _ in 0..symbol_len {
                out.push(phase.sin() as f32);
                *phase += inc;
                if *phase >= TAU {
                    *phase -= TAU;
                }
            }
        };
        for &byte in bytes {
            for i in 0..8 {
                let bit = (byte >> i) & 1 == 1;
                push_symbol(bit, &mut out, &mut phase);
            }
        }
        out
    }

    fn preamble_and(bytes: &[u8]) -> Vec<u8> {
        let mut full = vec![0xABu8; 16];
        full.extend_from_slice(bytes);
        full
    }

    #[test]
    fn constructs_at_supported_rates() {
        for rate in [16_000.0, 22_050.0, 44_100.0] {
            assert!(StreamingDecoder::new(rate).is_ok());
        }
    }

    #[test]
    fn rejects_non_positive_sample_rate() {
        assert!(StreamingDecoder::new(0.0).is_err());
        assert!(StreamingDecoder::new(-1.0).is_err());
    }

    #[test]
    fn decodes_simple_header_in_one_shot() {
        let sample_rate = 22050.0;
        let header = b"ZCZC-EAS-RWT-039107+0030-0521800-KR8MER  -";
        let bytes = preamble_and(header);
        let samples = fsk_samples_for_bytes(&bytes, sample_rate);

        let mut decoder = StreamingDecoder::new(sample_rate).unwrap();
        let candidates = decoder.process_samples(&samples);

        let headers: Vec<_> = candidates
            .iter()
            .filter_map(|c| match c {
                Candidate::Header { text, .. } => Some(text.clone()),
                Candidate::Eom { .. } => None,
            })
            .collect();
        assert_eq!(headers, vec!["ZCZC-EAS-RWT-039107+0030-0521800-KR8MER  -".to_string()]);
    }

    #[test]
    fn decodes_header_split_across_many_small_chunks() {
        let sample_rate = 22050.0;
        let header = b"ZCZC-EAS-RWT-039107+0030-0521800-KR8MER  -";
        let bytes = preamble_and(header);
        let samples = fsk_samples_for_bytes(&bytes, sample_rate);

        let mut decoder = StreamingDecoder::new(sample_rate).unwrap();
        let mut found = Vec::new();
        for chunk in samples.chunks(7) {
            found.extend(decoder.process_samples(chunk));
        }
        let headers: Vec<_> = found
            .iter()
            .filter_map(|c| match c {
                Candidate::Header { text, .. } => Some(text.clone()),
                Candidate::Eom { .. } => None,
            })
            .collect();
        assert_eq!(headers, vec!["ZCZC-EAS-RWT-039107+0030-0521800-KR8MER  -".to_string()]);
    }

    #[test]
    fn decodes_eom_marker() {
        let sample_rate = 22050.0;
        let bytes = preamble_and(b"NNNN");
        let samples = fsk_samples_for_bytes(&bytes, sample_rate);

        let mut decoder = StreamingDecoder::new(sample_rate).unwrap();
        let candidates = decoder.process_samples(&samples);
        assert_eq!(candidates.len(), 1);
        assert!(matches!(candidates[0], Candidate::Eom { .. }));
    }

    #[test]
    fn silence_never_emits_and_stays_idle() {
        let sample_rate = 22050.0;
        let samples = vec![0.0f32; sample_rate as usize];
        let mut decoder = StreamingDecoder::new(sample_rate).unwrap();
        let candidates = decoder.process_samples(&samples);
        assert!(candidates.is_empty());
        assert_eq!(decoder.snapshot_state().current_phase, PhaseStat::Idle);
    }

    #[test]
    fn nan_and_inf_samples_are_sanitized_and_counted() {
        let sample_rate = 22050.0;
        let mut samples = vec![0.0f32; 200];
        samples[10] = f32::NAN;
        samples[20] = f32::INFINITY;
        let mut decoder = StreamingDecoder::new(sample_rate).unwrap();
        decoder.process_samples(&samples);
        assert_eq!(decoder.snapshot_state().sanitize_count, 2);
    }

    #[test]
    fn snapshot_state_does_not_mutate_decoder() {
        let sample_rate = 22050.0;
        let mut decoder = StreamingDecoder::new(sample_rate).unwrap();
        let before = decoder.process_samples(&[0.0; 100]).len();
        let _ = decoder.snapshot_state();
        let _ = decoder.snapshot_state();
        let after = decoder.process_samples(&[0.0; 100]);
        assert_eq!(before, 0);
        assert!(after.is_empty());
    }

    #[test]
    fn reset_clears_partial_collection() {
        let sample_rate = 22050.0;
        let header_prefix = preamble_and(b"ZCZC-EA");
        let samples = fsk_samples_for_bytes(&header_prefix, sample_rate);
        let mut decoder = StreamingDecoder::new(sample_rate).unwrap();
        decoder.process_samples(&samples);
        assert_eq!(decoder.snapshot_state().current_phase, PhaseStat::Collecting);
        decoder.reset();
        assert_eq!(decoder.snapshot_state().current_phase, PhaseStat::Idle);
    }

    #[test]
    fn bit_rate_matches_symbol_len_assumption() {
        // Sanity check that the test helper's symbol length lines up with
        // the decoder's own, so failures below are protocol bugs, not
        // helper-math bugs.
        let sample_rate = 22050.0;
        let expected = (sample_rate as f64 / BIT_RATE).round() as usize;
        assert_eq!(symbol_len_samples(sample_rate), expected);
    }
}
