//! Header triplet validator.
//!
//! SAME mandates that each header is transmitted three times with a 1-second
//! pause between transmissions. This module buffers incoming candidates,
//! groups the three copies of one transmission, majority-votes corrupted
//! bytes, and assigns a confidence score before handing a [`SameHeader`] on
//! to the alert emitter.

use std::time::{Duration, Instant};

use same_config::PipelineConfig;
use same_registry::{EventCodeTable, Organization};

use crate::header::SameHeader;
use crate::stream::Candidate;

/// Default grouping window: candidates must arrive within this long of each
/// other to be considered copies of the same transmission.
pub const DEFAULT_GROUPING_WINDOW: Duration = Duration::from_secs(15);

/// Confidence penalty applied per failed field validation, floored at 0.0.
const FIELD_FAILURE_PENALTY: f32 = 0.1;

struct PendingCandidate {
    text: String,
    byte_scores: Vec<i32>,
    byte_errors: u32,
}

struct PendingGroup {
    len: usize,
    first_seen: Instant,
    candidates: Vec<PendingCandidate>,
}

/// Why a candidate (or group of candidates) was discarded rather than
/// emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// The voted or single text did not tokenize into a well-formed header.
    StructuralParseFailed,
    /// Two candidates arrived but disagreed, and neither independently
    /// passed structural validation.
    NoAgreement,
}

/// Result of offering a candidate (or of a grouping window expiring).
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A header cleared validation with the given confidence.
    Header {
        /// Tokenized header.
        header: SameHeader,
        /// The winning (voted or single) header text.
        header_text: String,
        /// Confidence in `[0.0, 1.0]`.
        confidence: f32,
        /// Malformed/non-printable byte count across the reconstruction.
        byte_errors: u32,
    },
    /// An end-of-message marker, debounced against repeats of the same
    /// three-times burst.
    Eom,
    /// Nothing could be salvaged.
    Discarded {
        /// The text that was discarded (voted, or the first candidate's).
        raw_text: String,
        /// Why it was discarded.
        reason: DiscardReason,
    },
}

/// Groups header candidates by transmission, majority-votes them, and
/// applies field validation. Owns no dedup/suppression state beyond
/// debouncing repeated EOM detections within one grouping window; final
/// across-activation deduplication is [`crate::dedup::DedupCache`]'s job.
pub struct HeaderTripletValidator {
    groups: Vec<PendingGroup>,
    window: Duration,
    last_eom_at: Option<Instant>,
    config: PipelineConfig,
    events: EventCodeTable,
}

impl HeaderTripletValidator {
    /// Build a validator using the default 15-second grouping window.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_window(config, DEFAULT_GROUPING_WINDOW)
    }

    /// Build a validator with an explicit grouping window (tests use a
    /// short window to avoid real sleeps).
    pub fn with_window(config: PipelineConfig, window: Duration) -> Self {
        Self {
            groups: Vec::new(),
            window,
            last_eom_at: None,
            config,
            events: EventCodeTable::new(),
        }
    }

    /// Offer one decoder candidate. Returns every outcome produced by this
    /// call: normally zero or one, but a call can also flush a
    /// window-expired group before processing a fresh candidate.
    pub fn offer(&mut self, candidate: Candidate, now: Instant) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        self.flush_stale_groups(now, &mut outcomes);

        match candidate {
            Candidate::Eom { arrived_at } => {
                if let Some(outcome) = self.offer_eom(arrived_at) {
                    outcomes.push(outcome);
                }
            }
            Candidate::Header {
                text,
                byte_scores,
                byte_errors,
                arrived_at,
            } => {
                if let Some(outcome) = self.offer_header(text, byte_scores, byte_errors, arrived_at) {
                    outcomes.push(outcome);
                }
            }
        }

        outcomes
    }

    fn offer_eom(&mut self, at: Instant) -> Option<Outcome> {
        if let Some(last) = self.last_eom_at {
            if at.duration_since(last) < self.window {
                self.last_eom_at = Some(at);
                return None;
            }
        }
        self.last_eom_at = Some(at);
        Some(Outcome::Eom)
    }

    fn offer_header(
        &mut self,
        text: String,
        byte_scores: Vec<i32>,
        byte_errors: u32,
        at: Instant,
    ) -> Option<Outcome> {
        let len = text.len();
        let idx = match self.groups.iter().position(|g| g.len == len) {
            Some(i) => i,
            None => {
                self.groups.push(PendingGroup {
                    len,
                    first_seen: at,
                    candidates: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        self.groups[idx].candidates.push(PendingCandidate {
            text,
            byte_scores,
            byte_errors,
        });

        if self.groups[idx].candidates.len() >= 3 {
            let group = self.groups.remove(idx);
            return Some(self.vote_and_validate(group.candidates));
        }
        None
    }

    fn flush_stale_groups(&mut self, now: Instant, outcomes: &mut Vec<Outcome>) {
        let mut i = 0;
        while i < self.groups.len() {
            if now.duration_since(self.groups[i].first_seen) >= self.window {
                let group = self.groups.remove(i);
                if let Some(outcome) = self.finalize_partial(group.candidates) {
                    outcomes.push(outcome);
                }
            } else {
                i += 1;
            }
        }
    }

    fn count_field_failures(&self, header: &SameHeader) -> u32 {
        let mut failures = 0;

        let org_known = Organization::from_code(header.originator.as_str()).is_some();
        if !org_known || !self.config.accepts_originator(header.originator.as_str()) {
            failures += 1;
        }

        let eee_known = self.events.contains(header.event_code.as_str());
        if !eee_known || !self.config.accepts_event_code(header.event_code.as_str()) {
            failures += 1;
        }

        if !header.purge_duration.is_valid() {
            failures += 1;
        }
        if !header.issuance.is_valid() {
            failures += 1;
        }

        failures
    }

    fn header_outcome(&self, text: String, base_confidence: f32, byte_errors: u32) -> Outcome {
        match SameHeader::parse(&text) {
            Ok(header) => {
                let failures = self.count_field_failures(&header);
                let confidence =
                    (base_confidence - FIELD_FAILURE_PENALTY * failures as f32).max(0.0);
                Outcome::Header {
                    header,
                    header_text: text,
                    confidence,
                    byte_errors,
                }
            }
            Err(_) => Outcome::Discarded {
                raw_text: text,
                reason: DiscardReason::StructuralParseFailed,
            },
        }
    }

    fn vote_and_validate(&self, candidates: Vec<PendingCandidate>) -> Outcome {
        let total_byte_errors: u32 = candidates.iter().map(|c| c.byte_errors).sum();
        let [a, b, c]: [PendingCandidate; 3] = candidates
            .try_into()
            .unwrap_or_else(|_| unreachable!("caller guarantees exactly 3 candidates"));
        let (text, corrected) = vote_three(&a, &b, &c);
        let base = if corrected == 0 { 1.0 } else { 0.75 };
        self.header_outcome(text, base, total_byte_errors + corrected)
    }

    fn finalize_partial(&self, mut candidates: Vec<PendingCandidate>) -> Option<Outcome> {
        match candidates.len() {
            2 => {
                let b = candidates.pop().unwrap();
                let a = candidates.pop().unwrap();
                if a.text == b.text {
                    Some(self.header_outcome(a.text, 0.75, a.byte_errors.max(b.byte_errors)))
                } else {
                    for candidate in [&a, &b] {
                        if SameHeader::parse(&candidate.text).is_ok() {
                            return Some(self.header_outcome(
                                candidate.text.clone(),
                                0.50,
                                candidate.byte_errors,
                            ));
                        }
                    }
                    Some(Outcome::Discarded {
                        raw_text: a.text,
                        reason: DiscardReason::NoAgreement,
                    })
                }
            }
            1 => {
                let only = candidates.pop().unwrap();
                Some(self.header_outcome(only.text, 0.50, only.byte_errors))
            }
            _ => None,
        }
    }
}

/// Majority-vote three equal-length candidate header strings byte-by-byte.
/// Returns the synthesized text and the count of positions where not all
/// three candidates agreed.
fn vote_three(a: &PendingCandidate, b: &PendingCandidate, c: &PendingCandidate) -> (String, u32) {
    let (ab, bb, cb) = (a.text.as_bytes(), b.text.as_bytes(), c.text.as_bytes());
    let len = ab.len().min(bb.len()).min(cb.len());
    let mut out = Vec::with_capacity(len);
    let mut corrected = 0u32;

    for i in 0..len {
        let (x, y, z) = (ab[i], bb[i], cb[i]);
        if x == y && y == z {
            out.push(x);
        } else if x == y || x == z {
            out.push(x);
            corrected += 1;
        } else if y == z {
            out.push(y);
            corrected += 1;
        } else {
            let scores = [
                a.byte_scores.get(i).copied().unwrap_or(i32::MIN),
                b.byte_scores.get(i).copied().unwrap_or(i32::MIN),
                c.byte_scores.get(i).copied().unwrap_or(i32::MIN),
            ];
            let winner = scores
                .iter()
                .enumerate()
                .max_by_key(|&(_, score)| *score)
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            out.push([x, y, z][winner]);
            corrected += 1;
        }
    }

    (String::from_utf8_lossy(&out).into_owned(), corrected)
}
