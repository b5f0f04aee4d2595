//! The stable, cross-language alert event record.

use chrono::{DateTime, Utc};

use crate::header::SameHeader;

/// A byte-range handle into a source's ring buffer covering the burst and
/// the following voice segment, pinned until an external sink acknowledges
/// it or a 5-minute timeout elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioHandle {
    /// Name of the source the audio was captured from.
    pub source_name: String,
    /// First sample of the pinned range (`first_preamble_sample - 1s` worth
    /// of samples, clamped to 0).
    pub start_sample: u64,
    /// Last sample of the pinned range (`last_EOM_sample + 0.5s` worth of
    /// samples).
    pub end_sample: u64,
}

impl AudioHandle {
    /// Render as the `source:start-end` opaque string external consumers
    /// can pass around without parsing sample ranges themselves.
    pub fn to_opaque_string(&self) -> String {
        format!("{}:{}-{}", self.source_name, self.start_sample, self.end_sample)
    }
}

/// Parsed header fields, rendered to plain strings for cross-language
/// consumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFields {
    /// `ORG` originator.
    pub originator: String,
    /// `EEE` event code.
    pub event_code: String,
    /// `PSSCCC` location codes, in transmitted order.
    pub locations: Vec<String>,
    /// `TTTT` purge duration, rendered `HHMM`.
    pub purge_duration: String,
    /// `JJJHHMM` issuance timestamp.
    pub issuance: String,
    /// `LLLLLLLL` station identifier.
    pub station_id: String,
}

impl ParsedFields {
    /// Build from a tokenized header.
    pub fn from_header(header: &SameHeader) -> Self {
        Self {
            originator: header.originator.as_str().to_string(),
            event_code: header.event_code.as_str().to_string(),
            locations: header
                .locations
                .iter()
                .map(|l| l.as_str().to_string())
                .collect(),
            purge_duration: header.purge_duration.to_wire(),
            issuance: header.issuance.to_wire(),
            station_id: header.station_id.as_str().to_string(),
        }
    }
}

/// The validated alert record delivered to [`crate::emit::AlertSink`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    /// The full voted (or single-candidate) header text.
    pub header_text: String,
    /// Tokenized header fields.
    pub parsed: ParsedFields,
    /// Decode confidence in `[0.0, 1.0]`.
    pub confidence: f32,
    /// Wall-clock detection time.
    pub detected_at_utc: DateTime<Utc>,
    /// Monotonic detection timestamp, nanoseconds, for ordering within a
    /// process run.
    pub detected_at_monotonic_ns: u128,
    /// Name of the source the activation was detected on.
    pub source_name: String,
    /// Archived-audio handle for the burst and following voice segment.
    pub audio_handle: AudioHandle,
    /// Count of malformed/non-printable bytes across the voted
    /// reconstruction.
    pub byte_errors: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::SameHeader;

    #[test]
    fn audio_handle_renders_opaque_string() {
        let handle = AudioHandle {
            source_name: "primary".into(),
            start_sample: 100,
            end_sample: 5000,
        };
        assert_eq!(handle.to_opaque_string(), "primary:100-5000");
    }

    #[test]
    fn parsed_fields_mirror_header() {
        let header = SameHeader::parse("ZCZC-EAS-RWT-039107+0030-0521800-KR8MER  -").unwrap();
        let parsed = ParsedFields::from_header(&header);
        assert_eq!(parsed.originator, "EAS");
        assert_eq!(parsed.event_code, "RWT");
        assert_eq!(parsed.locations, vec!["039107".to_string()]);
        assert_eq!(parsed.purge_duration, "0030");
        assert_eq!(parsed.issuance, "0521800");
        assert_eq!(parsed.station_id, "KR8MER  ");
    }
}
