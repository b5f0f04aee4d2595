//! Activation assembly and FSK bit/tone rendering.

use same_core::constants::{
    ATTENTION_TONE_HZ, MARK_FREQ_HZ, MAX_PEAK_AMPLITUDE, PREAMBLE_BYTE, PREAMBLE_BYTE_COUNT,
    SPACE_FREQ_HZ,
};
use same_core::header_fields::{
    EventCode, Issuance, LocationCode, Originator, PurgeDuration, StationId, join_location_list,
};
use same_core::tone::{PhaseAccumulator, symbol_len_samples};

/// Everything needed to render one complete activation.
#[derive(Debug, Clone)]
pub struct Activation {
    /// `ORG` originator.
    pub originator: Originator,
    /// `EEE` event code.
    pub event_code: EventCode,
    /// 1-31 `PSSCCC` location codes, in the order they should be transmitted.
    pub locations: Vec<LocationCode>,
    /// `TTTT` purge duration.
    pub purge_duration: PurgeDuration,
    /// `JJJHHMM` issuance timestamp.
    pub issuance: Issuance,
    /// `LLLLLLLL` station identifier.
    pub station_id: StationId,
    /// Optional voice narration, already at `sample_rate`, inserted between
    /// the attention signal and the EOM bursts.
    pub narration: Option<Vec<f32>>,
    /// Duration of the two-tone attention signal, in seconds.
    pub attention_seconds: f32,
    /// Silence inserted between consecutive bursts (and around the
    /// attention signal/narration), in seconds. Must be `>= 1.0`.
    pub inter_burst_silence_sec: f32,
    /// Output sample rate.
    pub sample_rate: u32,
}

/// Rendered activation audio plus the sample offsets a caller needs to
/// locate each segment without re-parsing the waveform.
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    /// Mono PCM samples, `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate the samples were rendered at.
    pub sample_rate: u32,
    /// Sample index each of the three header bursts starts at (preamble's
    /// first sample).
    pub header_burst_offsets: [usize; 3],
    /// Sample index the attention signal starts at.
    pub attention_offset: usize,
    /// Sample index the first EOM burst starts at.
    pub eom_offset: usize,
}

/// Errors raised while assembling an activation.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum EncoderError {
    /// `sample_rate` was zero.
    #[error("sample rate must be positive")]
    InvalidSampleRate,
    /// `locations` was empty; a header must carry at least one `PSSCCC`.
    #[error("activation must carry at least one location code")]
    NoLocations,
    /// `locations` exceeded the 31-location wire limit.
    #[error("activation carries {0} locations, the wire format allows at most 31")]
    TooManyLocations(usize),
    /// `inter_burst_silence_sec` was below the 1-second protocol minimum.
    #[error("inter-burst silence {0}s is below the 1.0s minimum")]
    SilenceTooShort(f32),
}

/// Phase-continuous FSK/tone renderer. Stateless: all per-activation
/// state lives in [`Activation`] and the returned [`EncodedAudio`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SameEncoder;

impl SameEncoder {
    /// Build an encoder. Stateless today; a struct (rather than a free
    /// function) so callers can still thread configuration through later
    /// without breaking the public API.
    pub fn new() -> Self {
        Self
    }

    /// Render `activation` to PCM.
    pub fn encode(&self, activation: &Activation) -> Result<EncodedAudio, EncoderError> {
        if activation.sample_rate == 0 {
            return Err(EncoderError::InvalidSampleRate);
        }
        if activation.locations.is_empty() {
            return Err(EncoderError::NoLocations);
        }
        if activation.locations.len() > 31 {
            return Err(EncoderError::TooManyLocations(activation.locations.len()));
        }
        if activation.inter_burst_silence_sec < 1.0 {
            return Err(EncoderError::SilenceTooShort(
                activation.inter_burst_silence_sec,
            ));
        }

        let sample_rate = activation.sample_rate as f32;
        let header_text = render_header_text(activation);

        let mut samples = Vec::new();
        let mut header_burst_offsets = [0usize; 3];

        for slot in &mut header_burst_offsets {
            *slot = samples.len();
            push_burst(&mut samples, header_text.as_bytes(), sample_rate);
            push_silence(&mut samples, activation.inter_burst_silence_sec, sample_rate);
        }

        let attention_offset = samples.len();
        push_attention_tone(&mut samples, activation.attention_seconds, sample_rate);
        push_silence(&mut samples, activation.inter_burst_silence_sec, sample_rate);

        if let Some(narration) = &activation.narration {
            samples.extend_from_slice(narration);
            push_silence(&mut samples, activation.inter_burst_silence_sec, sample_rate);
        }

        let eom_offset = samples.len();
        for i in 0..3 {
            push_burst(&mut samples, b"NNNN", sample_rate);
            if i < 2 {
                push_silence(&mut samples, activation.inter_burst_silence_sec, sample_rate);
            }
        }

        Ok(EncodedAudio {
            samples,
            sample_rate: activation.sample_rate,
            header_burst_offsets,
            attention_offset,
            eom_offset,
        })
    }
}

fn render_header_text(activation: &Activation) -> String {
    format!(
        "ZCZC-{}-{}-{}+{}-{}-{}-",
        activation.originator.as_str(),
        activation.event_code.as_str(),
        join_location_list(&activation.locations),
        activation.purge_duration.to_wire(),
        activation.issuance.to_wire(),
        activation.station_id.as_str(),
    )
}

/// Emit `PREAMBLE_BYTE_COUNT` 0xAB bytes followed by `payload`, as
/// phase-continuous FSK. Phase resets at the start of each burst; it is only
/// carried continuously *within* the burst.
fn push_burst(out: &mut Vec<f32>, payload: &[u8], sample_rate: f32) {
    let mut osc = PhaseAccumulator::new(sample_rate, MARK_FREQ_HZ);
    let symbol_len = symbol_len_samples(sample_rate);

    let mut push_byte = |byte: u8, out: &mut Vec<f32>, osc: &mut PhaseAccumulator| {
        for i in 0..8 {
            let bit = (byte >> i) & 1 == 1;
            osc.set_frequency(if bit { MARK_FREQ_HZ } else { SPACE_FREQ_HZ });
            for _ in 0..symbol_len {
                out.push(osc.advance());
            }
        }
    };

    for _ in 0..PREAMBLE_BYTE_COUNT {
        push_byte(PREAMBLE_BYTE, out, &mut osc);
    }
    for &byte in payload {
        push_byte(byte, out, &mut osc);
    }
}

fn push_silence(out: &mut Vec<f32>, seconds: f32, sample_rate: f32) {
    let n = (seconds.max(0.0) * sample_rate) as usize;
    out.resize(out.len() + n, 0.0);
}

/// Two-tone attention signal: the sum of the 853 Hz and 960 Hz sinusoids,
/// scaled so the combined peak stays under [`MAX_PEAK_AMPLITUDE`].
fn push_attention_tone(out: &mut Vec<f32>, seconds: f32, sample_rate: f32) {
    let n = (seconds.max(0.0) * sample_rate) as usize;
    let mut low = PhaseAccumulator::new(sample_rate, ATTENTION_TONE_HZ.0);
    let mut high = PhaseAccumulator::new(sample_rate, ATTENTION_TONE_HZ.1);
    let scale = MAX_PEAK_AMPLITUDE / 2.0;
    for _ in 0..n {
        out.push((low.advance() + high.advance()) * scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use same_core::header_fields::parse_location_list;

    fn s1_activation(sample_rate: u32) -> Activation {
        Activation {
            originator: Originator::parse("EAS").unwrap(),
            event_code: EventCode::parse("RWT").unwrap(),
            locations: parse_location_list("039107").unwrap(),
            purge_duration: PurgeDuration::parse("0030").unwrap(),
            issuance: Issuance::parse("0521800").unwrap(),
            station_id: StationId::from_name("KR8MER"),
            narration: None,
            attention_seconds: 1.0,
            inter_burst_silence_sec: 1.0,
            sample_rate,
        }
    }

    #[test]
    fn header_text_matches_wire_format() {
        assert_eq!(
            render_header_text(&s1_activation(22050)),
            "ZCZC-EAS-RWT-039107+0030-0521800-KR8MER  -"
        );
    }

    #[test]
    fn rejects_zero_sample_rate() {
        let encoder = SameEncoder::new();
        let mut activation = s1_activation(22050);
        activation.sample_rate = 0;
        assert_eq!(
            encoder.encode(&activation).unwrap_err(),
            EncoderError::InvalidSampleRate
        );
    }

    #[test]
    fn rejects_empty_locations() {
        let encoder = SameEncoder::new();
        let mut activation = s1_activation(22050);
        activation.locations.clear();
        assert_eq!(
            encoder.encode(&activation).unwrap_err(),
            EncoderError::NoLocations
        );
    }

    #[test]
    fn rejects_short_inter_burst_silence() {
        let encoder = SameEncoder::new();
        let mut activation = s1_activation(22050);
        activation.inter_burst_silence_sec = 0.2;
        assert_eq!(
            encoder.encode(&activation).unwrap_err(),
            EncoderError::SilenceTooShort(0.2)
        );
    }

    #[test]
    fn offsets_are_monotonically_increasing() {
        let encoder = SameEncoder::new();
        let encoded = encoder.encode(&s1_activation(22050)).unwrap();
        assert!(encoded.header_burst_offsets[0] < encoded.header_burst_offsets[1]);
        assert!(encoded.header_burst_offsets[1] < encoded.header_burst_offsets[2]);
        assert!(encoded.header_burst_offsets[2] < encoded.attention_offset);
        assert!(encoded.attention_offset < encoded.eom_offset);
        assert!(encoded.eom_offset < encoded.samples.len());
    }

    #[test]
    fn peak_amplitude_stays_within_ceiling() {
        let encoder = SameEncoder::new();
        let encoded = encoder.encode(&s1_activation(22050)).unwrap();
        let peak = encoded.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= MAX_PEAK_AMPLITUDE + 1e-3, "peak {peak} exceeds ceiling");
    }

    #[test]
    fn narration_is_spliced_between_attention_and_eom() {
        let encoder = SameEncoder::new();
        let mut activation = s1_activation(22050);
        activation.narration = Some(vec![0.25; 1000]);
        let encoded = encoder.encode(&activation).unwrap();
        assert!(encoded.eom_offset - encoded.attention_offset > 1000);
    }
}
