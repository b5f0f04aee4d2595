//! Shared SAME header field types.
//!
//! Both the decoder's parser and the encoder's wire-string assembler need the
//! exact same notion of "what a valid `ORG` token looks like" or "how `TTTT`
//! is rendered" — if those lived separately the two sides would drift. Each
//! type here only enforces the *syntactic* shape of its field (length,
//! character class, digit-ness); semantic membership checks against a
//! vocabulary (is `ORG` one of the four known originators? is `EEE` a
//! registered event code?) are the job of `same-registry`, consulted by the
//! decoder's header validator, not by these types.

#[cfg(not(feature = "std"))]
use alloc::string::{String, ToString};
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
use core::fmt;

/// A field failed to parse from its wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFieldError {
    /// Field was not the required length.
    WrongLength {
        /// Name of the offending field.
        field: &'static str,
        /// Required length.
        expected: usize,
        /// Length actually seen.
        actual: usize,
    },
    /// Field contained a byte outside its required character class.
    InvalidChar {
        /// Name of the offending field.
        field: &'static str,
        /// The offending byte.
        byte: u8,
    },
}

impl fmt::Display for HeaderFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderFieldError::WrongLength {
                field,
                expected,
                actual,
            } => write!(f, "{field}: expected length {expected}, got {actual}"),
            HeaderFieldError::InvalidChar { field, byte } => {
                write!(f, "{field}: invalid character byte {byte:#04x}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HeaderFieldError {}

fn parse_fixed_len(
    field: &'static str,
    s: &str,
    len: usize,
    valid: impl Fn(u8) -> bool,
) -> Result<(), HeaderFieldError> {
    if s.len() != len {
        return Err(HeaderFieldError::WrongLength {
            field,
            expected: len,
            actual: s.len(),
        });
    }
    for b in s.bytes() {
        if !valid(b) {
            return Err(HeaderFieldError::InvalidChar { field, byte: b });
        }
    }
    Ok(())
}

/// Three-character `ORG` originator token. Purely syntactic: whether
/// the value is one of the known originators is a `same-registry` concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Originator(String);

impl Originator {
    /// Parse a 3-character uppercase-ASCII originator token.
    pub fn parse(s: &str) -> Result<Self, HeaderFieldError> {
        parse_fixed_len("ORG", s, 3, |b| b.is_ascii_uppercase())?;
        Ok(Self(s.to_string()))
    }

    /// The 3-character wire token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Three-character `EEE` event code token. Purely syntactic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCode(String);

impl EventCode {
    /// Parse a 3-character uppercase-ASCII event code token.
    pub fn parse(s: &str) -> Result<Self, HeaderFieldError> {
        parse_fixed_len("EEE", s, 3, |b| b.is_ascii_uppercase())?;
        Ok(Self(s.to_string()))
    }

    /// The 3-character wire token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One `PSSCCC` location code: six decimal digits. A header carries
/// 1-31 of these, joined by `+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationCode([u8; 6]);

impl LocationCode {
    /// Parse a 6-digit `PSSCCC` token.
    pub fn parse(s: &str) -> Result<Self, HeaderFieldError> {
        parse_fixed_len("PSSCCC", s, 6, |b| b.is_ascii_digit())?;
        let mut digits = [0u8; 6];
        digits.copy_from_slice(s.as_bytes());
        Ok(Self(digits))
    }

    /// Render back to the original 6-digit token.
    pub fn as_str(&self) -> &str {
        // SAFETY-free: constructed only from ASCII digit bytes.
        core::str::from_utf8(&self.0).unwrap_or("000000")
    }
}

/// Parse a `+`-joined list of 1-31 `PSSCCC` tokens.
pub fn parse_location_list(s: &str) -> Result<Vec<LocationCode>, HeaderFieldError> {
    let mut codes = Vec::new();
    for part in s.split('+') {
        codes.push(LocationCode::parse(part)?);
    }
    Ok(codes)
}

/// Join a list of location codes back into the `+`-separated wire form.
#[cfg(feature = "std")]
pub fn join_location_list(codes: &[LocationCode]) -> String {
    codes
        .iter()
        .map(LocationCode::as_str)
        .collect::<Vec<_>>()
        .join("+")
}

/// Purge duration `TTTT`: two-digit hours, two-digit minutes. Parsing
/// only checks digit-ness and length; whether `minutes < 60` is a semantic
/// rule the header validator applies via [`PurgeDuration::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeDuration {
    hours: u8,
    minutes: u8,
}

impl PurgeDuration {
    /// Build directly from hours/minutes (encoder path); does not itself
    /// reject an out-of-range minute value, matching the decoder's
    /// parse-then-validate split.
    pub fn new(hours: u8, minutes: u8) -> Self {
        Self { hours, minutes }
    }

    /// Parse a 4-digit `TTTT` token.
    pub fn parse(s: &str) -> Result<Self, HeaderFieldError> {
        parse_fixed_len("TTTT", s, 4, |b| b.is_ascii_digit())?;
        let bytes = s.as_bytes();
        let hours = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
        let minutes = (bytes[2] - b'0') * 10 + (bytes[3] - b'0');
        Ok(Self { hours, minutes })
    }

    /// Render back to the 4-digit wire token.
    #[cfg(feature = "std")]
    pub fn to_wire(self) -> String {
        format!("{:02}{:02}", self.hours, self.minutes)
    }

    /// Hours field.
    pub fn hours(self) -> u8 {
        self.hours
    }

    /// Minutes field.
    pub fn minutes(self) -> u8 {
        self.minutes
    }

    /// Whether the minutes field is a valid clock value (`< 60`), per the
    /// header validator's field-validation step.
    pub fn is_valid(self) -> bool {
        self.minutes < 60
    }
}

/// Issuance timestamp `JJJHHMM`: Julian day-of-year, hour, minute, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Issuance {
    day_of_year: u16,
    hour: u8,
    minute: u8,
}

impl Issuance {
    /// Build directly from components (encoder path).
    pub fn new(day_of_year: u16, hour: u8, minute: u8) -> Self {
        Self {
            day_of_year,
            hour,
            minute,
        }
    }

    /// Parse a 7-digit `JJJHHMM` token.
    pub fn parse(s: &str) -> Result<Self, HeaderFieldError> {
        parse_fixed_len("JJJHHMM", s, 7, |b| b.is_ascii_digit())?;
        let bytes = s.as_bytes();
        let day = (bytes[0] - b'0') as u16 * 100
            + (bytes[1] - b'0') as u16 * 10
            + (bytes[2] - b'0') as u16;
        let hour = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
        let minute = (bytes[5] - b'0') * 10 + (bytes[6] - b'0');
        Ok(Self {
            day_of_year: day,
            hour,
            minute,
        })
    }

    /// Render back to the 7-digit wire token.
    #[cfg(feature = "std")]
    pub fn to_wire(self) -> String {
        format!("{:03}{:02}{:02}", self.day_of_year, self.hour, self.minute)
    }

    /// Julian day-of-year field.
    pub fn day_of_year(self) -> u16 {
        self.day_of_year
    }

    /// Hour field, UTC.
    pub fn hour(self) -> u8 {
        self.hour
    }

    /// Minute field.
    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Whether every sub-field is a valid calendar/clock value: day in
    /// `[1, 366]`, hour `< 24`, minute `< 60`.
    pub fn is_valid(self) -> bool {
        (1..=366).contains(&self.day_of_year) && self.hour < 24 && self.minute < 60
    }
}

/// Eight-character station identifier `LLLLLLLL`, right-padded with
/// a space and restricted to `[A-Z0-9/ ]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationId(String);

impl StationId {
    /// Build from a name, right-padding with a space to 8 characters. Panics
    /// if `name` is longer than 8 characters or contains a byte outside
    /// `[A-Z0-9/ ]` — an encoder-side programmer error, not a runtime
    /// condition callers are expected to recover from.
    pub fn from_name(name: &str) -> Self {
        assert!(name.len() <= 8, "station id longer than 8 characters");
        assert!(
            name.bytes().all(is_station_char),
            "station id contains a character outside [A-Z0-9/ ]"
        );
        let mut padded = name.to_string();
        while padded.len() < 8 {
            padded.push(' ');
        }
        Self(padded)
    }

    /// Parse an already-8-character wire token.
    pub fn parse(s: &str) -> Result<Self, HeaderFieldError> {
        parse_fixed_len("LLLLLLLL", s, 8, is_station_char)?;
        Ok(Self(s.to_string()))
    }

    /// The 8-character wire token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_station_char(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'/' || b == b' '
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn originator_round_trips() {
        let o = Originator::parse("EAS").unwrap();
        assert_eq!(o.as_str(), "EAS");
    }

    #[test]
    fn originator_rejects_wrong_length() {
        assert!(Originator::parse("EA").is_err());
    }

    #[test]
    fn location_code_parses_digits() {
        let loc = LocationCode::parse("039107").unwrap();
        assert_eq!(loc.as_str(), "039107");
    }

    #[test]
    fn location_code_rejects_non_digit() {
        assert!(LocationCode::parse("03910A").is_err());
    }

    #[test]
    fn parses_multi_location_list() {
        let list = parse_location_list("039107+039127+039137").unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].as_str(), "039127");
    }

    #[test]
    fn join_location_list_round_trips() {
        let list = parse_location_list("039107+039127").unwrap();
        assert_eq!(join_location_list(&list), "039107+039127");
    }

    #[test]
    fn purge_duration_parses_and_renders() {
        let d = PurgeDuration::parse("0030").unwrap();
        assert_eq!(d.hours(), 0);
        assert_eq!(d.minutes(), 30);
        assert!(d.is_valid());
        assert_eq!(d.to_wire(), "0030");
    }

    #[test]
    fn purge_duration_flags_invalid_minutes() {
        let d = PurgeDuration::parse("0099").unwrap();
        assert!(!d.is_valid());
    }

    #[test]
    fn issuance_parses_and_validates() {
        let t = Issuance::parse("0521800").unwrap();
        assert_eq!(t.day_of_year(), 52);
        assert_eq!(t.hour(), 18);
        assert_eq!(t.minute(), 0);
        assert!(t.is_valid());
        assert_eq!(t.to_wire(), "0521800");
    }

    #[test]
    fn issuance_flags_invalid_day() {
        let t = Issuance::new(0, 10, 10);
        assert!(!t.is_valid());
        let t = Issuance::new(400, 10, 10);
        assert!(!t.is_valid());
    }

    #[test]
    fn station_id_pads_short_names() {
        let id = StationId::from_name("KR8MER");
        assert_eq!(id.as_str(), "KR8MER  ");
    }

    #[test]
    fn station_id_parses_exact_length() {
        let id = StationId::parse("KCLE/NWS").unwrap();
        assert_eq!(id.as_str(), "KCLE/NWS");
    }

    #[test]
    fn station_id_rejects_invalid_char() {
        assert!(StationId::parse("kcle/nws").is_err());
    }
}
