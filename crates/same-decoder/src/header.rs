//! SAME header field parsing.
//!
//! Tokenizes a voted header string by `-` and `+` into its typed fields.
//! This is purely structural: whether `ORG` or `EEE` are actually known
//! values is checked separately against `same-registry`.

use same_core::header_fields::{
    EventCode, HeaderFieldError, Issuance, LocationCode, Originator, PurgeDuration, StationId,
    parse_location_list,
};

/// A fully tokenized SAME header.
#[derive(Debug, Clone, PartialEq)]
pub struct SameHeader {
    /// `ORG` originator token.
    pub originator: Originator,
    /// `EEE` event code token.
    pub event_code: EventCode,
    /// 1-31 `PSSCCC` location codes, in transmitted order.
    pub locations: Vec<LocationCode>,
    /// `TTTT` purge duration.
    pub purge_duration: PurgeDuration,
    /// `JJJHHMM` issuance timestamp.
    pub issuance: Issuance,
    /// `LLLLLLLL` station identifier.
    pub station_id: StationId,
}

/// Why a candidate header string failed to tokenize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderParseError {
    /// Did not start with `ZCZC-`.
    MissingPrefix,
    /// The `-`-delimited field count did not match the expected shape.
    WrongFieldCount,
    /// The location/purge-duration group had no `+`-separated fields.
    EmptyLocationGroup,
    /// An individual field failed its own syntactic check.
    Field(HeaderFieldError),
}

impl From<HeaderFieldError> for HeaderParseError {
    fn from(e: HeaderFieldError) -> Self {
        HeaderParseError::Field(e)
    }
}

impl core::fmt::Display for HeaderParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HeaderParseError::MissingPrefix => write!(f, "missing ZCZC- prefix"),
            HeaderParseError::WrongFieldCount => write!(f, "unexpected number of '-' delimited fields"),
            HeaderParseError::EmptyLocationGroup => write!(f, "empty location/duration group"),
            HeaderParseError::Field(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for HeaderParseError {}

impl SameHeader {
    /// Parse a full header string, e.g.
    /// `ZCZC-EAS-RWT-039107+0030-0521800-KR8MER  -`.
    pub fn parse(text: &str) -> Result<Self, HeaderParseError> {
        let trimmed = text.strip_suffix('-').unwrap_or(text);
        let body = trimmed
            .strip_prefix("ZCZC-")
            .ok_or(HeaderParseError::MissingPrefix)?;

        let parts: Vec<&str> = body.split('-').collect();
        if parts.len() != 5 {
            return Err(HeaderParseError::WrongFieldCount);
        }

        let originator = Originator::parse(parts[0])?;
        let event_code = EventCode::parse(parts[1])?;

        let mut loc_and_duration: Vec<&str> = parts[2].split('+').collect();
        let ttt_str = loc_and_duration
            .pop()
            .ok_or(HeaderParseError::EmptyLocationGroup)?;
        if loc_and_duration.is_empty() {
            return Err(HeaderParseError::EmptyLocationGroup);
        }
        let purge_duration = PurgeDuration::parse(ttt_str)?;
        let locations = parse_location_list(&loc_and_duration.join("+"))?;

        let issuance = Issuance::parse(parts[3])?;
        let station_id = StationId::parse(parts[4])?;

        Ok(Self {
            originator,
            event_code,
            locations,
            purge_duration,
            issuance,
            station_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_location_header() {
        let header = SameHeader::parse("ZCZC-EAS-RWT-039107+0030-0521800-KR8MER  -").unwrap();
        assert_eq!(header.originator.as_str(), "EAS");
        assert_eq!(header.event_code.as_str(), "RWT");
        assert_eq!(header.locations.len(), 1);
        assert_eq!(header.locations[0].as_str(), "039107");
        assert_eq!(header.purge_duration.hours(), 0);
        assert_eq!(header.purge_duration.minutes(), 30);
        assert_eq!(header.station_id.as_str(), "KR8MER  ");
    }

    #[test]
    fn parses_multi_location_header_preserving_order() {
        let header =
            SameHeader::parse("ZCZC-WXR-TOR-039107+039127+039137+0030-0521800-KCLE/NWS-").unwrap();
        assert_eq!(header.locations.len(), 3);
        assert_eq!(header.locations[0].as_str(), "039107");
        assert_eq!(header.locations[1].as_str(), "039127");
        assert_eq!(header.locations[2].as_str(), "039137");
    }

    #[test]
    fn rejects_missing_prefix() {
        assert_eq!(
            SameHeader::parse("XCZC-EAS-RWT-039107+0030-0521800-KR8MER  -"),
            Err(HeaderParseError::MissingPrefix)
        );
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(
            SameHeader::parse("ZCZC-EAS-RWT-039107+0030-0521800-"),
            Err(HeaderParseError::WrongFieldCount)
        );
    }
}
