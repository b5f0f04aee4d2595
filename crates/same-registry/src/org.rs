//! Originator codes (`ORG`), a closed set defined by FCC §11.31.

/// The four originator codes a SAME header's `ORG` field may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Organization {
    /// Broadcast station or cable system, acting under EAS rules.
    Eas,
    /// Civil authorities (state/local government).
    Civ,
    /// National Weather Service.
    Wxr,
    /// Primary Entry Point station, FEMA's national-level origination.
    Pep,
}

impl Organization {
    /// Three-character wire code as it appears in the header.
    pub const fn code(&self) -> &'static str {
        match self {
            Organization::Eas => "EAS",
            Organization::Civ => "CIV",
            Organization::Wxr => "WXR",
            Organization::Pep => "PEP",
        }
    }

    /// Human-readable name for logging and display.
    pub const fn name(&self) -> &'static str {
        match self {
            Organization::Eas => "Broadcast station/cable system",
            Organization::Civ => "Civil authorities",
            Organization::Wxr => "National Weather Service",
            Organization::Pep => "Primary Entry Point station",
        }
    }

    /// Parse a 3-character originator code, rejecting anything outside the
    /// allow-list enforcing "ORG in {EAS, CIV, WXR, PEP}".
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "EAS" => Some(Organization::Eas),
            "CIV" => Some(Organization::Civ),
            "WXR" => Some(Organization::Wxr),
            "PEP" => Some(Organization::Pep),
            _ => None,
        }
    }
}
