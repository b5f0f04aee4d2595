//! Event code table (`EEE`) — a registry of known three-character event
//! codes, extensible at runtime the same way the upstream audio-effect
//! registry this crate is descended from let callers register new entries
//! by name rather than hard-coding an exhaustive match.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Broad classification of an event code, used for alert routing/priority
/// decisions downstream of validation (not itself validated by this crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Immediate threat to life or property in progress.
    Warning,
    /// Conditions favorable for a warning-level event.
    Watch,
    /// Declared emergency with no immediate life-safety warning semantics.
    Emergency,
    /// Required weekly/monthly test transmissions.
    Test,
    /// Informational statement, advisory, or administrative message.
    Statement,
}

/// One entry in the event code table.
#[derive(Debug, Clone, Copy)]
pub struct EventDescriptor {
    /// Three-character wire code, e.g. `"TOR"`.
    pub code: &'static str,
    /// Human-readable name, e.g. `"Tornado Warning"`.
    pub name: &'static str,
    /// Coarse category for routing/priority.
    pub category: EventCategory,
}

/// Lookup table of known event codes.
///
/// Built with the codes from FCC §11.31's national table; callers with
/// region-specific or experimental codes can [`EventCodeTable::register`]
/// additional entries without forking this crate.
#[derive(Debug, Clone)]
pub struct EventCodeTable {
    entries: Vec<EventDescriptor>,
}

impl Default for EventCodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EventCodeTable {
    /// Build a table pre-populated with the standard national event codes.
    pub fn new() -> Self {
        let mut table = Self {
            entries: Vec::with_capacity(BUILTIN.len()),
        };
        for descriptor in BUILTIN {
            table.register(*descriptor);
        }
        table
    }

    /// Build an empty table with no built-in entries registered.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register (or override, if `code` already exists) an event code.
    pub fn register(&mut self, descriptor: EventDescriptor) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.code == descriptor.code) {
            *existing = descriptor;
        } else {
            self.entries.push(descriptor);
        }
    }

    /// Look up a code's descriptor.
    pub fn lookup(&self, code: &str) -> Option<&EventDescriptor> {
        self.entries.iter().find(|e| e.code == code)
    }

    /// Whether `code` is a known event code, i.e. present in a registered
    /// event-code table.
    pub fn contains(&self, code: &str) -> bool {
        self.lookup(code).is_some()
    }

    /// All registered descriptors, in registration order.
    pub fn all(&self) -> &[EventDescriptor] {
        &self.entries
    }
}

const BUILTIN: &[EventDescriptor] = &[
    // Tests and administrative
    EventDescriptor { code: "EAN", name: "Emergency Action Notification", category: EventCategory::Warning },
    EventDescriptor { code: "NPT", name: "National Periodic Test", category: EventCategory::Test },
    EventDescriptor { code: "RWT", name: "Required Weekly Test", category: EventCategory::Test },
    EventDescriptor { code: "RMT", name: "Required Monthly Test", category: EventCategory::Test },
    EventDescriptor { code: "DMO", name: "Practice/Demo Warning", category: EventCategory::Test },
    EventDescriptor { code: "ADR", name: "Administrative Message", category: EventCategory::Statement },
    // Weather warnings
    EventDescriptor { code: "TOR", name: "Tornado Warning", category: EventCategory::Warning },
    EventDescriptor { code: "SVR", name: "Severe Thunderstorm Warning", category: EventCategory::Warning },
    EventDescriptor { code: "FFW", name: "Flash Flood Warning", category: EventCategory::Warning },
    EventDescriptor { code: "FLW", name: "Flood Warning", category: EventCategory::Warning },
    EventDescriptor { code: "HUW", name: "Hurricane Warning", category: EventCategory::Warning },
    EventDescriptor { code: "TSW", name: "Tsunami Warning", category: EventCategory::Warning },
    EventDescriptor { code: "WSW", name: "Winter Storm Warning", category: EventCategory::Warning },
    EventDescriptor { code: "BZW", name: "Blizzard Warning", category: EventCategory::Warning },
    EventDescriptor { code: "EWW", name: "Extreme Wind Warning", category: EventCategory::Warning },
    EventDescriptor { code: "CFW", name: "Coastal Flood Warning", category: EventCategory::Warning },
    EventDescriptor { code: "DSW", name: "Dust Storm Warning", category: EventCategory::Warning },
    EventDescriptor { code: "FRW", name: "Fire Warning", category: EventCategory::Warning },
    EventDescriptor { code: "VOW", name: "Volcano Warning", category: EventCategory::Warning },
    // Weather watches
    EventDescriptor { code: "TOA", name: "Tornado Watch", category: EventCategory::Watch },
    EventDescriptor { code: "SVA", name: "Severe Thunderstorm Watch", category: EventCategory::Watch },
    EventDescriptor { code: "FFA", name: "Flash Flood Watch", category: EventCategory::Watch },
    EventDescriptor { code: "FLA", name: "Flood Watch", category: EventCategory::Watch },
    EventDescriptor { code: "HUA", name: "Hurricane Watch", category: EventCategory::Watch },
    EventDescriptor { code: "TSA", name: "Tsunami Watch", category: EventCategory::Watch },
    EventDescriptor { code: "WSA", name: "Winter Storm Watch", category: EventCategory::Watch },
    EventDescriptor { code: "BZA", name: "Blizzard Watch", category: EventCategory::Watch },
    // Non-weather emergencies
    EventDescriptor { code: "CAE", name: "Child Abduction Emergency", category: EventCategory::Emergency },
    EventDescriptor { code: "CDW", name: "Civil Danger Warning", category: EventCategory::Warning },
    EventDescriptor { code: "CEM", name: "Civil Emergency Message", category: EventCategory::Emergency },
    EventDescriptor { code: "EVI", name: "Evacuation Immediate", category: EventCategory::Warning },
    EventDescriptor { code: "SPW", name: "Shelter In Place Warning", category: EventCategory::Warning },
    EventDescriptor { code: "LEW", name: "Law Enforcement Warning", category: EventCategory::Warning },
    EventDescriptor { code: "NUW", name: "Nuclear Power Plant Warning", category: EventCategory::Warning },
    EventDescriptor { code: "RHW", name: "Radiological Hazard Warning", category: EventCategory::Warning },
    EventDescriptor { code: "HMW", name: "Hazardous Materials Warning", category: EventCategory::Warning },
    EventDescriptor { code: "BLU", name: "Blue Alert", category: EventCategory::Emergency },
    // Advisories / statements
    EventDescriptor { code: "FFS", name: "Flash Flood Statement", category: EventCategory::Statement },
    EventDescriptor { code: "SVS", name: "Severe Weather Statement", category: EventCategory::Statement },
    EventDescriptor { code: "HWA", name: "High Wind Watch", category: EventCategory::Watch },
    EventDescriptor { code: "HWW", name: "High Wind Warning", category: EventCategory::Warning },
];
