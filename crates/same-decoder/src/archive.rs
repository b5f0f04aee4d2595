//! Pinned audio-range registry.
//!
//! When an alert fires, the emitted [`AudioHandle`](crate::alert::AudioHandle)
//! names a byte range that an external sink still needs to read before its
//! backing storage can be reused. `AudioArchive` tracks which ranges are
//! still outstanding so a caller can hold off reuse until the range is
//! acknowledged or the pin times out, mirroring [`crate::dedup::DedupCache`]'s
//! `Instant`-windowed bookkeeping.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::alert::AudioHandle;

/// Default pin timeout: 5 minutes.
pub const DEFAULT_PIN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Opaque identifier for one pinned range, stable for the life of the pin.
pub type PinId = u64;

struct Pin {
    handle: AudioHandle,
    pinned_at: Instant,
}

/// Tracks audio ranges pinned pending external acknowledgment.
pub struct AudioArchive {
    timeout: Duration,
    next_id: PinId,
    pins: HashMap<PinId, Pin>,
}

impl AudioArchive {
    /// Build an archive with the given pin timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            next_id: 0,
            pins: HashMap::new(),
        }
    }

    /// Pin `handle`'s range, returning an id a caller can later acknowledge.
    pub fn pin(&mut self, handle: AudioHandle, now: Instant) -> PinId {
        let id = self.next_id;
        self.next_id += 1;
        self.pins.insert(id, Pin { handle, pinned_at: now });
        id
    }

    /// Release a pin once its range has been persisted. Returns `true` if
    /// the pin existed.
    pub fn acknowledge(&mut self, id: PinId) -> bool {
        self.pins.remove(&id).is_some()
    }

    /// Whether `id` is still outstanding.
    pub fn is_pinned(&self, id: PinId) -> bool {
        self.pins.contains_key(&id)
    }

    /// Number of pins currently outstanding.
    pub fn pending_count(&self) -> usize {
        self.pins.len()
    }

    /// Drop pins older than the configured timeout, returning the handles
    /// that expired unacknowledged.
    pub fn sweep_expired(&mut self, now: Instant) -> Vec<AudioHandle> {
        let timeout = self.timeout;
        let expired: Vec<PinId> = self
            .pins
            .iter()
            .filter(|(_, pin)| now.duration_since(pin.pinned_at) >= timeout)
            .map(|(&id, _)| id)
            .collect();
        expired
            .into_iter()
            .filter_map(|id| self.pins.remove(&id).map(|pin| pin.handle))
            .collect()
    }
}

impl Default for AudioArchive {
    fn default() -> Self {
        Self::new(DEFAULT_PIN_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(start: u64, end: u64) -> AudioHandle {
        AudioHandle {
            source_name: "primary".to_string(),
            start_sample: start,
            end_sample: end,
        }
    }

    #[test]
    fn acknowledged_pin_is_released_immediately() {
        let mut archive = AudioArchive::new(Duration::from_secs(300));
        let now = Instant::now();
        let id = archive.pin(handle(0, 100), now);
        assert!(archive.is_pinned(id));
        assert!(archive.acknowledge(id));
        assert!(!archive.is_pinned(id));
        assert_eq!(archive.pending_count(), 0);
    }

    #[test]
    fn unacknowledged_pin_survives_until_timeout() {
        let mut archive = AudioArchive::new(Duration::from_secs(300));
        let now = Instant::now();
        let id = archive.pin(handle(0, 100), now);

        let before_timeout = now + Duration::from_secs(299);
        assert!(archive.sweep_expired(before_timeout).is_empty());
        assert!(archive.is_pinned(id));

        let after_timeout = now + Duration::from_secs(300);
        let expired = archive.sweep_expired(after_timeout);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].start_sample, 0);
        assert!(!archive.is_pinned(id));
    }

    #[test]
    fn acknowledging_an_unknown_id_is_a_no_op() {
        let mut archive = AudioArchive::default();
        assert!(!archive.acknowledge(42));
    }

    #[test]
    fn sweep_only_drops_expired_pins() {
        let mut archive = AudioArchive::new(Duration::from_secs(10));
        let now = Instant::now();
        let old = archive.pin(handle(0, 10), now);
        let fresh = archive.pin(handle(10, 20), now + Duration::from_secs(5));

        let expired = archive.sweep_expired(now + Duration::from_secs(11));
        assert_eq!(expired.len(), 1);
        assert!(!archive.is_pinned(old));
        assert!(archive.is_pinned(fresh));
    }
}
