//! Bit-to-byte framing and preamble lock.
//!
//! Recovered bits arrive LSB-first from [`same_core::BitSync`]; this module
//! shifts them into an 8-bit register and watches for the double-`0xAB`
//! preamble that every SAME burst leads with.

use same_core::constants::{PREAMBLE_BYTE, PREAMBLE_BYTE_COUNT};

/// How many recovered bits may separate two consecutive `0xAB` bytes and
/// still count as "the second consecutive preamble byte".
const PREAMBLE_LOCK_BIT_TOLERANCE: u32 = 10;

/// Output of feeding one recovered bit into the framer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingEvent {
    /// The second consecutive `0xAB` was just seen; the framer has declared
    /// preamble lock and will silently flush the remaining preamble bytes.
    PreambleLock,
    /// One post-preamble data byte completed.
    Byte(u8),
}

/// Shifts recovered bits into bytes and tracks preamble lock.
#[derive(Debug, Clone)]
pub struct ByteFramer {
    register: u8,
    bit_count: u8,
    locked: bool,
    preamble_seen: bool,
    bits_since_last_ab: u32,
    preamble_bytes_remaining: usize,
}

impl ByteFramer {
    /// Build a framer in the unlocked (preamble-searching) state.
    pub fn new() -> Self {
        Self {
            register: 0,
            bit_count: 0,
            locked: false,
            preamble_seen: false,
            bits_since_last_ab: 0,
            preamble_bytes_remaining: 0,
        }
    }

    /// Feed one recovered bit (`true` = mark/1, LSB-first).
    pub fn push_bit(&mut self, bit: bool) -> Option<FramingEvent> {
        self.register = (self.register >> 1) | (u8::from(bit) << 7);
        self.bit_count += 1;
        self.bits_since_last_ab += 1;
        if self.bit_count < 8 {
            return None;
        }
        self.bit_count = 0;
        let byte = self.register;

        if !self.locked {
            return self.on_preamble_byte(byte);
        }

        if self.preamble_bytes_remaining > 0 {
            self.preamble_bytes_remaining -= 1;
            return None;
        }
        Some(FramingEvent::Byte(byte))
    }

    fn on_preamble_byte(&mut self, byte: u8) -> Option<FramingEvent> {
        if byte != PREAMBLE_BYTE {
            self.preamble_seen = false;
            return None;
        }
        if self.preamble_seen && self.bits_since_last_ab <= PREAMBLE_LOCK_BIT_TOLERANCE {
            self.locked = true;
            self.preamble_seen = false;
            // Two 0xAB bytes already consumed; flush the rest of the target.
            self.preamble_bytes_remaining = PREAMBLE_BYTE_COUNT.saturating_sub(2);
            return Some(FramingEvent::PreambleLock);
        }
        self.preamble_seen = true;
        self.bits_since_last_ab = 0;
        None
    }

    /// Return to the unlocked, preamble-searching state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether the framer has declared preamble lock and is emitting bytes.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Default for ByteFramer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_byte(framer: &mut ByteFramer, byte: u8) -> Option<FramingEvent> {
        let mut last = None;
        for i in 0..8 {
            let bit = (byte >> i) & 1 == 1;
            if let Some(event) = framer.push_bit(bit) {
                last = Some(event);
            }
        }
        last
    }

    #[test]
    fn locks_on_second_consecutive_preamble_byte() {
        let mut framer = ByteFramer::new();
        assert_eq!(push_byte(&mut framer, PREAMBLE_BYTE), None);
        assert_eq!(
            push_byte(&mut framer, PREAMBLE_BYTE),
            Some(FramingEvent::PreambleLock)
        );
        assert!(framer.is_locked());
    }

    #[test]
    fn flushes_remaining_preamble_then_emits_bytes() {
        let mut framer = ByteFramer::new();
        push_byte(&mut framer, PREAMBLE_BYTE);
        push_byte(&mut framer, PREAMBLE_BYTE);
        for _ in 0..(PREAMBLE_BYTE_COUNT - 2) {
            assert_eq!(push_byte(&mut framer, PREAMBLE_BYTE), None);
        }
        assert_eq!(
            push_byte(&mut framer, b'Z'),
            Some(FramingEvent::Byte(b'Z'))
        );
    }

    #[test]
    fn non_preamble_bytes_reset_the_search() {
        let mut framer = ByteFramer::new();
        push_byte(&mut framer, PREAMBLE_BYTE);
        push_byte(&mut framer, b'X');
        // The single earlier 0xAB doesn't count once a non-preamble byte
        // interrupts the run.
        assert_eq!(push_byte(&mut framer, PREAMBLE_BYTE), None);
    }

    #[test]
    fn reset_returns_to_unlocked_state() {
        let mut framer = ByteFramer::new();
        push_byte(&mut framer, PREAMBLE_BYTE);
        push_byte(&mut framer, PREAMBLE_BYTE);
        assert!(framer.is_locked());
        framer.reset();
        assert!(!framer.is_locked());
    }
}
