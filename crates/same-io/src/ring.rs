//! Fixed-capacity single-producer/single-consumer sample ring.
//!
//! Pushing past capacity overwrites the oldest unread samples rather than
//! blocking the producer; an overrun counter tracks how many samples were
//! dropped this way, matching the "under no circumstance is the decoder
//! blocked on the producer side" concurrency rule.

use std::sync::Mutex;

struct Inner {
    buf: Vec<f32>,
    capacity: usize,
    head: usize, // next write position
    len: usize,  // number of valid unread samples
    overrun_count: u64,
}

/// Mutex-guarded ring buffer: lock-free would save a little contention, but a
/// single coarse mutex is adequate since pushes/pops happen at audio-block
/// granularity, not per-sample.
pub struct RingBuffer {
    inner: Mutex<Inner>,
}

impl RingBuffer {
    /// Create a ring with room for `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                buf: vec![0.0; capacity],
                capacity,
                head: 0,
                len: 0,
                overrun_count: 0,
            }),
        }
    }

    /// Push samples, overwriting the oldest unread samples if `samples` does
    /// not fit. Returns the number of samples dropped this call.
    pub fn push(&self, samples: &[f32]) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let capacity = inner.capacity;
        let mut dropped = 0usize;

        if samples.len() >= capacity {
            // Entire existing content (and some of the new data) is stale.
            dropped += inner.len;
            dropped += samples.len() - capacity;
            let tail = &samples[samples.len() - capacity..];
            inner.buf.copy_from_slice(tail);
            inner.head = 0;
            inner.len = capacity;
            inner.overrun_count += dropped as u64;
            return dropped;
        }

        let free = capacity - inner.len;
        if samples.len() > free {
            dropped = samples.len() - free;
            inner.len -= dropped;
        }

        for &s in samples {
            let idx = (inner.head) % capacity;
            inner.buf[idx] = s;
            inner.head = (inner.head + 1) % capacity;
        }
        inner.len = (inner.len + samples.len()).min(capacity);
        inner.overrun_count += dropped as u64;
        dropped
    }

    /// Pop up to `max_samples` oldest unread samples.
    pub fn pop(&self, max_samples: usize) -> Vec<f32> {
        let mut inner = self.inner.lock().unwrap();
        let n = max_samples.min(inner.len);
        let capacity = inner.capacity;
        let start = (inner.head + capacity - inner.len) % capacity;

        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            out.push(inner.buf[(start + i) % capacity]);
        }
        inner.len -= n;
        out
    }

    /// Number of unread samples currently buffered.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len
    }

    /// Whether the ring currently holds no unread samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total capacity in samples.
    pub fn capacity(&self) -> usize {
        self.inner.lock().unwrap().capacity
    }

    /// Fill level as a fraction of capacity, in `[0.0, 1.0]`.
    pub fn fill_ratio(&self) -> f32 {
        let inner = self.inner.lock().unwrap();
        inner.len as f32 / inner.capacity as f32
    }

    /// Total samples dropped to overrun since construction.
    pub fn overrun_count(&self) -> u64 {
        self.inner.lock().unwrap().overrun_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_round_trips_under_capacity() {
        let ring = RingBuffer::new(16);
        ring.push(&[1.0, 2.0, 3.0]);
        assert_eq!(ring.len(), 3);
        let out = ring.pop(10);
        assert_eq!(out, vec![1.0, 2.0, 3.0]);
        assert!(ring.is_empty());
    }

    #[test]
    fn overflow_overwrites_oldest_and_counts_overrun() {
        let ring = RingBuffer::new(4);
        ring.push(&[1.0, 2.0, 3.0, 4.0]);
        ring.push(&[5.0, 6.0]);
        assert_eq!(ring.overrun_count(), 2);
        let out = ring.pop(10);
        assert_eq!(out, vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn push_larger_than_capacity_keeps_tail_only() {
        let ring = RingBuffer::new(3);
        ring.push(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(ring.pop(10), vec![3.0, 4.0, 5.0]);
        assert_eq!(ring.overrun_count(), 2);
    }

    #[test]
    fn fill_ratio_reflects_occupancy() {
        let ring = RingBuffer::new(10);
        ring.push(&[0.0; 5]);
        assert!((ring.fill_ratio() - 0.5).abs() < 1e-6);
    }
}
