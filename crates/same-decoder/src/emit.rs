//! Alert emission: fan-out to external sinks with bounded retry and
//! per-sink health tracking.
//!
//! A slow or failing sink never blocks another sink or the decode loop: each
//! sink gets its own retry budget, and a sink that exhausts it is demoted to
//! [`SinkHealth::Degraded`] rather than torn down, mirroring the way
//! [`same_io::manager::AudioSourceManager`] demotes a source instead of
//! dropping it outright.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::alert::{AlertEvent, AudioHandle};
use crate::archive::AudioArchive;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// A delivery failure from one attempt against one sink.
#[derive(Debug, Clone, thiserror::Error)]
#[error("sink delivery failed: {0}")]
pub struct SinkError(pub String);

/// Destination for validated alert events. Implementors should return
/// quickly; slow work belongs on the receiving end of a channel, not inside
/// `deliver`.
pub trait AlertSink: Send {
    /// Attempt one delivery of `event`.
    fn deliver(&self, event: &AlertEvent) -> Result<(), SinkError>;

    /// Human-readable name used in logs and [`SinkStatus`].
    fn name(&self) -> &str;
}

/// Current health of a registered sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkHealth {
    /// Deliveries are succeeding.
    Healthy,
    /// The sink exhausted its retry budget on the most recent event; still
    /// attempted on subsequent events.
    Degraded,
}

/// Snapshot of one registered sink's delivery health.
#[derive(Debug, Clone)]
pub struct SinkStatus {
    /// The sink's name.
    pub name: String,
    /// Current health.
    pub health: SinkHealth,
    /// Total delivery attempts across all events.
    pub attempts: u64,
    /// Total deliveries that exhausted retries and were dropped.
    pub dropped: u64,
}

struct Registered {
    sink: Box<dyn AlertSink>,
    health: SinkHealth,
    attempts: u64,
    dropped: u64,
}

/// Fans one validated [`AlertEvent`] out to every registered sink,
/// retrying each sink independently up to [`MAX_ATTEMPTS`] times with a
/// fixed delay between attempts.
pub struct AlertEmitter {
    sinks: Vec<Registered>,
    archive: AudioArchive,
}

impl Default for AlertEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertEmitter {
    /// Build an emitter with no sinks registered.
    pub fn new() -> Self {
        Self {
            sinks: Vec::new(),
            archive: AudioArchive::default(),
        }
    }

    /// Register a sink. Delivery order to multiple sinks follows
    /// registration order.
    pub fn register(&mut self, sink: Box<dyn AlertSink>) {
        self.sinks.push(Registered {
            sink,
            health: SinkHealth::Healthy,
            attempts: 0,
            dropped: 0,
        });
    }

    /// Deliver `event` to every registered sink, retrying failures.
    /// Never returns an error: a sink that keeps failing is demoted and
    /// skipped on future events' attempt budget reporting, but the method
    /// always completes.
    ///
    /// The event's audio range is pinned in the archive for the duration of
    /// delivery and released once every sink has accepted it; a range that
    /// a sink never manages to deliver stays pinned until
    /// [`Self::sweep_expired_pins`] times it out.
    pub fn emit(&mut self, event: &AlertEvent) {
        let pin_id = self.archive.pin(event.audio_handle.clone(), Instant::now());
        let mut all_delivered = true;

        for registered in &mut self.sinks {
            let mut delivered = false;
            for attempt in 1..=MAX_ATTEMPTS {
                registered.attempts += 1;
                match registered.sink.deliver(event) {
                    Ok(()) => {
                        delivered = true;
                        registered.health = SinkHealth::Healthy;
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(
                            sink = registered.sink.name(),
                            attempt,
                            error = %err,
                            "alert sink delivery attempt failed"
                        );
                        if attempt < MAX_ATTEMPTS {
                            thread::sleep(RETRY_DELAY);
                        }
                    }
                }
            }
            if !delivered {
                all_delivered = false;
                registered.health = SinkHealth::Degraded;
                registered.dropped += 1;
                tracing::error!(
                    sink = registered.sink.name(),
                    "alert sink exhausted retries, dropping event"
                );
            }
        }

        if all_delivered {
            self.archive.acknowledge(pin_id);
        }
    }

    /// Release audio pins older than the archive's timeout, logging each as
    /// a dropped range. Callers on a polling loop (e.g. `same-cli monitor`)
    /// should call this periodically.
    pub fn sweep_expired_pins(&mut self, now: Instant) -> Vec<AudioHandle> {
        let expired = self.archive.sweep_expired(now);
        for handle in &expired {
            tracing::warn!(
                source = handle.source_name,
                start = handle.start_sample,
                end = handle.end_sample,
                "audio archive pin expired unacknowledged"
            );
        }
        expired
    }

    /// Number of audio ranges currently pinned pending delivery.
    pub fn pending_archive_pins(&self) -> usize {
        self.archive.pending_count()
    }

    /// Snapshot every registered sink's health.
    pub fn status(&self) -> Vec<SinkStatus> {
        self.sinks
            .iter()
            .map(|r| SinkStatus {
                name: r.sink.name().to_string(),
                health: r.health,
                attempts: r.attempts,
                dropped: r.dropped,
            })
            .collect()
    }
}

/// Delivers alert events to an in-process channel, for callers that want to
/// drive their own consumption loop (CLI `monitor`, embedders).
pub struct ChannelSink {
    name: String,
    tx: Sender<AlertEvent>,
}

impl ChannelSink {
    /// Build a sink and its paired receiver.
    pub fn new(name: impl Into<String>) -> (Self, Receiver<AlertEvent>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                name: name.into(),
                tx,
            },
            rx,
        )
    }
}

impl AlertSink for ChannelSink {
    fn deliver(&self, event: &AlertEvent) -> Result<(), SinkError> {
        self.tx
            .send(event.clone())
            .map_err(|_| SinkError("receiver dropped".to_string()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Delivers alert events to the `tracing` log at `info` level. Never fails.
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Build a log sink with the given name, used only in its own log lines.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl AlertSink for LogSink {
    fn deliver(&self, event: &AlertEvent) -> Result<(), SinkError> {
        tracing::info!(
            sink = self.name,
            header = event.header_text,
            confidence = event.confidence,
            source = event.source_name,
            "alert"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
