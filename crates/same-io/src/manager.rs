//! Audio source manager: priority-ordered selection with hysteretic failover
//! and backpressure via a ring buffer.
//!
//! A dedicated thread ticks at most every 100 ms, polling every started
//! source, updating its
//! health, and choosing which one feeds the ring buffer and subscribers.
//! Lower `priority` values win ties; a higher-priority source must be
//! continuously healthy for `recovery_window_sec` before the manager switches
//! back to it, so a flapping source cannot thrash the active selection.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::adapter::{AdapterState, ReadOutcome, SourceAdapter, to_dbfs};
use crate::pcm::PcmFrame;
use crate::ring::RingBuffer;

const TICK_INTERVAL: Duration = Duration::from_millis(100);
const READ_CHUNK: usize = 4096;

/// Errors raised by [`AudioSourceManager`]'s registry operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ManagerError {
    /// A source with this name is already registered.
    #[error("source '{0}' already registered")]
    DuplicateName(String),
    /// No source with this name is registered.
    #[error("unknown source '{0}'")]
    UnknownName(String),
    /// The supplied configuration was rejected.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
    /// A required resampler from the source's native rate to the pipeline
    /// rate is unavailable: the source refuses to start rather than deliver
    /// corrupted samples.
    #[error("resampler unavailable for {from_hz} Hz -> {to_hz} Hz")]
    ResamplerUnavailable {
        /// Source's native sample rate.
        from_hz: u32,
        /// Pipeline's configured target sample rate.
        to_hz: u32,
    },
}

/// Snapshot of one registered source, returned by [`AudioSourceManager::list_sources`].
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// Unique source name.
    pub name: String,
    /// Selection priority; lower wins.
    pub priority: u8,
    /// Current adapter lifecycle state.
    pub state: AdapterState,
    /// Whether the selection loop currently treats this as silent.
    pub is_silent: bool,
}

/// A dedicated selection priority tier. Lower values are preferred.
pub type SourcePriority = u8;

/// Emitted when the ring buffer drops samples because the decoder fell
/// behind the active source.
#[derive(Debug, Clone)]
pub struct OverrunEvent {
    /// Source that was active when the overrun occurred.
    pub source_name: String,
    /// Samples dropped in this event.
    pub dropped_samples: u64,
}

struct Registered {
    name: String,
    priority: u8,
    adapter: Box<dyn SourceAdapter>,
    started: bool,
    silence_since: Option<Instant>,
    healthy_since: Option<Instant>,
    pending: VecDeque<f32>,
}

struct Shared {
    sources: Vec<Registered>,
    active: Option<String>,
    subscribers: Vec<Sender<PcmFrame>>,
    overruns: Vec<OverrunEvent>,
}

/// Owns the registered sources, runs the selection tick thread, and exposes
/// the ring buffer the decoder reads from.
pub struct AudioSourceManager {
    shared: Arc<Mutex<Shared>>,
    ring: Arc<RingBuffer>,
    sample_rate: u32,
    silence_floor_dbfs: f32,
    silence_window: Duration,
    recovery_window: Duration,
    stop: Arc<AtomicBool>,
    tick_thread: Option<JoinHandle<()>>,
}

impl AudioSourceManager {
    /// Build a manager and immediately start its selection tick thread.
    ///
    /// `ring_buffer_sec` sizes the backpressure ring in seconds of audio at
    /// `sample_rate`.
    pub fn new(
        sample_rate: u32,
        ring_buffer_sec: f32,
        silence_floor_dbfs: f32,
        silence_window_sec: f32,
        recovery_window_sec: f32,
    ) -> Self {
        let ring = Arc::new(RingBuffer::new(
            (ring_buffer_sec * sample_rate as f32).max(1.0) as usize,
        ));
        let shared = Arc::new(Mutex::new(Shared {
            sources: Vec::new(),
            active: None,
            subscribers: Vec::new(),
            overruns: Vec::new(),
        }));
        let stop = Arc::new(AtomicBool::new(false));

        let tick_thread = {
            let shared = Arc::clone(&shared);
            let ring = Arc::clone(&ring);
            let stop = Arc::clone(&stop);
            let silence_window = Duration::from_secs_f32(silence_window_sec.max(0.0));
            let recovery_window = Duration::from_secs_f32(recovery_window_sec.max(0.0));
            std::thread::spawn(move || {
                tick_loop(shared, ring, stop, silence_floor_dbfs, silence_window, recovery_window)
            })
        };

        Self {
            shared,
            ring,
            sample_rate,
            silence_floor_dbfs,
            silence_window: Duration::from_secs_f32(silence_window_sec.max(0.0)),
            recovery_window: Duration::from_secs_f32(recovery_window_sec.max(0.0)),
            stop,
            tick_thread: Some(tick_thread),
        }
    }

    /// Register a new source. Does not start it.
    pub fn add_source(
        &self,
        name: impl Into<String>,
        priority: SourcePriority,
        adapter: Box<dyn SourceAdapter>,
    ) -> Result<(), ManagerError> {
        let name = name.into();
        let mut shared = self.shared.lock().unwrap();
        if shared.sources.iter().any(|s| s.name == name) {
            return Err(ManagerError::DuplicateName(name));
        }
        shared.sources.push(Registered {
            name,
            priority,
            adapter,
            started: false,
            silence_since: None,
            healthy_since: None,
            pending: VecDeque::new(),
        });
        Ok(())
    }

    /// Deregister a source, stopping it first if running.
    pub fn remove_source(&self, name: &str) -> Result<(), ManagerError> {
        let mut shared = self.shared.lock().unwrap();
        let idx = shared
            .sources
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| ManagerError::UnknownName(name.to_string()))?;
        shared.sources[idx].adapter.stop();
        shared.sources.remove(idx);
        if shared.active.as_deref() == Some(name) {
            shared.active = None;
        }
        Ok(())
    }

    /// Start a registered source so the selection loop begins polling it.
    pub fn start_source(&self, name: &str) -> Result<(), ManagerError> {
        let mut shared = self.shared.lock().unwrap();
        let source = shared
            .sources
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| ManagerError::UnknownName(name.to_string()))?;
        source
            .adapter
            .start()
            .map_err(|e| ManagerError::ConfigInvalid(e.to_string()))?;
        source.started = true;
        Ok(())
    }

    /// Stop a registered source; it stays registered but idle.
    pub fn stop_source(&self, name: &str) -> Result<(), ManagerError> {
        let mut shared = self.shared.lock().unwrap();
        let source = shared
            .sources
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| ManagerError::UnknownName(name.to_string()))?;
        source.adapter.stop();
        source.started = false;
        if shared.active.as_deref() == Some(name) {
            shared.active = None;
        }
        Ok(())
    }

    /// Snapshot of every registered source's current state.
    pub fn list_sources(&self) -> Vec<SourceEntry> {
        let shared = self.shared.lock().unwrap();
        shared
            .sources
            .iter()
            .map(|s| SourceEntry {
                name: s.name.clone(),
                priority: s.priority,
                state: s.adapter.state(),
                is_silent: s.silence_since.is_some(),
            })
            .collect()
    }

    /// Name of the source currently feeding the ring buffer, if any.
    pub fn get_active(&self) -> Option<String> {
        self.shared.lock().unwrap().active.clone()
    }

    /// Subscribe to a live copy of every frame the manager selects as active.
    pub fn subscribe(&self) -> Receiver<PcmFrame> {
        let (tx, rx) = mpsc::channel();
        self.shared.lock().unwrap().subscribers.push(tx);
        rx
    }

    /// Drain accumulated overrun events.
    pub fn take_overruns(&self) -> Vec<OverrunEvent> {
        std::mem::take(&mut self.shared.lock().unwrap().overruns)
    }

    /// Pull up to `max_samples` decoded samples from the backpressure ring.
    pub fn read_ring(&self, max_samples: usize) -> Vec<f32> {
        self.ring.pop(max_samples)
    }

    /// The manager's configured pipeline sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Configured silence floor, in dBFS.
    pub fn silence_floor_dbfs(&self) -> f32 {
        self.silence_floor_dbfs
    }

    /// Configured silence window.
    pub fn silence_window(&self) -> Duration {
        self.silence_window
    }

    /// Configured recovery window.
    pub fn recovery_window(&self) -> Duration {
        self.recovery_window
    }
}

impl Drop for AudioSourceManager {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.tick_thread.take() {
            let _ = handle.join();
        }
    }
}

fn tick_loop(
    shared: Arc<Mutex<Shared>>,
    ring: Arc<RingBuffer>,
    stop: Arc<AtomicBool>,
    silence_floor_dbfs: f32,
    silence_window: Duration,
    recovery_window: Duration,
) {
    while !stop.load(Ordering::Relaxed) {
        let tick_start = Instant::now();
        {
            let mut shared = shared.lock().unwrap();
            let now = Instant::now();

            for source in shared.sources.iter_mut().filter(|s| s.started) {
                match source.adapter.read(READ_CHUNK) {
                    ReadOutcome::Frame(frame) => {
                        let rms_dbfs = to_dbfs(frame.rms());
                        if rms_dbfs < silence_floor_dbfs {
                            source.silence_since.get_or_insert(now);
                            source.healthy_since = None;
                        } else {
                            source.silence_since = None;
                            source.healthy_since.get_or_insert(now);
                        }
                        source.pending.extend(frame.samples);
                    }
                    ReadOutcome::Underrun => {
                        source.silence_since.get_or_insert(now);
                        source.healthy_since = None;
                    }
                    ReadOutcome::Eof => {
                        source.started = false;
                        source.silence_since.get_or_insert(now);
                        source.healthy_since = None;
                    }
                }
            }

            let healthy_candidates: Vec<(String, u8)> = shared
                .sources
                .iter()
                .filter(|s| s.started)
                .filter(|s| matches!(s.adapter.state(), AdapterState::Running | AdapterState::Degraded))
                .filter(|s| {
                    s.silence_since
                        .is_none_or(|since| now.duration_since(since) < silence_window)
                })
                .map(|s| (s.name.clone(), s.priority))
                .collect();

            let best = healthy_candidates.iter().min_by_key(|(_, p)| *p).cloned();

            let current = shared.active.clone();
            let new_active = match (&current, &best) {
                (None, Some((name, _))) => Some(name.clone()),
                (Some(cur), Some((name, _))) if cur == name => Some(cur.clone()),
                (Some(cur), Some((name, _))) => {
                    let cur_still_healthy = shared
                        .sources
                        .iter()
                        .find(|s| &s.name == cur)
                        .is_some_and(|s| {
                            s.started
                                && matches!(s.adapter.state(), AdapterState::Running | AdapterState::Degraded)
                                && s.silence_since.is_none()
                        });
                    if cur_still_healthy {
                        Some(cur.clone())
                    } else {
                        let candidate_healthy_long_enough = shared
                            .sources
                            .iter()
                            .find(|s| &s.name == name)
                            .and_then(|s| s.healthy_since)
                            .is_some_and(|since| now.duration_since(since) >= recovery_window);
                        if candidate_healthy_long_enough || shared.active.is_none() {
                            Some(name.clone())
                        } else {
                            current.clone()
                        }
                    }
                }
                (Some(_), None) => None,
                (None, None) => None,
            };
            shared.active = new_active.clone();

            if let Some(active_name) = new_active {
                if let Some(source) = shared.sources.iter_mut().find(|s| s.name == active_name) {
                    if !source.pending.is_empty() {
                        let samples: Vec<f32> = source.pending.drain(..).collect();
                        let dropped = ring.push(&samples);
                        if dropped > 0 {
                            shared.overruns.push(OverrunEvent {
                                source_name: active_name.clone(),
                                dropped_samples: dropped as u64,
                            });
                        }
                        let frame = PcmFrame {
                            samples,
                            sample_rate: source.adapter.metrics().sample_rate,
                            captured_at_mono_ns: 0,
                            sequence: 0,
                            source_name: active_name.clone(),
                        };
                        shared.subscribers.retain(|tx| tx.send(frame.clone()).is_ok());
                    }
                }
            }

            // Drain (discard) pending buffers of inactive sources so they
            // don't grow unbounded while not selected.
            for source in shared.sources.iter_mut() {
                if shared.active.as_deref() != Some(source.name.as_str()) {
                    source.pending.clear();
                }
            }
        }

        let elapsed = tick_start.elapsed();
        if elapsed < TICK_INTERVAL {
            std::thread::sleep(TICK_INTERVAL - elapsed);
        }
    }
}
