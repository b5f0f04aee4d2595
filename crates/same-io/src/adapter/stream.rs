//! HTTP stream adapter: pulls a continuous audio stream (Icecast/SHOUTcast or
//! a plain HTTP container) and decodes it with symphonia. Recovers from
//! mid-stream errors by reopening the connection; the manager is responsible
//! for failing over to a lower-priority source while that happens.

use std::io::Read;
use std::sync::mpsc;
use std::thread::JoinHandle;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{
    AdapterError, AdapterMetrics, AdapterState, ReadOutcome, downmix_to_mono,
    resample_factor_within_budget, resample_to_target, to_dbfs,
};
use crate::pcm::PcmFrame;

enum WorkerMsg {
    Frame(Vec<f32>, u32),
    Error(String),
}

/// Wraps a blocking `reqwest::blocking::Response` body so symphonia can treat
/// an HTTP stream like any other seekless media source.
struct HttpMediaSource {
    response: reqwest::blocking::Response,
}

impl Read for HttpMediaSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.response.read(buf)
    }
}

impl symphonia::core::io::MediaSource for HttpMediaSource {
    fn is_seekable(&self) -> bool {
        false
    }
    fn byte_len(&self) -> Option<u64> {
        None
    }
}

fn decode_loop(
    url: String,
    target_sample_rate: u32,
    tx: mpsc::Sender<WorkerMsg>,
    stop: std::sync::Arc<std::sync::atomic::AtomicBool>,
) {
    use std::sync::atomic::Ordering;

    while !stop.load(Ordering::Relaxed) {
        let response = match reqwest::blocking::get(&url) {
            Ok(r) => r,
            Err(e) => {
                let _ = tx.send(WorkerMsg::Error(e.to_string()));
                std::thread::sleep(std::time::Duration::from_secs(1));
                continue;
            }
        };

        let source: Box<dyn MediaSource> = Box::new(HttpMediaSource { response });
        let mss = MediaSourceStream::new(source, Default::default());
        let mut hint = Hint::new();
        hint.with_extension("mp3");

        let probed = match symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        ) {
            Ok(p) => p,
            Err(e) => {
                let _ = tx.send(WorkerMsg::Error(e.to_string()));
                std::thread::sleep(std::time::Duration::from_secs(1));
                continue;
            }
        };

        let mut format = probed.format;
        let track = match format.default_track() {
            Some(t) => t.clone(),
            None => {
                let _ = tx.send(WorkerMsg::Error("stream has no audio track".into()));
                continue;
            }
        };

        let mut decoder = match symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
        {
            Ok(d) => d,
            Err(e) => {
                let _ = tx.send(WorkerMsg::Error(e.to_string()));
                continue;
            }
        };

        let channels = track
            .codec_params
            .channels
            .map(|c| c.count())
            .unwrap_or(1);
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
        if !resample_factor_within_budget(sample_rate, target_sample_rate) {
            let _ = tx.send(WorkerMsg::Error(format!(
                "resampler unavailable for {sample_rate} Hz -> {target_sample_rate} Hz"
            )));
            std::thread::sleep(std::time::Duration::from_secs(1));
            continue;
        }

        loop {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(_) => break, // reopen the connection
            };
            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buffer.copy_interleaved_ref(decoded);
                    let mono = downmix_to_mono(buffer.samples(), channels);
                    let resampled = resample_to_target(&mono, sample_rate, target_sample_rate);
                    if tx.send(WorkerMsg::Frame(resampled, target_sample_rate)).is_err() {
                        return;
                    }
                }
                Err(_) => continue,
            }
        }
    }
}

/// HTTP audio stream source, decoded on a dedicated worker thread.
pub struct StreamAdapter {
    name: String,
    url: String,
    target_sample_rate: u32,
    rx: Option<mpsc::Receiver<WorkerMsg>>,
    worker: Option<JoinHandle<()>>,
    stop: std::sync::Arc<std::sync::atomic::AtomicBool>,
    state: AdapterState,
    sequence: u64,
    last_sample_rate: u32,
    error_count: u32,
}

impl StreamAdapter {
    /// Build an adapter that decodes the audio stream served at `url`,
    /// resampling to `target_sample_rate` when the stream's own rate differs.
    pub fn new(name: impl Into<String>, url: impl Into<String>, target_sample_rate: u32) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            target_sample_rate,
            rx: None,
            worker: None,
            stop: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
            state: AdapterState::Configured,
            sequence: 0,
            last_sample_rate: 0,
            error_count: 0,
        }
    }
}

impl super::SourceAdapter for StreamAdapter {
    fn start(&mut self) -> Result<(), AdapterError> {
        let (tx, rx) = mpsc::channel();
        self.stop.store(false, std::sync::atomic::Ordering::Relaxed);
        let url = self.url.clone();
        let target_sample_rate = self.target_sample_rate;
        let stop = std::sync::Arc::clone(&self.stop);
        self.worker = Some(std::thread::spawn(move || {
            decode_loop(url, target_sample_rate, tx, stop)
        }));
        self.rx = Some(rx);
        self.state = AdapterState::Running;
        Ok(())
    }

    fn stop(&mut self) {
        self.stop.store(true, std::sync::atomic::Ordering::Relaxed);
        self.state = AdapterState::Stopped;
        self.rx = None;
    }

    fn read(&mut self, max_samples: usize) -> ReadOutcome {
        let Some(rx) = &self.rx else {
            return ReadOutcome::Underrun;
        };
        let mut collected = Vec::new();
        while collected.len() < max_samples {
            match rx.try_recv() {
                Ok(WorkerMsg::Frame(mut samples, rate)) => {
                    self.last_sample_rate = rate;
                    let room = max_samples - collected.len();
                    if samples.len() > room {
                        samples.truncate(room);
                    }
                    collected.extend(samples);
                }
                Ok(WorkerMsg::Error(msg)) => {
                    self.error_count += 1;
                    tracing::warn!(error = %msg, "stream adapter decode error, reconnecting");
                    self.state = AdapterState::Degraded;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return ReadOutcome::Eof,
            }
        }

        if collected.is_empty() {
            return ReadOutcome::Underrun;
        }
        if self.state == AdapterState::Degraded {
            self.state = AdapterState::Running;
        }
        self.sequence += 1;
        ReadOutcome::Frame(PcmFrame {
            samples: collected,
            sample_rate: self.last_sample_rate,
            captured_at_mono_ns: 0,
            sequence: self.sequence,
            source_name: self.name.clone(),
        })
    }

    fn metrics(&self) -> AdapterMetrics {
        AdapterMetrics {
            peak_dbfs: to_dbfs(0.0),
            rms_dbfs: to_dbfs(0.0),
            sample_rate: self.last_sample_rate,
            error_count: self.error_count,
        }
    }

    fn state(&self) -> AdapterState {
        self.state
    }
}

impl Drop for StreamAdapter {
    fn drop(&mut self) {
        self.stop.store(true, std::sync::atomic::Ordering::Relaxed);
    }
}
