//! Live monitoring across multiple prioritized audio sources with failover.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use same_config::PipelineConfig;
use same_decoder::dedup::DedupCache;
use same_decoder::emit::{AlertEmitter, LogSink};
use same_decoder::stream::StreamingDecoder;
use same_decoder::validate::HeaderTripletValidator;
use same_io::adapter::file::FileAdapter;
use same_io::adapter::sdr::SdrAdapter;
use same_io::adapter::soundcard::SoundCardAdapter;
use same_io::adapter::stream::StreamAdapter;
use same_io::AudioSourceManager;

use super::decode::handle_outcome;

const READ_CHUNK: usize = 4096;

#[derive(Args)]
pub struct MonitorArgs {
    /// Named WAV file source, `name=path`, repeatable. Earlier sources get
    /// higher priority (lower priority number).
    #[arg(long = "file", value_parser = parse_key_val)]
    files: Vec<(String, String)>,

    /// Named sound card input source, `name=device` (empty device for the
    /// platform default), repeatable.
    #[arg(long = "device", value_parser = parse_key_val)]
    devices: Vec<(String, String)>,

    /// Named network stream source, `name=url`, repeatable.
    #[arg(long = "stream", value_parser = parse_key_val)]
    streams: Vec<(String, String)>,

    /// Named SDR source, `name` only, repeatable (decoded at --sdr-squelch-dbfs).
    #[arg(long = "sdr")]
    sdrs: Vec<String>,

    /// Squelch threshold for SDR sources, in dBFS
    #[arg(long, default_value = "-40.0")]
    sdr_squelch_dbfs: f32,

    /// Optional pipeline configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// How often to print an active-source change, in seconds
    #[arg(long, default_value = "5.0")]
    status_interval: f32,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (k, v) = s.split_once('=').ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    Ok((k.to_string(), v.to_string()))
}

pub fn run(args: MonitorArgs) -> anyhow::Result<()> {
    if args.files.is_empty() && args.devices.is_empty() && args.streams.is_empty() && args.sdrs.is_empty() {
        anyhow::bail!(
            "no sources given; pass --file name=path, --device name=device, --stream name=url, and/or --sdr name"
        );
    }

    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    let manager = AudioSourceManager::new(
        config.sample_rate,
        config.ring_buffer_sec,
        config.silence_floor_dbfs,
        config.silence_window_sec,
        config.recovery_window_sec,
    );

    let mut priority: u8 = 0;
    for (name, path) in &args.files {
        let adapter = FileAdapter::new(name.clone(), PathBuf::from(path), true);
        manager.add_source(name.clone(), priority, Box::new(adapter))?;
        manager.start_source(name)?;
        println!("Registered file source '{name}' (priority {priority}): {path}");
        priority += 1;
    }
    for (name, device) in &args.devices {
        let device_name = if device.is_empty() { None } else { Some(device.clone()) };
        let adapter = SoundCardAdapter::new(name.clone(), device_name, config.sample_rate);
        manager.add_source(name.clone(), priority, Box::new(adapter))?;
        manager.start_source(name)?;
        let label = if device.is_empty() { "default" } else { device };
        println!("Registered device source '{name}' (priority {priority}): {label}");
        priority += 1;
    }
    for (name, url) in &args.streams {
        let adapter = StreamAdapter::new(name.clone(), url.clone(), config.sample_rate);
        manager.add_source(name.clone(), priority, Box::new(adapter))?;
        manager.start_source(name)?;
        println!("Registered stream source '{name}' (priority {priority}): {url}");
        priority += 1;
    }
    for name in &args.sdrs {
        let adapter = SdrAdapter::new(name.clone(), config.sample_rate, args.sdr_squelch_dbfs);
        manager.add_source(name.clone(), priority, Box::new(adapter))?;
        manager.start_source(name)?;
        println!("Registered SDR source '{name}' (priority {priority}, squelch {} dBFS)", args.sdr_squelch_dbfs);
        priority += 1;
    }

    println!("Press Ctrl+C to stop...\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut decoder = StreamingDecoder::new(config.sample_rate as f32)?;
    let mut validator = HeaderTripletValidator::new(config.clone());
    let mut dedup = DedupCache::new(Duration::from_secs_f32(config.dedup_window_sec));
    let mut emitter = AlertEmitter::new();
    emitter.register(Box::new(LogSink::new("monitor")));

    let mut emitted = 0usize;
    let mut processed: u64 = 0;
    let mut last_status = Instant::now();
    let status_interval = Duration::from_secs_f32(args.status_interval.max(0.1));
    let mut last_active: Option<String> = None;

    while running.load(Ordering::SeqCst) {
        let chunk = manager.read_ring(READ_CHUNK);
        if chunk.is_empty() {
            std::thread::sleep(Duration::from_millis(20));
        } else {
            let now = Instant::now();
            processed += chunk.len() as u64;
            let source = manager.get_active().unwrap_or_else(|| "unknown".to_string());
            for candidate in decoder.process_samples(&chunk) {
                for outcome in validator.offer(candidate, now) {
                    handle_outcome(outcome, &source, processed, &config, &mut dedup, &mut emitter, &mut emitted);
                }
            }
        }

        if last_status.elapsed() >= status_interval {
            let active = manager.get_active();
            if active != last_active {
                println!("active source: {}", active.as_deref().unwrap_or("none"));
                last_active = active;
            }
            for overrun in manager.take_overruns() {
                println!("overrun on '{}': {} samples dropped", overrun.source_name, overrun.dropped_samples);
            }
            for expired in emitter.sweep_expired_pins(Instant::now()) {
                println!("archive pin expired for '{}' ({}-{})", expired.source_name, expired.start_sample, expired.end_sample);
            }
            last_status = Instant::now();
        }
    }

    println!("\nStopped. {emitted} alert(s) emitted.");
    Ok(())
}
