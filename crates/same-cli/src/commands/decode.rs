//! Decoding a WAV file or a live audio source into alert events.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Args, Subcommand};
use same_config::PipelineConfig;
use same_decoder::alert::{AlertEvent, AudioHandle, ParsedFields};
use same_decoder::dedup::{DedupCache, DedupKey};
use same_decoder::emit::{AlertEmitter, LogSink};
use same_decoder::stream::StreamingDecoder;
use same_decoder::validate::{HeaderTripletValidator, Outcome};
use same_io::adapter::soundcard::SoundCardAdapter;
use same_io::adapter::{ReadOutcome, SourceAdapter};
use same_io::wav::read_wav_mono;

const CHUNK_SAMPLES: usize = 4096;

/// One second of lead-in before the first preamble byte, expressed in
/// samples at the pipeline's configured rate.
fn lead_in_samples(sample_rate: u32) -> u64 {
    u64::from(sample_rate)
}

/// Half a second of trailing audio after the last EOM burst.
fn trail_out_samples(sample_rate: u32) -> u64 {
    u64::from(sample_rate) / 2
}

#[derive(Args)]
pub struct DecodeArgs {
    #[command(subcommand)]
    command: DecodeCommand,
}

#[derive(Subcommand)]
enum DecodeCommand {
    /// Decode a WAV file as fast as possible
    File {
        path: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Decode live audio from an input device until Ctrl+C
    Listen {
        #[arg(long)]
        input: Option<String>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn run(args: DecodeArgs) -> anyhow::Result<()> {
    match args.command {
        DecodeCommand::File { path, config } => decode_file(&path, config),
        DecodeCommand::Listen { input, config } => decode_listen(input, config),
    }
}

fn load_config(config: Option<PathBuf>) -> anyhow::Result<PipelineConfig> {
    match config {
        Some(path) => Ok(PipelineConfig::load(&path)?),
        None => Ok(PipelineConfig::default()),
    }
}

fn decode_file(path: &PathBuf, config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let (samples, sample_rate) = read_wav_mono(path)?;
    println!("Decoding {} ({} samples at {} Hz)", path.display(), samples.len(), sample_rate);

    let mut decoder = StreamingDecoder::new(sample_rate as f32)?;
    let mut validator = HeaderTripletValidator::new(config.clone());
    let mut dedup = DedupCache::new(Duration::from_secs_f32(config.dedup_window_sec));
    let mut emitter = AlertEmitter::new();
    emitter.register(Box::new(LogSink::new("decode-file")));

    let mut emitted = 0usize;
    let mut processed: u64 = 0;

    for chunk in samples.chunks(CHUNK_SAMPLES) {
        let now = Instant::now();
        for candidate in decoder.process_samples(chunk) {
            for outcome in validator.offer(candidate, now) {
                handle_outcome(
                    outcome,
                    "file",
                    processed + chunk.len() as u64,
                    &config,
                    &mut dedup,
                    &mut emitter,
                    &mut emitted,
                );
            }
        }
        processed += chunk.len() as u64;
    }

    let stats = decoder.snapshot_state();
    println!();
    println!("Decode summary:");
    println!("  samples processed:   {}", stats.samples_processed);
    println!("  preamble locks:      {}", stats.preamble_locks);
    println!("  headers emitted:     {}", stats.headers_emitted);
    println!("  eom emitted:         {}", stats.eom_emitted);
    println!("  aborted collections: {}", stats.aborted_collections);
    println!("  alerts emitted:      {emitted}");

    Ok(())
}

fn decode_listen(input: Option<String>, config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let mut adapter = SoundCardAdapter::new("listen", input.clone(), config.sample_rate);
    adapter.start().map_err(|e| anyhow::anyhow!("failed to start input device: {e}"))?;

    println!(
        "Listening on {} ({} Hz). Press Ctrl+C to stop...",
        input.as_deref().unwrap_or("default device"),
        config.sample_rate
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut decoder = StreamingDecoder::new(config.sample_rate as f32)?;
    let mut validator = HeaderTripletValidator::new(config.clone());
    let mut dedup = DedupCache::new(Duration::from_secs_f32(config.dedup_window_sec));
    let mut emitter = AlertEmitter::new();
    emitter.register(Box::new(LogSink::new("decode-listen")));

    let mut emitted = 0usize;
    let mut processed: u64 = 0;
    let mut last_sweep = Instant::now();

    while running.load(Ordering::SeqCst) {
        match adapter.read(CHUNK_SAMPLES) {
            ReadOutcome::Frame(frame) => {
                let now = Instant::now();
                processed += frame.samples.len() as u64;
                for candidate in decoder.process_samples(&frame.samples) {
                    for outcome in validator.offer(candidate, now) {
                        handle_outcome(outcome, "listen", processed, &config, &mut dedup, &mut emitter, &mut emitted);
                    }
                }
            }
            ReadOutcome::Underrun => std::thread::sleep(Duration::from_millis(20)),
            ReadOutcome::Eof => break,
        }

        if last_sweep.elapsed() >= Duration::from_secs(30) {
            for expired in emitter.sweep_expired_pins(Instant::now()) {
                println!("archive pin expired for '{}' ({}-{})", expired.source_name, expired.start_sample, expired.end_sample);
            }
            last_sweep = Instant::now();
        }
    }

    adapter.stop();
    println!("\nStopped. {emitted} alert(s) emitted.");
    Ok(())
}

/// Handles one validator outcome: applies the confidence floor and dedup
/// window, then emits surviving alerts through the sink fan-out. Shared with
/// [`crate::commands::monitor`].
pub(crate) fn handle_outcome(
    outcome: Outcome,
    source_name: &str,
    end_sample: u64,
    config: &PipelineConfig,
    dedup: &mut DedupCache,
    emitter: &mut AlertEmitter,
    emitted: &mut usize,
) {
    match outcome {
        Outcome::Header { header, header_text, confidence, byte_errors } => {
            if confidence < config.min_confidence_emit {
                println!("discarded (confidence {confidence:.2} below threshold): {header_text}");
                return;
            }
            let key = DedupKey::from_header(&header);
            let now = Instant::now();
            if dedup.should_suppress(&key, now) {
                println!("suppressed (duplicate): {header_text}");
                return;
            }
            dedup.record(key, now);

            let start_sample = end_sample.saturating_sub(trail_out_samples(config.sample_rate));
            let start_sample = start_sample.saturating_sub(lead_in_samples(config.sample_rate));

            let event = AlertEvent {
                header_text: header_text.clone(),
                parsed: ParsedFields::from_header(&header),
                confidence,
                detected_at_utc: chrono::Utc::now(),
                detected_at_monotonic_ns: 0,
                source_name: source_name.to_string(),
                audio_handle: AudioHandle {
                    source_name: source_name.to_string(),
                    start_sample,
                    end_sample,
                },
                byte_errors,
            };
            println!("ALERT [{:.0}% confidence, {byte_errors} byte errors]: {header_text}", confidence * 100.0);
            emitter.emit(&event);
            *emitted += 1;
        }
        Outcome::Eom => println!("end-of-message"),
        Outcome::Discarded { raw_text, reason } => {
            println!("discarded ({reason:?}): {raw_text}");
        }
    }
}
