//! SAME test-signal generation: quick preset activations and calibration tones.

use std::path::PathBuf;

use chrono::{Datelike, Timelike};
use clap::{Args, Subcommand, ValueEnum};
use same_core::constants::{ATTENTION_TONE_HZ, MARK_FREQ_HZ, SPACE_FREQ_HZ};
use same_core::header_fields::{EventCode, Issuance, Originator, PurgeDuration, StationId, parse_location_list};
use same_core::tone::PhaseAccumulator;
use same_encoder::{Activation, SameEncoder};
use same_io::wav::write_wav_mono;

#[derive(Args)]
pub struct GenerateArgs {
    #[command(subcommand)]
    command: GenerateCommand,
}

/// Calibration tone selection.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CalibrationTone {
    Mark,
    Space,
    Attention,
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Generate a quick required weekly test activation
    Rwt {
        /// Output WAV file
        output: PathBuf,
        /// PSSCCC location code
        #[arg(long, default_value = "039107")]
        location: String,
        /// Station identifier
        #[arg(long, default_value = "KR8MER")]
        station_id: String,
        /// Sample rate
        #[arg(long, default_value = "22050")]
        sample_rate: u32,
    },

    /// Generate a raw calibration tone (mark, space, or the two-tone attention signal)
    Tone {
        /// Output WAV file
        output: PathBuf,
        /// Which tone to generate
        #[arg(long, value_enum, default_value = "mark")]
        tone: CalibrationTone,
        /// Duration in seconds
        #[arg(long, default_value = "2.0")]
        duration: f32,
        /// Sample rate
        #[arg(long, default_value = "22050")]
        sample_rate: u32,
    },

    /// Generate silence, useful for exercising source failover
    Silence {
        /// Output WAV file
        output: PathBuf,
        /// Duration in seconds
        #[arg(long, default_value = "5.0")]
        duration: f32,
        /// Sample rate
        #[arg(long, default_value = "22050")]
        sample_rate: u32,
    },
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    match args.command {
        GenerateCommand::Rwt { output, location, station_id, sample_rate } => {
            let locations = parse_location_list(&location).map_err(|e| anyhow::anyhow!("invalid location: {e}"))?;
            let now = chrono::Utc::now();
            let activation = Activation {
                originator: Originator::parse("EAS").unwrap(),
                event_code: EventCode::parse("RWT").unwrap(),
                locations,
                purge_duration: PurgeDuration::parse("0030").unwrap(),
                issuance: Issuance::new(now.ordinal() as u16, now.hour() as u8, now.minute() as u8),
                station_id: StationId::from_name(&station_id.to_uppercase()),
                narration: None,
                attention_seconds: 8.0,
                inter_burst_silence_sec: 1.0,
                sample_rate,
            };
            let encoded = SameEncoder::new().encode(&activation).map_err(|e| anyhow::anyhow!("encode failed: {e}"))?;
            write_wav_mono(&output, &encoded.samples, encoded.sample_rate)?;
            println!(
                "Wrote a {:.1}s required weekly test activation to {}",
                encoded.samples.len() as f32 / sample_rate as f32,
                output.display()
            );
        }

        GenerateCommand::Tone { output, tone, duration, sample_rate } => {
            let n = (duration.max(0.0) * sample_rate as f32) as usize;
            let samples: Vec<f32> = match tone {
                CalibrationTone::Mark => {
                    let mut osc = PhaseAccumulator::new(sample_rate as f32, MARK_FREQ_HZ);
                    (0..n).map(|_| osc.advance()).collect()
                }
                CalibrationTone::Space => {
                    let mut osc = PhaseAccumulator::new(sample_rate as f32, SPACE_FREQ_HZ);
                    (0..n).map(|_| osc.advance()).collect()
                }
                CalibrationTone::Attention => {
                    let mut low = PhaseAccumulator::new(sample_rate as f32, ATTENTION_TONE_HZ.0);
                    let mut high = PhaseAccumulator::new(sample_rate as f32, ATTENTION_TONE_HZ.1);
                    (0..n).map(|_| (low.advance() + high.advance()) * 0.5).collect()
                }
            };
            write_wav_mono(&output, &samples, sample_rate)?;
            println!("Wrote {} samples to {}", samples.len(), output.display());
        }

        GenerateCommand::Silence { output, duration, sample_rate } => {
            let n = (duration.max(0.0) * sample_rate as f32) as usize;
            let samples = vec![0.0f32; n];
            write_wav_mono(&output, &samples, sample_rate)?;
            println!("Wrote {} samples of silence to {}", samples.len(), output.display());
        }
    }

    Ok(())
}
