//! Activation encoding to WAV.

use std::path::PathBuf;

use chrono::{Datelike, Timelike, Utc};
use clap::Args;
use same_core::header_fields::{EventCode, Issuance, Originator, PurgeDuration, StationId, parse_location_list};
use same_encoder::{Activation, SameEncoder};
use same_io::wav::{read_wav_mono, write_wav_mono};

#[derive(Args)]
pub struct EncodeArgs {
    /// Output WAV file
    output: PathBuf,

    /// ORG originator code (EAS, CIV, WXR, PEP)
    #[arg(long, default_value = "EAS")]
    originator: String,

    /// EEE event code (e.g. RWT, TOR, SVR)
    #[arg(long)]
    event_code: String,

    /// One or more PSSCCC location codes, '+'-separated
    #[arg(long)]
    locations: String,

    /// TTTT purge duration (hours+minutes, e.g. 0030)
    #[arg(long, default_value = "0030")]
    purge_duration: String,

    /// JJJHHMM issuance timestamp; defaults to the current UTC time
    #[arg(long)]
    issuance: Option<String>,

    /// LLLLLLLL station identifier, padded to 8 characters
    #[arg(long)]
    station_id: String,

    /// Optional narration WAV file; must already be at --sample-rate
    #[arg(long)]
    narration: Option<PathBuf>,

    /// Duration of the two-tone attention signal, in seconds
    #[arg(long, default_value = "8.0")]
    attention_seconds: f32,

    /// Silence between bursts, in seconds (must be >= 1.0)
    #[arg(long, default_value = "1.0")]
    inter_burst_silence_sec: f32,

    /// Output sample rate
    #[arg(long, default_value = "22050")]
    sample_rate: u32,
}

pub fn run(args: EncodeArgs) -> anyhow::Result<()> {
    let originator = Originator::parse(&args.originator.to_uppercase())
        .map_err(|e| anyhow::anyhow!("invalid originator: {e}"))?;
    let event_code = EventCode::parse(&args.event_code.to_uppercase())
        .map_err(|e| anyhow::anyhow!("invalid event code: {e}"))?;
    let locations =
        parse_location_list(&args.locations).map_err(|e| anyhow::anyhow!("invalid location list: {e}"))?;
    let purge_duration =
        PurgeDuration::parse(&args.purge_duration).map_err(|e| anyhow::anyhow!("invalid purge duration: {e}"))?;

    let issuance = match &args.issuance {
        Some(s) => Issuance::parse(s).map_err(|e| anyhow::anyhow!("invalid issuance: {e}"))?,
        None => {
            let now = Utc::now();
            Issuance::new(now.ordinal() as u16, now.hour() as u8, now.minute() as u8)
        }
    };

    let station_id = StationId::from_name(&args.station_id.to_uppercase());

    let narration = match &args.narration {
        Some(path) => {
            let (samples, rate) = read_wav_mono(path)?;
            if rate != args.sample_rate {
                anyhow::bail!(
                    "narration file sample rate {rate} Hz does not match --sample-rate {}",
                    args.sample_rate
                );
            }
            Some(samples)
        }
        None => None,
    };

    let activation = Activation {
        originator,
        event_code,
        locations,
        purge_duration,
        issuance,
        station_id,
        narration,
        attention_seconds: args.attention_seconds,
        inter_burst_silence_sec: args.inter_burst_silence_sec,
        sample_rate: args.sample_rate,
    };

    let encoded = SameEncoder::new()
        .encode(&activation)
        .map_err(|e| anyhow::anyhow!("encode failed: {e}"))?;

    write_wav_mono(&args.output, &encoded.samples, encoded.sample_rate)?;

    println!(
        "Wrote {} samples ({:.2}s) to {}",
        encoded.samples.len(),
        encoded.samples.len() as f32 / encoded.sample_rate as f32,
        args.output.display()
    );
    println!("  Header bursts at: {:?}", encoded.header_burst_offsets);
    println!("  Attention signal at: {}", encoded.attention_offset);
    println!("  EOM bursts at: {}", encoded.eom_offset);

    Ok(())
}
