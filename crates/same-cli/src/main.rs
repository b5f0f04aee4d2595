//! SAME CLI - command-line interface for the SAME/EAS FSK decoder and encoder.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "same")]
#[command(author, version, about = "SAME/EAS FSK decoder and encoder CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a WAV file or live audio input
    Decode(commands::decode::DecodeArgs),

    /// Encode an activation to a WAV file
    Encode(commands::encode::EncodeArgs),

    /// List and inspect audio input devices
    Devices(commands::devices::DevicesArgs),

    /// Monitor multiple prioritized sources with failover
    Monitor(commands::monitor::MonitorArgs),

    /// Generate SAME test activations and calibration tones
    Generate(commands::generate::GenerateArgs),

    /// List known originators and event codes
    Events(commands::events::EventsArgs),

    /// Inspect, validate, or initialize pipeline configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    tracing::debug!(command = ?std::mem::discriminant(&cli.command), "dispatching command");

    match cli.command {
        Commands::Decode(args) => commands::decode::run(args),
        Commands::Encode(args) => commands::encode::run(args),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Monitor(args) => commands::monitor::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Events(args) => commands::events::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
