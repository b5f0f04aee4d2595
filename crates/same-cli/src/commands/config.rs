//! Pipeline configuration inspection and validation.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use same_config::PipelineConfig;
use same_config::validation::validate_config;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the default configuration as TOML
    Show,

    /// Load and validate a configuration file
    Validate {
        /// Path to the TOML configuration file
        path: PathBuf,
    },

    /// Write the default configuration to a file
    Init {
        /// Path to write the configuration to
        path: PathBuf,
    },
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            print!("{}", PipelineConfig::default().to_toml()?);
        }
        ConfigCommand::Validate { path } => {
            let config = PipelineConfig::load(&path)?;
            match validate_config(&config) {
                Ok(()) => println!("{} is valid.", path.display()),
                Err(e) => anyhow::bail!("{} failed validation: {e}", path.display()),
            }
        }
        ConfigCommand::Init { path } => {
            PipelineConfig::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}
