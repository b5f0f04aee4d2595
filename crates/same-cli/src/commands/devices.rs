//! Audio input device listing.

use clap::{Args, Subcommand};
use same_io::{default_input_device, list_input_devices};

#[derive(Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    command: Option<DevicesCommand>,
}

#[derive(Subcommand)]
enum DevicesCommand {
    /// List all available input devices
    List,
    /// Show the platform's default input device
    Info,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    match args.command.unwrap_or(DevicesCommand::List) {
        DevicesCommand::List => {
            let devices = list_input_devices()?;
            if devices.is_empty() {
                println!("No input devices found.");
                return Ok(());
            }

            println!("Available Input Devices");
            println!("========================\n");
            for (idx, device) in devices.iter().enumerate() {
                println!("  [{}] {} ({} Hz)", idx, device.name, device.default_sample_rate);
            }
            println!();
            println!("Tip: pass a device name to 'same decode listen --input <name>'.");
        }
        DevicesCommand::Info => match default_input_device()? {
            Some(device) => {
                println!("Default Input Device");
                println!("=====================\n");
                println!("  Name: {}", device.name);
                println!("  Sample Rate: {} Hz", device.default_sample_rate);
            }
            None => println!("No default input device."),
        },
    }

    Ok(())
}
