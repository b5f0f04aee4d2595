//! Input device enumeration, used by the CLI's `devices` command.
//!
//! Input side only — this pipeline never writes audio out.

use cpal::traits::{DeviceTrait, HostTrait};

use crate::{Error, Result};

/// One enumerated input device.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Platform device name, usable as `SoundCardAdapter`'s `device_name`.
    pub name: String,
    /// Device's default input sample rate.
    pub default_sample_rate: u32,
}

/// List every input device the default host can see.
pub fn list_input_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();
    let inputs = host
        .input_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;
    for device in inputs {
        if let Ok(name) = device.name() {
            let sample_rate = device
                .default_input_config()
                .map(|c| c.sample_rate().0)
                .unwrap_or(48_000);
            devices.push(AudioDevice {
                name,
                default_sample_rate: sample_rate,
            });
        }
    }
    Ok(devices)
}

/// The platform's default input device, if any.
pub fn default_input_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_input_device().and_then(|d| {
        d.name().ok().map(|name| AudioDevice {
            name,
            default_sample_rate: d
                .default_input_config()
                .map(|c| c.sample_rate().0)
                .unwrap_or(48_000),
        })
    }))
}
