//! Source adapters, ring buffering, and the audio source manager.
//!
//! - [`adapter`]: the [`adapter::SourceAdapter`] trait and its four
//!   implementations (sound card, file, network stream, SDR).
//! - [`ring`]: the fixed-capacity overwrite-oldest sample ring.
//! - [`pcm`]: the [`pcm::PcmFrame`] type passed between adapters and the
//!   manager.
//! - [`manager`]: [`manager::AudioSourceManager`], the priority/failover
//!   selection loop.
//! - [`devices`]: input device enumeration for the CLI's `devices` command.
//! - [`wav`]: WAV file helpers shared by the file adapter and the CLI.

pub mod adapter;
pub mod devices;
pub mod manager;
pub mod pcm;
pub mod ring;
pub mod wav;

pub use devices::{AudioDevice, default_input_device, list_input_devices};
pub use manager::{AudioSourceManager, ManagerError, OverrunEvent, SourceEntry, SourcePriority};
pub use pcm::PcmFrame;
pub use ring::RingBuffer;

/// Error type for I/O-layer operations outside the per-adapter health model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(String),

    /// Network stream setup or decode error.
    #[error("stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("no audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
