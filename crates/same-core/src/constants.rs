//! Numeric constants mandated by FCC §11.31 for SAME/EAS FSK signaling.
//!
//! All three defining quantities are exact rationals, not decimal
//! approximations: the baud rate is `520 + 5/6` symbols/sec, the mark tone is
//! `2083 + 1/3` Hz, and the space tone is `1562 + 1/2` Hz. They are expressed
//! here as `f64` so that symbol-length and phase-increment arithmetic carries
//! enough precision to satisfy the conformance tolerance in the encoder
//! (< 1e-6 relative error at every supported sample rate); callers narrow to
//! `f32` only once a value is about to become an audio sample.

/// Mark tone (logical 1) frequency in Hz: exactly 2083 + 1/3.
pub const MARK_FREQ_HZ: f64 = 2083.0 + 1.0 / 3.0;

/// Space tone (logical 0) frequency in Hz: exactly 1562 + 1/2.
pub const SPACE_FREQ_HZ: f64 = 1562.5;

/// SAME baud rate in symbols/second: exactly 520 + 5/6.
pub const BIT_RATE: f64 = 520.0 + 5.0 / 6.0;

/// Symbol period in seconds: exactly 96/50000 = 1.92ms.
///
/// `1.0 / BIT_RATE` and `96.0 / 50000.0` are mathematically identical; the
/// explicit fraction is kept as the protocol's own phrasing of the
/// constant, used by conformance tests as the reference value.
pub const SYMBOL_PERIOD_SEC: f64 = 96.0 / 50_000.0;

/// Preamble byte value repeated 16 times before every SAME burst.
pub const PREAMBLE_BYTE: u8 = 0xAB;

/// Number of preamble bytes required to fully flush after lock.
pub const PREAMBLE_BYTE_COUNT: usize = 16;

/// Exact end-of-message marker text.
pub const EOM_MARKER: &str = "NNNN";

/// Maximum total header length in characters, including the terminating `-`.
pub const MAX_HEADER_LEN: usize = 268;

/// Header bursts (and EOM bursts) are transmitted this many times.
pub const BURST_REPETITIONS: usize = 3;

/// Minimum silence required between consecutive bursts, in seconds.
pub const MIN_INTER_BURST_SILENCE_SEC: f32 = 1.0;

/// Peak amplitude ceiling for encoder output (-1 dBFS headroom).
pub const MAX_PEAK_AMPLITUDE: f32 = 0.89;

/// Attention signal component frequencies (dual-tone).
pub const ATTENTION_TONE_HZ: (f64, f64) = (853.0, 960.0);

/// Default attention signal duration in seconds.
pub const DEFAULT_ATTENTION_SECONDS: f32 = 8.0;
