//! WAV reading and writing, used by [`crate::adapter::file::FileAdapter`] and
//! by the CLI's `encode`/`decode` file commands.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavWriter};

use crate::{Error, Result};

/// WAV file metadata without the sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of channels as stored in the file.
    pub channels: u16,
    /// Sample rate in Hz as stored in the file.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Duration in seconds.
    pub duration_secs: f64,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path).map_err(|e| Error::Wav(e.to_string()))?;
    let spec = reader.spec();
    let num_frames = reader.len() as u64 / spec.channels as u64;
    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        duration_secs: num_frames as f64 / spec.sample_rate as f64,
    })
}

/// Read a WAV file, downmixing multi-channel content to mono by
/// arithmetic mean.
pub fn read_wav_mono<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, u32)> {
    let reader = WavReader::open(path).map_err(|e| Error::Wav(e.to_string()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Wav(e.to_string()))?,
        SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            let max_val = (1i64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::Wav(e.to_string()))?
        }
    };

    let mono = if channels > 1 {
        samples
            .chunks_exact(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    Ok((mono, spec.sample_rate))
}

/// Write mono f32 samples to a 16-bit PCM WAV file.
pub fn write_wav_mono<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).map_err(|e| Error::Wav(e.to_string()))?;
    for &sample in samples {
        let int_sample = (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        writer
            .write_sample(int_sample)
            .map_err(|e| Error::Wav(e.to_string()))?;
    }
    writer.finalize().map_err(|e| Error::Wav(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn roundtrip_mono_16bit() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 / 1000.0).sin() * 0.5).collect();
        let file = NamedTempFile::new().unwrap();
        write_wav_mono(file.path(), &samples, 22050).unwrap();

        let (loaded, rate) = read_wav_mono(file.path()).unwrap();
        assert_eq!(rate, 22050);
        assert_eq!(loaded.len(), samples.len());
        for (a, b) in samples.iter().zip(loaded.iter()) {
            assert!((a - b).abs() < 0.001);
        }
    }

    #[test]
    fn stereo_file_downmixes_to_mono() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let file = NamedTempFile::new().unwrap();
        {
            let mut writer = WavWriter::create(file.path(), spec).unwrap();
            for _ in 0..10 {
                writer.write_sample(10000i16).unwrap();
                writer.write_sample(-10000i16).unwrap();
            }
            writer.finalize().unwrap();
        }

        let (mono, rate) = read_wav_mono(file.path()).unwrap();
        assert_eq!(rate, 8000);
        assert_eq!(mono.len(), 10);
        for &s in &mono {
            assert!(s.abs() < 0.001);
        }
    }

    #[test]
    fn info_reports_duration() {
        let samples = vec![0.0f32; 4410];
        let file = NamedTempFile::new().unwrap();
        write_wav_mono(file.path(), &samples, 44100).unwrap();
        let info = read_wav_info(file.path()).unwrap();
        assert_eq!(info.channels, 1);
        assert!((info.duration_secs - 0.1).abs() < 1e-9);
    }
}
