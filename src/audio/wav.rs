//! Uncompressed PCM WAV container via hound.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{synthesize_bowl, AudioError};
use crate::params::BowlConfig;

/// Mono samples decoded from a WAV file, normalised to [-1, 1]
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Temporary path for this process's bowl sound
pub fn bowl_temp_path() -> PathBuf {
    std::env::temp_dir().join(format!("zen-bowl-{}.wav", std::process::id()))
}

/// Write mono 16-bit PCM
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<(), AudioError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a WAV file, down-mixing to mono
pub fn read_wav(path: &Path) -> Result<DecodedAudio, AudioError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
    };

    let channels = spec.channels.max(1) as usize;
    let samples = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Synthesize the bowl strike and write it to `path`
pub fn write_bowl(config: &BowlConfig, path: &Path) -> Result<PathBuf, AudioError> {
    let samples = synthesize_bowl(config);
    write_wav(path, &samples, config.sample_rate_hz)?;
    debug!(
        "Bowl sound: {} samples @ {}Hz -> {}",
        samples.len(),
        config.sample_rate_hz,
        path.display()
    );
    Ok(path.to_path_buf())
}
