//! Bowl playback through the default output device.

use std::path::{Path, PathBuf};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, info, warn};

use super::{read_wav, AudioError};
use crate::controller::CompletionSound;

/// Plays a decoded clip once, resampled to the device rate
///
/// Linear interpolation between neighbouring source samples; after the end
/// of the clip it yields silence.
#[derive(Debug, Clone)]
pub struct SampleCursor {
    samples: Vec<f32>,
    position: f64,
    step: f64,
}

impl SampleCursor {
    pub fn new(samples: Vec<f32>, source_rate: u32, output_rate: u32) -> Self {
        let step = if output_rate > 0 {
            source_rate as f64 / output_rate as f64
        } else {
            1.0
        };
        Self {
            samples,
            position: 0.0,
            step,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.samples.len() as f64
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }

        let index = self.position as usize;
        let frac = (self.position - index as f64) as f32;
        let current = self.samples[index];
        let next = self.samples.get(index + 1).copied().unwrap_or(0.0);
        self.position += self.step;

        current + (next - current) * frac
    }
}

/// Fire-and-forget playback of the completion sound
///
/// Dropping the player stops the sound, so the owner keeps it until exit.
pub struct BowlPlayer {
    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl BowlPlayer {
    /// Load the WAV at `path` and start playing it immediately
    pub fn play(path: &Path) -> Result<Self, AudioError> {
        let clip = read_wav(path)?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let supported = device.default_output_config()?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(AudioError::UnsupportedFormat(supported.sample_format()));
        }
        let config: cpal::StreamConfig = supported.into();

        info!(
            "Audio: {} @ {}Hz",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            config.sample_rate.0
        );

        let channels = config.channels.max(1) as usize;
        let mut cursor = SampleCursor::new(clip.samples, clip.sample_rate, config.sample_rate.0);

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    frame.fill(cursor.next_sample());
                }
            },
            |err| warn!("Audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        Ok(Self { _stream: stream })
    }
}

/// The pre-rendered bowl WAV, played through [`BowlPlayer`]
pub struct BowlSound {
    path: Option<PathBuf>,
    player: Option<BowlPlayer>,
}

impl BowlSound {
    /// `None` when the WAV could not be written; playing is then a no-op
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path, player: None }
    }
}

impl CompletionSound for BowlSound {
    fn play(&mut self) -> Result<(), AudioError> {
        let Some(path) = &self.path else {
            debug!("No bowl sound to play");
            return Ok(());
        };
        self.player = Some(BowlPlayer::play(path)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_same_rate_is_identity() {
        let mut cursor = SampleCursor::new(vec![0.1, 0.2, 0.3], 44100, 44100);
        assert_eq!(cursor.next_sample(), 0.1);
        assert_eq!(cursor.next_sample(), 0.2);
        assert_eq!(cursor.next_sample(), 0.3);
        assert!(cursor.is_finished());
        assert_eq!(cursor.next_sample(), 0.0);
    }

    #[test]
    fn test_cursor_upsamples_with_interpolation() {
        let mut cursor = SampleCursor::new(vec![0.0, 1.0], 22050, 44100);
        assert_eq!(cursor.next_sample(), 0.0);
        assert_eq!(cursor.next_sample(), 0.5);
        assert_eq!(cursor.next_sample(), 1.0);
        // Interpolates towards silence past the last sample
        assert_eq!(cursor.next_sample(), 0.5);
        assert!(cursor.is_finished());
    }

    #[test]
    fn test_cursor_output_length_scales_with_rate() {
        let mut cursor = SampleCursor::new(vec![0.25; 441], 44100, 48000);
        let mut produced = 0;
        while !cursor.is_finished() {
            cursor.next_sample();
            produced += 1;
        }
        assert!((480..=481).contains(&produced));
    }

    #[test]
    fn test_bowl_sound_without_file_is_silent() {
        let mut sound = BowlSound::new(None);
        assert!(sound.play().is_ok());
    }

    #[test]
    fn test_bowl_sound_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sound = BowlSound::new(Some(dir.path().join("absent.wav")));
        assert!(matches!(sound.play(), Err(AudioError::Wav(_))));
    }

    #[test]
    fn test_play_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = BowlPlayer::play(&dir.path().join("absent.wav"));
        assert!(matches!(result, Err(AudioError::Wav(_))));
    }
}
