//! Completion sound: offline bowl synthesis, WAV container and playback.
//!
//! The strike is rendered once at startup, written to a temporary WAV file
//! and read back when the session completes. Playback is fire-and-forget;
//! every failure surfaces as an [`AudioError`] the caller may ignore.

mod synthesis;
mod system;
mod wav;

use thiserror::Error;

// Re-export public types
pub use synthesis::synthesize_bowl;
pub use system::{BowlPlayer, BowlSound, SampleCursor};
pub use wav::{bowl_temp_path, read_wav, write_bowl, write_wav, DecodedAudio};

/// Audio failures; all of them are cosmetic for the timer
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("WAV I/O failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("no audio output device found")]
    NoOutputDevice,

    #[error("failed to get audio config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported output sample format {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}
