//! Singing bowl synthesis parameters.

/// One partial of the bowl strike
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harmonic {
    /// Partial frequency (Hz)
    pub frequency_hz: f64,

    /// Relative amplitude (dimensionless, summed across partials)
    pub amplitude: f64,

    /// Exponential decay rate (1/s)
    pub decay_per_s: f64,
}

impl Harmonic {
    pub const fn new(frequency_hz: f64, amplitude: f64, decay_per_s: f64) -> Self {
        Self {
            frequency_hz,
            amplitude,
            decay_per_s,
        }
    }
}

/// Offline synthesis configuration for the completion sound
#[derive(Debug, Clone)]
pub struct BowlConfig {
    /// Output sample rate (Hz)
    pub sample_rate_hz: u32,

    /// Rendered length (seconds)
    pub duration_secs: f64,

    /// Partials summed into the strike
    pub harmonics: Vec<Harmonic>,

    /// Linear fade-in at the start, removes the click (seconds)
    pub attack_secs: f64,

    /// Tremolo rate (Hz)
    pub tremolo_hz: f64,

    /// Tremolo depth (0.015 = ±1.5%)
    pub tremolo_depth: f64,

    /// Scale from the [-1, 1] mix to 16-bit sample values
    pub output_gain: f64,
}

impl Default for BowlConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            duration_secs: 12.0,
            harmonics: vec![
                Harmonic::new(262.0, 0.35, 0.22),
                Harmonic::new(393.0, 0.12, 0.32),
                Harmonic::new(786.0, 0.22, 0.38),
                Harmonic::new(1310.0, 0.08, 0.55),
                Harmonic::new(1834.0, 0.04, 0.75),
                // Slightly detuned fundamental, beats against 262 Hz
                Harmonic::new(264.5, 0.09, 0.25),
            ],
            attack_secs: 0.008,
            tremolo_hz: 5.2,
            tremolo_depth: 0.015,
            output_gain: 32000.0,
        }
    }
}

impl BowlConfig {
    /// Number of samples in the rendered strike
    pub fn sample_count(&self) -> usize {
        (self.sample_rate_hz as f64 * self.duration_secs) as usize
    }
}
