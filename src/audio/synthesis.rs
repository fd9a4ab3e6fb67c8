//! Singing bowl strike synthesis.

use std::f64::consts::TAU;

use crate::params::BowlConfig;

/// Render the bowl strike as mono 16-bit PCM
///
/// Each partial decays exponentially; the mix gets a short linear attack to
/// avoid a click and a slow tremolo for shimmer. Out-of-range values
/// saturate instead of wrapping.
pub fn synthesize_bowl(config: &BowlConfig) -> Vec<i16> {
    let sample_rate = config.sample_rate_hz as f64;

    (0..config.sample_count())
        .map(|i| {
            let t = i as f64 / sample_rate;

            let mix: f64 = config
                .harmonics
                .iter()
                .map(|h| h.amplitude * (TAU * h.frequency_hz * t).sin() * (-h.decay_per_s * t).exp())
                .sum();

            let attack = if config.attack_secs > 0.0 {
                (t / config.attack_secs).min(1.0)
            } else {
                1.0
            };
            let tremolo = 1.0 + config.tremolo_depth * (TAU * config.tremolo_hz * t).sin();

            to_pcm16(mix * attack * tremolo * config.output_gain)
        })
        .collect()
}

/// Truncate towards zero and saturate to the i16 range
fn to_pcm16(value: f64) -> i16 {
    value.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}
