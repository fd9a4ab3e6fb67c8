//! Session timing parameters.

/// Session length used when no (valid) length is given on the command line
pub const DEFAULT_MINUTES: f64 = 45.0;

/// Timing of a single session, from first tick to process exit
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Total countdown length (seconds)
    pub duration_secs: f64,

    /// Redraw cadence (Hz)
    pub tick_hz: f64,

    /// Time between completion and the start of the fade (seconds).
    /// Covers the bowl's 12 s decay plus the playback tail.
    pub completion_grace_secs: f64,

    /// Length of the window opacity animation (seconds)
    pub fade_secs: f64,

    /// Time from fade start to process exit (seconds)
    pub exit_after_fade_secs: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_MINUTES)
    }
}

impl SessionConfig {
    pub fn from_minutes(minutes: f64) -> Self {
        Self {
            duration_secs: minutes * 60.0,
            tick_hz: 30.0,
            completion_grace_secs: 14.0,
            fade_secs: 3.0,
            exit_after_fade_secs: 3.5,
        }
    }

    /// Interval between ticks (seconds)
    pub fn tick_interval_secs(&self) -> f64 {
        1.0 / self.tick_hz
    }

    pub fn minutes(&self) -> f64 {
        self.duration_secs / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_45_minutes() {
        let config = SessionConfig::default();
        assert_eq!(config.duration_secs, 2700.0);
        assert_eq!(config.minutes(), 45.0);
    }

    #[test]
    fn test_tick_interval() {
        let config = SessionConfig::from_minutes(1.0);
        assert!((config.tick_interval_secs() - 1.0 / 30.0).abs() < 1e-12);
    }
}
