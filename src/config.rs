use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_BUFFER_LENGTH: i64 = 2048;
pub const DEFAULT_AMPLITUDE_LIMIT: i64 = 1024;
pub const DEFAULT_MIN_SILENCE_DURATION: i64 = 4096;
pub const DEFAULT_TRANSITION_TIME: i64 = 512;

/// Largest magnitude a sample can reach on the positive side.
pub const MAX_SAMPLE_MAGNITUDE: i64 = i16::MAX as i64;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid buffer length {0} (must be > 0 samples)")]
    BufferLength(i64),

    #[error("Invalid amplitude limit {0} (must be between 1 and 32767)")]
    AmplitudeLimit(i64),

    #[error("Invalid silence duration {0} (must be > 0 samples)")]
    SilenceDuration(i64),

    #[error("Invalid fade time {0} (must be >= 0 samples)")]
    FadeTime(i64),
}

/// What happens to the fader when the gate closes while a fade-in is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FadeMode {
    /// Every fade-out starts from the fully attenuated end of the ramp.
    #[default]
    Restart,
    /// The fader only changes direction and is never repositioned.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub buffer_length: usize,
    pub amplitude_limit: i16,
    pub min_silence_duration: u32,
    pub transition_time: u32,
    pub fade_mode: FadeMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_length: DEFAULT_BUFFER_LENGTH as usize,
            amplitude_limit: DEFAULT_AMPLITUDE_LIMIT as i16,
            min_silence_duration: DEFAULT_MIN_SILENCE_DURATION as u32,
            transition_time: DEFAULT_TRANSITION_TIME as u32,
            fade_mode: FadeMode::Restart,
        }
    }
}

impl Config {
    pub fn new(
        buffer_length: i64,
        amplitude_limit: i64,
        min_silence_duration: i64,
        transition_time: i64,
        fade_mode: FadeMode,
    ) -> Result<Self, ConfigError> {
        let buffer_length = usize::try_from(buffer_length)
            .ok()
            .filter(|len| *len > 0)
            .ok_or(ConfigError::BufferLength(buffer_length))?;

        if !(1..=MAX_SAMPLE_MAGNITUDE).contains(&amplitude_limit) {
            return Err(ConfigError::AmplitudeLimit(amplitude_limit));
        }

        let min_silence_duration = u32::try_from(min_silence_duration)
            .ok()
            .filter(|duration| *duration > 0)
            .ok_or(ConfigError::SilenceDuration(min_silence_duration))?;

        let transition_time =
            u32::try_from(transition_time).map_err(|_| ConfigError::FadeTime(transition_time))?;

        Ok(Self {
            buffer_length,
            amplitude_limit: amplitude_limit as i16,
            min_silence_duration,
            transition_time,
            fade_mode,
        })
    }

    pub fn is_fade_enabled(&self) -> bool {
        self.transition_time > 0
    }
}

/// Absolute amplitude limit for a level given in dBFS.
///
/// NaN maps to 0 and infinities saturate, so the validator rejects both.
pub fn amplitude_limit_from_db(db: f64) -> i64 {
    (10f64.powf(db / 20.0) * MAX_SAMPLE_MAGNITUDE as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(buffer: i64, limit: i64, duration: i64, fade: i64) -> Result<Config, ConfigError> {
        Config::new(buffer, limit, duration, fade, FadeMode::Restart)
    }

    #[test]
    fn defaults_are_valid() {
        let defaults = config(
            DEFAULT_BUFFER_LENGTH,
            DEFAULT_AMPLITUDE_LIMIT,
            DEFAULT_MIN_SILENCE_DURATION,
            DEFAULT_TRANSITION_TIME,
        )
        .unwrap();
        assert_eq!(defaults, Config::default());
        assert!(defaults.is_fade_enabled());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(config(0, 1024, 10, 0), Err(ConfigError::BufferLength(0)));
        assert_eq!(config(-4, 1024, 10, 0), Err(ConfigError::BufferLength(-4)));
        assert_eq!(config(16, 0, 10, 0), Err(ConfigError::AmplitudeLimit(0)));
        assert_eq!(
            config(16, 32768, 10, 0),
            Err(ConfigError::AmplitudeLimit(32768))
        );
        assert_eq!(config(16, 1024, 0, 0), Err(ConfigError::SilenceDuration(0)));
        assert_eq!(config(16, 1024, 10, -1), Err(ConfigError::FadeTime(-1)));
    }

    #[test]
    fn accepts_boundary_values() {
        let cfg = config(1, 32767, 1, 0).unwrap();
        assert_eq!(cfg.amplitude_limit, i16::MAX);
        assert!(!cfg.is_fade_enabled());
        assert_eq!(config(1, 1, 1, 0).unwrap().amplitude_limit, 1);
    }

    #[test]
    fn converts_decibels_to_amplitude() {
        assert_eq!(amplitude_limit_from_db(0.0), 32767);
        assert_eq!(amplitude_limit_from_db(-30.0), 1036);
        assert_eq!(amplitude_limit_from_db(-20.0), 3277);
        assert_eq!(amplitude_limit_from_db(f64::NAN), 0);
        assert!(amplitude_limit_from_db(3.0) > MAX_SAMPLE_MAGNITUDE);
        assert_eq!(amplitude_limit_from_db(f64::INFINITY), i64::MAX);
    }
}
