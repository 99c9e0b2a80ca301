use clap::Parser;
use std::path::PathBuf;

use crate::config::{
    Config, ConfigError, DEFAULT_AMPLITUDE_LIMIT, DEFAULT_BUFFER_LENGTH,
    DEFAULT_MIN_SILENCE_DURATION, DEFAULT_TRANSITION_TIME, FadeMode, amplitude_limit_from_db,
};

/// Zero a raw s16le PCM stream to digital silence when it has been quiet for a while.
///
/// Reads samples from stdin and writes them to stdout.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Maximum number of samples processed per read
    #[arg(short = 'u', long, default_value_t = DEFAULT_BUFFER_LENGTH, allow_negative_numbers = true)]
    pub buffer_length: i64,

    /// Amplitude limit as an absolute sample value
    #[arg(
        short = 'l',
        long = "amplitude-limit-abs",
        conflicts_with = "amplitude_limit_db",
        allow_negative_numbers = true
    )]
    pub amplitude_limit_abs: Option<i64>,

    /// Amplitude limit in dBFS
    #[arg(short = 'L', long = "amplitude-limit-db", allow_negative_numbers = true)]
    pub amplitude_limit_db: Option<f64>,

    /// Consecutive quiet samples needed before squelching
    #[arg(short = 'd', long, default_value_t = DEFAULT_MIN_SILENCE_DURATION, allow_negative_numbers = true)]
    pub min_silence_duration: i64,

    /// Fade length in samples, 0 disables fading
    #[arg(short = 't', long = "fade-time", default_value_t = DEFAULT_TRANSITION_TIME, allow_negative_numbers = true)]
    pub fade_time: i64,

    /// Where a new fade-out starts on the ramp
    #[arg(long, value_enum, default_value_t = FadeMode::Restart)]
    pub fade_mode: FadeMode,

    /// Write a JSON report of squelched segments to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Sample rate of the stream, used for timestamps in logs and the report
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub sample_rate: Option<u32>,

    /// Show a progress spinner on stderr
    #[arg(long)]
    pub progress: bool,

    /// Log every gate transition
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn config(&self) -> Result<Config, ConfigError> {
        let amplitude_limit = match (self.amplitude_limit_abs, self.amplitude_limit_db) {
            (Some(limit), _) => limit,
            (None, Some(db)) => amplitude_limit_from_db(db),
            (None, None) => DEFAULT_AMPLITUDE_LIMIT,
        };

        Config::new(
            self.buffer_length,
            amplitude_limit,
            self.min_silence_duration,
            self.fade_time,
            self.fade_mode,
        )
    }
}
