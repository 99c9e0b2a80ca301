use indicatif::{ProgressBar, ProgressStyle};

pub fn sample_to_time(sample: u64, sample_rate: u32) -> String {
    let seconds = sample as f64 / sample_rate as f64;
    let hours = (seconds / 3600.0).floor();
    let minutes = ((seconds % 3600.0) / 60.0).floor();
    let secs = seconds % 60.0;
    format!("{:02.0}:{:02.0}:{:06.3}", hours, minutes, secs)
}

/// Sample position for log lines, with a timestamp when the rate is known.
pub fn fmt_position(sample: u64, sample_rate: Option<u32>) -> String {
    match sample_rate {
        Some(rate) => format!("{} ({})", sample, sample_to_time(sample, rate)),
        None => sample.to_string(),
    }
}

/// Optional spinner on stderr; the stream length is unknown up front.
#[derive(Debug)]
pub struct Output {
    pub progress_bar: Option<ProgressBar>,
}

impl Output {
    pub fn new(show_progress: bool) -> Self {
        let progress_bar = if show_progress {
            Some(ProgressBar::new_spinner())
        } else {
            None
        };

        if let Some(pb) = &progress_bar
            && let Ok(style) =
                ProgressStyle::with_template("[{elapsed_precise}] {spinner:.green} {pos} samples ({per_sec})")
        {
            pb.set_style(style);
        }

        Self { progress_bar }
    }

    pub fn hidden() -> Self {
        Self { progress_bar: None }
    }

    pub fn inc(&self, samples: u64) {
        if let Some(pb) = &self.progress_bar {
            pb.inc(samples);
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish();
        }
    }
}
