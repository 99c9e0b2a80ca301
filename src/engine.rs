use crate::config::{Config, FadeMode};
use crate::observers::GateObserver;
use crate::states::{DetectorState, FaderState, Phase};

/// Smoothstep coefficient for `index` in `[0, length]`. `length` must be non-zero.
pub fn ease(index: u32, length: u32) -> f32 {
    let x = index as f32 / length as f32;
    x * x * (3.0 - 2.0 * x)
}

/// Scale a sample by `factor`, rounding half away from zero.
fn scale(sample: i16, factor: f32) -> i16 {
    (f32::from(sample) * factor).round() as i16
}

/// Per-sample squelch with a hysteretic detector and a smoothstep fade.
///
/// All state survives between calls to [`Squelch::transform`], so the output
/// does not depend on how the stream is split into chunks.
#[derive(Debug, Clone)]
pub struct Squelch {
    amplitude_limit: u16,
    min_silence_duration: u64,
    transition_time: u32,
    fade_mode: FadeMode,
    detector: DetectorState,
    fader: FaderState,
}

impl Squelch {
    pub fn new(config: &Config) -> Self {
        Self {
            amplitude_limit: config.amplitude_limit.unsigned_abs(),
            min_silence_duration: config.min_silence_duration.into(),
            transition_time: config.transition_time,
            fade_mode: config.fade_mode,
            detector: DetectorState::new(),
            fader: FaderState::new(config.transition_time),
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::of(&self.detector, &self.fader)
    }

    pub fn detector(&self) -> &DetectorState {
        &self.detector
    }

    pub fn fader(&self) -> &FaderState {
        &self.fader
    }

    pub fn transform(&mut self, chunk: &mut [i16]) {
        self.transform_observed(chunk, &mut ());
    }

    pub fn transform_observed<O: GateObserver + ?Sized>(
        &mut self,
        chunk: &mut [i16],
        observer: &mut O,
    ) {
        for (index, sample) in chunk.iter_mut().enumerate() {
            let active = sample.unsigned_abs() >= self.amplitude_limit;

            if self.update_detector(active) {
                if self.detector.gate {
                    observer.gate_closed(index);
                } else {
                    observer.gate_opened(index);
                }
            }

            *sample = self.apply_gain(*sample);
        }

        observer.chunk_done(chunk.len());
    }

    /// Returns true when the gate flipped on this sample.
    fn update_detector(&mut self, active: bool) -> bool {
        let detector = &mut self.detector;

        if detector.gate {
            if active {
                // Attack is immediate and the ramp reverses from wherever it is.
                detector.gate = false;
                detector.silence_run = 0;
                self.fader.ramping = self.transition_time > 0;
                return true;
            }
            return false;
        }

        if active {
            detector.silence_run = 0;
            return false;
        }

        detector.silence_run = detector.silence_run.saturating_add(1);
        if detector.silence_run > self.min_silence_duration {
            detector.gate = true;
            self.fader.ramping = self.transition_time > 0;
            if self.fade_mode == FadeMode::Restart {
                self.fader.position = 0;
            }
            return true;
        }

        false
    }

    fn apply_gain(&mut self, sample: i16) -> i16 {
        let length = self.transition_time;
        let fader = &mut self.fader;

        match (self.detector.gate, fader.ramping) {
            (false, false) => sample,
            // Exact zero, not a multiply
            (true, false) => 0,
            (false, true) => {
                let out = scale(sample, ease(fader.position, length));
                fader.position = fader.position.saturating_add(1).min(length);
                if fader.position == length {
                    fader.ramping = false;
                }
                out
            }
            (true, true) => {
                let out = scale(sample, ease(fader.position, length));
                fader.position = fader.position.saturating_sub(1);
                if fader.position == 0 {
                    fader.ramping = false;
                }
                out
            }
        }
    }
}
