/// Hysteretic silence detector: an instantaneous comparator feeding a run-length counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorState {
    pub silence_run: u64,
    pub gate: bool,
}

impl DetectorState {
    pub fn new() -> Self {
        Self {
            silence_run: 0,
            gate: false,
        }
    }
}

/// Position on the gain ramp. 0 is fully attenuated, `transition_time` fully open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaderState {
    pub position: u32,
    pub ramping: bool,
}

impl FaderState {
    pub fn new(transition_time: u32) -> Self {
        Self {
            position: transition_time,
            ramping: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    FadingOut,
    Muted,
    FadingIn,
}

impl Phase {
    pub fn of(detector: &DetectorState, fader: &FaderState) -> Self {
        match (detector.gate, fader.ramping) {
            (false, false) => Phase::Open,
            (true, true) => Phase::FadingOut,
            (true, false) => Phase::Muted,
            (false, true) => Phase::FadingIn,
        }
    }
}
