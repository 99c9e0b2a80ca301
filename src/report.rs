use serde::Serialize;
use serde_json::{Map, Value, to_string_pretty};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::observers::GateObserver;
use crate::output::fmt_position;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not write report: {0}")]
    Io(#[from] std::io::Error),
}

struct InternalSegment {
    start: u64,
    end: Option<u64>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct SquelchSegment {
    #[serde(rename = "startSample")]
    pub start_sample: u64,
    #[serde(rename = "endSample")]
    pub end_sample: u64,
    #[serde(rename = "durationSamples")]
    pub duration_samples: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Counts every stretch of the stream during which the gate was closed.
///
/// Per-segment detail is only kept when asked for, so a report that is never
/// written stays constant in size on an endless stream.
pub struct SquelchReport {
    position: u64,
    sample_rate: Option<u32>,
    open_since: Option<u64>,
    segment_count: u64,
    closed_samples: u64,
    segments: Option<Vec<InternalSegment>>,
}

impl SquelchReport {
    pub fn new(sample_rate: Option<u32>, keep_segments: bool) -> Self {
        Self {
            position: 0,
            sample_rate,
            open_since: None,
            segment_count: 0,
            closed_samples: 0,
            segments: keep_segments.then(Vec::new),
        }
    }

    pub fn total_samples(&self) -> u64 {
        self.position
    }

    pub fn segment_count(&self) -> u64 {
        self.segment_count
    }

    /// Segments still open at the current position end there. Empty unless
    /// the report was built with `keep_segments`.
    pub fn segments(&self) -> Vec<SquelchSegment> {
        let seconds = |samples: u64| self.sample_rate.map(|rate| samples as f64 / rate as f64);

        self.segments
            .iter()
            .flatten()
            .map(|seg| {
                let end_sample = seg.end.unwrap_or(self.position);
                let duration_samples = end_sample - seg.start;
                SquelchSegment {
                    start_sample: seg.start,
                    end_sample,
                    duration_samples,
                    start: seconds(seg.start),
                    end: seconds(end_sample),
                    duration: seconds(duration_samples),
                }
            })
            .collect()
    }

    pub fn squelched_samples(&self) -> u64 {
        let open = self.open_since.map_or(0, |start| self.position - start);
        self.closed_samples + open
    }

    pub fn json(&self, config: &Config) -> Result<Value, ReportError> {
        let mut squelch = Map::new();
        squelch.insert("config".to_string(), serde_json::to_value(config)?);
        squelch.insert("totalSamples".to_string(), self.total_samples().into());
        squelch.insert(
            "squelchedSamples".to_string(),
            self.squelched_samples().into(),
        );
        if let Some(rate) = self.sample_rate {
            squelch.insert("sampleRate".to_string(), rate.into());
        }
        squelch.insert("segments".to_string(), serde_json::to_value(self.segments())?);

        let mut root = Map::new();
        root.insert("squelch".to_string(), Value::Object(squelch));
        Ok(Value::Object(root))
    }

    pub fn write(&self, path: &Path, config: &Config) -> Result<(), ReportError> {
        let value = self.json(config)?;
        std::fs::write(path, to_string_pretty(&value)?)?;
        Ok(())
    }
}

impl GateObserver for SquelchReport {
    fn gate_closed(&mut self, index: usize) {
        let start = self.position + index as u64;
        debug!("SQUELCH ON  @ {}", fmt_position(start, self.sample_rate));
        self.open_since = Some(start);
        self.segment_count += 1;
        if let Some(segments) = &mut self.segments {
            segments.push(InternalSegment { start, end: None });
        }
    }

    fn gate_opened(&mut self, index: usize) {
        let end = self.position + index as u64;
        debug!("SQUELCH OFF @ {}", fmt_position(end, self.sample_rate));
        if let Some(start) = self.open_since.take() {
            self.closed_samples += end - start;
        }
        if let Some(segment) = self.segments.as_mut().and_then(|segments| segments.last_mut()) {
            segment.end = Some(end);
        }
    }

    fn chunk_done(&mut self, len: usize) {
        self.position += len as u64;
    }
}
