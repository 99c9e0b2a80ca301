use std::io::{ErrorKind, Read, Write};
use thiserror::Error;
use tracing::warn;

use crate::config::Config;
use crate::observers::GateObserver;
use crate::output::Output;
use crate::engine::Squelch;

const SAMPLE_BYTES: usize = std::mem::size_of::<i16>();

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("read from input failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("write to output failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("flush of output failed: {0}")]
    Flush(#[source] std::io::Error),
}

/// Blocking read, transform, write loop over raw s16le samples.
pub struct Harness {
    bytes: Vec<u8>,
    samples: Vec<i16>,
}

impl Harness {
    pub fn new(config: &Config) -> Self {
        Self {
            bytes: vec![0; config.buffer_length * SAMPLE_BYTES],
            samples: vec![0; config.buffer_length],
        }
    }

    /// Runs until end of input and returns the number of samples written.
    ///
    /// Short reads are processed right away. A read ending halfway through a
    /// sample keeps the dangling byte for the next round.
    pub fn run<R, W, O>(
        &mut self,
        engine: &mut Squelch,
        mut input: R,
        mut output: W,
        observer: &mut O,
        progress: &Output,
    ) -> Result<u64, StreamError>
    where
        R: Read,
        W: Write,
        O: GateObserver + ?Sized,
    {
        let mut total = 0u64;
        let mut pending = 0;

        loop {
            let read = match input.read(&mut self.bytes[pending..]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(StreamError::Read(err)),
            };

            let available = pending + read;
            let nsamples = available / SAMPLE_BYTES;
            let nbytes = nsamples * SAMPLE_BYTES;

            if nsamples > 0 {
                let chunk = &mut self.samples[..nsamples];
                for (sample, raw) in chunk.iter_mut().zip(self.bytes[..nbytes].chunks_exact(2)) {
                    *sample = i16::from_le_bytes([raw[0], raw[1]]);
                }

                engine.transform_observed(chunk, &mut *observer);

                for (raw, sample) in self.bytes[..nbytes].chunks_exact_mut(2).zip(chunk.iter()) {
                    raw.copy_from_slice(&sample.to_le_bytes());
                }

                output
                    .write_all(&self.bytes[..nbytes])
                    .map_err(StreamError::Write)?;
                output.flush().map_err(StreamError::Flush)?;

                total += nsamples as u64;
                progress.inc(nsamples as u64);
            }

            pending = available - nbytes;
            if pending > 0 {
                self.bytes[0] = self.bytes[nbytes];
            }
        }

        if pending > 0 {
            warn!("Input ended in the middle of a sample, dropping {} byte(s)", pending);
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FadeMode;
    use std::collections::VecDeque;
    use std::io::{self, Cursor};

    fn config(buffer_length: usize, transition_time: u32) -> Config {
        Config {
            buffer_length,
            amplitude_limit: 1024,
            min_silence_duration: 3,
            transition_time,
            fade_mode: FadeMode::Restart,
        }
    }

    fn to_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn from_bytes(bytes: &[u8]) -> Vec<i16> {
        bytes
            .chunks_exact(2)
            .map(|raw| i16::from_le_bytes([raw[0], raw[1]]))
            .collect()
    }

    fn process(config: &Config, input: impl Read) -> Result<(u64, Vec<u8>), StreamError> {
        let mut engine = Squelch::new(config);
        let mut harness = Harness::new(config);
        let mut output = Vec::new();
        let total = harness.run(&mut engine, input, &mut output, &mut (), &Output::hidden())?;
        Ok((total, output))
    }

    fn test_signal() -> Vec<i16> {
        let mut signal = Vec::new();
        for round in 0..20i16 {
            signal.extend(std::iter::repeat_n(3000 - round * 7, 40));
            signal.extend(std::iter::repeat_n(-200 + round, 25 + round as usize));
        }
        signal
    }

    /// Hands out the input in fixed-size pieces, interrupting now and then.
    struct ChoppyReader {
        data: Vec<u8>,
        offset: usize,
        pieces: VecDeque<usize>,
        calls: usize,
    }

    impl Read for ChoppyReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls % 4 == 0 {
                return Err(io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            let piece = self.pieces.pop_front().unwrap_or(usize::MAX);
            self.pieces.push_back(piece);
            let len = piece.min(buf.len()).min(self.data.len() - self.offset);
            buf[..len].copy_from_slice(&self.data[self.offset..self.offset + len]);
            self.offset += len;
            Ok(len)
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device gone"))
        }
    }

    #[test]
    fn squelches_a_whole_stream() {
        let cfg = config(4, 0);
        let input = to_bytes(&[2000, 500, 500, 500, 500, 2000]);
        let (total, output) = process(&cfg, Cursor::new(input)).unwrap();
        assert_eq!(total, 6);
        assert_eq!(from_bytes(&output), vec![2000, 500, 500, 500, 0, 2000]);
    }

    #[test]
    fn empty_input_ends_cleanly() {
        let (total, output) = process(&config(16, 8), Cursor::new(Vec::new())).unwrap();
        assert_eq!(total, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn odd_splits_match_direct_transform() {
        let signal = test_signal();
        let cfg = config(64, 16);

        let mut expected = signal.clone();
        Squelch::new(&cfg).transform(&mut expected);

        for pieces in [vec![1], vec![3, 1, 7], vec![5, 128, 2, 9], vec![1000]] {
            let reader = ChoppyReader {
                data: to_bytes(&signal),
                offset: 0,
                pieces: pieces.into(),
                calls: 0,
            };
            let (total, output) = process(&cfg, reader).unwrap();
            assert_eq!(total as usize, signal.len());
            assert_eq!(from_bytes(&output), expected);
        }
    }

    #[test]
    fn drops_trailing_odd_byte() {
        let mut input = to_bytes(&[2000, -2000]);
        input.push(0x7f);
        let (total, output) = process(&config(8, 0), Cursor::new(input)).unwrap();
        assert_eq!(total, 2);
        assert_eq!(from_bytes(&output), vec![2000, -2000]);
        assert_eq!(output.len(), 4);
    }

    #[test]
    fn read_errors_are_fatal() {
        let result = process(&config(8, 0), FailingReader);
        assert!(matches!(result, Err(StreamError::Read(_))));
    }

    #[test]
    fn write_errors_are_fatal() {
        let cfg = config(8, 0);
        let mut engine = Squelch::new(&cfg);
        let result = Harness::new(&cfg).run(
            &mut engine,
            Cursor::new(to_bytes(&[1, 2, 3])),
            FailingWriter,
            &mut (),
            &Output::hidden(),
        );
        assert!(matches!(result, Err(StreamError::Write(_))));
    }
}
