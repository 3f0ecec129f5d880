use crate::config::ModemConfig;
use crate::demodulator::{Demodulator, ReceiverState, Reception};
use crate::error::{ModemError, Result};
use crate::spectrum::BandPowerEstimator;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Blocking supplier of mono f32 samples at the configured rate
///
/// `read` returns exactly `count` samples or an error. Live capture
/// implementations open the device in `start` and release it in `stop`.
pub trait SampleSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn read(&mut self, count: usize) -> Result<Vec<f32>>;

    fn stop(&mut self) {}
}

/// Serves samples from memory
///
/// A short final read is zero padded; reading past the end is `EndOfStream`.
pub struct BufferSource {
    samples: Vec<f32>,
    position: usize,
}

impl BufferSource {
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }
}

impl SampleSource for BufferSource {
    fn read(&mut self, count: usize) -> Result<Vec<f32>> {
        if self.position >= self.samples.len() {
            return Err(ModemError::EndOfStream);
        }
        let end = (self.position + count).min(self.samples.len());
        let mut out = self.samples[self.position..end].to_vec();
        out.resize(count, 0.0);
        self.position = end;
        Ok(out)
    }
}

/// Shared flag checked by a receive session before every read
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag for every clone of this token
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Stops the source when dropped
struct Capture<'a, S: SampleSource> {
    source: &'a mut S,
}

impl<'a, S: SampleSource> Capture<'a, S> {
    fn start(source: &'a mut S) -> Result<Self> {
        source.start()?;
        Ok(Self { source })
    }
}

impl<S: SampleSource> Drop for Capture<'_, S> {
    fn drop(&mut self) {
        self.source.stop();
    }
}

/// Drives a `Demodulator` from a `SampleSource` until one frame is received
pub struct ReceiveSession<'a, S: SampleSource> {
    source: &'a mut S,
    config: ModemConfig,
    cancel: CancelToken,
}

impl<'a, S: SampleSource> ReceiveSession<'a, S> {
    pub fn new(source: &'a mut S, config: ModemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn run(self) -> Result<Reception> {
        let mut demod = Demodulator::new(&self.config)?;
        let mut estimator = BandPowerEstimator::new(&self.config, demod.alphabet());
        let mut capture = Capture::start(self.source)?;
        info!(
            "receiving: {} data tones, {} samples per window",
            demod.alphabet().data_tones(),
            self.config.window_samples()
        );

        let mut windows = 0;
        loop {
            if self.cancel.is_cancelled() {
                info!("reception cancelled after {} windows", windows);
                return Err(ModemError::Cancelled);
            }
            if windows >= self.config.max_windows {
                return Err(match demod.state() {
                    ReceiverState::Calibrating | ReceiverState::SearchingSync => {
                        ModemError::SyncTimeout { windows }
                    }
                    _ => ModemError::Timeout { windows },
                });
            }
            windows += 1;

            match demod.state() {
                ReceiverState::Aligning => {
                    capture.source.read(self.config.alignment_samples())?;
                    demod.finish_alignment();
                    debug!("aligned to symbol boundary at window {}", windows);
                }
                state => {
                    let count = if state == ReceiverState::Calibrating {
                        self.config.calibration_segment_samples()
                    } else {
                        self.config.window_samples()
                    };
                    let samples = capture.source.read(count)?;
                    let powers = estimator.band_powers(&samples);
                    if let Some(reception) = demod.step(&powers)? {
                        return Ok(reception);
                    }
                }
            }
        }
    }
}
