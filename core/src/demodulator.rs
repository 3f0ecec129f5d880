use crate::config::ModemConfig;
use crate::error::Result;
use crate::fec::{transmission_length, CorrectionClass};
use crate::framing::{read_length_preamble, PREAMBLE_BITS, SYNC_TERMINAL};
use crate::noise::{NoiseCalibrator, NoiseProfile};
use crate::spectrum::dominant_tone;
use crate::tones::{ToneAlphabet, MARKER};
use log::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    Calibrating,
    SearchingSync,
    Aligning,
    AccumulatingPreamble,
    AccumulatingPayload,
    Done,
}

/// Announced message length and the raw (uncorrected) codeword bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reception {
    pub message_bits: usize,
    pub transmitted: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncClass {
    Marker,
    Burst,
    Terminal,
    Other,
}

/// Counts max-tone edges out of the marker until the terminal tone arrives
struct SyncTracker {
    previous: SyncClass,
    transitions: usize,
    required: usize,
}

impl SyncTracker {
    fn new(required: usize) -> Self {
        Self {
            previous: SyncClass::Other,
            transitions: 0,
            required,
        }
    }

    /// Returns true once the sync burst has been recognised
    fn observe(&mut self, class: SyncClass) -> bool {
        match class {
            SyncClass::Terminal if self.previous == SyncClass::Marker => {
                if self.transitions >= self.required {
                    return true;
                }
                self.transitions = 0;
                self.previous = SyncClass::Other;
            }
            SyncClass::Marker => self.previous = SyncClass::Marker,
            SyncClass::Burst => {
                if self.previous == SyncClass::Marker {
                    self.transitions += 1;
                }
                self.previous = SyncClass::Burst;
            }
            _ => {
                self.transitions = 0;
                self.previous = SyncClass::Other;
            }
        }
        false
    }
}

/// Per-session receive state: noise profile, sync tracker and bit accumulators
///
/// Driven one analysis window at a time with per-tone band powers; the
/// caller owns the audio and the pacing.
pub struct Demodulator {
    state: ReceiverState,
    alphabet: ToneAlphabet,
    correction: CorrectionClass,
    min_tone_power: f32,
    calibration_segments: usize,
    calibrator: NoiseCalibrator,
    noise: NoiseProfile,
    sync: SyncTracker,
    previous_index: usize,
    preamble: Vec<u8>,
    payload: Vec<u8>,
    message_bits: usize,
    transmission_len: usize,
}

impl Demodulator {
    pub fn new(config: &ModemConfig) -> Result<Self> {
        let alphabet = ToneAlphabet::from_config(config)?;
        let tones = alphabet.tone_count();
        Ok(Self {
            state: ReceiverState::Calibrating,
            correction: config.correction,
            min_tone_power: config.min_tone_power,
            calibration_segments: config.calibration_segments,
            calibrator: NoiseCalibrator::new(tones),
            noise: NoiseProfile::silent(tones),
            sync: SyncTracker::new(config.sync_transitions),
            previous_index: MARKER,
            preamble: Vec::with_capacity(PREAMBLE_BITS),
            payload: Vec::new(),
            message_bits: 0,
            transmission_len: 0,
            alphabet,
        })
    }

    /// Skip calibration and search for sync against a known noise profile
    pub fn with_noise_profile(config: &ModemConfig, noise: NoiseProfile) -> Result<Self> {
        let mut demod = Self::new(config)?;
        demod.noise = noise;
        demod.state = ReceiverState::SearchingSync;
        Ok(demod)
    }

    pub fn state(&self) -> ReceiverState {
        self.state
    }

    pub fn noise_profile(&self) -> &NoiseProfile {
        &self.noise
    }

    pub fn alphabet(&self) -> &ToneAlphabet {
        &self.alphabet
    }

    /// Feed the band powers of one window
    ///
    /// A window delivered while aligning is taken as the dead time itself.
    pub fn step(&mut self, powers: &[f32]) -> Result<Option<Reception>> {
        match self.state {
            ReceiverState::Calibrating => {
                self.calibrator.add_segment(powers)?;
                if self.calibrator.segments() >= self.calibration_segments {
                    self.noise = self.calibrator.finish();
                    self.state = ReceiverState::SearchingSync;
                    info!(
                        "noise calibration complete over {} segments",
                        self.calibrator.segments()
                    );
                }
                Ok(None)
            }
            ReceiverState::SearchingSync => {
                let corrected = self.noise.correct(powers)?;
                let class = self.classify(&corrected);
                trace!("sync window classified as {:?}", class);
                if self.sync.observe(class) {
                    info!("sync burst detected");
                    self.state = ReceiverState::Aligning;
                }
                Ok(None)
            }
            ReceiverState::Aligning => {
                self.finish_alignment();
                Ok(None)
            }
            ReceiverState::AccumulatingPreamble | ReceiverState::AccumulatingPayload => {
                let corrected = self.noise.correct(powers)?;
                let index = dominant_tone(&corrected).map_or(MARKER, |(i, _)| i);
                let rising = self.previous_index == MARKER && index != MARKER;
                self.previous_index = index;
                if rising {
                    self.accept(index)
                } else {
                    Ok(None)
                }
            }
            ReceiverState::Done => Ok(None),
        }
    }

    /// Dead time consumed; resume sampling on symbol boundaries
    pub fn finish_alignment(&mut self) {
        if self.state == ReceiverState::Aligning {
            self.previous_index = MARKER;
            self.state = ReceiverState::AccumulatingPreamble;
        }
    }

    fn classify(&self, corrected: &[f32]) -> SyncClass {
        match dominant_tone(corrected) {
            Some((_, power)) if power <= self.min_tone_power => SyncClass::Other,
            Some((MARKER, _)) => SyncClass::Marker,
            Some((i, _)) if i == self.alphabet.max_data_index() => SyncClass::Burst,
            Some((SYNC_TERMINAL, _)) => SyncClass::Terminal,
            _ => SyncClass::Other,
        }
    }

    fn accept(&mut self, index: usize) -> Result<Option<Reception>> {
        let bits = self.alphabet.desymbolize(index)?;
        debug!("accepted tone {} -> {:?}", index, bits);

        if self.state == ReceiverState::AccumulatingPreamble {
            // Bits beyond the preamble are its own padding
            let needed = PREAMBLE_BITS - self.preamble.len();
            self.preamble.extend(bits.iter().take(needed));
            if self.preamble.len() == PREAMBLE_BITS {
                self.message_bits = read_length_preamble(&self.preamble);
                self.transmission_len = transmission_length(self.message_bits, self.correction)?;
                self.payload = Vec::with_capacity(self.transmission_len);
                self.state = ReceiverState::AccumulatingPayload;
                info!(
                    "preamble announces {} message bits, expecting {} transmitted bits",
                    self.message_bits, self.transmission_len
                );
            }
            return Ok(None);
        }

        let needed = self.transmission_len - self.payload.len();
        self.payload.extend(bits.iter().take(needed));
        if self.payload.len() < self.transmission_len {
            return Ok(None);
        }

        self.state = ReceiverState::Done;
        info!("payload complete: {} bits", self.payload.len());
        Ok(Some(Reception {
            message_bits: self.message_bits,
            transmitted: std::mem::take(&mut self.payload),
        }))
    }
}
