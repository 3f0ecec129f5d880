use crate::error::{ModemError, Result};
use crate::fec::CorrectionClass;
use crate::{
    BAND_HALF_WIDTH_HZ, BASE_FREQUENCY_HZ, CALIBRATION_SEGMENTS, CALIBRATION_SEGMENT_SECS,
    DEFAULT_DATA_TONES, DEFAULT_TONE_SECS, FREQUENCY_STEP_HZ, SAMPLE_RATE,
};

/// Tunables shared by sender and receiver
///
/// Both ends must agree on every field except the receive-only ones
/// (`calibration_*`, `spectrum_segment`, `min_tone_power`, `max_windows`).
#[derive(Debug, Clone, PartialEq)]
pub struct ModemConfig {
    pub sample_rate: u32,
    /// Number of data tones M (a power of two); the marker is extra
    pub data_tones: usize,
    /// Duration of each data tone and of each marker tone, in seconds
    pub tone_duration: f32,
    pub amplitude: f32,
    pub base_frequency: f32,
    pub frequency_step: f32,
    pub band_half_width: f32,
    /// Welch segment length in samples
    pub spectrum_segment: usize,
    pub calibration_segments: usize,
    pub calibration_segment_duration: f32,
    /// Detection windows per symbol period (data tone + marker tone)
    pub windows_per_symbol: usize,
    /// Dead time after sync as a fraction of one symbol period
    pub alignment_ratio: f32,
    /// Max-tone/marker alternations required before the terminal sync tone
    pub sync_transitions: usize,
    pub min_tone_power: f32,
    pub correction: CorrectionClass,
    /// Iteration budget of one receive session, in windows
    pub max_windows: usize,
    /// Silence placed before the frame by the encoder, in seconds
    pub lead_in: f32,
}

impl Default for ModemConfig {
    fn default() -> Self {
        let calibration = CALIBRATION_SEGMENTS as f32 * CALIBRATION_SEGMENT_SECS;
        Self {
            sample_rate: SAMPLE_RATE,
            data_tones: DEFAULT_DATA_TONES,
            tone_duration: DEFAULT_TONE_SECS,
            amplitude: 0.8,
            base_frequency: BASE_FREQUENCY_HZ,
            frequency_step: FREQUENCY_STEP_HZ,
            band_half_width: BAND_HALF_WIDTH_HZ,
            spectrum_segment: 512,
            calibration_segments: CALIBRATION_SEGMENTS,
            calibration_segment_duration: CALIBRATION_SEGMENT_SECS,
            windows_per_symbol: 10,
            alignment_ratio: 0.9,
            sync_transitions: 4,
            min_tone_power: 1e-9,
            correction: CorrectionClass::Double,
            max_windows: 100_000,
            lead_in: calibration + 0.25,
        }
    }
}

impl ModemConfig {
    fn seconds_to_samples(&self, seconds: f32) -> usize {
        (seconds * self.sample_rate as f32).round() as usize
    }

    pub fn tone_samples(&self) -> usize {
        self.seconds_to_samples(self.tone_duration)
    }

    /// Samples in one data tone plus its marker
    pub fn symbol_period_samples(&self) -> usize {
        2 * self.tone_samples()
    }

    pub fn window_samples(&self) -> usize {
        self.symbol_period_samples() / self.windows_per_symbol.max(1)
    }

    pub fn alignment_samples(&self) -> usize {
        (self.symbol_period_samples() as f32 * self.alignment_ratio).round() as usize
    }

    pub fn calibration_segment_samples(&self) -> usize {
        self.seconds_to_samples(self.calibration_segment_duration)
    }

    pub fn calibration_samples(&self) -> usize {
        self.calibration_segment_samples() * self.calibration_segments
    }

    pub fn lead_in_samples(&self) -> usize {
        self.seconds_to_samples(self.lead_in)
    }

    pub fn bits_per_symbol(&self) -> usize {
        self.data_tones.trailing_zeros() as usize
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ModemError::InvalidConfig(msg));

        if self.sample_rate == 0 {
            return invalid("sample rate must be positive".into());
        }
        if self.data_tones < 2 || !self.data_tones.is_power_of_two() {
            return invalid(format!(
                "data tone count {} must be a power of two >= 2",
                self.data_tones
            ));
        }
        if !(self.tone_duration > 0.0) || !(self.calibration_segment_duration > 0.0) {
            return invalid("durations must be positive".into());
        }
        if !(self.amplitude > 0.0 && self.amplitude <= 1.0) {
            return invalid(format!("amplitude {} outside (0, 1]", self.amplitude));
        }
        if self.windows_per_symbol == 0 || self.window_samples() == 0 {
            return invalid("detection window is shorter than one sample".into());
        }
        if self.calibration_segments == 0 || self.calibration_segment_samples() == 0 {
            return invalid("calibration needs at least one non-empty segment".into());
        }
        if self.spectrum_segment < 2 {
            return invalid("spectrum segment must hold at least two samples".into());
        }
        if self.sync_transitions == 0 {
            return invalid("sync transitions must be at least one".into());
        }
        if !(self.alignment_ratio >= 0.0) {
            return invalid("alignment ratio must be non-negative".into());
        }
        let top = self.base_frequency + self.frequency_step * self.data_tones as f32;
        if self.base_frequency <= 0.0 || self.frequency_step <= 0.0 {
            return invalid("tone frequencies must be positive".into());
        }
        if top + self.band_half_width >= self.sample_rate as f32 / 2.0 {
            return invalid(format!(
                "top tone {} Hz does not fit below Nyquist at {} Hz",
                top, self.sample_rate
            ));
        }
        if self.lead_in_samples() < self.calibration_samples() {
            return invalid(format!(
                "lead-in of {} s is shorter than the calibration phase",
                self.lead_in
            ));
        }
        Ok(())
    }
}
