use crate::config::ModemConfig;
use crate::error::{ModemError, Result};
use crate::tones::{ToneAlphabet, MARKER};
use std::f32::consts::PI;

// M-ary tone + marker line code
//
// Every symbol (sync and data alike) is sent as a constant-frequency sine of
// one tone duration followed by the marker tone for the same duration, so
// each data tone is bounded by a drop back to the marker on both sides no
// matter how often a value repeats.

/// Constant-frequency sine starting at phase zero
pub fn generate_tone(frequency: f32, num_samples: usize, sample_rate: f32, amplitude: f32) -> Vec<f32> {
    let angular_freq = 2.0 * PI * frequency / sample_rate;
    (0..num_samples)
        .map(|i| amplitude * (angular_freq * i as f32).sin())
        .collect()
}

pub struct FskModulator {
    alphabet: ToneAlphabet,
    sample_rate: f32,
    tone_samples: usize,
    amplitude: f32,
}

impl FskModulator {
    pub fn new(config: &ModemConfig) -> Result<Self> {
        Ok(Self {
            alphabet: ToneAlphabet::from_config(config)?,
            sample_rate: config.sample_rate as f32,
            tone_samples: config.tone_samples(),
            amplitude: config.amplitude,
        })
    }

    pub fn alphabet(&self) -> &ToneAlphabet {
        &self.alphabet
    }

    /// Samples produced per symbol (tone + marker)
    pub fn samples_per_symbol(&self) -> usize {
        2 * self.tone_samples
    }

    /// Render frame symbols as audio
    pub fn modulate(&self, symbols: &[usize]) -> Result<Vec<f32>> {
        if let Some(&bad) = symbols.iter().find(|&&s| s > self.alphabet.max_data_index()) {
            return Err(ModemError::MalformedInput(format!(
                "tone index {} outside alphabet of {} tones",
                bad,
                self.alphabet.tone_count()
            )));
        }

        let marker = self.tone(MARKER);
        let mut samples = Vec::with_capacity(symbols.len() * self.samples_per_symbol());
        for &symbol in symbols {
            samples.extend(self.tone(symbol));
            samples.extend_from_slice(&marker);
        }
        Ok(samples)
    }

    fn tone(&self, index: usize) -> Vec<f32> {
        generate_tone(
            self.alphabet.frequency(index),
            self.tone_samples,
            self.sample_rate,
            self.amplitude,
        )
    }
}
