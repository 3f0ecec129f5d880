use crate::config::ModemConfig;
use crate::error::{ModemError, Result};

/// Index of the marker tone that separates every data tone
pub const MARKER: usize = 0;

/// M data tones plus the marker, linearly spaced from the base frequency
///
/// Index 0 is the marker; index `v + 1` carries the k-bit value `v`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneAlphabet {
    data_tones: usize,
    bits_per_symbol: usize,
    base_frequency: f32,
    frequency_step: f32,
}

impl ToneAlphabet {
    pub fn new(data_tones: usize, base_frequency: f32, frequency_step: f32) -> Result<Self> {
        if data_tones < 2 || !data_tones.is_power_of_two() {
            return Err(ModemError::InvalidConfig(format!(
                "data tone count {} must be a power of two >= 2",
                data_tones
            )));
        }
        Ok(Self {
            data_tones,
            bits_per_symbol: data_tones.trailing_zeros() as usize,
            base_frequency,
            frequency_step,
        })
    }

    pub fn from_config(config: &ModemConfig) -> Result<Self> {
        Self::new(config.data_tones, config.base_frequency, config.frequency_step)
    }

    pub fn data_tones(&self) -> usize {
        self.data_tones
    }

    pub fn bits_per_symbol(&self) -> usize {
        self.bits_per_symbol
    }

    /// Marker plus data tones
    pub fn tone_count(&self) -> usize {
        self.data_tones + 1
    }

    pub fn max_data_index(&self) -> usize {
        self.data_tones
    }

    pub fn frequency(&self, index: usize) -> f32 {
        self.base_frequency + index as f32 * self.frequency_step
    }

    pub fn frequencies(&self) -> Vec<f32> {
        (0..self.tone_count()).map(|i| self.frequency(i)).collect()
    }

    /// Group bits into k-bit big-endian chunks (zero-padded on the right) and
    /// map each chunk to its tone index
    pub fn symbolize(&self, bits: &[u8]) -> Vec<usize> {
        let k = self.bits_per_symbol;
        bits.chunks(k)
            .map(|chunk| {
                let value = (0..k).fold(0usize, |acc, i| {
                    (acc << 1) | chunk.get(i).map_or(0, |&b| (b & 1) as usize)
                });
                value + 1
            })
            .collect()
    }

    /// k-bit big-endian expansion of a data tone index
    pub fn desymbolize(&self, index: usize) -> Result<Vec<u8>> {
        if index == MARKER || index > self.data_tones {
            return Err(ModemError::MalformedInput(format!(
                "tone index {} is not a data tone",
                index
            )));
        }
        let value = index - 1;
        let k = self.bits_per_symbol;
        Ok((0..k).rev().map(|i| ((value >> i) & 1) as u8).collect())
    }
}
