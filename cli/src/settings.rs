use clap::ValueEnum;
use serde::Deserialize;
use std::path::Path;
use tonelink_core::{CorrectionClass, ModemConfig};

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correction {
    /// Up to 2 bit errors per frame
    Double,
    /// Up to 3 bit errors per frame
    Triple,
}

impl From<Correction> for CorrectionClass {
    fn from(value: Correction) -> Self {
        match value {
            Correction::Double => CorrectionClass::Double,
            Correction::Triple => CorrectionClass::Triple,
        }
    }
}

/// JSON overlay for `ModemConfig`; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub sample_rate: Option<u32>,
    pub tones: Option<usize>,
    pub tone_duration: Option<f32>,
    pub amplitude: Option<f32>,
    pub base_frequency: Option<f32>,
    pub frequency_step: Option<f32>,
    pub band_half_width: Option<f32>,
    pub calibration_segments: Option<usize>,
    pub correction: Option<Correction>,
    pub max_windows: Option<usize>,
    pub lead_in: Option<f32>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn apply(&self, config: &mut ModemConfig) {
        if let Some(v) = self.sample_rate {
            config.sample_rate = v;
        }
        if let Some(v) = self.tones {
            config.data_tones = v;
        }
        if let Some(v) = self.tone_duration {
            config.tone_duration = v;
        }
        if let Some(v) = self.amplitude {
            config.amplitude = v;
        }
        if let Some(v) = self.base_frequency {
            config.base_frequency = v;
        }
        if let Some(v) = self.frequency_step {
            config.frequency_step = v;
        }
        if let Some(v) = self.band_half_width {
            config.band_half_width = v;
        }
        if let Some(v) = self.calibration_segments {
            config.calibration_segments = v;
        }
        if let Some(v) = self.correction {
            config.correction = v.into();
        }
        if let Some(v) = self.max_windows {
            config.max_windows = v;
        }
        if let Some(v) = self.lead_in {
            config.lead_in = v;
        }
    }
}

/// Flag values that override the defaults and the JSON overlay
#[derive(Debug, Default)]
pub struct Overrides {
    pub tones: Option<usize>,
    pub tone_duration: Option<f32>,
    pub sample_rate: Option<u32>,
    pub correction: Option<Correction>,
}

/// Defaults, then the JSON file, then command-line flags
pub fn resolve(file: Option<&ConfigFile>, overrides: &Overrides) -> Result<ModemConfig, CliError> {
    let mut config = ModemConfig::default();
    if let Some(file) = file {
        file.apply(&mut config);
    }
    if let Some(v) = overrides.tones {
        config.data_tones = v;
    }
    if let Some(v) = overrides.tone_duration {
        config.tone_duration = v;
    }
    if let Some(v) = overrides.sample_rate {
        config.sample_rate = v;
    }
    if let Some(v) = overrides.correction {
        config.correction = v.into();
    }
    config.validate()?;
    Ok(config)
}
