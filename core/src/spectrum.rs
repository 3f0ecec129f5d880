use crate::config::ModemConfig;
use crate::tones::ToneAlphabet;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f32::consts::PI;

/// Welch power spectral density estimate
pub struct Periodogram {
    pub frequencies: Vec<f32>,
    pub density: Vec<f32>,
}

/// Integrates a Welch periodogram over a band around every tone
///
/// Segments are Hann-windowed with 50% overlap and mean-removed; density is
/// one-sided. Segment length is clamped to the analysed window.
pub struct BandPowerEstimator {
    planner: FftPlanner<f32>,
    sample_rate: f32,
    segment: usize,
    band_half_width: f32,
    tone_frequencies: Vec<f32>,
}

impl BandPowerEstimator {
    pub fn new(config: &ModemConfig, alphabet: &ToneAlphabet) -> Self {
        Self {
            planner: FftPlanner::new(),
            sample_rate: config.sample_rate as f32,
            segment: config.spectrum_segment,
            band_half_width: config.band_half_width,
            tone_frequencies: alphabet.frequencies(),
        }
    }

    pub fn tone_count(&self) -> usize {
        self.tone_frequencies.len()
    }

    pub fn periodogram(&mut self, samples: &[f32]) -> Periodogram {
        let nperseg = self.segment.min(samples.len());
        if nperseg < 2 {
            return Periodogram {
                frequencies: Vec::new(),
                density: Vec::new(),
            };
        }
        let noverlap = nperseg / 2;
        let step = nperseg - noverlap;
        let segments = (samples.len() - noverlap) / step;

        let window: Vec<f32> = (0..nperseg)
            .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / nperseg as f32).cos())
            .collect();
        let window_energy: f32 = window.iter().map(|w| w * w).sum();
        let scale = 1.0 / (self.sample_rate * window_energy);

        let bins = nperseg / 2 + 1;
        let fft = self.planner.plan_fft_forward(nperseg);
        let mut density = vec![0.0f32; bins];
        let mut buffer = vec![Complex::new(0.0f32, 0.0); nperseg];

        for seg in 0..segments {
            let chunk = &samples[seg * step..seg * step + nperseg];
            let mean = chunk.iter().sum::<f32>() / nperseg as f32;
            for ((slot, &s), &w) in buffer.iter_mut().zip(chunk.iter()).zip(window.iter()) {
                *slot = Complex::new((s - mean) * w, 0.0);
            }
            fft.process(&mut buffer);
            for (k, value) in buffer.iter().take(bins).enumerate() {
                density[k] += value.norm_sqr();
            }
        }

        let nyquist_bin = if nperseg % 2 == 0 { Some(bins - 1) } else { None };
        for (k, value) in density.iter_mut().enumerate() {
            let one_sided = if k == 0 || Some(k) == nyquist_bin { 1.0 } else { 2.0 };
            *value *= scale * one_sided / segments as f32;
        }

        let frequencies = (0..bins)
            .map(|k| k as f32 * self.sample_rate / nperseg as f32)
            .collect();
        Periodogram {
            frequencies,
            density,
        }
    }

    /// Power within ± band half-width of each tone, indexed like the alphabet
    pub fn band_powers(&mut self, samples: &[f32]) -> Vec<f32> {
        let psd = self.periodogram(samples);
        self.tone_frequencies
            .iter()
            .map(|&center| {
                psd.frequencies
                    .iter()
                    .zip(psd.density.iter())
                    .filter(|(&f, _)| (f - center).abs() <= self.band_half_width)
                    .map(|(_, &p)| p)
                    .sum()
            })
            .collect()
    }
}

/// Index of the first maximum, like a plain argmax
pub fn dominant_tone(powers: &[f32]) -> Option<(usize, f32)> {
    powers
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, p)| match best {
            Some((_, bp)) if p <= bp => best,
            _ => Some((i, p)),
        })
}
