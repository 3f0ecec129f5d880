use crate::error::{ModemError, Result};

/// Ambient baseline power per tone, measured once per receive session
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseProfile {
    baseline: Vec<f32>,
}

impl NoiseProfile {
    pub fn from_baseline(baseline: Vec<f32>) -> Self {
        Self { baseline }
    }

    /// A profile that leaves powers untouched
    pub fn silent(tone_count: usize) -> Self {
        Self {
            baseline: vec![0.0; tone_count],
        }
    }

    pub fn baseline(&self) -> &[f32] {
        &self.baseline
    }

    /// |power - baseline| per tone
    pub fn correct(&self, powers: &[f32]) -> Result<Vec<f32>> {
        if powers.len() != self.baseline.len() {
            return Err(ModemError::MalformedInput(format!(
                "expected {} tone powers, got {}",
                self.baseline.len(),
                powers.len()
            )));
        }
        Ok(powers
            .iter()
            .zip(self.baseline.iter())
            .map(|(p, n)| (p - n).abs())
            .collect())
    }
}

/// Averages band powers over the calibration segments
pub struct NoiseCalibrator {
    sums: Vec<f64>,
    segments: usize,
}

impl NoiseCalibrator {
    pub fn new(tone_count: usize) -> Self {
        Self {
            sums: vec![0.0; tone_count],
            segments: 0,
        }
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn add_segment(&mut self, powers: &[f32]) -> Result<()> {
        if powers.len() != self.sums.len() {
            return Err(ModemError::MalformedInput(format!(
                "expected {} tone powers, got {}",
                self.sums.len(),
                powers.len()
            )));
        }
        for (sum, &p) in self.sums.iter_mut().zip(powers.iter()) {
            *sum += p as f64;
        }
        self.segments += 1;
        Ok(())
    }

    pub fn finish(&self) -> NoiseProfile {
        let count = self.segments.max(1) as f64;
        NoiseProfile {
            baseline: self.sums.iter().map(|&s| (s / count) as f32).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibrator_averages_segments() {
        let mut calibrator = NoiseCalibrator::new(3);
        calibrator.add_segment(&[1.0, 2.0, 0.0]).unwrap();
        calibrator.add_segment(&[3.0, 2.0, 1.0]).unwrap();
        assert_eq!(calibrator.segments(), 2);
        assert_eq!(calibrator.finish().baseline(), &[2.0, 2.0, 0.5]);
    }

    #[test]
    fn test_correct_is_absolute_difference() {
        let profile = NoiseProfile::from_baseline(vec![1.0, 0.5, 0.0]);
        assert_eq!(profile.correct(&[0.25, 2.5, 3.0]).unwrap(), vec![0.75, 2.0, 3.0]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let profile = NoiseProfile::silent(5);
        assert!(profile.correct(&[0.0; 4]).is_err());
        let mut calibrator = NoiseCalibrator::new(5);
        assert!(calibrator.add_segment(&[0.0; 6]).is_err());
    }
}
