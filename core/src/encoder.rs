use crate::config::ModemConfig;
use crate::error::{ModemError, Result};
use crate::fec::{transmission_length, FecEncoder};
use crate::framing::{length_preamble, Frame, FrameEncoder};
use crate::fsk::FskModulator;
use log::{debug, info};

/// Message bits to audio: FEC codeword, sync and preamble framing, tone
/// rendering, preceded by silence the receiver calibrates against
pub struct Encoder {
    config: ModemConfig,
    fec: FecEncoder,
    fsk: FskModulator,
}

impl Encoder {
    pub fn new(config: ModemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fec: FecEncoder::new(config.correction),
            fsk: FskModulator::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// Error-correcting codeword for `message`
    pub fn codeword(&self, message: &[u8]) -> Result<Vec<u8>> {
        length_preamble(message.len())?;
        self.fec.encode(message)
    }

    pub fn encode(&self, message: &[u8]) -> Result<Vec<f32>> {
        let codeword = self.codeword(message)?;
        self.encode_codeword(message.len(), &codeword)
    }

    /// Frame and render a codeword that may have been tampered with
    pub fn encode_codeword(&self, message_bits: usize, codeword: &[u8]) -> Result<Vec<f32>> {
        let expected = transmission_length(message_bits, self.config.correction)?;
        if codeword.len() != expected {
            return Err(ModemError::InvalidFrameSize {
                expected,
                actual: codeword.len(),
            });
        }

        let frame = Frame {
            message_bits,
            codeword: codeword.to_vec(),
        };
        let symbols = FrameEncoder::encode(&frame, self.fsk.alphabet())?;
        debug!("frame symbols: {:?}", symbols);

        let mut samples = vec![0.0f32; self.config.lead_in_samples()];
        samples.extend(self.fsk.modulate(&symbols)?);
        info!(
            "encoded {} message bits as {} symbols ({:.2} s)",
            message_bits,
            symbols.len(),
            samples.len() as f32 / self.config.sample_rate as f32
        );
        Ok(samples)
    }
}

/// Flip the bit at `floor(f * len)` for each fraction `f` in `[0, 1)`
///
/// Returns the flipped positions. Repeated positions flip twice.
pub fn inject_bit_errors(bits: &mut [u8], fractions: &[f64]) -> Result<Vec<usize>> {
    if let Some(&bad) = fractions.iter().find(|f| !(0.0..1.0).contains(*f)) {
        return Err(ModemError::MalformedInput(format!(
            "error position {} outside [0, 1)",
            bad
        )));
    }
    if bits.is_empty() && !fractions.is_empty() {
        return Err(ModemError::MalformedInput(
            "cannot inject errors into an empty codeword".into(),
        ));
    }

    let positions: Vec<usize> = fractions
        .iter()
        .map(|f| ((f * bits.len() as f64).floor() as usize).min(bits.len() - 1))
        .collect();
    for &pos in &positions {
        bits[pos] ^= 1;
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base4() -> Encoder {
        Encoder::new(ModemConfig {
            data_tones: 4,
            ..ModemConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_codeword_for_1011() {
        let encoder = base4();
        assert_eq!(
            encoder.codeword(&[1, 0, 1, 1]).unwrap(),
            vec![1, 0, 1, 1, 0, 0, 1, 0, 0, 1, 1]
        );
    }

    #[test]
    fn test_encode_length() {
        let encoder = base4();
        let samples = encoder.encode(&[1, 0, 1, 1]).unwrap();
        let config = encoder.config();
        // 6 sync + 3 preamble + 6 codeword symbols
        assert_eq!(
            samples.len(),
            config.lead_in_samples() + 15 * config.symbol_period_samples()
        );
        assert!(samples[..config.lead_in_samples()].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_message_too_long_for_preamble() {
        let encoder = base4();
        assert!(matches!(
            encoder.encode(&[1; 32]),
            Err(ModemError::CapacityExceeded { bits: 32, max: 31 })
        ));
    }

    #[test]
    fn test_encode_codeword_checks_length() {
        let encoder = base4();
        assert!(matches!(
            encoder.encode_codeword(4, &[1, 0, 1]),
            Err(ModemError::InvalidFrameSize {
                expected: 11,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_inject_bit_errors_uses_floor() {
        let mut bits = vec![0u8; 11];
        let positions = inject_bit_errors(&mut bits, &[0.5, 0.99]).unwrap();
        assert_eq!(positions, vec![5, 10]);
        assert_eq!(bits, vec![0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1]);

        let positions = inject_bit_errors(&mut bits, &[0.0, 0.5]).unwrap();
        assert_eq!(positions, vec![0, 5]);
        assert_eq!(bits[0], 1);
        assert_eq!(bits[5], 0);
    }

    #[test]
    fn test_inject_bit_errors_rejects_out_of_range() {
        let mut bits = vec![0u8; 4];
        assert!(inject_bit_errors(&mut bits, &[1.0]).is_err());
        assert!(inject_bit_errors(&mut bits, &[-0.1]).is_err());
        assert!(inject_bit_errors(&mut [], &[0.2]).is_err());
        assert!(inject_bit_errors(&mut bits, &[]).unwrap().is_empty());
    }
}
