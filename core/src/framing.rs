use crate::error::{ModemError, Result};
use crate::tones::ToneAlphabet;

/// Width of the length preamble in bits
pub const PREAMBLE_BITS: usize = 5;

/// Longest message the preamble can announce
pub const MAX_ANNOUNCED_BITS: usize = (1 << PREAMBLE_BITS) - 1;

/// Max-tone repetitions at the start of the sync burst
pub const SYNC_BURST_LEN: usize = 5;

/// Tone index closing the sync burst
pub const SYNC_TERMINAL: usize = 1;

/// MSB-first 5-bit encoding of the message length
pub fn length_preamble(message_bits: usize) -> Result<Vec<u8>> {
    if message_bits > MAX_ANNOUNCED_BITS {
        return Err(ModemError::CapacityExceeded {
            bits: message_bits,
            max: MAX_ANNOUNCED_BITS,
        });
    }
    Ok((0..PREAMBLE_BITS)
        .rev()
        .map(|i| ((message_bits >> i) & 1) as u8)
        .collect())
}

pub fn read_length_preamble(bits: &[u8]) -> usize {
    bits.iter().fold(0usize, |acc, &b| (acc << 1) | (b & 1) as usize)
}

pub fn sync_pattern(alphabet: &ToneAlphabet) -> Vec<usize> {
    let mut pattern = vec![alphabet.max_data_index(); SYNC_BURST_LEN];
    pattern.push(SYNC_TERMINAL);
    pattern
}

/// A message announcement plus its (possibly corrupted) codeword
pub struct Frame {
    pub message_bits: usize,
    pub codeword: Vec<u8>,
}

pub struct FrameEncoder;

impl FrameEncoder {
    /// Tone indices: sync burst, then the preamble and the codeword, each
    /// grouped into symbols on its own
    pub fn encode(frame: &Frame, alphabet: &ToneAlphabet) -> Result<Vec<usize>> {
        let preamble = length_preamble(frame.message_bits)?;

        let mut symbols = sync_pattern(alphabet);
        symbols.extend(alphabet.symbolize(&preamble));
        symbols.extend(alphabet.symbolize(&frame.codeword));
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_preamble() {
        assert_eq!(length_preamble(4).unwrap(), vec![0, 0, 1, 0, 0]);
        assert_eq!(length_preamble(31).unwrap(), vec![1; 5]);
        assert_eq!(read_length_preamble(&[0, 0, 1, 0, 0]), 4);
        assert!(matches!(
            length_preamble(32),
            Err(ModemError::CapacityExceeded { bits: 32, max: 31 })
        ));
    }

    #[test]
    fn test_frame_layout_base4() {
        let alphabet = ToneAlphabet::new(4, 800.0, 200.0).unwrap();
        let frame = Frame {
            message_bits: 4,
            codeword: vec![1, 0, 1, 1, 0, 0, 0, 1, 1, 1, 1],
        };
        let symbols = FrameEncoder::encode(&frame, &alphabet).unwrap();
        // sync, preamble 00|10|0_, codeword 10|11|00|01|11|1_
        assert_eq!(symbols, vec![4, 4, 4, 4, 4, 1, 1, 3, 1, 3, 4, 1, 2, 4, 3]);
    }

    #[test]
    fn test_frame_layout_base64() {
        let alphabet = ToneAlphabet::new(64, 800.0, 200.0).unwrap();
        let frame = Frame {
            message_bits: 31,
            codeword: vec![1; 6],
        };
        let symbols = FrameEncoder::encode(&frame, &alphabet).unwrap();
        assert_eq!(symbols, vec![64, 64, 64, 64, 64, 1, 63, 64]);
    }
}
