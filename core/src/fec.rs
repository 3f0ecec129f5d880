use crate::error::{ModemError, Result};
use crate::gf2::Gf2Word;
use log::debug;

/// Number of arbitrary bit flips a code can blindly repair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionClass {
    Double,
    Triple,
}

impl CorrectionClass {
    pub fn bits(self) -> usize {
        match self {
            CorrectionClass::Double => 2,
            CorrectionClass::Triple => 3,
        }
    }

    pub fn table(self) -> &'static [PolyRecord] {
        match self {
            CorrectionClass::Double => DOUBLE_ERROR_TABLE,
            CorrectionClass::Triple => TRIPLE_ERROR_TABLE,
        }
    }

    /// Largest message length any table entry accepts
    pub fn max_message_bits(self) -> usize {
        self.table().last().map_or(0, |record| record.capacity)
    }
}

/// One generator polynomial and the longest message it protects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolyRecord {
    pub capacity: usize,
    pub degree: u32,
    /// Full generator, bit `degree` set
    pub generator: u64,
}

const fn record(capacity: usize, degree: u32, generator: u64) -> PolyRecord {
    PolyRecord {
        capacity,
        degree,
        generator,
    }
}

const DOUBLE_ERROR_TABLE: &[PolyRecord] = &[
    record(4, 7, 0xe5),
    record(9, 8, 0x1d7),
    record(13, 9, 0x30b),
    record(21, 10, 0x573),
    record(26, 11, 0xbaf),
    record(53, 12, 0x175d),
    record(113, 14, 0x425b),
    record(136, 15, 0xd51b),
    record(241, 16, 0x15935),
    record(493, 18, 0x72aa7),
    record(494, 19, 0xad0b5),
    record(1005, 20, 0x191513),
];

// Published in Koopman notation; stored expanded as (g << 1) | 1.
const TRIPLE_ERROR_TABLE: &[PolyRecord] = &[
    record(5, 10, 0x537),
    record(12, 11, 0xae3),
    record(13, 14, 0x5153),
    record(16, 15, 0xb7ab),
    record(46, 17, 0x2ea37),
    record(49, 20, 0x11021d),
    record(106, 21, 0x25f54b),
    record(231, 24, 0x1101dcd),
    record(484, 27, 0xa43ec97),
];

/// Generator polynomial and degree of a cyclic code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeParams {
    pub generator: u64,
    pub degree: u32,
}

impl CodeParams {
    pub fn new(generator: u64, degree: u32) -> Result<Self> {
        if degree == 0 || degree > 63 {
            return Err(ModemError::InvalidConfig(format!(
                "generator degree {} outside 1..=63",
                degree
            )));
        }
        if generator >> degree != 1 {
            return Err(ModemError::InvalidConfig(format!(
                "generator {:#x} is not of degree {}",
                generator, degree
            )));
        }
        Ok(Self { generator, degree })
    }

    pub fn remainder(&self, value: &Gf2Word) -> u64 {
        divide(value, self.generator, self.degree)
    }

    /// Remainder of x^i for every bit position below `width`
    fn syndromes(&self, width: usize) -> Vec<u64> {
        let top = 1u64 << self.degree;
        let mut table = Vec::with_capacity(width);
        let mut current = 1u64;
        for _ in 0..width {
            table.push(current);
            current <<= 1;
            if current & top != 0 {
                current ^= self.generator;
            }
        }
        table
    }
}

/// Pick the first table entry whose capacity covers `message_bits`
pub fn select_parameters(message_bits: usize, class: CorrectionClass) -> Result<CodeParams> {
    class
        .table()
        .iter()
        .find(|record| record.capacity >= message_bits)
        .map(|record| CodeParams {
            generator: record.generator,
            degree: record.degree,
        })
        .ok_or(ModemError::CapacityExceeded {
            bits: message_bits,
            max: class.max_message_bits(),
        })
}

/// GF(2) long division, returning the remainder (width < degree)
pub fn divide(value: &Gf2Word, generator: u64, degree: u32) -> u64 {
    let degree = degree as usize;
    let Some(top) = value.highest_set_bit() else {
        return 0;
    };
    let mut rem = value.clone();
    for i in (degree..=top).rev() {
        if rem.bit(i) {
            rem.xor_shifted(generator, i - degree);
        }
    }
    rem.low_bits(degree)
}

/// Every word reachable from `received` by flipping exactly `weight` of its
/// low `width` bits that is divisible by the generator
pub fn find_corrections(
    received: &Gf2Word,
    width: usize,
    params: &CodeParams,
    weight: usize,
) -> Vec<Gf2Word> {
    let syndromes = params.syndromes(width);
    let target = params.remainder(received);
    let mut positions = Vec::with_capacity(weight);
    let mut found = Vec::new();
    search_subsets(&syndromes, target, 0, weight, &mut positions, &mut found);

    found
        .into_iter()
        .map(|flips| {
            let mut candidate = received.clone();
            for i in flips {
                candidate.flip(i);
            }
            debug_assert_eq!(params.remainder(&candidate), 0);
            candidate
        })
        .collect()
}

fn search_subsets(
    syndromes: &[u64],
    residue: u64,
    start: usize,
    remaining: usize,
    positions: &mut Vec<usize>,
    found: &mut Vec<Vec<usize>>,
) {
    if remaining == 0 {
        if residue == 0 {
            found.push(positions.clone());
        }
        return;
    }
    for i in start..syndromes.len() {
        if syndromes.len() - i < remaining {
            break;
        }
        positions.push(i);
        search_subsets(syndromes, residue ^ syndromes[i], i + 1, remaining - 1, positions, found);
        positions.pop();
    }
}

/// Repair up to `max_weight` flipped bits of a `width`-bit received word
///
/// Tries subsets of size `max_weight` first, then smaller sizes down to a
/// single bit, stopping at the first size that yields any candidate. Exactly
/// one candidate must survive.
pub fn correct(received: &Gf2Word, width: usize, params: &CodeParams, max_weight: usize) -> Result<Gf2Word> {
    if params.remainder(received) == 0 {
        return Ok(received.clone());
    }

    for weight in (1..=max_weight).rev() {
        let mut candidates = find_corrections(received, width, params, weight);
        debug!("correction search weight {}: {} candidates", weight, candidates.len());
        match candidates.len() {
            0 => continue,
            1 => return Ok(candidates.remove(0)),
            count => return Err(ModemError::AmbiguousDecoding(count)),
        }
    }

    Err(ModemError::AmbiguousDecoding(0))
}

pub struct FecEncoder {
    class: CorrectionClass,
}

pub struct FecDecoder {
    class: CorrectionClass,
}

impl FecEncoder {
    pub fn new(class: CorrectionClass) -> Self {
        Self { class }
    }

    pub fn class(&self) -> CorrectionClass {
        self.class
    }

    /// Append `degree` redundancy bits so the codeword divides the generator
    pub fn encode(&self, message: &[u8]) -> Result<Vec<u8>> {
        let params = select_parameters(message.len(), self.class)?;
        let degree = params.degree as usize;

        let mut codeword = Gf2Word::from_bits(message)?.shifted_left(degree);
        let remainder = params.remainder(&codeword);
        codeword.xor_shifted(remainder, 0);

        Ok(codeword.to_bits(message.len() + degree))
    }
}

impl FecDecoder {
    pub fn new(class: CorrectionClass) -> Self {
        Self { class }
    }

    pub fn class(&self) -> CorrectionClass {
        self.class
    }

    /// Correct a received codeword and strip its redundancy
    pub fn decode(&self, transmitted: &[u8], message_bits: usize) -> Result<Vec<u8>> {
        let params = select_parameters(message_bits, self.class)?;
        let width = message_bits + params.degree as usize;
        if transmitted.len() != width {
            return Err(ModemError::InvalidFrameSize {
                expected: width,
                actual: transmitted.len(),
            });
        }

        let received = Gf2Word::from_bits(transmitted)?;
        let corrected = correct(&received, width, &params, self.class.bits())?;
        if corrected != received {
            let mut diff = corrected.clone();
            diff ^= &received;
            let flipped = diff.to_bits(width).iter().filter(|&&b| b == 1).count();
            debug!("corrected {} bit errors in {}-bit frame", flipped, width);
        }

        Ok(corrected
            .shifted_right(params.degree as usize)
            .to_bits(message_bits))
    }
}

/// Codeword length for a message of `message_bits` bits
pub fn transmission_length(message_bits: usize, class: CorrectionClass) -> Result<usize> {
    select_parameters(message_bits, class).map(|params| message_bits + params.degree as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flip(bits: &[u8], positions: &[usize]) -> Vec<u8> {
        let mut out = bits.to_vec();
        for &p in positions {
            out[p] ^= 1;
        }
        out
    }

    #[test]
    fn test_tables_are_well_formed() {
        for class in [CorrectionClass::Double, CorrectionClass::Triple] {
            let table = class.table();
            for pair in table.windows(2) {
                assert!(pair[0].capacity < pair[1].capacity);
            }
            for record in table {
                assert!(CodeParams::new(record.generator, record.degree).is_ok());
            }
        }
        assert_eq!(CorrectionClass::Double.max_message_bits(), 1005);
        assert_eq!(CorrectionClass::Triple.max_message_bits(), 484);
    }

    #[test]
    fn test_select_parameters_boundary() {
        let params = select_parameters(1005, CorrectionClass::Double).unwrap();
        assert_eq!(params.degree, 20);
        assert_eq!(params.generator, 0x191513);

        match select_parameters(1006, CorrectionClass::Double) {
            Err(ModemError::CapacityExceeded { bits, max }) => {
                assert_eq!(bits, 1006);
                assert_eq!(max, 1005);
            }
            other => panic!("expected CapacityExceeded, got {:?}", other),
        }
        assert!(select_parameters(485, CorrectionClass::Triple).is_err());
    }

    #[test]
    fn test_select_parameters_smallest_fit() {
        assert_eq!(select_parameters(0, CorrectionClass::Double).unwrap().degree, 7);
        assert_eq!(select_parameters(4, CorrectionClass::Double).unwrap().degree, 7);
        assert_eq!(select_parameters(5, CorrectionClass::Double).unwrap().degree, 8);
        assert_eq!(select_parameters(494, CorrectionClass::Double).unwrap().degree, 19);
        assert_eq!(select_parameters(6, CorrectionClass::Triple).unwrap().degree, 11);
    }

    #[test]
    fn test_divide_small_values() {
        // x^7 mod (x^7 + x^6 + x^5 + x^2 + 1) = x^6 + x^5 + x^2 + 1
        let value = Gf2Word::from_bits(&[1, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(divide(&value, 0xe5, 7), 0x65);
        // The generator divides itself
        let generator = Gf2Word::from_bits(&[1, 1, 1, 0, 0, 1, 0, 1]).unwrap();
        assert_eq!(divide(&generator, 0xe5, 7), 0);
        // Values below the degree are their own remainder
        let small = Gf2Word::from_bits(&[1, 0, 1]).unwrap();
        assert_eq!(divide(&small, 0xe5, 7), 0b101);
        assert_eq!(divide(&Gf2Word::zero(), 0xe5, 7), 0);
    }

    #[test]
    fn test_code_params_validation() {
        assert!(CodeParams::new(0xe5, 7).is_ok());
        assert!(CodeParams::new(0x65, 7).is_err());
        assert!(CodeParams::new(0x1, 0).is_err());
    }

    #[test]
    fn test_scenario_1011() {
        let encoder = FecEncoder::new(CorrectionClass::Double);
        let decoder = FecDecoder::new(CorrectionClass::Double);
        let message = vec![1, 0, 1, 1];

        let codeword = encoder.encode(&message).unwrap();
        assert_eq!(codeword.len(), 11);
        assert_eq!(&codeword[..4], &message[..]);
        let word = Gf2Word::from_bits(&codeword).unwrap();
        assert_eq!(divide(&word, 0xe5, 7), 0);

        for i in 0..codeword.len() {
            for j in (i + 1)..codeword.len() {
                let corrupted = flip(&codeword, &[i, j]);
                assert_eq!(
                    decoder.decode(&corrupted, 4).unwrap(),
                    message,
                    "flips at {} and {}",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn test_roundtrip_without_errors() {
        let encoder = FecEncoder::new(CorrectionClass::Double);
        let decoder = FecDecoder::new(CorrectionClass::Double);
        for len in [0usize, 1, 4, 5, 13, 21, 31, 64, 200] {
            let message: Vec<u8> = (0..len).map(|i| ((i * 7 + 3) % 5 % 2) as u8).collect();
            let codeword = encoder.encode(&message).unwrap();
            assert_eq!(codeword.len(), transmission_length(len, CorrectionClass::Double).unwrap());
            assert_eq!(decoder.decode(&codeword, len).unwrap(), message, "length {}", len);
        }
    }

    #[test]
    fn test_single_bit_fallback() {
        let encoder = FecEncoder::new(CorrectionClass::Double);
        let decoder = FecDecoder::new(CorrectionClass::Double);
        let message = vec![1, 1, 0, 1, 0, 0, 1, 0, 1, 1, 1, 0, 0, 1, 0, 1, 1];
        let codeword = encoder.encode(&message).unwrap();
        for i in 0..codeword.len() {
            assert_eq!(decoder.decode(&flip(&codeword, &[i]), message.len()).unwrap(), message);
        }
    }

    #[test]
    fn test_double_errors_on_longer_message() {
        let encoder = FecEncoder::new(CorrectionClass::Double);
        let decoder = FecDecoder::new(CorrectionClass::Double);
        let message: Vec<u8> = (0..21).map(|i| (i % 3 == 0) as u8).collect();
        let codeword = encoder.encode(&message).unwrap();
        assert_eq!(codeword.len(), 31);
        for i in 0..codeword.len() {
            for j in (i + 1)..codeword.len() {
                let corrupted = flip(&codeword, &[i, j]);
                assert_eq!(decoder.decode(&corrupted, message.len()).unwrap(), message);
            }
        }
    }

    #[test]
    fn test_triple_class_corrects_every_triple() {
        let encoder = FecEncoder::new(CorrectionClass::Triple);
        let decoder = FecDecoder::new(CorrectionClass::Triple);
        let message = vec![1, 0, 0, 1, 1];
        let codeword = encoder.encode(&message).unwrap();
        assert_eq!(codeword.len(), 15);

        let n = codeword.len();
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    let corrupted = flip(&codeword, &[i, j, k]);
                    assert_eq!(decoder.decode(&corrupted, 5).unwrap(), message);
                }
            }
        }
    }

    #[test]
    fn test_triple_class_still_corrects_pairs_and_singles() {
        let encoder = FecEncoder::new(CorrectionClass::Triple);
        let decoder = FecDecoder::new(CorrectionClass::Triple);
        let message: Vec<u8> = vec![0, 1, 1, 0, 1, 0, 0, 0, 1, 1, 1, 0];
        let codeword = encoder.encode(&message).unwrap();
        let n = codeword.len();
        for i in 0..n {
            assert_eq!(decoder.decode(&flip(&codeword, &[i]), 12).unwrap(), message);
            for j in (i + 1)..n {
                assert_eq!(decoder.decode(&flip(&codeword, &[i, j]), 12).unwrap(), message);
            }
        }
    }

    #[test]
    fn test_ambiguity_is_reported() {
        // x + 1 only detects odd parity: every single flip of an odd-weight
        // word is a valid codeword, and no pair flip is.
        let params = CodeParams::new(0b11, 1).unwrap();
        let received = Gf2Word::from_bits(&[1, 0, 1, 1, 0, 0]).unwrap();
        match correct(&received, 6, &params, 2) {
            Err(ModemError::AmbiguousDecoding(count)) => assert_eq!(count, 6),
            other => panic!("expected AmbiguousDecoding, got {:?}", other),
        }
    }

    #[test]
    fn test_ambiguity_with_two_codewords_in_radius() {
        // x^2 + x + 1 has minimum distance 2, so several codewords sit two
        // flips away from 0b110000.
        let params = CodeParams::new(0b111, 2).unwrap();
        let received = Gf2Word::from_bits(&[1, 1, 0, 0, 0, 0]).unwrap();
        assert_eq!(params.remainder(&received), 0b1);
        let candidates = find_corrections(&received, 6, &params, 2);
        assert_eq!(candidates.len(), 4);
        match correct(&received, 6, &params, 2) {
            Err(ModemError::AmbiguousDecoding(count)) => assert_eq!(count, candidates.len()),
            other => panic!("expected AmbiguousDecoding, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let decoder = FecDecoder::new(CorrectionClass::Double);
        match decoder.decode(&[0u8; 10], 4) {
            Err(ModemError::InvalidFrameSize { expected, actual }) => {
                assert_eq!(expected, 11);
                assert_eq!(actual, 10);
            }
            other => panic!("expected InvalidFrameSize, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_rejects_oversized_message() {
        let encoder = FecEncoder::new(CorrectionClass::Triple);
        assert!(matches!(
            encoder.encode(&vec![0u8; 485]),
            Err(ModemError::CapacityExceeded { bits: 485, max: 484 })
        ));
    }
}
