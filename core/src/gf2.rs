use crate::error::{ModemError, Result};
use std::ops::BitXorAssign;

/// Arbitrary-width binary polynomial / unsigned integer over GF(2)
///
/// Bit `i` is the coefficient of x^i. Limbs are stored little-endian and
/// trailing zero limbs are trimmed so equal values compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gf2Word {
    limbs: Vec<u64>,
}

impl Gf2Word {
    pub fn zero() -> Self {
        Self { limbs: Vec::new() }
    }

    /// Build a word from MSB-first bits (each element 0 or 1)
    pub fn from_bits(bits: &[u8]) -> Result<Self> {
        let mut word = Self {
            limbs: vec![0u64; bits.len().div_ceil(64)],
        };
        let width = bits.len();
        for (pos, &bit) in bits.iter().enumerate() {
            match bit {
                0 => {}
                1 => word.set(width - 1 - pos),
                other => {
                    return Err(ModemError::MalformedInput(format!(
                        "bit value {} at position {}",
                        other, pos
                    )))
                }
            }
        }
        word.normalize();
        Ok(word)
    }

    /// Expand to exactly `width` MSB-first bits (higher bits are dropped)
    pub fn to_bits(&self, width: usize) -> Vec<u8> {
        (0..width).rev().map(|i| self.bit(i) as u8).collect()
    }

    pub fn bit(&self, index: usize) -> bool {
        self.limbs
            .get(index / 64)
            .is_some_and(|limb| (limb >> (index % 64)) & 1 == 1)
    }

    pub fn flip(&mut self, index: usize) {
        self.ensure_limbs(index / 64 + 1);
        self.limbs[index / 64] ^= 1u64 << (index % 64);
        self.normalize();
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    pub fn highest_set_bit(&self) -> Option<usize> {
        let (idx, limb) = self.limbs.iter().enumerate().rev().find(|(_, &l)| l != 0)?;
        Some(idx * 64 + 63 - limb.leading_zeros() as usize)
    }

    pub fn shifted_left(&self, shift: usize) -> Self {
        let mut out = Self::zero();
        for (idx, &limb) in self.limbs.iter().enumerate() {
            out.xor_shifted(limb, idx * 64 + shift);
        }
        out
    }

    pub fn shifted_right(&self, shift: usize) -> Self {
        let Some(top) = self.highest_set_bit() else {
            return Self::zero();
        };
        let mut out = Self::zero();
        for i in shift..=top {
            if self.bit(i) {
                out.set(i - shift);
            }
        }
        out.normalize();
        out
    }

    /// XOR `mask << shift` into the word
    pub fn xor_shifted(&mut self, mask: u64, shift: usize) {
        if mask == 0 {
            return;
        }
        let limb = shift / 64;
        let offset = shift % 64;
        self.ensure_limbs(limb + 2);
        self.limbs[limb] ^= mask << offset;
        if offset > 0 {
            self.limbs[limb + 1] ^= mask >> (64 - offset);
        }
        self.normalize();
    }

    /// Low `count` bits as an integer (count <= 64)
    pub fn low_bits(&self, count: usize) -> u64 {
        let low = self.limbs.first().copied().unwrap_or(0);
        if count >= 64 {
            low
        } else {
            low & ((1u64 << count) - 1)
        }
    }

    fn set(&mut self, index: usize) {
        self.ensure_limbs(index / 64 + 1);
        self.limbs[index / 64] |= 1u64 << (index % 64);
    }

    fn ensure_limbs(&mut self, count: usize) {
        if self.limbs.len() < count {
            self.limbs.resize(count, 0);
        }
    }

    fn normalize(&mut self) {
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
    }
}

impl BitXorAssign<&Gf2Word> for Gf2Word {
    fn bitxor_assign(&mut self, rhs: &Gf2Word) {
        self.ensure_limbs(rhs.limbs.len());
        for (lhs, &r) in self.limbs.iter_mut().zip(rhs.limbs.iter()) {
            *lhs ^= r;
        }
        self.normalize();
    }
}

/// Parse a textual bit string such as "1011"
pub fn parse_bits(text: &str) -> Result<Vec<u8>> {
    text.trim()
        .chars()
        .enumerate()
        .map(|(pos, c)| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            other => Err(ModemError::MalformedInput(format!(
                "non-binary character {:?} at position {}",
                other, pos
            ))),
        })
        .collect()
}

pub fn format_bits(bits: &[u8]) -> String {
    bits.iter().map(|&b| if b == 0 { '0' } else { '1' }).collect()
}
