use crate::util::formatting_helpers::format_bits;
use std::fmt;

/// One 8 bit channel value spelled out as binary digits, index 0 is the most
/// significant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitString([u8; 8]);

impl BitString {
    /// Accepts any sequence of eight 0/1 digits.
    pub fn from_digits(digits: [u8; 8]) -> Option<Self> {
        if digits.iter().all(|digit| *digit <= 1) {
            Some(Self(digits))
        } else {
            None
        }
    }

    pub fn digits(&self) -> &[u8; 8] { &self.0 }
    pub fn high_nibble(&self) -> &[u8] { &self.0[..4] }
    pub fn low_nibble(&self) -> &[u8] { &self.0[4..] }

    pub(crate) fn digits_mut(&mut self) -> &mut [u8; 8] { &mut self.0 }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(&format_bits(&self.0)) }
}

pub fn to_bits(value: u8) -> BitString {
    let mut digits = [0u8; 8];
    for (idx, shift) in (0..8).rev().enumerate() {
        digits[idx] = (value >> shift) & 1;
    }
    BitString(digits)
}

pub fn from_bits(bits: &BitString) -> u8 {
    bits.0.iter().enumerate().map(|(idx, digit)| *digit << (7 - idx)).sum()
}

impl From<u8> for BitString {
    fn from(value: u8) -> Self { to_bits(value) }
}

impl From<BitString> for u8 {
    fn from(bits: BitString) -> Self { from_bits(&bits) }
}
