// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::tap::Dibit;

const PN9_MASK: u16 = 0x1FF;

/// PN9 pseudo-random bit generator, x^9 + x^5 + 1.
#[derive(Debug, Clone)]
pub struct Pn9 {
    state: u16,
}

impl Pn9 {
    /// A zero seed would lock the register, so it is replaced by all ones.
    pub fn new(seed: u16) -> Self {
        let state = seed & PN9_MASK;
        Self {
            state: if state == 0 { PN9_MASK } else { state },
        }
    }

    pub fn next_bit(&mut self) -> bool {
        let bit = ((self.state >> 8) ^ (self.state >> 4)) & 1;
        self.state = ((self.state << 1) | bit) & PN9_MASK;
        bit == 1
    }

    pub fn next_dibit(&mut self) -> Dibit {
        let high = self.next_bit() as u8;
        let low = self.next_bit() as u8;
        Dibit::from_bits((high << 1) | low)
    }
}

impl Default for Pn9 {
    fn default() -> Self {
        Self::new(PN9_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maximal_length() {
        let mut pn = Pn9::default();
        let first: Vec<bool> = (0..511).map(|_| pn.next_bit()).collect();
        let second: Vec<bool> = (0..511).map(|_| pn.next_bit()).collect();
        assert_eq!(first, second);
        assert_eq!(first.iter().filter(|b| **b).count(), 256);
    }

    #[test]
    fn test_zero_seed_is_replaced() {
        let mut pn = Pn9::new(0);
        assert!((0..16).any(|_| pn.next_bit()));
    }
}
