//! Sets of neighbor counts.

use crate::error::Error;
use bitflags::bitflags;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

bitflags! {
    /// A set of neighbor counts, each from `0` to `8`.
    ///
    /// Bit `n` is set when the count `n` is in the set.
    #[derive(Default)]
    pub struct Counts: u16 {
        const N0 = 1 << 0;
        const N1 = 1 << 1;
        const N2 = 1 << 2;
        const N3 = 1 << 3;
        const N4 = 1 << 4;
        const N5 = 1 << 5;
        const N6 = 1 << 6;
        const N7 = 1 << 7;
        const N8 = 1 << 8;
    }
}

impl Counts {
    /// The set containing only `n`.
    pub fn single(n: u8) -> Result<Self, Error> {
        if n > 8 {
            Err(Error::InvalidNeighborCount(n as u32))
        } else {
            Ok(Counts::from_bits_truncate(1 << n))
        }
    }

    /// Collects counts from a slice, ignoring anything above `8`.
    pub fn from_slice(counts: &[u8]) -> Self {
        counts
            .iter()
            .filter_map(|&n| Counts::single(n).ok())
            .fold(Counts::empty(), |set, n| set | n)
    }

    /// Whether `n` is in the set.
    #[inline]
    pub fn has(self, n: u8) -> bool {
        n <= 8 && self.bits() & (1 << n) != 0
    }

    /// The members of the set, in increasing order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..=8).filter(move |&n| self.has(n))
    }
}

/// The members as a string of digits, in increasing order.
impl Display for Counts {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for n in self.iter() {
            write!(f, "{}", n)?;
        }
        Ok(())
    }
}

/// Parses a string of digits, e.g. `"23"`.
///
/// The order of the digits does not matter, and repeated digits collapse.
/// The empty string is the empty set.
impl FromStr for Counts {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(c) = s.chars().find(|c| !c.is_ascii_digit()) {
            return Err(Error::InvalidRuleChar(c));
        }
        s.chars()
            .filter_map(|c| c.to_digit(10))
            .try_fold(Counts::empty(), |set, n| Ok(set | Counts::single(n as u8)?))
    }
}
