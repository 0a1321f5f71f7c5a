//! Status flag definitions.
//!
//! Every ALU operation produces four single-bit status outputs alongside its
//! result. This module provides the flag identifiers ([`Flag`]), the flag
//! values of one evaluation ([`FlagSet`]) and the selection of flags a
//! comparison should look at ([`FlagMask`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::constants::SIGN_BIT;

/// Identifier of one status flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    /// Unsigned carry out (or "no borrow" for subtraction).
    Carry,
    /// Signed two's-complement overflow.
    Overflow,
    /// Result is zero.
    Zero,
    /// Bit 7 of the result is set.
    Negative,
}

impl Flag {
    /// All flags, in the order they are compared.
    pub const ALL: [Self; 4] = [Self::Carry, Self::Overflow, Self::Zero, Self::Negative];

    /// Lower-case field name as used in vector records.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Carry => "carry",
            Self::Overflow => "overflow",
            Self::Zero => "zero",
            Self::Negative => "negative",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Carry => 0b0001,
            Self::Overflow => 0b0010,
            Self::Zero => 0b0100,
            Self::Negative => 0b1000,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The four status flags produced by one ALU evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagSet {
    /// Unsigned carry out / no borrow.
    pub carry: bool,
    /// Signed overflow.
    pub overflow: bool,
    /// Zero result.
    pub zero: bool,
    /// Negative (bit 7) result.
    pub negative: bool,
}

impl FlagSet {
    /// Builds the flag set for an 8-bit value: `zero` and `negative` are
    /// derived from `value`, carry and overflow are supplied by the caller.
    #[inline]
    pub const fn from_value(value: u8, carry: bool, overflow: bool) -> Self {
        Self {
            carry,
            overflow,
            zero: value == 0,
            negative: value & SIGN_BIT != 0,
        }
    }

    /// Returns the value of one flag.
    #[inline]
    pub const fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Carry => self.carry,
            Flag::Overflow => self.overflow,
            Flag::Zero => self.zero,
            Flag::Negative => self.negative,
        }
    }

    /// Sets the value of one flag.
    #[inline]
    pub fn set(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::Carry => self.carry = value,
            Flag::Overflow => self.overflow = value,
            Flag::Zero => self.zero = value,
            Flag::Negative => self.negative = value,
        }
    }

    /// Returns the first flag in `mask` whose value differs between `self`
    /// and `other`, in [`Flag::ALL`] order.
    pub fn first_difference(&self, other: &Self, mask: FlagMask) -> Option<Flag> {
        Flag::ALL
            .into_iter()
            .filter(|flag| mask.contains(*flag))
            .find(|flag| self.get(*flag) != other.get(*flag))
    }
}

impl fmt::Display for FlagSet {
    /// Renders as `CVZN` with a `-` for each clear flag.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = if self.carry { 'C' } else { '-' };
        let v = if self.overflow { 'V' } else { '-' };
        let z = if self.zero { 'Z' } else { '-' };
        let n = if self.negative { 'N' } else { '-' };
        write!(f, "{c}{v}{z}{n}")
    }
}

/// Selection of the flags a comparison examines.
///
/// Generated vectors compare every flag; records loaded from files compare
/// only the flags they list; result-only hardware checks compare none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FlagMask(u8);

impl FlagMask {
    /// Every flag is compared.
    pub const ALL: Self = Self(0b1111);
    /// No flag is compared.
    pub const NONE: Self = Self(0);

    /// Returns a mask with `flag` added.
    #[must_use]
    pub const fn with(self, flag: Flag) -> Self {
        Self(self.0 | flag.bit())
    }

    /// Returns `true` if `flag` is part of the mask.
    pub const fn contains(self, flag: Flag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Returns `true` if no flag is selected.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for FlagMask {
    fn default() -> Self {
        Self::ALL
    }
}
