//! Proof of work targets.
//!
//! This module defines the [`Target`] and [`CompactTarget`] types. A target is
//! a 256-bit threshold a header hash must not exceed; the compact target is
//! its 32-bit encoding stored in the header `bits` field.

use bitcoin::BlockHash;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::{consensus::ConsensusCodec, hashes::Hash};

/// A target value expressed as an unsigned 256-bit integer.
///
/// # Example
///
/// ```
/// use x1_consensus::pow::Target;
///
/// let target = Target::from_hex("00000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
///     .unwrap();
/// assert_eq!(target.to_compact().unwrap().to_consensus(), 0x1e0fffff);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Target(U256);

impl Target {
    /// The largest possible target.
    pub const MAX: Self = Target(U256::MAX);

    pub(crate) const fn new(target: U256) -> Self {
        Target(target)
    }

    /// Proof of work limit of mainnet and testnet, `00000fff…ff`.
    pub const fn mainnet_max_target() -> Self {
        Target::new(U256([u64::MAX, u64::MAX, u64::MAX, 0x0000_0fff_ffff_ffff]))
    }

    /// Proof of work limit of regtest, `7fff…ff`.
    pub const fn regtest_max_target() -> Self {
        Target::new(U256([u64::MAX, u64::MAX, u64::MAX, 0x7fff_ffff_ffff_ffff]))
    }

    /// Creates a `Target` from a big-endian hexadecimal string.
    ///
    /// Returns `None` if the string is not valid hex or does not fit in 256
    /// bits.
    pub fn from_hex(hex: &str) -> Option<Self> {
        U256::from_str_radix(hex, 16).ok().map(Target)
    }

    /// Creates a Target from big-endian bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(U256::from_big_endian(bytes))
    }

    /// Interprets a block hash as a 256-bit number.
    ///
    /// Hash bytes are stored little-endian, the same way the hash is compared
    /// against the target when checking proof of work.
    pub fn from_block_hash(hash: &BlockHash) -> Self {
        Self(U256::from_little_endian(hash.as_byte_array()))
    }

    /// Returns the zero target.
    pub const fn zero() -> Self {
        Target(U256::zero())
    }

    /// Returns true if `hash`, read as a number, does not exceed this target.
    pub fn is_met_by(self, hash: &BlockHash) -> bool {
        Target::from_block_hash(hash) <= self
    }

    /// Converts a compact target representation into a Target instance.
    ///
    /// The compact format stores a 3-byte mantissa and a 1-byte exponent, the
    /// target being `mantissa * 256^(exponent - 3)`.
    ///
    /// # Returns
    ///
    /// * `Some(Target)` - The parsed target value if valid
    /// * `None` - If the mantissa is negative or zero, or the value does not
    ///   fit in 256 bits
    pub fn from_compact(compact: CompactTarget) -> Option<Self> {
        let n = compact.0;
        let exponent = n >> 24;
        let mantissa = n & 0x007f_ffff;

        if n & 0x0080_0000 != 0 {
            return None;
        }

        if mantissa == 0 {
            return None;
        }

        if exponent > 32 {
            return None;
        }

        let base = U256::from(mantissa);

        #[allow(clippy::arithmetic_side_effects, reason = "Shift amounts are bounded above")]
        let target = if exponent <= 3 {
            let shift_bits = 3u32.checked_sub(exponent)?.checked_mul(8)?;
            base >> shift_bits
        } else {
            let shift_bits = exponent.checked_sub(3)?.checked_mul(8)?;
            let shifted = base << shift_bits;
            // Bits shifted out of the top mean the value overflowed.
            if shifted >> shift_bits != base {
                return None;
            }
            shifted
        };

        Some(Target(target))
    }

    /// Converts a target value into its compact representation.
    ///
    /// The most significant three bytes form the mantissa. When the mantissa
    /// would have its sign bit set it is shifted right by a byte and the size
    /// incremented, so the encoding stays positive.
    ///
    /// # Returns
    ///
    /// * `Some(CompactTarget)` - The compact representation of the target.
    /// * `None` - If conversion overflows.
    pub fn to_compact(self) -> Option<CompactTarget> {
        if self.0.is_zero() {
            return Some(CompactTarget(0));
        }

        let bit_length = u32::try_from(self.0.bits()).ok()?;
        let size = bit_length.checked_add(7)?.checked_div(8)?;

        let mantissa = if size <= 3 {
            let shift_bits = 3u32.checked_sub(size)?.checked_mul(8)?;
            self.0.low_u32().checked_shl(shift_bits)? & 0x00ff_ffff
        } else {
            let shift_bits = size.checked_sub(3)?.checked_mul(8)?;
            #[allow(clippy::arithmetic_side_effects, reason = "size <= 32, shift < 256")]
            let shifted = self.0 >> shift_bits;
            shifted.low_u32() & 0x00ff_ffff
        };

        let (mantissa, size) = if mantissa & 0x0080_0000 != 0 {
            (mantissa.checked_shr(8)?, size.checked_add(1)?)
        } else {
            (mantissa, size)
        };

        let compact = size.checked_shl(24)?.checked_add(mantissa)?;
        Some(CompactTarget(compact))
    }
}

/// Compact representation of a Target, as used in block headers.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ConsensusCodec,
)]
pub struct CompactTarget(u32);

impl CompactTarget {
    /// Wraps a raw `bits` value.
    pub const fn from_consensus(bits: u32) -> Self {
        CompactTarget(bits)
    }

    /// Returns the raw `bits` value.
    pub const fn to_consensus(self) -> u32 {
        self.0
    }
}

impl From<bitcoin::CompactTarget> for CompactTarget {
    fn from(bits: bitcoin::CompactTarget) -> Self {
        CompactTarget(bits.to_consensus())
    }
}

impl From<CompactTarget> for bitcoin::CompactTarget {
    fn from(bits: CompactTarget) -> Self {
        bitcoin::CompactTarget::from_consensus(bits.0)
    }
}
