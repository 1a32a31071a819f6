//! Hash functions used by X1 block headers.
//!
//! Headers are hashed with one of two algorithms, chosen by the header
//! version alone. Version 1 headers, which include every genesis block, use a
//! truncated double SHA-512. All later versions use Bitcoin's double SHA-256.
//! The same value serves as the block identity and as the proof-of-work hash.

pub use bitcoin::hashes::{Hash, hash_newtype, sha256d, sha256d::Hash as Sha256Hash, sha512};
use bitcoin::BlockHash;
use serde::{Deserialize, Serialize};

/// The header version that selects [`HeaderHashAlgorithm::LegacyTruncatedWideHash`].
pub const LEGACY_HEADER_VERSION: i32 = 1;

hash_newtype! {
    /// Stake modifier attached to a proven header by chain processing.
    pub struct StakeModifier(Sha256Hash);
}

/// The header hash algorithms known to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderHashAlgorithm {
    /// SHA-512 applied twice, keeping the first 32 bytes of the second digest.
    LegacyTruncatedWideHash,
    /// SHA-256 applied twice.
    StandardDoubleNarrowHash,
}

impl HeaderHashAlgorithm {
    /// Resolves the algorithm for a header version.
    ///
    /// This is the single place where the version to algorithm mapping lives.
    pub const fn for_version(version: i32) -> Self {
        match version {
            LEGACY_HEADER_VERSION => HeaderHashAlgorithm::LegacyTruncatedWideHash,
            _ => HeaderHashAlgorithm::StandardDoubleNarrowHash,
        }
    }

    /// Hashes serialized header bytes.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The full consensus serialization of a header
    ///
    /// # Returns
    ///
    /// The header hash as a [`BlockHash`]
    pub fn hash(self, bytes: &[u8]) -> BlockHash {
        match self {
            HeaderHashAlgorithm::LegacyTruncatedWideHash => BlockHash::from_byte_array(sha512t(bytes)),
            HeaderHashAlgorithm::StandardDoubleNarrowHash => {
                BlockHash::from_raw_hash(Sha256Hash::hash(bytes))
            }
        }
    }
}

/// Truncated double SHA-512.
///
/// Returns the first 32 bytes of `SHA-512(SHA-512(data))`.
pub fn sha512t(data: &[u8]) -> [u8; 32] {
    let first = sha512::Hash::hash(data);
    let second = sha512::Hash::hash(first.as_byte_array());
    let mut out = [0u8; 32];
    out.copy_from_slice(&second.as_byte_array()[..32]);
    out
}
