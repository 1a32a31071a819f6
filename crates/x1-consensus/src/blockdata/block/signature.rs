//! Proof-of-stake block signature.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consensus::ConsensusCodec;

/// Signature appended to an X1 block.
///
/// Proof-of-work blocks carry an empty signature; there is no separate null
/// state. On the wire the signature is a length-prefixed byte string, so an
/// empty signature is the single byte `0x00`.
///
/// Equality, ordering and hashing all work on the signature bytes.
#[derive(
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
pub struct BlockSignature(Vec<u8>);

impl BlockSignature {
    /// Creates an empty signature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps signature bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns true if no signature is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the number of signature bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Clears the signature.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl From<Vec<u8>> for BlockSignature {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for BlockSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for BlockSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}
