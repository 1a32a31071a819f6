//! X1 block header.
//!
//! The header has the same 80 byte layout as a Bitcoin header. What differs is
//! the hash: it is selected by version through [`HeaderHashAlgorithm`], and the
//! resulting hash is used both as the block identity and for proof of work.

pub use bitcoin::{
    TxMerkleNode,
    block::{BlockHash, ValidationError},
};
use serde::{Deserialize, Serialize};

use crate::{
    consensus::{ConsensusCodec, serialize},
    hashes::{Hash, HeaderHashAlgorithm},
    pow::{CompactTarget, Target},
};

/// X1 block header.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ConsensusCodec,
)]
pub struct X1Header {
    /// Block version. Version 1 selects the legacy header hash.
    pub version: i32,

    /// Reference to the previous block in the chain.
    pub prev_blockhash: BlockHash,

    /// The root hash of the merkle tree of transactions in the block.
    pub merkle_root: TxMerkleNode,

    /// The timestamp of the block, as claimed by the miner.
    pub time: u32,

    /// The target value below which the block hash must lie.
    pub bits: CompactTarget,

    /// The nonce, selected to obtain a low enough block hash.
    pub nonce: u32,
}

impl X1Header {
    /// The size of a serialized header in bytes.
    pub const SIZE: usize = 4 + 32 + 32 + 4 + 4 + 4; // 80

    /// Returns the hash algorithm this header's version selects.
    pub const fn hash_algorithm(&self) -> HeaderHashAlgorithm {
        HeaderHashAlgorithm::for_version(self.version)
    }

    /// Computes the block hash.
    ///
    /// The header is serialized once and hashed with the algorithm selected
    /// by [`X1Header::hash_algorithm`]. The result depends only on the header
    /// bytes, so callers are free to cache it.
    pub fn block_hash(&self) -> BlockHash {
        self.hash_algorithm().hash(&serialize(self))
    }

    /// Returns the hash compared against the target.
    ///
    /// X1 has no separate work hash; this is the block hash.
    pub fn pow_hash(&self) -> BlockHash {
        self.block_hash()
    }

    /// Returns true if this header has no predecessor.
    pub fn is_genesis(&self) -> bool {
        self.prev_blockhash == BlockHash::all_zeros()
    }

    /// Extracts the difficulty target from the header.
    ///
    /// # Returns
    ///
    /// * `Some(Target)` - The target encoded by `bits`
    /// * `None` - If `bits` is not a valid compact target
    pub fn target(&self) -> Option<Target> {
        Target::from_compact(self.bits)
    }

    /// Validates the proof of work against the required target.
    ///
    /// # Arguments
    ///
    /// * `required_target` - The target this header's `bits` must encode
    ///
    /// # Returns
    ///
    /// * `Ok(BlockHash)` - The block hash, if it does not exceed the target
    /// * `Err(ValidationError::BadTarget)` - If `bits` does not encode
    ///   `required_target`
    /// * `Err(ValidationError::BadProofOfWork)` - If the hash is above the
    ///   target
    pub fn validate_pow(&self, required_target: Target) -> Result<BlockHash, ValidationError> {
        let target = self.target().ok_or(ValidationError::BadTarget)?;
        if target != required_target {
            return Err(ValidationError::BadTarget);
        }
        let hash = self.pow_hash();
        if target.is_met_by(&hash) {
            Ok(hash)
        } else {
            Err(ValidationError::BadProofOfWork)
        }
    }
}

impl From<bitcoin::block::Header> for X1Header {
    fn from(header: bitcoin::block::Header) -> Self {
        X1Header {
            version: header.version.to_consensus(),
            prev_blockhash: header.prev_blockhash,
            merkle_root: header.merkle_root,
            time: header.time,
            bits: header.bits.into(),
            nonce: header.nonce,
        }
    }
}

impl From<X1Header> for bitcoin::block::Header {
    fn from(header: X1Header) -> Self {
        bitcoin::block::Header {
            version: bitcoin::block::Version::from_consensus(header.version),
            prev_blockhash: header.prev_blockhash,
            merkle_root: header.merkle_root,
            time: header.time,
            bits: header.bits.into(),
            nonce: header.nonce,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use hex::FromHex;

    use super::*;
    use crate::{
        consensus::{Decodable, Encodable, deserialize},
        hashes::{Hash, Sha256Hash, sha512t},
    };

    pub(crate) fn create_test_header(version: i32, nonce: u32) -> X1Header {
        X1Header {
            version,
            prev_blockhash: BlockHash::from_byte_array([0x11; 32]),
            merkle_root: TxMerkleNode::from_byte_array([0x22; 32]),
            time: 1_606_692_960,
            bits: CompactTarget::from_consensus(0x1e0fffff),
            nonce,
        }
    }

    #[test]
    fn test_header_deserialization() {
        // 02000000 ........................... Block version: 2
        // b6ff0b1b1680a2862a30ca44d346d9e8
        // 910d334beb48ca0c0000000000000000 ... Hash of previous block's header
        // 9d10aa52ee949386ca9385695f04ede2
        // 70dda20810decd12bc9b048aaab31471 ... Merkle root
        // 24d95a54 ........................... Unix time: 1415239972
        // 30c31b18 ........................... Target (bits)
        // fe9f0864 ........................... Nonce
        let hex_data = "\
        02000000\
        b6ff0b1b1680a2862a30ca44d346d9e8\
        910d334beb48ca0c0000000000000000\
        9d10aa52ee949386ca9385695f04ede2\
        70dda20810decd12bc9b048aaab31471\
        24d95a54\
        30c31b18\
        fe9f0864\
        ";
        let header_bytes = Vec::from_hex(hex_data).expect("Invalid hex string");

        let mut cursor = std::io::Cursor::new(&header_bytes);
        let header = X1Header::consensus_decode(&mut cursor).expect("Failed to decode header");

        assert_eq!(header.version, 2);
        assert_eq!(header.time, 1415239972);
        assert_eq!(header.bits.to_consensus(), 0x181bc330);
        assert_eq!(header.nonce, 0x64089ffe);

        let mut encoded = Vec::new();
        let written = header.consensus_encode(&mut encoded).unwrap();
        assert_eq!(written, X1Header::SIZE);
        assert_eq!(encoded, header_bytes);
    }

    #[test]
    fn test_version_one_uses_truncated_sha512() {
        let header = create_test_header(1, 42);
        let bytes = serialize(&header);
        assert_eq!(bytes.len(), X1Header::SIZE);
        assert_eq!(header.block_hash().to_byte_array(), sha512t(&bytes));
    }

    #[test]
    fn test_other_versions_use_double_sha256() {
        for version in [2, 7, 0x2000_0000] {
            let header = create_test_header(version, 42);
            let bytes = serialize(&header);
            assert_eq!(
                header.block_hash().to_byte_array(),
                Sha256Hash::hash(&bytes).to_byte_array()
            );
            // Identical to Bitcoin's header hash for the same fields.
            let bitcoin_header: bitcoin::block::Header = header.into();
            assert_eq!(header.block_hash(), bitcoin_header.block_hash());
        }
    }

    #[test]
    fn test_is_genesis_requires_zero_prev_hash() {
        let mut header = create_test_header(1, 0);
        assert!(!header.is_genesis());
        header.prev_blockhash = BlockHash::all_zeros();
        assert!(header.is_genesis());
        assert_eq!(header.merkle_root, TxMerkleNode::from_byte_array([0x22; 32]));
    }

    #[test]
    fn test_pow_hash_is_block_hash() {
        for version in [1, 7] {
            let header = create_test_header(version, 9);
            assert_eq!(header.pow_hash(), header.block_hash());
        }
    }

    #[test]
    fn test_hash_is_stable() {
        let header = create_test_header(1, 5);
        assert_eq!(header.block_hash(), header.block_hash());
        let decoded: X1Header = deserialize(&serialize(&header)).unwrap();
        assert_eq!(decoded.block_hash(), header.block_hash());
    }

    #[test]
    fn test_bitcoin_header_conversion() {
        let header = create_test_header(7, 3);
        let bitcoin_header: bitcoin::block::Header = header.into();
        assert_eq!(X1Header::from(bitcoin_header), header);
        assert_eq!(serialize(&bitcoin_header), serialize(&header));
    }

    #[test]
    fn test_validate_pow_bad_target() {
        let header = create_test_header(7, 3);
        assert!(matches!(
            header.validate_pow(Target::regtest_max_target()),
            Err(ValidationError::BadTarget)
        ));
    }

    #[test]
    fn test_validate_pow_easy_target() {
        let mut header = create_test_header(7, 3);
        header.bits = CompactTarget::from_consensus(0x207fffff);
        let target = header.target().unwrap();
        // Roughly half of all hashes fall below 0x7fffff00…; search a few nonces.
        let found = (0..64u32).any(|nonce| {
            header.nonce = nonce;
            header.validate_pow(target).is_ok()
        });
        assert!(found);
    }
}
