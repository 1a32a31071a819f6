//! Construction of consensus objects.
//!
//! A [`ConsensusFactory`] is created by a network profile and handed to every
//! piece of code that needs fresh headers, blocks or proofs.

use crate::{
    blockdata::{
        block::{
            BlockHash, BlockSignature, ProvenBlockHeader, ProvenHeaderError, TxMerkleNode,
            X1Block, X1Header,
        },
        transaction::{LockTime, Transaction, Version},
    },
    hashes::Hash,
    p2p::message::Headers,
    pow::CompactTarget,
};

/// Version written into newly created headers.
pub const CURRENT_HEADER_VERSION: i32 = 7;

/// Creates headers, blocks, transactions and proofs for one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusFactory {
    header_version: i32,
}

impl Default for ConsensusFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsensusFactory {
    pub const fn new() -> Self {
        ConsensusFactory {
            header_version: CURRENT_HEADER_VERSION,
        }
    }

    /// Version given to headers created by this factory.
    pub const fn header_version(&self) -> i32 {
        self.header_version
    }

    /// Creates a header with the current version and every other field zero.
    pub fn create_header(&self) -> X1Header {
        X1Header {
            version: self.header_version,
            prev_blockhash: BlockHash::all_zeros(),
            merkle_root: TxMerkleNode::all_zeros(),
            time: 0,
            bits: CompactTarget::default(),
            nonce: 0,
        }
    }

    /// Creates a block with a fresh header, no transactions and an empty
    /// signature.
    pub fn create_block(&self) -> X1Block {
        X1Block::with_signature(self.create_header(), Vec::new(), BlockSignature::new())
    }

    /// Creates an empty version 1 transaction.
    pub fn create_transaction(&self) -> Transaction {
        Transaction {
            version: Version::ONE,
            lock_time: LockTime::ZERO,
            input: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Wraps headers in an announcement message.
    pub fn create_headers_message(&self, headers: Vec<X1Header>) -> Headers {
        Headers::new(headers)
    }

    /// Builds the proven header of `block`.
    pub fn create_proven_header(
        &self,
        block: &X1Block,
    ) -> Result<ProvenBlockHeader, ProvenHeaderError> {
        ProvenBlockHeader::new(block)
    }
}
