mod header;
mod proven_header;
mod signature;

pub use header::{BlockHash, TxMerkleNode, ValidationError, X1Header};
pub use proven_header::{ProvenBlockHeader, ProvenHeaderError, ProvenHeaderIndex};
pub use signature::BlockSignature;

use bitcoin::merkle_tree;

use crate::{
    blockdata::transaction::{Transaction, is_coinstake},
    consensus::{Decodable, EncodeDecodeError, Encodable, MAX_VEC_SIZE, VarInt},
    io::{Error as IoError, Read, Write},
};

/// Represents an X1 block.
///
/// A `Block` contains:
/// - The header of the block
/// - The transactions, a coinbase first and, for proof-of-stake blocks, a
///   coinstake second
/// - The block signature, empty for proof-of-work blocks
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct X1Block {
    /// The block header
    pub header: X1Header,
    /// List of transactions contained in the block
    pub transactions: Vec<Transaction>,
    /// Signature of the block staker
    pub signature: BlockSignature,
}

impl X1Block {
    /// Creates a new block with an empty signature.
    pub fn new(header: X1Header, transactions: Vec<Transaction>) -> Self {
        X1Block {
            header,
            transactions,
            signature: BlockSignature::default(),
        }
    }

    /// Creates a new block carrying the given signature.
    pub fn with_signature(
        header: X1Header,
        transactions: Vec<Transaction>,
        signature: BlockSignature,
    ) -> Self {
        X1Block {
            header,
            transactions,
            signature,
        }
    }

    /// Gets a reference to the block header
    pub fn header(&self) -> &X1Header {
        &self.header
    }

    /// Returns the block hash.
    pub fn block_hash(&self) -> BlockHash {
        self.header.block_hash()
    }

    /// Adds a transaction to the block
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Gets the number of transactions in the block
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Gets a reference to the transactions
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Returns true if the second transaction is a coinstake.
    pub fn is_proof_of_stake(&self) -> bool {
        self.transactions.get(1).is_some_and(is_coinstake)
    }

    /// Returns the transaction that carries the block reward.
    ///
    /// For proof-of-stake blocks this is the coinstake in second position,
    /// otherwise the first transaction. Returns `None` for a block without
    /// transactions.
    pub fn protocol_transaction(&self) -> Option<&Transaction> {
        match self.transactions.get(1) {
            Some(coinstake) if is_coinstake(coinstake) => Some(coinstake),
            _ => self.transactions.first(),
        }
    }

    /// Computes the transaction merkle root.
    ///
    /// Returns `None` if the block has no transactions.
    pub fn compute_merkle_root(&self) -> Option<TxMerkleNode> {
        let hashes = self.transactions.iter().map(|tx| tx.txid().to_raw_hash());
        merkle_tree::calculate_root(hashes).map(TxMerkleNode::from_raw_hash)
    }

    /// Recomputes the merkle root and stores it in the header.
    ///
    /// Returns the new root, or `None` (leaving the header untouched) if the
    /// block has no transactions.
    pub fn update_merkle_root(&mut self) -> Option<TxMerkleNode> {
        let root = self.compute_merkle_root()?;
        self.header.merkle_root = root;
        Some(root)
    }

    /// Checks that the header commits to the block's transactions.
    pub fn check_merkle_root(&self) -> bool {
        self.compute_merkle_root() == Some(self.header.merkle_root)
    }
}

impl Encodable for X1Block {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        let mut len: usize = 0;

        len = len.saturating_add(self.header.consensus_encode(writer)?);
        len = len.saturating_add(self.transactions.consensus_encode(writer)?);

        // The signature follows the generic block body.
        len = len.saturating_add(self.signature.consensus_encode(writer)?);

        Ok(len)
    }
}

impl Decodable for X1Block {
    fn consensus_decode_from_finite_reader<R: Read + ?Sized>(
        reader: &mut R,
    ) -> Result<Self, EncodeDecodeError> {
        let header = X1Header::consensus_decode_from_finite_reader(reader)?;

        let tx_count = VarInt::consensus_decode_from_finite_reader(reader)?.0;
        if tx_count > MAX_VEC_SIZE as u64 {
            return Err(EncodeDecodeError::ParseFailed(
                "Vector too large, exceeds MAX_VEC_SIZE",
            ));
        }
        let mut transactions = Vec::new();
        for _ in 0..tx_count {
            transactions.push(Transaction::consensus_decode_from_finite_reader(reader)?);
        }

        let signature = BlockSignature::consensus_decode_from_finite_reader(reader)?;

        Ok(X1Block {
            header,
            transactions,
            signature,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        blockdata::{
            block::header::tests::create_test_header,
            transaction::tests::{create_coinbase, create_coinstake},
        },
        consensus::{deserialize, serialize},
        hashes::Hash,
    };

    /// A proof-of-stake block with `extra` filler transactions after the
    /// coinstake, its merkle root set and a signature attached.
    pub(crate) fn create_pos_block(extra: u8) -> X1Block {
        let mut transactions = vec![create_coinbase(1), create_coinstake(2)];
        for i in 0..extra {
            transactions.push(create_coinbase(i.saturating_add(10)));
        }
        let mut block = X1Block::with_signature(
            create_test_header(7, 99),
            transactions,
            BlockSignature::from(vec![0x30, 0x44, 0x02, 0x20, 0x01]),
        );
        block.update_merkle_root();
        block
    }

    /// A proof-of-work block with a coinbase and `extra` more transactions.
    pub(crate) fn create_pow_block(extra: u8) -> X1Block {
        let mut transactions = vec![create_coinbase(1)];
        for i in 0..extra {
            transactions.push(create_coinbase(i.saturating_add(10)));
        }
        let mut block = X1Block::new(create_test_header(7, 98), transactions);
        block.update_merkle_root();
        block
    }

    #[test]
    fn test_protocol_transaction_pos() {
        let block = create_pos_block(2);
        assert!(block.is_proof_of_stake());
        assert_eq!(block.protocol_transaction(), Some(&block.transactions[1]));
    }

    #[test]
    fn test_protocol_transaction_pow() {
        let block = create_pow_block(2);
        assert!(!block.is_proof_of_stake());
        assert_eq!(block.protocol_transaction(), Some(&block.transactions[0]));

        let single = create_pow_block(0);
        assert_eq!(single.protocol_transaction(), Some(&single.transactions[0]));
    }

    #[test]
    fn test_protocol_transaction_ignores_late_coinstake() {
        // Only the second position is considered.
        let mut block = create_pow_block(1);
        block.add_transaction(create_coinstake(3));
        assert_eq!(block.protocol_transaction(), Some(&block.transactions[0]));
    }

    #[test]
    fn test_protocol_transaction_empty_block() {
        let block = X1Block::new(create_test_header(7, 1), Vec::new());
        assert_eq!(block.protocol_transaction(), None);
        assert_eq!(block.compute_merkle_root(), None);
    }

    #[test]
    fn test_single_transaction_merkle_root_is_txid() {
        let block = create_pow_block(0);
        assert_eq!(
            block.header.merkle_root.to_byte_array(),
            block.transactions[0].txid().to_byte_array()
        );
        assert!(block.check_merkle_root());
    }

    #[test]
    fn test_merkle_root_matches_bitcoin_block() {
        let block = create_pos_block(3);
        let bitcoin_block = bitcoin::Block {
            header: block.header.into(),
            txdata: block.transactions.clone(),
        };
        assert_eq!(block.compute_merkle_root(), bitcoin_block.compute_merkle_root());
    }

    #[test]
    fn test_block_round_trip_keeps_signature() {
        let block = create_pos_block(1);
        let bytes = serialize(&block);
        assert_eq!(bytes.last(), Some(&0x01));
        let decoded: X1Block = deserialize(&bytes).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_pow_block_ends_with_empty_signature() {
        let block = create_pow_block(0);
        let bytes = serialize(&block);
        assert_eq!(bytes.last(), Some(&0x00));
        let decoded: X1Block = deserialize(&bytes).unwrap();
        assert!(decoded.signature.is_empty());
    }
}
