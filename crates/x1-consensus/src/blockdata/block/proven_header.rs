//! Proven block headers.
//!
//! A proven header lets a peer check a proof-of-stake block's reward
//! transaction without downloading the block body. It bundles the header with
//! the coinstake, a partial merkle tree proving the coinstake is committed to
//! by the header, and the block signature.
//!
//! Wire layout: `header ‖ merkle proof ‖ signature ‖ coinstake`.

use std::{collections::HashMap, fmt};

use bitcoin::merkle_tree::PartialMerkleTree;
use thiserror::Error;
use tracing::debug;

use super::{BlockHash, BlockSignature, X1Block, X1Header};
use crate::{
    blockdata::transaction::{Transaction, Txid},
    consensus::{Decodable, EncodeDecodeError, Encodable, serialize},
    hashes::StakeModifier,
    io::{Error as IoError, Read, Write},
};

/// Errors raised while building or checking a proven header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvenHeaderError {
    /// The block has no transactions to prove.
    #[error("cannot build a proven header for a block without transactions")]
    NoTransactions,

    /// The partial merkle tree is malformed.
    #[error("invalid merkle proof: {0}")]
    MerkleProof(String),

    /// The proof does not lead to the header's merkle root.
    #[error("merkle proof root does not match the header")]
    ProofRootMismatch,

    /// The proof does not commit to the coinstake transaction.
    #[error("merkle proof does not commit to the coinstake transaction")]
    CoinstakeNotCommitted,
}

/// Position in a serialized proven header.
///
/// Encoding and decoding pass a cursor from one component to the next. Each
/// step moves it to the end of the component just processed and reports that
/// component's size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ByteCursor {
    position: usize,
}

impl ByteCursor {
    /// Moves the cursor forward by `len` bytes.
    fn advance(self, len: usize) -> (Self, usize) {
        self.advance_to(self.position.saturating_add(len))
    }

    /// Moves the cursor to the absolute position `end`.
    fn advance_to(self, end: usize) -> (Self, usize) {
        let size = end.saturating_sub(self.position);
        (ByteCursor { position: end }, size)
    }
}

/// Byte sizes of the four serialized components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ComponentSizes {
    header: usize,
    merkle_proof: usize,
    signature: usize,
    coinstake: usize,
}

impl ComponentSizes {
    fn total(&self) -> usize {
        self.header
            .saturating_add(self.merkle_proof)
            .saturating_add(self.signature)
            .saturating_add(self.coinstake)
    }
}

/// Reader adapter counting the bytes pulled through it.
struct Tally<'a, R: Read + ?Sized> {
    inner: &'a mut R,
    consumed: usize,
}

impl<R: Read + ?Sized> Read for Tally<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        let n = self.inner.read(buf)?;
        self.consumed = self.consumed.saturating_add(n);
        Ok(n)
    }
}

/// A block header together with the proof of its coinstake.
#[derive(Debug, Clone)]
pub struct ProvenBlockHeader {
    header: X1Header,
    merkle_proof: PartialMerkleTree,
    signature: BlockSignature,
    coinstake: Transaction,
    stake_modifier_v2: Option<StakeModifier>,
    sizes: ComponentSizes,
}

impl ProvenBlockHeader {
    /// Builds the proven header of `block`.
    ///
    /// The header is copied from the block and the proof covers the block's
    /// protocol transaction: the coinstake for proof-of-stake blocks, the
    /// first transaction otherwise.
    ///
    /// # Errors
    ///
    /// * `ProvenHeaderError::NoTransactions` - If the block is empty
    pub fn new(block: &X1Block) -> Result<Self, ProvenHeaderError> {
        let coinstake = block
            .protocol_transaction()
            .ok_or(ProvenHeaderError::NoTransactions)?
            .clone();
        let coinstake_txid = coinstake.txid();

        let txids: Vec<Txid> = block.transactions.iter().map(Transaction::txid).collect();
        let matches: Vec<bool> = txids.iter().map(|txid| *txid == coinstake_txid).collect();
        let merkle_proof = PartialMerkleTree::from_txids(&txids, &matches);

        let mut proven = ProvenBlockHeader {
            header: block.header,
            merkle_proof,
            signature: block.signature.clone(),
            coinstake,
            stake_modifier_v2: None,
            sizes: ComponentSizes::default(),
        };
        proven.sizes = proven.measure_components();

        debug!(
            block_hash = %proven.block_hash(),
            coinstake = %coinstake_txid,
            size = proven.total_size(),
            "Built proven header"
        );
        Ok(proven)
    }

    /// Measures the serialized components in wire order.
    fn measure_components(&self) -> ComponentSizes {
        let cursor = ByteCursor::default();
        let (cursor, header) = cursor.advance(serialize(&self.header).len());
        let (cursor, merkle_proof) = cursor.advance(serialize(&self.merkle_proof).len());
        let (cursor, signature) = cursor.advance(serialize(&self.signature).len());
        let (_, coinstake) = cursor.advance(serialize(&self.coinstake).len());

        ComponentSizes {
            header,
            merkle_proof,
            signature,
            coinstake,
        }
    }

    /// Encodes the components in wire order, recording their sizes.
    fn encode_components<W: Write + ?Sized>(
        &self,
        writer: &mut W,
    ) -> Result<ComponentSizes, IoError> {
        let cursor = ByteCursor::default();
        let (cursor, header) = cursor.advance(self.header.consensus_encode(writer)?);
        let (cursor, merkle_proof) = cursor.advance(self.merkle_proof.consensus_encode(writer)?);
        let (cursor, signature) = cursor.advance(self.signature.consensus_encode(writer)?);
        let (_, coinstake) = cursor.advance(self.coinstake.consensus_encode(writer)?);

        Ok(ComponentSizes {
            header,
            merkle_proof,
            signature,
            coinstake,
        })
    }

    /// Returns the header.
    pub fn header(&self) -> &X1Header {
        &self.header
    }

    /// Returns the hash of the header.
    pub fn block_hash(&self) -> BlockHash {
        self.header.block_hash()
    }

    /// Returns the partial merkle tree proving the coinstake.
    pub fn merkle_proof(&self) -> &PartialMerkleTree {
        &self.merkle_proof
    }

    /// Returns the block signature.
    pub fn signature(&self) -> &BlockSignature {
        &self.signature
    }

    /// Returns the coinstake transaction.
    pub fn coinstake(&self) -> &Transaction {
        &self.coinstake
    }

    /// Returns the stake modifier, if chain processing has set one.
    pub fn stake_modifier_v2(&self) -> Option<StakeModifier> {
        self.stake_modifier_v2
    }

    /// Sets the stake modifier. It is not part of the serialized form.
    pub fn set_stake_modifier_v2(&mut self, modifier: StakeModifier) {
        self.stake_modifier_v2 = Some(modifier);
    }

    /// Serialized size of the header, always [`X1Header::SIZE`].
    pub fn header_size(&self) -> usize {
        self.sizes.header
    }

    /// Serialized size of the partial merkle tree.
    pub fn merkle_proof_size(&self) -> usize {
        self.sizes.merkle_proof
    }

    /// Serialized size of the signature, including its length prefix.
    pub fn signature_size(&self) -> usize {
        self.sizes.signature
    }

    /// Serialized size of the coinstake transaction.
    pub fn coinstake_size(&self) -> usize {
        self.sizes.coinstake
    }

    /// Serialized size of the whole proven header.
    pub fn total_size(&self) -> usize {
        self.sizes.total()
    }

    /// Checks that the proof ties the coinstake to the header.
    ///
    /// The merkle root recomputed from the proof must equal the header's, and
    /// the coinstake must be the only transaction the proof matches.
    pub fn check_merkle_proof(&self) -> Result<(), ProvenHeaderError> {
        let mut matches = Vec::new();
        let mut indexes = Vec::new();
        let root = self
            .merkle_proof
            .extract_matches(&mut matches, &mut indexes)
            .map_err(|e| ProvenHeaderError::MerkleProof(e.to_string()))?;

        if root != self.header.merkle_root {
            return Err(ProvenHeaderError::ProofRootMismatch);
        }
        if matches.as_slice() != [self.coinstake.txid()] {
            return Err(ProvenHeaderError::CoinstakeNotCommitted);
        }
        Ok(())
    }
}

// Partial merkle trees compare their flag bits including the padding added by
// decoding, so the proof is compared by its encoding.
impl PartialEq for ProvenBlockHeader {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
            && self.signature == other.signature
            && self.coinstake == other.coinstake
            && self.stake_modifier_v2 == other.stake_modifier_v2
            && self.sizes == other.sizes
            && serialize(&self.merkle_proof) == serialize(&other.merkle_proof)
    }
}

impl Eq for ProvenBlockHeader {}

impl fmt::Display for ProvenBlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.block_hash(), f)
    }
}

impl Encodable for ProvenBlockHeader {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        Ok(self.encode_components(writer)?.total())
    }
}

impl Decodable for ProvenBlockHeader {
    fn consensus_decode_from_finite_reader<R: Read + ?Sized>(
        reader: &mut R,
    ) -> Result<Self, EncodeDecodeError> {
        let mut tally = Tally {
            inner: reader,
            consumed: 0,
        };
        let cursor = ByteCursor::default();

        let header = X1Header::consensus_decode_from_finite_reader(&mut tally)?;
        let (cursor, header_size) = cursor.advance_to(tally.consumed);

        let merkle_proof = PartialMerkleTree::consensus_decode_from_finite_reader(&mut tally)?;
        let (cursor, merkle_proof_size) = cursor.advance_to(tally.consumed);

        let signature = BlockSignature::consensus_decode_from_finite_reader(&mut tally)?;
        let (cursor, signature_size) = cursor.advance_to(tally.consumed);

        let coinstake = Transaction::consensus_decode_from_finite_reader(&mut tally)?;
        let (_, coinstake_size) = cursor.advance_to(tally.consumed);

        Ok(ProvenBlockHeader {
            header,
            merkle_proof,
            signature,
            coinstake,
            stake_modifier_v2: None,
            sizes: ComponentSizes {
                header: header_size,
                merkle_proof: merkle_proof_size,
                signature: signature_size,
                coinstake: coinstake_size,
            },
        })
    }
}

/// Lookup table from block hash to proven header.
///
/// Headers carry no link to their proof; code that needs one keeps it here.
#[derive(Debug, Clone, Default)]
pub struct ProvenHeaderIndex {
    proofs: HashMap<BlockHash, ProvenBlockHeader>,
}

impl ProvenHeaderIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a proof under its block hash, returning any proof it replaces.
    pub fn insert(&mut self, proof: ProvenBlockHeader) -> Option<ProvenBlockHeader> {
        self.proofs.insert(proof.block_hash(), proof)
    }

    /// Returns the proof stored under `hash`.
    pub fn get(&self, hash: &BlockHash) -> Option<&ProvenBlockHeader> {
        self.proofs.get(hash)
    }

    /// Returns the proof for `header`, if one is stored.
    pub fn get_for_header(&self, header: &X1Header) -> Option<&ProvenBlockHeader> {
        self.proofs.get(&header.block_hash())
    }

    /// Removes and returns the proof stored under `hash`.
    pub fn remove(&mut self, hash: &BlockHash) -> Option<ProvenBlockHeader> {
        self.proofs.remove(hash)
    }

    /// Returns true if a proof is stored under `hash`.
    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.proofs.contains_key(hash)
    }

    /// Sets the stake modifier of a stored proof.
    ///
    /// Returns false if no proof is stored under `hash`.
    pub fn set_stake_modifier_v2(&mut self, hash: &BlockHash, modifier: StakeModifier) -> bool {
        match self.proofs.get_mut(hash) {
            Some(proof) => {
                proof.set_stake_modifier_v2(modifier);
                true
            }
            None => false,
        }
    }

    /// Returns the number of stored proofs.
    pub fn len(&self) -> usize {
        self.proofs.len()
    }

    /// Returns true if no proof is stored.
    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }
}
