//! Genesis block construction for the X1 networks.
//!
//! Every network starts from a block forged from six inputs: time, nonce,
//! difficulty target, version, reward and a provenance message. The forged
//! block is checked against the hash and merkle root the network declares,
//! and a mismatch stops the network profile from being built.

use std::str::FromStr;

use bitcoin::script::{Builder, PushBytesBuf};
use primitive_types::U256;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    blockdata::{
        block::{BlockHash, TxMerkleNode, X1Block, X1Header},
        transaction::{
            Amount, LockTime, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Version,
            Witness,
        },
    },
    consensus::ConsensusFactory,
    network::Network,
    pow::{CompactTarget, Target},
};

/// Provenance message embedded in the genesis coinbase of every X1 network.
pub const GENESIS_MESSAGE: &str = "https://www.blockchain.com/btc/block/611000";

/// Byte pushed between the empty push and the message in the genesis script.
pub const GENESIS_SCRIPT_TAG: u8 = 42;

/// Errors raised while forging a genesis block.
///
/// Forging is deterministic, so any of these points at wrong parameters and is
/// fatal for the network profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenesisError {
    /// The target has no compact encoding.
    #[error("genesis target cannot be encoded as compact bits")]
    InvalidTarget,

    /// The message cannot be pushed in a script.
    #[error("genesis message cannot be pushed: {0}")]
    InvalidMessage(String),

    /// An expected constant is not a valid hash.
    #[error("invalid expected genesis {name}: {value}")]
    InvalidConstant {
        /// Which constant failed to parse.
        name: &'static str,
        /// The offending value.
        value: String,
    },

    /// The block has no transaction to compute a merkle root over.
    #[error("genesis block has no transactions")]
    MissingMerkleRoot,

    /// The forged header hash differs from the declared one.
    #[error("{network} genesis hash mismatch: expected {expected}, got {actual}")]
    HashMismatch {
        /// Network whose genesis was forged.
        network: Network,
        /// Hash the network declares.
        expected: BlockHash,
        /// Hash of the forged header.
        actual: BlockHash,
    },

    /// The forged merkle root differs from the declared one.
    #[error("{network} genesis merkle root mismatch: expected {expected}, got {actual}")]
    MerkleRootMismatch {
        /// Network whose genesis was forged.
        network: Network,
        /// Merkle root the network declares.
        expected: TxMerkleNode,
        /// Merkle root of the forged block.
        actual: TxMerkleNode,
    },
}

/// Builds the genesis coinbase transaction.
///
/// The single input spends the null outpoint with a script made of an empty
/// push, a push of [`GENESIS_SCRIPT_TAG`] and a push of `message`. The single
/// output pays `reward` to an empty script.
pub fn genesis_transaction(message: &str, reward: Amount) -> Result<Transaction, GenesisError> {
    let push = |bytes: Vec<u8>| {
        PushBytesBuf::try_from(bytes).map_err(|e| GenesisError::InvalidMessage(e.to_string()))
    };
    let tag = push(vec![GENESIS_SCRIPT_TAG])?;
    let message = push(message.as_bytes().to_vec())?;

    let script_sig = Builder::new()
        .push_slice(PushBytesBuf::new())
        .push_slice(tag)
        .push_slice(message)
        .into_script();

    Ok(Transaction {
        version: Version::ONE,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            script_sig,
            sequence: Sequence::MAX,
            witness: Witness::default(),
        }],
        output: vec![TxOut {
            value: reward,
            script_pubkey: ScriptBuf::new(),
        }],
    })
}

/// Forges a genesis block.
///
/// The block holds only the genesis coinbase, has an all-zero previous hash
/// and commits to the coinbase through its merkle root.
pub fn forge_genesis_block(
    factory: &ConsensusFactory,
    time: u32,
    nonce: u32,
    bits: CompactTarget,
    version: i32,
    reward: Amount,
    message: &str,
) -> Result<X1Block, GenesisError> {
    let mut block = factory.create_block();
    block.header = X1Header {
        version,
        time,
        bits,
        nonce,
        ..factory.create_header()
    };
    block.add_transaction(genesis_transaction(message, reward)?);
    block
        .update_merkle_root()
        .ok_or(GenesisError::MissingMerkleRoot)?;
    Ok(block)
}

/// Genesis inputs and expected results of one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenesisParams {
    /// The network these parameters belong to.
    pub network: Network,
    /// Block timestamp.
    pub timestamp: u32,
    /// Block nonce.
    pub nonce: u32,
    /// Difficulty target, stored in the header as compact bits.
    pub target: Target,
    /// Header version.
    pub version: i32,
    /// Value of the single coinbase output.
    pub reward: Amount,
    /// Provenance message pushed in the coinbase script.
    pub message: &'static str,
    /// Expected header hash, in display order.
    pub hash: &'static str,
    /// Expected merkle root, in display order.
    pub merkle_root: &'static str,
}

const GENESIS_MERKLE_ROOT: &str =
    "e3c549956232f0878414d765e83c3f9b1b084b0fa35643ddee62857220ea02b0";

impl GenesisParams {
    /// Returns the genesis parameters for the specified network.
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
            Network::Regtest => Self::regtest(),
        }
    }

    /// Returns the genesis parameters for the mainnet network.
    pub fn mainnet() -> Self {
        Self {
            network: Network::Mainnet,
            timestamp: 1578009360,
            nonce: 15118976,
            target: Target::mainnet_max_target(),
            version: 1,
            reward: Amount::ZERO,
            message: GENESIS_MESSAGE,
            hash: "0000000e13c5bf36c155c7cb1681053d607c191fc44b863d0c5aef6d27b8eb8f",
            merkle_root: GENESIS_MERKLE_ROOT,
        }
    }

    /// Returns the genesis parameters for the testnet network.
    pub fn testnet() -> Self {
        Self {
            network: Network::Testnet,
            timestamp: 1606692960,
            nonce: 24270024,
            target: Target::mainnet_max_target(),
            version: 1,
            reward: Amount::ZERO,
            message: GENESIS_MESSAGE,
            hash: "00000d2ff9f3620b5487ed8ec154ce1947fec525e91e6973d1aeae93c53db7a3",
            merkle_root: GENESIS_MERKLE_ROOT,
        }
    }

    /// Returns the genesis parameters for the regtest network.
    pub fn regtest() -> Self {
        Self {
            network: Network::Regtest,
            timestamp: 1606690200,
            nonce: 11687224,
            // 0000ffff…ff
            target: Target::new(U256([u64::MAX, u64::MAX, u64::MAX, 0x0000_ffff_ffff_ffff])),
            version: 1,
            reward: Amount::ZERO,
            message: GENESIS_MESSAGE,
            hash: "00000e48aeeedabface6d45c0de52c7d0edaec14662ab4f56401361f70d12cc6",
            merkle_root: GENESIS_MERKLE_ROOT,
        }
    }

    /// Compact encoding of the target.
    pub fn bits(&self) -> Result<CompactTarget, GenesisError> {
        self.target.to_compact().ok_or(GenesisError::InvalidTarget)
    }

    /// Parses the expected header hash.
    pub fn expected_hash(&self) -> Result<BlockHash, GenesisError> {
        BlockHash::from_str(self.hash).map_err(|_| GenesisError::InvalidConstant {
            name: "hash",
            value: self.hash.to_string(),
        })
    }

    /// Parses the expected merkle root.
    pub fn expected_merkle_root(&self) -> Result<TxMerkleNode, GenesisError> {
        TxMerkleNode::from_str(self.merkle_root).map_err(|_| GenesisError::InvalidConstant {
            name: "merkle root",
            value: self.merkle_root.to_string(),
        })
    }

    /// Builds the genesis block without checking it.
    pub fn build_block(&self, factory: &ConsensusFactory) -> Result<X1Block, GenesisError> {
        forge_genesis_block(
            factory,
            self.timestamp,
            self.nonce,
            self.bits()?,
            self.version,
            self.reward,
            self.message,
        )
    }

    /// Builds the genesis block and checks it against the expected constants.
    ///
    /// # Errors
    ///
    /// Any error is fatal: the parameters or the hashing are wrong.
    pub fn forge(&self, factory: &ConsensusFactory) -> Result<Genesis, GenesisError> {
        let expected_hash = self.expected_hash()?;
        let expected_merkle_root = self.expected_merkle_root()?;

        let block = self.build_block(factory)?;
        let hash = block.block_hash();
        debug!(
            network = %self.network,
            %hash,
            merkle_root = %block.header.merkle_root,
            "Forged genesis block"
        );

        if block.header.merkle_root != expected_merkle_root {
            error!(network = %self.network, "Genesis merkle root mismatch");
            return Err(GenesisError::MerkleRootMismatch {
                network: self.network,
                expected: expected_merkle_root,
                actual: block.header.merkle_root,
            });
        }
        if hash != expected_hash {
            error!(network = %self.network, "Genesis hash mismatch");
            return Err(GenesisError::HashMismatch {
                network: self.network,
                expected: expected_hash,
                actual: hash,
            });
        }

        info!(network = %self.network, %hash, "Genesis block validated");
        Ok(Genesis {
            network: self.network,
            block,
            hash,
        })
    }
}

/// A genesis block that matched its network's expected constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genesis {
    network: Network,
    block: X1Block,
    hash: BlockHash,
}

impl Genesis {
    /// Returns the network this genesis block belongs to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Returns the genesis block.
    pub fn block(&self) -> &X1Block {
        &self.block
    }

    /// Returns the genesis header.
    pub fn header(&self) -> &X1Header {
        &self.block.header
    }

    /// Returns the validated genesis hash.
    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    /// Returns the validated merkle root.
    pub fn merkle_root(&self) -> TxMerkleNode {
        self.block.header.merkle_root
    }

    /// Consumes the wrapper and returns the block.
    pub fn into_block(self) -> X1Block {
        self.block
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use hex::FromHex;

    use super::*;
    use crate::{consensus::serialize, hashes::HeaderHashAlgorithm};

    const GENESIS_TX_HEX: &str = "\
        01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff2f00\
        012a2b68747470733a2f2f7777772e626c6f636b636861696e2e636f6d2f6274632f626c6f636b2f3631\
        31303030ffffffff0100000000000000000000000000";

    const MAINNET_HEADER_HEX: &str = "\
        01000000\
        0000000000000000000000000000000000000000000000000000000000000000\
        b002ea20728562eedd4356a30f4b081b9b3f3ce865d7148487f032629549c5e3\
        10830e5e\
        ffff0f1e\
        80b2e600";

    fn timestamp(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> u32 {
        let secs = Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap().timestamp();
        u32::try_from(secs).unwrap()
    }

    #[test]
    fn test_genesis_transaction_bytes() {
        let tx = genesis_transaction(GENESIS_MESSAGE, Amount::ZERO).unwrap();
        assert_eq!(serialize(&tx), Vec::from_hex(GENESIS_TX_HEX).unwrap());
        assert_eq!(tx.txid().to_string(), GENESIS_MERKLE_ROOT);
    }

    #[test]
    fn test_mainnet_genesis() {
        let params = GenesisParams::mainnet();
        assert_eq!(params.timestamp, timestamp(2020, 1, 2, 23, 56));
        assert_eq!(params.bits().unwrap().to_consensus(), 0x1e0fffff);

        let genesis = params.forge(&ConsensusFactory::new()).unwrap();
        assert_eq!(
            genesis.hash().to_string(),
            "0000000e13c5bf36c155c7cb1681053d607c191fc44b863d0c5aef6d27b8eb8f"
        );
        assert_eq!(genesis.merkle_root().to_string(), GENESIS_MERKLE_ROOT);
        assert_eq!(
            serialize(genesis.header()),
            Vec::from_hex(MAINNET_HEADER_HEX).unwrap()
        );
        assert!(genesis.header().is_genesis());
        assert_eq!(
            genesis.header().hash_algorithm(),
            HeaderHashAlgorithm::LegacyTruncatedWideHash
        );
        assert_eq!(genesis.block().transaction_count(), 1);
        assert!(genesis.block().signature.is_empty());
    }

    #[test]
    fn test_mainnet_genesis_meets_its_target() {
        let genesis = GenesisParams::mainnet().forge(&ConsensusFactory::new()).unwrap();
        let target = genesis.header().target().unwrap();
        assert!(target <= Target::mainnet_max_target());
        assert_eq!(genesis.header().validate_pow(target), Ok(genesis.hash()));
    }

    #[test]
    fn test_testnet_genesis() {
        let params = GenesisParams::testnet();
        assert_eq!(params.timestamp, timestamp(2020, 11, 29, 23, 36));
        let genesis = params.forge(&ConsensusFactory::new()).unwrap();
        assert_eq!(genesis.network(), Network::Testnet);
        assert_eq!(genesis.hash().to_string(), params.hash);
    }

    #[test]
    fn test_regtest_genesis() {
        let params = GenesisParams::regtest();
        assert_eq!(params.timestamp, timestamp(2020, 11, 29, 22, 50));
        assert_eq!(params.bits().unwrap().to_consensus(), 0x1f00ffff);
        let genesis = params.forge(&ConsensusFactory::new()).unwrap();
        assert_eq!(genesis.hash().to_string(), params.hash);
        assert_eq!(genesis.merkle_root().to_string(), GENESIS_MERKLE_ROOT);
    }

    #[test]
    fn test_perturbing_any_input_changes_result() {
        let factory = ConsensusFactory::new();
        let params = GenesisParams::mainnet();
        let bits = params.bits().unwrap();
        let base = params.build_block(&factory).unwrap();
        let outputs = |block: &X1Block| (block.block_hash(), block.header.merkle_root);

        let perturbed = [
            forge_genesis_block(
                &factory,
                params.timestamp + 1,
                params.nonce,
                bits,
                params.version,
                params.reward,
                params.message,
            ),
            forge_genesis_block(
                &factory,
                params.timestamp,
                params.nonce + 1,
                bits,
                params.version,
                params.reward,
                params.message,
            ),
            forge_genesis_block(
                &factory,
                params.timestamp,
                params.nonce,
                CompactTarget::from_consensus(0x1d0fffff),
                params.version,
                params.reward,
                params.message,
            ),
            forge_genesis_block(
                &factory,
                params.timestamp,
                params.nonce,
                bits,
                2,
                params.reward,
                params.message,
            ),
            forge_genesis_block(
                &factory,
                params.timestamp,
                params.nonce,
                bits,
                params.version,
                Amount::from_sat(1),
                params.message,
            ),
            forge_genesis_block(
                &factory,
                params.timestamp,
                params.nonce,
                bits,
                params.version,
                params.reward,
                "https://www.blockchain.com/btc/block/611001",
            ),
        ];

        for block in perturbed {
            assert_ne!(outputs(&block.unwrap()), outputs(&base));
        }
    }

    #[test]
    fn test_wrong_nonce_is_rejected() {
        let mut params = GenesisParams::mainnet();
        params.nonce += 1;
        assert!(matches!(
            params.forge(&ConsensusFactory::new()),
            Err(GenesisError::HashMismatch { network: Network::Mainnet, .. })
        ));
    }

    #[test]
    fn test_wrong_message_is_rejected() {
        let mut params = GenesisParams::testnet();
        params.message = "X1";
        assert!(matches!(
            params.forge(&ConsensusFactory::new()),
            Err(GenesisError::MerkleRootMismatch { .. })
        ));
    }

    #[test]
    fn test_malformed_constant_is_rejected() {
        let mut params = GenesisParams::regtest();
        params.hash = "not a hash";
        assert_eq!(
            params.forge(&ConsensusFactory::new()),
            Err(GenesisError::InvalidConstant {
                name: "hash",
                value: "not a hash".to_string(),
            })
        );
    }
}
