/// P2P protocol message types.
pub mod message;

use std::fmt;

use thiserror::Error;

use crate::{
    consensus::{Decodable, EncodeDecodeError, Encodable, Params},
    io::{Error as IoError, Read, Write},
    network::Network,
};

/// Network magic bytes to identify the network a message was intended for.
///
/// The magic is the 32-bit value `0x58315831` plus the network offset,
/// transmitted little-endian.
#[derive(Debug, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct Magic([u8; 4]);

impl Magic {
    /// X1 main network magic bytes.
    pub const MAINNET: Self = Self(0x5831_5831u32.to_le_bytes());
    /// X1 test network magic bytes.
    pub const TESTNET: Self = Self(0x5831_5832u32.to_le_bytes());
    /// X1 regression test network magic bytes.
    pub const REGTEST: Self = Self(0x5831_5833u32.to_le_bytes());

    /// Returns the magic bytes as a 4-byte array.
    pub fn to_bytes(&self) -> [u8; 4] {
        self.0
    }

    /// Creates a Magic instance from consensus parameters.
    pub fn from_params(params: impl AsRef<Params>) -> Self {
        params.as_ref().network.into()
    }
}

impl From<Network> for Magic {
    fn from(network: Network) -> Self {
        match network {
            Network::Mainnet => Magic::MAINNET,
            Network::Testnet => Magic::TESTNET,
            Network::Regtest => Magic::REGTEST,
        }
    }
}

impl fmt::Display for Magic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Encodable for Magic {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        self.0.consensus_encode(writer)
    }
}

impl Decodable for Magic {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, EncodeDecodeError> {
        Ok(Magic(Decodable::consensus_decode(reader)?))
    }
}

/// Errors that can occur when working with magic bytes.
#[derive(Debug, PartialEq, Clone, Copy, Error)]
pub enum MagicError {
    /// The magic bytes don't correspond to any known network.
    #[error("unknown network magic: {0}")]
    UnknownMagic(Magic),
}

impl TryFrom<Magic> for Network {
    type Error = MagicError;

    fn try_from(magic: Magic) -> Result<Self, Self::Error> {
        match magic {
            Magic::MAINNET => Ok(Network::Mainnet),
            Magic::TESTNET => Ok(Network::Testnet),
            Magic::REGTEST => Ok(Network::Regtest),
            _ => Err(MagicError::UnknownMagic(magic)),
        }
    }
}
