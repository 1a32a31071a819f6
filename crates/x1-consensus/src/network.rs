use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{consensus::Params, p2p::Magic};

/// Errors that can occur when parsing a chain type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChainTypeError {
    /// The provided chain type string is invalid.
    #[error("Invalid chain type: {0}")]
    InvalidChainType(String),
}

/// The X1 network variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Network {
    /// Mainnet X1 network.
    Mainnet,
    /// Testnet X1 network.
    Testnet,
    /// Regtest X1 network.
    Regtest,
}

impl Network {
    /// Every network, in declaration order.
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Regtest];

    /// Converts a magic value to the corresponding Network variant.
    ///
    /// # Returns
    ///
    /// * `Some(Network)` - The corresponding network if the magic is recognized
    /// * `None` - If the magic bytes don't match any known network
    pub fn from_magic(magic: Magic) -> Option<Network> {
        Network::try_from(magic).ok()
    }

    /// Returns the magic bytes for this network.
    pub fn magic(self) -> Magic {
        Magic::from(self)
    }

    /// Returns the network name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "X1Main",
            Network::Testnet => "X1Test",
            Network::Regtest => "X1RegTest",
        }
    }

    /// Offset added to the mainnet magic and ports.
    const fn offset(self) -> u16 {
        match self {
            Network::Mainnet => 0,
            Network::Testnet => 1,
            Network::Regtest => 2,
        }
    }

    /// Default peer-to-peer port.
    pub const fn default_port(self) -> u16 {
        23333 + self.offset()
    }

    /// Default RPC port.
    pub const fn rpc_port(self) -> u16 {
        43333 + self.offset()
    }

    /// Human readable part of bech32 witness addresses.
    pub fn bech32_hrp(self) -> &'static str {
        match self {
            Network::Mainnet => "x1",
            Network::Testnet => "xt",
            Network::Regtest => "xr",
        }
    }

    /// Returns the consensus parameters for this network.
    pub fn consensus_params(self) -> Params {
        match self {
            Network::Mainnet => Params::MAINNET,
            Network::Testnet => Params::TESTNET,
            Network::Regtest => Params::REGTEST,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ChainTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::try_from(s)
    }
}

impl TryFrom<&str> for Network {
    type Error = ChainTypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_ascii_lowercase().as_str() {
            "x1main" | "mainnet" | "main" => Ok(Network::Mainnet),
            "x1test" | "testnet" | "test" => Ok(Network::Testnet),
            "x1regtest" | "regtest" => Ok(Network::Regtest),
            _ => Err(ChainTypeError::InvalidChainType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("X1Main".parse::<Network>(), Ok(Network::Mainnet));
        assert_eq!("testnet".parse::<Network>(), Ok(Network::Testnet));
        assert_eq!("X1RegTest".parse::<Network>(), Ok(Network::Regtest));
        assert!(matches!(
            "alpha".parse::<Network>(),
            Err(ChainTypeError::InvalidChainType(name)) if name == "alpha"
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for network in Network::ALL {
            assert_eq!(network.to_string().parse::<Network>(), Ok(network));
        }
    }

    #[test]
    fn test_ports_follow_offsets() {
        assert_eq!(Network::Mainnet.default_port(), 23333);
        assert_eq!(Network::Testnet.default_port(), 23334);
        assert_eq!(Network::Regtest.rpc_port(), 43335);
    }

    #[test]
    fn test_consensus_params_network() {
        for network in Network::ALL {
            assert_eq!(network.consensus_params().network, network);
        }
    }
}
