//! Network profiles.
//!
//! A [`NetworkProfile`] gathers everything a node needs to know about the
//! network it runs on. Building one forges the genesis block; a profile whose
//! genesis does not match its declared constants is never returned.

use tracing::info;

use crate::{
    blockdata::{
        block::BlockHash,
        genesis::{Genesis, GenesisError, GenesisParams},
    },
    consensus::{ConsensusFactory, Params},
    network::Network,
    p2p::Magic,
};

/// Configuration of one X1 network with its validated genesis block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    network: Network,
    params: Params,
    factory: ConsensusFactory,
    genesis: Genesis,
}

impl NetworkProfile {
    /// Builds the profile of `network`.
    ///
    /// # Errors
    ///
    /// Returns the [`GenesisError`] raised while forging the genesis block.
    /// Callers should treat it as fatal.
    pub fn build(network: Network) -> Result<Self, GenesisError> {
        Self::build_with(GenesisParams::for_network(network))
    }

    /// Builds a profile from custom genesis parameters.
    ///
    /// The profile's network is the one named by `genesis`, so its consensus
    /// parameters and genesis block always belong to the same network.
    pub fn build_with(genesis: GenesisParams) -> Result<Self, GenesisError> {
        let network = genesis.network;
        let factory = ConsensusFactory::new();
        let genesis = genesis.forge(&factory)?;

        info!(
            %network,
            magic = %network.magic(),
            port = network.default_port(),
            genesis = %genesis.hash(),
            "Network profile ready"
        );

        Ok(NetworkProfile {
            network,
            params: network.consensus_params(),
            factory,
            genesis,
        })
    }

    /// Returns the network this profile describes.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Returns the consensus parameters.
    pub fn consensus_params(&self) -> &Params {
        &self.params
    }

    /// Returns the factory every block and header of this network is built
    /// with.
    pub fn factory(&self) -> &ConsensusFactory {
        &self.factory
    }

    /// Returns the validated genesis block.
    pub fn genesis(&self) -> &Genesis {
        &self.genesis
    }

    /// Returns the genesis block hash.
    pub fn genesis_hash(&self) -> BlockHash {
        self.genesis.hash()
    }

    /// Returns the network magic.
    pub fn magic(&self) -> Magic {
        self.network.magic()
    }

    /// Returns the default peer-to-peer port.
    pub fn default_port(&self) -> u16 {
        self.network.default_port()
    }

    /// Returns the default RPC port.
    pub fn rpc_port(&self) -> u16 {
        self.network.rpc_port()
    }

    /// Returns the bech32 human readable part.
    pub fn bech32_hrp(&self) -> &'static str {
        self.network.bech32_hrp()
    }
}

impl AsRef<Params> for NetworkProfile {
    fn as_ref(&self) -> &Params {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_network_builds() {
        for network in Network::ALL {
            let profile = NetworkProfile::build(network).unwrap();
            assert_eq!(profile.network(), network);
            assert_eq!(profile.consensus_params().network, network);
            assert_eq!(profile.genesis().network(), network);
            assert_eq!(
                profile.genesis_hash().to_string(),
                GenesisParams::for_network(network).hash
            );
            assert_eq!(Magic::from_params(&profile), profile.magic());
        }
    }

    #[test]
    fn test_profiles_have_distinct_genesis() {
        let main = NetworkProfile::build(Network::Mainnet).unwrap();
        let test = NetworkProfile::build(Network::Testnet).unwrap();
        assert_ne!(main.genesis_hash(), test.genesis_hash());
        assert_eq!(main.genesis().merkle_root(), test.genesis().merkle_root());
    }

    #[test]
    fn test_genesis_mismatch_aborts_build() {
        let mut params = GenesisParams::mainnet();
        params.timestamp += 1;
        assert!(matches!(
            NetworkProfile::build_with(params),
            Err(GenesisError::HashMismatch { .. })
        ));
    }

    #[test]
    fn test_custom_genesis_sets_profile_network() {
        let profile = NetworkProfile::build_with(GenesisParams::testnet()).unwrap();
        assert_eq!(profile.network(), Network::Testnet);
        assert_eq!(profile.consensus_params(), &Params::TESTNET);
        assert_eq!(profile.genesis().network(), Network::Testnet);
        assert_eq!(profile.magic(), Magic::TESTNET);
    }

    #[test]
    fn test_factory_headers_use_current_version() {
        let profile = NetworkProfile::build(Network::Regtest).unwrap();
        assert_eq!(
            profile.factory().create_header().version,
            crate::consensus::CURRENT_HEADER_VERSION
        );
        assert_eq!(profile.default_port(), 23335);
        assert_eq!(profile.bech32_hrp(), "xr");
    }
}
