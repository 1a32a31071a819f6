use crate::{network::Network, pow::Target};

/// Consensus parameters for the X1 networks.
///
/// These are configuration values only. Difficulty retargeting and stake
/// validation that would consume them live outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// Network for which these parameters are defined.
    pub network: Network,
    /// Number of blocks between subsidy halvings.
    pub subsidy_halving_interval: u32,
    /// Blocks a coinbase output must wait before it can be spent.
    pub coinbase_maturity: u32,
    /// Deepest reorganisation a node will follow.
    pub max_reorg_length: u32,
    /// Minimum blocks signalling a deployment within a confirmation window.
    pub rule_change_activation_threshold: u32,
    /// Number of blocks with the same set of rules.
    pub miner_confirmation_window: u32,
    /// The maximum attainable target value for these params.
    pub pow_limit: Target,
    /// Expected amount of time to mine one block, in seconds.
    pub pow_target_spacing: u64,
    /// Difficulty recalculation interval, in seconds.
    pub pow_target_timespan: u64,
    /// Determines whether minimal difficulty may be used for blocks or not.
    pub allow_min_difficulty_blocks: bool,
    /// Determines whether retargeting is disabled for this network or not.
    pub no_pow_retargeting: bool,
}

impl Params {
    /// Consensus parameters for the X1 mainnet network.
    pub const MAINNET: Self = Self {
        network: Network::Mainnet,
        subsidy_halving_interval: 210_000,
        coinbase_maturity: 50,
        max_reorg_length: 125,
        rule_change_activation_threshold: 1916, // 95% of 2016
        miner_confirmation_window: 2016,
        pow_limit: Target::mainnet_max_target(),
        pow_target_spacing: 256,
        pow_target_timespan: 14 * 24 * 60 * 60, // two weeks
        allow_min_difficulty_blocks: false,
        no_pow_retargeting: false,
    };
    /// Consensus parameters for the X1 testnet network.
    pub const TESTNET: Self = Self {
        network: Network::Testnet,
        subsidy_halving_interval: 210_000,
        coinbase_maturity: 50,
        max_reorg_length: 125,
        rule_change_activation_threshold: 1916,
        miner_confirmation_window: 2016,
        pow_limit: Target::mainnet_max_target(),
        pow_target_spacing: 256,
        pow_target_timespan: 14 * 24 * 60 * 60,
        allow_min_difficulty_blocks: false,
        no_pow_retargeting: false,
    };
    /// Consensus parameters for the X1 regtest network.
    pub const REGTEST: Self = Self {
        network: Network::Regtest,
        subsidy_halving_interval: 150,
        coinbase_maturity: 50,
        max_reorg_length: 125,
        rule_change_activation_threshold: 1916,
        miner_confirmation_window: 144,
        pow_limit: Target::regtest_max_target(),
        pow_target_spacing: 256,
        pow_target_timespan: 14 * 24 * 60 * 60,
        allow_min_difficulty_blocks: true,
        no_pow_retargeting: true,
    };

    /// Number of blocks in one retargeting period.
    pub fn difficulty_adjustment_interval(&self) -> u64 {
        self.pow_target_timespan
            .checked_div(self.pow_target_spacing)
            .unwrap_or(0)
    }
}

impl AsRef<Params> for Params {
    fn as_ref(&self) -> &Params {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_interval() {
        // 14 days of 256 second blocks
        assert_eq!(Params::MAINNET.difficulty_adjustment_interval(), 4725);
    }

    #[test]
    fn test_regtest_is_relaxed() {
        assert!(Params::REGTEST.no_pow_retargeting);
        assert!(Params::REGTEST.allow_min_difficulty_blocks);
        assert!(Params::REGTEST.pow_limit > Params::MAINNET.pow_limit);
    }
}
