/// Blocks, block headers, block signatures and proven headers.
pub mod block;

/// Genesis block construction and validation for X1 networks.
pub mod genesis;

/// Transaction types and the coinstake shape rule.
pub mod transaction;
