//! X1 consensus primitives.
//!
//! This library implements the block header and proof-of-stake header layer of
//! the X1 network, a chain that alternates between proof-of-work and
//! proof-of-stake blocks. It covers version-dependent header hashing, the
//! coinstake shape rule, block signatures, compact proven headers, the headers
//! announcement wire format and the forging of each network's genesis block.

#![cfg_attr(test, allow(clippy::arithmetic_side_effects))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::cast_sign_loss))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::cast_possible_truncation))]

/// Block data structures: headers, blocks, signatures, proven headers and
/// genesis construction.
pub mod blockdata;
/// Consensus encoding and per-network consensus parameters.
pub mod consensus;
/// Hash functions and hash types.
pub mod hashes;
/// I/O traits used by consensus encoding.
pub mod io;
/// Network variants.
pub mod network;
/// Peer-to-peer wire types.
pub mod p2p;
/// Proof of work targets.
pub mod pow;
/// Network profiles built once at startup.
pub mod profile;

pub use network::Network;
pub use profile::NetworkProfile;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
