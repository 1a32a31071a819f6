mod factory;
mod params;

pub use bitcoin::consensus::encode::{
    Decodable, Encodable, Error as EncodeDecodeError, MAX_VEC_SIZE, VarInt, deserialize,
    deserialize_partial, serialize,
};
pub use factory::{ConsensusFactory, CURRENT_HEADER_VERSION};
pub use params::Params;
pub use x1_consensus_derive::ConsensusCodec;
