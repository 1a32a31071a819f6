//! Message payloads with an X1 specific wire format.

mod headers;

pub use headers::{Headers, decode_headers, encode_headers};
